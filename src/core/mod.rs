//! Extension validation pipeline

pub mod circuit_breaker;
pub mod detector;
pub mod error;
pub mod extension;
pub mod reconciler;
pub mod types;
pub mod validator;

pub use detector::{parse_detector_output, CommandDetector, ContentDetector};
pub use error::{DetectorError, ExtensionError, RunError};
pub use extension::extract_extension;
pub use reconciler::{reconcile, Classification};
pub use types::{SupportedType, TypeTable};
pub use validator::{ErrorReason, FileValidator, ValidationOutcome};
