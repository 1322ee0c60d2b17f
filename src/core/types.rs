//! Supported MIME type / extension table

use lazy_static::lazy_static;

/// One supported content type and the extensions accepted for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedType {
    pub mime: &'static str,
    pub extensions: &'static [&'static str],
}

impl SupportedType {
    pub const fn new(mime: &'static str, extensions: &'static [&'static str]) -> Self {
        Self { mime, extensions }
    }

    /// Exact, case-sensitive alias membership
    pub fn accepts(&self, extension: &str) -> bool {
        self.extensions.iter().any(|alias| *alias == extension)
    }

    /// Aliases joined for display, e.g. `jpeg/jpg/jpe/jfif`
    pub fn display_extensions(&self) -> String {
        self.extensions.join("/")
    }
}

/// Ordered, versioned table of supported types
///
/// Lookups return the first entry whose MIME type matches.
#[derive(Debug, Clone)]
pub struct TypeTable {
    pub version: u32,
    entries: Vec<SupportedType>,
}

const BUILTIN_VERSION: u32 = 2;

const BUILTIN_TYPES: &[SupportedType] = &[
    SupportedType::new("application/pdf", &["pdf"]),
    SupportedType::new("image/png", &["png"]),
    SupportedType::new("image/jpeg", &["jpeg", "jpg", "jpe", "jfif"]),
    SupportedType::new("image/gif", &["gif"]),
    SupportedType::new("video/mp4", &["mp4"]),
    SupportedType::new("application/x-7z-compressed", &["7z", "cb7"]),
    SupportedType::new("text/html", &["html"]),
    SupportedType::new("image/webp", &["webp"]),
    SupportedType::new("application/zip", &["zip"]),
    SupportedType::new("audio/mpeg", &["mp3"]),
];

lazy_static! {
    static ref BUILTIN_TABLE: TypeTable = TypeTable::new(BUILTIN_VERSION, BUILTIN_TYPES.to_vec());
}

impl TypeTable {
    pub fn new(version: u32, entries: Vec<SupportedType>) -> Self {
        Self { version, entries }
    }

    /// The table shipped with the binary, built once on first use
    pub fn builtin() -> &'static TypeTable {
        &BUILTIN_TABLE
    }

    pub fn lookup(&self, mime: &str) -> Option<&SupportedType> {
        self.entries.iter().find(|entry| entry.mime == mime)
    }

    pub fn entries(&self) -> &[SupportedType] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
