//! Content-type resolution from object key extensions.
//!
//! # Responsibilities
//! - Map a key's file extension to a MIME type
//! - Classify extensions into cache policy classes
//!
//! The backing store may not record a content type for every object, so the
//! gateway falls back to the extension and finally to `application/octet-stream`.

/// Fallback content type for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Cache policy class derived from the key's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    /// Images and static assets: cached for a year, immutable.
    Immutable,
    /// Everything else: one month, with stale-while-revalidate.
    Standard,
}

impl CacheClass {
    /// The `Cache-Control` header value for this class.
    pub fn header_value(self) -> &'static str {
        match self {
            CacheClass::Immutable => "public, max-age=31536000, immutable",
            CacheClass::Standard => "public, max-age=2592000, stale-while-revalidate=604800",
        }
    }
}

/// Lowercased extension of the key's last path segment, if any.
fn extension(key: &str) -> Option<String> {
    let name = key.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Resolve a content type from the key's extension.
pub fn content_type(key: &str) -> Option<&'static str> {
    let ext = extension(key)?;
    let mime = match ext.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",

        // Documents
        "txt" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "rtf" => "application/rtf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",

        // Archives
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "rar" => "application/vnd.rar",
        "7z" => "application/x-7z-compressed",

        // Other
        "sqlite" => "application/x-sqlite3",
        "exe" | "dll" => "application/x-msdownload",
        "bin" | "dat" | "db" | "lib" => OCTET_STREAM,

        _ => return None,
    };
    Some(mime)
}

/// Classify the key into a cache policy class.
///
/// Images and versioned static assets never change under the same key, so
/// they get the long immutable policy.
pub fn cache_class(key: &str) -> CacheClass {
    match extension(key).as_deref() {
        Some(
            "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "ico" | "css" | "js" | "woff"
            | "woff2" | "ttf" | "eot",
        ) => CacheClass::Immutable,
        _ => CacheClass::Standard,
    }
}
