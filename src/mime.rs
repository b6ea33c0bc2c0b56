//! Filename and MIME type resolution for payload routing.
//!
//! A static table stands in for a platform MIME database: extension to type
//! for insert sources, type back to extension for fetch sinks. Exactly one
//! transform happens per invocation and there is no global state.

use std::path::Path;

/// Extension/type pairs. First match wins in either direction, so the
/// preferred extension for a type precedes its aliases.
const TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("wasm", "application/wasm"),
    ("bin", "application/octet-stream"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
];

/// Look up the MIME type for a filename's extension.
///
/// Returns `None` when the filename has no extension or the extension is
/// unknown, leaving the decision to the node.
pub fn guess_type(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(e, _)| *e == ext.as_str())
        .map(|(_, t)| *t)
}

/// Look up the preferred extension for a MIME type.
pub fn extension_for(mimetype: &str) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|(_, t)| *t == mimetype)
        .map(|(e, _)| *e)
}
