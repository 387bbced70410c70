//! Content-type resolution for uploaded files.

/// Fallback content type for unrecognized or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the content type of an upload from its file name.
///
/// Matching is done on the lowercased extension; anything the service does
/// not accept as an image is sent as `application/octet-stream`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let extension = base_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        _ => OCTET_STREAM,
    }
}
