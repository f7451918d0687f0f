use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use camino::Utf8Path;
use std::fs;

/// Loads an image file and encodes it as a data URI string.
/// Returns None if the file doesn't exist or has an unsupported extension.
pub fn load_image_as_data_uri(image_path: &Utf8Path) -> Option<String> {
    let mime_type = mime_for(image_path)?;
    let bytes = fs::read(image_path).ok()?;
    Some(format!("data:{};base64,{}", mime_type, BASE64.encode(&bytes)))
}

pub fn mime_for(path: &Utf8Path) -> Option<&'static str> {
    match path.extension()?.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
