//! Image selection collaborator used by photo uploads.

use async_trait::async_trait;

use crate::error::MenuError;

/// An image chosen by the user, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PickedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

/// Lets the user choose an image. `Ok(None)` means they backed out.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick(&self) -> Result<Option<PickedImage>, MenuError>;
}

pub fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for("cake.JPG"), "image/jpeg");
        assert_eq!(mime_for("dish.png"), "image/png");
        assert_eq!(mime_for("noext"), "application/octet-stream");
        assert_eq!(PickedImage::new("a.webp", vec![1]).mime_type, "image/webp");
    }
}
