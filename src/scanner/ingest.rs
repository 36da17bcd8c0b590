use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::ApiError;

/// One validated image upload, alive for the duration of a single scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ScanRequest {
    /// Validate the uploaded part. The browser's content type is trusted when
    /// it looks specific; otherwise the MIME is guessed from the filename.
    pub fn from_upload(
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::NoImage);
        }

        let mime_type = match content_type {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        };

        if !mime_type.starts_with("image/") {
            return Err(ApiError::NotAnImage(mime_type));
        }

        Ok(Self { bytes, mime_type })
    }

    /// Base64 payload for the model's `inline_data` part.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Extension used when the upload is stored on disk.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            _ => "img",
        }
    }
}
