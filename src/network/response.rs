use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::storage::StoredImage;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub ok: bool,
    pub input: String,
    pub output: String,
    pub scene: String,
    pub input_exists: bool,
    pub output_exists: bool,
}

/// Raw image bytes streamed from a storage area.
pub struct ImageResponse {
    pub image: StoredImage,
    pub content_type: &'static str,
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(ReaderStream::new(self.image.file));
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_LENGTH, self.image.len.to_string()),
            ],
            body,
        )
            .into_response()
    }
}

/// Media type guessed from the file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
