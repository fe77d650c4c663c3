use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::AppError,
    naming::encode_output_name,
    network::{
        AppState,
        response::{ImageResponse, MetaResponse, UploadResponse, content_type_for},
    },
    storage::{StorageArea, StorageError},
};

pub const UPLOAD_FIELD: &str = "file";
const UPLOAD_NAME_HINT: &str = "filename must look like inputN.jpg/png/webp, e.g. input1.jpg";

#[derive(Debug, Deserialize)]
pub struct MetaQuery {
    input_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    name: Option<String>,
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("filename is empty".to_string()));
        }
        let output = encode_output_name(&filename)
            .map_err(|_| AppError::BadRequest(UPLOAD_NAME_HINT.to_string()))?;

        let bytes = field.bytes().await?;
        state.storage.uploads.store(&filename, &bytes).await?;
        info!("Uploaded {} ({} bytes), expecting {}", filename, bytes.len(), output);

        return Ok(Json(UploadResponse {
            ok: true,
            input: filename,
            output,
        }));
    }
    Err(AppError::BadRequest(format!(
        "missing multipart field `{UPLOAD_FIELD}`"
    )))
}

pub async fn get_meta(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetaQuery>,
) -> Result<Json<MetaResponse>, AppError> {
    let input = query.input_name.unwrap_or_default();
    let output = encode_output_name(&input)
        .map_err(|_| AppError::BadRequest("invalid input_name".to_string()))?;

    let scene = state.scenes.lookup(&input).await;
    let input_exists = state.storage.uploads.exists(&input).await;
    let output_exists = state.storage.outputs.exists(&output).await;

    Ok(Json(MetaResponse {
        ok: true,
        input,
        output,
        scene,
        input_exists,
        output_exists,
    }))
}

pub async fn get_input_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<ImageResponse, AppError> {
    serve_image(&state.storage.uploads, query, "").await
}

pub async fn get_output_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<ImageResponse, AppError> {
    serve_image(
        &state.storage.outputs,
        query,
        " (place the annotated image into outputs/)",
    )
    .await
}

async fn serve_image(
    area: &StorageArea,
    query: ImageQuery,
    missing_hint: &str,
) -> Result<ImageResponse, AppError> {
    let name = query
        .name
        .ok_or_else(|| AppError::BadRequest("missing query parameter `name`".to_string()))?;
    match area.open(&name).await {
        Ok(image) => Ok(ImageResponse {
            image,
            content_type: content_type_for(&name),
        }),
        Err(StorageError::NotFound(path)) => {
            debug!("{} requested but absent", path);
            Err(AppError::NotFound(format!("{path} not found{missing_hint}")))
        }
        Err(e) => Err(e.into()),
    }
}
