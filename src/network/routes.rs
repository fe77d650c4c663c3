use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    network::{
        AppState,
        handlers::{get_input_image, get_meta, get_output_image, upload_image},
    },
};

pub fn routes(
    state: Arc<AppState>,
    allowed_origins: &[String],
    max_upload_bytes: usize,
) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/api/upload", post(upload_image))
        .route("/api/meta", get(get_meta))
        .route("/api/input-image", get(get_input_image))
        .route("/api/output-image", get(get_output_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors(allowed_origins)?),
        )
        .with_state(state))
}

/// Credentialed CORS for the listed origins. Wildcards are not allowed with
/// credentials, so methods and headers are mirrored from the request.
fn cors(allowed_origins: &[String]) -> Result<CorsLayer, AppError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| match origin.as_str() {
            // A wildcard cannot be combined with credentials.
            "*" => Err(AppError::Origin(origin.clone())),
            _ => HeaderValue::from_str(origin).map_err(|_| AppError::Origin(origin.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
