//! Axum router construction.
//!
//! Builds the full application router with the image routes, middleware
//! layers, media serving, and the OpenAPI document.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::auth::api_key_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;
use crate::routes::endpoint_not_found;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::images::list_images,
        routes::images::get_image,
        routes::images::upload_image,
        routes::images::delete_image,
        routes::media::serve_media,
    ),
    components(schemas(
        routes::images::ImageListResponse,
        routes::images::ImageResponse,
        routes::images::DeleteResponse,
        routes::images::UploadForm,
        crate::error::ErrorBody,
        sx_core::ImageMetadata,
        sx_core::ObjectInfo,
        sx_core::ImageId,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    // Unsupported methods on a known path answer like unknown paths.
    let images = Router::new()
        .route(
            "/images",
            get(routes::images::list_images)
                .post(routes::images::upload_image)
                .delete(routes::images::delete_without_id)
                .fallback(endpoint_not_found),
        )
        .route(
            "/images/",
            get(routes::images::list_images)
                .post(routes::images::upload_image)
                .delete(routes::images::delete_without_id)
                .fallback(endpoint_not_found),
        )
        .route(
            "/images/{*id}",
            get(routes::images::get_image)
                .delete(routes::images::delete_image)
                .fallback(endpoint_not_found),
        )
        .fallback(endpoint_not_found);

    // Applied after the fallback so unknown non-GET paths under /api still
    // answer 403 without a key.
    let api = images.layer(middleware::from_fn_with_state(ctx.clone(), api_key_middleware));

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api);

    if ctx.config.media.serve {
        app = app.route(
            "/media/{id}",
            get(routes::media::serve_media).fallback(endpoint_not_found),
        );
    }

    app.fallback(endpoint_not_found)
        .layer(DefaultBodyLimit::max(ctx.config.server.max_upload_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
