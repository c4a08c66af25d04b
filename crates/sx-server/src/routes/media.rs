//! Public media serving.
//!
//! Resolves the `url` field of a record when the server hosts the bodies
//! itself instead of a CDN or bucket domain.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sx_core::Error;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::images::{load_metadata, path_id};

/// Ids are never reused for different bodies, so responses never go stale.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Applied to anything not declared as an image, so uploaded HTML or SVG
/// cannot script against this origin.
const NON_IMAGE_CSP: &str = "sandbox";

fn is_image(content_type: &str) -> bool {
    content_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && !content_type.to_ascii_lowercase().starts_with("image/svg")
}

/// GET /media/{id}
#[utoipa::path(
    get,
    path = "/media/{id}",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 400, description = "Id shorter than 10 characters", body = crate::error::ErrorBody),
        (status = 404, description = "No such image", body = crate::error::ErrorBody)
    )
)]
pub async fn serve_media(
    State(ctx): State<AppContext>,
    id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    let record = load_metadata(&ctx, &id).await?;

    let Some(stored) = ctx.objects.get(id.as_str()).await? else {
        tracing::warn!(id = %id, "Metadata present but object missing");
        return Err(Error::not_found(&id).into());
    };

    let sandbox = !is_image(&record.content_type);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, record.content_type),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
            (header::ETAG, stored.info.http_etag),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        sandbox.then(|| [(header::CONTENT_SECURITY_POLICY, NON_IMAGE_CSP)]),
        stored.body,
    ))
}
