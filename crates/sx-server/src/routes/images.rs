//! Image route handlers.
//!
//! Metadata records live in the metadata store as JSON text keyed by image id;
//! bodies live in the object store under the same key.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sx_core::{Error, ImageId, ImageMetadata};
use sx_store::ListOptions;

use crate::context::AppContext;
use crate::error::AppError;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "upload";

/// Content type recorded when the uploaded part declares none.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Query parameters for listing images.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Cursor returned by a previous incomplete listing.
    pub page: Option<String>,
}

/// One page of image records.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageListResponse {
    pub items: Vec<ImageMetadata>,
    pub list_complete: bool,
    /// Pass back as `page` to fetch the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A single image record.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageResponse {
    pub item: ImageMetadata,
}

/// Multipart body accepted by the upload route.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    upload: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/images
#[utoipa::path(
    get,
    path = "/api/images",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of image records", body = ImageListResponse),
        (status = 400, description = "Malformed cursor", body = crate::error::ErrorBody)
    )
)]
pub async fn list_images(
    State(ctx): State<AppContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ImageListResponse>, AppError> {
    let Query(query) = query.map_err(|e| Error::Validation(e.body_text()))?;
    let cursor = query.page.filter(|page| !page.is_empty());
    let listing = ctx
        .metadata
        .list(ListOptions {
            cursor,
            ..ListOptions::default()
        })
        .await?;

    let mut items = Vec::with_capacity(listing.keys.len());
    for key in &listing.keys {
        // Deleted between list and get.
        let Some(wire) = ctx.metadata.get(&key.name).await? else {
            continue;
        };
        items.push(ImageMetadata::from_wire(&wire)?);
    }

    tracing::debug!(
        count = items.len(),
        list_complete = listing.list_complete,
        "Listed images"
    );

    Ok(Json(ImageListResponse {
        items,
        list_complete: listing.list_complete,
        cursor: listing.cursor,
    }))
}

/// GET /api/images/{id}
#[utoipa::path(
    get,
    path = "/api/images/{id}",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image record", body = ImageResponse),
        (status = 400, description = "Id shorter than 10 characters", body = crate::error::ErrorBody),
        (status = 404, description = "No such image", body = crate::error::ErrorBody)
    )
)]
pub async fn get_image(
    State(ctx): State<AppContext>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<ImageResponse>, AppError> {
    let id = path_id(id)?;
    let item = load_metadata(&ctx, &id).await?;
    Ok(Json(ImageResponse { item }))
}

/// POST /api/images
#[utoipa::path(
    post,
    path = "/api/images",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored image record", body = ImageMetadata),
        (status = 400, description = "No `upload` field", body = crate::error::ErrorBody),
        (status = 403, description = "Missing or wrong API key", body = crate::error::ErrorBody),
        (status = 413, description = "Body over the upload limit", body = crate::error::ErrorBody)
    )
)]
pub async fn upload_image(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageMetadata>, AppError> {
    let multipart = multipart.map_err(|e| Error::Validation(e.body_text()))?;
    let (content_type, body) = read_upload(multipart)
        .await?
        .ok_or_else(|| Error::missing_parameter(UPLOAD_FIELD))?;

    let id = ctx.ids.generate();
    let hash = sha1_hex(&body);
    let size = body.len();

    let object = ctx.objects.put(id.as_str(), body).await?;

    let record = ImageMetadata {
        url: ctx.config.media_url(&id),
        delete: ctx.config.delete_url(&id),
        id,
        object,
        content_type,
        hash,
    };
    ctx.metadata.put(record.id.as_str(), record.to_wire()?).await?;

    tracing::info!(
        id = %record.id,
        size,
        content_type = %record.content_type,
        "Stored upload"
    );

    Ok(Json(record))
}

/// DELETE /api/images/{id}
#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 204, description = "Image deleted", body = DeleteResponse),
        (status = 400, description = "Id shorter than 10 characters", body = crate::error::ErrorBody),
        (status = 403, description = "Missing or wrong API key", body = crate::error::ErrorBody),
        (status = 404, description = "No such image", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_image(
    State(ctx): State<AppContext>,
    id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    let record = load_metadata(&ctx, &id).await?;

    // Object first, then metadata. A failure in between is not rolled back.
    ctx.objects.delete(record.id.as_str()).await?;
    ctx.metadata.delete(record.id.as_str()).await?;

    tracing::info!(id = %record.id, "Deleted image");

    Ok((StatusCode::NO_CONTENT, Json(DeleteResponse { success: true })))
}

/// DELETE /api/images with no id.
pub async fn delete_without_id() -> AppError {
    AppError::from(Error::missing_parameter("id"))
}

/// Id from the path. Everything after the collection prefix counts, slashes
/// included.
pub(crate) fn path_id(id: Result<Path<String>, PathRejection>) -> Result<ImageId, Error> {
    let Path(id) = id.map_err(|e| Error::Validation(e.body_text()))?;
    ImageId::parse(&id)
}

pub(crate) async fn load_metadata(
    ctx: &AppContext,
    id: &ImageId,
) -> Result<ImageMetadata, AppError> {
    let wire = ctx
        .metadata
        .get(id.as_str())
        .await?
        .ok_or_else(|| Error::not_found(id))?;
    Ok(ImageMetadata::from_wire(&wire)?)
}

/// Pull the first `upload` part out of a multipart body as
/// `(content type, bytes)`. Other parts are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Option<(String, Bytes)>, Error> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some((content_type, body)));
    }
    Ok(None)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(err.body_text())
    } else {
        Error::Validation(err.body_text())
    }
}

/// SHA-1 of `body`, lower-case hex.
pub fn sha1_hex(body: &[u8]) -> String {
    hex::encode(Sha1::digest(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_matches_known_digests() {
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(sha1_hex(b"test"), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");
    }

    #[test]
    fn list_response_omits_cursor_when_complete() {
        let body = serde_json::to_value(ImageListResponse {
            items: Vec::new(),
            list_complete: true,
            cursor: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"items": [], "list_complete": true}));
    }
}
