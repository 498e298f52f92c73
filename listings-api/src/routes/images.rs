/// Image endpoints
///
/// Uploaded files live in the upload directory under generated names; the
/// database rows carry the metadata and the public URL. Serving reads the
/// file straight off disk and infers the content type from the extension.
///
/// # Endpoints
///
/// - `POST   /api/images/upload/:property_id` - Attach files to a listing (admin)
/// - `GET    /api/images/:filename` - Serve a stored file
/// - `GET    /api/images/property/:property_id` - List a listing's images
/// - `DELETE /api/images/:id` - Remove one image (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    storage,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use listings_shared::models::{
    image::{CreateImage, Image},
    property::Property,
};

/// Multipart field name carrying the uploaded files
const UPLOAD_FIELD: &str = "files";

/// Attaches uploaded files to a listing (admin)
///
/// Accepts one or more files in the `files` multipart field. Empty parts
/// are skipped before any other check; every remaining file must carry an
/// allowed image content type. Sending only empty parts yields an empty
/// array rather than an error.
///
/// # Endpoint
///
/// ```text
/// POST /api/images/upload/42
/// Content-Type: multipart/form-data
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Disallowed or missing content type
/// - `404 Not Found`: No listing with that ID
pub async fn upload_images(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Vec<Image>>> {
    if !Property::exists(&state.db, property_id).await? {
        return Err(ApiError::not_found("Property", property_id));
    }

    let mut created = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            continue;
        }

        let content_type = content_type
            .ok_or_else(|| ApiError::BadRequest("File content type is required".to_string()))?;

        if !Image::is_allowed_content_type(&content_type) {
            return Err(ApiError::BadRequest(format!(
                "File type not allowed: {}. Allowed types: JPEG, PNG, GIF, WebP",
                content_type
            )));
        }

        let stored_name = state.images.save(&original_name, &bytes).await?;

        let image = Image::create(
            &state.db,
            CreateImage {
                url: format!("/api/images/{}", stored_name),
                file_name: stored_name,
                content_type,
                property_id,
            },
        )
        .await?;

        created.push(image);
    }

    tracing::info!(property_id, count = created.len(), "Uploaded images");

    Ok(Json(created))
}

/// Serves a stored image file
///
/// The content type is derived from the file extension, and the file is
/// offered inline so browsers render it rather than download it.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or unsafe filename
pub async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let bytes = state
        .images
        .read(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Image not found: {}", filename)))?;

    let response = (
        [
            (
                header::CONTENT_TYPE,
                storage::content_type_for(&filename).to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response();

    Ok(response)
}

/// Lists all images attached to a listing, oldest first
///
/// # Errors
///
/// - `404 Not Found`: No listing with that ID
pub async fn list_property_images(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
) -> ApiResult<Json<Vec<Image>>> {
    if !Property::exists(&state.db, property_id).await? {
        return Err(ApiError::not_found("Property", property_id));
    }

    let images = Image::list_by_property(&state.db, property_id).await?;

    Ok(Json(images))
}

/// Removes one image (admin)
///
/// Deletes the database row first, then the file; a missing file is only
/// logged since the row is already gone.
///
/// # Errors
///
/// - `404 Not Found`: No image with that ID
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let image = Image::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Image", id))?;

    Image::delete(&state.db, id).await?;

    if let Err(e) = state.images.delete(&image.file_name).await {
        tracing::warn!(file = %image.file_name, error = %e, "Failed to remove image file");
    }

    tracing::info!(id, "Deleted image");

    Ok(StatusCode::NO_CONTENT)
}
