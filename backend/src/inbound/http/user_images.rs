//! User image API handlers.
//!
//! Uploads are raw image bytes with a `Content-Type` header rather than
//! multipart forms; the client posts the file body directly.
//!
//! ```text
//! POST   /api/v1/users/{id}/images
//! GET    /api/v1/users/{id}/images
//! DELETE /api/v1/users/{id}/images/{imageId}
//! ```

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use crate::domain::image_service::UserImage;
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

const ID_FIELD: FieldName = FieldName::new("id");
const IMAGE_ID_FIELD: FieldName = FieldName::new("imageId");

fn content_type_of(request: &HttpRequest) -> Result<String, Error> {
    let value = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::invalid_request("a Content-Type header is required"))?;
    // Strip any charset suffix; the store keeps the bare MIME type.
    Ok(value
        .split(';')
        .next()
        .unwrap_or(value)
        .trim()
        .to_ascii_lowercase())
}

/// Upload an image into the user's namespace.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/images",
    params(("id" = String, Path, description = "User id")),
    request_body(content = Vec<u8>, content_type = "image/jpeg"),
    responses(
        (status = 201, description = "Image stored", body = UserImage),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Image store unavailable", body = Error)
    ),
    tags = ["images"],
    operation_id = "uploadUserImage"
)]
#[post("/users/{id}/images")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let content_type = content_type_of(&request)?;
    let stored = state.images.upload(&user_id, body, &content_type).await?;
    Ok(HttpResponse::Created().json(stored))
}

/// List the user's images.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/images",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Images", body = [UserImage]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Image store unavailable", body = Error)
    ),
    tags = ["images"],
    operation_id = "listUserImages"
)]
#[get("/users/{id}/images")]
pub async fn list_images(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserImage>>> {
    let user_id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let images = state.images.list(&user_id).await?;
    Ok(web::Json(images))
}

/// Remove one of the user's images.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/images/{imageId}",
    params(
        ("id" = String, Path, description = "User id"),
        ("imageId" = String, Path, description = "Image id")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Image store unavailable", body = Error)
    ),
    tags = ["images"],
    operation_id = "deleteUserImage"
)]
#[delete("/users/{id}/images/{image_id}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (user_id, image_id) = path.into_inner();
    let user_id = UserId::from_uuid(parse_uuid(&user_id, ID_FIELD)?);
    let image_id = parse_uuid(&image_id, IMAGE_ID_FIELD)?;
    state.images.delete(&user_id, &image_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
