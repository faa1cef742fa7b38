use crate::api::{internal_error, json_error};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::utils::clock::Clock;
use crate::utils::upload::{
    UploadError, photo_file_name, public_url, read_photo, save_photo, validate_photo,
};
use actix_web::{
    HttpRequest, HttpResponse, Responder,
    http::{StatusCode, header},
    web,
};
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "/uploads/2-1767571200000-9f0c1d.jpg")]
    pub photo_url: String,
}

fn rejected(e: &UploadError) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": e.to_string() }))
}

/// Upload an attendance photo
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "image/jpeg"),
    responses(
        (status = 200, description = "Photo stored", body = UploadResponse),
        (status = 400, description = "Empty, too large or not an image", body = Object, example = json!({
            "message": "Invalid file type. Use JPG, PNG or WebP"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Upload"
)]
pub async fn upload_photo(
    auth: AuthUser,
    req: HttpRequest,
    mut payload: web::Payload,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
) -> actix_web::Result<impl Responder> {
    let max = config.max_upload_bytes;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    // type errors win over size errors, so check it before reading
    if let Err(e) = validate_photo(content_type, 1, max) {
        return Ok(rejected(&e));
    }

    let mut bytes = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            debug!(error = %e, user_id = auth.user_id, "Upload body interrupted");
            json_error(StatusCode::BAD_REQUEST, "Upload body could not be read")
        })?;
        if bytes.len() + chunk.len() > max {
            return Ok(rejected(&UploadError::TooLarge { max }));
        }
        bytes.extend_from_slice(&chunk);
    }

    let kind = match validate_photo(content_type, bytes.len(), max) {
        Ok(kind) => kind,
        Err(e) => return Ok(rejected(&e)),
    };

    let file_name = photo_file_name(auth.user_id, clock.now(), kind);
    let dir = PathBuf::from(&config.upload_dir);
    let stored_name = file_name.clone();
    let size = bytes.len();

    web::block(move || save_photo(&dir, &stored_name, &bytes))
        .await
        .map_err(|e| {
            error!(error = %e, "Photo write task failed");
            internal_error()
        })?
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to store photo");
            internal_error()
        })?;

    info!(user_id = auth.user_id, email = %auth.email, file = %file_name, size, "Photo stored");

    Ok(HttpResponse::Ok().json(UploadResponse {
        photo_url: public_url(&file_name),
    }))
}

/// Serves a stored photo by file name.
pub async fn serve_photo(
    path: web::Path<String>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    let file_name = path.into_inner();
    let dir = PathBuf::from(&config.upload_dir);
    let lookup = file_name.clone();

    let found = web::block(move || read_photo(&dir, &lookup))
        .await
        .map_err(|e| {
            error!(error = %e, "Photo read task failed");
            internal_error()
        })?
        .map_err(|e| {
            error!(error = %e, file = %file_name, "Failed to read photo");
            internal_error()
        })?;

    Ok(match found {
        Some((bytes, kind)) => HttpResponse::Ok()
            .content_type(kind.content_type())
            .body(bytes),
        None => HttpResponse::NotFound().json(json!({ "message": "Photo not found" })),
    })
}
