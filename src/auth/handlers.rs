use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    model::user::normalize_email,
    models::LoginReqDto,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    access_token: String,
    #[schema(example = "Bearer")]
    token_type: &'static str,
    role: Role,
}

/// Exchange email and password for a bearer access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    let email = normalize_email(&user.email);
    if email.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "message": "Email and password are required"
        }));
    }

    debug!("Fetching user");

    let db_user = match store.find_user_by_email(&email).await {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({
                "message": "Invalid credentials"
            }));
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "message": "Invalid credentials"
        }));
    }

    let access_token = match generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.name.clone(),
        db_user.role.id(),
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(user_id = db_user.id, role = %db_user.role, "Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer",
        role: db_user.role,
    })
}
