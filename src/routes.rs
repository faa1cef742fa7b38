use crate::{
    api::{admin, attendance, employee, upload},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, error, middleware::from_fn, web};
use serde_json::json;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst size");
    Governor::new(&cfg)
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let message = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "message": message })),
    )
    .into()
}

// Extractor failures answer with the same `{"message"}` shape as handlers.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| bad_request(err))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| bad_request(err))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    cfg.service(web::resource("/uploads/{file}").route(web::get().to(upload::serve_photo)));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::resource("/attendance")
                    .route(web::get().to(attendance::my_attendance))
                    .route(web::post().to(attendance::submit_attendance)),
            )
            .service(web::resource("/upload").route(web::post().to(upload::upload_photo)))
            .service(
                web::scope("/admin")
                    .service(web::resource("/stats").route(web::get().to(admin::stats)))
                    .service(
                        web::resource("/attendance")
                            .route(web::get().to(admin::attendance_history)),
                    )
                    // /admin/employees
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /admin/employees/{id}
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/employees/{id}/reset-password")
                            .route(web::post().to(employee::reset_password)),
                    ),
            ),
    );
}
