use crate::api::internal_error;
use crate::{
    auth::{
        auth::AuthUser,
        password::{MIN_PASSWORD_LEN, hash_password},
    },
    model::{
        role::Role,
        user::{Employee, EmployeeChanges, NewUser, normalize_email},
    },
    store::{Store, StoreError},
    utils::clock::Clock,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[schema(example = "budi@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "user123")]
    pub password: String,
    #[schema(example = "Staff", nullable = true)]
    pub position: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[schema(example = "budi@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "Supervisor", nullable = true)]
    pub position: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPassword {
    #[schema(example = "newpass123")]
    pub new_password: String,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
}

fn clean_position(position: Option<&str>) -> Option<String> {
    position
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": message }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Employee not found" }))
}

/// List employee accounts
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Employees ordered by name", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employees = store.list_employees().await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        internal_error()
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees }))
}

/// Create an employee account
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created",
            "employee": {
                "id": 2,
                "name": "Budi Santoso",
                "email": "budi@company.com",
                "position": "Staff",
                "created_at": "2026-01-01T00:00:00Z"
            }
        })),
        (status = 400, description = "Missing fields or short password"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "Email already registered"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    let email = normalize_email(&payload.email);
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Ok(bad_request("Name, email and password are required"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Ok(bad_request("Password must be at least 6 characters"));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        internal_error()
    })?;

    let result = store
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash,
            role: Role::User,
            position: clean_position(payload.position.as_deref()),
            created_at: clock.now(),
        })
        .await;

    match result {
        Ok(employee) => {
            info!(employee_id = employee.id, admin_id = auth.user_id, "Employee created");
            Ok(HttpResponse::Created().json(json!({
                "message": "Employee created",
                "employee": employee
            })))
        }
        Err(StoreError::Duplicate) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Email already registered"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

/// Update an employee's name, email and position
#[utoipa::path(
    put,
    path = "/api/admin/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Employee updated",
            "employee": {
                "id": 2,
                "name": "Budi Santoso",
                "email": "budi@company.com",
                "position": "Supervisor",
                "created_at": "2026-01-01T00:00:00Z"
            }
        })),
        (status = 400, description = "Name or email missing"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 409, description = "Email used by another account"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let name = body.name.trim();
    let email = normalize_email(&body.email);
    if name.is_empty() || email.is_empty() {
        return Ok(bad_request("Name and email are required"));
    }

    let changes = EmployeeChanges {
        name: name.to_string(),
        email,
        position: clean_position(body.position.as_deref()),
    };

    match store.update_employee(employee_id, changes).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(json!({
            "message": "Employee updated",
            "employee": employee
        }))),
        Err(StoreError::NotFound) => Ok(not_found()),
        Err(StoreError::Duplicate) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Email already in use"
        }))),
        Err(e) => {
            error!(error = %e, employee_id, "Failed to update employee");
            Err(internal_error())
        }
    }
}

/// Delete an employee account and its attendance history
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error", body = Object)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    match store.delete_employee(employee_id).await {
        Ok(()) => {
            info!(employee_id, admin_id = auth.user_id, "Employee deleted");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }
        Err(StoreError::NotFound) => Ok(not_found()),
        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Set a new password for an employee
#[utoipa::path(
    post,
    path = "/api/admin/employees/{employee_id}/reset-password",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = ResetPassword,
    responses(
        (status = 200, description = "Password reset", body = Object, example = json!({
            "message": "Password reset"
        })),
        (status = 400, description = "Password too short"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_password(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Json<ResetPassword>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    if body.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Ok(bad_request("Password must be at least 6 characters"));
    }

    let password_hash = hash_password(&body.new_password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        internal_error()
    })?;

    match store.set_password(employee_id, &password_hash).await {
        Ok(()) => {
            info!(employee_id, admin_id = auth.user_id, "Password reset");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Password reset"
            })))
        }
        Err(StoreError::NotFound) => Ok(not_found()),
        Err(e) => {
            error!(error = %e, employee_id, "Failed to reset password");
            Err(internal_error())
        }
    }
}
