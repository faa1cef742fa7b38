use crate::api::admin::{AdminStatsResponse, AttendanceHistoryResponse};
use crate::api::attendance::{MyAttendanceResponse, SubmitAttendance};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, ResetPassword, UpdateEmployee};
use crate::api::upload::UploadResponse;
use crate::auth::handlers::LoginResponse;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceUser, AttendanceWithUser, StatusCounts,
};
use crate::model::role::Role;
use crate::model::user::Employee;
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Absensi API",
        version = "1.0.0",
        description = r#"
## Employee Attendance

Employees submit one attendance record per day (**PRESENT**, **LEAVE** or **SICK**),
optionally with a photo. Administrators manage employee accounts and review attendance.

### 🕖 Attendance days
A day runs from 00:00 to 24:00 at **UTC+7** regardless of where the server runs.
A second submission on the same day is rejected with **409 Conflict**.

### 🔐 Security
Call `POST /auth/login` and send the returned token as `Authorization: Bearer <token>`.
Routes under `/api/admin` require the **ADMIN** role.

### 📦 Response Format
- JSON bodies; errors are `{"message": "..."}`
- Photos are uploaded as raw bytes and referenced by the returned `photo_url`
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::attendance::my_attendance,
        crate::api::attendance::submit_attendance,

        crate::api::upload::upload_photo,

        crate::api::admin::stats,
        crate::api::admin::attendance_history,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::reset_password
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            Role,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceUser,
            AttendanceWithUser,
            StatusCounts,
            SubmitAttendance,
            MyAttendanceResponse,
            UploadResponse,
            AdminStatsResponse,
            AttendanceHistoryResponse,
            Employee,
            EmployeeListResponse,
            CreateEmployee,
            UpdateEmployee,
            ResetPassword
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Attendance", description = "Daily attendance for the signed-in employee"),
        (name = "Upload", description = "Attendance photos"),
        (name = "Admin", description = "Attendance statistics and history"),
        (name = "Employee", description = "Employee account management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
