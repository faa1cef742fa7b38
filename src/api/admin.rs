use crate::api::internal_error;
use crate::api::attendance::resolve_month;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceStatus, AttendanceWithUser, StatusCounts};
use crate::store::{AttendanceFilter, Store};
use crate::utils::clock::Clock;
use crate::utils::day::{AttendanceDay, DayRange, current_day, current_year_month};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Rows of today's attendance shown on the dashboard.
const RECENT_LIMIT: u32 = 10;

#[derive(Serialize, ToSchema)]
pub struct AdminStatsResponse {
    #[schema(example = 12)]
    pub total_employees: i64,
    pub today_stats: StatusCounts,
    pub monthly_stats: StatusCounts,
    pub recent_attendance: Vec<AttendanceWithUser>,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceHistoryQuery {
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
    /// defaults to the current year
    pub year: Option<i32>,
    /// PRESENT, LEAVE or SICK; other values are ignored
    pub status: Option<String>,
    /// YYYY-MM-DD; takes precedence over month/year
    pub date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceHistoryResponse {
    pub attendances: Vec<AttendanceWithUser>,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

/// Dashboard numbers for today and the current month
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Attendance statistics", body = AdminStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn stats(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let ym = current_year_month(clock.get_ref());
    let today = DayRange::single(current_day(clock.get_ref()));

    let internal = |e: crate::store::StoreError| {
        tracing::error!(error = %e, "Failed to compute admin stats");
        internal_error()
    };

    let total_employees = store.count_employees().await.map_err(internal)?;
    let today_stats = store.count_by_status(today).await.map_err(internal)?;
    let monthly_stats = store
        .count_by_status(DayRange::month(ym))
        .await
        .map_err(internal)?;
    let recent_attendance = store
        .list_attendance(AttendanceFilter {
            range: today,
            status: None,
            limit: Some(RECENT_LIMIT),
        })
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(AdminStatsResponse {
        total_employees,
        today_stats,
        monthly_stats,
        recent_attendance,
        month: ym.month(),
        year: ym.year(),
    }))
}

/// Attendance history across all employees
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(AttendanceHistoryQuery),
    responses(
        (status = 200, description = "Attendance records with their owners", body = AttendanceHistoryResponse),
        (status = 400, description = "Invalid month, year or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn attendance_history(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<AttendanceHistoryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // `date` wins over month/year, which are then not validated
    let (range, ym) = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => match AttendanceDay::parse(raw) {
            Some(day) => (DayRange::single(day), day.year_month()),
            None => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Invalid date, expected YYYY-MM-DD"
                })));
            }
        },
        None => match resolve_month(query.month, query.year, clock.get_ref()) {
            Some(ym) => (DayRange::month(ym), ym),
            None => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Invalid month or year"
                })));
            }
        },
    };

    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<AttendanceStatus>().ok());

    let attendances = store
        .list_attendance(AttendanceFilter {
            range,
            status,
            limit: None,
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list attendance history");
            internal_error()
        })?;

    Ok(HttpResponse::Ok().json(AttendanceHistoryResponse {
        attendances,
        month: ym.month(),
        year: ym.year(),
    }))
}
