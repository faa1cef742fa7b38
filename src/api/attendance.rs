use crate::api::internal_error;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance, StatusCounts};
use crate::store::{Store, StoreError};
use crate::utils::clock::Clock;
use crate::utils::day::{DayRange, YearMonth, current_day, current_year_month};
use crate::utils::upload::{PUBLIC_PREFIX, is_safe_file_name};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SubmitAttendance {
    #[schema(example = "PRESENT")]
    /// One of PRESENT, LEAVE, SICK
    pub status: String,
    #[schema(example = "Family event", nullable = true)]
    /// Required for LEAVE and SICK
    pub note: Option<String>,
    #[schema(example = "/uploads/2-1767571200000-9f0c.jpg", nullable = true)]
    /// Path returned by the upload endpoint
    pub photo: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
    /// defaults to the current year
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct MyAttendanceResponse {
    pub attendances: Vec<AttendanceRecord>,
    pub today_attendance: Option<AttendanceRecord>,
    pub stats: StatusCounts,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Debug, PartialEq)]
pub struct ValidSubmission {
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub photo: Option<String>,
}

/// Fills missing month/year from the current civil month.
pub fn resolve_month(month: Option<u32>, year: Option<i32>, clock: &dyn Clock) -> Option<YearMonth> {
    let current = current_year_month(clock);
    YearMonth::new(
        year.unwrap_or(current.year()),
        month.unwrap_or(current.month()),
    )
}

pub fn validate_submission(payload: &SubmitAttendance) -> Result<ValidSubmission, &'static str> {
    let status: AttendanceStatus = payload
        .status
        .trim()
        .parse()
        .map_err(|_| "Invalid status. Allowed: PRESENT, LEAVE, SICK")?;

    let note = payload
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    if status.requires_note() && note.is_none() {
        return Err("A note is required for LEAVE and SICK");
    }

    let photo = payload
        .photo
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(photo) = photo {
        let stored_name = photo
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'));
        if !stored_name.is_some_and(is_safe_file_name) {
            return Err("Invalid photo reference");
        }
    }

    Ok(ValidSubmission {
        status,
        note,
        photo: photo.map(str::to_string),
    })
}

fn already_submitted() -> HttpResponse {
    HttpResponse::Conflict().json(serde_json::json!({
        "message": "Attendance already submitted today"
    }))
}

/// Own attendance for a month, with today's record and per-status counts
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(MonthQuery),
    responses(
        (status = 200, description = "Attendance for the month", body = MyAttendanceResponse),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.user_id;

    let Some(ym) = resolve_month(query.month, query.year, clock.get_ref()) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid month or year"
        })));
    };

    let month = DayRange::month(ym);
    let attendances = store
        .list_user_attendance(user_id, month)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to list attendance");
            internal_error()
        })?;

    let today = current_day(clock.get_ref());
    let today_attendance = if month.contains(today) {
        attendances.iter().find(|a| a.day == today).cloned()
    } else {
        store.find_attendance(user_id, today).await.map_err(|e| {
            tracing::error!(error = %e, user_id, %today, "Failed to fetch today's attendance");
            internal_error()
        })?
    };

    let stats = StatusCounts::tally(&attendances);

    Ok(HttpResponse::Ok().json(MyAttendanceResponse {
        attendances,
        today_attendance,
        stats,
        month: ym.month(),
        year: ym.year(),
    }))
}

/// Submit today's attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SubmitAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = Object, example = json!({
            "message": "Attendance recorded",
            "attendance": {
                "id": 1,
                "user_id": 2,
                "day": "2026-01-05",
                "status": "PRESENT",
                "note": null,
                "photo": null,
                "submitted_at": "2026-01-05T01:12:00Z"
            }
        })),
        (status = 400, description = "Invalid submission", body = Object, example = json!({
            "message": "A note is required for LEAVE and SICK"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists"),
        (status = 409, description = "Already submitted today", body = Object, example = json!({
            "message": "Attendance already submitted today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<SubmitAttendance>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.user_id;

    let submission = match validate_submission(&payload) {
        Ok(s) => s,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": message
            })));
        }
    };

    let today = current_day(clock.get_ref());

    let existing = store.find_attendance(user_id, today).await.map_err(|e| {
        tracing::error!(error = %e, user_id, %today, "Failed to check today's attendance");
        internal_error()
    })?;
    if existing.is_some() {
        return Ok(already_submitted());
    }

    let result = store
        .insert_attendance(NewAttendance {
            user_id,
            day: today,
            status: submission.status,
            note: submission.note,
            photo: submission.photo,
            submitted_at: clock.now(),
        })
        .await;

    match result {
        Ok(record) => {
            tracing::info!(
                user_id,
                email = %auth.email,
                %today,
                boundary = %today.boundary(),
                status = %record.status,
                "Attendance recorded"
            );
            Ok(HttpResponse::Created().json(serde_json::json!({
                "message": "Attendance recorded",
                "attendance": record
            })))
        }

        // Lost a race with a concurrent submission for the same day
        Err(StoreError::Duplicate) => Ok(already_submitted()),

        // Account deleted while its token is still valid
        Err(StoreError::NotFound) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Account not found"
        }))),

        Err(e) => {
            tracing::error!(error = %e, user_id, %today, "Attendance submission failed");
            Err(internal_error())
        }
    }
}
