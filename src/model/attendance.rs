use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::utils::day::AttendanceDay;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, AsRefStr, Display, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Leave,
    Sick,
}

impl AttendanceStatus {
    /// Leave and sick days must say why.
    pub fn requires_note(self) -> bool {
        matches!(self, AttendanceStatus::Leave | AttendanceStatus::Sick)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 2,
    "day": "2026-01-05",
    "status": "PRESENT",
    "note": null,
    "photo": "/uploads/2-1767571200000-9f0c.jpg",
    "submitted_at": "2026-01-05T01:12:00Z"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub day: AttendanceDay,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub photo: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub submitted_at: DateTime<Utc>,
}

/// A record joined with the submitting user, for admin listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceWithUser {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub user: AttendanceUser,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceUser {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
}

pub struct NewAttendance {
    pub user_id: u64,
    pub day: AttendanceDay,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub photo: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Row shape shared by the attendance queries.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    pub day: NaiveDate,
    pub status: String,
    pub note: Option<String>,
    pub photo: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = strum::ParseError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id,
            day: AttendanceDay::from_date(row.day),
            status: row.status.parse()?,
            note: row.note,
            photo: row.photo,
            submitted_at: row.submitted_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub present: i64,
    pub leave: i64,
    pub sick: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus, count: i64) {
        match status {
            AttendanceStatus::Present => self.present += count,
            AttendanceStatus::Leave => self.leave += count,
            AttendanceStatus::Sick => self.sick += count,
        }
    }

    pub fn tally<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.add(record.status, 1);
        }
        counts
    }
}
