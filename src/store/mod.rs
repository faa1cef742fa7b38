use async_trait::async_trait;
use thiserror::Error;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceWithUser, NewAttendance, StatusCounts};
use crate::model::user::{Employee, EmployeeChanges, NewUser, User};
use crate::utils::day::{AttendanceDay, DayRange};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate entry")]
    Duplicate,
    #[error("not found")]
    NotFound,
    #[error("row could not be decoded: {0}")]
    Decode(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<strum::ParseError> for StoreError {
    fn from(e: strum::ParseError) -> Self {
        StoreError::Decode(e.to_string())
    }
}

/// Filter for attendance listings.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceFilter {
    pub range: DayRange,
    pub status: Option<AttendanceStatus>,
    pub limit: Option<u32>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn admin_exists(&self) -> Result<bool, StoreError>;

    /// Fails with `Duplicate` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<Employee, StoreError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn count_employees(&self) -> Result<i64, StoreError>;

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> Result<Employee, StoreError>;

    /// Removes the account together with its attendance records.
    async fn delete_employee(&self, id: u64) -> Result<(), StoreError>;

    async fn set_password(&self, id: u64, password_hash: &str) -> Result<(), StoreError>;

    /// Fails with `Duplicate` when the user already has a record for that day
    /// and with `NotFound` when the user no longer exists.
    async fn insert_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord, StoreError>;

    async fn find_attendance(&self, user_id: u64, day: AttendanceDay) -> Result<Option<AttendanceRecord>, StoreError>;

    async fn list_user_attendance(&self, user_id: u64, range: DayRange) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn list_attendance(&self, filter: AttendanceFilter) -> Result<Vec<AttendanceWithUser>, StoreError>;

    async fn count_by_status(&self, range: DayRange) -> Result<StatusCounts, StoreError>;
}
