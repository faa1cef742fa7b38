use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceFilter, Store, StoreError};
use crate::model::attendance::{
    AttendanceRecord, AttendanceRow, AttendanceUser, AttendanceWithUser, NewAttendance, StatusCounts,
};
use crate::model::role::Role;
use crate::model::user::{Employee, EmployeeChanges, NewUser, User, UserRow};
use crate::utils::day::{AttendanceDay, DayRange};

const EMPLOYEE_COLUMNS: &str = "id, name, email, position, created_at";
const ATTENDANCE_COLUMNS: &str = "a.id, a.user_id, a.day, a.status, a.note, a.photo, a.submitted_at";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = ? AND role = ?", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .bind(Role::User.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }
}

/// Unique-key violations become `Duplicate`, a missing referenced user
/// `NotFound`; everything else stays a database error.
fn map_write_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate;
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound;
        }
    }
    StoreError::Database(e)
}

#[derive(sqlx::FromRow)]
struct AttendanceUserRow {
    #[sqlx(flatten)]
    record: AttendanceRow,
    name: String,
    email: String,
    position: Option<String>,
}

#[async_trait]
impl Store for MySqlStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn admin_exists(&self) -> Result<bool, StoreError> {
        let admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(Role::Admin.as_ref())
            .fetch_one(&self.pool)
            .await?;
        Ok(admins > 0)
    }

    async fn create_user(&self, user: NewUser) -> Result<Employee, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password, role, position, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_ref())
        .bind(&user.position)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(Employee {
            id: result.last_insert_id(),
            name: user.name,
            email: user.email,
            position: user.position,
            created_at: user.created_at,
        })
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users WHERE role = ? ORDER BY name ASC",
            EMPLOYEE_COLUMNS
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(Role::User.as_ref())
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn count_employees(&self) -> Result<i64, StoreError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(Role::User.as_ref())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> Result<Employee, StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, position = ?
            WHERE id = ? AND role = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.position)
        .bind(id)
        .bind(Role::User.as_ref())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        // MySQL reports zero affected rows for a no-op update, so re-read instead
        self.fetch_employee(id).await?.ok_or(StoreError::NotFound)
    }

    async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role = ?")
            .bind(id)
            .bind(Role::User.as_ref())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_password(&self, id: u64, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ? AND role = ?")
            .bind(password_hash)
            .bind(id)
            .bind(Role::User.as_ref())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, day, status, note, photo, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attendance.user_id)
        .bind(attendance.day.date())
        .bind(attendance.status.as_ref())
        .bind(&attendance.note)
        .bind(&attendance.photo)
        .bind(attendance.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            user_id: attendance.user_id,
            day: attendance.day,
            status: attendance.status,
            note: attendance.note,
            photo: attendance.photo,
            submitted_at: attendance.submitted_at,
        })
    }

    async fn find_attendance(&self, user_id: u64, day: AttendanceDay) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM attendance a WHERE a.user_id = ? AND a.day = ?",
            ATTENDANCE_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(day.date())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AttendanceRecord::try_from).transpose()?)
    }

    async fn list_user_attendance(&self, user_id: u64, range: DayRange) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM attendance a
            WHERE a.user_id = ? AND a.day BETWEEN ? AND ?
            ORDER BY a.day DESC
            "#,
            ATTENDANCE_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(range.from.date())
            .bind(range.to.date())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| AttendanceRecord::try_from(row).map_err(StoreError::from))
            .collect()
    }

    async fn list_attendance(&self, filter: AttendanceFilter) -> Result<Vec<AttendanceWithUser>, StoreError> {
        let mut where_sql = String::from(" WHERE a.day BETWEEN ? AND ?");
        if filter.status.is_some() {
            where_sql.push_str(" AND a.status = ?");
        }
        let limit_sql = if filter.limit.is_some() { " LIMIT ?" } else { "" };

        let sql = format!(
            r#"
            SELECT {}, u.name, u.email, u.position
            FROM attendance a
            JOIN users u ON u.id = a.user_id
            {}
            ORDER BY a.day DESC, a.submitted_at DESC
            {}
            "#,
            ATTENDANCE_COLUMNS, where_sql, limit_sql
        );
        debug!(sql = %sql, ?filter, "Listing attendance");

        let mut query = sqlx::query_as::<_, AttendanceUserRow>(&sql)
            .bind(filter.range.from.date())
            .bind(filter.range.to.date());
        if let Some(status) = &filter.status {
            query = query.bind(status.as_ref());
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| -> Result<AttendanceWithUser, StoreError> {
                Ok(AttendanceWithUser {
                    record: AttendanceRecord::try_from(row.record)?,
                    user: AttendanceUser {
                        name: row.name,
                        email: row.email,
                        position: row.position,
                    },
                })
            })
            .collect()
    }

    async fn count_by_status(&self, range: DayRange) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM attendance
            WHERE day BETWEEN ? AND ?
            GROUP BY status
            "#,
        )
        .bind(range.from.date())
        .bind(range.to.date())
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.add(status.parse()?, count);
        }
        Ok(counts)
    }
}
