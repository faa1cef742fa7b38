//! In-process `Store` for handler tests. Enforces the same unique keys as
//! the MySQL schema.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{AttendanceFilter, Store, StoreError};
use crate::model::attendance::{
    AttendanceRecord, AttendanceUser, AttendanceWithUser, NewAttendance, StatusCounts,
};
use crate::model::role::Role;
use crate::model::user::{Employee, EmployeeChanges, NewUser, User};
use crate::utils::day::{AttendanceDay, DayRange};

struct StoredUser {
    user: User,
    position: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl StoredUser {
    fn employee(&self) -> Employee {
        Employee {
            id: self.user.id,
            name: self.user.name.clone(),
            email: self.user.email.clone(),
            position: self.position.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Default)]
struct Inner {
    users: Vec<StoredUser>,
    attendance: Vec<AttendanceRecord>,
    next_user_id: u64,
    next_attendance_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    pub fn attendance_count(&self) -> usize {
        self.lock().attendance.len()
    }
}

fn is_employee(stored: &StoredUser, id: u64) -> bool {
    stored.user.id == id && stored.user.role == Role::User
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.clone()))
    }

    async fn admin_exists(&self) -> Result<bool, StoreError> {
        Ok(self.lock().users.iter().any(|u| u.user.role == Role::Admin))
    }

    async fn create_user(&self, user: NewUser) -> Result<Employee, StoreError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.user.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        inner.next_user_id += 1;
        let stored = StoredUser {
            user: User {
                id: inner.next_user_id,
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
            },
            position: user.position,
            created_at: user.created_at,
        };
        let employee = stored.employee();
        inner.users.push(stored);
        Ok(employee)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> = self
            .lock()
            .users
            .iter()
            .filter(|u| u.user.role == Role::User)
            .map(StoredUser::employee)
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn count_employees(&self) -> Result<i64, StoreError> {
        Ok(self.lock().users.iter().filter(|u| u.user.role == Role::User).count() as i64)
    }

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> Result<Employee, StoreError> {
        let mut inner = self.lock();
        if !inner.users.iter().any(|u| is_employee(u, id)) {
            return Err(StoreError::NotFound);
        }
        if inner
            .users
            .iter()
            .any(|u| u.user.email == changes.email && u.user.id != id)
        {
            return Err(StoreError::Duplicate);
        }
        let stored = inner
            .users
            .iter_mut()
            .find(|u| is_employee(u, id))
            .ok_or(StoreError::NotFound)?;
        stored.user.name = changes.name;
        stored.user.email = changes.email;
        stored.position = changes.position;
        Ok(stored.employee())
    }

    async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let before = inner.users.len();
        inner.users.retain(|u| !is_employee(u, id));
        if inner.users.len() == before {
            return Err(StoreError::NotFound);
        }
        inner.attendance.retain(|a| a.user_id != id);
        Ok(())
    }

    async fn set_password(&self, id: u64, password_hash: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let stored = inner
            .users
            .iter_mut()
            .find(|u| is_employee(u, id))
            .ok_or(StoreError::NotFound)?;
        stored.user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn insert_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let mut inner = self.lock();
        // foreign key on users.id
        if !inner.users.iter().any(|u| u.user.id == attendance.user_id) {
            return Err(StoreError::NotFound);
        }
        if inner
            .attendance
            .iter()
            .any(|a| a.user_id == attendance.user_id && a.day == attendance.day)
        {
            return Err(StoreError::Duplicate);
        }
        inner.next_attendance_id += 1;
        let record = AttendanceRecord {
            id: inner.next_attendance_id,
            user_id: attendance.user_id,
            day: attendance.day,
            status: attendance.status,
            note: attendance.note,
            photo: attendance.photo,
            submitted_at: attendance.submitted_at,
        };
        inner.attendance.push(record.clone());
        Ok(record)
    }

    async fn find_attendance(&self, user_id: u64, day: AttendanceDay) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self
            .lock()
            .attendance
            .iter()
            .find(|a| a.user_id == user_id && a.day == day)
            .cloned())
    }

    async fn list_user_attendance(&self, user_id: u64, range: DayRange) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<AttendanceRecord> = self
            .lock()
            .attendance
            .iter()
            .filter(|a| a.user_id == user_id && range.contains(a.day))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(records)
    }

    async fn list_attendance(&self, filter: AttendanceFilter) -> Result<Vec<AttendanceWithUser>, StoreError> {
        let inner = self.lock();
        let mut rows: Vec<AttendanceWithUser> = inner
            .attendance
            .iter()
            .filter(|a| filter.range.contains(a.day))
            .filter(|a| filter.status.is_none_or(|s| s == a.status))
            .filter_map(|a| {
                let owner = inner.users.iter().find(|u| u.user.id == a.user_id)?;
                Some(AttendanceWithUser {
                    record: a.clone(),
                    user: AttendanceUser {
                        name: owner.user.name.clone(),
                        email: owner.user.email.clone(),
                        position: owner.position.clone(),
                    },
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .day
                .cmp(&a.record.day)
                .then(b.record.submitted_at.cmp(&a.record.submitted_at))
        });
        if let Some(limit) = filter.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn count_by_status(&self, range: DayRange) -> Result<StatusCounts, StoreError> {
        let inner = self.lock();
        Ok(StatusCounts::tally(
            inner.attendance.iter().filter(|a| range.contains(a.day)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use chrono::{TimeZone, Utc};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Budi".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            position: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn present(user_id: u64, day: &str) -> NewAttendance {
        NewAttendance {
            user_id,
            day: AttendanceDay::parse(day).unwrap(),
            status: AttendanceStatus::Present,
            note: None,
            photo: None,
            submitted_at: Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap(),
        }
    }

    #[actix_web::test]
    async fn one_record_per_user_and_day() {
        let store = MemoryStore::default();
        let budi = store.create_user(new_user("budi@company.com")).await.unwrap();
        let sari = store.create_user(new_user("sari@company.com")).await.unwrap();

        store.insert_attendance(present(budi.id, "2024-03-10")).await.unwrap();
        let second = store.insert_attendance(present(budi.id, "2024-03-10")).await;
        assert!(matches!(second, Err(StoreError::Duplicate)));

        store.insert_attendance(present(budi.id, "2024-03-11")).await.unwrap();
        store.insert_attendance(present(sari.id, "2024-03-10")).await.unwrap();
        assert_eq!(store.attendance_count(), 3);
    }

    #[actix_web::test]
    async fn attendance_needs_an_existing_user() {
        let store = MemoryStore::default();
        let missing = store.insert_attendance(present(42, "2024-03-10")).await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
        assert_eq!(store.attendance_count(), 0);
    }

    #[actix_web::test]
    async fn unknown_employee_wins_over_taken_email() {
        let store = MemoryStore::default();
        store.create_user(new_user("budi@company.com")).await.unwrap();

        let changes = EmployeeChanges {
            name: "Ghost".to_string(),
            email: "budi@company.com".to_string(),
            position: None,
        };
        let result = store.update_employee(42, changes).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
