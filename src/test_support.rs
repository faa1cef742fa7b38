//! Shared fixtures for handler tests: an app wired to an in-memory store
//! and a pinned clock, plus store wrappers that misbehave on purpose.

use crate::auth::jwt::generate_access_token;
use crate::config::Config;
use crate::model::attendance::{AttendanceRecord, AttendanceWithUser, NewAttendance, StatusCounts};
use crate::model::role::Role;
use crate::model::user::{Employee, EmployeeChanges, NewUser, User};
use crate::routes;
use crate::store::memory::MemoryStore;
use crate::store::{AttendanceFilter, Store, StoreError};
use crate::utils::day::{AttendanceDay, DayRange};
use crate::utils::clock::{Clock, FixedClock};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestUser {
    pub id: u64,
    pub token: String,
}

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    /// What the app talks to; `store` unless replaced with `with_backend`.
    backend: Arc<dyn Store>,
    pub clock: Arc<FixedClock>,
    pub config: Config,
    pub uploads: TempDir,
}

impl TestEnv {
    pub fn new(now: &str) -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");
        let config = Config::for_tests(&uploads.path().to_string_lossy());
        let store = Arc::new(MemoryStore::default());
        Self {
            backend: store.clone(),
            store,
            clock: Arc::new(FixedClock::at(now)),
            config,
            uploads,
        }
    }

    /// Serves requests from `wrap(store)` instead of the plain memory store.
    /// Accounts are still created directly in `store`.
    pub fn with_backend(mut self, wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn Store>) -> Self {
        self.backend = wrap(self.store.clone());
        self
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let store = self.backend.clone();
        let clock: Arc<dyn Clock> = self.clock.clone();
        let config = self.config.clone();
        App::new()
            .app_data(web::Data::from(store))
            .app_data(web::Data::from(clock))
            .app_data(web::Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    }

    pub async fn user(&self, email: &str) -> TestUser {
        self.account(email, Role::User).await
    }

    pub async fn admin(&self, email: &str) -> TestUser {
        self.account(email, Role::Admin).await
    }

    async fn account(&self, email: &str, role: Role) -> TestUser {
        let local = email.split('@').next().unwrap_or(email);
        let mut chars = local.chars();
        let name: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };

        let employee = self
            .store
            .create_user(NewUser {
                name: name.clone(),
                email: email.to_string(),
                // never verified; login tests set a real password first
                password_hash: "unset".to_string(),
                role,
                position: None,
                created_at: self.clock.now(),
            })
            .await
            .expect("create test account");

        let token = generate_access_token(
            employee.id,
            email.to_string(),
            name,
            role.id(),
            &self.config.jwt_secret,
            self.config.access_token_ttl,
        )
        .expect("sign test token");

        TestUser {
            id: employee.id,
            token,
        }
    }

    /// Sets the URI and a peer address; the rate limiter keys on the peer IP.
    pub fn request(&self, req: test::TestRequest, uri: &str) -> test::TestRequest {
        let peer: SocketAddr = "127.0.0.1:40000".parse().expect("socket addr");
        req.uri(uri).peer_addr(peer)
    }

    fn authorized(&self, req: test::TestRequest, uri: &str, user: &TestUser) -> test::TestRequest {
        self.request(req, uri)
            .insert_header(("Authorization", format!("Bearer {}", user.token)))
    }

    pub fn get(&self, uri: &str, user: &TestUser) -> test::TestRequest {
        self.authorized(test::TestRequest::get(), uri, user)
    }

    pub fn post(&self, uri: &str, user: &TestUser) -> test::TestRequest {
        self.authorized(test::TestRequest::post(), uri, user)
    }

    pub fn put(&self, uri: &str, user: &TestUser) -> test::TestRequest {
        self.authorized(test::TestRequest::put(), uri, user)
    }

    pub fn delete(&self, uri: &str, user: &TestUser) -> test::TestRequest {
        self.authorized(test::TestRequest::delete(), uri, user)
    }
}

/// Never sees an existing record for the day, so a second submission only
/// fails at insert time, as it would when two requests race.
pub struct StaleLookups(pub Arc<MemoryStore>);

#[async_trait]
impl Store for StaleLookups {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.0.find_user_by_email(email).await
    }

    async fn admin_exists(&self) -> Result<bool, StoreError> {
        self.0.admin_exists().await
    }

    async fn create_user(&self, user: NewUser) -> Result<Employee, StoreError> {
        self.0.create_user(user).await
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.0.list_employees().await
    }

    async fn count_employees(&self) -> Result<i64, StoreError> {
        self.0.count_employees().await
    }

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> Result<Employee, StoreError> {
        self.0.update_employee(id, changes).await
    }

    async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
        self.0.delete_employee(id).await
    }

    async fn set_password(&self, id: u64, password_hash: &str) -> Result<(), StoreError> {
        self.0.set_password(id, password_hash).await
    }

    async fn insert_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        self.0.insert_attendance(attendance).await
    }

    async fn find_attendance(&self, _user_id: u64, _day: AttendanceDay) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(None)
    }

    async fn list_user_attendance(&self, user_id: u64, range: DayRange) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.0.list_user_attendance(user_id, range).await
    }

    async fn list_attendance(&self, filter: AttendanceFilter) -> Result<Vec<AttendanceWithUser>, StoreError> {
        self.0.list_attendance(filter).await
    }

    async fn count_by_status(&self, range: DayRange) -> Result<StatusCounts, StoreError> {
        self.0.count_by_status(range).await
    }
}

/// Fails every call.
pub struct BrokenStore;

fn broken<T>() -> Result<T, StoreError> {
    Err(StoreError::Decode("store offline".to_string()))
}

#[async_trait]
impl Store for BrokenStore {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        broken()
    }

    async fn admin_exists(&self) -> Result<bool, StoreError> {
        broken()
    }

    async fn create_user(&self, _user: NewUser) -> Result<Employee, StoreError> {
        broken()
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        broken()
    }

    async fn count_employees(&self) -> Result<i64, StoreError> {
        broken()
    }

    async fn update_employee(&self, _id: u64, _changes: EmployeeChanges) -> Result<Employee, StoreError> {
        broken()
    }

    async fn delete_employee(&self, _id: u64) -> Result<(), StoreError> {
        broken()
    }

    async fn set_password(&self, _id: u64, _password_hash: &str) -> Result<(), StoreError> {
        broken()
    }

    async fn insert_attendance(&self, _attendance: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        broken()
    }

    async fn find_attendance(&self, _user_id: u64, _day: AttendanceDay) -> Result<Option<AttendanceRecord>, StoreError> {
        broken()
    }

    async fn list_user_attendance(&self, _user_id: u64, _range: DayRange) -> Result<Vec<AttendanceRecord>, StoreError> {
        broken()
    }

    async fn list_attendance(&self, _filter: AttendanceFilter) -> Result<Vec<AttendanceWithUser>, StoreError> {
        broken()
    }

    async fn count_by_status(&self, _range: DayRange) -> Result<StatusCounts, StoreError> {
        broken()
    }
}
