use crate::auth::password::{MIN_PASSWORD_LEN, hash_password};
use crate::config::Config;
use crate::model::role::Role;
use crate::model::user::{NewUser, normalize_email};
use crate::store::{Store, StoreError};
use crate::utils::clock::Clock;
use anyhow::{Result, anyhow, bail};
use tracing::info;

/// Creates the first admin from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when no admin
/// exists yet. Returns whether an account was created.
pub async fn ensure_admin(store: &dyn Store, clock: &dyn Clock, config: &Config) -> Result<bool> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(false);
    };

    if store.admin_exists().await? {
        return Ok(false);
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("ADMIN_PASSWORD must be at least {MIN_PASSWORD_LEN} characters");
    }

    let password_hash = hash_password(password).map_err(|e| anyhow!("hash admin password: {e}"))?;

    let result = store
        .create_user(NewUser {
            name: config.admin_name.clone(),
            email: normalize_email(email),
            password_hash,
            role: Role::Admin,
            position: None,
            created_at: clock.now(),
        })
        .await;

    match result {
        Ok(admin) => {
            info!(admin_id = admin.id, email = %admin.email, "Admin account created");
            Ok(true)
        }
        Err(StoreError::Duplicate) => bail!("ADMIN_EMAIL is already used by a non-admin account"),
        Err(e) => Err(e.into()),
    }
}
