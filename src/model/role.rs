use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Stored as `ADMIN` / `USER`, carried in token claims as the numeric id.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, AsRefStr, Display, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::User),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::User => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn id_and_string_forms() {
        assert_eq!(Role::from_id(Role::Admin.id()), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::User));
        assert_eq!(Role::from_id(9), None);
        assert_eq!(Role::Admin.as_ref(), "ADMIN");
        assert_eq!(Role::from_str("USER").unwrap(), Role::User);
    }
}
