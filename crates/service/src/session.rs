//! Resolved caller identity and the capability checks applied at the entry
//! of every protected operation. Handlers never test roles themselves.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

pub fn parse_role(raw: &str) -> Option<Role> {
    match raw {
        "user" => Some(Role::User),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}

/// An authenticated caller. Derived per request from the presented
/// credential; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Administrators satisfy every role requirement.
pub fn require_role(principal: &Principal, role: Role) -> Result<(), ServiceError> {
    if principal.role == role || principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("{} access required", role.as_str())))
    }
}

/// Ownership check: the caller must be exactly `user_id`. Admins get no
/// bypass here; favorites are personal records.
pub fn require_self(principal: &Principal, user_id: Uuid) -> Result<(), ServiceError> {
    if principal.user_id == user_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("callers may only manage their own records".into()))
    }
}

pub fn require_owner_or_admin(principal: &Principal, owner_id: Uuid) -> Result<(), ServiceError> {
    if principal.is_admin() || principal.user_id == owner_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("only the owner or an administrator may do this".into()))
    }
}
