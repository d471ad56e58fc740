use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::invalid(format!("unknown role '{other}'"))),
        }
    }
}

/// The authenticated caller of a single request.
///
/// Built by the HTTP layer from the bearer token and handed to every
/// workflow and admin operation; nothing reads identity from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i32,
    pub role: Role,
}

impl RequestContext {
    pub fn customer(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}
