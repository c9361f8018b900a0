pub mod password;
pub mod policy;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use policy::{require_owner_or_role, require_role, AccessDecision, DecisionReason};
pub use token::{AuthError, IssuedToken, TokenService};

/// Account role. Stored and signed as `usuario` / `admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "usuario", alias = "user")]
    User,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "usuario",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity extracted from a verified token. Only [`TokenService::verify`]
/// produces one; handlers receive it from request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject: i64,
    pub email: String,
    pub role: Role,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The owner of a resource, for ownership-gated access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub owner: i64,
}

impl ResourceDescriptor {
    pub fn owned_by(owner: i64) -> Self {
        Self { owner }
    }
}
