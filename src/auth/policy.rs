use super::{ResourceDescriptor, Role, SessionClaims};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    RoleGranted,
    OwnerGranted,
    RoleRequired(Role),
    NotOwner,
}

/// Outcome of a policy check. Depends only on the claims and the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allow: bool,
    pub reason: DecisionReason,
}

impl AccessDecision {
    fn allow(reason: DecisionReason) -> Self {
        Self { allow: true, reason }
    }

    fn deny(reason: DecisionReason) -> Self {
        Self { allow: false, reason }
    }
}

pub fn decide_role(claims: &SessionClaims, role: Role) -> AccessDecision {
    if claims.role == role {
        AccessDecision::allow(DecisionReason::RoleGranted)
    } else {
        AccessDecision::deny(DecisionReason::RoleRequired(role))
    }
}

/// The role wins over ownership when both hold.
pub fn decide_owner_or_role(claims: &SessionClaims, resource: &ResourceDescriptor, role: Role) -> AccessDecision {
    if claims.role == role {
        AccessDecision::allow(DecisionReason::RoleGranted)
    } else if claims.subject == resource.owner {
        AccessDecision::allow(DecisionReason::OwnerGranted)
    } else {
        AccessDecision::deny(DecisionReason::NotOwner)
    }
}

pub fn require_role(claims: &SessionClaims, role: Role) -> Result<AccessDecision, ApiError> {
    enforce(claims, decide_role(claims, role))
}

pub fn require_owner_or_role(
    claims: &SessionClaims,
    resource: &ResourceDescriptor,
    role: Role,
) -> Result<AccessDecision, ApiError> {
    enforce(claims, decide_owner_or_role(claims, resource, role))
}

fn enforce(claims: &SessionClaims, decision: AccessDecision) -> Result<AccessDecision, ApiError> {
    if decision.allow {
        return Ok(decision);
    }

    tracing::debug!("Access denied for user {}: {:?}", claims.subject, decision.reason);
    let message = match decision.reason {
        DecisionReason::RoleRequired(Role::Admin) => "Acceso denegado. Se requieren permisos de administrador",
        DecisionReason::RoleRequired(Role::User) => "Acceso denegado",
        _ => "No tienes permiso para acceder a este recurso",
    };
    Err(ApiError::forbidden(message))
}
