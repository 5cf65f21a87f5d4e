use stockmaster_auth::{LocationScope, Principal, Role};
use stockmaster_core::UserId;

/// Principal context for a request (authenticated identity + scope).
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    role: Role,
    scope: LocationScope,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: Role, scope: LocationScope) -> Self {
        Self {
            user_id,
            role,
            scope,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn scope(&self) -> &LocationScope {
        &self.scope
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
            scope: self.scope.clone(),
        }
    }
}
