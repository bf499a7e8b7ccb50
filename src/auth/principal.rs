use crate::auth::policy::{policy_for, AccessPolicy, Action, Decision, Scope};
use crate::db::User;
use crate::error::AppError;

/// The authenticated user behind a request, plus the token it presented.
#[derive(Clone)]
pub struct Principal {
    pub user: User,
    pub token_id: String,
    policy: &'static dyn AccessPolicy,
}

impl Principal {
    pub fn new(user: User, token_id: String) -> Self {
        let policy = policy_for(user.role);
        Self { user, token_id, policy }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Scope the action may run over, or `Forbidden`.
    pub fn authorize(&self, action: Action) -> Result<Scope, AppError> {
        match self.policy.decide(&self.user, action) {
            Decision::Allow(scope) => Ok(scope),
            Decision::Deny => {
                tracing::warn!(user_id = %self.user.id, ?action, "action denied");
                Err(AppError::Forbidden)
            }
        }
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user.id)
            .field("role", &self.user.role)
            .finish()
    }
}
