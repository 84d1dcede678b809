use serde::{Deserialize, Serialize};

/// Role that grants administrative rights regardless of the user name.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Caller identity passed through every cluster-interface call. Credentials are
/// verified elsewhere; this only carries the outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserContext {
    pub principal: Option<Principal>,
    #[serde(default)]
    pub request_id: Option<String>,
    /// Calls issued by the server itself (wiring, background jobs).
    #[serde(default)]
    pub internal: bool,
}

impl UserContext {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            principal: Some(Principal { user_id: user_id.into(), roles: Vec::new() }),
            ..Self::default()
        }
    }

    pub fn internal() -> Self { Self { internal: true, ..Self::default() } }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        if let Some(p) = self.principal.as_mut() { p.roles.push(role.into()); }
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn user_id(&self) -> Option<&str> { self.principal.as_ref().map(|p| p.user_id.as_str()) }

    pub fn has_admin(&self, admin_user: &str) -> bool {
        if self.internal { return true; }
        match &self.principal {
            Some(p) => p.user_id == admin_user || p.roles.iter().any(|r| r == ADMIN_ROLE),
            None => false,
        }
    }
}
