//! The grant algorithm shared by every scope.
//! The payload is validated in full before the user record is touched, so a failed
//! grant leaves the metadata unchanged.

use serde_json::{json, Value};

use super::context::UserContext;
use super::permissions::{AuthMetadata, GrantScope, Permissions};
use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Change {
    #[default]
    Keep,
    Set(bool),
    Clear,
}

impl Change {
    fn apply(self, current: Option<bool>) -> Option<bool> {
        match self {
            Change::Keep => current,
            Change::Set(b) => Some(b),
            Change::Clear => None,
        }
    }
}

#[derive(Debug, Default)]
struct PermissionsUpdate {
    read: Change,
    write: Change,
    config: Change,
    connect: Change,
}

impl PermissionsUpdate {
    fn parse(payload: &Value, scope: GrantScope) -> AdminResult<Self> {
        let obj = payload
            .as_object()
            .ok_or_else(|| AdminError::invalid(format!("Expected an object of permissions, got {}.", payload)))?;
        let mut update = PermissionsUpdate::default();
        let mut unexpected: Vec<&str> = Vec::new();
        for (key, value) in obj {
            let slot = match key.as_str() {
                "read" => &mut update.read,
                "write" => &mut update.write,
                "config" => &mut update.config,
                "connect" if scope == GrantScope::Global => &mut update.connect,
                "connect" => {
                    return Err(AdminError::invalid("The `connect` permission is only valid at the global scope."));
                }
                other => {
                    unexpected.push(other);
                    continue;
                }
            };
            *slot = match value {
                Value::Bool(b) => Change::Set(*b),
                Value::Null => Change::Clear,
                other => {
                    return Err(AdminError::invalid(format!("Expected a boolean or null for `{}`, got {}.", key, other)));
                }
            };
        }
        if !unexpected.is_empty() {
            return Err(AdminError::invalid(format!("Unexpected key(s) `{}`.", unexpected.join("`, `"))));
        }
        Ok(update)
    }

    fn apply(&self, p: Permissions) -> Permissions {
        Permissions {
            read: self.read.apply(p.read),
            write: self.write.apply(p.write),
            config: self.config.apply(p.config),
            connect: self.connect.apply(p.connect),
        }
    }
}

/// Apply `payload` to `username`'s permissions at `scope`, returning the change summary
/// `{"granted": 1, "permissions_changes": [{"old_val", "new_val"}]}`.
pub fn apply_grant(
    meta: &mut AuthMetadata,
    ctx: &UserContext,
    username: &str,
    scope: GrantScope,
    payload: &Value,
) -> AdminResult<Value> {
    if !ctx.has_admin(&meta.admin_user) {
        return Err(AdminError::unauthorized(format!("Only the `{}` user may grant permissions.", meta.admin_user)));
    }
    if username == meta.admin_user {
        return Err(AdminError::rejected(format!("The permissions of the user `{}` can't be modified.", username)));
    }
    let update = PermissionsUpdate::parse(payload, scope)?;
    let user = meta
        .users
        .get_mut(username)
        .ok_or_else(|| AdminError::not_found(format!("User `{}` not found.", username)))?;

    let old = user.permissions(scope);
    let new = update.apply(old);
    user.set_permissions(scope, new);

    Ok(json!({
        "granted": 1,
        "permissions_changes": [{ "old_val": old.to_datum(), "new_val": new.to_datum() }],
    }))
}
