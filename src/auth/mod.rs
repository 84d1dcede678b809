//! Users, permissions and grant routing.
//! Credential checking lives outside this crate; here we only carry the caller's
//! identity and route permission mutations to the task that owns the metadata.

mod context;
mod grant;
mod permissions;
mod router;

pub use context::{Principal, UserContext, ADMIN_ROLE};
pub use grant::apply_grant;
pub use permissions::{AuthMetadata, GrantScope, Permissions, TablePermissions, User};
pub use router::{AuthView, PermissionGrantRouter};
