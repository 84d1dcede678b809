//! Construction and registration of the built-in system tables.

use std::sync::Arc;

use tracing::debug;

use super::auth_tables::{NameResolver, PermissionsBackend, UsersBackend};
use super::backend::TableBackend;
use super::memory::InMemoryBackend;
use super::registry::{BackendRegistry, Registration};
use crate::auth::AuthView;
use crate::config::CatalogSettings;
use crate::ident::{IdentifierFormat, TableName};

pub const USERS: &str = "users";
pub const PERMISSIONS: &str = "permissions";
pub const DEBUG_SCRATCH: &str = "_debug_scratch";

/// Keeps the built-in tables registered. Dropping it deregisters all of them.
pub struct SystemBackends {
    registrations: Vec<Registration>,
    scratch: Option<Arc<InMemoryBackend>>,
}

impl SystemBackends {
    pub fn install(
        registry: &Arc<BackendRegistry>,
        auth: AuthView,
        names: Arc<dyn NameResolver>,
        settings: &CatalogSettings,
    ) -> Self {
        let mut registrations = Vec::new();

        let [by_name, by_uuid] = IdentifierFormat::ALL.map(|format| -> Arc<dyn TableBackend> {
            Arc::new(PermissionsBackend::new(auth.clone(), format, Arc::clone(&names)))
        });
        registrations.push(registry.register(TableName::guarantee_valid(PERMISSIONS), by_name, by_uuid));

        registrations.push(registry.register_shared(TableName::guarantee_valid(USERS), Arc::new(UsersBackend::new(auth))));

        let scratch = if settings.debug_tables {
            let scratch = Arc::new(InMemoryBackend::new());
            registrations.push(registry.register_shared(TableName::guarantee_valid(DEBUG_SCRATCH), scratch.clone()));
            Some(scratch)
        } else {
            None
        };

        debug!(target: "syscat::catalog", count = registrations.len(), "built-in system tables installed");
        Self { registrations, scratch }
    }

    pub fn names(&self) -> Vec<&TableName> { self.registrations.iter().map(|r| r.name()).collect() }

    pub fn scratch(&self) -> Option<&Arc<InMemoryBackend>> { self.scratch.as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMetadata;
    use crate::catalog::auth_tables::StaticNames;

    fn install(debug_tables: bool) -> (Arc<BackendRegistry>, SystemBackends) {
        let registry = BackendRegistry::new();
        let settings = CatalogSettings { debug_tables, ..CatalogSettings::default() };
        let view = AuthView::fixed(AuthMetadata::with_admin("admin"));
        let backends = SystemBackends::install(&registry, view, Arc::new(StaticNames::new()), &settings);
        (registry, backends)
    }

    #[test]
    fn scratch_table_follows_setting() {
        let (registry, backends) = install(false);
        assert_eq!(registry.len(), 2);
        assert!(backends.scratch().is_none());

        let (registry, backends) = install(true);
        assert!(registry.contains(&TableName::guarantee_valid(DEBUG_SCRATCH)));
        assert!(backends.scratch().is_some());
        assert_eq!(backends.names().len(), 3);
    }

    #[test]
    fn dropping_backends_deregisters_everything() {
        let (registry, backends) = install(true);
        drop(backends);
        assert!(registry.is_empty());
    }
}
