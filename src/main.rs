use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use syscat::auth::{AuthMetadata, PermissionGrantRouter, UserContext};
use syscat::catalog::auth_tables::StaticNames;
use syscat::catalog::reserved;
use syscat::catalog::wiring::SystemBackends;
use syscat::catalog::{BackendRegistry, StreamEvaluator};
use syscat::cluster::ClusterInterface;
use syscat::config::CatalogSettings;
use syscat::CatalogDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = CatalogSettings::from_env();

    // RUST_LOG wins over SYSCAT_LOG
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.log_filter))?;
    fmt().with_env_filter(filter).init();

    info!(
        target: "syscat",
        "syscat starting: admin_user='{}', admin_mailbox={}, debug_tables={}",
        settings.admin_user, settings.admin_mailbox, settings.debug_tables
    );

    let (grants, admin_task) = PermissionGrantRouter::spawn(AuthMetadata::with_admin(&settings.admin_user), &settings);
    let registry = BackendRegistry::new();
    let backends = SystemBackends::install(&registry, grants.view(), Arc::new(StaticNames::new()), &settings);
    let dispatcher = CatalogDispatcher::new(Arc::clone(&registry), grants.clone(), Arc::new(StreamEvaluator));

    let ctx = UserContext::internal().with_request_id("startup");
    let cancel = CancellationToken::new();
    let db = reserved::database();
    for table in dispatcher.table_list(&ctx, &db, &cancel).await? {
        let docs = dispatcher.table_estimate_doc_counts(&ctx, &db, &table, &cancel).await?;
        info!(target: "syscat", "{}.{}: {:?} docs", reserved::NAME, table, docs);
    }
    info!(target: "syscat", "{} system tables registered ({} hidden)", registry.len(), registry.len() - registry.visible_names().len());

    drop(backends);
    grants.shutdown();
    admin_task.await?;
    Ok(())
}
