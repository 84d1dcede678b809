//! Permission grant routing onto the administration task.
//!
//! `AuthMetadata` is owned by a single tokio task. Callers send a request over a bounded
//! queue and wait for the reply on a oneshot channel. Each request carries a token
//! derived from the caller's: it fires when the caller cancels, and the caller side also
//! fires it when the hand-off to the task fails in either direction. The task never
//! applies a request whose token has already fired.
//!
//! Successful mutations are published through a `watch` channel so readers (the
//! `users` and `permissions` system tables) always see a committed snapshot.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context::UserContext;
use super::grant::apply_grant;
use super::permissions::{AuthMetadata, GrantScope};
use crate::config::CatalogSettings;
use crate::error::{AdminError, AdminResult};

struct GrantRequest {
    ctx: UserContext,
    username: String,
    scope: GrantScope,
    permissions: Value,
    cancel: CancellationToken,
    reply: oneshot::Sender<AdminResult<Value>>,
}

/// Read-only view of the latest committed auth metadata.
#[derive(Clone)]
pub struct AuthView {
    rx: watch::Receiver<Arc<AuthMetadata>>,
}

impl AuthView {
    pub fn snapshot(&self) -> Arc<AuthMetadata> { Arc::clone(&self.rx.borrow()) }

    /// A view over fixed metadata, for wiring and tests that don't need mutation.
    pub fn fixed(meta: AuthMetadata) -> Self {
        let (_tx, rx) = watch::channel(Arc::new(meta));
        Self { rx }
    }
}

#[derive(Clone)]
pub struct PermissionGrantRouter {
    tx: mpsc::Sender<GrantRequest>,
    view: AuthView,
    shutdown: CancellationToken,
}

impl PermissionGrantRouter {
    /// Start the administration task owning `initial`. Must be called inside a tokio
    /// runtime.
    pub fn spawn(initial: AuthMetadata, settings: &CatalogSettings) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(settings.admin_mailbox.max(1));
        let (publish, view_rx) = watch::channel(Arc::new(initial.clone()));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_admin_task(initial, rx, publish, shutdown.clone()));
        (Self { tx, view: AuthView { rx: view_rx }, shutdown }, handle)
    }

    pub fn view(&self) -> AuthView { self.view.clone() }

    /// Stop the administration task. Pending and later grants fail.
    pub fn shutdown(&self) { self.shutdown.cancel(); }

    pub async fn grant(
        &self,
        ctx: &UserContext,
        username: String,
        scope: GrantScope,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        let derived = cancel.child_token();
        let (reply, reply_rx) = oneshot::channel();
        let request = GrantRequest {
            ctx: ctx.clone(),
            username,
            scope,
            permissions,
            cancel: derived.clone(),
            reply,
        };

        let sent = tokio::select! {
            biased;
            _ = derived.cancelled() => return Err(AdminError::interrupted()),
            r = self.tx.send(request) => r,
        };
        if sent.is_err() {
            derived.cancel();
            warn!(target: "syscat::auth", scope = scope.label(), "administration task unavailable; grant not delivered");
            return Err(AdminError::cancelled("The administration task is not running."));
        }

        tokio::select! {
            biased;
            r = reply_rx => match r {
                Ok(outcome) => outcome,
                Err(_) => {
                    derived.cancel();
                    warn!(target: "syscat::auth", scope = scope.label(), "administration task dropped a grant request");
                    Err(AdminError::cancelled("The administration task stopped before completing the grant."))
                }
            },
            _ = derived.cancelled() => Err(AdminError::interrupted()),
        }
    }
}

async fn run_admin_task(
    mut state: AuthMetadata,
    mut rx: mpsc::Receiver<GrantRequest>,
    publish: watch::Sender<Arc<AuthMetadata>>,
    shutdown: CancellationToken,
) {
    debug!(target: "syscat::auth", "administration task started");
    loop {
        let req = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            req = rx.recv() => match req {
                Some(r) => r,
                None => break,
            },
        };
        if req.cancel.is_cancelled() {
            let _ = req.reply.send(Err(AdminError::interrupted()));
            continue;
        }
        let outcome = apply_grant(&mut state, &req.ctx, &req.username, req.scope, &req.permissions);
        match &outcome {
            Ok(_) => {
                publish.send_replace(Arc::new(state.clone()));
                info!(
                    target: "syscat::auth",
                    user = %req.username,
                    scope = req.scope.label(),
                    by = req.ctx.user_id().unwrap_or("<internal>"),
                    request = req.ctx.request_id.as_deref().unwrap_or("-"),
                    "permissions granted"
                );
            }
            Err(e) => debug!(
                target: "syscat::auth",
                user = %req.username,
                scope = req.scope.label(),
                by = req.ctx.user_id().unwrap_or("<internal>"),
                request = req.ctx.request_id.as_deref().unwrap_or("-"),
                error = %e,
                "grant refused"
            ),
        }
        let _ = req.reply.send(outcome);
    }
    debug!(target: "syscat::auth", "administration task stopped");
}
