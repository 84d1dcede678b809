//! Permission grants: which reach the administration task and which are forwarded.

mod common;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::*;
use syscat::auth::UserContext;
use syscat::catalog::reserved;
use syscat::cluster::ClusterInterface;
use syscat::error::ErrorKind;

#[tokio::test]
async fn reserved_database_grant_updates_the_published_view() {
    let h = harness();
    let c = CancellationToken::new();
    let out = h
        .dispatcher
        .grant_database(&admin(), reserved::id(), "bob".into(), json!({"read": true}), &c)
        .await
        .unwrap();
    assert_eq!(out["granted"], 1);
    assert_eq!(out["permissions_changes"][0]["new_val"], json!({"read": true}));
    assert!(h.delegate.calls().is_empty());

    let snap = h.router.view().snapshot();
    assert_eq!(snap.user("bob").unwrap().databases[&reserved::id()].read, Some(true));
}

#[tokio::test]
async fn reserved_table_grant_is_routed() {
    let h = harness();
    let c = CancellationToken::new();
    let table = Uuid::new_v4();
    h.dispatcher
        .grant_table(&admin(), reserved::id(), table, "bob".into(), json!({"write": false}), &c)
        .await
        .unwrap();
    assert!(h.delegate.calls().is_empty());
    let snap = h.router.view().snapshot();
    let t = snap.user("bob").unwrap().tables[&table];
    assert_eq!(t.database, reserved::id());
    assert_eq!(t.permissions.write, Some(false));
}

#[tokio::test]
async fn other_grants_are_forwarded() {
    let h = harness();
    let c = CancellationToken::new();
    let d = &h.dispatcher;
    let db = Uuid::new_v4();

    d.grant_global(&admin(), "bob".into(), json!({"connect": true}), &c).await.unwrap();
    d.grant_database(&admin(), db, "bob".into(), json!({"read": true}), &c).await.unwrap();
    d.grant_table(&admin(), db, Uuid::new_v4(), "bob".into(), json!({"read": true}), &c).await.unwrap();
    assert_eq!(h.delegate.calls(), vec!["grant_global", "grant_database", "grant_table"]);

    let snap = h.router.view().snapshot();
    assert!(snap.user("bob").unwrap().databases.is_empty());
}

#[tokio::test]
async fn failed_grants_leave_the_view_unchanged() {
    let h = harness();
    let c = CancellationToken::new();
    let d = &h.dispatcher;
    let before = h.router.view().snapshot();

    let e = d
        .grant_database(&UserContext::user("bob"), reserved::id(), "bob".into(), json!({"read": true}), &c)
        .await
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::AuthorizationFailure);
    let e = d
        .grant_database(&admin(), reserved::id(), "admin".into(), json!({"read": false}), &c)
        .await
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::RejectedOperation);
    let e = d
        .grant_database(&admin(), reserved::id(), "bob".into(), json!({"connect": true}), &c)
        .await
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::InvalidArgument);
    let e = d
        .grant_database(&admin(), reserved::id(), "carol".into(), json!({"read": true}), &c)
        .await
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::NotFound);

    assert_eq!(*h.router.view().snapshot(), *before);
}

#[tokio::test]
async fn cancelled_caller_gets_cancellation() {
    let h = harness();
    let c = CancellationToken::new();
    c.cancel();
    let e = h
        .dispatcher
        .grant_database(&admin(), reserved::id(), "bob".into(), json!({"read": true}), &c)
        .await
        .unwrap_err();
    assert!(e.is_cancelled());
    assert!(h.router.view().snapshot().user("bob").unwrap().databases.is_empty());
}

#[tokio::test]
async fn stopped_admin_task_fails_grants() {
    let h = harness();
    h.router.shutdown();
    // let the task observe the shutdown and drop its receiver
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let e = h
        .dispatcher
        .grant_database(&admin(), reserved::id(), "bob".into(), json!({"read": true}), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::Cancelled);
}

#[tokio::test]
async fn grants_are_visible_in_the_permissions_table() {
    let h = harness();
    let c = CancellationToken::new();
    let d = &h.dispatcher;
    let sys = reserved::database();
    let perms = table("permissions");

    assert_eq!(d.table_estimate_doc_counts(&admin(), &sys, &perms, &c).await.unwrap(), vec![1]);
    d.grant_database(&admin(), reserved::id(), "bob".into(), json!({"read": true}), &c).await.unwrap();
    d.grant_table(&admin(), reserved::id(), Uuid::new_v4(), "bob".into(), json!({"config": true}), &c)
        .await
        .unwrap();
    assert_eq!(d.table_estimate_doc_counts(&admin(), &sys, &perms, &c).await.unwrap(), vec![3]);

    let t = d.table_find(&admin(), &perms, &sys, None, &c).await.unwrap();
    let row = t.read_row(&admin(), &json!(["bob", reserved::id().to_string()]), &c).await.unwrap().unwrap();
    assert_eq!(row["permissions"], json!({"read": true}));
    assert_eq!(row["database"], json!("system"));
}
