//! The reserved `system` database. Its name and id never change and it can't be created,
//! dropped or configured through the cluster interface.

use std::sync::Arc;

use once_cell::sync::Lazy;
use uuid::{uuid, Uuid};

use crate::cluster::Database;
use crate::ident::{DatabaseId, DatabaseName};

pub const NAME: &str = "system";

/// Namespace seed the reserved id is hashed from.
const ID_SEED: Uuid = uuid!("39a24924-14ec-4deb-99f1-742eda7aba5e");

static RESERVED: Lazy<Arc<Database>> = Lazy::new(|| {
    Arc::new(Database::new(Uuid::new_v5(&ID_SEED, NAME.as_bytes()), DatabaseName::guarantee_valid(NAME)))
});

pub fn database() -> Arc<Database> { Arc::clone(&RESERVED) }

pub fn id() -> DatabaseId { RESERVED.id }

pub fn name() -> &'static DatabaseName { &RESERVED.name }

pub fn is_reserved(db: &Database) -> bool { db.name == RESERVED.name }

pub fn is_reserved_name(name: &DatabaseName) -> bool { *name == RESERVED.name }

pub fn is_reserved_id(id: &DatabaseId) -> bool { *id == RESERVED.id }
