//! System catalog: the reserved database, the tables registered in it and the
//! backends that compute their rows.

pub mod auth_tables;
pub mod backend;
pub mod eval;
pub mod memory;
pub mod registry;
pub mod reserved;
pub mod table;
pub mod wiring;

pub use backend::{datum_cmp, KeyRange, RowStream, Sorting, TableBackend};
pub use eval::{estimate_doc_count, QueryEvaluator, StreamEvaluator, TerminalAggregate};
pub use registry::{BackendEntry, BackendRegistry, Registration};
pub use table::SystemTable;
