// Application layer - the stateful ledger every view drives, plus the
// read-only structures it hands back (snapshots and reports).

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
