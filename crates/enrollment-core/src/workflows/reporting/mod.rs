//! Academic history and per-cycle enrollment reports.

pub mod domain;
pub mod reporter;
pub mod router;

pub use domain::{CycleSummary, GradeStatus, HistoryFilter, HistoryRecord, StudentHistory};
pub use reporter::{group_by_cycle, HistoryReporter};
pub use router::reporting_router;
