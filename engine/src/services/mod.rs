// Dashboard services: the recompute pipeline and its presentation models
pub mod report;
pub mod session;

pub use report::TableRow;
pub use session::{recompute, DashboardInputs, DashboardSession, DashboardView, UploadOutcome, UploadTicket, UploadTracker};
