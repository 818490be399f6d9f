pub mod view_log;

pub use view_log::{LogEntry, ViewLog};
