//! Storage layer: JSON-lines diagnosis history.

mod error;
pub use error::StoreError;

mod history;
pub use history::HistoryLog;
