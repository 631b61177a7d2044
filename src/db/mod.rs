mod history;
mod repository;
mod schema;
mod session;

pub use history::HistoryStore;
pub use repository::{KeyValueStore, SqliteStore};
pub use session::Session;
