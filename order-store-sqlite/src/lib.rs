//! SQLite backend for the order form's storage slots.

mod factory;
mod store;

pub use factory::SqliteStoreFactory;
pub use store::{IN_MEMORY, SqliteSlotStore};
