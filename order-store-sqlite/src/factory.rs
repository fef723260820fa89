use async_trait::async_trait;
use order_core::store::{SlotStore, StoreConfig, StoreError, StoreFactory};

use crate::store::SqliteSlotStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`order_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use order_core::store::StoreRegistry;
/// use order_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database at `config.location` and bring its schema up to date.
    ///
    /// Accepted locations:
    /// * A bare file path, e.g. `"order-form.db"`. The file is created if it
    ///   does not exist; its parent directory must already exist.
    /// * `":memory:"` (or empty): an ephemeral in-memory database.
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn SlotStore>, StoreError> {
        let store = SqliteSlotStore::open(&config.location).await?;
        store.run_migrations().await?;
        Ok(Box::new(store))
    }
}
