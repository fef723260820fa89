use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::slot::{SlotStore, StoreError};
use crate::models::{OrderError, OrderRecord, OrderState};

/// Slot the order form lives in.
pub const STORAGE_KEY: &str = "didun_order_form_data";

/// Why a stored order could not be read back.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored order is not valid JSON for this form: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("stored order is incompatible: {0}")]
    Incompatible(#[from] OrderError),
}

/// Loads and saves the single order slot.
///
/// Reads fail soft: anything unreadable comes back as a fresh order.
/// Write errors are returned so the caller can log them, but callers are
/// expected to keep their in-memory state regardless.
#[derive(Clone)]
pub struct OrderPersistence {
    store: Arc<dyn SlotStore>,
    key: String,
}

impl OrderPersistence {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(
        store: Arc<dyn SlotStore>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn SlotStore> {
        &self.store
    }

    /// The stored order, or a fresh one when the slot is empty or unreadable.
    pub async fn load(&self) -> OrderState {
        match self.try_load().await {
            Ok(Some(state)) => {
                debug!(key = %self.key, "restored saved order");
                state
            }
            Ok(None) => {
                debug!(key = %self.key, "no saved order; starting fresh");
                OrderState::new()
            }
            Err(error) => {
                warn!(key = %self.key, %error, "discarding unreadable saved order");
                OrderState::new()
            }
        }
    }

    /// Strict variant of [`load`](Self::load) that reports why a payload was rejected.
    pub async fn try_load(&self) -> Result<Option<OrderState>, LoadError> {
        let Some(payload) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        let record: OrderRecord = serde_json::from_str(&payload)?;
        Ok(Some(OrderState::try_from(record)?))
    }

    /// Serializes the whole order into the slot.
    pub async fn save(
        &self,
        state: &OrderState,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&OrderRecord::from(state))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.put(&self.key, &payload).await
    }

    /// Removes the slot entirely.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key).await
    }
}
