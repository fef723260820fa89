pub mod factory;
pub mod memory;
pub mod persistence;
pub mod slot;

pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use memory::{MemorySlotStore, MemoryStoreFactory};
pub use persistence::{LoadError, OrderPersistence, STORAGE_KEY};
pub use slot::{SlotStore, StoreError};
