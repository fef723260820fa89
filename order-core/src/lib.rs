pub mod export;
pub mod message;
pub mod models;
pub mod store;
pub mod validation;

pub use message::{
    ConfigError, LinkOpener, OpenError, SendError, VendorContact, compose, whatsapp_link,
};
pub use models::*;
pub use store::{OrderPersistence, SlotStore, StoreError};
pub use validation::{IncompleteOrder, RequiredField, is_complete, missing_fields};
