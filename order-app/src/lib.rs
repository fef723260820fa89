pub mod app;
#[cfg(feature = "chrome")]
pub mod chrome;
pub mod config;
pub mod download;
pub mod logging;
pub mod opener;
pub mod session;

pub use app::{OrderApp, bootstrap, build_registry};
pub use config::AppConfig;
pub use session::{Notice, OrderSession};
