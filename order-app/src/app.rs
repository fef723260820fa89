//! Wiring: configuration to storage, exporter, and session.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use order_core::{
    export::{Exporter, NoNativeShare, Rasterizer},
    message::LinkOpener,
    models::{OrderEdit, OrderError},
    store::{MemorySlotStore, MemoryStoreFactory, OrderPersistence, SlotStore, StoreRegistry},
};
use order_store_sqlite::SqliteStoreFactory;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    download::DirectoryDownloader,
    logging,
    opener::SystemOpener,
    session::{Notice, OrderSession},
};

pub type AppExporter<R> = Exporter<R, NoNativeShare, DirectoryDownloader>;

/// Every storage backend this build knows about.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Loads configuration and starts logging.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load(config_path).context("failed to load configuration")?;
    logging::init_logging(&config.log_level, config.log_file.as_deref())
        .context("failed to initialize logging")?;
    info!(backend = %config.store.backend, "configuration loaded");
    Ok(config)
}

/// Opens the configured store, falling back to process memory so the form
/// stays usable when durable storage is unavailable.
pub async fn open_store(
    registry: &StoreRegistry,
    config: &AppConfig,
) -> Arc<dyn SlotStore> {
    if config.store.backend == "sqlite" {
        if let Some(parent) = Path::new(&config.store.location).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(error) = std::fs::create_dir_all(parent) {
                    warn!(%error, dir = %parent.display(), "could not create data directory");
                }
            }
        }
    }

    match registry.create(&config.store).await {
        Ok(store) => Arc::from(store),
        Err(error) => {
            warn!(
                %error,
                backend = %config.store.backend,
                "storage unavailable; order will not survive a restart"
            );
            Arc::new(MemorySlotStore::new())
        }
    }
}

/// The application context for one form.
pub struct OrderApp<R> {
    config: AppConfig,
    session: OrderSession,
    exporter: AppExporter<R>,
    opener: Box<dyn LinkOpener>,
}

impl<R: Rasterizer> OrderApp<R> {
    /// Opens storage, restores the saved order, and prepares the exporter.
    pub async fn open(
        config: AppConfig,
        rasterizer: R,
    ) -> Self {
        let store = open_store(&build_registry(), &config).await;
        let session = OrderSession::open(OrderPersistence::new(store)).await;
        let exporter = Exporter::new(
            rasterizer,
            NoNativeShare,
            DirectoryDownloader::from_config(config.download_dir.as_deref()),
        )
        .with_options(config.capture);

        Self {
            config,
            session,
            exporter,
            opener: Box::new(SystemOpener),
        }
    }

    /// Replaces the system link handler.
    pub fn with_opener(
        mut self,
        opener: impl LinkOpener + 'static,
    ) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &OrderSession {
        &self.session
    }

    pub fn exporter(&self) -> &AppExporter<R> {
        &self.exporter
    }

    pub async fn edit(
        &mut self,
        edit: OrderEdit,
    ) -> Result<(), OrderError> {
        self.session.apply(edit).await
    }

    pub async fn clear(&mut self) {
        self.session.clear().await;
    }

    /// Clears the form once the customer has confirmed.
    pub async fn clear_confirmed(
        &mut self,
        confirmed: bool,
    ) -> Notice {
        if self.session.clear_confirmed(confirmed).await {
            Notice::Success("Order form cleared.".to_string())
        } else {
            Notice::Success("Nothing was cleared.".to_string())
        }
    }

    pub async fn export(&self) -> Notice {
        self.session.export(&self.exporter).await
    }

    pub fn send_to_vendor(&self) -> Notice {
        self.session
            .send_to_vendor(self.config.vendor_phone.as_deref(), Some(self.opener.as_ref()))
    }
}

#[cfg(feature = "chrome")]
impl OrderApp<crate::chrome::ChromeRasterizer> {
    pub async fn with_chrome(config: AppConfig) -> Self {
        Self::open(config, crate::chrome::ChromeRasterizer).await
    }
}
