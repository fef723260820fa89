//! One customer's form: the live order plus its storage slot.

use std::fmt;

use order_core::{
    export::{Downloader, ExportOutcome, Exporter, Rasterizer, ShareTarget},
    message::{self, LinkOpener, SendError},
    models::{OrderEdit, OrderError, OrderState},
    store::OrderPersistence,
    validation::{self, RequiredField},
};
use tracing::{debug, info, warn};

/// A message for the customer after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Owns the order and writes every change through to storage.
///
/// Storage failures never reach the caller: the in-memory order stays
/// authoritative and the failure is logged.
pub struct OrderSession {
    state: OrderState,
    persistence: OrderPersistence,
}

impl OrderSession {
    /// Restores the saved order, or starts a fresh one.
    pub async fn open(persistence: OrderPersistence) -> Self {
        let state = persistence.load().await;
        Self { state, persistence }
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn persistence(&self) -> &OrderPersistence {
        &self.persistence
    }

    /// Applies one edit, then saves.
    ///
    /// # Errors
    /// [`OrderError::UnknownOption`] for a label outside the field's
    /// catalog; the order and the stored copy are left untouched.
    pub async fn apply(
        &mut self,
        edit: OrderEdit,
    ) -> Result<(), OrderError> {
        self.state.apply(edit)?;
        self.autosave().await;
        Ok(())
    }

    /// Resets every field except the form date and removes the saved copy.
    pub async fn clear(&mut self) {
        if let Err(error) = self.persistence.clear().await {
            warn!(%error, "could not remove saved order");
        }
        self.state.clear();
        self.autosave().await;
        info!("order form cleared");
    }

    /// Clears only when the customer confirmed; a declined prompt leaves
    /// the order and its saved copy untouched. Returns whether it cleared.
    pub async fn clear_confirmed(
        &mut self,
        confirmed: bool,
    ) -> bool {
        if !confirmed {
            debug!("clear declined");
            return false;
        }
        self.clear().await;
        true
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        validation::missing_fields(&self.state)
    }

    pub fn is_complete(&self) -> bool {
        validation::is_complete(&self.state)
    }

    /// Exports the order as an image and reports the result.
    pub async fn export<R, S, D>(
        &self,
        exporter: &Exporter<R, S, D>,
    ) -> Notice
    where
        R: Rasterizer,
        S: ShareTarget,
        D: Downloader,
    {
        match exporter.export(&self.state).await {
            Ok(ExportOutcome::Shared) => Notice::Success("Order image shared.".to_string()),
            Ok(ExportOutcome::Downloaded(path)) => {
                Notice::Success(format!("Order image saved to {}", path.display()))
            }
            Err(error) => Notice::Error(error.user_message()),
        }
    }

    /// Sends the order to the bakery as a pre-filled WhatsApp message.
    ///
    /// Required fields are checked before the vendor number. Without an
    /// opener the link itself is returned for the caller to present.
    pub fn send_to_vendor(
        &self,
        vendor_phone: Option<&str>,
        opener: Option<&dyn LinkOpener>,
    ) -> Notice {
        let link = match message::whatsapp_link(vendor_phone, &self.state) {
            Ok(link) => link,
            Err(SendError::Config(error)) => {
                warn!(%error, "vendor number misconfigured");
                return Notice::Error(error.to_string());
            }
            Err(error) => return Notice::Error(error.to_string()),
        };

        let Some(opener) = opener else {
            return Notice::Success(format!("Send your order using this link: {link}"));
        };
        match opener.open(&link) {
            Ok(()) => {
                info!("order message opened");
                Notice::Success("Opening WhatsApp with your order.".to_string())
            }
            Err(error) => {
                warn!(%error, "could not open vendor link");
                Notice::Error(format!(
                    "Could not open WhatsApp. Send your order using this link: {link}"
                ))
            }
        }
    }

    async fn autosave(&self) {
        match self.persistence.save(&self.state).await {
            Ok(()) => debug!("order autosaved"),
            Err(error) => warn!(%error, "autosave failed; keeping in-memory order"),
        }
    }
}
