//! Pre-filled WhatsApp message to the bakery.
//!
//! Composition is pure; the only side effect in this flow is the
//! [`LinkOpener`] handing the finished link to a browser.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
    models::{BRAND_NAME, MultiField, OrderState, TextField, ToggleField},
    validation::{self, IncompleteOrder},
};

const WHATSAPP_BASE_URL: &str = "https://wa.me/";

const NOT_PROVIDED: &str = "N/A";
const NO_INSTRUCTIONS: &str = "None";
const PICK_UP: &str = "Pick up";

// Template values left in deployment config, e.g. `+234XXXXXXXXXX` or
// `YOUR_NUMBER`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)xx|your").expect("placeholder pattern is valid"));

/// Problems with the deployment-supplied vendor number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("The bakery's WhatsApp number has not been configured.")]
    MissingVendorPhone,

    #[error("The bakery's WhatsApp number is still a placeholder ('{0}').")]
    PlaceholderVendorPhone(String),
}

/// A validated vendor number, digits only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorContact {
    digits: String,
}

impl VendorContact {
    /// Validates the configured number and strips every non-digit.
    ///
    /// # Errors
    /// * [`ConfigError::MissingVendorPhone`] when absent, blank, or digit-free.
    /// * [`ConfigError::PlaceholderVendorPhone`] when it still holds a template marker.
    pub fn from_config(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(ConfigError::MissingVendorPhone);
        }
        if PLACEHOLDER.is_match(raw) {
            return Err(ConfigError::PlaceholderVendorPhone(raw.to_string()));
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(ConfigError::MissingVendorPhone);
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }
}

fn or_default<'a>(
    value: &'a str,
    fallback: &'a str,
) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

fn joined_or_na<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let labels: Vec<_> = labels.collect();
    if labels.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        labels.join(", ")
    }
}

/// Builds the message body from every field of the order.
pub fn compose(state: &OrderState) -> String {
    let text = |field| or_default(state.text(field), NOT_PROVIDED);

    let lines = [
        format!("*{BRAND_NAME} Cake Order*"),
        String::new(),
        format!("Name: {}", text(TextField::Name)),
        format!("Phone: {}", text(TextField::Phone)),
        format!(
            "First Time Order: {}",
            state.toggle(ToggleField::FirstTimeOrder).label()
        ),
        format!("Delivery Date: {}", text(TextField::DeliveryDate)),
        format!("Occasion: {}", text(TextField::Occasion)),
        format!("Tiers: {}", text(TextField::Tiers)),
        format!(
            "Shape: {}",
            state.shape().selected_label().unwrap_or(NOT_PROVIDED)
        ),
        format!("Custom Shape: {}", text(TextField::ShapeCustom)),
        format!(
            "Delivery Needed: {}",
            state.toggle(ToggleField::DeliveryNeeded).label()
        ),
        format!(
            "Address: {}",
            or_default(state.text(TextField::Address), PICK_UP)
        ),
        format!("Flavors: {}", joined_or_na(state.flavors())),
        format!("Other Cake Flavor: {}", text(TextField::CakeFlavorOther)),
        format!("Other Special Flavor: {}", text(TextField::SpecialFlavorOther)),
        format!(
            "Filling: {}",
            joined_or_na(state.members(MultiField::Filling).iter())
        ),
        format!("Other Filling: {}", text(TextField::FillingOther)),
        format!(
            "Decorative Additions: {}",
            joined_or_na(state.members(MultiField::Decorative).iter())
        ),
        format!("Other Decorative: {}", text(TextField::DecorativeOther)),
        format!(
            "Size: {}",
            state.size().selected_label().unwrap_or(NOT_PROVIDED)
        ),
        format!("Other Size: {}", text(TextField::SizeOther)),
        format!(
            "Special Instructions: {}",
            or_default(state.text(TextField::SpecialInstructions), NO_INSTRUCTIONS)
        ),
        format!("Date: {}", text(TextField::Date)),
    ];
    lines.join("\n")
}

/// `https://wa.me/<digits>?text=<percent-encoded message>`.
pub fn message_link(
    vendor: &VendorContact,
    message: &str,
) -> String {
    format!(
        "{WHATSAPP_BASE_URL}{}?text={}",
        vendor.digits(),
        urlencoding::encode(message)
    )
}

/// Why a vendor link could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteOrder),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Builds the vendor deep link for a complete order.
///
/// Required fields are checked before the configured number, so a
/// customer with a half-filled form is told about the form first.
pub fn whatsapp_link(
    vendor_phone: Option<&str>,
    state: &OrderState,
) -> Result<String, SendError> {
    validation::require_complete(state)?;
    let vendor = VendorContact::from_config(vendor_phone)?;
    Ok(message_link(&vendor, &compose(state)))
}

/// Failure to hand a link to the platform.
#[derive(Debug, Error)]
#[error("could not open link: {0}")]
pub struct OpenError(pub String);

/// Opens a URL in a new browsing context.
pub trait LinkOpener: Send + Sync {
    fn open(
        &self,
        url: &str,
    ) -> Result<(), OpenError>;
}
