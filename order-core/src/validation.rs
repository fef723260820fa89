//! Completeness rules that gate export and the vendor message.
//!
//! Editing and autosave are never gated: an incomplete order is always
//! savable, just not exportable.

use std::fmt;

use crate::models::OrderState;

/// Fields that must be filled before an order can leave the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Phone,
    DeliveryDate,
}

impl RequiredField {
    /// Evaluation order. Messages always list missing fields in this order.
    pub const ALL: [RequiredField; 3] = [Self::Name, Self::Phone, Self::DeliveryDate];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Phone => "Phone",
            Self::DeliveryDate => "Delivery Date",
        }
    }

    fn value(
        self,
        state: &OrderState,
    ) -> &str {
        match self {
            Self::Name => state.name(),
            Self::Phone => state.phone(),
            Self::DeliveryDate => state.delivery_date(),
        }
    }

    fn is_filled(
        self,
        state: &OrderState,
    ) -> bool {
        !self.value(state).trim().is_empty()
    }
}

impl fmt::Display for RequiredField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required fields that are empty or whitespace-only, in [`RequiredField::ALL`] order.
pub fn missing_fields(state: &OrderState) -> Vec<RequiredField> {
    RequiredField::ALL
        .into_iter()
        .filter(|field| !field.is_filled(state))
        .collect()
}

pub fn is_complete(state: &OrderState) -> bool {
    RequiredField::ALL
        .into_iter()
        .all(|field| field.is_filled(state))
}

/// Returns [`IncompleteOrder`] listing what is missing, if anything.
pub fn require_complete(state: &OrderState) -> Result<(), IncompleteOrder> {
    let missing = missing_fields(state);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IncompleteOrder { missing })
    }
}

/// The order cannot be exported or sent yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteOrder {
    pub missing: Vec<RequiredField>,
}

impl fmt::Display for IncompleteOrder {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let labels: Vec<_> = self.missing.iter().map(|field| field.label()).collect();
        write!(f, "Please fill in the required fields: {}", labels.join(", "))
    }
}

impl std::error::Error for IncompleteOrder {}
