use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{
    catalog::{CakeSize, FormOption, MultiField, Shape},
    choice::TriState,
    label_set::LabelSet,
    order_state::{OrderError, OrderState, TextField, ToggleField},
};

/// Flat, storage-facing shape of an [`OrderState`].
///
/// This is the JSON document kept under the order slot. Yes/no answers
/// are `null | true | false`, one-of picks are `""` or the option label,
/// and multi-selects are plain string arrays. There is no schema version;
/// a payload that does not match this shape is treated as unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(deserialize_with = "required_answer")]
    pub is_first_time: Option<bool>,
    pub name: String,
    pub delivery_date: String,
    pub phone: String,
    pub occasion: String,
    pub tiers: String,
    pub shape: String,
    pub shape_custom: String,
    #[serde(deserialize_with = "required_answer")]
    pub delivery_needed: Option<bool>,
    pub address: String,
    pub cake_flavor: Vec<String>,
    pub cake_flavor_other: String,
    pub special_flavor: Vec<String>,
    pub special_flavor_other: String,
    pub filling: Vec<String>,
    pub filling_other: String,
    pub decorative: Vec<String>,
    pub decorative_other: String,
    pub size: String,
    pub size_other: String,
    pub special_instructions: String,
    pub date: String,
}

/// A yes/no answer whose key must be present; only its value may be `null`.
fn required_answer<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer)
}

impl From<&OrderState> for OrderRecord {
    fn from(state: &OrderState) -> Self {
        let text = |field| state.text(field).to_string();
        Self {
            is_first_time: state.toggle(ToggleField::FirstTimeOrder).as_bool(),
            name: text(TextField::Name),
            delivery_date: text(TextField::DeliveryDate),
            phone: text(TextField::Phone),
            occasion: text(TextField::Occasion),
            tiers: text(TextField::Tiers),
            shape: state.shape().selected_label().unwrap_or_default().to_string(),
            shape_custom: text(TextField::ShapeCustom),
            delivery_needed: state.toggle(ToggleField::DeliveryNeeded).as_bool(),
            address: text(TextField::Address),
            cake_flavor: state.members(MultiField::CakeFlavor).to_vec(),
            cake_flavor_other: text(TextField::CakeFlavorOther),
            special_flavor: state.members(MultiField::SpecialFlavor).to_vec(),
            special_flavor_other: text(TextField::SpecialFlavorOther),
            filling: state.members(MultiField::Filling).to_vec(),
            filling_other: text(TextField::FillingOther),
            decorative: state.members(MultiField::Decorative).to_vec(),
            decorative_other: text(TextField::DecorativeOther),
            size: state.size().selected_label().unwrap_or_default().to_string(),
            size_other: text(TextField::SizeOther),
            special_instructions: text(TextField::SpecialInstructions),
            date: text(TextField::Date),
        }
    }
}

impl TryFrom<OrderRecord> for OrderState {
    type Error = OrderError;

    /// Rebuilds the state from a stored record.
    ///
    /// An unknown shape or size label is an error. Unknown or repeated
    /// multi-select labels are dropped so a catalog change does not cost
    /// the customer the rest of their order.
    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let shape = parse_pick::<Shape>("Shape", &record.shape)?;
        let size = parse_pick::<CakeSize>("Size", &record.size)?;

        let mut state = OrderState::default();
        let texts = [
            (TextField::Name, record.name),
            (TextField::DeliveryDate, record.delivery_date),
            (TextField::Phone, record.phone),
            (TextField::Occasion, record.occasion),
            (TextField::Tiers, record.tiers),
            (TextField::ShapeCustom, record.shape_custom),
            (TextField::Address, record.address),
            (TextField::CakeFlavorOther, record.cake_flavor_other),
            (TextField::SpecialFlavorOther, record.special_flavor_other),
            (TextField::FillingOther, record.filling_other),
            (TextField::DecorativeOther, record.decorative_other),
            (TextField::SizeOther, record.size_other),
            (TextField::SpecialInstructions, record.special_instructions),
            (TextField::Date, record.date),
        ];
        for (field, value) in texts {
            state.set_text(field, value);
        }

        state.restore_toggle(ToggleField::FirstTimeOrder, TriState::from(record.is_first_time));
        state.restore_toggle(ToggleField::DeliveryNeeded, TriState::from(record.delivery_needed));
        state.restore_shape(shape);
        state.restore_size(size);

        let groups = [
            (MultiField::CakeFlavor, record.cake_flavor),
            (MultiField::SpecialFlavor, record.special_flavor),
            (MultiField::Filling, record.filling),
            (MultiField::Decorative, record.decorative),
        ];
        for (field, labels) in groups {
            state.restore_members(field, known_labels(field, labels));
        }

        Ok(state)
    }
}

fn parse_pick<T: FormOption>(
    field: &'static str,
    label: &str,
) -> Result<Option<T>, OrderError> {
    if label.is_empty() {
        return Ok(None);
    }
    T::parse(label)
        .map(Some)
        .ok_or_else(|| OrderError::UnknownOption {
            field,
            label: label.to_string(),
        })
}

fn known_labels(
    field: MultiField,
    labels: Vec<String>,
) -> LabelSet {
    let mut set = LabelSet::new();
    for label in labels {
        if !field.contains(&label) {
            warn!(field = field.title(), %label, "dropping unknown option from stored order");
            continue;
        }
        if !set.insert(label) {
            warn!(field = field.title(), "dropping repeated option from stored order");
        }
    }
    set
}
