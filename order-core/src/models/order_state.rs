use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::debug;

use super::{
    catalog::{CakeSize, MultiField, Shape},
    choice::{SingleSelect, TriState},
    label_set::LabelSet,
};

/// Errors raised by field-scoped updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("'{label}' is not an option under {field}")]
    UnknownOption { field: &'static str, label: String },
}

/// Free-text fields on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Name,
    DeliveryDate,
    Phone,
    Occasion,
    Tiers,
    ShapeCustom,
    Address,
    CakeFlavorOther,
    SpecialFlavorOther,
    FillingOther,
    DecorativeOther,
    SizeOther,
    SpecialInstructions,
    Date,
}

impl TextField {
    pub const ALL: [TextField; 14] = [
        Self::Name,
        Self::DeliveryDate,
        Self::Phone,
        Self::Occasion,
        Self::Tiers,
        Self::ShapeCustom,
        Self::Address,
        Self::CakeFlavorOther,
        Self::SpecialFlavorOther,
        Self::FillingOther,
        Self::DecorativeOther,
        Self::SizeOther,
        Self::SpecialInstructions,
        Self::Date,
    ];
}

/// The two yes/no questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleField {
    FirstTimeOrder,
    DeliveryNeeded,
}

/// One field-scoped update, as produced by a form widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEdit {
    Text(TextField, String),
    /// `true` for the "Yes" box, `false` for the "No" box.
    Toggle(ToggleField, bool),
    Shape(Shape),
    Size(CakeSize),
    Member(MultiField, String),
}

/// One order in progress.
///
/// Fields are only reachable through the update operations below so the
/// checkbox rules hold at every point. Absent answers are empty strings,
/// empty sets, or [`TriState::Unset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderState {
    is_first_time: TriState,
    name: String,
    delivery_date: String,
    phone: String,
    occasion: String,
    tiers: String,
    shape: SingleSelect<Shape>,
    delivery_needed: TriState,
    address: String,
    cake_flavor: LabelSet,
    cake_flavor_other: String,
    special_flavor: LabelSet,
    special_flavor_other: String,
    filling: LabelSet,
    filling_other: String,
    decorative: LabelSet,
    decorative_other: String,
    size: SingleSelect<CakeSize>,
    special_instructions: String,
    date: String,
}

/// Formats the footer date the way the form prints it (`dd/mm/yyyy`).
pub fn format_form_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Default for OrderState {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderState {
    /// Fresh order dated today (local time).
    pub fn new() -> Self {
        Self::new_on(today())
    }

    /// Fresh order with the footer date set to `date`.
    pub fn new_on(date: NaiveDate) -> Self {
        Self {
            is_first_time: TriState::Unset,
            name: String::new(),
            delivery_date: String::new(),
            phone: String::new(),
            occasion: String::new(),
            tiers: String::new(),
            shape: SingleSelect::default(),
            delivery_needed: TriState::Unset,
            address: String::new(),
            cake_flavor: LabelSet::new(),
            cake_flavor_other: String::new(),
            special_flavor: LabelSet::new(),
            special_flavor_other: String::new(),
            filling: LabelSet::new(),
            filling_other: String::new(),
            decorative: LabelSet::new(),
            decorative_other: String::new(),
            size: SingleSelect::default(),
            special_instructions: String::new(),
            date: format_form_date(date),
        }
    }

    /// Applies a single edit. This is the mutation path the session uses.
    pub fn apply(
        &mut self,
        edit: OrderEdit,
    ) -> Result<(), OrderError> {
        match edit {
            OrderEdit::Text(field, value) => self.set_text(field, value),
            OrderEdit::Toggle(field, clicked) => {
                self.click_toggle(field, clicked);
            }
            OrderEdit::Shape(shape) => self.click_shape(shape),
            OrderEdit::Size(size) => self.click_size(size),
            OrderEdit::Member(field, label) => {
                self.toggle_member(field, &label)?;
            }
        }
        Ok(())
    }

    pub fn set_text(
        &mut self,
        field: TextField,
        value: impl Into<String>,
    ) {
        *self.text_mut(field) = value.into();
    }

    /// Ticks the Yes (`true`) or No (`false`) box and returns the new answer.
    pub fn click_toggle(
        &mut self,
        field: ToggleField,
        clicked: bool,
    ) -> TriState {
        let slot = match field {
            ToggleField::FirstTimeOrder => &mut self.is_first_time,
            ToggleField::DeliveryNeeded => &mut self.delivery_needed,
        };
        *slot = slot.click(clicked);
        *slot
    }

    pub fn click_shape(
        &mut self,
        shape: Shape,
    ) {
        self.shape.click(shape);
    }

    pub fn click_size(
        &mut self,
        size: CakeSize,
    ) {
        self.size.click(size);
    }

    /// Ticks or unticks `label` in a multi-select group.
    ///
    /// Returns whether the label is ticked afterwards. Labels outside the
    /// group's catalog are rejected and the state is left unchanged.
    pub fn toggle_member(
        &mut self,
        field: MultiField,
        label: &str,
    ) -> Result<bool, OrderError> {
        if !field.contains(label) {
            return Err(OrderError::UnknownOption {
                field: field.title(),
                label: label.to_string(),
            });
        }
        let present = self.members_mut(field).toggle(label);
        debug!(field = field.title(), label, present, "toggled option");
        Ok(present)
    }

    /// Resets every field and re-dates the order to today.
    pub fn clear(&mut self) {
        self.clear_on(today());
    }

    /// Resets every field and dates the order `date`.
    pub fn clear_on(
        &mut self,
        date: NaiveDate,
    ) {
        *self = Self::new_on(date);
    }

    pub fn text(
        &self,
        field: TextField,
    ) -> &str {
        match field {
            TextField::Name => &self.name,
            TextField::DeliveryDate => &self.delivery_date,
            TextField::Phone => &self.phone,
            TextField::Occasion => &self.occasion,
            TextField::Tiers => &self.tiers,
            TextField::ShapeCustom => &self.shape.custom,
            TextField::Address => &self.address,
            TextField::CakeFlavorOther => &self.cake_flavor_other,
            TextField::SpecialFlavorOther => &self.special_flavor_other,
            TextField::FillingOther => &self.filling_other,
            TextField::DecorativeOther => &self.decorative_other,
            TextField::SizeOther => &self.size.custom,
            TextField::SpecialInstructions => &self.special_instructions,
            TextField::Date => &self.date,
        }
    }

    fn text_mut(
        &mut self,
        field: TextField,
    ) -> &mut String {
        match field {
            TextField::Name => &mut self.name,
            TextField::DeliveryDate => &mut self.delivery_date,
            TextField::Phone => &mut self.phone,
            TextField::Occasion => &mut self.occasion,
            TextField::Tiers => &mut self.tiers,
            TextField::ShapeCustom => &mut self.shape.custom,
            TextField::Address => &mut self.address,
            TextField::CakeFlavorOther => &mut self.cake_flavor_other,
            TextField::SpecialFlavorOther => &mut self.special_flavor_other,
            TextField::FillingOther => &mut self.filling_other,
            TextField::DecorativeOther => &mut self.decorative_other,
            TextField::SizeOther => &mut self.size.custom,
            TextField::SpecialInstructions => &mut self.special_instructions,
            TextField::Date => &mut self.date,
        }
    }

    pub fn toggle(
        &self,
        field: ToggleField,
    ) -> TriState {
        match field {
            ToggleField::FirstTimeOrder => self.is_first_time,
            ToggleField::DeliveryNeeded => self.delivery_needed,
        }
    }

    pub fn members(
        &self,
        field: MultiField,
    ) -> &LabelSet {
        match field {
            MultiField::CakeFlavor => &self.cake_flavor,
            MultiField::SpecialFlavor => &self.special_flavor,
            MultiField::Filling => &self.filling,
            MultiField::Decorative => &self.decorative,
        }
    }

    fn members_mut(
        &mut self,
        field: MultiField,
    ) -> &mut LabelSet {
        match field {
            MultiField::CakeFlavor => &mut self.cake_flavor,
            MultiField::SpecialFlavor => &mut self.special_flavor,
            MultiField::Filling => &mut self.filling,
            MultiField::Decorative => &mut self.decorative,
        }
    }

    pub fn shape(&self) -> &SingleSelect<Shape> {
        &self.shape
    }

    pub fn size(&self) -> &SingleSelect<CakeSize> {
        &self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn delivery_date(&self) -> &str {
        &self.delivery_date
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Cake flavours followed by special flavours.
    pub fn flavors(&self) -> impl Iterator<Item = &str> {
        self.cake_flavor.iter().chain(self.special_flavor.iter())
    }

    // Hydration from a persisted record bypasses the click rules: the
    // record already holds the final answers.
    pub(crate) fn restore_toggle(
        &mut self,
        field: ToggleField,
        value: TriState,
    ) {
        match field {
            ToggleField::FirstTimeOrder => self.is_first_time = value,
            ToggleField::DeliveryNeeded => self.delivery_needed = value,
        }
    }

    pub(crate) fn restore_shape(
        &mut self,
        shape: Option<Shape>,
    ) {
        self.shape.selected = shape;
    }

    pub(crate) fn restore_size(
        &mut self,
        size: Option<CakeSize>,
    ) {
        self.size.selected = size;
    }

    pub(crate) fn restore_members(
        &mut self,
        field: MultiField,
        members: LabelSet,
    ) {
        *self.members_mut(field) = members;
    }
}
