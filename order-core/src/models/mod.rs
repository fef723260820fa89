mod catalog;
mod choice;
mod label_set;
mod order_state;
mod record;

pub use catalog::{
    BRAND_HANDLE, BRAND_NAME, CakeSize, FORM_NOTES, FormOption, MultiField, SPECIAL_FLAVOR_NOTE,
    Shape,
};
pub use choice::{SingleSelect, TriState};
pub use label_set::LabelSet;
pub use order_state::{OrderEdit, OrderError, OrderState, TextField, ToggleField, format_form_date};
pub use record::OrderRecord;
