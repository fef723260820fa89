//! Checkbox-backed choice types.
//!
//! The paper form uses plain checkboxes everywhere, so even the one-of
//! questions behave like checkboxes: ticking the box that is already
//! ticked clears the answer instead of leaving it set.

use super::catalog::FormOption;

/// A yes/no question that may be left blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriState {
    #[default]
    Unset,
    Yes,
    No,
}

impl TriState {
    /// Next value after the user ticks the `Yes` box (`true`) or the
    /// `No` box (`false`).
    ///
    /// Ticking the box that is already checked returns to [`TriState::Unset`];
    /// ticking the other box switches directly.
    pub fn click(
        self,
        clicked: bool,
    ) -> Self {
        let target = Self::from(Some(clicked));
        if self == target { Self::Unset } else { target }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Yes => Some(true),
            Self::No => Some(false),
        }
    }

    pub fn is_set(self) -> bool {
        self != Self::Unset
    }

    /// `Yes`, `No`, or `N/A` when unanswered.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unset => "N/A",
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::Unset,
            Some(true) => Self::Yes,
            Some(false) => Self::No,
        }
    }
}

impl From<TriState> for Option<bool> {
    fn from(value: TriState) -> Self {
        value.as_bool()
    }
}

/// One-of pick over a [`FormOption`] set, plus a free-text escape hatch.
///
/// `custom` is independent of `selected`: a customer may tick "Round"
/// and still describe a custom shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelect<T> {
    pub selected: Option<T>,
    pub custom: String,
}

impl<T> Default for SingleSelect<T> {
    fn default() -> Self {
        Self {
            selected: None,
            custom: String::new(),
        }
    }
}

impl<T: FormOption> SingleSelect<T> {
    /// Tick `value`. Any other option is cleared; ticking the current
    /// option clears the selection. `custom` is never touched.
    pub fn click(
        &mut self,
        value: T,
    ) {
        self.selected = if self.selected == Some(value) {
            None
        } else {
            Some(value)
        };
    }

    pub fn is_checked(
        &self,
        value: T,
    ) -> bool {
        self.selected == Some(value)
    }

    pub fn selected_label(&self) -> Option<&'static str> {
        self.selected.map(FormOption::label)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::catalog::{CakeSize, Shape};

    #[test]
    fn tri_state_click_sets_from_unset() {
        assert_eq!(TriState::Unset.click(true), TriState::Yes);
        assert_eq!(TriState::Unset.click(false), TriState::No);
    }

    #[test]
    fn tri_state_click_same_value_unsets() {
        assert_eq!(TriState::Yes.click(true), TriState::Unset);
        assert_eq!(TriState::No.click(false), TriState::Unset);
    }

    #[test]
    fn tri_state_click_other_value_switches_directly() {
        assert_eq!(TriState::Yes.click(false), TriState::No);
        assert_eq!(TriState::No.click(true), TriState::Yes);
    }

    #[test]
    fn tri_state_converts_to_and_from_option() {
        for value in [None, Some(true), Some(false)] {
            assert_eq!(Option::<bool>::from(TriState::from(value)), value);
        }
    }

    #[test]
    fn single_select_click_replaces_previous_pick() {
        let mut shape = SingleSelect::<Shape>::default();
        shape.click(Shape::Round);
        shape.click(Shape::Heart);

        assert_eq!(shape.selected, Some(Shape::Heart));
        assert!(!shape.is_checked(Shape::Round));
    }

    #[test]
    fn single_select_click_again_clears() {
        let mut size = SingleSelect::<CakeSize>::default();
        size.click(CakeSize::Bento);
        size.click(CakeSize::Bento);

        assert_eq!(size.selected, None);
    }

    #[test]
    fn single_select_click_leaves_custom_text_alone() {
        let mut shape = SingleSelect::<Shape> {
            selected: None,
            custom: "Number 7".to_string(),
        };
        shape.click(Shape::Sheet);
        shape.click(Shape::Sheet);

        assert_eq!(shape.custom, "Number 7");
    }
}
