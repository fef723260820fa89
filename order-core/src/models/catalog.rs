//! Static option catalog printed on the paper order form.
//!
//! The labels are configuration data: they are matched verbatim against
//! persisted records and shown verbatim in exports, so changing one here
//! orphans any saved order that still carries the old spelling.

/// An enumerated option that is picked with radio semantics.
pub trait FormOption: Copy + Eq + std::fmt::Debug + 'static {
    /// Every option, in the order the form prints them.
    const ALL: &'static [Self];

    /// Label shown on the form and stored in the persisted record.
    fn label(self) -> &'static str;

    /// Looks up an option by its exact label.
    fn parse(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Round,
    Square,
    Heart,
    Sheet,
}

impl FormOption for Shape {
    const ALL: &'static [Self] = &[Self::Round, Self::Square, Self::Heart, Self::Sheet];

    fn label(self) -> &'static str {
        match self {
            Self::Round => "Round",
            Self::Square => "Square",
            Self::Heart => "Heart",
            Self::Sheet => "Sheet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CakeSize {
    Bento,
    TenInch,
    SixInch,
    TwelveInch,
    EightInch,
}

impl FormOption for CakeSize {
    // Two-column grid on the form, read left to right.
    const ALL: &'static [Self] = &[
        Self::Bento,
        Self::TenInch,
        Self::SixInch,
        Self::TwelveInch,
        Self::EightInch,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Bento => "Bento",
            Self::TenInch => "10\"",
            Self::SixInch => "6\"",
            Self::TwelveInch => "12\"",
            Self::EightInch => "8\"",
        }
    }
}

/// The multi-select checkbox groups on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiField {
    CakeFlavor,
    SpecialFlavor,
    Filling,
    Decorative,
}

const CAKE_FLAVORS: &[&str] = &["Vanilla", "Chocolate", "Red Velvet"];

const SPECIAL_FLAVORS: &[&str] = &["Cookies and cream", "Carrot", "Coconut"];

const FILLINGS: &[&str] = &[
    "Vanilla",
    "Salted caramel",
    "Raspberry",
    "Strawberry",
    "Crunchy peanut",
    "Chocolate",
    "Buttercream",
];

const DECORATIVE_ADDITIONS: &[&str] = &[
    "Chocchip",
    "White chip",
    "Almonds",
    "Coconut flakes",
    "Oreo",
    "M&M",
    "Topper",
    "Full glitter",
    "Ribbon",
];

impl MultiField {
    pub const ALL: [MultiField; 4] = [
        Self::CakeFlavor,
        Self::SpecialFlavor,
        Self::Filling,
        Self::Decorative,
    ];

    /// Section heading used on the form and in error messages.
    pub fn title(self) -> &'static str {
        match self {
            Self::CakeFlavor => "Cake Flavor",
            Self::SpecialFlavor => "Special Flavor",
            Self::Filling => "Filling",
            Self::Decorative => "Decorative additions",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::CakeFlavor => CAKE_FLAVORS,
            Self::SpecialFlavor => SPECIAL_FLAVORS,
            Self::Filling => FILLINGS,
            Self::Decorative => DECORATIVE_ADDITIONS,
        }
    }

    pub fn contains(self, label: &str) -> bool {
        self.options().contains(&label)
    }
}

/// Surcharge note printed under the special flavours.
pub const SPECIAL_FLAVOR_NOTE: &str = "Extra N3,000 for special flavoured cakes";

/// The "PLEASE NOTE" box.
pub const FORM_NOTES: [&str; 4] = [
    "For whipped cream there will be an additional cost of N5,000.",
    "Customizable toppers come at an extra fee.",
    "Any other special requests attract extra cost.",
    "Please indicate if you have allergies or you'll prefer reduced sugar.",
];

pub const BRAND_NAME: &str = "Dídùn";
pub const BRAND_HANDLE: &str = "@didun_ng";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shape_parse_matches_labels_exactly() {
        assert_eq!(Shape::parse("Heart"), Some(Shape::Heart));
        assert_eq!(Shape::parse("heart"), None);
        assert_eq!(Shape::parse(""), None);
    }

    #[test]
    fn size_labels_keep_inch_marks() {
        assert_eq!(CakeSize::parse("10\""), Some(CakeSize::TenInch));
        assert_eq!(CakeSize::EightInch.label(), "8\"");
    }

    #[test]
    fn every_option_round_trips_through_its_label() {
        for shape in Shape::ALL {
            assert_eq!(Shape::parse(shape.label()), Some(*shape));
        }
        for size in CakeSize::ALL {
            assert_eq!(CakeSize::parse(size.label()), Some(*size));
        }
    }

    #[test]
    fn multi_field_catalogs_have_no_duplicates() {
        for field in MultiField::ALL {
            let options = field.options();
            for (i, label) in options.iter().enumerate() {
                assert!(
                    !options[i + 1..].contains(label),
                    "{label} repeated in {}",
                    field.title()
                );
            }
        }
    }

    #[test]
    fn contains_is_scoped_to_the_field() {
        assert!(MultiField::Filling.contains("Buttercream"));
        assert!(!MultiField::CakeFlavor.contains("Buttercream"));
        // Same label, different catalogs.
        assert!(MultiField::CakeFlavor.contains("Vanilla"));
        assert!(MultiField::Filling.contains("Vanilla"));
    }
}
