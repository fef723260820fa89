//! Off-screen rendering of the order as a paper-form replica.
//!
//! The document is laid out at a fixed desktop width so the exported
//! image looks the same whichever device filled in the form.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::models::{
    BRAND_HANDLE, BRAND_NAME, CakeSize, FORM_NOTES, FormOption, MultiField, OrderState,
    SPECIAL_FLAVOR_NOTE, Shape, SingleSelect, TextField, ToggleField, TriState,
};

/// Canonical layout width in CSS pixels.
pub const CANONICAL_WIDTH_PX: u32 = 1080;

/// Element id the rasterizer waits for before capturing.
pub const READY_MARKER_ID: &str = "order-form-ready";

/// Root element id of the form.
pub const FORM_ROOT_ID: &str = "order-form";

const STYLE: &str = r#"
*{box-sizing:border-box}
html,body{margin:0;padding:0;background:#fff}
.paper{width:1080px;padding:48px 56px;background:#fff;color:#000;font-family:Georgia,'Times New Roman',serif;font-size:15px}
.logo{font-family:'Brush Script MT',cursive;font-size:56px;text-align:center}
.title{text-align:center;font-weight:bold;letter-spacing:4px;font-size:22px;margin:4px 0 24px}
.row{display:flex;gap:20px;align-items:flex-end;margin-bottom:15px}
.grid3{display:grid;grid-template-columns:repeat(3,minmax(0,1fr));gap:15px;margin-bottom:25px}
.grid2{display:grid;grid-template-columns:repeat(2,minmax(0,1fr));gap:20px;margin-bottom:25px}
.field{display:flex;gap:8px;align-items:flex-end;flex:1;min-width:0}
.label{white-space:nowrap}
.line{flex:1;min-width:0;border-bottom:1px solid #000;min-height:20px;padding:0 4px;word-break:break-word}
.box{display:inline-flex;align-items:center;gap:6px;margin:0 12px 6px 0}
.check{display:inline-block;width:16px;height:16px;border:1.5px solid #000;text-align:center;line-height:14px;font-size:13px}
.section{border:1.5px solid #000;padding:14px}
.section-title{font-weight:bold;text-transform:uppercase;margin-bottom:10px}
.sub{font-weight:bold;margin:10px 0 6px}
.note{font-size:11px;font-style:italic;margin-top:10px}
.notes{margin:0;padding-left:18px;font-size:13px}
.footer{border-top:2px solid #000;padding-top:15px;display:flex;justify-content:flex-end;font-family:sans-serif;font-weight:bold;font-size:18px}
.handle{text-align:center;margin-top:12px;font-size:14px}
"#;

/// A fully rendered, self-contained HTML page for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDocument {
    html: String,
    width_px: u32,
}

impl OrderDocument {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }
}

fn checkbox(
    label: &str,
    checked: bool,
) -> Markup {
    html! {
        span.box {
            @if checked {
                span.check.checked { "\u{2713}" }
            } @else {
                span.check {}
            }
            span { (label) }
        }
    }
}

fn field(
    label: &str,
    value: &str,
) -> Markup {
    html! {
        div.field {
            span.label { (label) }
            span.line { (value) }
        }
    }
}

fn yes_no(value: TriState) -> Markup {
    html! {
        (checkbox("Yes", value == TriState::Yes))
        (checkbox("No", value == TriState::No))
    }
}

fn options<T: FormOption>(select: &SingleSelect<T>) -> Markup {
    html! {
        @for option in T::ALL {
            (checkbox(option.label(), select.is_checked(*option)))
        }
    }
}

fn members(
    state: &OrderState,
    group: MultiField,
) -> Markup {
    let ticked = state.members(group);
    html! {
        @for label in group.options() {
            div { (checkbox(label, ticked.contains(label))) }
        }
    }
}

fn header(state: &OrderState) -> Markup {
    let text = |f: TextField| state.text(f);
    html! {
        div.logo { (BRAND_NAME) }
        div.title { "CAKE ORDER FORM" }
        div.row {
            span { "First time order:" }
            (yes_no(state.toggle(ToggleField::FirstTimeOrder)))
        }
        div.row { (field("Name :", text(TextField::Name))) }
        div.grid3 {
            (field("Delivery Date:", text(TextField::DeliveryDate)))
            (field("Phone #:", text(TextField::Phone)))
            (field("Occasion:", text(TextField::Occasion)))
        }
        div.row {
            (field("Tiers requested:", text(TextField::Tiers)))
            (options::<Shape>(state.shape()))
            (field("Custom:", text(TextField::ShapeCustom)))
        }
        div.row {
            span { "Delivery needed?" }
            (yes_no(state.toggle(ToggleField::DeliveryNeeded)))
            (field("If yes, address:", text(TextField::Address)))
        }
    }
}

fn section(
    state: &OrderState,
    group: MultiField,
    other: TextField,
) -> Markup {
    html! {
        div.section-title { (group.title()) }
        (members(state, group))
        (field("Other:", state.text(other)))
    }
}

fn selections(state: &OrderState) -> Markup {
    html! {
        div.grid3 {
            div.section {
                (section(state, MultiField::CakeFlavor, TextField::CakeFlavorOther))
                div.sub { (MultiField::SpecialFlavor.title()) }
                (members(state, MultiField::SpecialFlavor))
                (field("Other:", state.text(TextField::SpecialFlavorOther)))
                p.note { "\u{2022} " (SPECIAL_FLAVOR_NOTE) }
            }
            div.section { (section(state, MultiField::Filling, TextField::FillingOther)) }
            div.section { (section(state, MultiField::Decorative, TextField::DecorativeOther)) }
        }
        div.grid2 {
            div.section {
                div.section-title { "Size" }
                (options::<CakeSize>(state.size()))
                (field("Other:", state.text(TextField::SizeOther)))
            }
            div.section {
                div.section-title { "Please note" }
                ul.notes {
                    @for note in FORM_NOTES {
                        li { (note) }
                    }
                }
            }
        }
    }
}

fn footer(state: &OrderState) -> Markup {
    html! {
        div.row { (field("Special Instructions :", state.text(TextField::SpecialInstructions))) }
        div.footer {
            span { "Date:\u{a0}" }
            span.line { (state.date()) }
        }
        div.handle { (BRAND_HANDLE) }
    }
}

/// Renders the order into a standalone HTML document.
///
/// The readiness marker is emitted last so its presence implies the rest
/// of the form has been parsed.
pub fn render_document(state: &OrderState) -> OrderDocument {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content=(format!("width={CANONICAL_WIDTH_PX}"));
                title { "Cake Order" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.paper id=(FORM_ROOT_ID) {
                    (header(state))
                    (selections(state))
                    (footer(state))
                }
                div id=(READY_MARKER_ID) {}
            }
        }
    };
    OrderDocument {
        html: markup.into_string(),
        width_px: CANONICAL_WIDTH_PX,
    }
}
