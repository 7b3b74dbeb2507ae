//! Page-wide default rules.
//!
//! Components render into ordinary elements, which inherit text and layout
//! properties from whatever they are placed in. The `_default_` class resets
//! every inherited property to its initial value so a component looks the same
//! wherever it is mounted.

use crate::css::CssProperties;

/// Class name of the inheritance-reset class.
pub const DEFAULT_CLASS_NAME: &str = "_default_";

const DEFAULT_STYLE_VALUES: &[(&str, &str)] = &[
    ("azimuth", "center"),
    ("border-collapse", "separate"),
    ("border-spacing", "0"),
    ("caption-side", "top"),
    ("direction", "ltr"),
    ("display", "inline-block"),
    ("empty-cells", "show"),
    ("letter-spacing", "normal"),
    ("line-height", "normal"),
    ("list-style-image", "none"),
    ("list-style-position", "outside"),
    ("list-style-type", "disc"),
    ("orphans", "2"),
    ("position", "relative"),
    ("text-align", "left"),
    ("text-indent", "0"),
    ("text-transform", "none"),
    ("visibility", "visible"),
    ("white-space", "normal"),
    ("widows", "2"),
    ("word-spacing", "normal"),
];

/// Declarations of the `_default_` class.
pub fn default_style_values() -> CssProperties {
    DEFAULT_STYLE_VALUES
        .iter()
        .fold(CssProperties::new(), |props, (name, value)| props.with(*name, *value))
}

/// Declarations of the `input` rule; inputs otherwise reset the cursor.
pub fn input_style_values() -> CssProperties {
    CssProperties::new().with("cursor", "inherit")
}
