//! Reference form host.
//!
//! The tweak filters only need what [`FormField`] describes. This module is a
//! small implementation of it: field declarations with basic validation,
//! widgets that serialize to HTML, and forms binding the two to submitted
//! data. Any other host can plug in by implementing the trait.

mod field;
mod form;
mod widget;

pub use field::{pretty_name, BoundField, Field, FieldKind, REQUIRED_MESSAGE};
pub use form::{data_from_json, FieldSpec, Form, FormSpec, WidgetSpec, DEFAULT_AUTO_ID};
pub use widget::{is_checked, Widget, WidgetKind};

use std::fmt;
use tweak_attrs::Attrs;

/// What the tweak layer consumes from a bound form field.
///
/// Implementations must not change their own state when rendered: the same
/// field is rendered repeatedly with different attribute sets.
pub trait FormField: fmt::Debug + Send + Sync {
    /// The declared field name.
    fn name(&self) -> &str;

    /// The name used in markup (prefixed by the form, if any).
    fn html_name(&self) -> &str;

    fn label(&self) -> String;

    /// The generated `id`, if the form produces ids.
    fn auto_id(&self) -> Option<&str>;

    fn value(&self) -> Option<&str>;

    fn help_text(&self) -> Option<&str> {
        None
    }

    /// Validation messages; empty for unbound or valid fields.
    fn errors(&self) -> &[String];

    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    fn is_required(&self) -> bool;

    /// Lower-case field class name, e.g. `charfield`.
    fn field_type(&self) -> &str;

    /// Lower-case widget class name, e.g. `textinput`.
    fn widget_type(&self) -> &str;

    /// The attributes the widget renders with when nothing is tweaked.
    fn widget_attrs(&self) -> Attrs;

    /// Renders the widget with exactly `attrs` (plus whatever the host adds
    /// on its own, such as `id` or `required`).
    fn render_with(&self, attrs: &Attrs) -> String;

    fn render(&self) -> String {
        self.render_with(&self.widget_attrs())
    }
}
