use super::widget::{is_checked, Widget, WidgetKind};
use super::FormField;
use serde::{Deserialize, Serialize};
use tweak_attrs::{AttrValue, Attrs};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Char,
    Email,
    Integer,
    Boolean,
    Choice,
}

impl FieldKind {
    /// Lower-case class name, as reported by the `field_type` filter.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Char => "charfield",
            FieldKind::Email => "emailfield",
            FieldKind::Integer => "integerfield",
            FieldKind::Boolean => "booleanfield",
            FieldKind::Choice => "choicefield",
        }
    }

    pub fn default_widget(&self) -> WidgetKind {
        match self {
            FieldKind::Char => WidgetKind::TextInput,
            FieldKind::Email => WidgetKind::EmailInput,
            FieldKind::Integer => WidgetKind::NumberInput,
            FieldKind::Boolean => WidgetKind::CheckboxInput,
            FieldKind::Choice => WidgetKind::Select,
        }
    }

    fn takes_max_length(&self) -> bool {
        matches!(self, FieldKind::Char | FieldKind::Email)
    }
}

/// A field declaration: what to ask for and how to validate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub label: Option<String>,
    pub initial: Option<String>,
    pub help_text: Option<String>,
    pub max_length: Option<usize>,
    pub choices: Vec<(String, String)>,
    pub widget: Widget,
}

impl Field {
    /// Creates a required field with the kind's default widget.
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            label: None,
            initial: None,
            help_text: None,
            max_length: None,
            choices: Vec::new(),
            widget: Widget::new(kind.default_widget()),
        }
    }

    pub fn char(name: &str) -> Self {
        Self::new(name, FieldKind::Char)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn initial(mut self, initial: &str) -> Self {
        self.initial = Some(initial.to_string());
        self
    }

    pub fn help_text(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn choices<I, V, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.choices = choices
            .into_iter()
            .map(|(v, l)| (v.into(), l.into()))
            .collect();
        self.widget.choices = self.choices.clone();
        self
    }

    /// Replaces the widget. The field's choices carry over.
    pub fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self.widget.choices = self.choices.clone();
        self
    }

    /// Validates a submitted value, returning the error messages.
    pub fn clean(&self, raw: Option<&str>) -> Vec<String> {
        let value = raw.map(str::trim).unwrap_or_default();
        let empty = match self.kind {
            FieldKind::Boolean => !is_checked(value),
            _ => value.is_empty(),
        };

        if empty {
            return if self.required {
                vec![REQUIRED_MESSAGE.to_string()]
            } else {
                Vec::new()
            };
        }

        let mut errors = Vec::new();
        match self.kind {
            FieldKind::Char | FieldKind::Boolean => {}
            FieldKind::Email => {
                if !looks_like_email(value) {
                    errors.push("Enter a valid email address.".to_string());
                }
            }
            FieldKind::Integer => {
                if value.parse::<i64>().is_err() {
                    errors.push("Enter a whole number.".to_string());
                }
            }
            FieldKind::Choice => {
                if !self.choices.iter().any(|(v, _)| v == value) {
                    errors.push(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        value
                    ));
                }
            }
        }

        if let Some(max) = self.max_length.filter(|_| self.kind.takes_max_length()) {
            let length = value.chars().count();
            if length > max {
                errors.push(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ));
            }
        }

        errors
    }

    /// The attributes the widget starts from, including those implied by
    /// the field (`maxlength`).
    pub fn widget_attrs(&self) -> Attrs {
        let mut attrs = self.widget.default_attrs();
        if let Some(max) = self.max_length.filter(|_| self.kind.takes_max_length()) {
            if !self.widget.kind.is_hidden() && !attrs.contains("maxlength") {
                attrs.insert("maxlength", max.to_string());
            }
        }
        attrs
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Turns a field name into a label: `with_attrs` becomes `With attrs`.
pub fn pretty_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A field together with the data of one form instance.
///
/// Built by [`Form::field`](super::Form::field); every lookup yields a fresh
/// value, so rendering never leaks state into later renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundField {
    pub(super) field: Field,
    pub(super) html_name: String,
    pub(super) auto_id: Option<String>,
    pub(super) value: Option<String>,
    pub(super) errors: Vec<String>,
    pub(super) use_required_attribute: bool,
}

impl BoundField {
    pub fn definition(&self) -> &Field {
        &self.field
    }
}

impl FormField for BoundField {
    fn name(&self) -> &str {
        &self.field.name
    }

    fn html_name(&self) -> &str {
        &self.html_name
    }

    fn label(&self) -> String {
        self.field
            .label
            .clone()
            .unwrap_or_else(|| pretty_name(&self.field.name))
    }

    fn auto_id(&self) -> Option<&str> {
        self.auto_id.as_deref()
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn help_text(&self) -> Option<&str> {
        self.field.help_text.as_deref()
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }

    fn is_required(&self) -> bool {
        self.field.required
    }

    fn field_type(&self) -> &str {
        self.field.kind.type_name()
    }

    fn widget_type(&self) -> &str {
        self.field.widget.kind.type_name()
    }

    fn widget_attrs(&self) -> Attrs {
        self.field.widget_attrs()
    }

    fn render_with(&self, attrs: &Attrs) -> String {
        let mut attrs = attrs.clone();
        let widget = &self.field.widget;

        if self.field.required
            && self.use_required_attribute
            && !widget.kind.is_hidden()
            && !attrs.contains("required")
        {
            attrs.insert("required", AttrValue::Present);
        }
        if !attrs.contains("id") {
            if let Some(id) = &self.auto_id {
                attrs.insert("id", id.as_str());
            }
        }

        let name = match attrs.remove("name") {
            Some(AttrValue::Text(name) | AttrValue::Markup(name)) => name,
            _ => self.html_name.clone(),
        };

        widget.render(&name, self.value.as_deref(), &attrs)
    }
}
