use serde::{Deserialize, Serialize};
use tweak_attrs::{escape_html, write_attr, AttrValue, Attrs, INPUT_TYPE};

const TEXTAREA_COLS: &str = "40";
const TEXTAREA_ROWS: &str = "10";

/// The kinds of widget the reference host can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    TextInput,
    EmailInput,
    NumberInput,
    PasswordInput,
    HiddenInput,
    CheckboxInput,
    Textarea,
    Select,
}

impl WidgetKind {
    /// The `type` of the rendered `<input>`, or `None` for non-input widgets.
    pub fn input_type(&self) -> Option<&'static str> {
        match self {
            WidgetKind::TextInput => Some("text"),
            WidgetKind::EmailInput => Some("email"),
            WidgetKind::NumberInput => Some("number"),
            WidgetKind::PasswordInput => Some("password"),
            WidgetKind::HiddenInput => Some("hidden"),
            WidgetKind::CheckboxInput => Some("checkbox"),
            WidgetKind::Textarea | WidgetKind::Select => None,
        }
    }

    /// Lower-case class name, as reported by the `widget_type` filter.
    pub fn type_name(&self) -> &'static str {
        match self {
            WidgetKind::TextInput => "textinput",
            WidgetKind::EmailInput => "emailinput",
            WidgetKind::NumberInput => "numberinput",
            WidgetKind::PasswordInput => "passwordinput",
            WidgetKind::HiddenInput => "hiddeninput",
            WidgetKind::CheckboxInput => "checkboxinput",
            WidgetKind::Textarea => "textarea",
            WidgetKind::Select => "select",
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, WidgetKind::HiddenInput)
    }
}

/// Produces the markup for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    /// Attributes declared on the widget itself.
    pub attrs: Attrs,
    /// `(value, label)` pairs, used by `Select`.
    pub choices: Vec<(String, String)>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            choices: Vec::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// The attributes a render starts from: the input type first, then the
    /// built-in defaults, then the declared attributes.
    pub fn default_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        if let Some(input_type) = self.kind.input_type() {
            attrs.insert(INPUT_TYPE, input_type);
        }
        if self.kind == WidgetKind::Textarea {
            attrs.insert("cols", TEXTAREA_COLS);
            attrs.insert("rows", TEXTAREA_ROWS);
        }
        for (key, value) in self.attrs.iter() {
            attrs.insert(key, value.clone());
        }
        attrs
    }

    /// Serializes the widget.
    ///
    /// `type` is taken from `attrs`, or from the widget kind when `attrs`
    /// has none, and written once ahead of everything else; non-input
    /// widgets ignore it.
    pub fn render(&self, name: &str, value: Option<&str>, attrs: &Attrs) -> String {
        match self.kind {
            WidgetKind::Textarea => self.render_textarea(name, value, attrs),
            WidgetKind::Select => self.render_select(name, value, attrs),
            _ => self.render_input(name, value, attrs),
        }
    }

    fn render_input(&self, name: &str, value: Option<&str>, attrs: &Attrs) -> String {
        let mut out = String::from("<input");
        match attrs.get(INPUT_TYPE) {
            Some(input_type) => write_attr(&mut out, INPUT_TYPE, input_type),
            None => {
                if let Some(input_type) = self.kind.input_type() {
                    write_attr(&mut out, INPUT_TYPE, &AttrValue::text(input_type));
                }
            }
        }
        write_attr(&mut out, "name", &AttrValue::text(name));

        match self.kind {
            WidgetKind::CheckboxInput => {
                if value.is_some_and(is_checked) && !attrs.contains("checked") {
                    write_attr(&mut out, "checked", &AttrValue::Present);
                }
            }
            WidgetKind::PasswordInput => {}
            _ => {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    if !attrs.contains("value") {
                        write_attr(&mut out, "value", &AttrValue::text(value));
                    }
                }
            }
        }

        attrs.without(&[INPUT_TYPE]).write_html(&mut out);
        out.push('>');
        out
    }

    fn render_textarea(&self, name: &str, value: Option<&str>, attrs: &Attrs) -> String {
        let mut out = String::from("<textarea");
        write_attr(&mut out, "name", &AttrValue::text(name));
        attrs.without(&[INPUT_TYPE]).write_html(&mut out);
        out.push_str(">\n");
        out.push_str(&escape_html(value.unwrap_or_default()));
        out.push_str("</textarea>");
        out
    }

    fn render_select(&self, name: &str, value: Option<&str>, attrs: &Attrs) -> String {
        let mut out = String::from("<select");
        write_attr(&mut out, "name", &AttrValue::text(name));
        attrs.without(&[INPUT_TYPE]).write_html(&mut out);
        out.push('>');
        for (option_value, label) in &self.choices {
            out.push_str("\n  <option");
            write_attr(&mut out, "value", &AttrValue::text(option_value.as_str()));
            if value == Some(option_value.as_str()) {
                write_attr(&mut out, "selected", &AttrValue::Present);
            }
            out.push('>');
            out.push_str(&escape_html(label));
            out.push_str("</option>");
        }
        out.push_str("\n</select>");
        out
    }
}

/// Whether a submitted checkbox value counts as checked.
pub fn is_checked(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attrs_put_type_first() {
        let widget = Widget::new(WidgetKind::TextInput).with_attr("class", "class0");
        assert_eq!(
            widget.default_attrs().to_html(),
            r#" type="text" class="class0""#
        );
    }

    #[test]
    fn test_declared_type_overrides_kind() {
        let widget = Widget::new(WidgetKind::TextInput).with_attr("type", "search");
        assert_eq!(widget.default_attrs().get_text("type"), Some("search"));
        assert_eq!(widget.default_attrs().len(), 1);
    }

    #[test]
    fn test_render_input() {
        let widget = Widget::new(WidgetKind::TextInput);
        let attrs = widget.default_attrs().with("id", "id_simple");
        assert_eq!(
            widget.render("simple", Some("hi"), &attrs),
            r#"<input type="text" name="simple" value="hi" id="id_simple">"#
        );
    }

    #[test]
    fn test_render_input_type_written_once() {
        let widget = Widget::new(WidgetKind::TextInput);
        let attrs = widget.default_attrs().with("type", "date");
        let html = widget.render("d", None, &attrs);
        assert_eq!(html.matches("type=").count(), 1);
        assert!(html.contains(r#"type="date""#));
    }

    #[test]
    fn test_render_input_falls_back_to_kind_type() {
        let widget = Widget::new(WidgetKind::EmailInput);
        assert_eq!(
            widget.render("x", None, &Attrs::new()),
            r#"<input type="email" name="x">"#
        );
    }

    #[test]
    fn test_render_password_hides_value() {
        let widget = Widget::new(WidgetKind::PasswordInput);
        let html = widget.render("pw", Some("secret"), &widget.default_attrs());
        assert!(!html.contains("secret"));
    }

    #[test]
    fn test_render_checkbox() {
        let widget = Widget::new(WidgetKind::CheckboxInput);
        let attrs = widget.default_attrs();
        assert_eq!(
            widget.render("agree", Some("on"), &attrs),
            r#"<input type="checkbox" name="agree" checked>"#
        );
        assert!(!widget.render("agree", Some("false"), &attrs).contains("checked"));
    }

    #[test]
    fn test_render_textarea_ignores_type() {
        let widget = Widget::new(WidgetKind::Textarea);
        let attrs = widget.default_attrs().with("type", "date");
        assert_eq!(
            widget.render("bio", Some("a < b"), &attrs),
            "<textarea name=\"bio\" cols=\"40\" rows=\"10\">\na &lt; b</textarea>"
        );
    }

    #[test]
    fn test_render_select_marks_selection() {
        let mut widget = Widget::new(WidgetKind::Select);
        widget.choices = vec![
            ("s".to_string(), "Small".to_string()),
            ("l".to_string(), "Large".to_string()),
        ];
        let html = widget.render("size", Some("l"), &Attrs::new());
        assert!(html.starts_with(r#"<select name="size">"#));
        assert!(html.contains(r#"<option value="l" selected>Large</option>"#));
        assert!(html.contains(r#"<option value="s">Small</option>"#));
        assert!(html.ends_with("</select>"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(WidgetKind::TextInput.type_name(), "textinput");
        assert_eq!(WidgetKind::Select.type_name(), "select");
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked("on"));
        assert!(is_checked("True"));
        assert!(!is_checked("off"));
        assert!(!is_checked(" 0 "));
    }
}
