#![allow(dead_code)]

use widget_tweaks::engine::{form_value, Context, Renderer};
use widget_tweaks::forms::{Field, Form, Widget, WidgetKind};

/// The fixture form: a plain field and two with declared widget attributes.
pub fn my_form() -> Form {
    Form::new([
        Field::char("simple"),
        Field::char("with_attrs").widget(
            Widget::new(WidgetKind::TextInput)
                .with_attr("foo", "baz")
                .with_attr("egg", "spam"),
        ),
        Field::char("with_cls")
            .widget(Widget::new(WidgetKind::TextInput).with_attr("class", "class0")),
    ])
}

/// A bound form with unrelated data, so every field has errors.
pub fn err_form() -> Form {
    my_form().bind([("foo".to_string(), "bar".to_string())].into())
}

/// Renders `text` with `form` (or the fixture) in context plus `vars`.
pub fn render_form_with(text: &str, form: Option<Form>, vars: &[(&str, &str)]) -> String {
    let mut context = Context::new().with("form", form_value(form.unwrap_or_else(my_form)));
    for (key, value) in vars {
        context.insert(key, *value);
    }
    Renderer::new().render_str(text, &context).unwrap()
}

pub fn render_form(text: &str) -> String {
    render_form_with(text, None, &[])
}

fn filter_chain(field: &str, filters: &[(&str, &str)]) -> String {
    let chain: String = filters
        .iter()
        .map(|(name, arg)| format!("|{}({})", name, serde_json::to_string(arg).unwrap()))
        .collect();
    format!("{{{{ form.{}{} }}}}", field, chain)
}

/// Renders `field` of the fixture with a chain of `(filter, argument)`.
pub fn render_field(field: &str, filters: &[(&str, &str)]) -> String {
    render_form(&filter_chain(field, filters))
}

pub fn render_field_of(form: Form, field: &str, filters: &[(&str, &str)]) -> String {
    render_form_with(&filter_chain(field, filters), Some(form), &[])
}

/// Renders `field` of the fixture through the `render_field` tag.
pub fn render_field_from_tag(field: &str, attrs: &[&str]) -> String {
    let attrs: String = attrs.iter().map(|a| format!(" {}", a)).collect();
    render_form(&format!("{{% render_field form.{}{} %}}", field, attrs))
}
