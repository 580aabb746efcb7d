//! Attribute tweaks on a bound field.
//!
//! A [`TweakedField`] is a shared field plus the edits collected so far. Each
//! filter returns a new value with one more edit; nothing is rendered until
//! the value is written out, at which point the edits are applied to the
//! widget's default attributes with [`apply_edits`].

use crate::forms::FormField;
use std::sync::Arc;
use tweak_attrs::{apply_edits, AttrEdit, Attrs, EditOp, CLASS};

const DATA_PREFIX: &str = "data-";
const BEHAVIOR_KEY: &str = "filters";

#[derive(Debug, Clone)]
pub struct TweakedField {
    field: Arc<dyn FormField>,
    edits: Vec<AttrEdit>,
}

impl TweakedField {
    pub fn new(field: Arc<dyn FormField>) -> Self {
        Self {
            field,
            edits: Vec::new(),
        }
    }

    pub fn from_field<F: FormField + 'static>(field: F) -> Self {
        Self::new(Arc::new(field))
    }

    pub fn field(&self) -> &dyn FormField {
        self.field.as_ref()
    }

    pub fn edits(&self) -> &[AttrEdit] {
        &self.edits
    }

    /// Returns a copy with `edit` added to the end of the chain.
    pub fn with_edit(&self, edit: AttrEdit) -> Self {
        let mut edits = self.edits.clone();
        edits.push(edit);
        Self {
            field: Arc::clone(&self.field),
            edits,
        }
    }

    pub fn with_edits(&self, edits: impl IntoIterator<Item = AttrEdit>) -> Self {
        edits
            .into_iter()
            .fold(self.clone(), |tweaked, edit| tweaked.with_edit(edit))
    }

    /// The attributes the widget will be rendered with.
    pub fn final_attrs(&self) -> Attrs {
        let attrs = apply_edits(&self.field.widget_attrs(), &self.edits);
        tracing::trace!(
            field = self.field.html_name(),
            edits = self.edits.len(),
            "applied attribute edits"
        );
        attrs
    }

    pub fn to_html(&self) -> String {
        self.field.render_with(&self.final_attrs())
    }
}

/// `attr`: sets `key` (or `key:value`).
pub fn set_attr(field: &TweakedField, spec: &str) -> TweakedField {
    field.with_edit(AttrEdit::parse(EditOp::Set, spec))
}

/// `append_attr`: space-joins the value onto the current one.
pub fn append_attr(field: &TweakedField, spec: &str) -> TweakedField {
    field.with_edit(AttrEdit::parse(EditOp::Append, spec))
}

pub fn add_class(field: &TweakedField, classes: &str) -> TweakedField {
    field.with_edit(AttrEdit::append(CLASS, classes))
}

/// `set_data`: `key:value` becomes `data-key="value"`.
pub fn set_data(field: &TweakedField, spec: &str) -> TweakedField {
    let mut edit = AttrEdit::parse(EditOp::Set, spec);
    edit.key = format!("{}{}", DATA_PREFIX, edit.key);
    field.with_edit(edit)
}

/// `behave`: names behaviors for behavior.js in `data-filters`.
pub fn behave(field: &TweakedField, names: &str) -> TweakedField {
    set_data(field, &format!("{}:{}", BEHAVIOR_KEY, names))
}

pub fn remove_attr(field: &TweakedField, key: &str) -> TweakedField {
    field.with_edit(AttrEdit::parse(EditOp::Remove, key))
}

pub fn add_error_class(field: &TweakedField, classes: &str) -> TweakedField {
    if field.field().has_errors() {
        add_class(field, classes)
    } else {
        field.clone()
    }
}

pub fn add_error_attr(field: &TweakedField, spec: &str) -> TweakedField {
    if field.field().has_errors() {
        set_attr(field, spec)
    } else {
        field.clone()
    }
}

pub fn add_required_class(field: &TweakedField, classes: &str) -> TweakedField {
    if field.field().is_required() {
        add_class(field, classes)
    } else {
        field.clone()
    }
}

pub fn field_type(field: &TweakedField) -> String {
    field.field().field_type().to_string()
}

pub fn widget_type(field: &TweakedField) -> String {
    field.field().widget_type().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Field, FieldKind, Form, Widget, WidgetKind};
    use std::collections::HashMap;

    fn form() -> Form {
        Form::new([
            Field::char("simple"),
            Field::char("with_attrs").widget(
                Widget::new(WidgetKind::TextInput)
                    .with_attr("foo", "baz")
                    .with_attr("egg", "spam"),
            ),
            Field::char("with_cls")
                .widget(Widget::new(WidgetKind::TextInput).with_attr("class", "class0")),
            Field::new("optional", FieldKind::Integer).required(false),
        ])
    }

    fn tweaked(form: &Form, name: &str) -> TweakedField {
        TweakedField::from_field(form.field(name).unwrap())
    }

    #[test]
    fn test_untweaked_renders_like_field() {
        let form = form();
        let field = tweaked(&form, "simple");
        assert_eq!(field.to_html(), form.field("simple").unwrap().render());
    }

    #[test]
    fn test_set_attr() {
        let field = set_attr(&tweaked(&form(), "simple"), "foo:bar");
        assert_eq!(field.to_html().matches(r#"foo="bar""#).count(), 1);
    }

    #[test]
    fn test_set_attr_overrides_default() {
        let html = set_attr(&tweaked(&form(), "with_attrs"), "foo:bar").to_html();
        assert!(html.contains(r#"foo="bar""#));
        assert!(html.contains(r#"egg="spam""#));
        assert!(!html.contains("baz"));
    }

    #[test]
    fn test_set_attr_twice() {
        let field = tweaked(&form(), "simple");
        let html = set_attr(&set_attr(&field, "foo:bar"), "foo:bar").to_html();
        assert_eq!(html.matches(r#"foo="bar""#).count(), 1);
    }

    #[test]
    fn test_chain_does_not_touch_original() {
        let base = tweaked(&form(), "with_cls");
        let _ = add_class(&base, "class1");
        assert!(base.edits().is_empty());
        assert_eq!(base.to_html().matches("class1").count(), 0);
    }

    #[test]
    fn test_add_class_chain() {
        let base = tweaked(&form(), "with_cls");
        let html = add_class(&add_class(&base, "class1"), "class2").to_html();
        assert!(html.contains(r#"class="class0 class1 class2""#));
        assert_eq!(html.matches("class0").count(), 1);
    }

    #[test]
    fn test_append_attr_without_default() {
        let html = append_attr(&tweaked(&form(), "simple"), "class:foo").to_html();
        assert!(html.contains(r#"class="foo""#));
    }

    #[test]
    fn test_set_data() {
        let html = set_data(&tweaked(&form(), "simple"), "key:value").to_html();
        assert!(html.contains(r#"data-key="value""#));
    }

    #[test]
    fn test_behave() {
        let html = behave(&tweaked(&form(), "simple"), "foo").to_html();
        assert!(html.contains(r#"data-filters="foo""#));
    }

    #[test]
    fn test_remove_attr() {
        let html = remove_attr(&tweaked(&form(), "with_attrs"), "foo").to_html();
        assert!(!html.contains("foo"));
        assert!(html.contains(r#"egg="spam""#));
    }

    #[test]
    fn test_type_attr_replaces_input_type() {
        let html = set_attr(&tweaked(&form(), "simple"), "type:date").to_html();
        assert!(html.contains(r#"type="date""#));
        assert_eq!(html.matches("type=").count(), 1);
    }

    #[test]
    fn test_error_filters_need_errors() {
        let unbound = form();
        let field = tweaked(&unbound, "simple");
        assert!(!add_error_class(&field, "err").to_html().contains("err"));
        assert!(!add_error_attr(&field, "aria-invalid:true")
            .to_html()
            .contains("aria-invalid"));

        let bound = form().bind(HashMap::new());
        let field = tweaked(&bound, "simple");
        assert!(add_error_class(&field, "err")
            .to_html()
            .contains(r#"class="err""#));
        assert!(add_error_attr(&field, "aria-invalid:true")
            .to_html()
            .contains(r#"aria-invalid="true""#));
    }

    #[test]
    fn test_required_class() {
        let form = form();
        let html = add_required_class(&tweaked(&form, "simple"), "req").to_html();
        assert!(html.contains(r#"class="req""#));
        let html = add_required_class(&tweaked(&form, "optional"), "req").to_html();
        assert!(!html.contains("req\""));
    }

    #[test]
    fn test_introspection() {
        let form = form();
        assert_eq!(field_type(&tweaked(&form, "simple")), "charfield");
        assert_eq!(widget_type(&tweaked(&form, "simple")), "textinput");
        assert_eq!(field_type(&tweaked(&form, "optional")), "integerfield");
    }
}
