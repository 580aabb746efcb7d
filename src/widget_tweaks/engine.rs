//! minijinja integration.
//!
//! [`register_tweaks`] installs a [`Library`] into an `Environment`: every
//! filter, the `render_field` function the tag compiles to, the configured
//! widget classes as globals, and an output formatter that writes tweaked
//! fields as markup instead of escaping them.
//!
//! [`Renderer`] wraps an environment set up this way and compiles
//! `render_field` tags in every template it loads.
//!
//! ```rust
//! use widget_tweaks::engine::{form_value, Renderer};
//! use widget_tweaks::forms::{Field, Form};
//!
//! let form = Form::new([Field::char("name")]);
//! let renderer = Renderer::new();
//! let html = renderer
//!     .render_str(
//!         r#"{{ form.name|add_class("wide") }}"#,
//!         minijinja::context! { form => form_value(form) },
//!     )
//!     .unwrap();
//! assert!(html.contains(r#"class="wide""#));
//! ```

use crate::config::TweaksConfig;
use crate::error::{Result, TweaksError};
use crate::forms::{Form, FormField};
use crate::library::{FilterOutput, Library};
use crate::tag::{self, WidgetClasses, ERROR_CLASS_VAR, REQUIRED_CLASS_VAR, TAG_NAME};
use crate::tweak::TweakedField;
use indexmap::IndexMap;
use minijinja::value::{Enumerator, Object, ObjectRepr};
use minijinja::{Environment, Error, ErrorKind, State, Value};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tweak_attrs::{AttrEdit, AttrValue, EditOp};

impl Object for TweakedField {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let field = self.field();
        let value = match key.as_str()? {
            "name" => Value::from(field.name()),
            "html_name" => Value::from(field.html_name()),
            "label" => Value::from(field.label()),
            "auto_id" | "id_for_label" => optional(field.auto_id()),
            "value" => optional(field.value()),
            "help_text" => optional(field.help_text()),
            "errors" => Value::from(field.errors().to_vec()),
            "required" | "is_required" => Value::from(field.is_required()),
            "field_type" => Value::from(field.field_type()),
            "widget_type" => Value::from(field.widget_type()),
            _ => return None,
        };
        Some(value)
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        f.write_str(&self.to_html())
    }
}

fn optional(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::from(()))
}

/// A form as seen by templates: `form.<field>` yields the bound field,
/// iteration yields field names.
#[derive(Debug)]
pub struct FormObject(Form);

impl Object for FormObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let name = key.as_str()?;
        if let Some(field) = self.0.field(name) {
            return Some(Value::from_object(TweakedField::from_field(field)));
        }
        match name {
            "errors" => Some(Value::from_serialize(self.0.errors())),
            "is_bound" => Some(Value::from(self.0.is_bound())),
            "is_valid" => Some(Value::from(self.0.is_valid())),
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.0.field_names().map(Value::from).collect())
    }
}

/// Wraps a form for use in a template context.
pub fn form_value(form: Form) -> Value {
    Value::from_object(FormObject(form))
}

/// Wraps a single field for use in a template context.
pub fn field_value<F: FormField + 'static>(field: F) -> Value {
    Value::from_object(TweakedField::from_field(field))
}

/// Template variables, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Context {
    vars: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_form(self, key: &str, form: Form) -> Self {
        self.with(key, form_value(form))
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.vars.insert(key.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Installs the library's filters, the `render_field` function, the
/// configured widget classes and the field-aware formatter.
///
/// This does not compile `{% render_field %}` tags. Templates using the tag
/// must be added with [`add_template`] (or through a [`Renderer`]); a plain
/// `Environment::add_template` rejects the tag as an unknown statement.
pub fn register_tweaks(env: &mut Environment<'static>, library: &Library, config: &TweaksConfig) {
    for (name, filter) in library.iter() {
        let filter_name = name.to_string();
        env.add_filter(
            name.to_string(),
            move |value: Value, arg: Option<String>| -> std::result::Result<Value, Error> {
                let field = field_arg(&value, &filter_name)?;
                if field.is_none() {
                    tracing::debug!(filter = %filter_name, "no field given, rendering nothing");
                }
                let output = filter.apply(field.as_ref(), arg.as_deref().unwrap_or_default());
                Ok(match output {
                    FilterOutput::Field(tweaked) => Value::from_object(tweaked),
                    FilterOutput::Text(text) => Value::from(text),
                })
            },
        );
    }

    env.add_function(TAG_NAME, render_field);

    let classes = config.widget_classes();
    if let Some(class) = classes.error {
        env.add_global(ERROR_CLASS_VAR, Value::from(class));
    }
    if let Some(class) = classes.required {
        env.add_global(REQUIRED_CLASS_VAR, Value::from(class));
    }

    env.set_formatter(|out, state, value| {
        if let Some(field) = value.downcast_object_ref::<TweakedField>() {
            return out.write_str(&field.to_html()).map_err(|_| {
                Error::new(ErrorKind::WriteFailure, "could not write rendered field")
            });
        }
        minijinja::escape_formatter(out, state, value)
    });
}

/// Accepts a field, treats falsy input as "no field" and rejects anything
/// else.
fn field_arg(value: &Value, filter: &str) -> std::result::Result<Option<TweakedField>, Error> {
    if let Some(field) = value.downcast_object_ref::<TweakedField>() {
        return Ok(Some(field.clone()));
    }
    if value.is_undefined() || value.is_none() || !value.is_true() {
        return Ok(None);
    }
    Err(Error::new(
        ErrorKind::InvalidOperation,
        format!("'{}' expects a form field, got {}", filter, value.kind()),
    ))
}

/// Compiles the `render_field` tags in `source` and adds the result to
/// `env` under `name`.
pub fn add_template(env: &mut Environment<'static>, name: &str, source: &str) -> Result<()> {
    let compiled = tag::compile_template(source)?;
    env.add_template_owned(name.to_string(), compiled)
        .map_err(TweaksError::Template)
}

/// Target of a compiled `render_field` tag.
fn render_field(
    state: &State,
    field: Value,
    attrs: Vec<Value>,
) -> std::result::Result<Value, Error> {
    let Some(field) = field_arg(&field, TAG_NAME)? else {
        tracing::debug!("render_field without a field, rendering nothing");
        return Ok(Value::from(""));
    };

    let edits = attrs
        .iter()
        .map(edit_from_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let classes = WidgetClasses {
        error: lookup_class(state, ERROR_CLASS_VAR),
        required: lookup_class(state, REQUIRED_CLASS_VAR),
    };

    Ok(Value::from_object(tag::render_field(&field, edits, &classes)))
}

fn edit_from_value(pair: &Value) -> std::result::Result<AttrEdit, Error> {
    let invalid = || Error::new(ErrorKind::InvalidOperation, "malformed render_field attribute");

    let key = pair.get_item_by_index(0)?;
    let op = pair.get_item_by_index(1)?;
    let value = pair.get_item_by_index(2)?;

    let key = key.as_str().ok_or_else(invalid)?;
    let op = op
        .as_str()
        .and_then(EditOp::from_operator)
        .ok_or_else(invalid)?;
    let value = if value.is_undefined() || value.is_none() {
        AttrValue::text("")
    } else if value.is_safe() {
        AttrValue::markup(value.to_string())
    } else {
        AttrValue::text(value.to_string())
    };

    Ok(AttrEdit::new(key, op, value))
}

fn lookup_class(state: &State, name: &str) -> Option<String> {
    state
        .lookup(name)
        .filter(|value| !value.is_undefined() && !value.is_none())
        .map(|value| value.to_string())
}

/// Loads `name` from `dir`, compiling `render_field` tags on the way.
fn load_template(dir: &Path, name: &str) -> std::result::Result<Option<String>, Error> {
    if name.split(['/', '\\']).any(|segment| segment == "..") || Path::new(name).is_absolute() {
        return Ok(None);
    }

    let source = match fs::read_to_string(dir.join(name)) {
        Ok(source) => source,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {}", name),
            )
            .with_source(err))
        }
    };

    tracing::debug!(template = name, "loading template");
    tag::compile_template(&source)
        .map(Some)
        .map_err(|err| Error::new(ErrorKind::SyntaxError, err.to_string()))
}

/// A template environment with the tweak library installed.
///
/// ```rust
/// use widget_tweaks::engine::{Context, Renderer};
/// use widget_tweaks::forms::{Field, Form};
///
/// let mut renderer = Renderer::new();
/// renderer
///     .add_template("signup", r#"{% render_field form.email type="email" %}"#)
///     .unwrap();
///
/// let context = Context::new().with_form("form", Form::new([Field::char("email")]));
/// let html = renderer.render("signup", &context).unwrap();
/// assert!(html.contains(r#"type="email""#));
/// ```
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Creates a renderer with the standard filters and default settings.
    pub fn new() -> Self {
        Self::with_library(&Library::standard(), &TweaksConfig::default())
    }

    pub fn with_library(library: &Library, config: &TweaksConfig) -> Self {
        let mut env = Environment::new();
        register_tweaks(&mut env, library, config);
        Self { env }
    }

    /// Loads templates on demand from `dir` (for `include`, `extends` and
    /// [`Renderer::render`]).
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.env
            .set_loader(move |name: &str| load_template(&dir, name));
        self
    }

    /// Registers a named template.
    ///
    /// Tags are compiled immediately; syntax errors are returned here.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<()> {
        add_template(&mut self.env, name, source)
    }

    /// Renders a registered (or loadable) template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(data)?)
    }

    /// Compiles and renders a one-off template.
    pub fn render_str<T: Serialize>(&self, source: &str, data: T) -> Result<String> {
        let compiled = tag::compile_template(source)?;
        Ok(self.env.render_str(&compiled, data)?)
    }

    /// Compiles a template without rendering it.
    pub fn check(&self, source: &str) -> Result<()> {
        let mut env = self.env.clone();
        add_template(&mut env, "<check>", source)
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a one-off template with the standard library.
pub fn render<T: Serialize>(template: &str, data: T) -> Result<String> {
    Renderer::new().render_str(template, data)
}
