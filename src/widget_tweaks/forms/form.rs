use super::field::{BoundField, Field, FieldKind};
use super::widget::{Widget, WidgetKind};
use crate::error::{Result, TweaksError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tweak_attrs::{AttrValue, Attrs};

pub const DEFAULT_AUTO_ID: &str = "id_%s";

/// An ordered set of fields plus, once bound, the submitted data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    fields: IndexMap<String, Field>,
    prefix: Option<String>,
    auto_id: Option<String>,
    data: Option<HashMap<String, String>>,
    errors: IndexMap<String, Vec<String>>,
    use_required_attribute: bool,
}

impl Form {
    /// Creates an unbound form.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
            prefix: None,
            auto_id: Some(DEFAULT_AUTO_ID.to_string()),
            data: None,
            errors: IndexMap::new(),
            use_required_attribute: true,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Sets the id format (`%s` is replaced by the html name); `None`
    /// disables automatic ids.
    pub fn with_auto_id(mut self, auto_id: Option<&str>) -> Self {
        self.auto_id = auto_id.map(str::to_string);
        self
    }

    pub fn with_required_attribute(mut self, enabled: bool) -> Self {
        self.use_required_attribute = enabled;
        self
    }

    /// Binds submitted data (keyed by html name) and validates every field.
    pub fn bind(mut self, data: HashMap<String, String>) -> Self {
        self.errors = self
            .fields
            .values()
            .filter_map(|field| {
                let key = self.add_prefix(&field.name);
                let errors = field.clean(data.get(&key).map(String::as_str));
                (!errors.is_empty()).then(|| (field.name.clone(), errors))
            })
            .collect();
        self.data = Some(data);
        self
    }

    pub fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.is_bound() && self.errors.is_empty()
    }

    /// Validation errors by field name. Empty for unbound forms.
    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn add_prefix(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}-{}", prefix, name),
            None => name.to_string(),
        }
    }

    /// Looks up a field and binds it to this form's data.
    pub fn field(&self, name: &str) -> Option<BoundField> {
        let field = self.fields.get(name)?;
        let html_name = self.add_prefix(name);
        let auto_id = self
            .auto_id
            .as_ref()
            .map(|format| auto_id_for(format, &html_name));
        let value = match &self.data {
            Some(data) => data.get(&html_name).cloned(),
            None => field.initial.clone(),
        };

        Some(BoundField {
            field: field.clone(),
            html_name,
            auto_id,
            value,
            errors: self.errors.get(name).cloned().unwrap_or_default(),
            use_required_attribute: self.use_required_attribute,
        })
    }

    /// Builds a form from its serialized description.
    pub fn from_spec(spec: FormSpec) -> Result<Self> {
        let mut fields = Vec::with_capacity(spec.fields.len());
        for field_spec in spec.fields {
            fields.push(field_spec.into_field()?);
        }
        let mut form = Form::new(fields).with_auto_id(spec.auto_id.as_deref());
        if let Some(prefix) = &spec.prefix {
            form = form.with_prefix(prefix);
        }
        Ok(form)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: FormSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }
}

fn auto_id_for(format: &str, html_name: &str) -> String {
    if format.contains("%s") {
        format.replace("%s", html_name)
    } else {
        html_name.to_string()
    }
}

/// Serialized form description, e.g. loaded from a JSON file.
///
/// ```json
/// {
///   "fields": [
///     { "name": "simple", "kind": "char" },
///     { "name": "with_cls", "kind": "char",
///       "widget": { "kind": "text_input", "attrs": { "class": "class0" } } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSpec {
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default = "default_auto_id")]
    pub auto_id: Option<String>,

    pub fields: Vec<FieldSpec>,
}

fn default_auto_id() -> Option<String> {
    Some(DEFAULT_AUTO_ID.to_string())
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: FieldKind,

    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub initial: Option<String>,

    #[serde(default)]
    pub help_text: Option<String>,

    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub choices: Vec<(String, String)>,

    #[serde(default)]
    pub widget: Option<WidgetSpec>,
}

fn default_kind() -> FieldKind {
    FieldKind::Char
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetSpec {
    #[serde(default)]
    pub kind: Option<WidgetKind>,

    /// Strings become `key="value"`, `true` a bare `key`; `false` and
    /// `null` leave the attribute out.
    #[serde(default)]
    pub attrs: IndexMap<String, serde_json::Value>,
}

impl FieldSpec {
    fn into_field(self) -> Result<Field> {
        let mut field = Field::new(&self.name, self.kind).required(self.required);
        field.label = self.label;
        field.initial = self.initial;
        field.help_text = self.help_text;
        field.max_length = self.max_length;
        if !self.choices.is_empty() {
            field = field.choices(self.choices);
        }
        if let Some(widget_spec) = self.widget {
            let kind = widget_spec.kind.unwrap_or(field.kind.default_widget());
            let attrs = json_attrs(&self.name, widget_spec.attrs)?;
            field = field.widget(Widget::new(kind).with_attrs(attrs));
        }
        Ok(field)
    }
}

fn json_attrs(field: &str, attrs: IndexMap<String, serde_json::Value>) -> Result<Attrs> {
    let mut out = Attrs::new();
    for (key, value) in attrs {
        match value {
            serde_json::Value::String(s) => {
                out.insert(&key, s);
            }
            serde_json::Value::Number(n) => {
                out.insert(&key, n.to_string());
            }
            serde_json::Value::Bool(true) => {
                out.insert(&key, AttrValue::Present);
            }
            serde_json::Value::Bool(false) | serde_json::Value::Null => {}
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(TweaksError::Form(format!(
                    "widget attribute '{}' of field '{}' must be a string, number or boolean",
                    key, field
                )));
            }
        }
    }
    Ok(out)
}

/// Converts JSON form data into the string map [`Form::bind`] expects.
pub fn data_from_json(json: &str) -> Result<HashMap<String, String>> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some(Ok((key, s))),
            serde_json::Value::Number(n) => Some(Ok((key, n.to_string()))),
            serde_json::Value::Bool(b) => Some(Ok((key, b.to_string()))),
            serde_json::Value::Null => None,
            _ => Some(Err(TweaksError::Form(format!(
                "value for '{}' must be a string, number or boolean",
                key
            )))),
        })
        .collect()
}
