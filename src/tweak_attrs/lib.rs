//! # tweak-attrs - HTML Attribute Edits for Form Widgets
//!
//! A small, framework-free toolkit for changing the attributes of a rendered
//! form widget from template syntax.
//!
//! ## The Problem
//!
//! Form fields are declared in code, but markup concerns (CSS classes, ARIA
//! attributes, framework bindings like `@click` or `v-bind:class`) belong to
//! the templates. Changing the field declaration for every presentational
//! tweak couples the two.
//!
//! ## The Solution
//!
//! Templates describe *edits* to the widget's attributes:
//! - **Parsing** turns `attr:value` (filter syntax) and `attr="value"` /
//!   `attr+="value"` (tag syntax) into [`AttrEdit`]s
//! - **Merging** applies a list of edits to the widget's default attributes
//!   with [`apply_edits`], a pure function; the defaults are never touched
//! - **Serialization** writes the result as HTML attributes
//!
//! ## Quick Example
//!
//! ```rust
//! use tweak_attrs::{apply_edits, AttrEdit, Attrs, EditOp};
//!
//! let defaults = Attrs::new().with("type", "text").with("class", "class0");
//!
//! let edits = vec![
//!     AttrEdit::parse(EditOp::Set, "v-bind::class:{active:True}"),
//!     AttrEdit::append("class", "class1"),
//!     AttrEdit::append("class", "class2"),
//! ];
//!
//! let attrs = apply_edits(&defaults, &edits);
//! assert_eq!(
//!     attrs.to_html(),
//!     r#" type="text" class="class0 class1 class2" v-bind:class="{active:True}""#
//! );
//! ```
//!
//! ## Filter Syntax
//!
//! | input                    | key              | value       |
//! |--------------------------|------------------|-------------|
//! | `foo`                    | `foo`            | present     |
//! | `foo:`                   | `foo`            | `""`        |
//! | `foo:bar`                | `foo`            | `"bar"`     |
//! | `v-bind::class:value`    | `v-bind:class`   | `"value"`   |
//! | `@click.prevent:onClick` | `@click.prevent` | `"onClick"` |
//!
//! The key ends at the first `:` that is not part of a `::` pair; `::` inside
//! the key is an escaped literal colon.
//!
//! ## Tag Syntax
//!
//! [`parse_assignment`] splits `key=value` and `key+=value` pairs. The value
//! is returned as written; interpreting it (quoted literal or variable) is up
//! to the template layer.

use indexmap::IndexMap;
use std::fmt;

/// Attribute that carries a widget's input type (`<input type="...">`).
pub const INPUT_TYPE: &str = "type";

/// Attribute holding CSS classes.
pub const CLASS: &str = "class";

/// The value of a single HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A regular `key="value"` attribute. May be empty (`key=""`).
    Text(String),

    /// Text that is already HTML-escaped; written without escaping again.
    Markup(String),

    /// A boolean attribute, rendered as the bare key (`required`, `disabled`).
    Present,
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    pub fn markup(value: impl Into<String>) -> Self {
        AttrValue::Markup(value.into())
    }

    /// Returns the text of a `Text` or `Markup` value, as stored.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) | AttrValue::Markup(s) => Some(s),
            AttrValue::Present => None,
        }
    }

    /// True for empty text. A present-only attribute is never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, AttrValue::Text(s) | AttrValue::Markup(s) if s.is_empty())
    }

    /// The value as escaped HTML.
    fn to_markup(&self) -> String {
        match self {
            AttrValue::Text(s) => escape_html(s),
            AttrValue::Markup(s) => s.clone(),
            AttrValue::Present => String::new(),
        }
    }

    /// Joins `addition` onto this value with a single space.
    ///
    /// Empty parts are skipped so no stray spaces appear. Appending a
    /// present-only value to text leaves the text as it is. Joining text
    /// with markup escapes the text and yields markup.
    pub fn append(&self, addition: &AttrValue) -> AttrValue {
        match (self, addition) {
            (current, AttrValue::Present) => current.clone(),
            (AttrValue::Present, extra) => extra.clone(),
            (AttrValue::Text(current), AttrValue::Text(extra)) => {
                AttrValue::Text(join_words(current, extra))
            }
            (current, extra) => {
                AttrValue::Markup(join_words(&current.to_markup(), &extra.to_markup()))
            }
        }
    }
}

fn join_words(current: &str, extra: &str) -> String {
    let joined: Vec<&str> = [current, extra]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    joined.join(" ")
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) | AttrValue::Markup(s) => f.write_str(s),
            AttrValue::Present => Ok(()),
        }
    }
}

/// An insertion-ordered attribute mapping.
///
/// Order carries no meaning for HTML, but keeping it makes rendered markup
/// deterministic. Replacing an existing key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: IndexMap<String, AttrValue>,
}

impl Attrs {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, returning the updated mapping for chaining.
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a present-only attribute, returning the updated mapping for chaining.
    pub fn with_flag(mut self, key: &str) -> Self {
        self.insert(key, AttrValue::Present);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    /// Returns the value of `key` if it is a text attribute.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(AttrValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.entries.insert(key.to_string(), value.into())
    }

    /// Removes `key`, keeping the order of the remaining attributes.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy without the given keys.
    pub fn without(&self, keys: &[&str]) -> Attrs {
        self.iter()
            .filter(|(key, _)| !keys.contains(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Writes every attribute as ` key="value"` (or ` key` when present-only).
    pub fn write_html(&self, out: &mut String) {
        for (key, value) in self.iter() {
            write_attr(out, key, value);
        }
    }

    /// Serializes the mapping; each attribute is preceded by a space.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attrs {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Writes a single attribute, escaping text values.
pub fn write_attr(out: &mut String, key: &str, value: &AttrValue) {
    out.push(' ');
    out.push_str(key);
    match value {
        AttrValue::Text(text) => {
            out.push_str("=\"");
            escape_html_into(out, text);
            out.push('"');
        }
        AttrValue::Markup(markup) => {
            out.push_str("=\"");
            out.push_str(markup);
            out.push('"');
        }
        AttrValue::Present => {}
    }
}

/// Escapes text for use in HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

fn escape_html_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// What an edit does to its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Overwrite the value.
    Set,
    /// Space-join onto the current value.
    Append,
    /// Drop the attribute.
    Remove,
}

impl EditOp {
    /// The operator as written in tag syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOp::Set => "=",
            EditOp::Append => "+=",
            EditOp::Remove => "-",
        }
    }

    /// Parses a tag-syntax operator (`=` or `+=`).
    pub fn from_operator(operator: &str) -> Option<EditOp> {
        match operator {
            "=" => Some(EditOp::Set),
            "+=" => Some(EditOp::Append),
            _ => None,
        }
    }
}

/// A single instruction against a widget's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrEdit {
    pub key: String,
    pub op: EditOp,
    pub value: AttrValue,
}

impl AttrEdit {
    pub fn new(key: impl Into<String>, op: EditOp, value: impl Into<AttrValue>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }

    pub fn set(key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self::new(key, EditOp::Set, value)
    }

    pub fn append(key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self::new(key, EditOp::Append, value)
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::new(key, EditOp::Remove, AttrValue::Present)
    }

    /// Builds an edit from filter syntax (`key`, `key:`, `key:value`, `a::b:value`).
    ///
    /// Never fails: anything without a separating colon is a present-only
    /// attribute. For [`EditOp::Remove`] the whole spec is the key.
    pub fn parse(op: EditOp, spec: &str) -> Self {
        if op == EditOp::Remove {
            return Self::remove(unescape_key(spec));
        }
        let (key, value) = split_attr_spec(spec);
        Self { key, op, value }
    }

    /// True when the edit changes the widget's input type rather than a
    /// literal attribute.
    pub fn targets_input_type(&self) -> bool {
        self.key == INPUT_TYPE
    }
}

/// Splits filter syntax into key and value.
///
/// The split happens at the first `:` that is neither preceded nor followed
/// by another `:`. `::` in the key becomes a literal `:`; the value is kept
/// verbatim.
pub fn split_attr_spec(spec: &str) -> (String, AttrValue) {
    let bytes = spec.as_bytes();
    let split = (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && (i == 0 || bytes[i - 1] != b':') && bytes.get(i + 1) != Some(&b':')
    });

    match split {
        Some(i) => (
            unescape_key(&spec[..i]),
            AttrValue::Text(spec[i + 1..].to_string()),
        ),
        None => (unescape_key(spec), AttrValue::Present),
    }
}

fn unescape_key(key: &str) -> String {
    key.replace("::", ":")
}

/// Characters allowed in a tag-syntax attribute key.
pub fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | ':')
}

/// A `key=value` / `key+=value` pair from tag syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// The key with `::` unescaped.
    pub key: String,
    pub op: EditOp,
    /// The value exactly as written (quotes included).
    pub value: &'a str,
}

/// Parses one tag-syntax pair.
///
/// # Examples
/// ```
/// use tweak_attrs::{parse_assignment, EditOp};
///
/// let pair = parse_assignment(r#"class+="wide""#).unwrap();
/// assert_eq!(pair.key, "class");
/// assert_eq!(pair.op, EditOp::Append);
/// assert_eq!(pair.value, r#""wide""#);
///
/// let pair = parse_assignment(r#"x-on::click.away="open=false""#).unwrap();
/// assert_eq!(pair.key, "x-on:click.away");
///
/// assert!(parse_assignment("novalue").is_err());
/// assert!(parse_assignment(r#"="x""#).is_err());
/// assert!(parse_assignment("class=").is_err());
/// ```
pub fn parse_assignment(pair: &str) -> Result<Assignment<'_>, AssignmentError> {
    let key_end = pair
        .char_indices()
        .find(|(_, c)| !is_key_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(pair.len());
    let (key, rest) = pair.split_at(key_end);

    if key.is_empty() {
        return Err(AssignmentError::MissingKey);
    }

    let (op, value) = if let Some(value) = rest.strip_prefix("+=") {
        (EditOp::Append, value)
    } else if let Some(value) = rest.strip_prefix('=') {
        (EditOp::Set, value)
    } else {
        return Err(match rest.chars().next() {
            Some(c) => AssignmentError::InvalidCharacter(c),
            None => AssignmentError::MissingOperator,
        });
    };

    if value.is_empty() {
        return Err(AssignmentError::MissingValue);
    }

    Ok(Assignment {
        key: unescape_key(key),
        op,
        value,
    })
}

/// Error type for tag-syntax pair failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    /// Nothing before the operator
    MissingKey,
    /// The key contains a character that is not allowed
    InvalidCharacter(char),
    /// No `=` or `+=` after the key
    MissingOperator,
    /// Nothing after the operator
    MissingValue,
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::MissingKey => write!(f, "attribute name is missing"),
            AssignmentError::InvalidCharacter(ch) => {
                write!(f, "attribute name contains invalid character '{}'", ch)
            }
            AssignmentError::MissingOperator => {
                write!(f, "expected '=' or '+=' after the attribute name")
            }
            AssignmentError::MissingValue => write!(f, "attribute value is missing"),
        }
    }
}

impl std::error::Error for AssignmentError {}

/// Applies `edits` in order to a copy of `defaults`.
///
/// - `Set` overwrites.
/// - `Append` joins onto the value produced by earlier edits in this list,
///   or onto the default when no earlier edit touched the key.
/// - `Remove` drops the key; a later `Append` starts from nothing.
///
/// `defaults` is only read, so rendering the same widget again always starts
/// from its original attributes.
pub fn apply_edits(defaults: &Attrs, edits: &[AttrEdit]) -> Attrs {
    let mut attrs = defaults.clone();
    for edit in edits {
        match edit.op {
            EditOp::Set => {
                attrs.insert(&edit.key, edit.value.clone());
            }
            EditOp::Append => {
                let merged = match attrs.get(&edit.key) {
                    Some(current) => current.append(&edit.value),
                    None => edit.value.clone(),
                };
                attrs.insert(&edit.key, merged);
            }
            EditOp::Remove => {
                attrs.remove(&edit.key);
            }
        }
    }
    attrs
}
