//! The `render_field` tag.
//!
//! ```text
//! {% render_field form.name class+="wide" placeholder=form.name.label %}
//! ```
//!
//! minijinja has no hook for custom block tags, so tags are compiled away
//! before a template is handed to the engine: [`compile_template`] rewrites
//! every `render_field` tag into a call of the `render_field` function the
//! engine registers. Malformed tags fail here, at load time, with the line
//! they appear on.
//!
//! The rewrite keeps whitespace-control markers (`{%-`, `-%}`) and the
//! number of lines, so engine errors still point at the right line. Comments
//! and `{% raw %}` sections are copied untouched.

use crate::error::{Result, TweaksError};
use crate::tweak::TweakedField;
use tweak_attrs::{parse_assignment, AttrEdit, CLASS};

pub const TAG_NAME: &str = "render_field";

/// Context variable naming the class added to fields with errors.
pub const ERROR_CLASS_VAR: &str = "WIDGET_ERROR_CLASS";

/// Context variable naming the class added to required fields.
pub const REQUIRED_CLASS_VAR: &str = "WIDGET_REQUIRED_CLASS";

const USAGE: &str = "'render_field' tag requires a form field followed by a list of attributes and values in the form attr=\"value\"";

/// The value side of a tag pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExpr {
    /// A quoted string, without its quotes.
    Literal(String),
    /// A template expression resolved at render time (`form.name.label`).
    Variable(String),
}

impl ValueExpr {
    fn parse(raw: &str) -> Option<ValueExpr> {
        match raw.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
                (!inner.contains(quote)).then(|| ValueExpr::Literal(inner.to_string()))
            }
            _ => is_expression(raw).then(|| ValueExpr::Variable(raw.to_string())),
        }
    }

    fn to_source(&self) -> Result<String> {
        Ok(match self {
            ValueExpr::Literal(text) => serde_json::to_string(text)?,
            ValueExpr::Variable(expr) => expr.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttr {
    pub key: String,
    pub op: tweak_attrs::EditOp,
    pub value: ValueExpr,
}

/// A parsed `render_field` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFieldTag {
    pub field: String,
    pub attrs: Vec<TagAttr>,
}

impl RenderFieldTag {
    /// Parses the tag arguments (everything after the tag name).
    ///
    /// The error is the message to report, without a line number.
    pub fn parse(args: &str) -> std::result::Result<Self, String> {
        let bits = split_bits(args);
        let Some((field, pairs)) = bits.split_first() else {
            return Err(USAGE.to_string());
        };
        if !is_expression(field) {
            return Err(format!("{}: {}", USAGE, field));
        }

        let attrs = pairs
            .iter()
            .map(|pair| {
                let invalid = || format!("{}: {}", USAGE, pair);
                let assignment = parse_assignment(pair).map_err(|_| invalid())?;
                let value = ValueExpr::parse(assignment.value).ok_or_else(invalid)?;
                Ok(TagAttr {
                    key: assignment.key,
                    op: assignment.op,
                    value,
                })
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        Ok(Self {
            field: field.to_string(),
            attrs,
        })
    }

    /// The function call the tag compiles to:
    /// `render_field(form.x, [["key", "=", "value"], ...])`.
    pub fn to_call(&self) -> Result<String> {
        let mut pairs = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            pairs.push(format!(
                "[{}, {}, {}]",
                serde_json::to_string(&attr.key)?,
                serde_json::to_string(attr.op.as_str())?,
                attr.value.to_source()?
            ));
        }
        Ok(format!("{}({}, [{}])", TAG_NAME, self.field, pairs.join(", ")))
    }
}

/// Splits on whitespace that is not inside quotes.
pub fn split_bits(args: &str) -> Vec<&str> {
    let mut bits = Vec::new();
    let mut start = None;
    let mut quote = None;

    for (i, c) in args.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    bits.push(&args[s..i]);
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        bits.push(&args[s..]);
    }
    bits
}

fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == separator => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_path(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|atom| {
            is_identifier(atom) || (!atom.is_empty() && atom.chars().all(|c| c.is_ascii_digit()))
        })
}

fn is_quoted(text: &str) -> bool {
    matches!(ValueExpr::parse(text), Some(ValueExpr::Literal(_)))
}

fn is_filter(text: &str) -> bool {
    match text.split_once('(') {
        None => is_identifier(text),
        Some((name, rest)) => {
            let Some(args) = rest.strip_suffix(')') else {
                return false;
            };
            is_identifier(name)
                && (args.trim().is_empty()
                    || split_outside_quotes(args, ',').into_iter().all(|arg| {
                        let arg = arg.trim();
                        is_quoted(arg) || is_path(arg)
                    }))
        }
    }
}

/// A variable path optionally followed by `|filter` or `|filter(args)`.
fn is_expression(text: &str) -> bool {
    let parts = split_outside_quotes(text, '|');
    match parts.split_first() {
        Some((path, filters)) => is_path(path) && filters.iter().all(|f| is_filter(f)),
        None => false,
    }
}

/// Finds the end (exclusive) of the delimiter `close`, skipping quoted text.
fn find_close(text: &str, from: usize, close: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if bytes[i..].starts_with(close.as_bytes()) => return Some(i + close.len()),
            None => {}
        }
        i += 1;
    }
    None
}

/// A `{% ... %}` block split into its parts.
struct Block<'a> {
    lead: &'a str,
    body: &'a str,
    trail: &'a str,
}

impl<'a> Block<'a> {
    fn parse(block: &'a str) -> Block<'a> {
        let inner = &block[2..block.len() - 2];
        let (lead, inner) = match inner.strip_prefix(['-', '+']) {
            Some(rest) => (&inner[..1], rest),
            None => ("", inner),
        };
        let (trail, inner) = match inner.strip_suffix(['-', '+']) {
            Some(rest) => (&inner[rest.len()..], rest),
            None => ("", inner),
        };
        Block {
            lead,
            body: inner.trim(),
            trail,
        }
    }

    fn name(&self) -> &'a str {
        self.body.split_whitespace().next().unwrap_or_default()
    }

    fn args(&self) -> &'a str {
        self.body[self.name().len()..].trim()
    }
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Rewrites every `render_field` tag in `source` into a function call.
pub fn compile_template(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    let mut tags = 0;

    while let Some(found) = source[pos..].find('{') {
        let start = pos + found;
        out.push_str(&source[pos..start]);
        let tail = &source[start..];

        let end = if tail.starts_with("{#") {
            tail.find("#}").map_or(tail.len(), |i| i + 2)
        } else if tail.starts_with("{{") {
            find_close(tail, 2, "}}").unwrap_or(tail.len())
        } else if tail.starts_with("{%") {
            // an unbalanced quote must not swallow the rest of the template
            let close = find_close(tail, 2, "%}").or_else(|| tail[2..].find("%}").map(|i| i + 4));
            match close {
                Some(end) => {
                    let block = Block::parse(&tail[..end]);
                    match block.name() {
                        "raw" => end + skip_raw(&tail[end..]),
                        TAG_NAME => {
                            let tag = RenderFieldTag::parse(block.args()).map_err(|message| {
                                TweaksError::TemplateSyntax {
                                    line: line_at(source, start),
                                    message,
                                }
                            })?;
                            write_call(&mut out, &block, &tag, &tail[..end])?;
                            tags += 1;
                            pos = start + end;
                            continue;
                        }
                        _ => end,
                    }
                }
                None => tail.len(),
            }
        } else {
            1
        };

        out.push_str(&tail[..end]);
        pos = start + end;
    }
    out.push_str(&source[pos..]);

    if tags > 0 {
        tracing::debug!(tags, "compiled render_field tags");
    }
    Ok(out)
}

/// Length of `text` up to and including the `{% endraw %}` block.
///
/// Raw content is not template syntax, so quotes inside it are not tracked.
fn skip_raw(text: &str) -> usize {
    let mut pos = 0;
    while let Some(found) = text[pos..].find("{%") {
        let start = pos + found;
        let Some(close) = text[start + 2..].find("%}") else {
            break;
        };
        let end = start + 2 + close + 2;
        if Block::parse(&text[start..end]).name() == "endraw" {
            return end;
        }
        pos = start + 2;
    }
    text.len()
}

fn write_call(out: &mut String, block: &Block, tag: &RenderFieldTag, raw: &str) -> Result<()> {
    out.push_str("{{");
    if block.lead == "-" {
        out.push('-');
    }
    out.push(' ');
    out.push_str(&tag.to_call()?);
    for _ in 0..raw.matches('\n').count() {
        out.push('\n');
    }
    out.push(' ');
    if block.trail == "-" {
        out.push('-');
    }
    out.push_str("}}");
    Ok(())
}

/// Classes the tag adds on top of the written pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetClasses {
    pub error: Option<String>,
    pub required: Option<String>,
}

/// Applies a tag's edits: the written pairs in order, then the required
/// class, then the error class.
pub fn render_field(
    field: &TweakedField,
    edits: Vec<AttrEdit>,
    classes: &WidgetClasses,
) -> TweakedField {
    let mut tweaked = field.with_edits(edits);
    let inner = field.field();

    if let Some(class) = non_empty(&classes.required) {
        if inner.is_required() {
            tweaked = tweaked.with_edit(AttrEdit::append(CLASS, class));
        }
    }
    if let Some(class) = non_empty(&classes.error) {
        if inner.has_errors() {
            tweaked = tweaked.with_edit(AttrEdit::append(CLASS, class));
        }
    }
    tweaked
}

fn non_empty(class: &Option<String>) -> Option<&str> {
    class.as_deref().filter(|c| !c.is_empty())
}
