//! The filter registry.
//!
//! Filters are not registered globally: a [`Library`] is an explicit
//! name → filter table handed to the engine setup step, which installs every
//! entry into the template environment.

use crate::tweak::{self, TweakedField};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// A filter that adds edits to a field.
pub type TweakFn = fn(&TweakedField, &str) -> TweakedField;

/// A filter that reports something about a field.
pub type IntrospectFn = fn(&TweakedField) -> String;

#[derive(Clone, Copy)]
pub enum Filter {
    Tweak(TweakFn),
    Introspect(IntrospectFn),
}

/// What a filter produced.
#[derive(Debug, Clone)]
pub enum FilterOutput {
    Field(TweakedField),
    Text(String),
}

impl Filter {
    pub fn takes_argument(&self) -> bool {
        matches!(self, Filter::Tweak(_))
    }

    /// Runs the filter. A missing field always yields empty text.
    pub fn apply(&self, field: Option<&TweakedField>, arg: &str) -> FilterOutput {
        let Some(field) = field else {
            return FilterOutput::Text(String::new());
        };
        match self {
            Filter::Tweak(f) => FilterOutput::Field(f(field, arg)),
            Filter::Introspect(f) => FilterOutput::Text(f(field)),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Tweak(_) => f.write_str("Filter::Tweak"),
            Filter::Introspect(_) => f.write_str("Filter::Introspect"),
        }
    }
}

static STANDARD: Lazy<Library> = Lazy::new(|| {
    Library::new()
        .add("attr", Filter::Tweak(tweak::set_attr))
        .add("append_attr", Filter::Tweak(tweak::append_attr))
        .add("add_class", Filter::Tweak(tweak::add_class))
        .add("set_data", Filter::Tweak(tweak::set_data))
        .add("behave", Filter::Tweak(tweak::behave))
        .add("remove_attr", Filter::Tweak(tweak::remove_attr))
        .add("add_error_class", Filter::Tweak(tweak::add_error_class))
        .add("add_error_attr", Filter::Tweak(tweak::add_error_attr))
        .add("add_required_class", Filter::Tweak(tweak::add_required_class))
        .add("field_type", Filter::Introspect(tweak::field_type))
        .add("widget_type", Filter::Introspect(tweak::widget_type))
});

#[derive(Debug, Clone, Default)]
pub struct Library {
    filters: IndexMap<String, Filter>,
}

impl Library {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in filters.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Adds (or replaces) a filter, returning the library for chaining.
    pub fn add(mut self, name: &str, filter: Filter) -> Self {
        self.filters.insert(name.to_string(), filter);
        self
    }

    pub fn get(&self, name: &str) -> Option<Filter> {
        self.filters.get(name).copied()
    }

    pub fn has(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Filter)> {
        self.filters.iter().map(|(name, filter)| (name.as_str(), *filter))
    }

    /// Runs the named filter; unknown names yield `None`.
    pub fn apply(
        &self,
        name: &str,
        field: Option<&TweakedField>,
        arg: &str,
    ) -> Option<FilterOutput> {
        let filter = self.get(name)?;
        if field.is_none() {
            tracing::debug!(filter = name, "no field given, rendering nothing");
        }
        Some(filter.apply(field, arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Field, Form};

    fn field() -> TweakedField {
        let form = Form::new([Field::char("simple")]);
        TweakedField::from_field(form.field("simple").unwrap())
    }

    #[test]
    fn test_new_library_is_empty() {
        let library = Library::new();
        assert!(library.is_empty());
        assert_eq!(library.len(), 0);
    }

    #[test]
    fn test_standard_library() {
        let library = Library::standard();
        assert_eq!(library.len(), 11);
        for name in [
            "attr",
            "append_attr",
            "add_class",
            "set_data",
            "behave",
            "remove_attr",
            "add_error_class",
            "add_error_attr",
            "add_required_class",
            "field_type",
            "widget_type",
        ] {
            assert!(library.has(name), "missing {}", name);
        }
    }

    #[test]
    fn test_standard_is_a_fresh_copy() {
        let extended = Library::standard().add("extra", Filter::Introspect(tweak::field_type));
        assert!(extended.has("extra"));
        assert!(!Library::standard().has("extra"));
    }

    #[test]
    fn test_add_custom_filter() {
        fn autofocus(field: &TweakedField, _: &str) -> TweakedField {
            tweak::set_attr(field, "autofocus")
        }
        let library = Library::standard().add("autofocus", Filter::Tweak(autofocus));
        assert!(library.has("autofocus"));

        match library.apply("autofocus", Some(&field()), "") {
            Some(FilterOutput::Field(f)) => assert!(f.to_html().contains(" autofocus")),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_empty_text() {
        let library = Library::standard();
        for (name, _) in library.iter() {
            match library.apply(name, None, "foo:bar") {
                Some(FilterOutput::Text(text)) => assert_eq!(text, ""),
                other => panic!("{} returned {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_unknown_filter() {
        assert!(Library::standard().apply("nope", Some(&field()), "").is_none());
    }

    #[test]
    fn test_introspection_output() {
        match Library::standard().apply("widget_type", Some(&field()), "") {
            Some(FilterOutput::Text(text)) => assert_eq!(text, "textinput"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_takes_argument() {
        let library = Library::standard();
        assert!(library.get("attr").unwrap().takes_argument());
        assert!(!library.get("field_type").unwrap().takes_argument());
    }
}
