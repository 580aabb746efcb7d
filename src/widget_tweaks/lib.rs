//! # Widget Tweaks Architecture
//!
//! Widget Tweaks lets **templates** change the HTML attributes of form field
//! widgets. Field definitions say what is asked for; templates decide how it
//! looks, down to classes, ARIA attributes and framework bindings.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Renders/checks template files, edits configuration       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine Layer (engine.rs, tag.rs)                           │
//! │  - Installs filters and the render_field tag into minijinja │
//! │  - Compiles render_field tags at template load time         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Tweak Layer (tweak.rs, library.rs)                         │
//! │  - Filters add attribute edits to a TweakedField            │
//! │  - Library is the explicit name → filter table              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Attribute Layer (tweak-attrs crate)                        │
//! │  - Parses attr:value / attr="value" / attr+="value"         │
//! │  - apply_edits: (defaults, edits) → final attributes        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The form host sits beside these layers: anything implementing
//! [`forms::FormField`] can be tweaked. The [`forms`] module ships a small
//! reference host (fields, widgets, validation) so the rest can be used and
//! tested end to end.
//!
//! ## Key Principle: Rendering Never Mutates
//!
//! A filter does not patch the field it receives. It returns a new
//! [`tweak::TweakedField`] carrying one more edit, and the edits are only
//! applied when the value is written out. Rendering the same field twice in
//! one template therefore never leaks attributes from the first render into
//! the second.
//!
//! ## Silence on Missing Fields
//!
//! Every filter and the `render_field` tag render nothing for a missing or
//! falsy field (`{{ form.typo|add_class("x") }}` is empty, not an error).
//! Malformed `render_field` tags, on the other hand, fail when the template
//! is loaded.

pub mod config;
pub mod engine;
pub mod error;
pub mod forms;
pub mod library;
pub mod tag;
pub mod tweak;

pub use engine::{register_tweaks, render, Context, Renderer};
pub use error::{Result, TweaksError};
pub use library::Library;
pub use tweak::TweakedField;
