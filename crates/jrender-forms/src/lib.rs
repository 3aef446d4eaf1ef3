//! Multi-language form rendering.
//!
//! This crate turns a declarative form (fields, validation rules and
//! translations) plus a separate styling description (grid placement,
//! label layouts and per-field-type CSS) into HTML, CSS and JavaScript.
//!
//! ## Pipeline
//!
//! 1. [`language`] picks the locale and each field's translation.
//! 2. [`layout`] merges the default, per-type and per-breakpoint label
//!    layouts and derives layout classes.
//! 3. [`fields`] renders each field through a typed dispatch table, with
//!    all user text escaped by [`html::SafeHtml`].
//! 4. [`css`] generates the form-specific stylesheet.
//! 5. [`engine`] and [`compose`] assemble a full document or an embed
//!    fragment, and [`script`] builds the embed loader.
//!
//! Rendering is pure: the same input always yields byte-identical output,
//! and the engine types can be shared across threads without locking.
//!
//! ## Example
//!
//! ```
//! use jrender_forms::{EmbeddedFormEngine, FormData};
//!
//! let form: FormData = serde_json::from_str(r#"{
//!     "id": "6f1c1a52-2f8e-4b8b-9d59-5d3c8a1c1f10",
//!     "name": "Newsletter",
//!     "form_definition": {
//!         "languages": { "default": "en", "supported": ["en", "de"] },
//!         "fields": [{ "id": "email", "name": "email", "type": "email",
//!                      "translations": { "en": { "label": "Email" }, "de": { "label": "E-Mail" } } }]
//!     },
//!     "form_styling": { "canvas_layout": { "rows": [{ "id": "r", "columns": [
//!         { "id": "c", "fields": [{ "field_id": "email" }] }
//!     ] }] } }
//! }"#).unwrap();
//!
//! let engine = EmbeddedFormEngine::default();
//! let fragment = engine.generate_embed_data("embed-1", &form, "de").unwrap();
//! assert_eq!(fragment.lang, "de");
//! assert!(fragment.html.contains("E-Mail"));
//! ```

pub mod classes;
pub mod compose;
pub mod css;
pub mod engine;
pub mod error;
pub mod fields;
pub mod html;
pub mod language;
pub mod layout;
pub mod model;
pub mod script;

pub use compose::{DynamicFormData, EmbeddedFormEngine};
pub use engine::{FormCoreData, FormCoreEngine};
pub use error::{RenderError, RenderResult};
pub use fields::FieldRenderer;
pub use model::{FormData, FormDefinition, FormStyling};
pub use script::EmbedScript;
