//! # jrender
//!
//! Renders multi-language form definitions into HTML, CSS and JavaScript.
//!
//! ## Crates
//!
//! - [`forms`]: the rendering engine (languages, layouts, field markup, CSS,
//!   standalone documents and embed fragments)
//! - [`server`]: the HTTP service that fetches definitions from the jform
//!   service, serves rendered forms and relays submissions (feature `server`)
//!
//! ## Quick Example
//!
//! ```
//! use jrender::prelude::*;
//!
//! let form: FormData = serde_json::from_str(r#"{
//!     "id": "8a3e0f52-8f5b-4d3e-9a61-0b7f1c2d3e4f",
//!     "name": "Newsletter",
//!     "form_definition": {
//!         "languages": { "default": "en", "supported": ["en", "fr"] },
//!         "fields": [{
//!             "id": "email", "name": "email", "type": "email", "required": true,
//!             "translations": { "en": { "label": "Email" }, "fr": { "label": "Courriel" } }
//!         }]
//!     },
//!     "form_styling": { "canvas_layout": { "rows": [{ "id": "r", "columns": [
//!         { "id": "c", "fields": [{ "field_id": "email" }] }
//!     ] }] } }
//! }"#).unwrap();
//!
//! let data = EmbeddedFormEngine::default()
//!     .generate_embed_data("8a3e0f52-8f5b-4d3e-9a61-0b7f1c2d3e4f", &form, "fr")
//!     .unwrap();
//! assert_eq!(data.lang, "fr");
//! assert!(data.html.contains("Courriel"));
//! ```

pub use jrender_forms as forms;
#[cfg(feature = "server")]
pub use jrender_server as server;

/// Commonly used types.
pub mod prelude {
	pub use jrender_forms::{
		DynamicFormData, EmbedScript, EmbeddedFormEngine, FieldRenderer, FormCoreEngine, FormData,
		RenderError, RenderResult,
	};

	#[cfg(feature = "server")]
	pub use jrender_server::{ApiError, ApiResult, FormSource, HttpServer, JformClient, Router, Settings};
}
