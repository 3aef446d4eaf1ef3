//! Composition of the core artifacts into deliverables.
//!
//! Direct rendering produces a complete HTML document. Embed rendering
//! produces a serializable fragment that the embed loader injects into a
//! host page.

use serde::Serialize;
use std::fmt::Write;

use crate::engine::{FormCoreData, FormCoreEngine};
use crate::error::{RenderError, RenderResult};
use crate::html::escape;
use crate::language::select_language;
use crate::model::FormData;

const DOCUMENT_RESET_CSS: &str = "* { box-sizing: border-box; }\n\
	body { margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; \
	line-height: 1.6; color: #111827; background: transparent; }\n";

/// Form fragment consumed by the embed loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicFormData {
	/// Locale the fragment was rendered in.
	pub lang: String,
	pub form_id: String,
	/// Form-specific stylesheet. The static stylesheet ships with the loader.
	pub css: String,
	pub html: String,
}

/// Renders forms as documents or embed fragments.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFormEngine {
	core: FormCoreEngine,
}

impl EmbeddedFormEngine {
	pub fn new(core: FormCoreEngine) -> Self {
		Self { core }
	}

	pub fn core(&self) -> &FormCoreEngine {
		&self.core
	}

	/// Render `form` as a standalone HTML document in its default locale.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::{EmbeddedFormEngine, FormData};
	///
	/// let form: FormData = serde_json::from_str(r#"{
	///     "id": "6f1c1a52-2f8e-4b8b-9d59-5d3c8a1c1f10",
	///     "name": "Contact <us>",
	///     "form_definition": {
	///         "languages": { "default": "en", "supported": ["en"] },
	///         "fields": [{ "id": "f1", "name": "n", "type": "text", "translations": { "en": { "label": "Name" } } }]
	///     }
	/// }"#).unwrap();
	///
	/// let document = EmbeddedFormEngine::default().generate_document(&form).unwrap();
	/// assert!(document.starts_with("<!DOCTYPE html>"));
	/// assert!(document.contains("<title>Contact &lt;us&gt;</title>"));
	/// ```
	pub fn generate_document(&self, form: &FormData) -> RenderResult<String> {
		let form_id = form.id.to_string();
		let lang = form.form_definition.languages.default.as_str();
		let data = FormCoreData {
			form_id: &form_id,
			lang,
			definition: &form.form_definition,
			styling: &form.form_styling,
		};

		let css_static = self.core.generate_css_static();
		let css_dynamic = self.core.generate_css_dynamic(&data)?;
		let html = self.core.generate_html(&data)?;
		let javascript = self.core.generate_javascript(&data)?;

		let mut document = String::with_capacity(css_static.len() + css_dynamic.len() + html.len() + javascript.len() + 1024);
		write!(
			document,
			"<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n\
			 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
			 <title>{title}</title>\n<style>\n{DOCUMENT_RESET_CSS}{css_static}\n{css_dynamic}</style>\n</head>\n\
			 <body>\n{html}\n{javascript}</body>\n</html>\n",
			lang = escape(lang),
			title = escape(&form.name),
		)
		.map_err(|err| RenderError::format("HTML document", err))?;

		Ok(document)
	}

	/// Render the embed fragment of `form` for the requested locale.
	///
	/// Unsupported or empty locales fall back to the form's default locale.
	pub fn generate_embed_data(&self, form_id: &str, form: &FormData, requested_lang: &str) -> RenderResult<DynamicFormData> {
		let languages = &form.form_definition.languages;
		let lang = select_language(requested_lang, &languages.supported, &languages.default);
		let data = FormCoreData {
			form_id,
			lang,
			definition: &form.form_definition,
			styling: &form.form_styling,
		};

		Ok(DynamicFormData {
			lang: lang.to_string(),
			form_id: form_id.to_string(),
			css: self.core.generate_css_dynamic(&data)?,
			html: self.core.generate_html(&data)?,
		})
	}
}
