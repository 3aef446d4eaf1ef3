//! The core engine: CSS, HTML and JS of one form.

use crate::classes::transform_classes;
use crate::css::{self, STATIC_CSS};
use crate::error::{RenderError, RenderResult};
use crate::fields::{FieldContext, FieldRenderer};
use crate::html::SafeHtml;
use crate::layout::{column_classes, row_classes};
use crate::model::{FormDefinition, FormStyling};
use crate::script;

/// Default origin that receives form submissions.
pub const DEFAULT_SUBMISSION_BASE_URL: &str = "http://localhost:9000";

const CORE_SCRIPT: &str = include_str!("../assets/form_core.js");

const NOSCRIPT_NOTICE: &str = concat!(
	r#"<noscript><div class="jform-message jform-message-info">"#,
	r#"<svg class="jform-message-icon" fill="currentColor" viewBox="0 0 20 20"><path fill-rule="evenodd" d="M18 10a8 8 0 11-16 0 8 8 0 0116 0zm-7-4a1 1 0 11-2 0 1 1 0 012 0zM9 9a1 1 0 000 2v3a1 1 0 001 1h1a1 1 0 100-2v-3a1 1 0 00-1-1H9z" clip-rule="evenodd"/></svg>"#,
	r#"<div class="jform-message-content"><strong>JavaScript is disabled.</strong> "#,
	"The form will still work, but the page will reload when you submit.</div></div></noscript>",
);

/// Input of one render call.
#[derive(Debug, Clone, Copy)]
pub struct FormCoreData<'a> {
	/// Id placed in the submission URL and the `data-jform-id` attribute.
	pub form_id: &'a str,
	/// Locale the form is rendered in.
	pub lang: &'a str,
	pub definition: &'a FormDefinition,
	pub styling: &'a FormStyling,
}

/// Produces the CSS, HTML and JS of a form.
///
/// The engine holds no per-form state. One instance is shared by every
/// request.
#[derive(Debug, Clone)]
pub struct FormCoreEngine {
	renderer: FieldRenderer,
	submission_base_url: String,
}

impl Default for FormCoreEngine {
	fn default() -> Self {
		Self::new(FieldRenderer::default(), DEFAULT_SUBMISSION_BASE_URL)
	}
}

impl FormCoreEngine {
	pub fn new(renderer: FieldRenderer, submission_base_url: impl Into<String>) -> Self {
		Self {
			renderer,
			submission_base_url: submission_base_url.into(),
		}
	}

	/// URL the form of `form_id` posts to.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::FormCoreEngine;
	///
	/// let engine = FormCoreEngine::default();
	/// assert_eq!(
	///     engine.submission_url("abc"),
	///     "http://localhost:9000/api/public/v1/embeds/abc/submissions"
	/// );
	/// ```
	pub fn submission_url(&self, form_id: &str) -> String {
		format!(
			"{}/api/public/v1/embeds/{form_id}/submissions",
			self.submission_base_url.trim_end_matches('/')
		)
	}

	/// Stylesheet shared by every form.
	pub fn generate_css_static(&self) -> &'static str {
		STATIC_CSS
	}

	/// Stylesheet specific to one form.
	pub fn generate_css_dynamic(&self, data: &FormCoreData<'_>) -> RenderResult<String> {
		let mut out = String::new();
		let field_types = data.definition.fields.iter().map(|field| field.kind.as_str());
		css::write_field_css(&mut out, &data.styling.styling, field_types)
			.map_err(|err| RenderError::format("dynamic CSS", err))?;
		Ok(out)
	}

	/// Markup of the form: container, message area, rows, columns, fields.
	///
	/// Field references that do not resolve to a field are skipped.
	pub fn generate_html(&self, data: &FormCoreData<'_>) -> RenderResult<String> {
		let styling = data.styling;
		let canvas = &styling.canvas_layout;
		let mut html = SafeHtml::new();

		html.open("div")
			.attr(
				"class",
				format!("form-container {}", transform_classes(&styling.styling.form_container.classes)).trim_end(),
			)
			.close()
			.open("div")
			.attr("id", &format!("jform-message-{}", data.form_id))
			.attr("class", "jform-hidden")
			.close()
			.end("div")
			.markup(NOSCRIPT_NOTICE)
			.open("form")
			.attr("action", &self.submission_url(data.form_id))
			.attr("method", "POST")
			.attr("class", &transform_classes(&canvas.container_classes))
			.attr("data-jform-id", data.form_id)
			.close();

		for row in &canvas.rows {
			html.open("div").attr("id", &row.id).attr("class", &row_classes(row)).close();
			for column in &row.columns {
				html.open("div")
					.attr("id", &column.id)
					.attr("class", &column_classes(column))
					.close();
				for reference in &column.fields {
					match data.definition.field(&reference.field_id) {
						Some(field) => {
							let ctx = FieldContext::new(field, data.lang, &styling.styling);
							html.push(&self.renderer.render(&ctx));
						}
						None => {
							tracing::debug!(
								form_id = data.form_id,
								field_id = %reference.field_id,
								"skipping unresolved field reference"
							);
						}
					}
				}
				html.end("div");
			}
			html.end("div");
		}

		html.end("form").end("div");
		Ok(html.into_string())
	}

	/// Inline script enabling validation and asynchronous submission.
	pub fn generate_javascript(&self, data: &FormCoreData<'_>) -> RenderResult<String> {
		Ok(CORE_SCRIPT
			.replace(script::SHARED_SCRIPT_PLACEHOLDER, script::SHARED_SCRIPT)
			.replace("__JFORM_FORM_ID__", &script::js_string_literal(data.form_id)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn form() -> (FormDefinition, FormStyling) {
		let definition = serde_json::from_value(json!({
			"languages": { "default": "en", "supported": ["en"] },
			"fields": [
				{ "id": "f1", "name": "name", "type": "text", "translations": { "en": { "label": "Name" } } }
			]
		}))
		.unwrap();
		let styling = serde_json::from_value(json!({
			"canvas_layout": {
				"container_classes": "space-y-8 my-form",
				"rows": [{ "id": "r1", "columns": [{
					"id": "c1",
					"responsive_spans": { "lg": 6 },
					"fields": [{ "field_id": "missing" }, { "field_id": "f1" }]
				}] }]
			},
			"styling": { "form_container": { "classes": "max-w-7xl mx-auto" } }
		}))
		.unwrap();
		(definition, styling)
	}

	#[rstest]
	fn test_html_structure(form: (FormDefinition, FormStyling)) {
		let (definition, styling) = form;
		let data = FormCoreData {
			form_id: "form-1",
			lang: "en",
			definition: &definition,
			styling: &styling,
		};

		let html = FormCoreEngine::default().generate_html(&data).unwrap();
		assert!(html.starts_with(
			"<div class=\"form-container jform-max-w-7xl jform-mx-auto\"><div id=\"jform-message-form-1\" class=\"jform-hidden\"></div><noscript>"
		));
		assert!(html.contains(
			"<form action=\"http://localhost:9000/api/public/v1/embeds/form-1/submissions\" method=\"POST\" class=\"jform-space-y-8 my-form\" data-jform-id=\"form-1\">"
		));
		assert!(html.contains("<div id=\"r1\" class=\"jform-grid jform-lg-grid-cols-12\"><div id=\"c1\" class=\"jform-lg-col-6 jform-col-12\"><div class=\"field-type-text\">"));
		assert!(html.ends_with("</div></div></form></div>"));
	}

	#[rstest]
	fn test_javascript_embeds_form_id_as_literal(form: (FormDefinition, FormStyling)) {
		let (definition, styling) = form;
		let data = FormCoreData {
			form_id: "x'</script>",
			lang: "en",
			definition: &definition,
			styling: &styling,
		};

		let js = FormCoreEngine::default().generate_javascript(&data).unwrap();
		assert!(js.starts_with("<script type=\"text/javascript\">"));
		assert!(js.contains("var formId = 'x\\'\\u003c/script\\u003e';"));
		assert!(js.contains("function validateField(field)"));
		assert!(!js.contains("__JFORM_"));
	}

	#[rstest]
	fn test_submission_base_url_is_configurable() {
		let engine = FormCoreEngine::new(FieldRenderer::default(), "https://forms.example.com/");
		assert_eq!(
			engine.submission_url("id"),
			"https://forms.example.com/api/public/v1/embeds/id/submissions"
		);
	}
}
