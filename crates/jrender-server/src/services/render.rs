//! Direct rendering of a form as a standalone page.

use jrender_forms::EmbeddedFormEngine;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::remote::FormSource;

pub struct RenderService {
	source: Arc<dyn FormSource>,
	engine: Arc<EmbeddedFormEngine>,
}

impl RenderService {
	pub fn new(source: Arc<dyn FormSource>, engine: Arc<EmbeddedFormEngine>) -> Self {
		Self { source, engine }
	}

	/// Complete HTML document of the form identified by `form_id`.
	///
	/// Upstream errors are returned as reported by the form source.
	pub async fn render_form(&self, form_id: &str) -> ApiResult<String> {
		let id = Uuid::parse_str(form_id).map_err(|err| {
			tracing::warn!(error = %err, form_id, "invalid form ID");
			ApiError::bad_request("invalid form ID")
		})?;

		let form = self.source.get_form(id).await.inspect_err(|err| {
			tracing::error!(error = %err, %id, "failed to get form from jform service");
		})?;
		if let Err(err) = form.form_definition.validate() {
			tracing::warn!(error = %err, %id, "rendering form with an inconsistent definition");
		}

		Ok(self.engine.generate_document(&form)?)
	}
}
