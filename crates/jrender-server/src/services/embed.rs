//! Embed loader, embed fragments and submission forwarding.

use http::HeaderMap;
use jrender_forms::{DynamicFormData, EmbedScript, EmbeddedFormEngine};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::remote::FormSource;

/// Parse an embed id from a path segment.
pub fn parse_embed_id(embed_id: &str) -> ApiResult<Uuid> {
	Uuid::parse_str(embed_id).map_err(|err| {
		tracing::warn!(error = %err, embed_id, "invalid embed ID");
		ApiError::bad_request("invalid embed ID")
	})
}

pub struct EmbedService {
	source: Arc<dyn FormSource>,
	engine: Arc<EmbeddedFormEngine>,
	script: EmbedScript,
}

impl EmbedService {
	/// The embed loader is generated here, once, for `api_base_url`.
	pub fn new(source: Arc<dyn FormSource>, engine: Arc<EmbeddedFormEngine>, api_base_url: &str) -> Self {
		Self {
			source,
			engine,
			script: EmbedScript::generate(api_base_url),
		}
	}

	pub fn embed_script(&self) -> &EmbedScript {
		&self.script
	}

	/// Fragment of form `form_id` in the best available language.
	pub async fn embed_data(&self, form_id: Uuid, requested_lang: &str) -> ApiResult<DynamicFormData> {
		let form = self.source.get_form(form_id).await.map_err(|err| {
			tracing::error!(error = %err, %form_id, "failed to get form from jform service");
			ApiError::internal("failed to get form from jform service")
		})?;

		let data = self
			.engine
			.generate_embed_data(&form_id.to_string(), &form, requested_lang)?;
		tracing::debug!(%form_id, requested_lang, lang = %data.lang, "rendered embed fragment");
		Ok(data)
	}

	pub async fn submit(&self, form_id: Uuid, data: Map<String, Value>, headers: HeaderMap) -> ApiResult<()> {
		self.source.submit_form(form_id, data, headers).await
	}
}
