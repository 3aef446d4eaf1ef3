//! Embed endpoints: loader script, form fragments and submissions.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::router::Handler;
use crate::services::EmbedService;
use crate::services::embed::parse_embed_id;
use crate::submission::parse_submission;

const SCRIPT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
const DATA_CACHE_CONTROL: &str = "public, max-age=300, stale-while-revalidate=60";

/// Body wrapper shared by successful JSON responses.
#[derive(Debug, Serialize)]
struct DataEnvelope<T> {
	data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionAccepted<'a> {
	success: bool,
	message: &'static str,
	embed_id: &'a str,
}

/// `GET /embedv1.js`
pub struct EmbedScriptHandler {
	service: Arc<EmbedService>,
}

impl EmbedScriptHandler {
	pub fn new(service: Arc<EmbedService>) -> Self {
		Self { service }
	}
}

#[async_trait]
impl Handler for EmbedScriptHandler {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let script = self.service.embed_script();
		let revalidated = request.header("if-none-match") == Some(script.etag());
		let response = if revalidated {
			Response::new(http::StatusCode::NOT_MODIFIED)
		} else {
			Response::ok()
				.with_content_type("application/javascript; charset=utf-8")
				.with_body(script.content().to_string())
		};

		Ok(response
			.with_header("Cache-Control", SCRIPT_CACHE_CONTROL)
			.with_header("ETag", script.etag()))
	}
}

/// `GET /api/public/v1/embeds/{embedId}/data?lang=xx`
pub struct EmbedDataHandler {
	service: Arc<EmbedService>,
}

impl EmbedDataHandler {
	pub fn new(service: Arc<EmbedService>) -> Self {
		Self { service }
	}
}

#[async_trait]
impl Handler for EmbedDataHandler {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let form_id = parse_embed_id(request.path_param("embedId").unwrap_or_default())?;
		let lang = request.query("lang").unwrap_or_default();

		let data = self.service.embed_data(form_id, &lang).await?;
		Response::ok()
			.with_header("Cache-Control", DATA_CACHE_CONTROL)
			.with_header("X-Form-Language", &data.lang)
			.with_json(&DataEnvelope { data })
	}
}

/// `POST /api/public/v1/embeds/{embedId}/submissions`
pub struct SubmissionHandler {
	service: Arc<EmbedService>,
}

impl SubmissionHandler {
	pub fn new(service: Arc<EmbedService>) -> Self {
		Self { service }
	}
}

#[async_trait]
impl Handler for SubmissionHandler {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let embed_id = request.path_param("embedId").unwrap_or_default();
		let form_id = parse_embed_id(embed_id)?;

		let data = parse_submission(&request.headers, request.body.clone()).await?;
		self.service.submit(form_id, data, request.headers.clone()).await?;

		Response::ok().with_json(&SubmissionAccepted {
			success: true,
			message: "Form submitted successfully!",
			embed_id,
		})
	}
}
