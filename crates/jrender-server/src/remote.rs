//! Client of the upstream form service.

use async_trait::async_trait;
use http::HeaderMap;
use jrender_forms::FormData;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ConfigProvider;
use crate::error::{ApiError, ApiResult, ErrorBody};

const USER_AGENT: &str = "jrender/1.0";

/// Client headers that describe the inbound connection or body rather than
/// the submission.
const NOT_FORWARDED: [http::HeaderName; 6] = [
	http::header::CONTENT_TYPE,
	http::header::CONTENT_LENGTH,
	http::header::HOST,
	http::header::CONNECTION,
	http::header::TRANSFER_ENCODING,
	http::header::ACCEPT_ENCODING,
];

/// Where form definitions come from and where submissions go.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormSource: Send + Sync {
	/// Fetch the form with `form_id`.
	async fn get_form(&self, form_id: Uuid) -> ApiResult<FormData>;

	/// Forward a submission for `form_id` together with the client's headers.
	async fn submit_form(&self, form_id: Uuid, data: Map<String, Value>, headers: HeaderMap) -> ApiResult<()>;
}

#[derive(Debug, Deserialize)]
struct FormEnvelope {
	data: FormData,
}

/// HTTP client of the jform service.
///
/// The upstream URL, API key and timeout are read from the config provider
/// on every call, so rotated credentials take effect without a restart.
pub struct JformClient {
	http: reqwest::Client,
	config: Arc<dyn ConfigProvider>,
}

impl JformClient {
	pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
		Self {
			http: reqwest::Client::new(),
			config,
		}
	}

	fn settings(&self) -> Arc<crate::config::Settings> {
		self.config.get().unwrap_or_else(|err| {
			tracing::warn!(error = %err, "using previous configuration");
			self.config.current()
		})
	}
}

fn forms_url(base: &str, form_id: Uuid) -> String {
	format!("{}/public/api/v1/forms/{form_id}", base.trim_end_matches('/'))
}

#[async_trait]
impl FormSource for JformClient {
	async fn get_form(&self, form_id: Uuid) -> ApiResult<FormData> {
		let settings = self.settings();
		let url = forms_url(&settings.remote.jform, form_id);
		tracing::info!(%url, "fetching form from jform service");

		let response = self
			.http
			.get(&url)
			.timeout(settings.request_timeout())
			.header(reqwest::header::ACCEPT, "application/json")
			.header(reqwest::header::USER_AGENT, USER_AGENT)
			.header("X-Api-Key", &settings.remote.api_key)
			.send()
			.await
			.map_err(|err| {
				tracing::error!(error = %err, %url, "jform request failed");
				ApiError::internal("failed to call jform service")
			})?;

		match response.status() {
			StatusCode::OK => {
				let envelope: FormEnvelope = response.json().await.map_err(|err| {
					tracing::error!(error = %err, %url, "invalid jform response");
					ApiError::internal("failed to decode response")
				})?;
				Ok(envelope.data)
			}
			StatusCode::NOT_FOUND => Err(ApiError::not_found("form not found")),
			StatusCode::BAD_REQUEST => Err(ApiError::bad_request("invalid form ID")),
			status => Err(ApiError::internal(format!(
				"jform service returned status {}",
				status.as_u16()
			))),
		}
	}

	async fn submit_form(&self, form_id: Uuid, data: Map<String, Value>, headers: HeaderMap) -> ApiResult<()> {
		let settings = self.settings();
		let url = format!("{}/submissions", forms_url(&settings.remote.jform, form_id));

		let mut forwarded = HeaderMap::new();
		for (name, value) in &headers {
			if NOT_FORWARDED.contains(name) {
				continue;
			}
			forwarded.append(name.clone(), value.clone());
		}
		forwarded
			.entry(http::header::ACCEPT)
			.or_insert(http::HeaderValue::from_static("application/json"));
		if let Ok(api_key) = http::HeaderValue::from_str(&settings.remote.api_key) {
			forwarded.insert("x-api-key", api_key);
		}
		tracing::info!(%url, fields = data.len(), "forwarding submission to jform service");

		let response = self
			.http
			.post(&url)
			.timeout(settings.request_timeout())
			.headers(forwarded)
			.json(&data)
			.send()
			.await
			.map_err(|err| {
				tracing::error!(error = %err, %url, "jform submission failed");
				ApiError::internal("failed to call jform service")
			})?;

		match response.status() {
			status if status.is_success() => Ok(()),
			StatusCode::NOT_FOUND => Err(ApiError::not_found("form not found")),
			StatusCode::BAD_REQUEST => Err(ApiError::bad_request("invalid form ID")),
			StatusCode::TOO_MANY_REQUESTS => {
				let body: ErrorBody = response
					.json()
					.await
					.map_err(|_| ApiError::internal("failed to decode response"))?;
				tracing::warn!(%form_id, message = %body.error.message, "submission rejected by quota");
				Err(ApiError::too_many_requests(body.error.message))
			}
			status => Err(ApiError::internal(format!(
				"jform service returned status {}",
				status.as_u16()
			))),
		}
	}
}
