//! HTTP handlers.

pub mod embed;
pub mod forms;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::router::Handler;

pub use embed::{EmbedDataHandler, EmbedScriptHandler, SubmissionHandler};
pub use forms::DirectFormHandler;

/// `GET /`
pub struct WelcomeHandler;

#[async_trait]
impl Handler for WelcomeHandler {
	async fn handle(&self, _request: Request) -> ApiResult<Response> {
		Ok(Response::ok()
			.with_content_type("text/plain; charset=utf-8")
			.with_body("welcome"))
	}
}
