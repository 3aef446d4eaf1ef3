use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::router::Handler;
use crate::services::RenderService;

/// `GET /f/{formID}`: the form as a standalone page.
pub struct DirectFormHandler {
	service: Arc<RenderService>,
}

impl DirectFormHandler {
	pub fn new(service: Arc<RenderService>) -> Self {
		Self { service }
	}
}

#[async_trait]
impl Handler for DirectFormHandler {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let form_id = request.path_param("formID").unwrap_or_default();
		let html = self.service.render_form(form_id).await?;

		Ok(Response::ok()
			.with_content_type("text/html; charset=utf-8")
			.with_body(html))
	}
}
