//! Wiring of services, handlers and routes.

use jrender_forms::{EmbeddedFormEngine, FieldRenderer, FormCoreEngine};
use std::sync::Arc;

use crate::config::Settings;
use crate::handlers::{
	DirectFormHandler, EmbedDataHandler, EmbedScriptHandler, SubmissionHandler, WelcomeHandler,
};
use crate::remote::FormSource;
use crate::router::Router;
use crate::services::{EmbedService, RenderService};

/// Build the rendering engine described by `settings`.
pub fn engine(settings: &Settings) -> EmbeddedFormEngine {
	let renderer = FieldRenderer::new(settings.captcha.site_key.as_str());
	EmbeddedFormEngine::new(FormCoreEngine::new(renderer, settings.base.submission_url.as_str()))
}

/// All routes of the service.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use jrender_server::app::router;
/// use jrender_server::config::{Settings, StaticConfig};
/// use jrender_server::remote::JformClient;
///
/// let settings = Settings::default();
/// let source = Arc::new(JformClient::new(Arc::new(StaticConfig::new(settings.clone()))));
/// let router = router(&settings, source);
/// assert_eq!(router.len(), 5);
/// ```
pub fn router(settings: &Settings, source: Arc<dyn FormSource>) -> Router {
	let engine = Arc::new(engine(settings));
	let render = Arc::new(RenderService::new(source.clone(), engine.clone()));
	let embed = Arc::new(EmbedService::new(source, engine, &settings.base.url));

	Router::new()
		.get("/", WelcomeHandler)
		.get("/embedv1.js", EmbedScriptHandler::new(embed.clone()))
		.get("/api/public/v1/embeds/{embedId}/data", EmbedDataHandler::new(embed.clone()))
		.post("/api/public/v1/embeds/{embedId}/submissions", SubmissionHandler::new(embed))
		.get("/f/{formID}", DirectFormHandler::new(render))
}
