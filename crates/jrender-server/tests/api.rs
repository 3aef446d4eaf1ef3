//! HTTP API integration tests
//!
//! Drives the full router against a mocked upstream jform service.
//!
//! # Test Categories
//!
//! - Embed: loader script, fragments and submissions
//! - Direct render: standalone page and upstream status mapping
//! - Routing: welcome, unknown routes and preflight

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use jrender_server::config::{Settings, StaticConfig};
use jrender_server::http::{Request, Response};
use jrender_server::{Handler, JformClient, Router, app};
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORM_ID: &str = "3d8e2f4a-1b6c-4f0e-9a7d-2c5b8e1f0a93";

// =============================================================================
// Fixtures
// =============================================================================

fn form_json() -> Value {
	json!({
		"data": {
			"id": FORM_ID,
			"name": "Event <RSVP>",
			"form_definition": {
				"languages": { "default": "en", "supported": ["en", "es"] },
				"fields": [
					{ "id": "name", "name": "name", "type": "text", "required": true,
					  "translations": { "en": { "label": "Name" }, "es": { "label": "Nombre" } } },
					{ "id": "send", "name": "send", "type": "submit_button",
					  "translations": { "en": { "label": "Send" } } }
				]
			},
			"form_styling": {
				"canvas_layout": { "rows": [{ "id": "r1", "columns": [
					{ "id": "c1", "responsive_spans": { "lg": 6 }, "fields": [{ "field_id": "name" }, { "field_id": "send" }] }
				] }] }
			}
		}
	})
}

async fn app_for(upstream: &MockServer) -> Router {
	let mut settings = Settings::default();
	settings.remote.jform = upstream.uri();
	settings.remote.api_key = "test-key".to_string();
	settings.base.url = "https://render.example.com".to_string();

	let client = JformClient::new(Arc::new(StaticConfig::new(settings.clone())));
	app::router(&settings, Arc::new(client))
}

async fn call(router: &Router, method: Method, uri: &str, headers: HeaderMap, body: &str) -> Response {
	let request = Request::new(method, uri.parse().unwrap(), headers, Bytes::from(body.to_string()));
	router.handle(request).await.unwrap()
}

fn json_body(response: &Response) -> Value {
	serde_json::from_slice(&response.body).unwrap()
}

#[fixture]
async fn upstream() -> MockServer {
	MockServer::start().await
}

// =============================================================================
// Embed
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_embed_script_headers(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	let router = app_for(&upstream).await;

	let response = call(&router, Method::GET, "/embedv1.js", HeaderMap::new(), "").await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response.headers.get("content-type").unwrap(),
		"application/javascript; charset=utf-8"
	);
	assert_eq!(
		response.headers.get("cache-control").unwrap(),
		"public, max-age=31536000, immutable"
	);
	let body = std::str::from_utf8(&response.body).unwrap();
	assert!(body.contains("var API_BASE_URL = 'https://render.example.com';"));

	let etag = response.headers.get("etag").unwrap().clone();
	let mut headers = HeaderMap::new();
	headers.insert("if-none-match", etag);
	let revalidated = call(&router, Method::GET, "/embedv1.js", headers, "").await;
	assert_eq!(revalidated.status, StatusCode::NOT_MODIFIED);
	assert!(revalidated.body.is_empty());
}

#[rstest]
#[case("es", "es", "Nombre")]
#[case("ja", "en", "Name")]
#[tokio::test]
async fn test_embed_data(
	#[future] upstream: MockServer,
	#[case] requested: &str,
	#[case] lang: &str,
	#[case] label: &str,
) {
	let upstream = upstream.await;
	Mock::given(method("GET"))
		.and(path(format!("/public/api/v1/forms/{FORM_ID}")))
		.and(header("x-api-key", "test-key"))
		.and(header("user-agent", "jrender/1.0"))
		.and(header("accept", "application/json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(form_json()))
		.expect(1)
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let uri = format!("/api/public/v1/embeds/{FORM_ID}/data?lang={requested}");
	let response = call(&router, Method::GET, &uri, HeaderMap::new(), "").await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.headers.get("x-form-language").unwrap(), lang);
	assert_eq!(
		response.headers.get("cache-control").unwrap(),
		"public, max-age=300, stale-while-revalidate=60"
	);
	let body = json_body(&response);
	assert_eq!(body["data"]["lang"], lang);
	assert_eq!(body["data"]["form_id"], FORM_ID);
	assert!(body["data"]["html"].as_str().unwrap().contains(label));
	assert!(body["data"]["html"].as_str().unwrap().contains("jform-lg-col-6 jform-col-12"));
	assert!(body["data"]["css"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_embed_data_invalid_id(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	let router = app_for(&upstream).await;

	let response = call(&router, Method::GET, "/api/public/v1/embeds/abc/data", HeaderMap::new(), "").await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(&response),
		json!({ "error": { "code": 400, "message": "invalid embed ID" } })
	);
}

#[rstest]
#[tokio::test]
async fn test_submission_forwarded(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	Mock::given(method("POST"))
		.and(path(format!("/public/api/v1/forms/{FORM_ID}/submissions")))
		.and(header("x-api-key", "test-key"))
		.and(header("x-request-source", "landing-page"))
		.and(body_json(json!({ "name": "Ana", "diet": "veg,vegan" })))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let mut headers = HeaderMap::new();
	headers.insert("content-type", "application/x-www-form-urlencoded".parse().unwrap());
	headers.insert("x-request-source", "landing-page".parse().unwrap());
	let uri = format!("/api/public/v1/embeds/{FORM_ID}/submissions");
	let response = call(&router, Method::POST, &uri, headers, "name=Ana&diet=veg&diet=vegan").await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		json_body(&response),
		json!({ "success": true, "message": "Form submitted successfully!", "embedId": FORM_ID })
	);
}

#[rstest]
#[tokio::test]
async fn test_submission_quota_exceeded(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(429).set_body_json(json!({
			"error": { "code": 429, "message": "monthly submission limit reached" }
		})))
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let mut headers = HeaderMap::new();
	headers.insert("content-type", "application/json".parse().unwrap());
	let uri = format!("/api/public/v1/embeds/{FORM_ID}/submissions");
	let response = call(&router, Method::POST, &uri, headers, r#"{"name":"Ana"}"#).await;

	assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(json_body(&response)["error"]["message"], "monthly submission limit reached");
}

#[rstest]
#[tokio::test]
async fn test_submission_invalid_body(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	let router = app_for(&upstream).await;

	let mut headers = HeaderMap::new();
	headers.insert("content-type", "application/json".parse().unwrap());
	let uri = format!("/api/public/v1/embeds/{FORM_ID}/submissions");
	let response = call(&router, Method::POST, &uri, headers, "not json").await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert_eq!(json_body(&response)["error"]["message"], "invalid form data");
}

// =============================================================================
// Direct render
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_direct_render(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	Mock::given(method("GET"))
		.and(path(format!("/public/api/v1/forms/{FORM_ID}")))
		.respond_with(ResponseTemplate::new(200).set_body_json(form_json()))
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let response = call(&router, Method::GET, &format!("/f/{FORM_ID}"), HeaderMap::new(), "").await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.headers.get("content-type").unwrap(), "text/html; charset=utf-8");
	let html = std::str::from_utf8(&response.body).unwrap();
	assert!(html.contains("<title>Event &lt;RSVP&gt;</title>"));
	assert!(html.contains("<html lang=\"en\">"));
	assert!(html.contains(&format!("data-jform-id=\"{FORM_ID}\"")));
}

#[rstest]
#[case(404, 404, "form not found")]
#[case(400, 400, "invalid form ID")]
#[case(503, 500, "jform service returned status 503")]
#[tokio::test]
async fn test_direct_render_upstream_status(
	#[future] upstream: MockServer,
	#[case] upstream_status: u16,
	#[case] status: u16,
	#[case] message: &str,
) {
	let upstream = upstream.await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(upstream_status))
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let response = call(&router, Method::GET, &format!("/f/{FORM_ID}"), HeaderMap::new(), "").await;

	assert_eq!(response.status.as_u16(), status);
	assert_eq!(json_body(&response)["error"]["message"], message);
}

#[rstest]
#[tokio::test]
async fn test_direct_render_undecodable_body(#[future] upstream: MockServer) {
	let upstream = upstream.await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
		.mount(&upstream)
		.await;
	let router = app_for(&upstream).await;

	let response = call(&router, Method::GET, &format!("/f/{FORM_ID}"), HeaderMap::new(), "").await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json_body(&response)["error"]["message"], "failed to decode response");
}

// =============================================================================
// Routing
// =============================================================================

#[rstest]
#[case(Method::GET, "/", 200)]
#[case(Method::GET, "/missing", 404)]
#[case(Method::OPTIONS, "/api/public/v1/embeds/x/data", 204)]
#[tokio::test]
async fn test_routing(#[future] upstream: MockServer, #[case] method: Method, #[case] uri: &str, #[case] status: u16) {
	let upstream = upstream.await;
	let router = app_for(&upstream).await;

	let response = call(&router, method, uri, HeaderMap::new(), "").await;

	assert_eq!(response.status.as_u16(), status);
	assert_eq!(response.headers.get("access-control-allow-origin").unwrap(), "*");
}
