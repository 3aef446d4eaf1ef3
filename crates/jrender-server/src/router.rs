//! Request routing.
//!
//! Routes are matched on method and path. Path patterns use `{name}`
//! segments whose values end up in [`Request::path_params`]. The router
//! also answers CORS preflight requests and stamps the CORS headers on
//! every response it produces.

use async_trait::async_trait;
use http::Method;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::http::{Request, Response};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "*, Accept, Accept-Encoding, User-Agent, Host, Authorization, Content-Type, X-CSRF-Token";
const CORS_MAX_AGE: &str = "300";

/// Processes one request.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> ApiResult<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		(**self).handle(request).await
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

struct Route {
	method: Method,
	pattern: String,
	segments: Vec<Segment>,
	handler: Arc<dyn Handler>,
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
	pattern
		.split('/')
		.filter(|segment| !segment.is_empty())
		.map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
			Some(name) => Segment::Param(name.to_string()),
			None => Segment::Literal(segment.to_string()),
		})
		.collect()
}

impl Route {
	fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
		let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
		if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = Vec::new();
		for (segment, part) in self.segments.iter().zip(parts) {
			match segment {
				Segment::Literal(literal) if literal == part => {}
				Segment::Literal(_) => return None,
				Segment::Param(name) => params.push((name.clone(), part.to_string())),
			}
		}
		Some(params)
	}
}

/// Method and path dispatcher.
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `handler` for `method` requests matching `pattern`.
	///
	/// # Examples
	///
	/// ```
	/// use async_trait::async_trait;
	/// use jrender_server::http::{Request, Response};
	/// use jrender_server::router::{Handler, Router};
	/// use jrender_server::ApiResult;
	///
	/// struct Hello;
	///
	/// #[async_trait]
	/// impl Handler for Hello {
	///     async fn handle(&self, request: Request) -> ApiResult<Response> {
	///         let name = request.path_param("name").unwrap_or("world");
	///         Ok(Response::ok().with_body(format!("hello {name}")))
	///     }
	/// }
	///
	/// let router = Router::new().get("/hello/{name}", Hello);
	/// assert_eq!(router.len(), 1);
	/// ```
	pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler + 'static) -> Self {
		self.routes.push(Route {
			method,
			pattern: pattern.to_string(),
			segments: parse_pattern(pattern),
			handler: Arc::new(handler),
		});
		self
	}

	pub fn get(self, pattern: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::GET, pattern, handler)
	}

	pub fn post(self, pattern: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::POST, pattern, handler)
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	async fn dispatch(&self, mut request: Request) -> ApiResult<Response> {
		if request.method == Method::OPTIONS {
			return Ok(Response::no_content()
				.with_header("Access-Control-Allow-Methods", ALLOWED_METHODS)
				.with_header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
				.with_header("Access-Control-Max-Age", CORS_MAX_AGE));
		}

		let path = request.path().to_string();
		for route in &self.routes {
			if route.method != request.method {
				continue;
			}
			if let Some(params) = route.matches(&path) {
				tracing::trace!(pattern = %route.pattern, "route matched");
				request.path_params.extend(params);
				return route.handler.handle(request).await;
			}
		}

		Err(ApiError::not_found("not found"))
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let started = Instant::now();
		let method = request.method.clone();
		let path = request.path().to_string();

		let response = self
			.dispatch(request)
			.await
			.unwrap_or_else(|err| err.to_response())
			.with_header("Access-Control-Allow-Origin", "*")
			.with_header("Access-Control-Expose-Headers", "Link");

		tracing::info!(
			%method,
			%path,
			status = response.status.as_u16(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"request completed"
		);
		Ok(response)
	}
}
