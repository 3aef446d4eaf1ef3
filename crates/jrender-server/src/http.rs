//! Request and response types passed between the server and handlers.

use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::ApiError;

/// HTTP request with a fully buffered body.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Values captured by `{name}` segments of the matched route.
	pub path_params: HashMap<String, String>,
}

impl Request {
	pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			headers,
			body,
			path_params: HashMap::new(),
		}
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	/// First value of query parameter `name`.
	///
	/// # Examples
	///
	/// ```
	/// use bytes::Bytes;
	/// use http::{HeaderMap, Method};
	/// use jrender_server::http::Request;
	///
	/// let request = Request::new(Method::GET, "/data?lang=de&x=1".parse().unwrap(), HeaderMap::new(), Bytes::new());
	/// assert_eq!(request.query("lang").as_deref(), Some("de"));
	/// assert_eq!(request.query("missing"), None);
	/// ```
	pub fn query(&self, name: &str) -> Option<String> {
		let query = self.uri.query()?;
		serde_urlencoded::from_str::<Vec<(String, String)>>(query)
			.ok()?
			.into_iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value)
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}
}

/// HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header. Invalid names or values are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_server::http::Response;
	///
	/// let response = Response::ok().with_header("X-Form-Language", "de");
	/// assert_eq!(response.headers.get("x-form-language").unwrap(), "de");
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_content_type(self, content_type: &str) -> Self {
		self.with_header(header::CONTENT_TYPE.as_str(), content_type)
	}

	/// Serialize `data` as the JSON body.
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self, ApiError> {
		let json = serde_json::to_vec(data).map_err(|err| {
			tracing::error!(error = %err, "failed to serialize response");
			ApiError::internal("failed to encode response")
		})?;
		self.body = Bytes::from(json);
		self.headers
			.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
		Ok(self)
	}
}
