//! Decoding of form submission bodies.
//!
//! JSON objects pass through unchanged. URL-encoded and multipart bodies
//! become flat string maps; a key sent several times is joined with `,`.

use bytes::Bytes;
use futures::stream::once;
use http::HeaderMap;
use serde_json::{Map, Value};
use std::future::ready;

use crate::error::{ApiError, ApiResult};

/// Largest accepted submission body.
pub const MAX_SUBMISSION_BYTES: usize = 10 * 1024 * 1024;

fn invalid(reason: impl std::fmt::Display) -> ApiError {
	tracing::warn!(%reason, "rejected submission body");
	ApiError::bad_request("invalid form data")
}

fn content_type(headers: &HeaderMap) -> &str {
	headers
		.get(http::header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
}

fn mime_type(content_type: &str) -> String {
	content_type
		.split(';')
		.next()
		.unwrap_or_default()
		.trim()
		.to_ascii_lowercase()
}

fn collect_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Map<String, Value> {
	let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
	for (key, value) in pairs {
		match grouped.iter_mut().find(|(existing, _)| *existing == key) {
			Some((_, values)) => values.push(value),
			None => grouped.push((key, vec![value])),
		}
	}
	grouped
		.into_iter()
		.map(|(key, values)| (key, Value::String(values.join(","))))
		.collect()
}

/// Decode a submission body according to its `Content-Type`.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use http::HeaderMap;
/// use jrender_server::submission::parse_submission;
///
/// # tokio_test::block_on(async {
/// let mut headers = HeaderMap::new();
/// headers.insert("content-type", "application/x-www-form-urlencoded".parse().unwrap());
/// let data = parse_submission(&headers, Bytes::from("topics=a&topics=b&name=Jo")).await.unwrap();
/// assert_eq!(data["topics"], "a,b");
/// assert_eq!(data["name"], "Jo");
/// # });
/// ```
pub async fn parse_submission(headers: &HeaderMap, body: Bytes) -> ApiResult<Map<String, Value>> {
	if body.len() > MAX_SUBMISSION_BYTES {
		return Err(invalid(format!("body of {} bytes exceeds limit", body.len())));
	}

	let content_type = content_type(headers);
	match mime_type(content_type).as_str() {
		"application/json" => match serde_json::from_slice::<Value>(&body).map_err(invalid)? {
			Value::Object(map) => Ok(map),
			_ => Err(invalid("JSON body is not an object")),
		},
		"multipart/form-data" => parse_multipart(content_type, body).await,
		_ => {
			let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body).map_err(invalid)?;
			Ok(collect_pairs(pairs))
		}
	}
}

async fn parse_multipart(content_type: &str, body: Bytes) -> ApiResult<Map<String, Value>> {
	let boundary = multer::parse_boundary(content_type).map_err(invalid)?;
	let stream = once(ready(Ok::<_, std::io::Error>(body)));
	let mut multipart = multer::Multipart::new(stream, boundary);

	let mut pairs = Vec::new();
	while let Some(field) = multipart.next_field().await.map_err(invalid)? {
		let Some(name) = field.name().map(str::to_string) else {
			continue;
		};
		// File uploads are not forwarded.
		if field.file_name().is_some() {
			continue;
		}
		let text = field.text().await.map_err(invalid)?;
		pairs.push((name, text));
	}
	Ok(collect_pairs(pairs))
}
