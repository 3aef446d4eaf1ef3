//! Client-side scripts and the escaping needed to splice values into them.

use sha2::{Digest, Sha256};

use crate::css::STATIC_CSS;

/// Validation, error display and submission helpers shared by the inline
/// form script and the embed loader.
pub const SHARED_SCRIPT: &str = include_str!("../assets/validation.js");

pub(crate) const SHARED_SCRIPT_PLACEHOLDER: &str = "__JFORM_SHARED_SCRIPT__";

const EMBED_SCRIPT: &str = include_str!("../assets/embed.js");

/// Quote `value` as a single-quoted JavaScript string literal that is also
/// safe inside an HTML `<script>` element.
///
/// # Examples
///
/// ```
/// use jrender_forms::script::js_string_literal;
///
/// assert_eq!(js_string_literal("it's"), r"'it\'s'");
/// assert_eq!(js_string_literal("</script>"), r"'\u003c/script\u003e'");
/// ```
pub fn js_string_literal(value: &str) -> String {
	let mut out = String::with_capacity(value.len() + 2);
	out.push('\'');
	for ch in value.chars() {
		match ch {
			'\\' => out.push_str("\\\\"),
			'\'' => out.push_str("\\'"),
			'"' => out.push_str("\\\""),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			'<' => out.push_str("\\u003c"),
			'>' => out.push_str("\\u003e"),
			'&' => out.push_str("\\u0026"),
			'\u{2028}' => out.push_str("\\u2028"),
			'\u{2029}' => out.push_str("\\u2029"),
			c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
			c => out.push(c),
		}
	}
	out.push('\'');
	out
}

/// Escape `value` for the body of a JavaScript template literal.
///
/// # Examples
///
/// ```
/// use jrender_forms::script::escape_template_literal;
///
/// assert_eq!(escape_template_literal("a`b${c}\\"), "a\\`b\\${c}\\\\");
/// ```
pub fn escape_template_literal(value: &str) -> String {
	value
		.replace('\\', "\\\\")
		.replace('`', "\\`")
		.replace("${", "\\${")
}

/// The embed loader script served to host pages.
///
/// It does not depend on any form, so it is generated once at start-up and
/// served with a long-lived cache policy. The ETag is a digest of the
/// content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedScript {
	content: String,
	etag: String,
}

impl EmbedScript {
	/// Build the loader for an API reachable at `api_base_url`.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::script::EmbedScript;
	///
	/// let script = EmbedScript::generate("https://api.example.com");
	/// assert!(script.content().contains("var API_BASE_URL = 'https://api.example.com';"));
	/// assert_eq!(script, EmbedScript::generate("https://api.example.com"));
	/// ```
	pub fn generate(api_base_url: &str) -> Self {
		let content = EMBED_SCRIPT
			.replace(SHARED_SCRIPT_PLACEHOLDER, SHARED_SCRIPT)
			.replace("__JFORM_STATIC_CSS__", &escape_template_literal(STATIC_CSS))
			.replace(
				"__JFORM_API_BASE_URL__",
				&js_string_literal(api_base_url.trim_end_matches('/')),
			);
		let etag = format!("\"{}\"", hex::encode(Sha256::digest(content.as_bytes())));

		tracing::debug!(bytes = content.len(), %etag, "generated embed script");
		Self { content, etag }
	}

	pub fn content(&self) -> &str {
		&self.content
	}

	/// Quoted strong validator for the `ETag` header.
	pub fn etag(&self) -> &str {
		&self.etag
	}
}
