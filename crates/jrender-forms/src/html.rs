//! HTML escaping and an escape-by-default markup builder.
//!
//! [`SafeHtml`] only accepts `&'static str` for literal markup. Every
//! runtime string goes through [`escape`] or [`escape_attr`] on its way in,
//! so generated fragments cannot carry unescaped user text.

use std::fmt;

/// Escape HTML special characters.
///
/// # Examples
///
/// ```
/// use jrender_forms::html::escape;
///
/// assert_eq!(escape("<script>alert('x')</script>"),
///            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;");
/// assert_eq!(escape("Tom & \"Jerry\""), "Tom &amp; &quot;Jerry&quot;");
/// ```
pub fn escape(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	push_escaped(&mut result, text, false);
	result
}

/// Escape a value for use inside a double-quoted attribute.
///
/// Line breaks and tabs are encoded as character references too.
///
/// # Examples
///
/// ```
/// use jrender_forms::html::escape_attr;
///
/// assert_eq!(escape_attr("a\"b"), "a&quot;b");
/// assert_eq!(escape_attr("line\nbreak"), "line&#10;break");
/// ```
pub fn escape_attr(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	push_escaped(&mut result, text, true);
	result
}

fn push_escaped(out: &mut String, text: &str, attribute: bool) {
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			'\n' if attribute => out.push_str("&#10;"),
			'\r' if attribute => out.push_str("&#13;"),
			'\t' if attribute => out.push_str("&#9;"),
			_ => out.push(ch),
		}
	}
}

/// Markup assembled from static literals and escaped values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append literal markup.
	pub fn markup(&mut self, markup: &'static str) -> &mut Self {
		self.0.push_str(markup);
		self
	}

	/// Append `<tag` without closing the start tag.
	pub fn open(&mut self, tag: &'static str) -> &mut Self {
		self.0.push('<');
		self.0.push_str(tag);
		self
	}

	/// Close a start tag opened with [`SafeHtml::open`].
	pub fn close(&mut self) -> &mut Self {
		self.0.push('>');
		self
	}

	/// Append `</tag>`.
	pub fn end(&mut self, tag: &'static str) -> &mut Self {
		self.0.push_str("</");
		self.0.push_str(tag);
		self.0.push('>');
		self
	}

	/// Append ` name="value"` with the value escaped.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::html::SafeHtml;
	///
	/// let mut html = SafeHtml::new();
	/// html.open("input").attr("value", "\"><script>").close();
	/// assert_eq!(html.as_str(), "<input value=\"&quot;&gt;&lt;script&gt;\">");
	/// ```
	pub fn attr(&mut self, name: &'static str, value: &str) -> &mut Self {
		self.0.push(' ');
		self.0.push_str(name);
		self.0.push_str("=\"");
		push_escaped(&mut self.0, value, true);
		self.0.push('"');
		self
	}

	/// Like [`SafeHtml::attr`], skipped when `value` is empty.
	pub fn attr_nonempty(&mut self, name: &'static str, value: &str) -> &mut Self {
		if !value.is_empty() {
			self.attr(name, value);
		}
		self
	}

	/// Append a numeric attribute.
	pub fn number(&mut self, name: &'static str, value: u32) -> &mut Self {
		self.0.push(' ');
		self.0.push_str(name);
		self.0.push_str("=\"");
		self.0.push_str(&value.to_string());
		self.0.push('"');
		self
	}

	/// Append a boolean attribute when `on` is set.
	pub fn flag(&mut self, name: &'static str, on: bool) -> &mut Self {
		if on {
			self.0.push(' ');
			self.0.push_str(name);
		}
		self
	}

	/// Append escaped text content.
	pub fn text(&mut self, text: &str) -> &mut Self {
		push_escaped(&mut self.0, text, false);
		self
	}

	/// Append another fragment.
	pub fn push(&mut self, other: &SafeHtml) -> &mut Self {
		self.0.push_str(&other.0);
		self
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for SafeHtml {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<SafeHtml> for String {
	fn from(html: SafeHtml) -> Self {
		html.0
	}
}
