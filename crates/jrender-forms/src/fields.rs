//! Per-field markup.
//!
//! Each [`FieldKind`] maps to one render function through [`renderer_for`].
//! Every field is wrapped in `<div class="field-type-{type}">`; input-like
//! fields additionally get a `form-field` element carrying their layout
//! classes.

use crate::html::SafeHtml;
use crate::language::{resolve_option_label, resolve_translation};
use crate::layout::FieldLayout;
use crate::model::{FieldKind, FieldTranslation, FormField, LabelLayout, Styling};

const RECAPTCHA_SCRIPT: &str = "https://www.google.com/recaptcha/api.js?render=";

/// Everything a render function needs to know about one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
	pub field: &'a FormField,
	pub translation: &'a FieldTranslation,
	pub lang: &'a str,
	pub styling: &'a Styling,
}

impl<'a> FieldContext<'a> {
	/// Build the context of `field` rendered in `lang`.
	pub fn new(field: &'a FormField, lang: &'a str, styling: &'a Styling) -> Self {
		Self {
			field,
			translation: resolve_translation(field, lang),
			lang,
			styling,
		}
	}

	fn type_name(&self) -> &'a str {
		self.field.kind.as_str()
	}

	fn layout(&self) -> FieldLayout {
		FieldLayout::resolve(self.styling, self.type_name())
	}

	/// `(value, label)` pairs of the field's options.
	///
	/// Field options win; translation-level options are used when the field
	/// defines none.
	fn options(&self) -> Vec<(&'a str, &'a str)> {
		if self.field.options.is_empty() {
			return self
				.translation
				.options
				.iter()
				.map(|option| (option.value.as_str(), option.label.as_str()))
				.collect();
		}
		self.field
			.options
			.iter()
			.map(|option| (option.value.as_str(), resolve_option_label(option, self.lang)))
			.collect()
	}
}

/// Signature shared by every field render function.
pub type RenderFn = fn(&FieldRenderer, &FieldContext<'_>) -> SafeHtml;

/// Render function of a field kind.
pub fn renderer_for(kind: &FieldKind) -> RenderFn {
	match kind {
		FieldKind::Heading => render_heading,
		FieldKind::Paragraph => render_paragraph,
		FieldKind::Text | FieldKind::Email | FieldKind::Phone => render_input,
		FieldKind::Textarea => render_textarea,
		FieldKind::Select => render_select,
		FieldKind::Radio => render_radio,
		FieldKind::Checkbox => render_checkbox,
		FieldKind::SubmitButton => render_submit_button,
		FieldKind::Captcha => render_captcha,
		FieldKind::Divider => render_divider,
		FieldKind::Spacer => render_spacer,
		FieldKind::Other(_) => render_unsupported,
	}
}

/// Renders individual fields.
#[derive(Debug, Clone, Default)]
pub struct FieldRenderer {
	captcha_site_key: String,
}

impl FieldRenderer {
	/// Create a renderer whose captcha fields use `captcha_site_key`.
	pub fn new(captcha_site_key: impl Into<String>) -> Self {
		Self {
			captcha_site_key: captcha_site_key.into(),
		}
	}

	/// Render one field.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::fields::{FieldContext, FieldRenderer};
	/// use jrender_forms::model::{FormField, Styling};
	///
	/// let field: FormField = serde_json::from_str(
	///     r#"{"id":"f1","name":"name","type":"text","translations":{"en":{"label":"Name"}}}"#,
	/// ).unwrap();
	/// let styling = Styling::default();
	/// let html = FieldRenderer::default().render(&FieldContext::new(&field, "en", &styling));
	/// assert!(html.as_str().contains(r#"<label for="f1">Name</label>"#));
	/// ```
	pub fn render(&self, ctx: &FieldContext<'_>) -> SafeHtml {
		renderer_for(&ctx.field.kind)(self, ctx)
	}
}

fn wrap_type(field_type: &str, content: &SafeHtml) -> SafeHtml {
	let mut html = SafeHtml::new();
	html.open("div")
		.attr("class", &format!("field-type-{field_type}"))
		.close()
		.push(content)
		.end("div");
	html
}

fn wrap_field(field_type: &str, layout_classes: &str, content: &SafeHtml) -> SafeHtml {
	let mut inner = SafeHtml::new();
	inner
		.open("div")
		.attr("class", format!("form-field {layout_classes}").trim_end())
		.close()
		.push(content)
		.end("div");
	wrap_type(field_type, &inner)
}

fn required_marker(html: &mut SafeHtml, required: bool) {
	if required {
		html.markup(r#"<span class="jform-text-red-600">*</span>"#);
	}
}

fn label(html: &mut SafeHtml, for_id: &str, classes: &str, text: &str, required: bool) {
	html.open("label").attr("for", for_id).attr_nonempty("class", classes.trim()).close().text(text);
	required_marker(html, required);
	html.end("label");
}

fn help_text(html: &mut SafeHtml, translation: &FieldTranslation) {
	if !translation.help_text.is_empty() {
		html.markup(r#"<small class="jform-help-text">"#)
			.text(&translation.help_text)
			.end("small");
	}
}

/// `data-error-*` and HTML5 validation attributes, in a fixed order.
fn validation_attrs(html: &mut SafeHtml, field: &FormField, translation: &FieldTranslation) {
	if field.required {
		html.attr_nonempty("data-error-required", &translation.required);
	}
	let Some(validation) = field.validation.as_ref() else {
		return;
	};

	if let Some(min) = validation.min_length.and_then(positive) {
		html.number("minlength", min)
			.attr_nonempty("data-error-minlength", &translation.min_length);
	}
	if let Some(max) = validation.max_length.and_then(positive) {
		html.number("maxlength", max)
			.attr_nonempty("data-error-maxlength", &translation.max_length);
	}
	if validation.email == Some(true) {
		html.attr_nonempty("data-error-email", &translation.email);
	}
	if validation.phone == Some(true) {
		html.attr_nonempty("data-error-phone", &translation.phone);
	}
}

/// Lengths of zero or below are unset.
fn positive(value: i64) -> Option<u32> {
	u32::try_from(value).ok().filter(|n| *n > 0)
}

fn format_classes(format: i64) -> Vec<&'static str> {
	[
		(1, "jform-font-bold"),
		(2, "jform-font-italic"),
		(4, "jform-underline"),
	]
	.into_iter()
	.filter(|(bit, _)| format & bit != 0)
	.map(|(_, class)| class)
	.collect()
}

fn alignment_class(alignment: &str) -> Option<&'static str> {
	match alignment {
		"center" => Some("jform-text-center"),
		"right" => Some("jform-text-right"),
		_ => None,
	}
}

fn heading_tag(tag: &str) -> &'static str {
	match tag {
		"h1" => "h1",
		"h3" => "h3",
		"h4" => "h4",
		"h5" => "h5",
		"h6" => "h6",
		_ => "h2",
	}
}

fn render_text_element(ctx: &FieldContext<'_>, tag: &'static str) -> SafeHtml {
	let mut classes: Vec<&str> = alignment_class(&ctx.field.alignment).into_iter().collect();
	classes.extend(format_classes(ctx.field.format));

	let mut content = SafeHtml::new();
	content
		.open(tag)
		.attr_nonempty("class", &classes.join(" "))
		.close()
		.text(&ctx.translation.label)
		.end(tag);
	wrap_type(ctx.type_name(), &content)
}

fn render_heading(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	render_text_element(ctx, heading_tag(&ctx.field.tag))
}

fn render_paragraph(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	render_text_element(ctx, "p")
}

#[derive(Debug, Clone, Copy)]
enum Control {
	Input(&'static str),
	Textarea,
}

fn control(html: &mut SafeHtml, ctx: &FieldContext<'_>, kind: Control, placeholder: &str) {
	let field = ctx.field;
	match kind {
		Control::Input(input_type) => {
			html.open("input").attr("type", input_type);
		}
		Control::Textarea => {
			html.open("textarea");
		}
	}
	html.attr("id", &field.id)
		.attr("name", &field.name)
		.attr_nonempty("placeholder", placeholder)
		.flag("required", field.required);
	validation_attrs(html, field, ctx.translation);
	html.close();
	if let Control::Textarea = kind {
		html.end("textarea");
	}
}

fn render_control(ctx: &FieldContext<'_>, kind: Control) -> SafeHtml {
	let layout = ctx.layout();
	let translation = ctx.translation;
	let field = ctx.field;

	let placeholder = match layout.primary.layout() {
		LabelLayout::Floating | LabelLayout::Hidden if translation.placeholder.is_empty() => &translation.label,
		_ => &translation.placeholder,
	};

	let mut content = SafeHtml::new();
	match layout.primary.layout() {
		LabelLayout::Hidden => control(&mut content, ctx, kind, placeholder),
		LabelLayout::Floating => {
			content.markup(r#"<div class="floating-input-container">"#);
			control(&mut content, ctx, kind, placeholder);
			label(
				&mut content,
				&field.id,
				&format!("floating-label {}", layout.label_classes),
				&translation.label,
				field.required,
			);
			content.end("div");
		}
		LabelLayout::Inline => {
			label(
				&mut content,
				&field.id,
				&format!("inline-label {}", layout.label_classes),
				&translation.label,
				field.required,
			);
			content.markup(r#"<div class="inline-input">"#);
			control(&mut content, ctx, kind, placeholder);
			content.end("div");
		}
		LabelLayout::Stacked => {
			label(&mut content, &field.id, "", &translation.label, field.required);
			control(&mut content, ctx, kind, placeholder);
		}
	}
	help_text(&mut content, translation);

	wrap_field(ctx.type_name(), &layout.classes, &content)
}

fn render_input(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let input_type = match ctx.field.kind {
		FieldKind::Email => "email",
		FieldKind::Phone => "tel",
		_ => "text",
	};
	render_control(ctx, Control::Input(input_type))
}

fn render_textarea(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	render_control(ctx, Control::Textarea)
}

fn render_select(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let layout = ctx.layout();
	let field = ctx.field;
	let translation = ctx.translation;

	let mut content = SafeHtml::new();
	label(
		&mut content,
		&field.id,
		&format!("inline-label {}", layout.label_classes),
		&translation.label,
		field.required,
	);

	content
		.open("select")
		.attr("id", &field.id)
		.attr("name", &field.name)
		.flag("multiple", field.allow_multiple_selections == Some(true))
		.flag("required", field.required);
	validation_attrs(&mut content, field, translation);
	content.close();

	if !translation.placeholder.is_empty() {
		content
			.markup(r#"<option value="" disabled selected>"#)
			.text(&translation.placeholder)
			.end("option");
	}
	for (value, option_label) in ctx.options() {
		content.open("option").attr("value", value).close().text(option_label).end("option");
	}
	content.end("select");
	help_text(&mut content, translation);

	wrap_field(ctx.type_name(), &layout.classes, &content)
}

fn render_choices(ctx: &FieldContext<'_>, input_type: &'static str, option_class: &'static str, required: bool) -> SafeHtml {
	let layout = ctx.layout();
	let field = ctx.field;

	let mut content = SafeHtml::new();
	content
		.markup("<fieldset>")
		.open("legend")
		.attr("class", format!("inline-label {}", layout.label_classes).trim())
		.close()
		.text(&ctx.translation.label);
	required_marker(&mut content, required);
	content.end("legend").markup("<div>");

	for (index, (value, option_label)) in ctx.options().into_iter().enumerate() {
		let option_id = format!("{}_{index}", field.id);
		content
			.open("div")
			.attr("class", option_class)
			.close()
			.open("input")
			.attr("type", input_type)
			.attr("id", &option_id)
			.attr("name", &field.name)
			.attr("value", value)
			.flag("required", required)
			.close();
		label(&mut content, &option_id, "", option_label, false);
		content.end("div");
	}

	content.end("div").end("fieldset");
	help_text(&mut content, ctx.translation);

	wrap_field(ctx.type_name(), &layout.classes, &content)
}

fn render_radio(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	render_choices(ctx, "radio", "radio-option", ctx.field.required)
}

fn render_checkbox(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	render_choices(ctx, "checkbox", "checkbox-option", false)
}

fn render_submit_button(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let mut content = SafeHtml::new();
	content
		.markup(r#"<button type="submit">"#)
		.text(&ctx.translation.label)
		.end("button");
	wrap_field(ctx.type_name(), "", &content)
}

fn render_captcha(renderer: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let site_key = renderer.captcha_site_key.as_str();
	if site_key.is_empty() {
		tracing::warn!(field_id = %ctx.field.id, "rendering captcha field without a site key");
	}

	let mut content = SafeHtml::new();
	content
		.markup(r#"<div class="captcha-container">"#)
		.markup(r#"<input type="hidden" id="g-recaptcha" name="g-recaptcha""#)
		.attr("value", site_key)
		.close()
		.end("div")
		.open("script")
		.attr("src", &format!("{RECAPTCHA_SCRIPT}{site_key}"))
		.flag("defer", true)
		.close()
		.end("script");
	wrap_field(ctx.type_name(), "", &content)
}

fn render_divider(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let mut content = SafeHtml::new();
	content.markup(r#"<hr class="jform-divider">"#);
	wrap_type(ctx.type_name(), &content)
}

fn render_spacer(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	let mut content = SafeHtml::new();
	content.markup(r#"<div class="jform-spacer" aria-hidden="true"></div>"#);
	wrap_type(ctx.type_name(), &content)
}

fn render_unsupported(_: &FieldRenderer, ctx: &FieldContext<'_>) -> SafeHtml {
	tracing::debug!(field_id = %ctx.field.id, field_type = ctx.type_name(), "unsupported field type");

	let mut content = SafeHtml::new();
	content
		.markup("<div>Unsupported field type: ")
		.text(ctx.type_name())
		.end("div");
	wrap_type(ctx.type_name(), &content)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{FieldTypeStyle, LayoutSettings, SelectOption};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::collections::BTreeMap;

	fn field(value: serde_json::Value) -> FormField {
		serde_json::from_value(value).unwrap()
	}

	fn render(field: &FormField, styling: &Styling) -> String {
		FieldRenderer::new("site-key")
			.render(&FieldContext::new(field, "en", styling))
			.into_string()
	}

	#[fixture]
	fn styling() -> Styling {
		Styling::default()
	}

	fn styling_with(field_type: &str, layout: LabelLayout) -> Styling {
		let mut styling = Styling::default();
		styling.field_styling.insert(
			field_type.to_string(),
			FieldTypeStyle {
				layout_override: Some(LayoutSettings {
					label_layout: Some(layout),
					..Default::default()
				}),
				..Default::default()
			},
		);
		styling
	}

	#[rstest]
	fn test_stacked_text_field(styling: Styling) {
		let f = field(json!({
			"id": "f1", "name": "full_name", "type": "text", "required": true,
			"translations": { "en": { "label": "Name" } }
		}));

		assert_eq!(
			render(&f, &styling),
			"<div class=\"field-type-text\"><div class=\"form-field jform-layout-stacked jform-text-layout-stacked\">\
			 <label for=\"f1\">Name<span class=\"jform-text-red-600\">*</span></label>\
			 <input type=\"text\" id=\"f1\" name=\"full_name\" required></div></div>"
		);
	}

	#[rstest]
	fn test_validation_attributes_order(styling: Styling) {
		let f = field(json!({
			"id": "e", "name": "email", "type": "email", "required": true,
			"validation": { "minLength": 3, "maxLength": 40, "email": true, "phone": true },
			"translations": { "en": {
				"label": "Email", "required": "Needed", "minLength": "Short",
				"email": "Bad \"email\""
			} }
		}));

		let html = render(&f, &styling);
		assert!(html.contains(
			"<input type=\"email\" id=\"e\" name=\"email\" required data-error-required=\"Needed\" \
			 minlength=\"3\" data-error-minlength=\"Short\" maxlength=\"40\" data-error-email=\"Bad &quot;email&quot;\">"
		));
		assert!(!html.contains("data-error-phone"));
		assert!(!html.contains("data-error-maxlength"));
	}

	#[rstest]
	#[case(-1, -5)]
	#[case(0, 0)]
	#[case(i64::from(u32::MAX) + 1, -1)]
	fn test_non_positive_lengths_are_omitted(styling: Styling, #[case] min: i64, #[case] max: i64) {
		let f = field(json!({
			"id": "n", "name": "n", "type": "text",
			"validation": { "minLength": min, "maxLength": max },
			"translations": { "en": { "label": "Nick", "minLength": "Short" } }
		}));

		let html = render(&f, &styling);
		assert!(!html.contains("minlength"));
		assert!(!html.contains("maxlength"));
		assert!(!html.contains("data-error-minlength"));
	}

	#[rstest]
	fn test_phone_maps_to_tel(styling: Styling) {
		let f = field(json!({ "id": "p", "name": "p", "type": "phone", "translations": { "en": { "label": "Phone" } } }));
		assert!(render(&f, &styling).contains("<input type=\"tel\""));
	}

	#[rstest]
	#[case(LabelLayout::Floating)]
	#[case(LabelLayout::Hidden)]
	fn test_placeholder_defaults_to_label(#[case] layout: LabelLayout) {
		let styling = styling_with("text", layout);
		let f = field(json!({ "id": "f", "name": "n", "type": "text", "translations": { "en": { "label": "City" } } }));

		let html = render(&f, &styling);
		assert!(html.contains("placeholder=\"City\""));
		assert_eq!(html.contains("<label"), layout == LabelLayout::Floating);
	}

	#[rstest]
	fn test_floating_wraps_input_then_label() {
		let styling = styling_with("textarea", LabelLayout::Floating);
		let f = field(json!({ "id": "t", "name": "msg", "type": "textarea", "translations": { "en": { "label": "Message", "placeholder": "Say hi" } } }));

		assert!(render(&f, &styling).contains(
			"<div class=\"floating-input-container\"><textarea id=\"t\" name=\"msg\" placeholder=\"Say hi\"></textarea>\
			 <label for=\"t\" class=\"floating-label\">Message</label></div>"
		));
	}

	#[rstest]
	fn test_inline_wraps_input() {
		let styling = styling_with("text", LabelLayout::Inline);
		let f = field(json!({ "id": "f", "name": "n", "type": "text", "translations": { "en": { "label": "Name" } } }));

		assert!(render(&f, &styling).contains(
			"<label for=\"f\" class=\"inline-label\">Name</label><div class=\"inline-input\"><input type=\"text\" id=\"f\" name=\"n\"></div>"
		));
	}

	#[rstest]
	fn test_heading_tag_and_classes(styling: Styling) {
		let f = field(json!({
			"id": "h", "name": "h", "type": "heading", "tag": "script", "format": 5, "alignment": "center",
			"translations": { "en": { "label": "Title" } }
		}));

		assert_eq!(
			render(&f, &styling),
			"<div class=\"field-type-heading\"><h2 class=\"jform-text-center jform-font-bold jform-underline\">Title</h2></div>"
		);
	}

	#[rstest]
	fn test_paragraph_without_format(styling: Styling) {
		let f = field(json!({ "id": "p", "name": "p", "type": "paragraph", "alignment": "left", "translations": { "en": { "label": "Hello" } } }));
		assert_eq!(render(&f, &styling), "<div class=\"field-type-paragraph\"><p>Hello</p></div>");
	}

	#[rstest]
	fn test_select_options_and_placeholder(styling: Styling) {
		let mut f = field(json!({
			"id": "s", "name": "color", "type": "select", "allowMultipleSelections": true,
			"translations": { "en": { "label": "Color", "placeholder": "Pick" } }
		}));
		f.options = vec![
			SelectOption {
				value: "r".into(),
				translations: BTreeMap::from([("en".to_string(), "Red".to_string())]),
			},
			SelectOption {
				value: "<g>".into(),
				translations: BTreeMap::new(),
			},
		];

		let html = render(&f, &styling);
		assert!(html.contains(
			"<select id=\"s\" name=\"color\" multiple><option value=\"\" disabled selected>Pick</option>\
			 <option value=\"r\">Red</option><option value=\"&lt;g&gt;\">&lt;g&gt;</option></select>"
		));
	}

	#[rstest]
	fn test_radio_ids_and_required(styling: Styling) {
		let f = field(json!({
			"id": "r", "name": "size", "type": "radio", "required": true,
			"options": [{ "value": "s", "translations": { "en": "Small" } }, { "value": "l", "translations": { "en": "Large" } }],
			"translations": { "en": { "label": "Size" } }
		}));

		let html = render(&f, &styling);
		assert!(html.contains("<fieldset><legend class=\"inline-label\">Size<span class=\"jform-text-red-600\">*</span></legend>"));
		assert!(html.contains("<input type=\"radio\" id=\"r_0\" name=\"size\" value=\"s\" required><label for=\"r_0\">Small</label>"));
		assert!(html.contains("id=\"r_1\""));
	}

	#[rstest]
	fn test_checkbox_never_required(styling: Styling) {
		let f = field(json!({
			"id": "c", "name": "tos", "type": "checkbox", "required": true,
			"translations": { "en": { "label": "Terms", "options": [{ "value": "yes", "label": "I agree" }] } }
		}));

		let html = render(&f, &styling);
		assert!(html.contains("<legend class=\"inline-label\">Terms</legend>"));
		assert!(html.contains("<div class=\"checkbox-option\"><input type=\"checkbox\" id=\"c_0\" name=\"tos\" value=\"yes\"><label for=\"c_0\">I agree</label></div>"));
		assert!(!html.contains(" required"));
	}

	#[rstest]
	fn test_submit_and_captcha(styling: Styling) {
		let submit = field(json!({ "id": "b", "name": "b", "type": "submit_button", "translations": { "en": { "label": "Send" } } }));
		assert_eq!(
			render(&submit, &styling),
			"<div class=\"field-type-submit_button\"><div class=\"form-field\"><button type=\"submit\">Send</button></div></div>"
		);

		let captcha = field(json!({ "id": "c", "name": "c", "type": "captcha", "translations": { "en": { "label": "" } } }));
		let html = render(&captcha, &styling);
		assert!(html.contains("<input type=\"hidden\" id=\"g-recaptcha\" name=\"g-recaptcha\" value=\"site-key\">"));
		assert!(html.contains("<script src=\"https://www.google.com/recaptcha/api.js?render=site-key\" defer></script>"));
	}

	#[rstest]
	fn test_unsupported_type_is_visible(styling: Styling) {
		let f = field(json!({ "id": "x", "name": "x", "type": "slider<b>", "translations": { "en": { "label": "X" } } }));
		assert_eq!(
			render(&f, &styling),
			"<div class=\"field-type-slider&lt;b&gt;\"><div>Unsupported field type: slider&lt;b&gt;</div></div>"
		);
	}

	#[rstest]
	fn test_help_text(styling: Styling) {
		let f = field(json!({ "id": "f", "name": "n", "type": "text", "translations": { "en": { "label": "L", "helpText": "Use <b>caps</b>" } } }));
		assert!(render(&f, &styling).contains("<small class=\"jform-help-text\">Use &lt;b&gt;caps&lt;/b&gt;</small>"));
	}

	#[rstest]
	fn test_divider_and_spacer(styling: Styling) {
		let divider = field(json!({ "id": "d", "name": "d", "type": "divider", "translations": {} }));
		assert_eq!(render(&divider, &styling), "<div class=\"field-type-divider\"><hr class=\"jform-divider\"></div>");

		let spacer = field(json!({ "id": "s", "name": "s", "type": "spacer", "translations": {} }));
		assert!(render(&spacer, &styling).contains("aria-hidden=\"true\""));
	}
}
