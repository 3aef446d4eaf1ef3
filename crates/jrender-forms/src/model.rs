//! Typed representation of the upstream form payload.
//!
//! The structures mirror the JSON served by the form-definition service.
//! Styling keys are `snake_case` while field-level keys are `camelCase`,
//! exactly as they appear on the wire. Maps that drive output order are
//! stored as [`BTreeMap`] so that rendering is reproducible byte for byte.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{RenderError, RenderResult};

/// A form as returned by the upstream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormData {
	pub id: Uuid,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	pub form_definition: FormDefinition,
	#[serde(default, deserialize_with = "null_as_default")]
	pub form_styling: FormStyling,
}

/// Language settings of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormLanguages {
	pub default: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub supported: Vec<String>,
}

/// Fields and languages of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
	pub languages: FormLanguages,
	#[serde(default, deserialize_with = "null_as_default")]
	pub fields: Vec<FormField>,
}

impl FormDefinition {
	/// Look up a field by its id.
	pub fn field(&self, id: &str) -> Option<&FormField> {
		self.fields.iter().find(|field| field.id == id)
	}

	/// Check the structural invariants of the definition.
	///
	/// The default language must be one of the supported languages, the form
	/// must carry at least one field, and every field needs a translation.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::model::{FormDefinition, FormLanguages};
	///
	/// let definition = FormDefinition {
	///     languages: FormLanguages { default: "en".into(), supported: vec!["de".into()] },
	///     fields: vec![],
	/// };
	/// assert!(definition.validate().is_err());
	/// ```
	pub fn validate(&self) -> RenderResult<()> {
		if !self.languages.supported.contains(&self.languages.default) {
			return Err(RenderError::InvalidDefinition(format!(
				"default language '{}' is not listed as supported",
				self.languages.default
			)));
		}
		if self.fields.is_empty() {
			return Err(RenderError::InvalidDefinition(
				"form has no fields".to_string(),
			));
		}
		if let Some(field) = self.fields.iter().find(|f| f.translations.is_empty()) {
			return Err(RenderError::InvalidDefinition(format!(
				"field '{}' has no translations",
				field.id
			)));
		}
		Ok(())
	}
}

/// Kind of a form field.
///
/// Unknown kinds deserialize into [`FieldKind::Other`] so a single odd field
/// never rejects the whole payload; it renders as a visible placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
	Text,
	Email,
	Textarea,
	Select,
	Checkbox,
	Radio,
	Phone,
	Captcha,
	Heading,
	Paragraph,
	SubmitButton,
	Divider,
	Spacer,
	Other(String),
}

impl FieldKind {
	/// Wire name of the kind, also used in CSS class names.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Text => "text",
			Self::Email => "email",
			Self::Textarea => "textarea",
			Self::Select => "select",
			Self::Checkbox => "checkbox",
			Self::Radio => "radio",
			Self::Phone => "phone",
			Self::Captcha => "captcha",
			Self::Heading => "heading",
			Self::Paragraph => "paragraph",
			Self::SubmitButton => "submit_button",
			Self::Divider => "divider",
			Self::Spacer => "spacer",
			Self::Other(name) => name,
		}
	}
}

impl From<String> for FieldKind {
	fn from(value: String) -> Self {
		match value.as_str() {
			"text" => Self::Text,
			"email" => Self::Email,
			"textarea" => Self::Textarea,
			"select" => Self::Select,
			"checkbox" => Self::Checkbox,
			"radio" => Self::Radio,
			"phone" => Self::Phone,
			"captcha" => Self::Captcha,
			"heading" => Self::Heading,
			"paragraph" => Self::Paragraph,
			"submit_button" => Self::SubmitButton,
			"divider" => Self::Divider,
			"spacer" => Self::Spacer,
			_ => Self::Other(value),
		}
	}
}

impl From<FieldKind> for String {
	fn from(kind: FieldKind) -> Self {
		kind.as_str().to_string()
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single form field with its translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: FieldKind,
	#[serde(default, deserialize_with = "null_as_default")]
	pub required: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allow_multiple_selections: Option<bool>,
	#[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<SelectOption>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub validation: Option<FieldValidation>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub translations: BTreeMap<String, FieldTranslation>,
	/// Heading tag (`h1`..`h6`).
	#[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
	pub tag: String,
	/// Bit set of text formats: 1 bold, 2 italic, 4 underline.
	#[serde(default, deserialize_with = "null_as_default")]
	pub format: i64,
	#[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
	pub alignment: String,
}

/// Option of a select, radio or checkbox field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
	#[serde(default, deserialize_with = "null_as_default")]
	pub value: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub translations: BTreeMap<String, String>,
}

/// Validation constraints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldValidation {
	pub email: Option<bool>,
	pub phone: Option<bool>,
	pub min_length: Option<i64>,
	pub max_length: Option<i64>,
	pub step: Option<f64>,
	pub max_size: Option<i64>,
	pub max_files: Option<i64>,
	#[serde(deserialize_with = "null_as_default")]
	pub accept: Vec<String>,
	#[serde(deserialize_with = "null_as_default")]
	pub mime_types: Vec<String>,
	pub min_selected: Option<i64>,
	pub max_selected: Option<i64>,
	pub min_date: Option<String>,
	pub max_date: Option<String>,
	pub alphanumeric_only: Option<bool>,
	pub no_special_chars: Option<bool>,
}

/// Texts of a field in one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldTranslation {
	#[serde(deserialize_with = "null_as_default")]
	pub label: String,
	#[serde(deserialize_with = "null_as_default")]
	pub placeholder: String,
	/// Message shown when a required field is empty.
	#[serde(deserialize_with = "null_as_default")]
	pub required: String,
	#[serde(deserialize_with = "null_as_default")]
	pub min_length: String,
	#[serde(deserialize_with = "null_as_default")]
	pub max_length: String,
	#[serde(deserialize_with = "null_as_default")]
	pub email: String,
	#[serde(deserialize_with = "null_as_default")]
	pub phone: String,
	#[serde(deserialize_with = "null_as_default")]
	pub help_text: String,
	#[serde(deserialize_with = "null_as_default")]
	pub error_messages: BTreeMap<String, String>,
	#[serde(deserialize_with = "null_as_default")]
	pub options: Vec<TranslatedOption>,
}

/// Value/label pair carried inside a translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatedOption {
	#[serde(deserialize_with = "null_as_default")]
	pub value: String,
	#[serde(deserialize_with = "null_as_default")]
	pub label: String,
}

/// Visual configuration of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormStyling {
	#[serde(deserialize_with = "null_as_default")]
	pub canvas_layout: CanvasLayout,
	#[serde(deserialize_with = "null_as_default")]
	pub styling: Styling,
}

/// Grid placement of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasLayout {
	#[serde(deserialize_with = "null_as_default")]
	pub grid_system: String,
	#[serde(deserialize_with = "null_as_default")]
	pub responsive_breakpoints: BTreeMap<String, String>,
	#[serde(deserialize_with = "null_as_default")]
	pub container_classes: String,
	#[serde(deserialize_with = "null_as_default")]
	pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	#[serde(deserialize_with = "null_as_default")]
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	/// Span per grid breakpoint (`sm`, `md`, `lg`, `xl`).
	#[serde(deserialize_with = "null_as_default")]
	pub responsive_spans: BTreeMap<String, i64>,
	#[serde(deserialize_with = "null_as_default")]
	pub responsive_classes: String,
	#[serde(deserialize_with = "null_as_default")]
	pub column_classes: String,
	#[serde(deserialize_with = "null_as_default")]
	pub gap: String,
	#[serde(deserialize_with = "null_as_default")]
	pub fields: Vec<FieldReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldReference {
	#[serde(default, deserialize_with = "null_as_default")]
	pub field_id: String,
}

/// CSS configuration of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styling {
	#[serde(deserialize_with = "null_as_default")]
	pub form_container: FormContainerStyle,
	#[serde(deserialize_with = "null_as_default")]
	pub layout_default: LayoutSettings,
	#[serde(deserialize_with = "null_as_default")]
	pub field_styling: BTreeMap<String, FieldTypeStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormContainerStyle {
	#[serde(deserialize_with = "null_as_default")]
	pub classes: String,
}

/// Utility classes applied to every field of one type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTypeStyle {
	#[serde(deserialize_with = "null_as_default")]
	pub wrapper: String,
	#[serde(deserialize_with = "null_as_default")]
	pub label: String,
	#[serde(deserialize_with = "null_as_default")]
	pub input: String,
	#[serde(deserialize_with = "null_as_default")]
	pub element: String,
	#[serde(deserialize_with = "null_as_default")]
	pub error: String,
	#[serde(deserialize_with = "null_as_default")]
	pub button: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub layout_override: Option<LayoutSettings>,
}

/// Placement of a label relative to its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLayout {
	#[default]
	Stacked,
	Inline,
	Floating,
	Hidden,
}

impl LabelLayout {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Stacked => "stacked",
			Self::Inline => "inline",
			Self::Floating => "floating",
			Self::Hidden => "hidden",
		}
	}

	fn parse(value: &str) -> Option<Self> {
		match value {
			"stacked" => Some(Self::Stacked),
			"inline" => Some(Self::Inline),
			"floating" => Some(Self::Floating),
			"hidden" => Some(Self::Hidden),
			_ => None,
		}
	}
}

impl fmt::Display for LabelLayout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Empty or unrecognised layout names count as unset.
fn deserialize_layout<'de, D>(deserializer: D) -> Result<Option<LabelLayout>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;
	Ok(raw.as_deref().and_then(LabelLayout::parse))
}

/// Named responsive viewport tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
	Mobile,
	Tablet,
	Desktop,
}

impl Breakpoint {
	/// All breakpoints, narrowest first.
	pub const ALL: [Breakpoint; 3] = [Self::Mobile, Self::Tablet, Self::Desktop];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Mobile => "mobile",
			Self::Tablet => "tablet",
			Self::Desktop => "desktop",
		}
	}

	/// Media condition selecting this tier.
	pub fn media_query(self) -> &'static str {
		match self {
			Self::Mobile => "@media (max-width: 767px)",
			Self::Tablet => "@media (min-width: 768px) and (max-width: 1023px)",
			Self::Desktop => "@media (min-width: 1024px)",
		}
	}
}

impl fmt::Display for Breakpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Width and alignment of labels in the inline layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineSettings {
	/// Width such as `30%`.
	#[serde(deserialize_with = "null_as_default")]
	pub label_width: String,
	#[serde(deserialize_with = "null_as_default")]
	pub label_alignment: String,
}

/// Per-breakpoint label layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveBehaviors {
	#[serde(default, deserialize_with = "deserialize_layout")]
	pub mobile: Option<LabelLayout>,
	#[serde(default, deserialize_with = "deserialize_layout")]
	pub tablet: Option<LabelLayout>,
	#[serde(default, deserialize_with = "deserialize_layout")]
	pub desktop: Option<LabelLayout>,
}

impl ResponsiveBehaviors {
	pub fn get(&self, breakpoint: Breakpoint) -> Option<LabelLayout> {
		match breakpoint {
			Breakpoint::Mobile => self.mobile,
			Breakpoint::Tablet => self.tablet,
			Breakpoint::Desktop => self.desktop,
		}
	}

	/// Whether at least one breakpoint carries a layout.
	pub fn is_defined(&self) -> bool {
		Breakpoint::ALL.iter().any(|bp| self.get(*bp).is_some())
	}
}

/// Label layout configuration, either global or per field type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
	#[serde(default, deserialize_with = "deserialize_layout")]
	pub label_layout: Option<LabelLayout>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inline_settings: Option<InlineSettings>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub responsive_behaviors: Option<ResponsiveBehaviors>,
}

impl LayoutSettings {
	/// Effective label layout, `stacked` when unset.
	pub fn layout(&self) -> LabelLayout {
		self.label_layout.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("text", FieldKind::Text)]
	#[case("submit_button", FieldKind::SubmitButton)]
	#[case("slider", FieldKind::Other("slider".to_string()))]
	fn test_field_kind_from_wire(#[case] wire: &str, #[case] expected: FieldKind) {
		let kind: FieldKind = serde_json::from_value(json!(wire)).unwrap();
		assert_eq!(kind, expected);
		assert_eq!(kind.as_str(), wire);
	}

	#[rstest]
	fn test_empty_label_layout_is_unset() {
		let layout: LayoutSettings = serde_json::from_value(json!({
			"label_layout": "",
			"responsive_behaviors": { "mobile": "stacked", "tablet": "", "desktop": "sideways" }
		}))
		.unwrap();

		assert_eq!(layout.label_layout, None);
		assert_eq!(layout.layout(), LabelLayout::Stacked);
		let behaviors = layout.responsive_behaviors.unwrap();
		assert_eq!(behaviors.mobile, Some(LabelLayout::Stacked));
		assert_eq!(behaviors.tablet, None);
		assert_eq!(behaviors.desktop, None);
		assert!(behaviors.is_defined());
	}

	#[rstest]
	fn test_field_uses_camel_case_keys() {
		let field: FormField = serde_json::from_value(json!({
			"id": "f1",
			"name": "email",
			"type": "email",
			"required": true,
			"allowMultipleSelections": false,
			"validation": { "minLength": 3, "email": true },
			"translations": { "en": { "label": "Email", "helpText": "Work address" } }
		}))
		.unwrap();

		assert_eq!(field.kind, FieldKind::Email);
		assert_eq!(field.allow_multiple_selections, Some(false));
		let validation = field.validation.unwrap();
		assert_eq!(validation.min_length, Some(3));
		assert_eq!(validation.email, Some(true));
		assert_eq!(field.translations["en"].help_text, "Work address");
	}

	#[rstest]
	fn test_null_values_decode_as_empty() {
		let data: FormData = serde_json::from_value(json!({
			"id": "3d8e2f4a-1b6c-4f0e-9a7d-2c5b8e1f0a93",
			"name": "Signup",
			"description": null,
			"form_definition": {
				"languages": { "default": "en", "supported": null },
				"fields": [{
					"id": "f1", "name": "color", "type": "select", "required": null,
					"options": null, "tag": null, "format": null, "alignment": null,
					"validation": { "accept": null, "mimeTypes": null, "minLength": null },
					"translations": { "en": { "label": "Color", "placeholder": null, "options": null, "errorMessages": null } }
				}]
			},
			"form_styling": {
				"canvas_layout": { "grid_system": null, "rows": null },
				"styling": { "form_container": null, "field_styling": null }
			}
		}))
		.unwrap();

		let field = &data.form_definition.fields[0];
		assert!(data.form_definition.languages.supported.is_empty());
		assert!(!field.required);
		assert!(field.options.is_empty());
		assert_eq!(field.tag, "");
		assert_eq!(field.format, 0);
		assert_eq!(field.translations["en"].placeholder, "");
		assert!(field.translations["en"].options.is_empty());
		assert!(field.validation.as_ref().unwrap().accept.is_empty());
		assert!(data.form_styling.canvas_layout.rows.is_empty());
		assert!(data.form_styling.styling.field_styling.is_empty());
	}

	#[rstest]
	fn test_negative_numbers_decode() {
		let field: FormField = serde_json::from_value(json!({
			"id": "f1", "name": "n", "type": "heading", "format": -1,
			"validation": { "minLength": -3, "maxSelected": -1 },
			"translations": { "en": { "label": "Title" } }
		}))
		.unwrap();
		let column: Column = serde_json::from_value(json!({ "responsive_spans": { "lg": -6 } })).unwrap();

		assert_eq!(field.format, -1);
		assert_eq!(field.validation.unwrap().min_length, Some(-3));
		assert_eq!(column.responsive_spans.get("lg"), Some(&-6));
		assert_eq!(crate::layout::column_classes(&column), "jform-col-12");
	}

	#[rstest]
	fn test_validate_accepts_consistent_definition() {
		let definition: FormDefinition = serde_json::from_value(json!({
			"languages": { "default": "en", "supported": ["en", "de"] },
			"fields": [{ "id": "f1", "name": "n", "type": "text", "translations": { "en": { "label": "Name" } } }]
		}))
		.unwrap();

		assert!(definition.validate().is_ok());
		assert!(definition.field("f1").is_some());
		assert!(definition.field("missing").is_none());
	}

	#[rstest]
	fn test_validate_rejects_untranslated_field() {
		let definition: FormDefinition = serde_json::from_value(json!({
			"languages": { "default": "en", "supported": ["en"] },
			"fields": [{ "id": "f1", "name": "n", "type": "text", "translations": {} }]
		}))
		.unwrap();

		let err = definition.validate().unwrap_err();
		assert!(err.to_string().contains("f1"));
	}

	#[rstest]
	fn test_breakpoints_are_ordered_narrowest_first() {
		let mut shuffled = vec![Breakpoint::Desktop, Breakpoint::Mobile, Breakpoint::Tablet];
		shuffled.sort();
		assert_eq!(shuffled, Breakpoint::ALL.to_vec());
	}
}
