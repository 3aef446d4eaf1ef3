//! Locale selection and translation lookup.
//!
//! Lookups never fail. When the requested locale is missing, the fallback
//! is the lexicographically smallest locale key so that the same input
//! always renders the same output.

use once_cell::sync::Lazy;

use crate::model::{FieldTranslation, FormField, SelectOption};

static EMPTY_TRANSLATION: Lazy<FieldTranslation> = Lazy::new(FieldTranslation::default);

/// Pick the locale to render in.
///
/// An empty request, or a request for an unsupported locale, yields the
/// form's default locale.
///
/// # Examples
///
/// ```
/// use jrender_forms::language::select_language;
///
/// let supported = vec!["en".to_string(), "de".to_string()];
/// assert_eq!(select_language("de", &supported, "en"), "de");
/// assert_eq!(select_language("fr", &supported, "en"), "en");
/// assert_eq!(select_language("", &supported, "en"), "en");
/// ```
pub fn select_language<'a>(requested: &'a str, supported: &[String], default: &'a str) -> &'a str {
	if requested.is_empty() {
		return default;
	}
	if supported.iter().any(|lang| lang == requested) {
		requested
	} else {
		default
	}
}

/// Translation of `field` for `lang`, falling back to the first locale in
/// key order, then to an empty translation.
pub fn resolve_translation<'a>(field: &'a FormField, lang: &str) -> &'a FieldTranslation {
	field
		.translations
		.get(lang)
		.or_else(|| field.translations.values().next())
		.unwrap_or(&EMPTY_TRANSLATION)
}

/// Display label of an option for `lang`.
///
/// Uses the same fallback chain as [`resolve_translation`] and finally the
/// option's raw value.
pub fn resolve_option_label<'a>(option: &'a SelectOption, lang: &str) -> &'a str {
	option
		.translations
		.get(lang)
		.or_else(|| option.translations.values().next())
		.map(String::as_str)
		.unwrap_or(&option.value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::FieldKind;
	use rstest::rstest;
	use std::collections::BTreeMap;

	fn field_with(locales: &[(&str, &str)]) -> FormField {
		FormField {
			id: "f1".into(),
			name: "name".into(),
			kind: FieldKind::Text,
			required: false,
			allow_multiple_selections: None,
			options: vec![],
			validation: None,
			translations: locales
				.iter()
				.map(|(lang, label)| {
					(
						lang.to_string(),
						FieldTranslation {
							label: label.to_string(),
							..Default::default()
						},
					)
				})
				.collect(),
			tag: String::new(),
			format: 0,
			alignment: String::new(),
		}
	}

	#[rstest]
	fn test_exact_locale_wins() {
		let field = field_with(&[("de", "Name (de)"), ("en", "Name")]);
		assert_eq!(resolve_translation(&field, "en").label, "Name");
	}

	#[rstest]
	#[case("fr")]
	#[case("")]
	#[case("zz")]
	fn test_fallback_is_smallest_locale(#[case] lang: &str) {
		let field = field_with(&[("fr_CA", "Nom"), ("de", "Name (de)"), ("pt", "Nome")]);
		assert_eq!(resolve_translation(&field, lang).label, "Name (de)");
	}

	#[rstest]
	fn test_missing_translations_yield_empty() {
		let field = field_with(&[]);
		assert_eq!(resolve_translation(&field, "en"), &FieldTranslation::default());
	}

	#[rstest]
	fn test_option_label_falls_back_to_value() {
		let option = SelectOption {
			value: "red".into(),
			translations: BTreeMap::new(),
		};
		assert_eq!(resolve_option_label(&option, "en"), "red");

		let option = SelectOption {
			value: "red".into(),
			translations: BTreeMap::from([
				("fr".to_string(), "Rouge".to_string()),
				("de".to_string(), "Rot".to_string()),
			]),
		};
		assert_eq!(resolve_option_label(&option, "fr"), "Rouge");
		assert_eq!(resolve_option_label(&option, "en"), "Rot");
	}
}
