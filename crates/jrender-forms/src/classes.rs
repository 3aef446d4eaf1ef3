//! Translation of utility class tokens.
//!
//! Two independent tables share one token vocabulary. The class-name table
//! maps tokens to engine-owned classes for `class` attributes, the property
//! table maps them to CSS declarations for generated style rules. The
//! property table ignores pseudo-class state: `hover:bg-green-700` becomes a
//! plain `background-color` declaration there, while the class-name table
//! keeps it as `jform-hover-bg-green-700`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Revision of [`CLASS_NAME_TABLE`].
pub const CLASS_NAME_TABLE_VERSION: u32 = 1;

/// Revision of [`CSS_PROPERTY_TABLE`].
pub const CSS_PROPERTY_TABLE_VERSION: u32 = 1;

const CLASS_NAME_ENTRIES: &[(&str, &str)] = &[
	// Grid
	("grid", "jform-grid"),
	("grid-cols-1", ""),
	("grid-cols-12", "jform-lg-grid-cols-12"),
	("lg:grid-cols-12", "jform-lg-grid-cols-12"),
	// Layout and spacing
	("gap-4", "jform-gap-4"),
	("gap-6", "jform-gap-6"),
	("space-y-4", "jform-space-y-4"),
	("space-y-8", "jform-space-y-8"),
	("hidden", "jform-hidden"),
	("block", "jform-block"),
	("lg:block", "jform-lg-block"),
	("flex", "jform-flex"),
	("items-center", "jform-items-center"),
	// Container and sizing
	("max-w-7xl", "jform-max-w-7xl"),
	("mx-auto", "jform-mx-auto"),
	("p-6", "jform-p-6"),
	("sm:p-8", "jform-sm-p-8"),
	("w-full", "jform-w-full"),
	("h-fit", "jform-h-fit"),
	// Colors
	("bg-white", "jform-bg-white"),
	("bg-gray-50", "jform-bg-gray-50"),
	("bg-green-600", "jform-bg-green-600"),
	("hover:bg-green-700", "jform-hover-bg-green-700"),
	("text-white", "jform-text-white"),
	("text-gray-700", "jform-text-gray-700"),
	("text-gray-900", "jform-text-gray-900"),
	("text-red-600", "jform-text-red-600"),
	("text-blue-600", "jform-text-blue-600"),
	// Borders
	("rounded-lg", "jform-rounded-lg"),
	("rounded", "jform-rounded"),
	("border", "jform-border"),
	("border-gray-300", "jform-border-gray-300"),
	("border-b-2", "jform-border-b-2"),
	("border-gray-200", "jform-border-gray-200"),
	// Typography
	("text-2xl", "jform-text-2xl"),
	("text-lg", "jform-text-lg"),
	("text-sm", "jform-text-sm"),
	("font-bold", "jform-font-bold"),
	("font-semibold", "jform-font-semibold"),
	("font-medium", "jform-font-medium"),
	// Spacing
	("mb-2", "jform-mb-2"),
	("mb-4", "jform-mb-4"),
	("mb-6", "jform-mb-6"),
	("mt-2", "jform-mt-2"),
	("mt-8", "jform-mt-8"),
	("px-4", "jform-px-4"),
	("px-8", "jform-px-8"),
	("py-3", "jform-py-3"),
	("py-4", "jform-py-4"),
	("pb-2", "jform-pb-2"),
	("mr-2", "jform-mr-2"),
	("h-4", "jform-h-4"),
	("w-4", "jform-w-4"),
	// Position
	("sticky", "jform-sticky"),
	("top-4", "jform-top-4"),
	// Interaction
	("focus:ring-2", "jform-focus-ring-2"),
	("focus:ring-blue-500", "jform-focus-ring-blue-500"),
	("focus:ring-green-500", "jform-focus-ring-green-500"),
	("focus:border-blue-500", "jform-focus-border-blue-500"),
	("focus:outline-none", "jform-focus-outline-none"),
	("focus:ring-offset-2", "jform-focus-ring-offset-2"),
	("transition-colors", "jform-transition-colors"),
	("duration-200", "jform-duration-200"),
];

/// Column span prefixes whose tokens are dropped; spans come from the
/// column's `responsive_spans` instead.
const DROPPED_SPAN_PREFIXES: [&str; 4] = ["", "sm:", "md:", "lg:"];

const CSS_PROPERTY_ENTRIES: &[(&str, &str)] = &[
	("mb-4", "margin-bottom: 1rem;"),
	("mb-6", "margin-bottom: 1.5rem;"),
	("mb-2", "margin-bottom: 0.5rem;"),
	("mt-8", "margin-top: 2rem;"),
	("mt-2", "margin-top: 0.5rem;"),
	("block", "display: block;"),
	("flex", "display: flex;"),
	("items-center", "align-items: center;"),
	("text-sm", "font-size: 0.875rem; line-height: 1.25rem;"),
	("text-lg", "font-size: 1.125rem; line-height: 1.75rem;"),
	("text-2xl", "font-size: 1.5rem; line-height: 2rem;"),
	("font-medium", "font-weight: 500;"),
	("font-semibold", "font-weight: 600;"),
	("font-bold", "font-weight: 700;"),
	("text-gray-700", "color: #374151;"),
	("text-gray-900", "color: #111827;"),
	("text-red-600", "color: #dc2626;"),
	("text-blue-600", "color: #2563eb;"),
	("text-white", "color: #ffffff;"),
	("bg-green-600", "background-color: #059669;"),
	("hover:bg-green-700", "background-color: #047857;"),
	("bg-gray-50", "background-color: #f9fafb;"),
	("bg-white", "background-color: #ffffff;"),
	("w-full", "width: 100%;"),
	("px-4", "padding-left: 1rem; padding-right: 1rem;"),
	("py-3", "padding-top: 0.75rem; padding-bottom: 0.75rem;"),
	("py-4", "padding-top: 1rem; padding-bottom: 1rem;"),
	("px-8", "padding-left: 2rem; padding-right: 2rem;"),
	("p-6", "padding: 1.5rem;"),
	("border", "border-width: 1px;"),
	("border-gray-300", "border-color: #d1d5db;"),
	("border-b-2", "border-bottom-width: 2px;"),
	("border-gray-200", "border-color: #e5e7eb;"),
	("rounded-lg", "border-radius: 0.5rem;"),
	("rounded", "border-radius: 0.25rem;"),
	("focus:ring-2", "outline: none;"),
	("focus:ring-blue-500", "box-shadow: 0 0 0 2px rgba(59, 130, 246, 0.5);"),
	("focus:border-blue-500", "border-color: #3b82f6;"),
	(
		"transition-colors",
		"transition: color 0.15s ease-in-out, background-color 0.15s ease-in-out, border-color 0.15s ease-in-out;",
	),
	("duration-200", "transition-duration: 0.2s;"),
	("mr-2", "margin-right: 0.5rem;"),
	("h-4", "height: 1rem;"),
	("w-4", "width: 1rem;"),
	("pb-2", "padding-bottom: 0.5rem;"),
];

/// Utility token to engine class. An empty value drops the token.
pub static CLASS_NAME_TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
	let mut table: HashMap<String, &'static str> = CLASS_NAME_ENTRIES
		.iter()
		.map(|(token, class)| (token.to_string(), *class))
		.collect();

	for prefix in DROPPED_SPAN_PREFIXES {
		for span in 1..=12 {
			table.insert(format!("{prefix}col-span-{span}"), "");
		}
	}
	table
});

/// Utility token to CSS declarations.
pub static CSS_PROPERTY_TABLE: Lazy<HashMap<&'static str, &'static str>> =
	Lazy::new(|| CSS_PROPERTY_ENTRIES.iter().copied().collect());

/// Map utility tokens to engine class names.
///
/// Unknown tokens are kept as custom classes; tokens mapped to nothing are
/// dropped.
///
/// # Examples
///
/// ```
/// use jrender_forms::classes::transform_classes;
///
/// assert_eq!(
///     transform_classes("grid col-span-6 my-class hover:bg-green-700"),
///     "jform-grid my-class jform-hover-bg-green-700"
/// );
/// ```
pub fn transform_classes(classes: &str) -> String {
	classes
		.split_whitespace()
		.filter_map(|token| match CLASS_NAME_TABLE.get(token) {
			Some(mapped) if mapped.is_empty() => None,
			Some(mapped) => Some(*mapped),
			None => Some(token),
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Map utility tokens to CSS declarations.
///
/// Input that already reads as declarations (a `:` together with either a
/// `;` or no whitespace) is returned unchanged. Otherwise unknown tokens are
/// skipped.
///
/// # Examples
///
/// ```
/// use jrender_forms::classes::classes_to_css;
///
/// assert_eq!(classes_to_css("mb-4 my-class font-bold"), "margin-bottom: 1rem; font-weight: 700;");
/// assert_eq!(classes_to_css("color: red;"), "color: red;");
/// ```
pub fn classes_to_css(classes: &str) -> String {
	if looks_like_declarations(classes) {
		return classes.to_string();
	}

	classes
		.split_whitespace()
		.filter_map(|token| CSS_PROPERTY_TABLE.get(token).copied())
		.collect::<Vec<_>>()
		.join(" ")
}

fn looks_like_declarations(classes: &str) -> bool {
	classes.contains(':') && (classes.contains(';') || !classes.contains(' '))
}
