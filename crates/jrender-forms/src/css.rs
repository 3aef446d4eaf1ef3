//! Stylesheet generation.
//!
//! The static stylesheet ships as an asset. The dynamic stylesheet of a form
//! consists of the breakpoint layout rules, per-field-type rules derived from
//! the form's styling, and per-type breakpoint rules for types with
//! responsive behaviours.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::fmt::{self, Write};

use crate::classes::classes_to_css;
use crate::layout::{resolve_all_responsive_layouts, resolve_base_layout};
use crate::model::{Breakpoint, LabelLayout, LayoutSettings, Styling};

/// Grid, utility, form element and layout rules shared by every form.
pub static STATIC_CSS: &str = include_str!("../assets/form_core.css");

const LABEL_WIDTHS: [u32; 4] = [25, 30, 40, 50];
const LABEL_ALIGNMENTS: [&str; 3] = ["left", "right", "center"];
const DEFAULT_LABEL_WIDTH: u32 = 30;
const UNSAFE_CSS: [&str; 3] = ["javascript:", "expression(", "@import"];

/// Breakpoint layout rules. They do not depend on the form, so they are
/// built once.
pub static LAYOUT_CSS: Lazy<String> = Lazy::new(|| {
	let mut css = String::new();
	match write_layout_css(&mut css) {
		Ok(()) => css,
		Err(_) => String::new(),
	}
});

/// Remove constructs that could execute code or pull in foreign styles.
///
/// Stripping repeats until nothing changes, so fragments split or nested
/// around a removed pattern cannot reassemble into one.
///
/// # Examples
///
/// ```
/// use jrender_forms::css::sanitize_css;
///
/// assert_eq!(sanitize_css("color: red; background: url(javascript:x)"), "color: red; background: url(x)");
/// assert_eq!(sanitize_css("</style><script>"), "/stylescript");
/// assert_eq!(sanitize_css("url(java<script:x)"), "url(x)");
/// assert_eq!(sanitize_css("@im@importport url(a.css)"), " url(a.css)");
/// ```
pub fn sanitize_css(css: &str) -> String {
	let mut acc: String = css.chars().filter(|c| *c != '<' && *c != '>').collect();
	loop {
		let next = UNSAFE_CSS
			.iter()
			.fold(acc.clone(), |acc, pattern| acc.replace(pattern, ""));
		if next == acc {
			return acc;
		}
		acc = next;
	}
}

/// Reduce a field type name to characters valid in a CSS class.
pub fn css_ident(name: &str) -> String {
	name.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
		.collect()
}

fn write_layout_css(out: &mut String) -> fmt::Result {
	for bp in Breakpoint::ALL {
		let query = bp.media_query();

		writeln!(out, "{query} {{")?;
		for width in LABEL_WIDTHS {
			let scope = format!(".jform-{bp}-label-width-{width} .form-field.jform-{bp}-layout-inline");
			writeln!(out, "\t{scope} {{ display: flex; align-items: flex-start; gap: 1rem; }}")?;
			writeln!(
				out,
				"\t{scope} .inline-label {{ width: {width}%; flex-shrink: 0; padding-top: 0.75rem; }}"
			)?;
			writeln!(out, "\t{scope} .inline-input {{ width: {}%; flex-grow: 1; }}", 100 - width)?;
		}
		writeln!(out, "\t.jform-{bp}-layout-stacked .form-field {{ display: block !important; }}")?;
		writeln!(
			out,
			"\t.jform-{bp}-layout-stacked .form-field .inline-label {{ width: auto !important; padding-top: 0 !important; margin-bottom: 0.5rem !important; display: block !important; }}"
		)?;
		writeln!(out, "\t.jform-{bp}-layout-stacked .form-field .inline-input {{ width: 100% !important; }}")?;
		writeln!(
			out,
			"\t.jform-{bp}-layout-inline .form-field {{ display: flex !important; align-items: flex-start !important; gap: 1rem !important; }}"
		)?;
		writeln!(out, "\t.jform-{bp}-layout-floating .form-field {{ position: relative !important; }}")?;
		writeln!(out, "\t.jform-{bp}-layout-hidden .form-field label {{ display: none !important; }}")?;
		for align in LABEL_ALIGNMENTS {
			writeln!(
				out,
				"\t.jform-{bp}-label-align-{align} .inline-label {{ text-align: {align} !important; }}"
			)?;
		}
		writeln!(out, "}}")?;
	}
	Ok(())
}

fn write_rule(out: &mut String, selector: &str, classes: &str) -> fmt::Result {
	if classes.is_empty() {
		return Ok(());
	}
	writeln!(out, "{selector} {{ {} }}", sanitize_css(&classes_to_css(classes)))
}

fn write_floating_css(out: &mut String, ty: &str) -> fmt::Result {
	let scope = format!(".field-type-{ty} .jform-layout-floating");
	writeln!(out, "{scope} .floating-input-container {{ position: relative; }}")?;
	writeln!(
		out,
		"{scope} .floating-label {{ position: absolute; top: 0.75rem; left: 0.75rem; background: white; padding: 0 0.25rem; transition: all 0.2s ease-in-out; pointer-events: none; color: #6b7280; }}"
	)?;
	writeln!(
		out,
		"{scope} input:focus + .floating-label, {scope} input:not(:placeholder-shown) + .floating-label, \
		 {scope} textarea:focus + .floating-label, {scope} textarea:not(:placeholder-shown) + .floating-label \
		 {{ top: -0.5rem; font-size: 0.75rem; color: #3b82f6; }}"
	)
}

fn label_width(layout: &LayoutSettings) -> u32 {
	layout
		.inline_settings
		.as_ref()
		.and_then(|settings| settings.label_width.trim_end_matches('%').trim().parse().ok())
		.filter(|width| (1..100).contains(width))
		.unwrap_or(DEFAULT_LABEL_WIDTH)
}

fn write_responsive_field_css(out: &mut String, styling: &Styling, field_type: &str) -> fmt::Result {
	let layouts = resolve_all_responsive_layouts(styling, field_type);
	let ty = css_ident(field_type);

	for (bp, layout) in &layouts {
		let label_layout = layout.layout();
		let field = format!(".form-field.jform-{ty}-{bp}-layout-{label_layout}");

		writeln!(out, "{} {{", bp.media_query())?;
		match label_layout {
			LabelLayout::Stacked => {
				writeln!(out, "\t{field} {{ display: block !important; }}")?;
				writeln!(
					out,
					"\t{field} label {{ display: block !important; width: auto !important; padding-top: 0 !important; margin-bottom: 0.5rem !important; }}"
				)?;
				writeln!(out, "\t{field} .inline-input {{ width: 100% !important; }}")?;
			}
			LabelLayout::Inline => {
				let width = label_width(layout);
				writeln!(out, "\t{field} {{ display: flex !important; align-items: flex-start; gap: 1rem; }}")?;
				writeln!(
					out,
					"\t{field} .inline-label {{ width: {width}%; flex-shrink: 0; padding-top: 0.75rem; }}"
				)?;
				writeln!(out, "\t{field} .inline-input {{ width: {}%; flex-grow: 1; }}", 100 - width)?;
			}
			LabelLayout::Floating => {
				writeln!(out, "\t{field} {{ position: relative !important; }}")?;
			}
			LabelLayout::Hidden => {
				writeln!(out, "\t{field} label {{ display: none !important; }}")?;
			}
		}
		writeln!(out, "}}")?;
	}
	Ok(())
}

/// Write the dynamic stylesheet of a form.
///
/// `field_types` names the field types present in the form. Together with
/// the styled types they decide which per-type breakpoint rules exist.
pub fn write_field_css<'a>(
	out: &mut String,
	styling: &'a Styling,
	field_types: impl IntoIterator<Item = &'a str>,
) -> fmt::Result {
	out.push_str(&LAYOUT_CSS);

	for (field_type, style) in &styling.field_styling {
		let ty = css_ident(field_type);
		write_rule(out, &format!(".field-type-{ty} .form-field"), &style.wrapper)?;
		write_rule(out, &format!(".field-type-{ty} .form-field label"), &style.label)?;
		write_rule(
			out,
			&format!(
				".field-type-{ty} .form-field input, .field-type-{ty} .form-field textarea, .field-type-{ty} .form-field select"
			),
			&style.input,
		)?;
		write_rule(
			out,
			&format!(
				".field-type-{ty} h1, .field-type-{ty} h2, .field-type-{ty} h3, .field-type-{ty} h4, .field-type-{ty} h5, .field-type-{ty} h6, .field-type-{ty} p"
			),
			&style.element,
		)?;
		write_rule(out, &format!(".field-type-{ty} .form-field .error"), &style.error)?;
		write_rule(out, &format!(".field-type-{ty} .form-field button"), &style.button)?;

		if style.layout_override.is_some() {
			match resolve_base_layout(styling, field_type).layout() {
				LabelLayout::Floating => write_floating_css(out, &ty)?,
				LabelLayout::Hidden => {
					writeln!(out, ".field-type-{ty} .jform-layout-hidden label {{ display: none; }}")?;
				}
				LabelLayout::Stacked | LabelLayout::Inline => {}
			}
		}
	}

	let mut types: BTreeSet<&str> = styling.field_styling.keys().map(String::as_str).collect();
	types.extend(field_types);
	for field_type in types {
		write_responsive_field_css(out, styling, field_type)?;
	}
	Ok(())
}
