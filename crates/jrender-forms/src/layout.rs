//! Layout resolution and layout class generation.
//!
//! A field's effective layout is the global default, patched by the
//! layout override of its field type, optionally patched again by the
//! responsive behaviour of one breakpoint. The resolved settings are then
//! turned into the class names that the generated CSS targets.

use std::collections::BTreeMap;

use crate::classes::transform_classes;
use crate::model::{Breakpoint, Column, InlineSettings, LabelLayout, LayoutSettings, Row, Styling};

/// Grid span breakpoints, widest first.
const SPAN_BREAKPOINTS: [&str; 4] = ["xl", "lg", "md", "sm"];

fn merge_layout(styling: &Styling, field_type: &str, with_responsive: bool) -> LayoutSettings {
	let mut effective = styling.layout_default.clone();

	let layout_override = styling
		.field_styling
		.get(field_type)
		.and_then(|style| style.layout_override.as_ref());
	if let Some(layout_override) = layout_override {
		if layout_override.label_layout.is_some() {
			effective.label_layout = layout_override.label_layout;
		}
		if layout_override.inline_settings.is_some() {
			effective.inline_settings = layout_override.inline_settings.clone();
		}
		if with_responsive && layout_override.responsive_behaviors.is_some() {
			effective.responsive_behaviors = layout_override.responsive_behaviors.clone();
		}
	}
	if !with_responsive {
		effective.responsive_behaviors = None;
	}
	effective
}

/// Effective layout of `field_type`, optionally at one breakpoint.
///
/// The breakpoint, when its responsive behaviour is set, replaces the label
/// layout only. The returned settings always carry a label layout.
///
/// # Examples
///
/// ```
/// use jrender_forms::layout::resolve_layout;
/// use jrender_forms::model::{Breakpoint, LabelLayout, Styling};
///
/// let styling = Styling::default();
/// let layout = resolve_layout(&styling, "text", Some(Breakpoint::Mobile));
/// assert_eq!(layout.label_layout, Some(LabelLayout::Stacked));
/// ```
pub fn resolve_layout(styling: &Styling, field_type: &str, breakpoint: Option<Breakpoint>) -> LayoutSettings {
	let mut effective = merge_layout(styling, field_type, true);

	let responsive = breakpoint.and_then(|bp| {
		effective
			.responsive_behaviors
			.as_ref()
			.and_then(|behaviors| behaviors.get(bp))
	});
	if let Some(layout) = responsive {
		effective.label_layout = Some(layout);
	}

	effective.label_layout.get_or_insert(LabelLayout::Stacked);
	effective
}

/// Effective layout of `field_type` ignoring every responsive behaviour.
pub fn resolve_base_layout(styling: &Styling, field_type: &str) -> LayoutSettings {
	let mut effective = merge_layout(styling, field_type, false);
	effective.label_layout.get_or_insert(LabelLayout::Stacked);
	effective
}

/// Whether the global default or the override of `field_type` defines a
/// layout for at least one breakpoint.
pub fn has_responsive_behaviors(styling: &Styling, field_type: &str) -> bool {
	let global = styling
		.layout_default
		.responsive_behaviors
		.as_ref()
		.is_some_and(|behaviors| behaviors.is_defined());

	let field = styling
		.field_styling
		.get(field_type)
		.and_then(|style| style.layout_override.as_ref())
		.and_then(|layout| layout.responsive_behaviors.as_ref())
		.is_some_and(|behaviors| behaviors.is_defined());

	global || field
}

/// Layout of `field_type` at every breakpoint.
///
/// Empty when no responsive behaviour applies to the type, so that no
/// breakpoint classes or rules are generated for it.
pub fn resolve_all_responsive_layouts(styling: &Styling, field_type: &str) -> BTreeMap<Breakpoint, LayoutSettings> {
	if !has_responsive_behaviors(styling, field_type) {
		return BTreeMap::new();
	}

	Breakpoint::ALL
		.iter()
		.map(|bp| (*bp, resolve_layout(styling, field_type, Some(*bp))))
		.collect()
}

fn inline_settings(layout: &LayoutSettings) -> Option<&InlineSettings> {
	match layout.layout() {
		LabelLayout::Inline => layout.inline_settings.as_ref(),
		_ => None,
	}
}

fn label_width(settings: &InlineSettings) -> String {
	settings.label_width.replace('%', "")
}

/// Width and alignment classes of an inline label.
///
/// Empty for any layout other than `inline` with inline settings.
pub fn label_layout_classes(layout: &LayoutSettings) -> String {
	match inline_settings(layout) {
		Some(settings) => format!(
			"jform-label-width-{} jform-label-align-{}",
			label_width(settings),
			settings.label_alignment
		),
		None => String::new(),
	}
}

/// Base layout classes of a field.
///
/// # Examples
///
/// ```
/// use jrender_forms::layout::layout_classes;
/// use jrender_forms::model::{LabelLayout, LayoutSettings};
///
/// let layout = LayoutSettings { label_layout: Some(LabelLayout::Inline), ..Default::default() };
/// assert_eq!(layout_classes(&layout, "email"), "jform-layout-inline jform-email-layout-inline");
/// ```
pub fn layout_classes(layout: &LayoutSettings, field_type: &str) -> String {
	let label_layout = layout.layout();
	format!("jform-layout-{label_layout} jform-{field_type}-layout-{label_layout}")
}

/// Per-breakpoint layout classes, in mobile, tablet, desktop order.
pub fn responsive_layout_classes(layouts: &BTreeMap<Breakpoint, LayoutSettings>, field_type: &str) -> String {
	let mut classes = Vec::new();

	for (bp, layout) in layouts {
		let label_layout = layout.layout();
		classes.push(format!("jform-{bp}-layout-{label_layout}"));
		classes.push(format!("jform-{field_type}-{bp}-layout-{label_layout}"));

		if let Some(settings) = inline_settings(layout) {
			classes.push(format!("jform-{bp}-label-width-{}", label_width(settings)));
			classes.push(format!("jform-{bp}-label-align-{}", settings.label_alignment));
		}
	}

	classes.join(" ")
}

/// Classes of a grid row.
pub fn row_classes(_row: &Row) -> String {
	"jform-grid jform-lg-grid-cols-12".to_string()
}

/// Classes of a grid column.
///
/// Transformed responsive classes come first, then transformed column
/// classes, then span classes from widest to narrowest breakpoint. Every
/// column ends with `jform-col-12` so that it spans the full width on mobile.
///
/// # Examples
///
/// ```
/// use jrender_forms::layout::column_classes;
/// use jrender_forms::model::Column;
///
/// let mut column = Column::default();
/// column.responsive_spans.insert("lg".into(), 6);
/// assert_eq!(column_classes(&column), "jform-lg-col-6 jform-col-12");
/// ```
pub fn column_classes(column: &Column) -> String {
	let mut classes = Vec::new();

	for source in [&column.responsive_classes, &column.column_classes] {
		let transformed = transform_classes(source);
		if !transformed.is_empty() {
			classes.push(transformed);
		}
	}

	for bp in SPAN_BREAKPOINTS {
		match column.responsive_spans.get(bp) {
			Some(span) if *span > 0 => classes.push(format!("jform-{bp}-col-{span}")),
			_ => {}
		}
	}

	classes.push("jform-col-12".to_string());
	classes.join(" ")
}

/// Layout information needed to render one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
	/// Layout that decides the markup structure.
	pub primary: LayoutSettings,
	/// Classes of the `form-field` element.
	pub classes: String,
	/// Width and alignment classes of the label.
	pub label_classes: String,
}

impl FieldLayout {
	/// Resolve the layout of a field of type `field_type`.
	///
	/// Without responsive behaviours the base layout drives the structure.
	/// With them, the desktop layout does, and the class list additionally
	/// carries every breakpoint's classes so the CSS can switch between them.
	pub fn resolve(styling: &Styling, field_type: &str) -> Self {
		let base = resolve_base_layout(styling, field_type);
		let base_classes = layout_classes(&base, field_type);
		let label_classes = label_layout_classes(&base);

		let mut responsive = resolve_all_responsive_layouts(styling, field_type);
		let responsive_classes = responsive_layout_classes(&responsive, field_type);

		let primary = responsive.remove(&Breakpoint::Desktop).unwrap_or(base);
		let classes = format!("{base_classes} {responsive_classes}").trim().to_string();

		Self {
			primary,
			classes,
			label_classes,
		}
	}
}
