//! Errors raised while rendering a form.

use std::fmt;

/// Error produced by the rendering engine.
///
/// Rendering itself never fails on user content: unknown field types and
/// dangling field references degrade gracefully. What remains are structural
/// problems with the definition and failures of the output writer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// The form definition violates one of its structural invariants.
	#[error("invalid form definition: {0}")]
	InvalidDefinition(String),

	/// Writing the generated output failed.
	#[error("failed to format {artifact}")]
	Format {
		artifact: &'static str,
		#[source]
		source: fmt::Error,
	},
}

impl RenderError {
	/// Wrap a formatter failure with the name of the artifact being produced.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_forms::RenderError;
	///
	/// let err = RenderError::format("core HTML", std::fmt::Error);
	/// assert_eq!(err.to_string(), "failed to format core HTML");
	/// ```
	pub fn format(artifact: &'static str, source: fmt::Error) -> Self {
		Self::Format { artifact, source }
	}
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
