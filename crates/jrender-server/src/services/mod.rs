//! Request-independent business logic behind the handlers.

pub mod embed;
pub mod render;

pub use embed::EmbedService;
pub use render::RenderService;
