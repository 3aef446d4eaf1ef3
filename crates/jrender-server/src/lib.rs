//! Form rendering service.
//!
//! Fetches form definitions from the upstream jform service and serves:
//!
//! - `GET /f/{formID}`: the form as a standalone HTML page
//! - `GET /embedv1.js`: the embed loader for host pages
//! - `GET /api/public/v1/embeds/{embedId}/data`: CSS and HTML of one form
//! - `POST /api/public/v1/embeds/{embedId}/submissions`: forwards a submission
//!
//! Rendering itself lives in [`jrender_forms`].

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod remote;
pub mod router;
pub mod server;
pub mod services;
pub mod submission;

pub use config::{CachedConfigProvider, ConfigProvider, LayeredLoader, Settings, StaticConfig};
pub use error::{ApiError, ApiResult};
pub use remote::{FormSource, JformClient};
pub use router::{Handler, Router};
pub use server::HttpServer;
