use anyhow::Context;
use jrender_server::config::{self, CachedConfigProvider, ConfigProvider, LayeredLoader};
use jrender_server::{HttpServer, JformClient, app, logging, server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "config/jrender.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	logging::init();

	let config_path = std::env::var_os("JRENDER_CONFIG")
		.map(PathBuf::from)
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
	let provider: Arc<dyn ConfigProvider> = Arc::new(
		CachedConfigProvider::from_loader(LayeredLoader::standard(&config_path))
			.context("failed to load configuration")?,
	);
	let _watcher = if config_path.exists() {
		Some(config::watch(&config_path, provider.clone()).context("failed to watch configuration file")?)
	} else {
		tracing::info!(path = %config_path.display(), "no configuration file, using defaults and environment");
		None
	};

	let settings = provider.current();
	let addr: SocketAddr = settings
		.server
		.bind
		.parse()
		.with_context(|| format!("invalid bind address {}", settings.server.bind))?;

	let source = Arc::new(JformClient::new(provider.clone()));
	let router = app::router(&settings, source);

	HttpServer::new(Arc::new(router))
		.listen(addr, server::shutdown_signal())
		.await
		.context("server error")?;
	Ok(())
}
