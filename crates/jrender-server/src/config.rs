//! Service configuration.
//!
//! Settings are assembled from layered [`ConfigSource`]s (a TOML file, then
//! `JRENDER_*` environment variables) and served through a
//! [`ConfigProvider`]. [`CachedConfigProvider`] reloads the layers at most
//! once per TTL and can be invalidated early by a file watcher.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "JRENDER_";

/// Error type for configuration loading
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid settings: {0}")]
	Invalid(#[from] serde_json::Error),

	#[error("Watch error: {0}")]
	Watch(#[from] notify::Error),
}

/// Service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub base: BaseSettings,
	pub remote: RemoteSettings,
	pub captcha: CaptchaSettings,
	pub config: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
	/// Socket address the HTTP server binds to.
	pub bind: String,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			bind: "0.0.0.0:9200".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseSettings {
	/// Public origin of this service, baked into the embed loader.
	pub url: String,
	/// Origin that receives form submissions.
	pub submission_url: String,
}

impl Default for BaseSettings {
	fn default() -> Self {
		Self {
			url: "http://localhost:9200".to_string(),
			submission_url: jrender_forms::engine::DEFAULT_SUBMISSION_BASE_URL.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
	/// Base URL of the upstream form service.
	pub jform: String,
	pub api_key: String,
	#[serde(deserialize_with = "lenient_u64")]
	pub timeout_secs: u64,
}

impl Default for RemoteSettings {
	fn default() -> Self {
		Self {
			jform: "http://localhost:9000".to_string(),
			api_key: String::new(),
			timeout_secs: 30,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaSettings {
	/// reCAPTCHA site key. Captcha fields render without a widget when empty.
	pub site_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
	#[serde(deserialize_with = "lenient_u64")]
	pub ttl_secs: u64,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self { ttl_secs: 300 }
	}
}

impl Settings {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.remote.timeout_secs)
	}

	pub fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.config.ttl_secs)
	}
}

/// Accepts numbers given either as JSON numbers or as strings.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum NumberOrString {
		Number(u64),
		String(String),
	}

	match NumberOrString::deserialize(deserializer)? {
		NumberOrString::Number(n) => Ok(n),
		NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
	}
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load this layer as a JSON object of sections.
	fn load(&self) -> Result<Map<String, Value>, ConfigError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<Map<String, Value>, ConfigError> {
		if !self.path.exists() {
			return Ok(Map::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let table: toml::Table = toml::from_str(&content)?;
		match serde_json::to_value(table)? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
///
/// `JRENDER_REMOTE_API_KEY` sets `api_key` in section `remote`: the first
/// segment after the prefix names the section, the rest the key.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			vars: None,
		}
	}

	/// Read from `vars` instead of the process environment.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_server::config::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::new("JRENDER_")
	///     .with_vars([("JRENDER_REMOTE_API_KEY".to_string(), "secret".to_string())]);
	/// let layer = source.load().unwrap();
	/// assert_eq!(layer["remote"]["api_key"], "secret");
	/// ```
	pub fn with_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
		self.vars = Some(vars.into_iter().collect());
		self
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<Map<String, Value>, ConfigError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = Map::new();
		for (key, value) in vars {
			let Some(rest) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let rest = rest.to_lowercase();
			let Some((section, name)) = rest.split_once('_') else {
				continue;
			};
			if section.is_empty() || name.is_empty() {
				continue;
			}

			if let Value::Object(entries) = config
				.entry(section.to_string())
				.or_insert_with(|| Value::Object(Map::new()))
			{
				entries.insert(name.to_string(), Value::String(value));
			}
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn merge(target: &mut Map<String, Value>, layer: Map<String, Value>) {
	for (key, value) in layer {
		match (target.get_mut(&key), value) {
			(Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
			(_, value) => {
				target.insert(key, value);
			}
		}
	}
}

/// Produces a fresh [`Settings`] value.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLoader: Send + Sync {
	fn load(&self) -> Result<Settings, ConfigError>;
}

/// Merges sources in priority order, higher priorities overriding lower
/// ones key by key.
#[derive(Default)]
pub struct LayeredLoader {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl LayeredLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self.sources.sort_by_key(|source| source.priority());
		self
	}

	/// The usual stack: `path` overridden by `JRENDER_*` variables.
	pub fn standard(path: impl Into<PathBuf>) -> Self {
		Self::new()
			.with_source(TomlFileSource::new(path))
			.with_source(EnvSource::new(ENV_PREFIX))
	}
}

impl ConfigLoader for LayeredLoader {
	fn load(&self) -> Result<Settings, ConfigError> {
		let mut merged = Map::new();
		for source in &self.sources {
			tracing::debug!(source = %source.description(), "loading configuration layer");
			merge(&mut merged, source.load()?);
		}
		Ok(serde_json::from_value(Value::Object(merged))?)
	}
}

/// Access to the current settings.
pub trait ConfigProvider: Send + Sync {
	/// Current settings, reloading them first when they are out of date.
	fn get(&self) -> Result<Arc<Settings>, ConfigError>;

	/// Last successfully loaded settings, without reloading.
	fn current(&self) -> Arc<Settings>;

	/// Mark the cached settings as out of date.
	fn invalidate(&self);
}

/// Provider for settings that never change.
#[derive(Debug, Clone)]
pub struct StaticConfig(Arc<Settings>);

impl StaticConfig {
	pub fn new(settings: Settings) -> Self {
		Self(Arc::new(settings))
	}
}

impl ConfigProvider for StaticConfig {
	fn get(&self) -> Result<Arc<Settings>, ConfigError> {
		Ok(self.0.clone())
	}

	fn current(&self) -> Arc<Settings> {
		self.0.clone()
	}

	fn invalidate(&self) {}
}

struct CacheState {
	settings: Arc<Settings>,
	loaded_at: Instant,
	stale: bool,
}

/// Settings cached for a fixed TTL.
///
/// Readers share a read lock while the cache is fresh. The first reader to
/// see an expired cache takes the write lock, checks freshness again and
/// reloads. A failed reload keeps the previous settings.
pub struct CachedConfigProvider<L> {
	loader: L,
	ttl: Duration,
	state: RwLock<CacheState>,
}

impl<L: ConfigLoader> CachedConfigProvider<L> {
	/// Load the initial settings. Fails when they cannot be loaded.
	pub fn new(loader: L, ttl: Duration) -> Result<Self, ConfigError> {
		let mut provider = Self::from_loader(loader)?;
		provider.ttl = ttl;
		Ok(provider)
	}

	/// Load the initial settings and cache them for their own
	/// `config.ttl_secs`.
	pub fn from_loader(loader: L) -> Result<Self, ConfigError> {
		let settings = loader.load()?;
		let ttl = settings.cache_ttl();
		Ok(Self {
			loader,
			ttl,
			state: RwLock::new(CacheState {
				settings: Arc::new(settings),
				loaded_at: Instant::now(),
				stale: false,
			}),
		})
	}

	fn is_fresh(&self, state: &CacheState) -> bool {
		!state.stale && state.loaded_at.elapsed() < self.ttl
	}
}

impl<L: ConfigLoader> ConfigProvider for CachedConfigProvider<L> {
	fn get(&self) -> Result<Arc<Settings>, ConfigError> {
		{
			let state = self.state.read();
			if self.is_fresh(&state) {
				return Ok(state.settings.clone());
			}
		}

		let mut state = self.state.write();
		// Another reader may have reloaded while we waited.
		if self.is_fresh(&state) {
			return Ok(state.settings.clone());
		}

		match self.loader.load() {
			Ok(settings) => {
				tracing::info!("configuration reloaded");
				state.settings = Arc::new(settings);
				state.loaded_at = Instant::now();
				state.stale = false;
				Ok(state.settings.clone())
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to reload configuration, keeping previous settings");
				// Retry a broken source once per TTL, not on every request.
				state.loaded_at = Instant::now();
				state.stale = false;
				Err(err)
			}
		}
	}

	fn current(&self) -> Arc<Settings> {
		self.state.read().settings.clone()
	}

	fn invalidate(&self) {
		self.state.write().stale = true;
	}
}

/// Invalidate `provider` whenever the file at `path` is written.
///
/// The returned watcher must be kept alive for as long as changes should be
/// observed.
pub fn watch(path: &Path, provider: Arc<dyn ConfigProvider>) -> Result<RecommendedWatcher, ConfigError> {
	let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
		Ok(event) => {
			if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
				tracing::info!(paths = ?event.paths, "configuration file changed");
				provider.invalidate();
			}
		}
		Err(err) => tracing::warn!(error = %err, "configuration watch error"),
	})?;
	watcher.watch(path, RecursiveMode::NonRecursive)?;
	Ok(watcher)
}
