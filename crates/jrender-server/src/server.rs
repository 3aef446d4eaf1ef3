//! HTTP/1 server with graceful shutdown.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::ApiError;
use crate::http::{Request, Response};
use crate::router::Handler;
use crate::submission::MAX_SUBMISSION_BYTES;

/// Time in-flight connections get to finish after shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Accepts connections and feeds their requests to a [`Handler`].
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	body_limit: usize,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			body_limit: MAX_SUBMISSION_BYTES,
		}
	}

	/// Largest request body read before answering `400`.
	pub fn with_body_limit(mut self, limit: usize) -> Self {
		self.body_limit = limit;
		self
	}

	/// Bind `addr` and serve until `shutdown` resolves.
	pub async fn listen(self, addr: SocketAddr, shutdown: impl Future<Output = ()>) -> std::io::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, shutdown).await
	}

	/// Serve connections from `listener` until `shutdown` resolves.
	///
	/// Once `shutdown` resolves no new connections are accepted. Open
	/// connections finish their current request and are given
	/// [`SHUTDOWN_GRACE`] to close.
	pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> std::io::Result<()> {
		tracing::info!(address = %listener.local_addr()?, "server listening");

		let (stop_tx, stop_rx) = watch::channel(false);
		let mut connections = JoinSet::new();
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = match result {
						Ok(accepted) => accepted,
						Err(err) => {
							tracing::warn!(error = %err, "failed to accept connection");
							continue;
						}
					};
					let service = RequestService {
						handler: self.handler.clone(),
						remote_addr,
						body_limit: self.body_limit,
					};
					let stop_rx = stop_rx.clone();
					connections.spawn(async move {
						if let Err(err) = Self::handle_connection(stream, service, stop_rx).await {
							tracing::debug!(error = %err, %remote_addr, "connection closed with error");
						}
					});
				}
				// Reap finished connections so the set only holds live ones.
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				_ = &mut shutdown => {
					tracing::info!("shutdown signal received, stopping server");
					break;
				}
			}
		}

		let _ = stop_tx.send(true);
		let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
			while connections.join_next().await.is_some() {}
		})
		.await;
		if drained.is_err() {
			tracing::warn!(remaining = connections.len(), "aborting connections after grace period");
			connections.abort_all();
		}

		tracing::info!("server shutdown complete");
		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		service: RequestService,
		mut stop_rx: watch::Receiver<bool>,
	) -> Result<(), hyper::Error> {
		let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
		tokio::pin!(connection);

		tokio::select! {
			result = connection.as_mut() => result,
			_ = stop_rx.changed() => {
				connection.as_mut().graceful_shutdown();
				connection.await
			}
		}
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	body_limit: usize,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;
		let body_limit = self.body_limit;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			tracing::trace!(%remote_addr, method = %parts.method, uri = %parts.uri, "request received");
			let body = match Limited::new(body, body_limit).collect().await {
				Ok(collected) => collected.to_bytes(),
				Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
					tracing::debug!(%remote_addr, limit = body_limit, "request body too large");
					return Ok(into_hyper(ApiError::bad_request("invalid form data").to_response())?);
				}
				Err(err) => return Err(err),
			};

			let request = Request::new(parts.method, parts.uri, parts.headers, body);
			let response = handler
				.handle(request)
				.await
				.unwrap_or_else(|err| err.to_response());

			Ok(into_hyper(response)?)
		})
	}
}

fn into_hyper(response: Response) -> Result<hyper::Response<Full<Bytes>>, http::Error> {
	let mut builder = hyper::Response::builder().status(response.status);
	if let Some(headers) = builder.headers_mut() {
		headers.extend(response.headers);
	}
	builder.body(Full::new(response.body))
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %err, "failed to listen for SIGINT");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {}
		_ = terminate => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ApiResult;
	use async_trait::async_trait;
	use rstest::rstest;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::sync::oneshot;

	struct Hello;

	#[async_trait]
	impl Handler for Hello {
		async fn handle(&self, request: Request) -> ApiResult<Response> {
			Ok(Response::ok().with_body(format!("{} bytes", request.body.len())))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_and_shuts_down() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let (stop, stopped) = oneshot::channel::<()>();

		let server = tokio::spawn(HttpServer::new(Arc::new(Hello)).serve(listener, async move {
			let _ = stopped.await;
		}));

		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream
			.write_all(b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc")
			.await
			.unwrap();
		let mut raw = String::new();
		stream.read_to_string(&mut raw).await.unwrap();

		assert!(raw.starts_with("HTTP/1.1 200 OK"));
		assert!(raw.ends_with("3 bytes"));

		stop.send(()).unwrap();
		server.await.unwrap().unwrap();
	}

	#[rstest]
	#[case(8, 200)]
	#[case(7, 400)]
	#[tokio::test]
	async fn test_body_limit(#[case] limit: usize, #[case] status: u16) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let (stop, stopped) = oneshot::channel::<()>();

		let server = HttpServer::new(Arc::new(Hello)).with_body_limit(limit);
		let server = tokio::spawn(server.serve(listener, async move {
			let _ = stopped.await;
		}));

		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream
			.write_all(b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 8\r\nConnection: close\r\n\r\nabcdefgh")
			.await
			.unwrap();
		let mut raw = String::new();
		stream.read_to_string(&mut raw).await.unwrap();

		assert!(raw.starts_with(&format!("HTTP/1.1 {status}")));
		if status == 400 {
			assert!(raw.ends_with(r#"{"error":{"code":400,"message":"invalid form data"}}"#));
		} else {
			assert!(raw.ends_with("8 bytes"));
		}

		stop.send(()).unwrap();
		server.await.unwrap().unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_finished_connections_are_reaped() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let (stop, stopped) = oneshot::channel::<()>();

		let server = tokio::spawn(HttpServer::new(Arc::new(Hello)).serve(listener, async move {
			let _ = stopped.await;
		}));

		for _ in 0..20 {
			let mut stream = TcpStream::connect(addr).await.unwrap();
			stream
				.write_all(b"GET / HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
				.await
				.unwrap();
			let mut raw = String::new();
			stream.read_to_string(&mut raw).await.unwrap();
			assert!(raw.ends_with("0 bytes"));
		}

		stop.send(()).unwrap();
		tokio::time::timeout(Duration::from_secs(1), server)
			.await
			.unwrap()
			.unwrap()
			.unwrap();
	}
}
