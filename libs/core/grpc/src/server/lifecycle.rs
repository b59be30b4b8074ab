//! Start/stop lifecycle for a tonic server.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::{InterceptorLayer, Routes, RoutesBuilder};
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;
use tracing::{debug, error, info, warn};

use super::config::ServerConfig;
use crate::error::{GrpcError, GrpcResult};
use crate::interceptors::InterceptorChain;
use crate::logging::Logger;

enum State {
    Constructed,
    Listening(Running),
    Stopped,
}

struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<GrpcResult<()>>,
    health: Option<HealthReporter>,
}

/// Owns a tonic server and the address it listens on
///
/// `Constructed -> Listening -> Stopped`. A failed [`start`](Self::start)
/// leaves the handle `Constructed`, so it can be retried; `Stopped` is final.
/// Dropping a listening handle signals the serve task to shut down.
///
/// # Example
///
/// ```ignore
/// use grpc_mesh::server::{GrpcServer, ServerConfig};
/// use rpc::users::users_service_server::UsersServiceServer;
///
/// let mut server = GrpcServer::new(ServerConfig::new("users", "0.0.0.0:50051"));
/// server.routes_mut().add_service(UsersServiceServer::new(users));
///
/// let addr = server.start().await?;
/// // ... wait for a shutdown signal ...
/// server.stop().await?;
/// ```
pub struct GrpcServer {
    service_name: String,
    address: String,
    interceptors: InterceptorChain,
    reflection: bool,
    file_descriptor_sets: Vec<&'static [u8]>,
    health: bool,
    http2_keepalive_interval: Option<Duration>,
    http2_keepalive_timeout: Option<Duration>,
    timeout: Option<Duration>,
    routes: RoutesBuilder,
    state: Mutex<State>,
    logger: Logger,
}

/// Everything the serve loop needs, detached from the handle so it can be
/// moved into a spawned task.
struct ServeParts {
    routes: Routes,
    interceptors: InterceptorChain,
    http2_keepalive_interval: Option<Duration>,
    http2_keepalive_timeout: Option<Duration>,
    timeout: Option<Duration>,
}

impl ServeParts {
    async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        let mut builder = Server::builder()
            .http2_keepalive_interval(self.http2_keepalive_interval)
            .http2_keepalive_timeout(self.http2_keepalive_timeout);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .layer(InterceptorLayer::new(self.interceptors))
            .add_routes(self.routes)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
    }
}

impl GrpcServer {
    /// Build the handle. Nothing is bound until [`start`](Self::start).
    pub fn new(config: ServerConfig) -> Self {
        let logger = Logger::for_server(config.dispatch, &config.service_name, &config.address);
        logger.in_scope(|| {
            debug!(
                interceptors = config.interceptors.len(),
                reflection = config.reflection,
                health = config.health,
                "gRPC server created"
            )
        });

        Self {
            service_name: config.service_name,
            address: config.address,
            interceptors: config.interceptors,
            reflection: config.reflection,
            file_descriptor_sets: config.file_descriptor_sets,
            health: config.health,
            http2_keepalive_interval: config.http2_keepalive_interval,
            http2_keepalive_timeout: config.http2_keepalive_timeout,
            timeout: config.timeout,
            routes: RoutesBuilder::default(),
            state: Mutex::new(State::Constructed),
            logger,
        }
    }

    /// Registration point for service implementations.
    ///
    /// Services added after `start` are picked up by the next handle only;
    /// register everything first.
    pub fn routes_mut(&mut self) -> &mut RoutesBuilder {
        &mut self.routes
    }

    /// Bind the listener and serve in a background task.
    ///
    /// Returns the bound address (useful with port 0) once the listener is
    /// up; the serve loop keeps running after this returns. Concurrent calls
    /// are serialized: exactly one binds, the others get
    /// [`GrpcError::AlreadyListening`].
    pub async fn start(&self) -> GrpcResult<SocketAddr> {
        self.logger.attach(self.start_inner()).await
    }

    async fn start_inner(&self) -> GrpcResult<SocketAddr> {
        let mut state = self.state.lock().await;
        match &*state {
            State::Constructed => {}
            State::Listening(_) => {
                warn!("{} grpc server is already listening", self.service_name);
                return Err(GrpcError::AlreadyListening(self.service_name.clone()));
            }
            State::Stopped => {
                warn!("{} grpc server has been stopped", self.service_name);
                return Err(GrpcError::ServerStopped(self.service_name.clone()));
            }
        }

        let listener = self.bind().await?;
        let local_addr = listener.local_addr().map_err(|source| self.bind_error(source))?;
        let (parts, health) = self.prepare().await?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let service_name = self.service_name.clone();
        let task = tokio::spawn(self.logger.attach(async move {
            let result = parts
                .serve(listener, async {
                    // Fires on `stop` and when the handle is dropped
                    let _ = signal.await;
                })
                .await;
            if let Err(e) = &result {
                error!(error = %e, "{service_name} grpc server failed to serve");
            }
            result.map_err(GrpcError::Serve)
        }));

        info!(%local_addr, "gRPC server listening");
        *state = State::Listening(Running {
            local_addr,
            shutdown,
            task,
            health,
        });
        Ok(local_addr)
    }

    /// Gracefully shut the server down and wait for the serve task to end.
    ///
    /// Stopping a handle that is not listening logs a warning and returns
    /// `Ok(())`. A serve loop that had already died with a transport error
    /// reports it here.
    pub async fn stop(&self) -> GrpcResult<()> {
        self.logger.attach(self.stop_inner()).await
    }

    async fn stop_inner(&self) -> GrpcResult<()> {
        let mut state = self.state.lock().await;
        let running = match std::mem::replace(&mut *state, State::Stopped) {
            State::Listening(running) => running,
            other => {
                *state = other;
                warn!("stop {} grpc server is nil", self.service_name);
                return Ok(());
            }
        };

        if let Some(mut reporter) = running.health {
            self.mark(&mut reporter, ServingStatus::NotServing).await;
        }

        // The task may already have exited on a serve error; a closed
        // receiver is fine then.
        let _ = running.shutdown.send(());
        let result = running.task.await.map_err(|e| {
            error!(error = %e, "{} grpc server task failed", self.service_name);
            GrpcError::from(e)
        })?;

        info!(local_addr = %running.local_addr, "gRPC server stopped");
        result
    }

    /// Serve in the caller's task until `shutdown` resolves.
    ///
    /// The blocking counterpart of `start` + `stop`, for binaries whose main
    /// task has nothing else to do.
    pub async fn run<F>(self, shutdown: F) -> GrpcResult<()>
    where
        F: Future<Output = ()>,
    {
        let logger = self.logger.clone();
        logger
            .attach(async move {
                let listener = self.bind().await?;
                let local_addr = listener.local_addr().map_err(|source| self.bind_error(source))?;
                let (parts, _health) = self.prepare().await?;

                info!(%local_addr, "gRPC server listening");
                parts.serve(listener, shutdown).await.map_err(|e| {
                    error!(error = %e, "{} grpc server failed to serve", self.service_name);
                    GrpcError::Serve(e)
                })?;
                info!(%local_addr, "gRPC server stopped");
                Ok(())
            })
            .await
    }

    async fn bind(&self) -> GrpcResult<TcpListener> {
        TcpListener::bind(self.address.as_str())
            .await
            .map_err(|source| self.bind_error(source))
    }

    fn bind_error(&self, source: std::io::Error) -> GrpcError {
        error!(error = %source, "{} grpc server failed to listen", self.service_name);
        GrpcError::Bind {
            address: self.address.clone(),
            source,
        }
    }

    /// Assemble the routes with reflection and health registered.
    async fn prepare(&self) -> GrpcResult<(ServeParts, Option<HealthReporter>)> {
        let mut routes = self.routes.clone();

        if self.reflection {
            let builder = || {
                self.file_descriptor_sets.iter().copied().fold(
                    tonic_reflection::server::Builder::configure(),
                    |builder, fds| builder.register_encoded_file_descriptor_set(fds),
                )
            };
            let v1 = builder().build_v1().inspect_err(|e| {
                error!(error = %e, "{} grpc reflection registration failed", self.service_name)
            })?;
            let v1alpha = builder().build_v1alpha().inspect_err(|e| {
                error!(error = %e, "{} grpc reflection registration failed", self.service_name)
            })?;
            routes.add_service(v1).add_service(v1alpha);
            debug!("Reflection service enabled (grpc.reflection.v1)");
        }

        let health = if self.health {
            let (mut reporter, service) = tonic_health::server::health_reporter();
            self.mark(&mut reporter, ServingStatus::Serving).await;
            routes.add_service(service);
            debug!("Health check service enabled (grpc.health.v1.Health)");
            Some(reporter)
        } else {
            None
        };

        let parts = ServeParts {
            routes: routes.routes(),
            interceptors: self.interceptors.clone(),
            http2_keepalive_interval: self.http2_keepalive_interval,
            http2_keepalive_timeout: self.http2_keepalive_timeout,
            timeout: self.timeout,
        };
        Ok((parts, health))
    }

    /// Set the health status of this service and of the empty service name
    /// (the one k8s gRPC probes ask for by default).
    async fn mark(&self, reporter: &mut HealthReporter, status: ServingStatus) {
        reporter
            .set_service_status(self.service_name.as_str(), status)
            .await;
        reporter.set_service_status("", status).await;
        debug!(?status, "Health status updated");
    }

    /// The address whose port a `start` call actually bound, while listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.state.lock().await {
            State::Listening(running) => Some(running.local_addr),
            _ => None,
        }
    }

    /// Whether the handle is in the `Listening` state.
    ///
    /// This tracks the handle, not the serve loop: a loop that died with a
    /// transport error after binding leaves the handle `Listening` (and
    /// `start` rejected with `AlreadyListening`) until [`stop`](Self::stop)
    /// collects the error.
    pub async fn is_listening(&self) -> bool {
        matches!(&*self.state.lock().await, State::Listening(_))
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The configured bind address.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Debug for GrpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcServer")
            .field("service_name", &self.service_name)
            .field("address", &self.address)
            .field("interceptors", &self.interceptors)
            .field("reflection", &self.reflection)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}
