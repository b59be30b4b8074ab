//! gRPC client lifecycle wrapper.
//!
//! ```ignore
//! use grpc_mesh::client::{ClientConfig, GrpcClient};
//! use grpc_mesh::interceptors::RequestIdInterceptor;
//! use rpc::users::users_service_client::UsersServiceClient;
//!
//! let config = ClientConfig::for_service("users", 50051)
//!     .with_interceptor(RequestIdInterceptor::new());
//! let mut client = GrpcClient::new(config)?;
//!
//! let mut users = UsersServiceClient::new(client.connection()?);
//! let reply = users.get_by_id(request).await?;
//!
//! client.close();
//! ```

mod config;

pub use config::ClientConfig;

use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tracing::{debug, info, warn};

use crate::channel;
use crate::error::{GrpcError, GrpcResult};
use crate::interceptors::InterceptorChain;
use crate::logging::Logger;

/// A channel with the client's interceptor chain in front of it.
///
/// Cheap to clone; pass it to any tonic-generated client's `new`.
pub type Connection = InterceptedService<Channel, InterceptorChain>;

/// Owns the connection to one remote service
pub struct GrpcClient {
    service_name: String,
    target: String,
    interceptors: InterceptorChain,
    channel: Option<Channel>,
    logger: Logger,
}

impl GrpcClient {
    /// Build a client whose channel dials lazily.
    ///
    /// Only a malformed target fails here. An unreachable target is reported
    /// by the first call made through [`connection`](Self::connection), as
    /// `Unavailable`. Must be called inside a tokio runtime.
    pub fn new(config: ClientConfig) -> GrpcResult<Self> {
        let logger = Logger::for_client(config.dispatch, &config.service_name, &config.target);
        let channel = logger.in_scope(|| {
            channel::create_channel_lazy(&config.target, &config.channel).inspect_err(|e| {
                tracing::error!(error = %e, "{} grpc client dial error", config.service_name)
            })
        })?;

        logger.in_scope(|| {
            debug!(interceptors = config.interceptors.len(), "gRPC client created")
        });

        Ok(Self {
            service_name: config.service_name,
            target: config.target,
            interceptors: config.interceptors,
            channel: Some(channel),
            logger,
        })
    }

    /// Build a client and dial it before returning.
    ///
    /// Fails with [`GrpcError::ConnectionFailed`] when the target cannot be
    /// reached within the configured connect timeout.
    pub async fn connect(config: ClientConfig) -> GrpcResult<Self> {
        let logger = Logger::for_client(config.dispatch, &config.service_name, &config.target);
        let channel = logger
            .attach(async {
                let channel = channel::create_channel(&config.target, &config.channel).await?;
                info!("gRPC client connected");
                Ok::<_, GrpcError>(channel)
            })
            .await?;

        Ok(Self {
            service_name: config.service_name,
            target: config.target,
            interceptors: config.interceptors,
            channel: Some(channel),
            logger,
        })
    }

    /// The connection for issuing calls.
    ///
    /// Fails with [`GrpcError::ConnectionClosed`] after [`close`](Self::close).
    pub fn connection(&self) -> GrpcResult<Connection> {
        match &self.channel {
            Some(channel) => Ok(InterceptedService::new(
                channel.clone(),
                self.interceptors.clone(),
            )),
            None => Err(GrpcError::ConnectionClosed(self.service_name.clone())),
        }
    }

    /// Release the connection.
    ///
    /// Connections already handed out keep working until they are dropped;
    /// the underlying transport shuts down once the last one goes. Closing a
    /// closed client logs a warning and does nothing.
    pub fn close(&mut self) {
        match self.channel.take() {
            Some(channel) => {
                drop(channel);
                self.logger.in_scope(|| info!("gRPC client closed"));
            }
            None => self
                .logger
                .in_scope(|| warn!("close {} grpc client is nil", self.service_name)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_none()
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl std::fmt::Debug for GrpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcClient")
            .field("service_name", &self.service_name)
            .field("target", &self.target)
            .field("interceptors", &self.interceptors)
            .field("closed", &self.is_closed())
            .finish()
    }
}
