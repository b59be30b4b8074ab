//! Server configuration, loadable from environment variables.

use std::time::Duration;

use core_config::{env_flag, env_or_default, env_parse, ConfigError, FromEnv};
use tonic::service::Interceptor;
use tracing::Dispatch;

use crate::interceptors::InterceptorChain;

/// Configuration for a [`GrpcServer`](super::GrpcServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Service name, used in log fields and as the health-check service key
    pub service_name: String,
    /// `host:port` to bind; port 0 picks a free port
    pub address: String,
    /// Applied to every incoming call, in order
    pub interceptors: InterceptorChain,
    /// Register `grpc.reflection.v1` / `v1alpha` (default: true)
    pub reflection: bool,
    /// Encoded `FileDescriptorSet`s exposed through reflection
    pub file_descriptor_sets: Vec<&'static [u8]>,
    /// Register `grpc.health.v1.Health` (default: true)
    pub health: bool,
    /// HTTP/2 keepalive ping interval (default: 60s)
    pub http2_keepalive_interval: Option<Duration>,
    /// How long to wait for a keepalive ack before closing the connection
    /// (default: tonic's 20s)
    pub http2_keepalive_timeout: Option<Duration>,
    /// Per-request timeout enforced by the server (default: none)
    pub timeout: Option<Duration>,
    /// Logging dependency; the dispatcher current at construction when `None`
    pub dispatch: Option<Dispatch>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: "grpc".to_string(),
            address: "[::1]:50051".to_string(),
            interceptors: InterceptorChain::new(),
            reflection: true,
            file_descriptor_sets: Vec::new(),
            health: true,
            http2_keepalive_interval: Some(Duration::from_secs(60)),
            http2_keepalive_timeout: None,
            timeout: None,
            dispatch: None,
        }
    }
}

impl ServerConfig {
    pub fn new(service_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Replace the interceptor chain.
    pub fn with_interceptors(mut self, interceptors: InterceptorChain) -> Self {
        self.interceptors = interceptors;
        self
    }

    /// Append one interceptor to the chain.
    pub fn with_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: Interceptor + Clone + Send + Sync + 'static,
    {
        self.interceptors = self.interceptors.with(interceptor);
        self
    }

    /// Enable or disable the reflection service.
    pub fn with_reflection(mut self, enable: bool) -> Self {
        self.reflection = enable;
        self
    }

    /// Expose a compiled descriptor set (from `tonic_prost_build`'s
    /// `file_descriptor_set_path`) through reflection.
    pub fn with_file_descriptor_set(mut self, encoded: &'static [u8]) -> Self {
        self.file_descriptor_sets.push(encoded);
        self
    }

    /// Enable or disable the health service.
    pub fn with_health(mut self, enable: bool) -> Self {
        self.health = enable;
        self
    }

    pub fn with_keepalive_interval(mut self, interval: Option<Duration>) -> Self {
        self.http2_keepalive_interval = interval;
        self
    }

    pub fn with_keepalive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http2_keepalive_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

impl FromEnv for ServerConfig {
    /// Reads:
    /// - `GRPC_SERVICE_NAME` (default: grpc)
    /// - `GRPC_HOST` (default: [::1])
    /// - `GRPC_PORT` (default: 50051)
    /// - `GRPC_REFLECTION` (default: true)
    /// - `GRPC_HEALTH` (default: true)
    fn from_env() -> Result<Self, ConfigError> {
        let service_name = env_or_default("GRPC_SERVICE_NAME", "grpc");
        let host = env_or_default("GRPC_HOST", "[::1]");
        let port: u16 = env_parse("GRPC_PORT")?.unwrap_or(50051);

        Ok(Self::new(service_name, format!("{host}:{port}"))
            .with_reflection(env_flag("GRPC_REFLECTION", true))
            .with_health(env_flag("GRPC_HEALTH", true)))
    }
}
