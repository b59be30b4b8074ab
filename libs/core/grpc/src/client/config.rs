//! Client configuration.

use std::time::Duration;

use core_config::{env_flag, env_or_default, env_parse, env_required, ConfigError, FromEnv};
use tonic::service::Interceptor;
use tracing::Dispatch;

use crate::channel::{ChannelConfig, KeepaliveConfig};
use crate::interceptors::InterceptorChain;

/// Everything a [`GrpcClient`](super::GrpcClient) is built from.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote service name, used in log fields and error messages
    pub service_name: String,
    /// Target URI, e.g. `http://users:50051`
    pub target: String,
    /// Applied to every outgoing call, in order
    pub interceptors: InterceptorChain,
    /// Keepalive and transport tuning
    pub channel: ChannelConfig,
    /// Logging dependency; the dispatcher current at construction when `None`
    pub dispatch: Option<Dispatch>,
}

impl ClientConfig {
    pub fn new(service_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            target: target.into(),
            interceptors: InterceptorChain::new(),
            channel: ChannelConfig::default(),
            dispatch: None,
        }
    }

    /// Dial a mesh service by its DNS name, e.g. `for_service("users", 50051)`
    /// targets `http://users:50051`.
    pub fn for_service(service_name: impl Into<String>, port: u16) -> Self {
        let service_name = service_name.into();
        let target = format!("http://{service_name}:{port}");
        Self::new(service_name, target)
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

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_keepalive(mut self, keepalive: KeepaliveConfig) -> Self {
        self.channel.keepalive = Some(keepalive);
        self
    }

    pub fn without_keepalive(mut self) -> Self {
        self.channel.keepalive = None;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

impl FromEnv for ClientConfig {
    /// Reads:
    /// - `GRPC_TARGET` (required)
    /// - `GRPC_SERVICE_NAME` (default: the target)
    /// - `GRPC_CONNECT_TIMEOUT_MS` (default: 5000)
    /// - `GRPC_KEEPALIVE` (default: true)
    fn from_env() -> Result<Self, ConfigError> {
        let target = env_required("GRPC_TARGET")?;
        let service_name = env_or_default("GRPC_SERVICE_NAME", &target);

        let mut channel = ChannelConfig::default();
        if let Some(ms) = env_parse::<u64>("GRPC_CONNECT_TIMEOUT_MS")? {
            channel = channel.with_connect_timeout(Duration::from_millis(ms));
        }
        if !env_flag("GRPC_KEEPALIVE", true) {
            channel = channel.without_keepalive();
        }

        Ok(Self::new(service_name, target).with_channel(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptors::RequestIdInterceptor;

    #[test]
    fn test_for_service_target() {
        let config = ClientConfig::for_service("users", 50051);
        assert_eq!(config.service_name, "users");
        assert_eq!(config.target, "http://users:50051");
        assert!(config.interceptors.is_empty());
        assert_eq!(config.channel.keepalive, Some(KeepaliveConfig::default()));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new("orders", "http://127.0.0.1:9000")
            .with_interceptor(RequestIdInterceptor::new())
            .with_interceptor(RequestIdInterceptor::new())
            .without_keepalive();

        assert_eq!(config.interceptors.len(), 2);
        assert_eq!(config.channel.keepalive, None);
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("GRPC_TARGET", Some("http://ratings:9080")),
                ("GRPC_SERVICE_NAME", None),
                ("GRPC_CONNECT_TIMEOUT_MS", Some("250")),
                ("GRPC_KEEPALIVE", Some("false")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.target, "http://ratings:9080");
                assert_eq!(config.service_name, "http://ratings:9080");
                assert_eq!(config.channel.connect_timeout, Duration::from_millis(250));
                assert_eq!(config.channel.keepalive, None);
            },
        );
    }

    #[test]
    fn test_from_env_requires_target() {
        temp_env::with_var_unset("GRPC_TARGET", || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "GRPC_TARGET"));
        });
    }
}
