use std::time::Duration;
use tonic::transport::Endpoint;

/// HTTP/2 keepalive ping parameters for a client channel
///
/// Defaults match what mesh services have historically dialed with: a ping
/// every 10s, 100ms to answer it, and pings even while no call is active so
/// idle connections through the sidecar are not silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepaliveConfig {
  /// Interval between keepalive pings
  pub interval: Duration,
  /// How long to wait for a ping acknowledgement before closing the connection
  pub timeout: Duration,
  /// Keep pinging while there are no active streams
  pub permit_without_stream: bool,
}

impl Default for KeepaliveConfig {
  fn default() -> Self {
    Self {
      interval: Duration::from_secs(10),
      timeout: Duration::from_millis(100),
      permit_without_stream: true,
    }
  }
}

impl KeepaliveConfig {
  pub fn new(interval: Duration, timeout: Duration, permit_without_stream: bool) -> Self {
    Self {
      interval,
      timeout,
      permit_without_stream,
    }
  }
}

/// Transport tuning for a client channel
///
/// Provides builder pattern for customizing keepalive, timeouts, HTTP/2 and
/// TCP settings.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
  // HTTP/2 Keep-Alive, `None` disables pings
  pub keepalive: Option<KeepaliveConfig>,

  // Connection settings
  pub connect_timeout: Duration,
  pub timeout: Option<Duration>,

  // Window sizes (HTTP/2 flow control)
  pub initial_connection_window_size: Option<u32>,
  pub initial_stream_window_size: Option<u32>,
  pub http2_adaptive_window: bool,

  // TCP settings
  pub tcp_nodelay: bool,
  pub tcp_keepalive: Option<Duration>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      keepalive: Some(KeepaliveConfig::default()),
      connect_timeout: Duration::from_secs(5),
      timeout: None,
      initial_connection_window_size: Some(1024 * 1024), // 1MB
      initial_stream_window_size: Some(1024 * 1024),     // 1MB
      http2_adaptive_window: true,
      tcp_nodelay: true,
      tcp_keepalive: Some(Duration::from_secs(30)),
    }
  }
}

impl ChannelConfig {
  /// Create a new configuration with defaults
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the keepalive ping parameters
  ///
  /// # Example
  /// ```ignore
  /// let config = ChannelConfig::new()
  ///     .with_keepalive(KeepaliveConfig::new(Duration::from_secs(30), Duration::from_secs(5), false));
  /// ```
  pub fn with_keepalive(mut self, keepalive: KeepaliveConfig) -> Self {
    self.keepalive = Some(keepalive);
    self
  }

  /// Disable HTTP/2 keepalive pings
  pub fn without_keepalive(mut self) -> Self {
    self.keepalive = None;
    self
  }

  /// Set the connection timeout
  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Set a deadline applied to every RPC on the channel
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  /// Set both connection and stream window sizes to the same value
  pub fn with_window_size(mut self, size: u32) -> Self {
    self.initial_connection_window_size = Some(size);
    self.initial_stream_window_size = Some(size);
    self
  }

  /// Apply this configuration to a tonic Endpoint
  pub(crate) fn apply_to_endpoint(&self, mut endpoint: Endpoint) -> Endpoint {
    if let Some(keepalive) = &self.keepalive {
      endpoint = endpoint
        .http2_keep_alive_interval(keepalive.interval)
        .keep_alive_timeout(keepalive.timeout)
        .keep_alive_while_idle(keepalive.permit_without_stream);
    }

    endpoint = endpoint.connect_timeout(self.connect_timeout);
    if let Some(timeout) = self.timeout {
      endpoint = endpoint.timeout(timeout);
    }

    if let Some(size) = self.initial_connection_window_size {
      endpoint = endpoint.initial_connection_window_size(size);
    }
    if let Some(size) = self.initial_stream_window_size {
      endpoint = endpoint.initial_stream_window_size(size);
    }
    endpoint = endpoint.http2_adaptive_window(self.http2_adaptive_window);

    endpoint
      .tcp_nodelay(self.tcp_nodelay)
      .tcp_keepalive(self.tcp_keepalive)
  }
}
