use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors surfaced by the server and client lifecycle wrappers
///
/// Every variant is logged by the component that produces it before being
/// returned, so callers may treat them as fatal or ignore them.
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI: {0}")]
  InvalidUri(#[source] tonic::transport::Error),

  /// Failed to establish connection (eager dial only)
  #[error("Connection failed: {0}")]
  ConnectionFailed(#[source] tonic::transport::Error),

  /// The listener could not be bound
  #[error("Failed to listen on {address}: {source}")]
  Bind {
    address: String,
    #[source]
    source: std::io::Error,
  },

  /// The reflection service could not be built from the registered descriptors
  #[error("Reflection registration failed: {0}")]
  Reflection(#[from] tonic_reflection::server::Error),

  /// The serve loop exited with a transport error after binding
  #[error("Server failed to serve: {0}")]
  Serve(#[source] tonic::transport::Error),

  /// The serve task panicked or was aborted
  #[error("Server task failed: {0}")]
  ServeTaskFailed(#[from] tokio::task::JoinError),

  /// `start` was called on a handle that is already listening
  #[error("{0} grpc server is already listening")]
  AlreadyListening(String),

  /// `start` was called on a handle that has been stopped
  #[error("{0} grpc server has been stopped")]
  ServerStopped(String),

  /// The client connection was released with `close`
  #[error("{0} grpc client connection is closed")]
  ConnectionClosed(String),

  /// Invalid configuration
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),
}

impl From<core_config::ConfigError> for GrpcError {
  fn from(err: core_config::ConfigError) -> Self {
    GrpcError::InvalidConfig(err.to_string())
  }
}

// Implement conversion to tonic::Status so handlers can bubble these up with `?`
impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri(_) | GrpcError::InvalidConfig(_) => {
        tonic::Status::invalid_argument(err.to_string())
      }
      GrpcError::AlreadyListening(_)
      | GrpcError::ServerStopped(_)
      | GrpcError::ConnectionClosed(_) => tonic::Status::failed_precondition(err.to_string()),
      GrpcError::Reflection(_) | GrpcError::ServeTaskFailed(_) => {
        tonic::Status::internal(err.to_string())
      }
      GrpcError::ConnectionFailed(_) | GrpcError::Bind { .. } | GrpcError::Serve(_) => {
        tonic::Status::unavailable(err.to_string())
      }
    }
  }
}
