pub mod config;

pub use config::{ChannelConfig, KeepaliveConfig};

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Parse `target` and apply `config` to it
pub fn endpoint(target: &str, config: &ChannelConfig) -> GrpcResult<Endpoint> {
  let endpoint = Endpoint::from_shared(target.to_string()).map_err(|e| {
    tracing::error!(target: "grpc_mesh", %target, error = ?e, "Invalid URI");
    GrpcError::InvalidUri(e)
  })?;

  Ok(config.apply_to_endpoint(endpoint))
}

/// Creates a lazy gRPC channel that connects on first request
///
/// Returns without touching the network, so an unreachable target is only
/// reported when the first RPC fails with `Unavailable`. tonic reconnects on
/// its own after the connection drops.
///
/// ## Example
/// ```ignore
/// use grpc_mesh::channel::{create_channel_lazy, ChannelConfig};
///
/// let channel = create_channel_lazy("http://users:50051", &ChannelConfig::default())?;
/// ```
pub fn create_channel_lazy(target: &str, config: &ChannelConfig) -> GrpcResult<Channel> {
  let endpoint = endpoint(target, config)?;

  tracing::debug!(
    target: "grpc_mesh",
    %target,
    "Creating lazy gRPC channel (connects on first request)"
  );

  Ok(endpoint.connect_lazy())
}

/// Creates a gRPC channel and dials it before returning
pub async fn create_channel(target: &str, config: &ChannelConfig) -> GrpcResult<Channel> {
  let endpoint = endpoint(target, config)?;

  tracing::debug!(target: "grpc_mesh", %target, "Creating gRPC channel");

  endpoint.connect().await.map_err(|e| {
    tracing::error!(
      target: "grpc_mesh",
      %target,
      error = ?e,
      "Failed to connect to gRPC service"
    );
    GrpcError::ConnectionFailed(e)
  })
}
