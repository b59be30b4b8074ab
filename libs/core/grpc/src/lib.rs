//! # gRPC Mesh Library
//!
//! Thin lifecycle wrappers around tonic for services running behind a
//! service-mesh sidecar, plus tracing-header propagation for the calls those
//! services make downstream.
//!
//! ## Features
//!
//! - **Server wrapper**: interceptor chain, keepalive, reflection and health
//!   registration; `start` / `stop` in the background or `run` in the
//!   foreground
//! - **Client wrapper**: lazily dialed channel with keepalive pings and an
//!   interceptor chain in front of it; `connection` / `close`
//! - **Interceptors**: ordered chains, request ids, trace-header forwarding
//! - **Propagation**: the fixed B3 / OpenTracing header set copied from an
//!   inbound HTTP request
//! - **Injected logging**: every handle logs through the `tracing::Dispatch`
//!   it was configured with
//!
//! ## Quick Start
//!
//! ### Server
//! ```ignore
//! use grpc_mesh::{GrpcServer, ServerConfig, RequestIdInterceptor};
//!
//! let mut server = GrpcServer::new(
//!     ServerConfig::new("tasks", "0.0.0.0:50051").with_interceptor(RequestIdInterceptor::new()),
//! );
//! server.routes_mut().add_service(TasksServiceServer::new(my_impl));
//! server.start().await?;
//! ```
//!
//! ### Client
//! ```ignore
//! use grpc_mesh::{ClientConfig, GrpcClient};
//!
//! let mut client = GrpcClient::new(ClientConfig::for_service("tasks", 50051))?;
//! let mut tasks = TasksServiceClient::new(client.connection()?);
//! ```
//!
//! ### Forwarding trace headers
//! ```ignore
//! use grpc_mesh::{ClientConfig, ForwardTracingHeaders};
//!
//! let config = ClientConfig::for_service("ratings", 9080)
//!     .with_interceptor(ForwardTracingHeaders::from_headers(&inbound_headers));
//! ```

pub mod channel;
pub mod client;
pub mod error;
pub mod interceptors;
pub mod logging;
pub mod propagation;
pub mod server;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, KeepaliveConfig, create_channel, create_channel_lazy};
pub use client::{ClientConfig, Connection, GrpcClient};
pub use error::{GrpcError, GrpcResult};
pub use propagation::{TRACING_HEADERS, TraceContext, forward_headers, forward_metadata};
pub use server::{GrpcServer, ServerConfig};

// Re-export interceptors for convenience
pub use interceptors::{
    ForwardTracingHeaders, InterceptorChain, RequestIdInterceptor,
};
