//! gRPC server lifecycle wrapper.
//!
//! ## Background start / stop
//!
//! ```ignore
//! use grpc_mesh::interceptors::RequestIdInterceptor;
//! use grpc_mesh::server::{GrpcServer, ServerConfig};
//! use rpc::tasks::tasks_service_server::TasksServiceServer;
//!
//! let config = ServerConfig::new("tasks", "0.0.0.0:50051")
//!     .with_interceptor(RequestIdInterceptor::new())
//!     .with_file_descriptor_set(rpc::FILE_DESCRIPTOR_SET);
//!
//! let mut server = GrpcServer::new(config);
//! server.routes_mut().add_service(TasksServiceServer::new(my_impl));
//!
//! server.start().await?;
//! tokio::signal::ctrl_c().await?;
//! server.stop().await?;
//! ```
//!
//! ## Foreground
//!
//! ```ignore
//! use core_config::FromEnv;
//!
//! let server = GrpcServer::new(ServerConfig::from_env()?);
//! server.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```
//!
//! Health (`grpc.health.v1.Health`) and reflection (`grpc.reflection.v1`)
//! are registered on every start unless disabled in [`ServerConfig`]; the
//! interceptor chain runs in front of them too.

mod config;
mod lifecycle;

pub use config::ServerConfig;
pub use lifecycle::GrpcServer;
