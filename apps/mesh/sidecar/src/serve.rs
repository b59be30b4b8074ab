//! Placeholder server: health and reflection only.

use core_config::FromEnv;
use eyre::{Result, WrapErr};
use grpc_mesh::{GrpcServer, RequestIdInterceptor, ServerConfig};
use tracing::{Dispatch, info};

use crate::cli::ServeArgs;

/// Environment-derived config with the command line layered on top.
pub fn server_config(args: &ServeArgs) -> Result<ServerConfig> {
    let mut config = ServerConfig::from_env().wrap_err("Failed to load gRPC server configuration")?;
    if let Some(addr) = &args.addr {
        config.address = addr.clone();
    }
    if let Some(name) = &args.name {
        config.service_name = name.clone();
    }
    if args.no_reflection {
        config.reflection = false;
    }
    Ok(config.with_interceptor(RequestIdInterceptor::new()))
}

pub async fn run(args: ServeArgs, dispatch: Dispatch) -> Result<()> {
    let config = server_config(&args)?.with_dispatch(dispatch);
    let server = GrpcServer::new(config);

    let addr = server.start().await.wrap_err("Failed to start gRPC server")?;
    info!("{} listening on {}", server.service_name(), addr);

    tokio::signal::ctrl_c()
        .await
        .wrap_err("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    server.stop().await.wrap_err("gRPC server failed")?;
    Ok(())
}
