//! `grpc.health.v1.Health/Check` probe.

use std::time::Duration;

use eyre::{Result, WrapErr, bail};
use grpc_mesh::{ChannelConfig, ClientConfig, GrpcClient, RequestIdInterceptor};
use tonic_health::pb::HealthCheckRequest;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tracing::{Dispatch, info};

use crate::cli::CheckArgs;

/// Ask `args.target` about `args.service` and return what it reports.
pub async fn probe(args: &CheckArgs, dispatch: Dispatch) -> Result<ServingStatus> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let config = ClientConfig::new("health-check", args.target.clone())
        .with_channel(ChannelConfig::new().with_connect_timeout(timeout))
        .with_interceptor(RequestIdInterceptor::new())
        .with_dispatch(dispatch);
    let mut client = GrpcClient::new(config).wrap_err("Invalid health check target")?;

    let mut health = HealthClient::new(client.connection()?);
    let request = HealthCheckRequest {
        service: args.service.clone(),
    };
    let reply = tokio::time::timeout(timeout, health.check(request))
        .await
        .wrap_err_with(|| format!("Health check timed out after {timeout:?}"))?
        .wrap_err_with(|| format!("Health check against {} failed", args.target))?;

    client.close();
    Ok(reply.into_inner().status())
}

pub async fn run(args: CheckArgs, dispatch: Dispatch) -> Result<()> {
    let status = probe(&args, dispatch).await?;
    info!(endpoint = %args.target, service = %args.service, ?status, "Health check answered");

    if status != ServingStatus::Serving {
        bail!("{} reports {:?}", args.target, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grpc_mesh::{GrpcServer, ServerConfig};

    fn check(target: String, service: &str) -> CheckArgs {
        CheckArgs {
            target,
            service: service.to_string(),
            timeout_ms: 500,
        }
    }

    #[tokio::test]
    async fn test_probe_live_server() {
        let server = GrpcServer::new(ServerConfig::new("ratings", "127.0.0.1:0"));
        let addr = server.start().await.unwrap();

        let args = check(format!("http://{addr}"), "ratings");
        let status = probe(&args, Dispatch::none()).await.unwrap();
        assert_eq!(status, ServingStatus::Serving);
        run(args, Dispatch::none()).await.unwrap();

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_unknown_service() {
        let server = GrpcServer::new(ServerConfig::new("ratings", "127.0.0.1:0"));
        let addr = server.start().await.unwrap();

        let err = probe(&check(format!("http://{addr}"), "reviews"), Dispatch::none())
            .await
            .unwrap_err();
        assert!(format!("{err:?}").contains("failed"), "{err:?}");

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_unreachable_target() {
        let args = check("http://127.0.0.1:1".to_string(), "");
        assert!(probe(&args, Dispatch::none()).await.is_err());
    }

    #[tokio::test]
    async fn test_probe_rejects_bad_target() {
        let err = probe(&check("not a uri".to_string(), ""), Dispatch::none())
            .await
            .unwrap_err();
        assert!(format!("{err}").contains("Invalid health check target"));
    }
}
