//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use grpc_mesh::{ClientConfig, GrpcClient, GrpcServer, ServerConfig};
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;
use tracing::Dispatch;

/// Start a server on an ephemeral localhost port.
pub async fn start_server(config: ServerConfig) -> (GrpcServer, SocketAddr) {
    let server = GrpcServer::new(config);
    let addr = server.start().await.expect("server should start");
    (server, addr)
}

pub fn local_config(name: &str) -> ServerConfig {
    ServerConfig::new(name, "127.0.0.1:0")
}

pub fn client_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("test-client", format!("http://{addr}"))
}

/// Run a `grpc.health.v1.Health/Check` through the client's connection.
pub async fn check_health(client: &GrpcClient, service: &str) -> Result<ServingStatus, tonic::Status> {
    let mut health = HealthClient::new(client.connection()?);
    let response = health
        .check(HealthCheckRequest {
            service: service.to_string(),
        })
        .await?;
    Ok(response.into_inner().status())
}

/// A writer that keeps everything logged to it.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A dispatcher writing plain-text logs into a [`CapturedLogs`].
pub fn capturing_dispatch() -> (Dispatch, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (Dispatch::new(subscriber), logs)
}
