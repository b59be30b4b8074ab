//! Mesh sidecar - Entry Point
//!
//! Minimal entry point that delegates to the library.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    mesh_sidecar::run().await
}
