//! Mesh Sidecar
//!
//! A small companion binary for services in the mesh. It can stand up an
//! empty gRPC server that only answers health and reflection (useful as a
//! readiness placeholder) and probe the health of any gRPC target.
//!
//! ## Modules
//!
//! - `cli`: argument parsing
//! - `serve`: placeholder server lifecycle
//! - `check`: `grpc.health.v1` probe

pub mod check;
pub mod cli;
pub mod serve;

use clap::Parser;
use core_config::Environment;
use eyre::Result;

use crate::cli::{Args, Command};

/// Parse arguments, set up logging and dispatch to the subcommand.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let args = Args::parse();

    let environment = Environment::from_env();
    let dispatch = core_config::tracing::init_tracing(&environment);

    match args.command {
        Command::Serve(args) => serve::run(args, dispatch).await,
        Command::Check(args) => check::run(args, dispatch).await,
    }
}
