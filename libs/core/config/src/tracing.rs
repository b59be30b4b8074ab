use crate::Environment;
use tracing::{debug, info, Dispatch};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

fn default_filter(environment: &Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if environment.is_production() {
            EnvFilter::new("info,h2=warn,tower=warn")
        } else {
            EnvFilter::new("debug,h2=info,hyper_util=info,tower=info")
        }
    })
}

/// Build a logging dispatcher for `environment` without installing it.
///
/// The returned [`Dispatch`] can be handed to gRPC server and client configs
/// directly, so components log through an explicit dependency instead of
/// whatever happens to be the process default.
///
/// - **Production** (`APP_ENV=production`): JSON lines, no module targets.
/// - **Development** (default): pretty, human-readable output.
///
/// `RUST_LOG` overrides the level filter in both cases. Both variants carry
/// an `ErrorLayer` so `eyre` reports include span traces.
pub fn build_dispatch(environment: &Environment) -> Dispatch {
    let filter = default_filter(environment);

    if environment.is_production() {
        Dispatch::new(
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(false)
                        .flatten_event(true),
                )
                .with(tracing_error::ErrorLayer::default())
                .with(filter),
        )
    } else {
        Dispatch::new(
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_file(false)
                        .with_line_number(false)
                        .pretty(),
                )
                .with(tracing_error::ErrorLayer::default())
                .with(filter),
        )
    }
}

/// Build the environment-aware dispatcher and install it as the process
/// default.
///
/// Installation happens at most once per process; later calls (common in
/// tests) keep the first dispatcher and return it. The returned handle is
/// the one actually in effect.
pub fn init_tracing(environment: &Environment) -> Dispatch {
    let dispatch = build_dispatch(environment);

    match tracing::dispatcher::set_global_default(dispatch.clone()) {
        Ok(()) => {
            info!(?environment, "Tracing initialized with ErrorLayer");
            dispatch
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
            tracing::dispatcher::get_default(Dispatch::clone)
        }
    }
}
