//! Injected logging dependency for the lifecycle wrappers.
//!
//! Each [`GrpcServer`](crate::server::GrpcServer) and
//! [`GrpcClient`](crate::client::GrpcClient) owns a [`Logger`]: a
//! `tracing` dispatcher plus a component span carrying the service name.
//! Everything the wrapper logs, including events from the spawned serve task,
//! goes through that dispatcher, whether or not a process-wide default has
//! been installed.

use std::future::Future;

use tracing::instrument::{Instrument, WithSubscriber};
use tracing::{Dispatch, Span};

#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
    span: Span,
}

impl Logger {
    /// Logger for a server handle.
    pub fn for_server(dispatch: Option<Dispatch>, service: &str, address: &str) -> Self {
        let dispatch = dispatch.unwrap_or_else(current_dispatch);
        let span = tracing::dispatcher::with_default(&dispatch, || {
            tracing::info_span!("grpc_server", service = %service, address = %address)
        });
        Self { dispatch, span }
    }

    /// Logger for a client handle.
    pub fn for_client(dispatch: Option<Dispatch>, service: &str, target: &str) -> Self {
        let dispatch = dispatch.unwrap_or_else(current_dispatch);
        let span = tracing::dispatcher::with_default(&dispatch, || {
            tracing::info_span!("grpc_client", service = %service, endpoint = %target)
        });
        Self { dispatch, span }
    }

    /// Run `f` with this logger's dispatcher and span active.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, || self.span.in_scope(f))
    }

    /// Attach this logger to a future, including across `tokio::spawn`.
    pub fn attach<F: Future>(&self, fut: F) -> impl Future<Output = F::Output> + use<F> {
        fut.instrument(self.span.clone())
            .with_subscriber(self.dispatch.clone())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

fn current_dispatch() -> Dispatch {
    tracing::dispatcher::get_default(Dispatch::clone)
}
