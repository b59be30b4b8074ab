/// Re-export tonic's Interceptor trait for convenience
pub use tonic::service::Interceptor;

pub mod chain;
pub mod forward;
pub mod request_id;

pub use chain::InterceptorChain;
pub use forward::ForwardTracingHeaders;
pub use request_id::RequestIdInterceptor;
