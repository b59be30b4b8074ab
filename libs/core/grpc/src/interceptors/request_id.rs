use tonic::{Request, Status};

use crate::propagation::REQUEST_ID;

/// Ensures every call carries an `x-request-id`
///
/// An id already present (set by the mesh sidecar, or forwarded from the
/// inbound request) is kept; otherwise a UUID v4 is generated. Works on both
/// sides: on a client it stamps outgoing calls, on a server it fills in ids
/// for callers outside the mesh.
#[derive(Clone, Debug, Default)]
pub struct RequestIdInterceptor;

impl RequestIdInterceptor {
    /// Create a new request-id interceptor
    pub fn new() -> Self {
        Self
    }
}

impl tonic::service::Interceptor for RequestIdInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let existing = request
            .metadata()
            .get(REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        let request_id = match existing {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                request.metadata_mut().insert(
                    REQUEST_ID,
                    id.parse()
                        .map_err(|_| Status::internal("Failed to create request ID"))?,
                );
                id
            }
        };

        tracing::debug!(target: "grpc_mesh", request_id = %request_id, "gRPC request");

        Ok(request)
    }
}
