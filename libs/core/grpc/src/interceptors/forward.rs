use http::HeaderMap;
use tonic::metadata::MetadataMap;
use tonic::{Request, Status};

use crate::propagation::{forward_metadata, TRACING_HEADERS};

/// Stamps the tracing headers of one inbound request onto outbound gRPC calls
///
/// Build one per inbound request and put it in front of the client chain
/// used for the downstream calls that request triggers. Keys are copied with
/// [`forward_headers`](crate::propagation::forward_headers) semantics, so all
/// seven are always present; values the caller already set explicitly on the
/// outbound request win.
///
/// # Example
/// ```ignore
/// use grpc_mesh::interceptors::ForwardTracingHeaders;
///
/// let forward = ForwardTracingHeaders::from_headers(&inbound.headers());
/// let conn = tonic::service::interceptor::InterceptedService::new(channel, forward);
/// ```
#[derive(Clone, Debug)]
pub struct ForwardTracingHeaders {
    metadata: MetadataMap,
}

impl ForwardTracingHeaders {
    pub fn from_headers(incoming: &HeaderMap) -> Self {
        Self {
            metadata: forward_metadata(incoming),
        }
    }

    /// From the metadata of an inbound gRPC call, for gRPC-to-gRPC hops.
    pub fn from_metadata(incoming: &MetadataMap) -> Self {
        Self::from_headers(&incoming.clone().into_headers())
    }
}

impl tonic::service::Interceptor for ForwardTracingHeaders {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        for key in TRACING_HEADERS {
            if request.metadata().contains_key(key) {
                continue;
            }
            if let Some(value) = self.metadata.get(key) {
                request.metadata_mut().insert(key, value.clone());
            }
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::{B3_SPAN_ID, B3_TRACE_ID, REQUEST_ID};
    use http::HeaderValue;
    use tonic::service::Interceptor;

    #[test]
    fn test_stamps_all_seven_keys() {
        let mut inbound = HeaderMap::new();
        inbound.insert(B3_TRACE_ID, HeaderValue::from_static("abc123"));
        inbound.insert("cookie", HeaderValue::from_static("session=1"));

        let mut forward = ForwardTracingHeaders::from_headers(&inbound);
        let req = forward.call(Request::new(())).unwrap();

        assert_eq!(req.metadata().len(), TRACING_HEADERS.len());
        assert_eq!(req.metadata().get(B3_TRACE_ID).unwrap(), "abc123");
        assert_eq!(req.metadata().get(B3_SPAN_ID).unwrap(), "");
        assert!(req.metadata().get("cookie").is_none());
    }

    #[test]
    fn test_explicit_outbound_value_wins() {
        let mut inbound = HeaderMap::new();
        inbound.insert(REQUEST_ID, HeaderValue::from_static("inbound"));

        let mut forward = ForwardTracingHeaders::from_headers(&inbound);
        let mut req = Request::new(());
        req.metadata_mut()
            .insert(REQUEST_ID, "explicit".parse().unwrap());

        let req = forward.call(req).unwrap();
        assert_eq!(req.metadata().get(REQUEST_ID).unwrap(), "explicit");
    }

    #[test]
    fn test_from_grpc_metadata() {
        let mut inbound = MetadataMap::new();
        inbound.insert(B3_TRACE_ID, "grpc-trace".parse().unwrap());
        inbound.insert("authorization", "Bearer x".parse().unwrap());

        let mut forward = ForwardTracingHeaders::from_metadata(&inbound);
        let req = forward.call(Request::new(())).unwrap();
        assert_eq!(req.metadata().get(B3_TRACE_ID).unwrap(), "grpc-trace");
        assert!(req.metadata().get("authorization").is_none());
    }
}
