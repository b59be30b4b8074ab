//! Distributed-tracing header propagation for service meshes.
//!
//! A mesh sidecar (Envoy/Istio) starts a trace at the ingress but cannot tie
//! the outbound calls a service makes back to the inbound request; the
//! service has to copy the trace headers itself. [`forward_headers`] does
//! that copy for the fixed B3 / OpenTracing set in [`TRACING_HEADERS`].
//!
//! ```ignore
//! use grpc_mesh::propagation::forward_headers;
//!
//! async fn handler(headers: http::HeaderMap) {
//!     let outbound = forward_headers(&headers);
//!     // attach `outbound` to the downstream HTTP request
//! }
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};
use tonic::metadata::MetadataMap;

pub const REQUEST_ID: &str = "x-request-id";
pub const B3_TRACE_ID: &str = "x-b3-traceid";
pub const B3_SPAN_ID: &str = "x-b3-spanid";
pub const B3_PARENT_SPAN_ID: &str = "x-b3-parentspanid";
pub const B3_SAMPLED: &str = "x-b3-sampled";
pub const B3_FLAGS: &str = "x-b3-flags";
pub const OT_SPAN_CONTEXT: &str = "x-ot-span-context";

/// The header keys copied from an inbound request to downstream calls, in
/// propagation order.
pub const TRACING_HEADERS: [&str; 7] = [
    REQUEST_ID,
    B3_TRACE_ID,
    B3_SPAN_ID,
    B3_PARENT_SPAN_ID,
    B3_SAMPLED,
    B3_FLAGS,
    OT_SPAN_CONTEXT,
];

/// Build a fresh header map holding exactly the [`TRACING_HEADERS`].
///
/// Each key gets the first inbound value for it, copied verbatim, or an empty
/// value when the inbound request does not carry it. Absent and empty are not
/// distinguished. Nothing else is copied and nothing is validated.
pub fn forward_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut outgoing = HeaderMap::with_capacity(TRACING_HEADERS.len());
    for key in TRACING_HEADERS {
        let value = incoming
            .get(key)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        outgoing.insert(HeaderName::from_static(key), value);
    }
    outgoing
}

/// [`forward_headers`] as gRPC metadata, ready to merge into an outbound
/// `tonic::Request`.
pub fn forward_metadata(incoming: &HeaderMap) -> MetadataMap {
    MetadataMap::from_headers(forward_headers(incoming))
}

/// The B3 identifiers of the current request, read back from gRPC metadata.
///
/// Empty values (as produced by [`forward_headers`] for absent keys) read as
/// `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceContext {
    pub request_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub parent_span_id: Option<String>,
    pub sampled: Option<bool>,
}

impl TraceContext {
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        let get = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            request_id: get(REQUEST_ID),
            trace_id: get(B3_TRACE_ID),
            span_id: get(B3_SPAN_ID),
            parent_span_id: get(B3_PARENT_SPAN_ID),
            // B3 sends "1"/"0"; some older tracers send "true"/"false"
            sampled: get(B3_SAMPLED).and_then(|v| match v.as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            }),
        }
    }

    /// Whether any identifier was present at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
