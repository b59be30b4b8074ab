use std::fmt;

use tonic::service::Interceptor;
use tonic::{Request, Status};

/// An interceptor that can be cloned behind a box.
trait Link: Interceptor + Send + Sync {
  fn box_clone(&self) -> Box<dyn Link>;
}

impl<I> Link for I
where
  I: Interceptor + Clone + Send + Sync + 'static,
{
  fn box_clone(&self) -> Box<dyn Link> {
    Box::new(self.clone())
  }
}

impl Clone for Box<dyn Link> {
  fn clone(&self) -> Self {
    self.box_clone()
  }
}

/// An ordered sequence of interceptors applied as one
///
/// Interceptors run in insertion order: the first one pushed sees the request
/// first, and the first `Err` short-circuits the rest. The chain is fixed once
/// it is handed to a server or client. Cloning a chain clones every
/// interceptor in it (tonic clones the chain per connection), so state meant
/// to be shared across connections belongs behind an `Arc` inside the
/// interceptor.
///
/// An empty chain passes requests through untouched.
///
/// tonic interceptors see request metadata only, and run once per call for
/// unary and streaming RPCs alike, so one chain covers both kinds.
///
/// # Example
/// ```ignore
/// use grpc_mesh::interceptors::{InterceptorChain, RequestIdInterceptor};
///
/// let chain = InterceptorChain::new()
///     .with(RequestIdInterceptor::new())
///     .with(|req: tonic::Request<()>| -> Result<_, tonic::Status> { Ok(req) });
/// ```
#[derive(Clone, Default)]
pub struct InterceptorChain {
  links: Vec<Box<dyn Link>>,
}

impl InterceptorChain {
  /// Create an empty chain
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an interceptor to the end of the chain
  pub fn with<I>(mut self, interceptor: I) -> Self
  where
    I: Interceptor + Clone + Send + Sync + 'static,
  {
    self.links.push(Box::new(interceptor));
    self
  }

  pub fn len(&self) -> usize {
    self.links.len()
  }

  pub fn is_empty(&self) -> bool {
    self.links.is_empty()
  }
}

impl<I> FromIterator<I> for InterceptorChain
where
  I: Interceptor + Clone + Send + Sync + 'static,
{
  fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
    iter.into_iter().fold(Self::new(), Self::with)
  }
}

impl fmt::Debug for InterceptorChain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InterceptorChain")
      .field("len", &self.links.len())
      .finish()
  }
}

impl Interceptor for InterceptorChain {
  fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
    for link in &mut self.links {
      request = link.call(request)?;
    }
    Ok(request)
  }
}
