use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

/// A value that is either available now or will be produced by a future.
///
/// Handlers, controller methods and controller constructors may answer
/// synchronously or asynchronously; the invocation protocol awaits both the
/// same way through [`Deferred::resolve`].
pub enum Deferred<T> {
    Ready(T),
    Pending(BoxFuture<'static, T>),
}

impl<T> Deferred<T> {
    #[inline]
    pub fn ready(value: T) -> Self {
        Deferred::Ready(value)
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Deferred::Pending(future.boxed())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Deferred::Ready(_))
    }

    /// Await the value, whichever form it arrived in.
    pub async fn resolve(self) -> T {
        match self {
            Deferred::Ready(value) => value,
            Deferred::Pending(future) => future.await,
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deferred::Ready(_) => f.write_str("Deferred::Ready(..)"),
            Deferred::Pending(_) => f.write_str("Deferred::Pending(..)"),
        }
    }
}
