use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::call::Call;
use crate::protocol::Request;
use crate::transport::Transport;

/// How long [`Call::execute`] waits for an outcome unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates calls over a shared transport.
///
/// The factory is cheap to clone and holds no per-call state.
#[derive(Clone)]
pub struct CallFactory {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

#[derive(Debug)]
pub struct CallFactoryBuilder {
    timeout: Duration,
}

impl CallFactoryBuilder {
    fn new() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self, transport: Arc<dyn Transport>) -> CallFactory {
        CallFactory { transport, timeout: self.timeout }
    }
}

impl CallFactory {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder().build(transport)
    }

    pub fn builder() -> CallFactoryBuilder {
        CallFactoryBuilder::new()
    }

    pub fn new_call(&self, request: Request) -> Call {
        Call::new(Arc::new(request), Arc::clone(&self.transport), self.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for CallFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFactory").field("timeout", &self.timeout).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn calls_are_fresh_and_share_the_timeout() {
        let factory = CallFactory::builder().timeout(Duration::from_secs(3)).build(Arc::new(MockTransport::new()));
        let request = Request::get("http://localhost/").unwrap();

        let first = factory.new_call(request.clone());
        let second = factory.new_call(request);
        assert!(!first.is_executed());
        assert!(!second.is_executed());
        assert_eq!(first.timeout(), Duration::from_secs(3));
        assert_eq!(CallFactory::new(Arc::new(MockTransport::new())).timeout(), DEFAULT_TIMEOUT);
    }
}
