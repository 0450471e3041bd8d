use tokio_util::sync::CancellationToken;

/// Owns the cancellation token for everything a view has in flight.
///
/// Dropping the scope, or calling [`ViewScope::close`], cancels every request
/// started with its token or one of its children.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// A token for a nested view; cancelling it leaves this scope running.
    pub fn child(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
