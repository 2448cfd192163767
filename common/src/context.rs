use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// A cloneable cancellation signal shared by every long-lived task.
///
/// Each clone keeps the [`Handler`] from completing, so a task that owns a
/// `Context` is always waited on during shutdown.
#[derive(Clone)]
pub struct Context {
	token: CancellationToken,
	_guard: Arc<oneshot::Sender<()>>,
}

/// The owning side of a [`Context`].
pub struct Handler {
	token: CancellationToken,
	recv: oneshot::Receiver<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let (sender, recv) = oneshot::channel();
		let token = CancellationToken::new();

		(
			Self {
				token: token.clone(),
				_guard: Arc::new(sender),
			},
			Handler { token, recv },
		)
	}

	/// Resolves once the handler has been cancelled.
	pub async fn done(&self) {
		self.token.cancelled().await
	}

	pub fn is_done(&self) -> bool {
		self.token.is_cancelled()
	}
}

impl Handler {
	/// Cancels the context and waits for every clone to be dropped.
	pub async fn cancel(self) {
		self.token.cancel();

		let _ = self.recv.await;
	}
}
