//! Host-facing result consumer and the single-slot registry the coordinator reads at delivery.

// crates.io
use tokio::sync::mpsc;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, Identity},
};

/// Consumer of authentication outcomes, implemented by the host application.
///
/// Both callbacks run on the coordinator's [`MainContext`](crate::context::MainContext), so
/// implementations may touch presentation state without further synchronization.
pub trait AuthenticationObserver
where
	Self: Send + Sync,
{
	/// A login attempt produced an identity.
	fn on_authenticated(&self, identity: Identity);

	/// A login attempt failed, or sign-out failed.
	fn on_authentication_failed(&self, error: Error);
}

/// Holds zero or one observer; registering replaces the previous one.
#[derive(Clone, Default)]
pub(crate) struct ObserverSlot(Arc<RwLock<Option<Arc<dyn AuthenticationObserver>>>>);
impl ObserverSlot {
	pub(crate) fn replace(&self, observer: Option<Arc<dyn AuthenticationObserver>>) {
		*self.0.write() = observer;
	}

	pub(crate) fn current(&self) -> Option<Arc<dyn AuthenticationObserver>> {
		self.0.read().clone()
	}

	pub(crate) fn is_registered(&self) -> bool {
		self.0.read().is_some()
	}

	/// Hands `result` to the observer registered right now. Returns `false` if there is none.
	pub(crate) fn deliver(&self, result: AuthenticationResult) -> bool {
		// Clone out of the lock so a callback may re-register without deadlocking.
		let Some(observer) = self.current() else {
			return false;
		};

		match result {
			AuthenticationResult::Success(identity) => observer.on_authenticated(identity),
			AuthenticationResult::Failure(err) => observer.on_authentication_failed(err),
		}

		true
	}
}
impl Debug for ObserverSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ObserverSlot").field(&self.is_registered()).finish()
	}
}

/// Observer that forwards every outcome into an unbounded channel.
///
/// Handy for hosts that prefer pulling results in an async loop over implementing callbacks.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
	tx: mpsc::UnboundedSender<AuthenticationResult>,
}
impl ChannelObserver {
	/// Creates the observer and the receiver its outcomes arrive on.
	pub fn new() -> (Self, mpsc::UnboundedReceiver<AuthenticationResult>) {
		let (tx, rx) = mpsc::unbounded_channel();

		(Self { tx }, rx)
	}

	fn forward(&self, result: AuthenticationResult) {
		if self.tx.send(result).is_err() {
			crate::obs::flow_event!(debug, "Channel observer receiver is gone; dropping a result.");
		}
	}
}
impl AuthenticationObserver for ChannelObserver {
	fn on_authenticated(&self, identity: Identity) {
		self.forward(AuthenticationResult::Success(identity));
	}

	fn on_authentication_failed(&self, error: Error) {
		self.forward(AuthenticationResult::Failure(error));
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::UserId, provider::ProviderKind};

	fn identity(uid: &str) -> Identity {
		Identity::new(UserId::new(uid).expect("User fixture should be valid."), ProviderKind::Password)
	}

	#[test]
	fn slot_delivers_to_latest_observer_only() {
		let slot = ObserverSlot::default();
		let (first, mut first_rx) = ChannelObserver::new();
		let (second, mut second_rx) = ChannelObserver::new();

		assert!(!slot.deliver(AuthenticationResult::Success(identity("dropped"))));

		slot.replace(Some(Arc::new(first)));
		slot.replace(Some(Arc::new(second)));

		assert!(slot.deliver(AuthenticationResult::Success(identity("123"))));
		assert!(first_rx.try_recv().is_err());

		let received = second_rx
			.try_recv()
			.expect("The latest observer should receive the result.")
			.into_result()
			.expect("The result should be a success.");

		assert_eq!(received.user_id.to_string(), "123");
	}

	#[test]
	fn cleared_slot_discards_results() {
		let slot = ObserverSlot::default();
		let (observer, mut rx) = ChannelObserver::new();

		slot.replace(Some(Arc::new(observer)));
		slot.replace(None);

		assert!(!slot.is_registered());
		assert!(!slot.deliver(AuthenticationResult::Failure(Error::InvalidInput {
			field: "identifier"
		})));
		assert!(rx.try_recv().is_err());
	}
}
