//! The seam between the data channel and the platform's broadcast mechanism.

use std::fmt;
use std::sync::Arc;

use crate::error::TransportResult;
use crate::intent::{Intent, IntentFilter};

/// Callback bound to an action. Invoked on whatever thread the broadcaster delivers on.
pub trait BroadcastReceiver: Send + Sync {
    fn on_receive(&self, intent: &Intent);
}

impl<F> BroadcastReceiver for F
where
    F: Fn(&Intent) + Send + Sync,
{
    fn on_receive(&self, intent: &Intent) {
        self(intent)
    }
}

/// Opaque identifier of a bound receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReceiverHandle(u64);

impl ReceiverHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReceiverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Receiver({})", self.0)
    }
}

/// Outcome of handing an intent to the broadcaster.
///
/// `Accepted` only means the broadcaster took the intent; delivery is still
/// best-effort and may silently fail if no receiver is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted,
    Dropped,
}

/// One-way, best-effort broadcast primitive.
pub trait Broadcaster: Send + Sync {
    /// Hands one intent to the platform. Never blocks.
    fn send_broadcast(&self, intent: Intent) -> SendOutcome;

    /// Binds `receiver` to every future intent matching `filter`.
    fn register_receiver(
        &self,
        filter: IntentFilter,
        receiver: Arc<dyn BroadcastReceiver>,
    ) -> TransportResult<ReceiverHandle>;

    fn unregister_receiver(&self, handle: ReceiverHandle) -> TransportResult<()>;
}
