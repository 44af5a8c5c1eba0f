//! Broadcast transport primitives shared by the module and host processes.
//!
//! This crate models the platform's one-way broadcast mechanism:
//! * [`Intent`] – a message addressed by an action string carrying flat, named extras.
//! * [`ExtraValue`] – the closed whitelist of values an extra may hold.
//! * [`Broadcaster`] – the seam to the platform: send one intent, bind receivers by action.
//! * [`LoopbackBus`] – in-process broadcaster with best-effort, at-most-once delivery.
//! * [`TransportError`] – small error surface for receiver binding failures.

mod broadcast;
mod error;
mod extra;
mod intent;
mod loopback;

pub use broadcast::{BroadcastReceiver, Broadcaster, ReceiverHandle, SendOutcome};
pub use error::{TransportError, TransportResult};
pub use extra::{ExtraKind, ExtraValue, ParcelBlob, SerialBlob};
pub use intent::{Extras, Intent, IntentFilter};
pub use loopback::{BusConfig, BusMetricsSnapshot, DeliveryWorker, LoopbackBus};
