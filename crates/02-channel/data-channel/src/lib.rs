//! Bidirectional key-value data channel between an instrumentation module
//! process and the host process its hooks run in.
//!
//! The two sides share no memory. Every `put` becomes one broadcast
//! [`transport::Intent`] addressed to the peer's listening address, and every
//! `wait` installs a handler keyed by name that inspects each inbound intent.
//!
//! * [`DataChannel`] – per-process service object: registration, callback table, dispatch.
//! * [`Namespace`] – view bound to one (context, target package) pair exposing put/wait.
//! * [`address`] – deterministic host/module listening addresses.
//! * [`handshake`] – reserved keys and the build-version request/response pair.
//! * [`ChannelSettings`] – the enable flag plus build metadata, loadable from TOML.

pub mod address;
mod config;
mod dispatcher;
mod environment;
mod error;
pub mod handshake;
mod namespace;
mod value;

pub use address::Role;
pub use config::{BuildInfo, ChannelConfig, ChannelSettings, SettingsError};
pub use dispatcher::{DataChannel, RegisterOutcome};
pub use environment::{Context, ProcessEnvironment, StaticEnvironment};
pub use error::{ChannelError, ChannelResult};
pub use namespace::Namespace;
pub use value::{ChannelData, ExtractError, FromChannelValue, IntoChannelValue, Parcel, Serial};
