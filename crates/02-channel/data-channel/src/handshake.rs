//! Build-version handshake.
//!
//! Every registered process answers [`GET_VERSION_KEY`] with its own build
//! version under [`VERSION_RESULT_KEY`]. The requester compares the answer with
//! its local version. Both keys are reserved and cannot be removed through a
//! [`Namespace`].

use std::sync::Arc;

use transport::{ExtraValue, Intent};

use crate::dispatcher::{DataChannel, Handler};
use crate::environment::Context;
use crate::error::ChannelResult;
use crate::namespace::Namespace;

pub const GET_VERSION_KEY: &str = "module_generated_version_get";
pub const VERSION_RESULT_KEY: &str = "module_generated_version_result";

/// Value carried by [`Namespace::ping`].
pub const PING_SENTINEL: &str = "wait_for_listener_value";

pub fn is_reserved_key(key: &str) -> bool {
    key == GET_VERSION_KEY || key == VERSION_RESULT_KEY
}

/// Installs the responder that answers version requests from the peer.
pub(crate) fn install_responder(channel: &DataChannel, context: &Context) {
    let state = channel.downgrade();
    let context = context.clone();
    let handler: Handler = Arc::new(move |_: &str, intent: &Intent| {
        let Some(requested) = intent.extra(GET_VERSION_KEY).and_then(ExtraValue::as_str) else {
            return;
        };
        let Some(channel) = DataChannel::upgrade(&state) else {
            return;
        };
        let version = channel.build().version.clone();
        tracing::debug!(requested, %version, "answering version request");
        let reply = channel
            .namespace(&context, requested)
            .and_then(|namespace| namespace.put(VERSION_RESULT_KEY, version));
        if let Err(err) = reply {
            tracing::warn!(%err, "failed to answer version request");
        }
    });
    channel.install(GET_VERSION_KEY, handler);
}

/// Sends a version request to the namespace's peer and reports equality to `callback`.
///
/// Only the first callback installed for a channel is kept.
pub(crate) fn request_version<F>(namespace: &Namespace, callback: F) -> ChannelResult<()>
where
    F: Fn(bool) + Send + Sync + 'static,
{
    let channel = namespace.channel();
    if !channel.is_enabled() {
        return Ok(());
    }
    let local = channel.build().version.clone();
    let handler: Handler = Arc::new(move |_: &str, intent: &Intent| {
        let Some(remote) = intent.extra(VERSION_RESULT_KEY).and_then(ExtraValue::as_str) else {
            return;
        };
        let matches = remote == local;
        if !matches {
            tracing::info!(local = %local, remote, "peer runs a different build");
        }
        callback(matches);
    });
    if !channel.install(VERSION_RESULT_KEY, handler) {
        tracing::trace!("version result handler already installed");
    }
    namespace.put(GET_VERSION_KEY, namespace.target_package())
}
