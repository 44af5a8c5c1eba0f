use std::sync::Arc;

use transport::{ExtraValue, Extras, Intent};

use crate::dispatcher::{DataChannel, Handler};
use crate::environment::Context;
use crate::error::ChannelResult;
use crate::handshake::{self, PING_SENTINEL};
use crate::value::{ChannelData, FromChannelValue, IntoChannelValue};

/// Channel operations scoped to one (context, host package) pair.
///
/// Cheap to create; obtain a fresh one from [`DataChannel::namespace`] per use.
#[derive(Clone, Debug)]
pub struct Namespace {
    channel: DataChannel,
    context: Context,
    target_package: String,
}

impl Namespace {
    pub(crate) fn new(channel: DataChannel, context: Context, target_package: String) -> Self {
        Self {
            channel,
            context,
            target_package,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn target_package(&self) -> &str {
        &self.target_package
    }

    pub(crate) fn channel(&self) -> &DataChannel {
        &self.channel
    }

    pub fn put<T: IntoChannelValue>(&self, key: impl Into<String>, value: T) -> ChannelResult<()> {
        self.put_data(ChannelData::new(key, value))
    }

    pub fn put_data<T: IntoChannelValue>(&self, data: ChannelData<T>) -> ChannelResult<()> {
        self.put_all([data])
    }

    /// Sends every entry with a value as one intent. Entries without a value are skipped.
    pub fn put_all<T, I>(&self, data: I) -> ChannelResult<()>
    where
        T: IntoChannelValue,
        I: IntoIterator<Item = ChannelData<T>>,
    {
        let mut extras = Extras::new();
        for entry in data {
            if let Some((key, value)) = entry.into_field()? {
                extras.insert(key, value);
            }
        }
        self.channel.push(&self.context, &self.target_package, extras)
    }

    /// Key-only put, observed on the other side with [`Namespace::wait_ping`].
    pub fn ping(&self, key: impl Into<String>) -> ChannelResult<()> {
        self.put(key, PING_SENTINEL)
    }

    /// Calls `callback` with the value received under `key`.
    ///
    /// Returns false when a handler is already installed under `key` (the
    /// first one stays) or the channel is disabled.
    pub fn wait<T, F>(&self, key: impl Into<String>, callback: F) -> bool
    where
        T: FromChannelValue + Clone + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.install_waiter(key.into(), None, callback)
    }

    /// Like [`Namespace::wait`], but calls `callback` with `default` for every
    /// inbound intent that lacks a readable value under `key`.
    pub fn wait_or<T, F>(&self, key: impl Into<String>, default: T, callback: F) -> bool
    where
        T: FromChannelValue + Clone + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.install_waiter(key.into(), Some(default), callback)
    }

    /// Fires only when the ping sentinel arrives under `key`.
    pub fn wait_ping<F>(&self, key: impl Into<String>, callback: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        if !self.channel.is_enabled() {
            return false;
        }
        let key = key.into();
        let field = key.clone();
        let handler: Handler = Arc::new(move |_: &str, intent: &Intent| {
            if intent.extra(&field).and_then(ExtraValue::as_str) == Some(PING_SENTINEL) {
                callback();
            }
        });
        self.channel.install(&key, handler)
    }

    /// Removes the waiter under `key`. Reserved handshake keys cannot be removed.
    pub fn remove_wait(&self, key: &str) -> bool {
        if handshake::is_reserved_key(key) {
            return false;
        }
        self.channel.uninstall(key)
    }

    /// Asks the peer for its build version and reports whether it equals ours.
    ///
    /// The callback never fires if the peer is not running or not registered.
    pub fn checking_version_equals<F>(&self, callback: F) -> ChannelResult<()>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        handshake::request_version(self, callback)
    }

    fn install_waiter<T, F>(&self, key: String, default: Option<T>, callback: F) -> bool
    where
        T: FromChannelValue + Clone + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        if !self.channel.is_enabled() {
            return false;
        }
        let field = key.clone();
        let handler: Handler = Arc::new(move |_: &str, intent: &Intent| {
            let received = match intent.extra(&field).map(T::from_extra) {
                Some(Ok(value)) => Some(value),
                Some(Err(err)) => {
                    tracing::trace!(key = %field, %err, "treating unreadable field as absent");
                    None
                }
                None => None,
            };
            if let Some(value) = received.or_else(|| default.clone()) {
                callback(value);
            }
        });
        self.channel.install(&key, handler)
    }
}
