//! Per-process channel core: registration, callback table, fan-out dispatch, send.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use transport::{
    BroadcastReceiver, Broadcaster, Extras, Intent, IntentFilter, ReceiverHandle, SendOutcome,
};

use crate::address::{self, Role};
use crate::config::{BuildInfo, ChannelSettings};
use crate::environment::{Context, ProcessEnvironment};
use crate::error::{ChannelError, ChannelResult};
use crate::handshake;
use crate::namespace::Namespace;

/// Handler stored in the callback table. Receives the address the intent
/// arrived on and the intent itself; filtering by key is the handler's job.
pub(crate) type Handler = Arc<dyn Fn(&str, &Intent) + Send + Sync>;

/// Result of a [`DataChannel::register`] call. Only `Registered` changes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyRegistered,
    Disabled,
    MissingContext,
}

struct Registration {
    context: Context,
    listening_address: String,
    receiver: ReceiverHandle,
}

pub(crate) struct ChannelState {
    enabled: AtomicBool,
    role: Role,
    build: BuildInfo,
    environment: Arc<dyn ProcessEnvironment>,
    callbacks: RwLock<HashMap<String, Handler>>,
    registration: Mutex<Option<Registration>>,
}

impl Drop for ChannelState {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.get_mut().take() {
            let result = registration
                .context
                .broadcaster()
                .unregister_receiver(registration.receiver);
            if let Err(err) = result {
                tracing::debug!(%err, "receiver already gone at shutdown");
            }
        }
    }
}

/// The process's data channel.
///
/// Construct one per process at the composition root and hand out clones;
/// clones share the same callback table and registration.
#[derive(Clone)]
pub struct DataChannel {
    state: Arc<ChannelState>,
}

impl DataChannel {
    /// Builds the channel. The role is probed once here and never re-evaluated.
    pub fn new(settings: ChannelSettings, environment: Arc<dyn ProcessEnvironment>) -> Self {
        let role = Role::detect(environment.as_ref());
        Self {
            state: Arc::new(ChannelState {
                enabled: AtomicBool::new(settings.channel.enabled),
                role,
                build: settings.build,
                environment,
                callbacks: RwLock::new(HashMap::new()),
                registration: Mutex::new(None),
            }),
        }
    }

    pub fn role(&self) -> Role {
        self.state.role
    }

    pub fn build(&self) -> &BuildInfo {
        &self.state.build
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_registered(&self) -> bool {
        self.state.registration.lock().is_some()
    }

    /// Context bound by the active registration.
    pub fn registered_context(&self) -> Option<Context> {
        self.state
            .registration
            .lock()
            .as_ref()
            .map(|registration| registration.context.clone())
    }

    /// Address the active registration listens on.
    pub fn listening_address(&self) -> Option<String> {
        self.state
            .registration
            .lock()
            .as_ref()
            .map(|registration| registration.listening_address.clone())
    }

    /// Number of installed handlers, the handshake responder included.
    pub fn handler_count(&self) -> usize {
        self.state.callbacks.read().len()
    }

    /// Binds this process's receiver and installs the version handshake responder.
    ///
    /// `package_name` is the host application's package: the process's own in
    /// the host, the hook target in the module. Absent context, disabled
    /// feature and repeated calls are silent no-ops.
    pub fn register(
        &self,
        context: Option<&Context>,
        package_name: &str,
    ) -> ChannelResult<RegisterOutcome> {
        self.ensure_usable()?;
        if !self.is_enabled() {
            return Ok(RegisterOutcome::Disabled);
        }
        let Some(context) = context else {
            return Ok(RegisterOutcome::MissingContext);
        };

        let mut registration = self.state.registration.lock();
        if registration.is_some() {
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let listening_address = match self.state.role {
            Role::Host => address::host_address(package_name),
            Role::Module => address::module_address(self.module_package(context)?),
        };
        let receiver = ChannelReceiver {
            state: Arc::downgrade(&self.state),
            address: listening_address.clone(),
        };
        let handle = context.broadcaster().register_receiver(
            IntentFilter::new(listening_address.clone()),
            Arc::new(receiver),
        )?;
        tracing::debug!(
            role = ?self.state.role,
            address = %listening_address,
            package = package_name,
            "data channel registered"
        );
        *registration = Some(Registration {
            context: context.clone(),
            listening_address,
            receiver: handle,
        });
        drop(registration);

        handshake::install_responder(self, context);
        Ok(RegisterOutcome::Registered)
    }

    /// Opens a namespace bound to `context` and the host package `target_package`.
    pub fn namespace(
        &self,
        context: &Context,
        target_package: impl Into<String>,
    ) -> ChannelResult<Namespace> {
        self.ensure_usable()?;
        Ok(Namespace::new(
            self.clone(),
            context.clone(),
            target_package.into(),
        ))
    }

    /// Sends one intent holding `extras` to the peer's listening address.
    pub(crate) fn push(
        &self,
        context: &Context,
        target_package: &str,
        extras: Extras,
    ) -> ChannelResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let peer = match self.state.role {
            Role::Module => address::host_address(target_package),
            Role::Host => address::module_address(self.module_package(context)?),
        };
        let fields = extras.len();
        let outcome = context
            .broadcaster()
            .send_broadcast(Intent::from_parts(peer, extras));
        if outcome == SendOutcome::Dropped {
            tracing::trace!(fields, "broadcaster dropped outbound intent");
        } else {
            tracing::trace!(fields, "outbound intent accepted");
        }
        Ok(())
    }

    /// Installs `handler` under `key` unless the key is already taken.
    pub(crate) fn install(&self, key: &str, handler: Handler) -> bool {
        match self.state.callbacks.write().entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(handler);
                true
            }
        }
    }

    pub(crate) fn uninstall(&self, key: &str) -> bool {
        self.state.callbacks.write().remove(key).is_some()
    }

    pub(crate) fn downgrade(&self) -> Weak<ChannelState> {
        Arc::downgrade(&self.state)
    }

    pub(crate) fn upgrade(state: &Weak<ChannelState>) -> Option<Self> {
        state.upgrade().map(|state| Self { state })
    }

    /// Hands `intent` to every installed handler.
    ///
    /// Handlers are cloned out of the table first so they can install or
    /// remove handlers, or send, without deadlocking.
    fn dispatch(&self, address: &str, intent: &Intent) {
        let handlers: SmallVec<[Handler; 8]> =
            self.state.callbacks.read().values().cloned().collect();
        tracing::trace!(address, handlers = handlers.len(), "dispatching intent");
        for handler in handlers.iter() {
            handler(address, intent);
        }
    }

    fn module_package<'a>(&'a self, context: &'a Context) -> ChannelResult<&'a str> {
        address::resolve_module_package(&self.state.build, context.package_name())
    }

    fn ensure_usable(&self) -> ChannelResult<()> {
        if self.state.environment.is_bootstrap_phase() {
            return Err(ChannelError::config(
                "the data channel cannot be used while the hook framework is bootstrapping; \
                 call it once an application context exists",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for DataChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataChannel")
            .field("role", &self.state.role)
            .field("enabled", &self.is_enabled())
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

struct ChannelReceiver {
    state: Weak<ChannelState>,
    address: String,
}

impl BroadcastReceiver for ChannelReceiver {
    fn on_receive(&self, intent: &Intent) {
        if intent.action() != self.address {
            return;
        }
        if let Some(channel) = DataChannel::upgrade(&self.state) {
            channel.dispatch(&self.address, intent);
        }
    }
}
