use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use transport::Broadcaster;

/// Answers the questions only the hook bridge can: where are we running, and
/// is it safe to touch application services yet.
pub trait ProcessEnvironment: Send + Sync {
    /// True when the current process is the hooked host application.
    fn is_host_process(&self) -> bool;

    /// True while the hook framework is still bootstrapping, before any
    /// application context exists. The channel refuses to run in this phase.
    fn is_bootstrap_phase(&self) -> bool {
        false
    }
}

/// Environment with a fixed role and a switchable bootstrap flag.
#[derive(Debug)]
pub struct StaticEnvironment {
    host: bool,
    bootstrap: AtomicBool,
}

impl StaticEnvironment {
    pub fn host() -> Self {
        Self {
            host: true,
            bootstrap: AtomicBool::new(false),
        }
    }

    pub fn module() -> Self {
        Self {
            host: false,
            bootstrap: AtomicBool::new(false),
        }
    }

    pub fn set_bootstrap_phase(&self, bootstrapping: bool) {
        self.bootstrap.store(bootstrapping, Ordering::Release);
    }
}

impl ProcessEnvironment for StaticEnvironment {
    fn is_host_process(&self) -> bool {
        self.host
    }

    fn is_bootstrap_phase(&self) -> bool {
        self.bootstrap.load(Ordering::Acquire)
    }
}

/// Application context: the process's package name plus its broadcast handle.
#[derive(Clone)]
pub struct Context {
    package_name: Arc<str>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Context {
    pub fn new(package_name: impl Into<String>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            package_name: Arc::from(package_name.into()),
            broadcaster,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn broadcaster(&self) -> &Arc<dyn Broadcaster> {
        &self.broadcaster
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("package_name", &self.package_name)
            .finish_non_exhaustive()
    }
}
