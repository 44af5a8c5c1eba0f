//! Listening addresses for the two ends of the channel.
//!
//! The host listens on an address derived from its own package name. The
//! module listens on an address derived from the module's package name, which
//! comes from build metadata (the host process only knows it that way). Each
//! side sends on the other's listening address, so a process never receives
//! its own messages.

use sha2::{Digest, Sha256};

use crate::config::BuildInfo;
use crate::environment::ProcessEnvironment;
use crate::error::{ChannelError, ChannelResult};

pub const HOST_ADDRESS_PREFIX: &str = "datachannel.action.HOST";
pub const MODULE_ADDRESS_PREFIX: &str = "datachannel.action.MODULE";

/// Number of digest bytes kept in an address.
const DIGEST_BYTES: usize = 8;

/// Which side of the channel the current process is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Hook code running inside the target application.
    Host,
    /// The module's own application process.
    Module,
}

impl Role {
    pub fn detect(environment: &dyn ProcessEnvironment) -> Self {
        if environment.is_host_process() {
            Role::Host
        } else {
            Role::Module
        }
    }

    /// Address this role binds its receiver to.
    pub fn listening_address(self, host_package: &str, module_package: &str) -> String {
        match self {
            Role::Host => host_address(host_package),
            Role::Module => module_address(module_package),
        }
    }

    /// Address this role sends to: the other role's listening address.
    pub fn peer_address(self, host_package: &str, module_package: &str) -> String {
        match self {
            Role::Host => module_address(module_package),
            Role::Module => host_address(host_package),
        }
    }
}

pub fn host_address(package: &str) -> String {
    format!("{HOST_ADDRESS_PREFIX}.{}", package_digest(package))
}

pub fn module_address(module_package: &str) -> String {
    format!("{MODULE_ADDRESS_PREFIX}.{}", package_digest(module_package))
}

/// Resolves the module's own package name.
///
/// Build metadata wins; the context's package name is the fallback, which is
/// only correct inside the module process itself.
pub fn resolve_module_package<'a>(
    build: &'a BuildInfo,
    context_package: &'a str,
) -> ChannelResult<&'a str> {
    if let Some(package) = build.module_package() {
        return Ok(package);
    }
    let fallback = context_package.trim();
    if fallback.is_empty() {
        return Err(ChannelError::config(
            "module package name is missing from build metadata and the context has none; \
             rebuild the module so its package name is embedded",
        ));
    }
    Ok(fallback)
}

fn package_digest(package: &str) -> String {
    let digest = Sha256::digest(package.trim().as_bytes());
    hex::encode(&digest[..DIGEST_BYTES])
}
