//! Static identity of the backend process.

use std::fs;

use crate::config::IdentityConfig;

const PROC_HOSTNAME: &str = "/proc/sys/kernel/hostname";

/// Everything the informational endpoints report, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub message: String,
    pub version: String,
    pub app_name: String,
    pub environment: String,
    pub hostname: String,
}

impl ServiceIdentity {
    pub fn new(config: &IdentityConfig, hostname: String) -> Self {
        Self {
            message: config.message.clone(),
            version: config.version.clone(),
            app_name: config.app_name.clone(),
            environment: config.environment.clone(),
            hostname,
        }
    }

    /// Build from config using the host identifier of this machine.
    pub fn detect(config: &IdentityConfig) -> Self {
        Self::new(config, detect_hostname())
    }
}

/// Host identifier: `HOSTNAME`, then the kernel's hostname, then "localhost".
pub fn detect_hostname() -> String {
    resolve_hostname(
        std::env::var("HOSTNAME").ok(),
        fs::read_to_string(PROC_HOSTNAME).ok(),
    )
}

fn resolve_hostname(from_env: Option<String>, from_kernel: Option<String>) -> String {
    [from_env, from_kernel]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
