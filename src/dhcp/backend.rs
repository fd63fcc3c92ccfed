use std::fmt;
use std::time::Duration;

use crate::exec::CommandRunner;

use super::{dhclient_config_path, DHCLIENT_TIMEOUT, UDHCPC_TIMEOUT};

/// The client program driven for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpBackend {
    /// BusyBox udhcpc: foreground, single shot, never daemonizes.
    Udhcpc,
    /// ISC dhclient: full featured, may daemonize, reads a config file.
    Dhclient,
}

impl DhcpBackend {
    /// Picks the backend for this acquisition: udhcpc when installed,
    /// dhclient otherwise. Probed fresh on every call, never cached.
    pub fn select<R: CommandRunner>(runner: &R) -> Self {
        if runner.has_command("udhcpc") {
            DhcpBackend::Udhcpc
        } else {
            DhcpBackend::Dhclient
        }
    }

    /// Name of the client binary, as spawned and as matched by kill patterns.
    pub fn binary(&self) -> &'static str {
        match self {
            DhcpBackend::Udhcpc => "udhcpc",
            DhcpBackend::Dhclient => "dhclient",
        }
    }

    /// Deadline the runner applies around the acquire invocation.
    pub fn acquire_timeout(&self) -> Duration {
        match self {
            DhcpBackend::Udhcpc => UDHCPC_TIMEOUT,
            // timeout(1) fires first; the runner deadline is a backstop
            DhcpBackend::Dhclient => DHCLIENT_TIMEOUT + Duration::from_secs(5),
        }
    }

    /// Builds the program and argument vector for one acquisition attempt.
    ///
    /// udhcpc advertises a non-empty `hostname` directly on its command line.
    /// dhclient instead gets pointed at the per-interface config file that
    /// carries the hostname directive, and runs under timeout(1) so the whole
    /// process group dies on deadline even if it daemonizes.
    pub fn acquire_command(&self, interface: &str, hostname: &str) -> (String, Vec<String>) {
        match self {
            DhcpBackend::Udhcpc => {
                let mut args = vec![
                    "-i".to_string(),
                    interface.to_string(),
                    "-n".to_string(),
                    "-q".to_string(),
                ];
                if !hostname.is_empty() {
                    args.push("-x".to_string());
                    args.push(format!("hostname:{}", hostname));
                }
                ("udhcpc".to_string(), args)
            }
            DhcpBackend::Dhclient => {
                let mut args = vec![
                    DHCLIENT_TIMEOUT.as_secs().to_string(),
                    "dhclient".to_string(),
                    "-v".to_string(),
                ];
                if !hostname.is_empty() {
                    args.push("-cf".to_string());
                    args.push(dhclient_config_path(interface));
                }
                args.push(interface.to_string());
                ("timeout".to_string(), args)
            }
        }
    }
}

impl fmt::Display for DhcpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}
