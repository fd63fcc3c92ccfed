//! DHCP lease lifecycle management
//!
//! This module contains the core lease manager logic including:
//! - Backend selection between udhcpc and dhclient
//! - Bounded-timeout acquisition with symmetric cleanup
//! - Best-effort release of processes and per-interface files
//! - Advisory address inspection from kernel state

pub mod backend;
pub mod inspect;


use std::net::Ipv4Addr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::LeaseherdError;
use crate::exec::CommandRunner;
use crate::validate::{validate_hostname, validate_interface};

pub use backend::DhcpBackend;
pub use inspect::first_ipv4_address;

/// Deadline for a udhcpc acquisition attempt.
pub const UDHCPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-group deadline passed to timeout(1) around dhclient.
pub const DHCLIENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for each kill and file-removal step.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_millis(500);

/// Deadline for the advisory address query.
pub const IP_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Path of the per-interface dhclient config file.
pub(crate) fn dhclient_config_path(interface: &str) -> String {
    format!("/run/net/dhclient.{}.conf", interface)
}

/// dhclient's traditional lease database location.
fn legacy_lease_path(interface: &str) -> String {
    format!("/var/lib/dhcp/dhclient.{}.leases", interface)
}

/// Lease file location under the runtime directory.
fn runtime_lease_path(interface: &str) -> String {
    format!("/run/net/dhclient.{}.leases", interface)
}

/// pkill pattern matching one backend's process for one interface.
///
/// The interface is regex-escaped so it always matches literally, never as
/// pattern syntax.
fn kill_pattern(backend: DhcpBackend, interface: &str) -> String {
    format!("{}.*{}", backend.binary(), regex::escape(interface))
}

/// Drives external DHCP client programs through a full lease lifecycle.
///
/// Every path, kill pattern, and argument is derived from the validated
/// interface name alone, so concurrent use across distinct interfaces is safe
/// without locking. Calls targeting the same interface must not overlap,
/// since the kill-then-start sequence is not atomic.
pub struct LeaseManager<R> {
    runner: R,
    cancel: CancellationToken,
}

impl<R: CommandRunner> LeaseManager<R> {
    /// Creates a manager whose commands are bounded by their deadlines only.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a manager whose acquisition commands also abort when `cancel`
    /// fires. Cleanup commands stay non-cancellable so an aborted acquisition
    /// is still rolled back.
    pub fn with_cancellation(runner: R, cancel: CancellationToken) -> Self {
        Self { runner, cancel }
    }

    /// Obtains a lease for `interface`, optionally advertising `hostname`.
    ///
    /// The interface is torn down before the attempt and again if the attempt
    /// fails, so a failed call never leaves a client process or per-interface
    /// file behind. Success means the chosen backend exited cleanly; whether
    /// an address is visible afterwards is logged but not a success gate.
    pub async fn acquire(
        &self,
        interface: &str,
        hostname: Option<&str>,
    ) -> Result<(), LeaseherdError> {
        validate_interface(interface)?;
        let hostname = hostname.unwrap_or("");
        validate_hostname(hostname)?;

        // A leftover client from an earlier attempt would race this one
        // for the interface.
        self.release(interface).await?;

        let backend = DhcpBackend::select(&self.runner);
        tracing::info!("Acquiring lease on '{}' via {}", interface, backend);

        if let Err(err) = self.run_acquisition(backend, interface, hostname).await {
            let _ = self.release(interface).await;
            return Err(err);
        }

        match self.query_address(interface).await {
            Ok(Some(address)) => {
                tracing::info!("Interface '{}' has address {}", interface, address)
            }
            Ok(None) => tracing::warn!("Interface '{}' reports no IPv4 address", interface),
            Err(err) => tracing::warn!("Address check on '{}' failed: {}", interface, err),
        }

        tracing::info!("Lease acquired on '{}'", interface);
        Ok(())
    }

    /// Tears down any client process and per-interface file for `interface`.
    ///
    /// Idempotent and best-effort: each step gets a short deadline, and an
    /// individual failure is logged at debug severity without aborting the
    /// remaining steps. Only an invalid interface name returns an error.
    pub async fn release(&self, interface: &str) -> Result<(), LeaseherdError> {
        validate_interface(interface)?;
        tracing::debug!("Releasing DHCP state on '{}'", interface);

        for backend in [DhcpBackend::Udhcpc, DhcpBackend::Dhclient] {
            self.kill_client(backend, interface).await;
        }

        for path in [
            legacy_lease_path(interface),
            runtime_lease_path(interface),
            dhclient_config_path(interface),
        ] {
            self.remove_file(&path).await;
        }

        Ok(())
    }

    /// Tears down and re-acquires. There is no incremental renewal when
    /// driving external clients; a fresh acquisition is the correct move.
    pub async fn renew(
        &self,
        interface: &str,
        hostname: Option<&str>,
    ) -> Result<(), LeaseherdError> {
        tracing::debug!("Renewing lease on '{}'", interface);
        self.acquire(interface, hostname).await
    }

    /// Reads the interface's current IPv4 address from kernel state.
    ///
    /// `acquire` only logs this information; it is exposed separately for
    /// callers that want to gate on address presence themselves.
    pub async fn current_address(
        &self,
        interface: &str,
    ) -> Result<Option<Ipv4Addr>, LeaseherdError> {
        validate_interface(interface)?;
        self.query_address(interface).await
    }

    async fn run_acquisition(
        &self,
        backend: DhcpBackend,
        interface: &str,
        hostname: &str,
    ) -> Result<(), LeaseherdError> {
        if backend == DhcpBackend::Dhclient && !hostname.is_empty() {
            self.write_dhclient_config(interface, hostname).await?;
        }

        let (program, args) = backend.acquire_command(interface, hostname);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        self.runner
            .run_cancellable(&self.cancel, backend.acquire_timeout(), &program, &args)
            .await
            .map_err(|source| LeaseherdError::ClientFailed {
                backend,
                interface: interface.to_string(),
                source,
            })?;

        Ok(())
    }

    /// Writes the per-interface dhclient config advertising `hostname`.
    ///
    /// A write failure is a hard error: falling back to the plain invocation
    /// would silently drop the hostname the caller asked for.
    async fn write_dhclient_config(
        &self,
        interface: &str,
        hostname: &str,
    ) -> Result<(), LeaseherdError> {
        let path = dhclient_config_path(interface);
        let directive = format!("send host-name \"{}\";\n", hostname);

        self.runner
            .run_with_stdin("install", &["-m", "0600", "/dev/stdin", &path], &directive)
            .await
            .map_err(|source| LeaseherdError::ConfigWrite {
                interface: interface.to_string(),
                source,
            })?;

        Ok(())
    }

    async fn kill_client(&self, backend: DhcpBackend, interface: &str) {
        let pattern = kill_pattern(backend, interface);
        if let Err(err) = self
            .runner
            .run_with_timeout(CLEANUP_TIMEOUT, "pkill", &["-9", "-f", &pattern])
            .await
        {
            // pkill exits non-zero when nothing matched
            tracing::debug!("No {} killed on '{}': {}", backend, interface, err);
        }
    }

    async fn remove_file(&self, path: &str) {
        if let Err(err) = self
            .runner
            .run_with_timeout(CLEANUP_TIMEOUT, "rm", &["-f", path])
            .await
        {
            tracing::debug!("Could not remove '{}': {}", path, err);
        }
    }

    async fn query_address(&self, interface: &str) -> Result<Option<Ipv4Addr>, LeaseherdError> {
        let output = self
            .runner
            .run_with_timeout(IP_CHECK_TIMEOUT, "ip", &["addr", "show", interface])
            .await?;
        Ok(first_ipv4_address(&output))
    }
}
