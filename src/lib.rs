//! # Leaseherd - DHCP Lease Lifecycle Manager
//!
//! Leaseherd brings Linux interfaces up and down by driving the system's DHCP
//! client programs rather than speaking the protocol itself. It prefers
//! BusyBox `udhcpc` (foreground, single shot) and falls back to ISC `dhclient`
//! under a process-group deadline, validates every identifier before it
//! reaches an argument list or file path, and tears processes and
//! per-interface files down symmetrically on every failure path.
//!
//! ## Features
//!
//! - udhcpc-first backend selection with dhclient fallback
//! - Allow-list validation of interface names and hostnames
//! - Bounded timeouts for every subprocess step
//! - Idempotent, best-effort release used as pre-clean and rollback
//! - Advisory IPv4 address extraction from kernel state
//!
//! ## Example
//!
//! ```rust,no_run
//! use leaseherd::{LeaseManager, SystemRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = LeaseManager::new(SystemRunner::new());
//!     manager.acquire("eth0", Some("edge-01")).await?;
//!     if let Some(address) = manager.current_address("eth0").await? {
//!         println!("eth0 is up with {}", address);
//!     }
//!     Ok(())
//! }
//! ```

pub mod dhcp;
pub mod error;
pub mod exec;
pub mod validate;

pub use dhcp::{
    first_ipv4_address, DhcpBackend, LeaseManager, CLEANUP_TIMEOUT, DHCLIENT_TIMEOUT,
    IP_CHECK_TIMEOUT, UDHCPC_TIMEOUT,
};
pub use error::LeaseherdError;
pub use exec::{CommandRunner, ExecError, SystemRunner, DEFAULT_TIMEOUT};
pub use validate::{validate_hostname, validate_interface};
