use crate::dhcp::DhcpBackend;
use crate::exec::ExecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeaseherdError {
    #[error("invalid interface name: '{0}'")]
    InvalidInterface(String),

    #[error("invalid hostname: '{0}'")]
    InvalidHostname(String),

    #[error("failed to create dhclient config for '{interface}'")]
    ConfigWrite {
        interface: String,
        #[source]
        source: ExecError,
    },

    #[error("{backend} failed on '{interface}'")]
    ClientFailed {
        backend: DhcpBackend,
        interface: String,
        #[source]
        source: ExecError,
    },

    #[error("command execution failed")]
    Exec(#[from] ExecError),
}
