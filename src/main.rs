use clap::{Parser, Subcommand};
use leaseherd::{LeaseManager, SystemRunner};
use std::error::Error as StdError;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Obtain a lease for an interface
    Acquire {
        /// The network interface to configure (e.g., 'eth0')
        #[arg(short, long)]
        interface: String,
        /// Hostname to advertise to the DHCP server
        #[arg(short = 'H', long)]
        hostname: Option<String>,
    },
    /// Kill client processes and remove per-interface files
    Release {
        /// The network interface to tear down
        #[arg(short, long)]
        interface: String,
    },
    /// Tear down and acquire a fresh lease
    Renew {
        /// The network interface to renew
        #[arg(short, long)]
        interface: String,
        /// Hostname to advertise to the DHCP server
        #[arg(short = 'H', long)]
        hostname: Option<String>,
    },
    /// Print the interface's current IPv4 address, if any
    Status {
        /// The network interface to inspect
        #[arg(short, long)]
        interface: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cancel = CancellationToken::new();
    let manager = LeaseManager::with_cancellation(SystemRunner::new(), cancel.clone());

    // An interrupted acquisition aborts its command but still rolls back.
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; aborting in-flight command");
            cancel.cancel();
        }
    });

    match args.command {
        Command::Acquire {
            interface,
            hostname,
        } => {
            manager.acquire(&interface, hostname.as_deref()).await?;
            println!("Lease acquired on {}", interface);
        }
        Command::Release { interface } => {
            manager.release(&interface).await?;
            println!("Released {}", interface);
        }
        Command::Renew {
            interface,
            hostname,
        } => {
            manager.renew(&interface, hostname.as_deref()).await?;
            println!("Lease renewed on {}", interface);
        }
        Command::Status { interface } => match manager.current_address(&interface).await? {
            Some(address) => println!("{} {}", interface, address),
            None => println!("{} has no IPv4 address", interface),
        },
    }

    Ok(())
}
