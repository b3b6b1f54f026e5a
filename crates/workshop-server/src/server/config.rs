use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use core::time::Duration;
use std::net::SocketAddr;
use tonic::transport::Uri;

/// Which services a process serves.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Only the workshop (accept, paint, retrieve, callback).
    Workshop,
    /// Only the sub workshop (the painter).
    SubWorkshop,
    /// Both services on the same port.
    All,
}

impl Role {
    pub const fn serves_workshop(self) -> bool {
        matches!(self, Self::Workshop | Self::All)
    }

    pub const fn serves_sub_workshop(self) -> bool {
        matches!(self, Self::SubWorkshop | Self::All)
    }
}

/// Runtime configuration for the `workshop-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first). The defaults run both services in one process, the
/// workshop calling the sub workshop on its own port.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "workshop-server",
    version,
    about = "gRPC workshop that accepts, paints and hands back cars"
)]
pub struct CliArgs {
    /// Services to run in this process.
    ///
    /// Environment variable: `WORKSHOP_ROLE`
    #[arg(long, env = "WORKSHOP_ROLE", value_enum, default_value_t = Role::All)]
    pub role: Role,

    /// Address the gRPC server listens on.
    ///
    /// Environment variable: `GRPC_ADDR`
    #[arg(long, env = "GRPC_ADDR", default_value_t = String::from("0.0.0.0:5380"))]
    pub grpc_addr: String,

    /// Address the REST mapping listens on.
    ///
    /// Environment variable: `REST_ADDR`
    #[arg(long, env = "REST_ADDR", default_value_t = String::from("0.0.0.0:5381"))]
    pub rest_addr: String,

    /// Do not serve the REST mapping.
    ///
    /// Environment variable: `DISABLE_REST`
    #[arg(long, env = "DISABLE_REST", default_value_t = false)]
    pub no_rest: bool,

    /// gRPC endpoint of the sub workshop the workshop sends paint jobs to.
    ///
    /// Environment variable: `SUB_WORKSHOP_ENDPOINT`
    #[arg(
        long,
        env = "SUB_WORKSHOP_ENDPOINT",
        default_value_t = String::from("http://127.0.0.1:5380")
    )]
    pub sub_workshop_endpoint: String,

    /// Address the sub workshop dials to report a finished paint job. Must
    /// reach this process' gRPC server. `:port` means the sub workshop's own
    /// host.
    ///
    /// Environment variable: `CALLBACK_ADDRESS`
    #[arg(long, env = "CALLBACK_ADDRESS", default_value_t = String::from(":5380"))]
    pub callback_address: String,

    /// Connect timeout, in milliseconds, for outbound peer connections.
    ///
    /// Environment variable: `CONNECT_TIMEOUT_MS`
    #[arg(long, env = "CONNECT_TIMEOUT_MS", default_value_t = 2000)]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub role: Role,
    pub grpc_addr: SocketAddr,
    pub rest_addr: Option<SocketAddr>,
    pub sub_workshop_endpoint: String,
    pub callback_address: String,
    pub connect_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let grpc_addr = args
            .grpc_addr
            .parse()
            .with_context(|| format!("GRPC_ADDR ({}) is not a socket address", args.grpc_addr))?;

        let rest_addr = if args.no_rest {
            None
        } else {
            Some(
                args.rest_addr.parse().with_context(|| {
                    format!("REST_ADDR ({}) is not a socket address", args.rest_addr)
                })?,
            )
        };

        if args.role.serves_workshop() {
            args.sub_workshop_endpoint
                .parse::<Uri>()
                .with_context(|| {
                    format!(
                        "SUB_WORKSHOP_ENDPOINT ({}) is not a valid URI",
                        args.sub_workshop_endpoint
                    )
                })?;

            if args.callback_address.trim().is_empty() {
                bail!("CALLBACK_ADDRESS must not be empty when serving the workshop");
            }
        }

        if args.connect_timeout_ms == 0 {
            bail!("CONNECT_TIMEOUT_MS must be greater than 0");
        }

        Ok(Self {
            role: args.role,
            grpc_addr,
            rest_addr,
            sub_workshop_endpoint: args.sub_workshop_endpoint,
            callback_address: args.callback_address,
            connect_timeout: Duration::from_millis(args.connect_timeout_ms),
        })
    }
}
