//! Command-line argument definitions for the dfdgen CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the listen address, configuration file
//! selection, the renderer program, and logging verbosity.

use std::net::Ipv6Addr;

use clap::Parser;

/// Command-line arguments for the dfdgen web front end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8501)]
    pub port: u16,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Renderer program, overriding the configuration file
    #[arg(long)]
    pub tool: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Returns the `host:port` listen address, bracketing IPv6 hosts.
    pub fn listen_addr(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["dfdgen"]);
        assert_eq!(args.listen_addr(), "127.0.0.1:8501");
        assert!(args.config.is_none());
        assert!(args.tool.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "dfdgen",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--tool",
            "/opt/bin/data-flow-diagram",
            "-c",
            "dfdgen.toml",
        ]);
        assert_eq!(args.listen_addr(), "0.0.0.0:9000");
        assert_eq!(args.tool.as_deref(), Some("/opt/bin/data-flow-diagram"));
        assert_eq!(args.config.as_deref(), Some("dfdgen.toml"));
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let args = Args::parse_from(["dfdgen", "--host", "::1"]);
        assert_eq!(args.listen_addr(), "[::1]:8501");
        assert!(args.listen_addr().parse::<std::net::SocketAddr>().is_ok());

        let args = Args::parse_from(["dfdgen", "--host", "localhost", "-p", "9000"]);
        assert_eq!(args.listen_addr(), "localhost:9000");
    }
}
