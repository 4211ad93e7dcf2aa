//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// ACL store - named access control lists over a key-value backend
#[derive(Parser, Debug)]
#[command(name = "aclstore", version)]
#[command(about = "ACL store server and administration tool", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ACLSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the ACL server
    Serve,

    /// Print the members of an ACL
    Get {
        /// ACL name
        name: String,
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Replace the members of an ACL
    Set {
        /// ACL name
        name: String,
        /// New members (none empties the ACL)
        users: Vec<String>,
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Add members to an ACL
    Add {
        /// ACL name
        name: String,
        /// Users to add
        #[arg(required = true)]
        users: Vec<String>,
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Remove members from an ACL
    Remove {
        /// ACL name
        name: String,
        /// Users to remove
        #[arg(required = true)]
        users: Vec<String>,
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// List all ACL names
    List {
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Configuration file management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where and as whom to reach a running server.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Server root URL
    #[arg(long, env = "ACLSTORE_URL", default_value = "http://127.0.0.1:8080")]
    pub url: String,

    /// Bearer token
    #[arg(long, env = "ACLSTORE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Write a default config file
    Init {
        /// Write here instead of the default location
        #[arg(long)]
        file: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
