//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Inspect and manage a persistent cookie jar.
///
/// Cookiejar parses Set-Cookie headers, enforces domain scoping rules and
/// keeps the accepted cookies in a store that survives restarts.
#[derive(Parser, Debug)]
#[command(name = "cookiejar")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cookie store file (default: ~/.config/cookiejar/cookies.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Encrypt the store at rest (key material from COOKIEJAR_MASTER_KEY)
    #[arg(long, global = true)]
    pub encrypt: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a Set-Cookie header and store the accepted cookies
    Set(SetArgs),
    /// Store bare `name=value; ...` pairs for a trusted host
    AddRaw(AddRawArgs),
    /// List stored cookies grouped by base domain
    List(ListArgs),
    /// Remove expired cookies
    Sweep,
    /// Remove every stored cookie
    Clear,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Request URL the header came from (supplies host and default path)
    #[arg(long, conflicts_with = "host", required_unless_present = "host")]
    pub url: Option<String>,

    /// Host the header came from
    #[arg(long)]
    pub host: Option<String>,

    /// Default cookie path (overrides the URL-derived path)
    #[arg(long)]
    pub path: Option<String>,

    /// Raw Set-Cookie header value; several cookies may be comma-separated
    pub header: String,
}

/// Arguments for `add-raw`.
#[derive(Args, Debug)]
pub struct AddRawArgs {
    /// Host stamped on every cookie
    #[arg(long)]
    pub host: String,

    /// Cookie pairs, e.g. "a=1; b=2"
    pub raw: String,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only cookies a request to this host would carry
    #[arg(long)]
    pub host: Option<String>,

    /// Request path used with --host
    #[arg(long, default_value = "/", requires = "host")]
    pub path: String,

    /// Treat the request as HTTPS (include secure cookies)
    #[arg(long, requires = "host")]
    pub secure: bool,

    /// Print cookie values instead of redacting them
    #[arg(long)]
    pub show_values: bool,

    /// Print only the Cookie request header value for --host
    #[arg(long, requires = "host")]
    pub header: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}
