//! Command-line arguments (clap derive API).

use std::path::PathBuf;

use clap::Parser;

/// Structural design assistant
///
/// Chat with an AI assistant, or switch to design mode to inspect element
/// properties and compute KDS/CSA design capacities.
#[derive(Parser, Debug)]
#[command(name = "capacity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (default: ./appsettings.json if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Store connection string (file://<dir> or a directory path)
    #[arg(long, value_name = "CONNECTION")]
    pub store: Option<String>,

    /// Database name inside the store
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Disable the chat completion service
    #[arg(long)]
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["capacity", "--store", "file:///srv/db", "--log", "debug"]);
        assert_eq!(cli.store.as_deref(), Some("file:///srv/db"));
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(!cli.offline);
        assert!(cli.config.is_none());
    }
}
