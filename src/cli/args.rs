use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cachedcomplete")]
#[command(version)]
#[command(about = "Inspect the fingerprinted object cache of a program", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fingerprint of the hashed paths
    Fingerprint(TargetArgs),
    /// Print the cache file path for the current source state
    Path(TargetArgs),
    /// Show whether a cache entry exists for the current source state
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output_format: OutputFormat,
    },
    /// Write a default configuration file
    Init,
}

/// Which program and which paths the cache is keyed on
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Main program file, or a command name to look up on PATH
    #[arg(short, long)]
    pub program: Option<String>,

    /// Source file extension to hash (overrides configuration)
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Paths whose contents affect the cached data, relative to the program
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let cli = Cli::parse_from([
            "cachedcomplete",
            "status",
            "--program",
            "/bin/myprog",
            "--output-format",
            "json",
            "pluginsA",
            "lib",
        ]);
        match cli.command {
            Commands::Status {
                target,
                output_format,
            } => {
                assert_eq!(target.program.as_deref(), Some("/bin/myprog"));
                assert_eq!(target.paths, vec![PathBuf::from("pluginsA"), PathBuf::from("lib")]);
                assert_eq!(output_format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cachedcomplete", "fingerprint", "-v", "--ext", "rb"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Fingerprint(target) => {
                assert!(target.program.is_none());
                assert_eq!(target.ext.as_deref(), Some("rb"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
