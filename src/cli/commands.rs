use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{init_config, load_config, load_config_file, Config},
    cache::{self, ObjectCache},
    program::Program,
};

use super::{Cli, Commands, OutputFormat, TargetArgs};

/// Handle CLI subcommands
pub fn handle_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Init => {
            let (path, created) = init_config()?;
            if created {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration already exists at: {}", path.display());
            }
            Ok(())
        }
        Commands::Fingerprint(target) => {
            let cache = open_cache(cli, target)?;
            println!("{}", cache.fingerprint());
            Ok(())
        }
        Commands::Path(target) => {
            let cache = open_cache(cli, target)?;
            println!("{}", cache.cache_path().display());
            Ok(())
        }
        Commands::Status {
            target,
            output_format,
        } => {
            let cache = open_cache(cli, target)?;
            show_status(&cache, *output_format)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => load_config_file(path),
        None => load_config(),
    }
}

fn open_cache(cli: &Cli, target: &TargetArgs) -> Result<ObjectCache<Program>> {
    let mut config = resolve_config(cli)?;
    if let Some(ext) = &target.ext {
        config.source_extension = ext.trim_start_matches('.').to_string();
    }

    let program = match &target.program {
        Some(name) => Program::from_command(name),
        None => Program::unidentified(),
    }
    .hash_paths(target.paths.iter().cloned());

    Ok(cache::init(program, &config))
}

/// Show cache status for one program
fn show_status(cache: &ObjectCache<Program>, format: OutputFormat) -> Result<()> {
    let status = cache.status();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Text => {
            println!("{}", status.format());
            println!();
            if !status.identity_exists {
                println!("  [WARNING] {}", "Program file not found; caching is disabled".yellow());
            } else if status.entry_present {
                println!("  [OK] {}", "Cache entry is current".green());
            } else {
                println!("  [MISS] {}", "No entry for the current sources".red());
            }
        }
    }

    Ok(())
}
