//! Reusable CLI runner: parses arguments, sets up logging and dispatches to the library.

use crate::cli::{self, Commands};
use crate::repack::RepackOptions;
use crate::{compress, extract, repack};

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::run()?;
    init_logging(args.verbose);

    match args.command {
        Commands::Repack { archive, config, plugins, output, prefix } => {
            let prefix = cli::prefix_from_opt_or_env(prefix);
            let mut options = RepackOptions::new(archive, config).with_prefix(prefix);
            if let Some(plugins) = plugins {
                options = options.with_plugins(plugins);
            }
            if let Some(output) = output {
                options = options.with_output(output);
            }

            let repacked = repack::repack(&options)?;
            println!("{}", repacked.display());
        }
        Commands::Extract { archive, output, config, plugins } => {
            let count = extract::unpack(&archive, &output)?;
            println!("Extracted {} entries to {}", count, output.display());

            for dir in config.iter().chain(plugins.iter()) {
                let merged = extract::merge_dir(&output, dir)?;
                println!("Merged {} into {}", dir.display(), merged.display());
            }
        }
        Commands::Compress { source, output } => {
            let written = compress::compress_dir(&source, &output)?;
            println!("{}", written.display());
        }
        Commands::List { archive } => {
            let entries = extract::list_entries(&archive)?;
            println!("Archive Index ({} entries):", entries.len());
            for entry in entries {
                let mode = entry
                    .permissions
                    .map(|m| format!("{:04o}", m))
                    .unwrap_or_else(|| "----".into());
                println!(
                    "- {} [{}] {} ({} bytes)",
                    entry.name,
                    entry.method_name(),
                    mode,
                    entry.size
                );
            }
        }
    }

    Ok(())
}

/// Routes `tracing` events through `env_logger`. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
