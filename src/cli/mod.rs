use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::repack::DEFAULT_PREFIX;

/// Environment variable consulted for the destination prefix when `--prefix` is not given.
pub const PREFIX_ENV: &str = "APIGEE_REPACK_PREFIX";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Add config and plugin directories to an application archive, producing a new archive.
    #[command(alias = "r")]
    Repack {
        /// The application archive (e.g. a .jar or .war) to repackage.
        #[arg(short, long)]
        archive: PathBuf,

        /// Directory that contains the microgateway configuration yaml.
        #[arg(short, long)]
        config: PathBuf,

        /// Directory that contains custom plugins.
        #[arg(short, long)]
        plugins: Option<PathBuf>,

        /// Where to write the repacked archive. Defaults to the prefixed archive name next to
        /// the original. Must not be the archive itself.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File-name prefix for the derived output path. Falls back to APIGEE_REPACK_PREFIX,
        /// then "apigee_". Must not be empty.
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Extract an archive into a directory, optionally merging config and plugin directories.
    #[command(alias = "x")]
    Extract {
        /// The archive file to extract.
        #[arg(required = true)]
        archive: PathBuf,

        /// The directory where entries will be extracted.
        #[arg(short, long)]
        output: PathBuf,

        /// Directory to merge into the output under its own name.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Second directory to merge into the output under its own name.
        #[arg(short, long)]
        plugins: Option<PathBuf>,
    },

    /// Compress a directory into a new archive.
    #[command(alias = "c")]
    Compress {
        /// The directory whose contents become the archive's entries.
        #[arg(required = true)]
        source: PathBuf,

        /// The path for the output archive file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the entries of an archive with their compression method and mode.
    #[command(alias = "l")]
    List {
        /// The archive file to list contents of.
        #[arg(required = true)]
        archive: PathBuf,
    },
}

/// Resolves the destination prefix.
///
/// Priority:
/// 1. `--prefix` command-line argument.
/// 2. `APIGEE_REPACK_PREFIX` environment variable.
/// 3. [`DEFAULT_PREFIX`].
pub fn prefix_from_opt_or_env(prefix_opt: Option<String>) -> String {
    if let Some(prefix) = prefix_opt {
        return prefix;
    }
    if let Ok(prefix) = std::env::var(PREFIX_ENV) {
        return prefix;
    }
    DEFAULT_PREFIX.to_string()
}

/// Parses command-line arguments using `clap`.
///
/// Invalid arguments, `--help` and `--version` are handled by clap, which exits the process.
pub fn run() -> Result<Args, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_prefix_wins() {
        assert_eq!(prefix_from_opt_or_env(Some("mine_".into())), "mine_");
    }

    #[test]
    fn parses_repack_with_optional_plugins() {
        let args = Args::try_parse_from([
            "apigee-repack",
            "repack",
            "--archive",
            "app.jar",
            "--config",
            "conf",
        ])
        .unwrap();
        match args.command {
            Commands::Repack { archive, config, plugins, output, prefix } => {
                assert_eq!(archive, PathBuf::from("app.jar"));
                assert_eq!(config, PathBuf::from("conf"));
                assert!(plugins.is_none());
                assert!(output.is_none());
                assert!(prefix.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
