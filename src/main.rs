use std::path::PathBuf;

use clap::{Parser, Subcommand};
use complaint_index::Result;
use complaint_index::commands::{init_config, run_index, show_config, show_status};

#[derive(Parser)]
#[command(name = "complaint-index")]
#[command(about = "Builds a searchable semantic index over consumer complaint narratives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed, and index a cleaned complaints CSV
    Index {
        /// Path to the cleaned complaints CSV (requires Product and
        /// clean_narrative columns)
        file: PathBuf,
        /// Number of records to sample from the corpus
        #[arg(long)]
        sample_size: Option<usize>,
        /// Collection name to index into
        #[arg(long)]
        collection: Option<String>,
        /// Override the data directory holding config and the vector store
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show the persisted collection's size and location
    Status {
        /// Collection name to inspect
        #[arg(long)]
        collection: Option<String>,
        /// Override the data directory holding config and the vector store
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Inspect or initialize the configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
        /// Override the data directory holding config and the vector store
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            file,
            sample_size,
            collection,
            data_dir,
        } => {
            run_index(&file, data_dir.as_deref(), sample_size, collection).await?;
        }
        Commands::Status {
            collection,
            data_dir,
        } => {
            show_status(data_dir.as_deref(), collection).await?;
        }
        Commands::Config { show, data_dir } => {
            if show {
                show_config(data_dir.as_deref())?;
            } else {
                init_config(data_dir.as_deref())?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["complaint-index", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Status { .. }));
        }
    }

    #[test]
    fn index_command_with_file() {
        let cli = Cli::try_parse_from(["complaint-index", "index", "complaints.csv"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Index {
                file, sample_size, ..
            } = parsed.command
            {
                assert_eq!(file, PathBuf::from("complaints.csv"));
                assert_eq!(sample_size, None);
            }
        }
    }

    #[test]
    fn index_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "complaint-index",
            "index",
            "complaints.csv",
            "--sample-size",
            "500",
            "--collection",
            "complaints_dev",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Index {
                sample_size,
                collection,
                ..
            } = parsed.command
            {
                assert_eq!(sample_size, Some(500));
                assert_eq!(collection, Some("complaints_dev".to_string()));
            }
        }
    }

    #[test]
    fn index_command_requires_file() {
        let cli = Cli::try_parse_from(["complaint-index", "index"]);
        assert!(cli.is_err());
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["complaint-index", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show, .. } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["complaint-index", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["complaint-index", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
