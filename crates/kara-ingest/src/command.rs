// argv parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clean scraped channel messages and load them into Postgres.
#[derive(Debug, Parser)]
#[command(name = "kara-ingest", version)]
pub struct Cli {
    /// dotenv file to load before reading configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub env: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Clean scraped messages into a preprocessed csv
    Clean {
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Load a preprocessed csv into postgres
    Push {
        #[arg(long, value_name = "PATH")]
        data: Option<PathBuf>,
    },
    /// Clean one message and print it
    Text {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}
