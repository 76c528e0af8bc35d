use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hiershamir")]
#[command(about = "Split secrets across a hierarchy of n-of-m quorums and recover them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split secrets (read from stdin, one per line) into per-participant share files
    Split {
        /// JSON hierarchy definition, e.g. [2, 3, ["Nick", "Alice", "Bob"]]
        #[arg(long)]
        hierarchy: PathBuf,

        /// Directory to write `<participant>_secret_share.json` files into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Recover secrets from participant share files
    Combine {
        /// Share files, one per participant
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check whether a set of participants satisfies a hierarchy
    Check {
        /// JSON hierarchy definition
        #[arg(long)]
        hierarchy: PathBuf,

        /// Participant names
        #[arg(required = true)]
        participants: Vec<String>,
    },
}
