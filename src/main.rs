use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use hiershamir::cli::{Cli, Commands};
use hiershamir::commands::{check_participants, combine_records, split_secrets};
use hiershamir::hierarchy::HierarchyNode;
use hiershamir::record::ShareRecord;

/// Read secrets from stdin (hidden input when TTY available)
/// One secret per line, blank line to finish
fn read_secrets() -> Result<Vec<Zeroizing<String>>> {
    let secrets = if atty::is(atty::Stream::Stdin) {
        eprintln!("Enter secrets (one per line, empty line to finish):");

        let mut secrets = Vec::new();
        loop {
            let secret =
                Zeroizing::new(rpassword::read_password().context("Failed to read secret from stdin")?);

            if secret.trim().is_empty() {
                break;
            }

            secrets.push(secret);
        }
        secrets
    } else {
        read_secret_lines(io::stdin().lock())?
    };

    if secrets.is_empty() {
        bail!("No secrets provided");
    }

    Ok(secrets)
}

/// Collects lines up to the first blank one, keeping each line verbatim
///
/// Only the line terminator is dropped; surrounding whitespace is part of the
/// secret.
fn read_secret_lines(reader: impl BufRead) -> Result<Vec<Zeroizing<String>>> {
    let mut secrets = Vec::new();

    for line in reader.lines() {
        let line = Zeroizing::new(line.context("Failed to read line from stdin")?);

        if line.trim().is_empty() {
            break;
        }

        secrets.push(line);
    }

    Ok(secrets)
}

fn read_hierarchy(path: &Path) -> Result<HierarchyNode> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hierarchy file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse hierarchy file {}", path.display()))
}

fn share_file_path(out_dir: &Path, record: &ShareRecord) -> Result<PathBuf> {
    let name = record.participant.as_str();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        bail!("Participant name '{name}' cannot be used as a file name");
    }
    Ok(out_dir.join(format!("{name}_secret_share.json")))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Split { hierarchy, out_dir } => {
            let hierarchy = read_hierarchy(&hierarchy)?;
            let secrets = read_secrets()?;
            let borrowed: Vec<&str> = secrets.iter().map(|s| s.as_str()).collect();

            let records = split_secrets(&borrowed, &hierarchy)?;
            drop(borrowed);
            drop(secrets);

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            for record in &records {
                let path = share_file_path(&out_dir, record)?;
                let json = record.to_json().context("Failed to serialize share record")?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{}", path.display());
            }
        }
        Commands::Combine { files } => {
            let records = files
                .iter()
                .map(|path| {
                    let json = fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    ShareRecord::from_json(&json)
                        .with_context(|| format!("Failed to parse {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            for secret in combine_records(&records)? {
                let secret = Zeroizing::new(secret);
                println!("{}", &*secret);
            }
        }
        Commands::Check {
            hierarchy,
            participants,
        } => {
            let hierarchy = read_hierarchy(&hierarchy)?;
            if check_participants(&hierarchy, &participants)? {
                println!("recoverable");
            } else {
                println!("not recoverable");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<String> {
        read_secret_lines(input.as_bytes())
            .unwrap()
            .iter()
            .map(|s| s.as_str().to_owned())
            .collect()
    }

    #[test]
    fn test_secret_lines_keep_surrounding_whitespace() {
        assert_eq!(lines(" hunter2 \n\tsecond\t\n"), vec![" hunter2 ", "\tsecond\t"]);
    }

    #[test]
    fn test_secret_lines_stop_at_blank_line() {
        assert_eq!(lines("first\r\n   \nignored\n"), vec!["first"]);
        assert!(lines("").is_empty());
    }

    #[test]
    fn test_secret_lines_round_trip_through_split() {
        let hierarchy: HierarchyNode = serde_json::from_str(r#"[2, 3, ["A", "B", "C"]]"#).unwrap();
        let secrets = read_secret_lines(" hunter2 \n".as_bytes()).unwrap();
        let borrowed: Vec<&str> = secrets.iter().map(|s| s.as_str()).collect();

        let records = split_secrets(&borrowed, &hierarchy).unwrap();
        assert_eq!(combine_records(&records[..2]).unwrap(), vec![" hunter2 "]);
    }

    #[test]
    fn test_share_file_path_rejects_traversal() {
        let hierarchy: HierarchyNode = serde_json::from_str(r#"[2, 2, ["..", "B"]]"#).unwrap();
        let records = split_secrets(&["x"], &hierarchy).unwrap();
        assert!(share_file_path(Path::new("out"), &records[0]).is_err());
        assert_eq!(
            share_file_path(Path::new("out"), &records[1]).unwrap(),
            Path::new("out").join("B_secret_share.json")
        );
    }
}
