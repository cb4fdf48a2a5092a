use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "archivist", version, about = "Teaching-archive filename parser and session grouper")]
struct Cli {
    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one or more filenames and print the resulting track records
    Parse {
        /// Filenames (or paths — only the file name component is used)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a batch of filenames and group them into sessions
    Session {
        /// Filenames belonging to one event (or paths — only the file name component is used)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Parse { files, json } => {
            let tracks: Vec<archivist::ParsedTrack> = files
                .iter()
                .map(|path| archivist::parse(&file_name_of(path)))
                .collect();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&tracks).context("Failed to serialize tracks")?
                );
            } else {
                print_track_table(&tracks);
            }
        }

        Commands::Session { files, json } => {
            let tracks: Vec<archivist::ParsedTrack> = files
                .iter()
                .map(|path| archivist::parse(&file_name_of(path)))
                .collect();
            log::debug!("parsed {} tracks, inferring sessions", tracks.len());
            let sessions = archivist::infer(&tracks);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&sessions).context("Failed to serialize sessions")?
                );
            } else {
                print_session_table(&sessions);
            }
        }
    }

    Ok(())
}

/// `parse`/`session` take path-like arguments but the parser only ever
/// operates on the file name component, matching what a directory walker
/// would hand it.
fn file_name_of(path: &PathBuf) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    log::debug!("parsing filename: {name}");
    name
}

fn print_track_table(tracks: &[archivist::ParsedTrack]) {
    println!(
        "{:<5} {:<10} {:<35} {:<6} {:<12} {:<10} {:<4}",
        "Trk", "Speaker", "Title", "Trans", "Date", "Period", "Part"
    );
    println!("{}", "-".repeat(90));

    for t in tracks {
        let title: String = if t.title.len() > 35 {
            format!("{}...", &t.title[..32])
        } else {
            t.title.clone()
        };

        if t.title.is_empty() || t.speakers.is_empty() {
            log::debug!("fallback branch hit for {}", t.original_filename);
        }

        println!(
            "{:<5} {:<10} {:<35} {:<6} {:<12} {:<10} {:<4}",
            t.track_number,
            t.speaker.as_deref().unwrap_or("-"),
            title,
            t.is_translation,
            t.date.as_deref().unwrap_or("-"),
            t.time_period.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            t.part_number.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn print_session_table(sessions: &[archivist::InferredSession]) {
    for session in sessions {
        println!(
            "Session {}: {} ({} tracks)",
            session.session_number,
            session.title_en,
            session.tracks.len()
        );
        if session.date.is_none() {
            log::debug!("session {} has no date — orphaned batch", session.session_number);
        }
        for t in &session.tracks {
            println!(
                "  {:<5} {:<10} {}",
                t.track_number,
                t.speaker.as_deref().unwrap_or("-"),
                t.title
            );
        }
        println!();
    }
}
