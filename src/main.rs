use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gsti::index::build::{self, BuildOptions};
use gsti::index::{Propagation, SuffixIndex, stats};
use gsti::output;
use gsti::utils::normalize_key;
use log::LevelFilter;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gsti")]
#[command(about = "Substring index over dictionaries of short keys")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a dictionary with one key per line
    Build {
        /// Dictionary file
        dict: PathBuf,

        /// Base path of the index files (defaults to the dictionary path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        keys: KeyArgs,

        /// Attach ids only at suffix endpoints and propagate once at the end
        #[arg(long)]
        deferred: bool,

        /// Do not show progress
        #[arg(long)]
        no_progress: bool,
    },
    /// List the ids of all keys containing a word
    Search {
        /// Base path of the index files
        index: PathBuf,

        word: String,

        /// Dictionary to print the matching keys from
        #[arg(short, long)]
        dict: Option<PathBuf>,

        /// Maximum number of ids to print
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Show the longest prefix of a word present in the index
    Match {
        /// Base path of the index files
        index: PathBuf,

        word: String,

        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Find the longest substring of a text present in the index
    Longest {
        /// Base path of the index files
        index: PathBuf,

        text: String,

        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Show index statistics
    Stats {
        /// Base path of the index files
        index: PathBuf,
    },
    /// Check every dictionary key against the index
    Verify {
        /// Base path of the index files
        index: PathBuf,

        /// Dictionary the index was built from
        dict: PathBuf,

        #[command(flatten)]
        keys: KeyArgs,

        /// Do not show progress
        #[arg(long)]
        no_progress: bool,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Lowercase keys and keep only ASCII letters and digits
    #[arg(short, long)]
    normalize: bool,
}

impl KeyArgs {
    fn apply<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if self.normalize {
            Cow::Owned(normalize_key(word))
        } else {
            Cow::Borrowed(word)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let color = !cli.no_color;

    match cli.command {
        Commands::Build {
            dict,
            output,
            keys,
            deferred,
            no_progress,
        } => {
            let options = BuildOptions {
                normalize: keys.normalize,
                propagation: if deferred {
                    Propagation::Deferred
                } else {
                    Propagation::Eager
                },
                progress: !no_progress,
            };
            let base = output.unwrap_or_else(|| dict.clone());
            let index = build::build_from_file(&dict, &options)?.freeze();
            index
                .save(&base)
                .with_context(|| format!("Failed to save index to {}", base.display()))?;
            println!(
                "Indexed {} keys into {} nodes: {}",
                index.meta().key_count,
                index.meta().node_count,
                base.display()
            );
        }
        Commands::Search {
            index,
            word,
            dict,
            limit,
            keys,
        } => {
            let index = open(&index)?;
            let word = keys.apply(&word);
            let lines = dict.as_deref().map(build::read_lines).transpose()?;
            match index.search(&word) {
                Some(ids) => {
                    let mut out = output::stdout(color);
                    output::write_search_hits(&mut out, &word, ids, lines.as_deref(), limit)?;
                }
                None => {
                    eprintln!("No keys contain {:?}", word);
                    std::process::exit(1);
                }
            }
        }
        Commands::Match { index, word, keys } => {
            let index = open(&index)?;
            let word = keys.apply(&word);
            let matched = index.match_prefix(&word);
            let mut out = output::stdout(color);
            output::write_match(&mut out, &word, matched)?;
        }
        Commands::Longest { index, text, keys } => {
            let index = open(&index)?;
            let text = keys.apply(&text);
            let found = index.longest_substring(&text);
            let mut out = output::stdout(color);
            if found.is_empty() {
                writeln!(out, "No substring of {:?} is indexed", text)?;
            } else {
                let ids = index.search(found).map_or(0, |ids| ids.len());
                writeln!(out, "{} ({} keys)", found, ids)?;
            }
        }
        Commands::Stats { index } => {
            stats::show_stats(&index)?;
        }
        Commands::Verify {
            index,
            dict,
            keys,
            no_progress,
        } => {
            let index = open(&index)?;
            let lines = build::read_lines(&dict)?;
            let options = BuildOptions {
                normalize: keys.normalize,
                progress: !no_progress,
                ..BuildOptions::default()
            };
            let report = build::verify_keys(&index, &lines, &options)?;
            let mut out = output::stdout(color);
            output::write_verify_report(&mut out, &report)?;
            if !report.is_ok() {
                anyhow::bail!("{} keys failed verification", report.failures.len());
            }
        }
    }

    Ok(())
}

fn open(base: &Path) -> Result<SuffixIndex> {
    SuffixIndex::open(base).with_context(|| format!("Failed to open index {}", base.display()))
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level from warn
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .init();
}
