use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use bagger_common::command::{CommandRunner, RunOptions, RunnerConfig};
use bagger_common::persistence::{EventDb, MergeOutcome, parse_events, render_events};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "bagger-db",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and update bagger event logs"
)]
struct Cli {
    /// Log every command run and every merge decision
    #[arg(short, long, global = true, env = "BAGGER_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the events recorded in a log
    Show {
        db: PathBuf,
        /// Print one JSON object per event instead of the log format
        #[arg(long)]
        json: bool,
    },

    /// Merge a batch of events read from stdin (log format) into a log
    Update { db: PathBuf },

    /// Run a shell command and print its output
    Run {
        command: String,
        /// Print status, stdout and stderr instead of failing on non-zero exit
        #[arg(long)]
        allow_failure: bool,
        /// Working directory for the command
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Text to feed to the command's stdin
        #[arg(long)]
        input: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "bagger_common=debug,bagger_db=debug"
    } else {
        "bagger_common=info,bagger_db=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("FAIL: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Commands::Show { db, json } => {
            let events = EventDb::new(&db)
                .load()
                .with_context(|| format!("reading {}", db.display()))?;
            if json {
                for event in &events {
                    println!("{}", serde_json::to_string(event)?);
                }
            } else {
                print!("{}", render_events(&events));
            }
        }

        Commands::Update { db } => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading events from stdin")?;
            let batch = parse_events(&text).context("parsing events from stdin")?;
            if batch.is_empty() {
                bail!("no events on stdin");
            }

            let outcome = EventDb::new(&db)
                .update(&batch)
                .with_context(|| format!("updating {}", db.display()))?;
            match outcome {
                MergeOutcome::UpToDate => println!("up to date"),
                MergeOutcome::Extended { appended } => println!("{appended} new event(s)"),
                MergeOutcome::Gap { appended } => {
                    println!("gap in coverage, appended {appended} event(s)")
                }
            }
        }

        Commands::Run {
            command,
            allow_failure,
            dir,
            input,
        } => {
            let runner = CommandRunner::new(RunnerConfig::default().with_verbosity(cli.verbose));
            let mut opts = RunOptions::new();
            opts.from_dir = dir;
            opts.input = input;

            if allow_failure {
                let out = runner.run_allow_failure(&command, &opts)?;
                println!("status: {}", out.status);
                println!("stdout: {}", out.stdout);
                println!("stderr: {}", out.stderr);
            } else {
                println!("{}", runner.run(&command, &opts)?);
            }
        }
    }

    Ok(())
}
