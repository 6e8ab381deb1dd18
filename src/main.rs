// src/main.rs
// sillygen - terminal front end for the idea pipeline

use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use sillygen::{
    Category, Companionship, Config, IdeaError, IdeaPipeline, RunView, Selection, Session,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sillygen")]
#[command(about = "Generate a silly video idea in a familiar creator's style")]
#[command(version)]
struct Cli {
    /// Profile variant: mates, classic or instant
    #[arg(long, global = true, env = "SILLYGEN_PROFILE")]
    profile: Option<String>,

    /// Log request details (debug level)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one idea and exit
    Generate {
        /// prank, bet (social-experiment) or challenge
        #[arg(short, long, value_parser = parse_category)]
        category: Category,

        /// alone, friends or new-friends (mates profile only)
        #[arg(short, long, value_parser = parse_companionship)]
        mates: Option<Companionship>,

        /// Print the run view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one request per line: `<category> [<companionship>]` (default)
    Interactive,
}

fn parse_category(s: &str) -> std::result::Result<Category, String> {
    s.parse().map_err(|e: IdeaError| e.to_string())
}

fn parse_companionship(s: &str) -> std::result::Result<Companionship, String> {
    s.parse().map_err(|e: IdeaError| e.to_string())
}

/// Exit status for a startup failure: 2 for bad configuration, 1 otherwise
fn startup_exit_code(err: &IdeaError) -> i32 {
    if err.is_fatal() { 2 } else { 1 }
}

fn build_session(config: &Config) -> sillygen::Result<Session> {
    let pipeline = Arc::new(IdeaPipeline::from_config(config)?);
    Ok(Session::new(pipeline))
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = if verbose > 0 { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn render(view: &RunView) {
    if let Some(message) = view.error_message() {
        println!("{message}");
        return;
    }
    let Some(idea) = view.card() else {
        println!("Nothing came back this time.");
        return;
    };

    println!();
    println!("  {}", idea.title);
    println!();
    println!("  {}", idea.description);
    if let Some(plan) = idea.plan.as_deref().filter(|p| !p.is_empty()) {
        println!();
        println!("  Execution Plan:");
        for line in plan.lines() {
            println!("    {line}");
        }
    }
    println!();
}

fn parse_request_line(line: &str) -> std::result::Result<Selection, String> {
    let mut parts = line.split_whitespace();
    let category = parts
        .next()
        .ok_or_else(|| "expected a category".to_string())
        .and_then(parse_category)?;
    let rest: Vec<&str> = parts.collect();
    let mut selection = Selection::new(category);
    if !rest.is_empty() {
        selection = selection.with_companionship(parse_companionship(&rest.join(" "))?);
    }
    Ok(selection)
}

async fn run_interactive(mut session: Session) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Pick a category: prank, bet, challenge (optionally followed by alone, friends, new-friends).");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        match parse_request_line(line) {
            Ok(selection) => {
                if !session.is_enabled() {
                    println!("Still working on the last one...");
                    continue;
                }
                println!("Generating your idea...");
                let view = session.submit(selection).await;
                render(&view);
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let profile_override = cli.profile.clone();
    let startup = Config::from_lookup(|key| match key {
        "SILLYGEN_PROFILE" => profile_override.clone(),
        _ => std::env::var(key).ok(),
    })
    .and_then(|config| build_session(&config).map(|session| (config, session)));
    let (config, session) = match startup {
        Ok(ready) => ready,
        Err(e) => {
            eprintln!("sillygen cannot start: {e}");
            std::process::exit(startup_exit_code(&e));
        }
    };
    info!(profile = %config.profile.kind, "Session ready");

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Generate {
            category,
            mates,
            json,
        } => {
            let mut session = session;
            let mut selection = Selection::new(category);
            if let Some(mates) = mates {
                selection = selection.with_companionship(mates);
            }
            let view = session.submit(selection).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                render(&view);
            }
            if view.had_error {
                std::process::exit(1);
            }
        }
        Commands::Interactive => run_interactive(session).await?,
    }

    Ok(())
}
