//! Tag-driven follow/like/comment automation.
//!
//! Iterates configured tags, acts on eligible candidates within per-tag
//! quotas, retries transient failures and reports the outcome by log and
//! mail.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use instabot::engine::{Engine, RunResult, render_and_notify};
use instabot::error::EngineError;
use instabot::exit_codes;
use instabot::io::config::{BotConfig, load_config};
use instabot::io::fixture_client::FixtureClient;
use instabot::io::notifier::{MailNotifier, Notifier};
use instabot::io::smtp::SmtpTransport;
use instabot::logging;
use instabot::retry::ThreadSleeper;

const CONFIG_PATH: &str = "config/config.toml";
const DEV_CONFIG_PATH: &str = "local/config.toml";

#[derive(Parser)]
#[command(
    name = "instabot",
    version,
    about = "Follow, like and comment under tags within quotas"
)]
struct Cli {
    /// Config file (default: config/config.toml, or local/config.toml with --dev).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Development mode: read local/config.toml.
    #[arg(long, global = true)]
    dev: bool,

    /// Disable mail notifications.
    #[arg(long, global = true)]
    nomail: bool,

    /// Also write logs to instabot-<timestamp>.log.
    #[arg(long, global = true)]
    logs: bool,

    /// Never act twice on the same user in this run.
    #[arg(long, global = true)]
    noduplicate: bool,

    /// Account snapshot served by the fixture client.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow, like and comment under the configured tags.
    Run {
        /// Run a random subset of the configured tags.
        #[arg(long, requires = "amount")]
        randtag: bool,

        /// Number of tags to sample with --randtag.
        #[arg(long)]
        amount: Option<usize>,
    },
    /// Unfollow accounts that do not follow back.
    Sync,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.logs) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::Unrecoverable { .. }) => exit_codes::ABORTED,
        _ => exit_codes::INVALID,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(|| {
        PathBuf::from(if cli.dev { DEV_CONFIG_PATH } else { CONFIG_PATH })
    });
    let mut config = load_config(&config_path)?;
    info!(path = %config_path.display(), "using config");
    if cli.noduplicate {
        config.dedup = true;
    }

    let Some(fixture_path) = cli.fixture.as_deref() else {
        bail!("--fixture is required: no other remote client is built in");
    };
    let client = FixtureClient::load(fixture_path).context("load fixture client")?;
    let notifier = mail_notifier(&config, cli.nomail);
    let sleeper = ThreadSleeper;
    let engine = Engine::new(&config, &client, &notifier, &sleeper);

    let result = match cli.command {
        Command::Run { randtag, amount } => {
            let mut rng = rand::thread_rng();
            match (randtag, amount) {
                (true, Some(amount)) => engine.run_multi_tag_loop(amount, &mut rng)?,
                _ => engine.run_tag_loop(&mut rng)?,
            }
        }
        Command::Sync => engine.run_unfollow_sync()?,
    };

    finish(&result, &notifier);
    Ok(())
}

/// Mail notifier when enabled and configured; otherwise notifications are
/// log-only.
fn mail_notifier(config: &BotConfig, nomail: bool) -> Option<MailNotifier<SmtpTransport>> {
    if nomail {
        return None;
    }
    match &config.user.mail {
        Some(mail) => Some(MailNotifier::new(mail.clone(), SmtpTransport::default())),
        None => {
            info!("no user.mail section, notifications are log-only");
            None
        }
    }
}

fn finish<N: Notifier>(result: &RunResult, notifier: &N) {
    let body = render_and_notify(result, notifier);
    println!("{}", body);
}
