use clap::{Args, Parser, Subcommand};
use headsup::config::{AppConfig, DEFAULT_PUSH_TIMEOUT};
use headsup::types::notice::NoticeExposure;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve { addr: SocketAddr, config: AppConfig },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Init(args)) => return RunOutcome::Exit(run_init(args)),
        Some(Command::ApiKey) => return RunOutcome::Exit(run_api_key()),
        None => {}
    }

    match resolve_config(&cli) {
        Ok(config) => RunOutcome::Serve {
            addr: cli.listen,
            config,
        },
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "headsup",
    version,
    about = "Campus placement notice feed with web push"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "HEADSUP_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
    #[arg(long, env = "HEADSUP_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, env = "HEADSUP_PUSH_KEY")]
    api_key: Option<String>,
    #[arg(long, env = "HEADSUP_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "HEADSUP_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "HEADSUP_VAPID_SUBJECT")]
    vapid_subject: Option<String>,
    #[arg(long, env = "HEADSUP_PUSH_TIMEOUT")]
    push_timeout: Option<String>,
    #[arg(long, env = "HEADSUP_NOTICE_EXPOSURE", value_enum, default_value_t = NoticeExposure::Full)]
    notice_exposure: NoticeExposure,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a VAPID key pair.
    Init(InitArgs),
    /// Generate a shared secret for the scraper.
    ApiKey,
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

fn run_init(args: InitArgs) -> i32 {
    let credentials = match headsup::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:placement-cell@example.com".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("HEADSUP_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("HEADSUP_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("HEADSUP_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace HEADSUP_VAPID_SUBJECT with a contact URI you control.");
    }
    0
}

fn run_api_key() -> i32 {
    println!("{}", headsup::auth::generate_api_key());
    0
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let push_timeout = match cli.push_timeout.as_deref() {
        Some(raw) => parse_push_timeout(raw)?,
        None => DEFAULT_PUSH_TIMEOUT,
    };

    Ok(AppConfig {
        data_dir: cli.data_dir.clone(),
        api_key: cli.api_key.clone(),
        vapid_private_key: cli.vapid_private_key.clone(),
        vapid_public_key: cli.vapid_public_key.clone(),
        vapid_subject: cli.vapid_subject.clone(),
        push_timeout,
        notice_exposure: cli.notice_exposure,
    })
}

fn parse_push_timeout(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("push timeout cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("invalid push timeout '{value}'; expected <number>[s|m|h]"))?;

    if amount == 0 {
        return Err("push timeout must be greater than 0".to_string());
    }

    let seconds = match unit {
        's' => Some(amount),
        'm' => amount.checked_mul(60),
        'h' => amount.checked_mul(60 * 60),
        _ => None,
    };
    seconds
        .map(Duration::from_secs)
        .ok_or_else(|| format!("invalid push timeout '{value}'; expected <number>[s|m|h]"))
}
