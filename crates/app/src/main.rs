use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{QuizConfig, QuizServices};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const ENV_DB_URL: &str = "QUIZ_DB_URL";
const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

struct DesktopApp {
    quiz_services: QuizServices,
}

impl UiApp for DesktopApp {
    fn quiz_services(&self) -> QuizServices {
        self.quiz_services.clone()
    }
}

struct Args {
    db_url: String,
    prompt_url: Option<String>,
    answer_delay: Option<Duration>,
    distractor_count: Option<usize>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--prompt-url <base_url>] \
         [--answer-delay-ms <ms>] [--choices <n>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --prompt-url http://127.0.0.1:8080");
    eprintln!("  --answer-delay-ms 1200");
    eprintln!("  --choices <taken from the first prompt>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  QUIZ_DB_URL, QUIZ_PROMPT_URL, QUIZ_ANSWER_DELAY_MS, QUIZ_DISTRACTORS, \
         QUIZ_REQUEST_TIMEOUT_SECS, RUST_LOG"
    );
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var(ENV_DB_URL)
                .ok()
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            prompt_url: None,
            answer_delay: None,
            distractor_count: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--prompt-url" => {
                    parsed.prompt_url = Some(require_value(args, "--prompt-url")?);
                }
                "--answer-delay-ms" => {
                    let value = require_value(args, "--answer-delay-ms")?;
                    let millis: u64 = parse_number(value, "--answer-delay-ms")?;
                    parsed.answer_delay = Some(Duration::from_millis(millis));
                }
                "--choices" => {
                    let value = require_value(args, "--choices")?;
                    let choices: usize = parse_number(value.clone(), "--choices")?;
                    // One of the choices is always the answer.
                    let distractors = choices
                        .checked_sub(1)
                        .ok_or(ArgsError::InvalidNumber {
                            flag: "--choices",
                            raw: value,
                        })?;
                    parsed.distractor_count = Some(distractors);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// Flags win over the environment.
    fn apply(&self, config: &mut QuizConfig) {
        if let Some(url) = &self.prompt_url {
            config.prompt_base_url.clone_from(url);
        }
        if let Some(delay) = self.answer_delay {
            config.answer_delay = delay;
        }
        if let Some(count) = self.distractor_count {
            config.distractor_count = Some(count);
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = QuizConfig::from_env()?;
    args.apply(&mut config);

    // The score lives in SQLite; make sure the file exists before connecting.
    prepare_sqlite_file(&args.db_url)?;
    let quiz_services = QuizServices::new_sqlite(&args.db_url, config).await?;
    info!(
        db = %args.db_url,
        prompt_url = %quiz_services.config().prompt_base_url,
        "quiz services ready"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { quiz_services });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Guess the Song")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "startup failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
