use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use log::{info, warn};
use services::config::parse_base_url;
use services::{ApiConfig, AuthToken, HttpPracticeApi};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDelay { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDelay { raw } => write!(f, "invalid --reveal-delay-ms value: {raw}"),
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

struct DesktopApp {
    token: AuthToken,
    config: ApiConfig,
    api: Arc<HttpPracticeApi>,
}

impl UiApp for DesktopApp {
    fn token(&self) -> AuthToken {
        self.token.clone()
    }

    fn config(&self) -> ApiConfig {
        self.config.clone()
    }

    fn api(&self) -> Arc<HttpPracticeApi> {
        Arc::clone(&self.api)
    }
}

#[derive(Debug, Default)]
struct Args {
    api_url: Option<String>,
    token: Option<String>,
    reveal_delay: Option<Duration>,
    help: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--token <token>] [--reveal-delay-ms <ms>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url http://localhost:8000");
    eprintln!("  --reveal-delay-ms 500");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_TOKEN, QUIZ_REVEAL_DELAY_MS, QUIZ_HTTP_TIMEOUT_SECS");
    eprintln!("  RUST_LOG controls log output, e.g. RUST_LOG=services=debug");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => parsed.api_url = Some(require_value(args, "--api-url")?),
                "--token" => parsed.token = Some(require_value(args, "--token")?),
                "--reveal-delay-ms" => {
                    let value = require_value(args, "--reveal-delay-ms")?;
                    let millis: u64 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidDelay { raw: value.clone() })?;
                    parsed.reveal_delay = Some(Duration::from_millis(millis));
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Environment first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<ApiConfig, Box<dyn std::error::Error>> {
    let mut config = ApiConfig::from_env()?;
    if let Some(raw) = &args.api_url {
        config.base_url = parse_base_url(raw)?;
    }
    if let Some(delay) = args.reveal_delay {
        config.reveal_delay = delay;
    }
    Ok(config)
}

fn resolve_token(args: &Args) -> AuthToken {
    args.token
        .clone()
        .or_else(|| std::env::var("QUIZ_TOKEN").ok())
        .map_or_else(AuthToken::missing, AuthToken::new)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }

    let config = resolve_config(&args)?;
    let token = resolve_token(&args);
    if token.is_missing() {
        warn!("no auth token supplied; requests will fail until one is set via --token or QUIZ_TOKEN");
    }

    let api = Arc::new(HttpPracticeApi::new(&config)?);
    info!("practice backend at {}", api.base_url());

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { token, config, api });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title(ui::vm::APP_TITLE)
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_all_flags() {
        let args = parse(&["--api-url", "http://h:9/api", "--token", "t", "--reveal-delay-ms", "250"])
            .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://h:9/api"));
        assert_eq!(args.token.as_deref(), Some("t"));
        assert_eq!(args.reveal_delay, Some(Duration::from_millis(250)));
        assert!(!args.help);
    }

    #[test]
    fn flag_without_value_is_an_error() {
        let err = parse(&["--token"]).unwrap_err();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--token" }));
    }

    #[test]
    fn rejects_unknown_and_malformed_args() {
        assert!(matches!(parse(&["--db"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["--reveal-delay-ms", "soon"]),
            Err(ArgsError::InvalidDelay { .. })
        ));
    }
}
