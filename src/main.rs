use anyhow::Result;
use clap::{Arg, Command};
use tracing::{debug, error, info};

use lms_progress_rust::target::parse_duration_minutes;
use lms_progress_rust::{log_filter, Config, LmsSession, TargetReference};

fn cli() -> Command {
    Command::new("LMS Progress (Rust)")
        .version("0.1.0")
        .about("Automated video watch-progress updates for the LMS")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Full URL of the LMS video page")
                .required(true),
        )
        .arg(
            Arg::new("minutes")
                .value_name("MINUTES")
                .help("Watch duration in minutes (default: taken from the page)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            // Usage mistakes are invalid input, so exit 1 rather than
            // clap's default 2. Help and version output stay exit 0.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize logging
    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .init();

    let url = matches.get_one::<String>("url").unwrap().clone();

    info!("🚀 LMS Progress (Rust) starting...");

    let target = match TargetReference::parse(&url) {
        Ok(target) => target,
        Err(e) => {
            error!("❌ {}", e);
            return Err(anyhow::anyhow!("invalid video page URL"));
        }
    };

    let duration_override = match matches.get_one::<String>("minutes") {
        Some(raw) => match parse_duration_minutes(raw) {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                error!("❌ {}", e);
                return Err(anyhow::anyhow!("invalid duration argument"));
            }
        },
        None => None,
    };

    // Load configuration
    let config = Config::load()?;
    config.validate()?;
    debug!("{}", config.summary());

    let session = LmsSession::new(config)?;
    match session.run(&url, &target, duration_override).await {
        Ok(reply) => {
            info!("🎉 Success! Server replied: {}", reply);
            Ok(())
        }
        Err(e) => {
            error!("❌ {}", e);
            Err(e.into())
        }
    }
}
