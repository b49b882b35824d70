//! Transferwisely: rebooks a pending transfer when the live rate improves.
//!
//! Entry point. Loads configuration, initialises structured logging, and
//! runs the compare → rebook → remind pass every `INTERVAL` hours until
//! Ctrl+C. `--once` runs a single pass and exits (for cron).

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use transferwisely::alerts::smtp::SmtpMailer;
use transferwisely::alerts::Mailer;
use transferwisely::config::{self, AppConfig};
use transferwisely::engine::cycle::run_once;
use transferwisely::provider::wise::WiseClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    // Missing credentials end the run before any client is built.
    let cfg = match AppConfig::load(config::DEFAULT_CONFIG_FILE) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Configuration invalid, nothing to do");
            return Ok(());
        }
    };

    info!(
        environment = ?cfg.environment,
        margin = %cfg.margin,
        interval_hours = cfg.interval_hours,
        expiry_threshold_hours = cfg.policy.expiry_threshold_hours,
        mail = cfg.mail.is_some(),
        "Transferwisely starting up"
    );

    let provider = WiseClient::new(cfg.environment, cfg.api_token.clone(), cfg.http_timeout())?;

    let mailer = match &cfg.mail {
        Some(mail_cfg) => match SmtpMailer::new(mail_cfg) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = %e, "Mail setup failed, reminders disabled");
                None
            }
        },
        None => {
            warn!("TO_MAIL, FROM_MAIL, MAIL_PASS not set, reminders disabled");
            None
        }
    };
    let mailer = mailer.as_ref().map(|m| m as &dyn Mailer);

    if std::env::args().skip(1).any(|a| a == "--once") {
        run_once(&provider, mailer, &cfg, Utc::now()).await;
        return Ok(());
    }

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(cfg.interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_hours = cfg.interval_hours,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_once(&provider, mailer, &cfg, Utc::now()).await;
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("transferwisely=info"));

    let json_logging = std::env::var("TRANSFERWISELY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
