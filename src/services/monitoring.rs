//! Monitoring with Sentry integration
//!
//! Error reporting is optional: without SENTRY_DSN every report degrades to
//! a tracing log line.

use std::env;
use tracing::{error, info};

/// Initialize Sentry from the environment. The returned guard must be held
/// for the lifetime of the process so queued events get flushed on shutdown.
pub fn init() -> Option<sentry::ClientInitGuard> {
    let dsn = match env::var("SENTRY_DSN") {
        Ok(dsn) if !dsn.is_empty() => dsn,
        _ => {
            info!("SENTRY_DSN not configured, error reporting disabled");
            return None;
        }
    };

    let environment = env::var("SENTRY_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            environment: Some(environment.clone().into()),
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    info!(environment = %environment, "Sentry error reporting initialized");

    Some(guard)
}

/// Report an unexpected failure to the monitoring sink.
///
/// Always logs; forwards to Sentry with the full error chain when a client
/// is configured.
pub fn report_error(err: &anyhow::Error, context: &str) {
    error!(error = %format!("{:#}", err), "{}", context);

    if sentry::Hub::current().client().is_some() {
        sentry::capture_message(
            &format!("{}: {:#}", context, err),
            sentry::Level::Error,
        );
    }
}
