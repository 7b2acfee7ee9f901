//! CLI command implementations.

use owo_colors::OwoColorize;

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Result, RideopsError};
use crate::gateway::{Fetch, Gateway};
use crate::render::console::ConsoleView;
use crate::render::{self, View};
use crate::session::{Session, SessionCommand, SessionEnd};
use crate::store::SnapshotStore;
use crate::types::{ActiveRide, DashboardStats, Driver, PendingRide};
use crate::ui::UiState;

/// Interactive dashboard session; runs until Ctrl-C or auth expiry.
pub async fn cmd_run() -> Result<()> {
    let config = Config::load()?;
    if config.session_token().is_none() {
        return Err(RideopsError::Config(
            "no session token configured; run 'rideops config set session_token <token>' \
             or set RIDEOPS_SESSION_TOKEN"
                .to_string(),
        ));
    }

    let (session, handle) = Session::new(&config, ConsoleView::default())?;

    let signal_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_handle.send(SessionCommand::Shutdown).await;
        }
    });

    match session.run().await {
        SessionEnd::AuthExpired => Err(RideopsError::AuthExpired),
        SessionEnd::Closed => Ok(()),
    }
}

/// One-shot dashboard snapshot printed to the console.
pub async fn cmd_status() -> Result<()> {
    let config = Config::load()?;
    let gateway = Gateway::new(&config)?;

    let (stats, pending, active, available) = tokio::join!(
        gateway.read::<DashboardStats>("dashboard-stats", ""),
        gateway.read::<Vec<PendingRide>>("pending-rides", ""),
        gateway.read::<Vec<ActiveRide>>("active-rides", ""),
        gateway.read::<Vec<Driver>>("available-drivers", ""),
    );

    if stats.is_auth_expired()
        || pending.is_auth_expired()
        || active.is_auth_expired()
        || available.is_auth_expired()
    {
        return Err(RideopsError::AuthExpired);
    }

    let mut store = SnapshotStore::new();
    let outcome = store.apply_dashboard_cycle(
        stats.into_option(),
        pending.into_option(),
        active.into_option(),
        available.into_option(),
    );
    if !outcome.applied {
        return Err(RideopsError::Api(
            "dashboard stats unavailable, backend may be down".to_string(),
        ));
    }

    let mut ui = UiState::with_map_view(config.default_map_center, config.default_map_zoom);
    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    ConsoleView::default().apply(&ops);
    Ok(())
}

/// Download a CSV export from the backend.
pub async fn cmd_export(target: &str, output: Option<PathBuf>) -> Result<()> {
    let endpoint = match target {
        "drivers" => "drivers/export",
        "earnings" => "earnings/export",
        _ => {
            return Err(RideopsError::Config(format!(
                "unknown export target '{target}' (expected 'drivers' or 'earnings')"
            )));
        }
    };

    let config = Config::load()?;
    let gateway = Gateway::new(&config)?;

    match gateway.export(endpoint, "").await {
        Fetch::Data(bytes) => {
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{target}-export.csv")));
            std::fs::write(&path, bytes)?;
            println!("{} {}", "Wrote".green(), path.display());
            Ok(())
        }
        Fetch::AuthExpired => Err(RideopsError::AuthExpired),
        Fetch::RateLimited => Err(RideopsError::Api(
            "rate limited, try again shortly".to_string(),
        )),
        Fetch::Failed => Err(RideopsError::Api("export failed".to_string())),
    }
}

pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    let yaml = serde_yaml_ng::to_string(&config)?;
    for line in yaml.lines() {
        // Never echo the stored token.
        if line.trim_start().starts_with("token:") {
            println!("  token: {}", "[REDACTED]".dimmed());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn cmd_config_get(key: &str) -> Result<()> {
    let config = Config::load()?;
    let value = match key {
        "api_base_url" => config.api_base_url,
        "routing_url" => config.routing_url,
        "session_token" => match config.session_token() {
            Some(_) => "[REDACTED]".to_string(),
            None => "(unset)".to_string(),
        },
        "route_timeout_secs" => config.route_timeout_secs.to_string(),
        "dashboard_interval_secs" => config.dashboard_interval_secs.to_string(),
        "unread_interval_secs" => config.unread_interval_secs.to_string(),
        "cache_ttl_ms" => config.cache_ttl_ms.to_string(),
        "throttle_ms" => config.throttle_ms.to_string(),
        "debounce_ms" => config.debounce_ms.to_string(),
        "default_map_zoom" => config.default_map_zoom.to_string(),
        _ => return Err(RideopsError::Config(format!("unknown config key '{key}'"))),
    };
    println!("{value}");
    Ok(())
}

pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;

    fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .parse()
            .map_err(|_| RideopsError::Config(format!("invalid value '{value}' for '{key}'")))
    }

    match key {
        "api_base_url" => config.api_base_url = value.to_string(),
        "routing_url" => config.routing_url = value.to_string(),
        "session_token" => config.set_session_token(value.to_string()),
        "route_timeout_secs" => config.route_timeout_secs = parse_num(key, value)?,
        "dashboard_interval_secs" => config.dashboard_interval_secs = parse_num(key, value)?,
        "unread_interval_secs" => config.unread_interval_secs = parse_num(key, value)?,
        "cache_ttl_ms" => config.cache_ttl_ms = parse_num(key, value)?,
        "throttle_ms" => config.throttle_ms = parse_num(key, value)?,
        "debounce_ms" => config.debounce_ms = parse_num(key, value)?,
        "default_map_zoom" => config.default_map_zoom = parse_num(key, value)?,
        _ => return Err(RideopsError::Config(format!("unknown config key '{key}'"))),
    }

    config.save()?;
    println!("{} {key}", "Updated".green());
    Ok(())
}
