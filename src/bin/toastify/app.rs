use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tokio::time::Instant;
use toastify::Result;
use toastify::Toastify;
use toastify::config::Config;
use toastify::error::{ConfigError, Error as ToastError};
use toastify::host::MemoryHost;
use toastify::telemetry::init_tracing;
use toastify::types::ControllerState;
use tracing::{info, warn};

use super::cli::Cli;
use super::event_log::run_event_log;

const DEFAULT_CONFIG: &str = "toastify.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let required = cli.config.is_some();
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path, required)?;
    apply_cli_overrides(&cli, &mut config);

    if cli.dry_run {
        let queue = serde_json::to_string_pretty(&config.messages).map_err(|err| {
            ToastError::from(ConfigError::Other(format!("cannot render queue: {err}")))
        })?;
        println!("{queue}");
        info!(
            messages = config.messages.len(),
            theme = config.display.theme.map_or("auto", |mode| mode.as_str()),
            "dry-run: configuration is valid"
        );
        return Ok(());
    }

    let (host, feed) =
        MemoryHost::with_feed(config.display.viewport_width, config.display.feed_capacity);
    let feed_control = feed.clone();
    let logger = tokio::spawn(run_event_log(feed, Instant::now()));

    let toastify = Toastify::with_image_timeout(Arc::new(host), config.display.image_timeout);
    toastify.init(config.options()).await?;
    toastify.run();

    if toastify.delays().persists_last() {
        info!("fade-out disabled: the last toast stays until Ctrl-C");
    }

    let mut state = toastify.subscribe();
    tokio::select! {
        biased;
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, removing toasts");
        }
        () = wait_until_finished(&mut state) => {
            info!("all toasts shown");
        }
    }

    toastify.destroy();
    feed_control.close();
    if let Err(err) = logger.await {
        warn!(error = %err, "event log task terminated unexpectedly");
    }

    Ok(())
}

fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(theme) = cli.theme {
        config.display.theme = theme.mode();
    }
    if let Some(width) = cli.viewport {
        config.display.viewport_width = width;
    }
    if let Some(start_after) = cli.start_after {
        config.delays.start_after = Some(start_after);
    }
    if let Some(interval) = cli.interval {
        config.delays.display_interval = Some(interval);
    }
    if let Some(fade_out) = cli.fade_out {
        config.delays.fade_out = Some(fade_out);
    }
}

/// Resolves once the session has reset after its last fade-out.
async fn wait_until_finished(state: &mut watch::Receiver<ControllerState>) {
    let finished = state
        .wait_for(|state| {
            matches!(
                state,
                ControllerState::Initialized | ControllerState::Idle
            )
        })
        .await
        .is_ok();
    if !finished {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::apply_cli_overrides;
    use crate::cli::{Cli, ThemeArg};
    use clap::Parser;
    use std::time::Duration;
    use toastify::config::Config;

    #[test]
    fn cli_overrides_win_over_file() {
        let mut config = match Config::from_toml(
            "[display]\ntheme = \"light\"\n\n[[messages]]\nimage = \"https://example.com/a.png\"\ntitle = \"Hi\"\n",
        ) {
            Ok(config) => config,
            Err(err) => panic!("config should parse: {err}"),
        };
        let cli = match Cli::try_parse_from(["toastify", "--theme", "auto", "--interval", "750ms"]) {
            Ok(cli) => cli,
            Err(err) => panic!("arguments should parse: {err}"),
        };
        assert_eq!(cli.theme, Some(ThemeArg::Auto));

        apply_cli_overrides(&cli, &mut config);
        assert_eq!(config.display.theme, None);
        assert_eq!(config.delays.display_interval, Some(Duration::from_millis(750)));
        assert_eq!(config.delays.start_after, None);
    }
}
