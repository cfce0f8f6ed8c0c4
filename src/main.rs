use anyhow::Context;
use gamewatch::champion::ChampionResolver;
use gamewatch::config::Config;
use gamewatch::monitor::{GameMonitor, MonitorSettings};
use gamewatch::notify;
use gamewatch::riot::{MatchGateway, RiotClient, SimulatedGateway};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "gamewatch.toml";
const SIMULATED_POLL_INTERVAL: Duration = Duration::from_secs(2);

struct Args {
    config_path: Option<PathBuf>,
    simulate: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config_path: None,
        simulate: false,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--simulate" | "test" => parsed.simulate = true,
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("unknown argument: {other} (usage: gamewatch [--config <path>] [--simulate])"),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let args = parse_args()?;

    // Load config
    let config = match &args.config_path {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(Path::new(DEFAULT_CONFIG_PATH))?,
        None => Config::from_env()?,
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!("gamewatch v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate(!args.simulate) {
        error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    let gateway: Box<dyn MatchGateway> = if args.simulate {
        warn!("simulation mode: using the offline gateway, no Riot API calls are made");
        Box::new(SimulatedGateway::new())
    } else {
        Box::new(RiotClient::new(&config.riot)?)
    };

    let notifier = notify::from_config(&config.notifier, config.riot.request_timeout())?;
    let champions = Arc::new(ChampionResolver::new(
        config.riot.champion_data_url.clone(),
        config.riot.champion_timeout(),
    )?);

    let settings = MonitorSettings {
        riot_id: config.monitor.summoner_name.clone(),
        display_name: Some(config.display_name()),
        channel: config.notifier.channel.clone(),
        poll_interval: if args.simulate {
            SIMULATED_POLL_INTERVAL
        } else {
            config.monitor.poll_interval()
        },
        profile_url_base: config.monitor.profile_url_base.clone(),
        region: config.riot.platform_region.clone(),
    };

    let monitor = match GameMonitor::start(gateway, notifier, champions, settings).await {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "monitor could not start");
            return Err(e.into());
        }
    };

    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down...");
        }
    }

    Ok(())
}
