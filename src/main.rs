use anyhow::Context;
use clap::Parser;
use pantilt::{
    sim::{HostReset, SimulatedNetwork, SimulatedPwm, SimulatedStation},
    Config, Supervisor,
};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Pan/tilt servo control server
///
/// Runs the control plane against simulated servo pins and a simulated
/// station interface that joins every configured network.
#[derive(Parser, Debug)]
#[command(name = "pantilt_server")]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listening port, overrides the config file.
    #[arg(long)]
    port: Option<u16>,

    /// Address the simulated station is assigned once joined.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    address: IpAddr,

    /// Stop after this many restarts instead of restarting forever.
    #[arg(long)]
    max_restarts: Option<u32>,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.network.port = port;
    }
    if config.network.networks.is_empty() {
        warn!("No networks configured, the connector will give up immediately");
    }
    Ok(config)
}

fn simulated_station(config: &Config, address: IpAddr) -> SimulatedStation {
    config
        .network
        .networks
        .iter()
        .fold(SimulatedStation::new(address), |station, network| {
            station.with_network(network.ssid.clone(), SimulatedNetwork::Joins { after_polls: 1 })
        })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let reset = HostReset::default();

    loop {
        let pins: Vec<SimulatedPwm> = config.servo.pins.iter().map(|&gpio| SimulatedPwm::new(gpio)).collect();
        let station = simulated_station(&config, args.address);
        let fault = Supervisor::new(&config, pins, station, reset.clone()).run().await;

        if let Some(max) = args.max_restarts {
            if reset.restarts() > max {
                return Err(fault).context(format!("giving up after {} restarts", max));
            }
        }
        info!(restarts = reset.restarts(), "Restarting control plane");
    }
}
