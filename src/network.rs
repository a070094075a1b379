//! Station-mode network bring-up.
//!
//! Configured networks are tried in order. Each attempt polls the link status
//! at a fixed interval until it settles or the per-network timeout elapses.

use crate::{
    config::{NetworkConfig, NetworkCredentials},
    error::ControlError,
    types::LinkStatus,
};
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

/// The station-mode interface of the board's radio.
pub trait Station {
    fn activate(&mut self);
    /// Starts joining `network`. Progress is observed through [`Station::status`].
    fn connect(&mut self, network: &NetworkCredentials);
    fn status(&mut self) -> LinkStatus;
    fn address(&self) -> Option<IpAddr>;
    fn disconnect(&mut self);
}

/// A joined network and the address it assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub ssid: String,
    pub address: IpAddr,
}

/// How a single network attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected(IpAddr),
    Failed(LinkStatus),
    TimedOut,
}

pub struct NetworkConnector<'a> {
    networks: &'a [NetworkCredentials],
    timeout: Duration,
    poll_interval: Duration,
}

impl<'a> NetworkConnector<'a> {
    pub fn new(networks: &'a [NetworkCredentials], timeout: Duration, poll_interval: Duration) -> Self {
        NetworkConnector { networks, timeout, poll_interval }
    }

    pub fn from_config(config: &'a NetworkConfig) -> Self {
        Self::new(&config.networks, config.connect_timeout(), config.poll_interval())
    }

    /// Joins the first configured network that yields an address.
    pub async fn connect<S: Station>(&self, station: &mut S) -> Result<Connection, ControlError> {
        station.activate();

        for network in self.networks {
            info!(ssid = %network.ssid, "Attempting to connect");
            match self.attempt(station, network).await {
                AttemptOutcome::Connected(address) => {
                    info!(ssid = %network.ssid, %address, "Connected");
                    return Ok(Connection { ssid: network.ssid.clone(), address });
                }
                AttemptOutcome::Failed(status) => {
                    warn!(ssid = %network.ssid, %status, "Failed to connect");
                }
                AttemptOutcome::TimedOut => {
                    warn!(ssid = %network.ssid, timeout = ?self.timeout, "Timed out connecting");
                }
            }
        }

        Err(ControlError::NetworkUnavailable { attempted: self.networks.len() })
    }

    pub async fn attempt<S: Station>(&self, station: &mut S, network: &NetworkCredentials) -> AttemptOutcome {
        station.connect(network);

        let poll_interval = self.poll_interval;
        let settled = timeout(self.timeout, async {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let status = station.status();
                if status.is_settled() {
                    return status;
                }
                debug!(ssid = %network.ssid, %status, "Waiting for connection...");
            }
        })
        .await;

        // A link that comes up exactly at the deadline still counts.
        let status = match settled {
            Ok(status) => status,
            Err(_) => station.status(),
        };

        match status {
            LinkStatus::GotIp => match station.address() {
                Some(address) => AttemptOutcome::Connected(address),
                None => AttemptOutcome::Failed(status),
            },
            status if status.is_failure() => AttemptOutcome::Failed(status),
            _ => AttemptOutcome::TimedOut,
        }
    }
}
