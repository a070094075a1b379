//! Host-side stand-ins for the board: PWM pins, the station interface and the
//! reset line. State is shared through `Arc<Mutex<_>>` so probes can observe
//! what the control plane did after handing the hardware over.

use crate::{
    config::NetworkCredentials,
    network::Station,
    pwm::PwmPin,
    supervisor::DeviceReset,
    types::LinkStatus,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
struct PinState {
    frequency: u32,
    duty: u16,
    writes: u32,
    deinitialized: bool,
}

pub struct SimulatedPwm {
    gpio: u8,
    state: Arc<Mutex<PinState>>,
}

/// Read-only view onto a [`SimulatedPwm`].
#[derive(Clone)]
pub struct PwmProbe {
    state: Arc<Mutex<PinState>>,
}

impl SimulatedPwm {
    pub fn new(gpio: u8) -> Self {
        SimulatedPwm {
            gpio,
            state: Arc::new(Mutex::new(PinState::default())),
        }
    }

    pub fn probe(&self) -> PwmProbe {
        PwmProbe { state: Arc::clone(&self.state) }
    }
}

impl PwmPin for SimulatedPwm {
    fn gpio(&self) -> u8 {
        self.gpio
    }

    fn set_frequency(&mut self, hz: u32) {
        self.state.lock().frequency = hz;
    }

    fn set_duty_u16(&mut self, duty: u16) {
        let mut state = self.state.lock();
        state.duty = duty;
        state.writes += 1;
    }

    fn deinit(&mut self) {
        let mut state = self.state.lock();
        state.duty = 0;
        state.deinitialized = true;
    }
}

impl PwmProbe {
    pub fn duty(&self) -> u16 {
        self.state.lock().duty
    }

    pub fn frequency(&self) -> u32 {
        self.state.lock().frequency
    }

    pub fn writes(&self) -> u32 {
        self.state.lock().writes
    }

    pub fn is_active(&self) -> bool {
        !self.state.lock().deinitialized
    }
}

/// How a simulated access point answers a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedNetwork {
    /// Reports `GotIp` after the given number of `Connecting` polls.
    Joins { after_polls: u32 },
    /// Reports the given failure status after one `Connecting` poll.
    Rejects(LinkStatus),
    /// Never leaves `Connecting`.
    Stalls,
}

#[derive(Debug, Default)]
struct StationLog {
    activated: bool,
    attempts: Vec<String>,
    polls: u32,
    disconnects: u32,
}

pub struct SimulatedStation {
    address: IpAddr,
    networks: HashMap<String, SimulatedNetwork>,
    current: Option<(SimulatedNetwork, u32)>,
    connected: bool,
    log: Arc<Mutex<StationLog>>,
}

#[derive(Clone)]
pub struct StationProbe {
    log: Arc<Mutex<StationLog>>,
}

impl SimulatedStation {
    /// A station that hands out `address` once joined. Unknown SSIDs are not found.
    pub fn new(address: IpAddr) -> Self {
        SimulatedStation {
            address,
            networks: HashMap::new(),
            current: None,
            connected: false,
            log: Arc::new(Mutex::new(StationLog::default())),
        }
    }

    pub fn with_network(mut self, ssid: impl Into<String>, behavior: SimulatedNetwork) -> Self {
        self.networks.insert(ssid.into(), behavior);
        self
    }

    pub fn probe(&self) -> StationProbe {
        StationProbe { log: Arc::clone(&self.log) }
    }
}

impl Station for SimulatedStation {
    fn activate(&mut self) {
        self.log.lock().activated = true;
    }

    fn connect(&mut self, network: &NetworkCredentials) {
        self.log.lock().attempts.push(network.ssid.clone());
        self.connected = false;
        let behavior = self
            .networks
            .get(&network.ssid)
            .copied()
            .unwrap_or(SimulatedNetwork::Rejects(LinkStatus::NoApFound));
        self.current = Some((behavior, 0));
    }

    fn status(&mut self) -> LinkStatus {
        self.log.lock().polls += 1;
        let Some((behavior, polls)) = self.current.as_mut() else {
            return LinkStatus::Idle;
        };
        *polls += 1;
        let status = match *behavior {
            SimulatedNetwork::Joins { after_polls } if *polls > after_polls => LinkStatus::GotIp,
            SimulatedNetwork::Rejects(failure) if *polls > 1 => failure,
            _ => LinkStatus::Connecting,
        };
        self.connected = status == LinkStatus::GotIp;
        status
    }

    fn address(&self) -> Option<IpAddr> {
        self.connected.then_some(self.address)
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.current = None;
        self.log.lock().disconnects += 1;
    }
}

impl StationProbe {
    pub fn activated(&self) -> bool {
        self.log.lock().activated
    }

    pub fn attempts(&self) -> Vec<String> {
        self.log.lock().attempts.clone()
    }

    pub fn polls(&self) -> u32 {
        self.log.lock().polls
    }

    pub fn disconnects(&self) -> u32 {
        self.log.lock().disconnects
    }
}

/// Counts restart requests. On the host the caller decides whether to run again.
#[derive(Clone, Default)]
pub struct HostReset {
    restarts: Arc<AtomicU32>,
}

impl HostReset {
    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::SeqCst)
    }
}

impl DeviceReset for HostReset {
    fn request_restart(&mut self) {
        let count = self.restarts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(count, "Device restart requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn creds(ssid: &str) -> NetworkCredentials {
        NetworkCredentials { ssid: ssid.into(), password: "secret".into() }
    }

    #[test]
    fn pin_records_writes_and_deinit() {
        let mut pin = SimulatedPwm::new(18);
        let probe = pin.probe();
        pin.set_frequency(50);
        pin.set_duty_u16(7000);

        assert_eq!(pin.gpio(), 18);
        assert_eq!((probe.frequency(), probe.duty(), probe.writes()), (50, 7000, 1));
        pin.deinit();
        assert!(!probe.is_active());
    }

    #[test]
    fn station_joins_after_polls() {
        let mut station = SimulatedStation::new(Ipv4Addr::LOCALHOST.into())
            .with_network("lab", SimulatedNetwork::Joins { after_polls: 2 });
        station.connect(&creds("lab"));

        assert_eq!(station.status(), LinkStatus::Connecting);
        assert_eq!(station.status(), LinkStatus::Connecting);
        assert_eq!(station.address(), None);
        assert_eq!(station.status(), LinkStatus::GotIp);
        assert_eq!(station.address(), Some(Ipv4Addr::LOCALHOST.into()));

        station.disconnect();
        assert_eq!(station.address(), None);
        assert_eq!(station.probe().disconnects(), 1);
    }

    #[test]
    fn unknown_network_is_not_found() {
        let mut station = SimulatedStation::new(Ipv4Addr::LOCALHOST.into());
        station.connect(&creds("elsewhere"));
        assert_eq!(station.status(), LinkStatus::Connecting);
        assert_eq!(station.status(), LinkStatus::NoApFound);
        assert_eq!(station.probe().attempts(), vec!["elsewhere".to_string()]);
    }

    #[test]
    fn reset_counts_requests() {
        let reset = HostReset::default();
        let mut handle = reset.clone();
        handle.request_restart();
        handle.request_restart();
        assert_eq!(reset.restarts(), 2);
    }
}
