//! Startup sequence and fail-safe teardown.
//!
//! The supervisor poses the servos, joins a network and serves commands until
//! something unrecoverable happens. It then releases and deinitializes every
//! servo, drops the socket, leaves the network, waits out the cool-down and
//! asks the board to restart. There is no partial recovery.

use crate::{
    config::Config,
    controller::ServoController,
    error::ControlError,
    listener::CommandListener,
    network::{NetworkConnector, Station},
    pwm::PwmPin,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{error, info};

/// The board's reset line.
pub trait DeviceReset {
    fn request_restart(&mut self);
}

pub struct Supervisor<'a, P: PwmPin, S: Station, R: DeviceReset> {
    config: &'a Config,
    servo: ServoController<P>,
    station: S,
    reset: R,
}

impl<'a, P: PwmPin, S: Station, R: DeviceReset> Supervisor<'a, P, S, R> {
    pub fn new(config: &'a Config, pins: Vec<P>, station: S, reset: R) -> Self {
        Supervisor {
            config,
            servo: ServoController::new(pins, config.servo.pwm_frequency),
            station,
            reset,
        }
    }

    pub fn servo(&self) -> &ServoController<P> {
        &self.servo
    }

    /// Runs until a fault escapes, then performs the teardown and restart request.
    /// Returns the fault that ended the run.
    pub async fn run(mut self) -> ControlError {
        let fault = match self.start().await {
            Ok(never) => match never {},
            Err(fault) => fault,
        };
        error!(error = %fault, "An error occurred");
        self.teardown().await;
        fault
    }

    /// Applies the configured initial pose, channel by channel.
    pub fn apply_initial_pose(&mut self) -> Result<(), ControlError> {
        for entry in &self.config.servo.initial_pose {
            self.servo.set_angle(entry.channel, entry.angle)?;
        }
        Ok(())
    }

    async fn start(&mut self) -> Result<Infallible, ControlError> {
        self.apply_initial_pose()?;

        let connection = NetworkConnector::from_config(&self.config.network)
            .connect(&mut self.station)
            .await?;

        let listener =
            CommandListener::bind(SocketAddr::new(connection.address, self.config.network.port)).await?;
        Ok(listener.serve(&mut self.servo).await)
    }

    async fn teardown(self) {
        let Supervisor { config, mut servo, mut station, mut reset } = self;

        servo.release_all();
        station.disconnect();
        servo.shutdown();

        let cooldown = config.supervisor.reset_cooldown();
        info!(?cooldown, "Resetting after cool-down");
        tokio::time::sleep(cooldown).await;
        reset.request_restart();
    }
}
