mod constants;
mod types;
mod controller;
mod command;
mod dispatch;

pub mod config;
pub mod error;
pub mod listener;
pub mod network;
pub mod pwm;
pub mod sim;
pub mod supervisor;

pub use controller::{duty_for_angle, ServoController};
pub use dispatch::{dispatch, joystick_to_angle};
pub use types::{Axis, Command, LinkStatus};

// Re-export commonly used items
pub use config::Config;
pub use constants::{DEFAULT_DEGREES, HTTP_PORT, RESPONSE_HEADER};
pub use error::{ConfigError, ControlError, ServoError};
pub use supervisor::Supervisor;
