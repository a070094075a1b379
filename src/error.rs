//! Error types for the control plane

use thiserror::Error;

/// Rejected servo requests. Raised synchronously by the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServoError {
    #[error("Servo number must be between 1 and {count}, got {channel}")]
    ChannelOutOfRange { channel: usize, count: usize },

    #[error("Angle must be between 0 and {degrees}, got {angle}")]
    AngleOutOfRange { angle: i32, degrees: i32 },

    #[error("Servo range must be a positive number of degrees, got {degrees}")]
    InvalidRange { degrees: i32 },
}

/// Faults that can end a supervisor run.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Servo error: {0}")]
    Servo(#[from] ServoError),

    /// Every configured network failed or timed out.
    #[error("Failed to connect to any network ({attempted} attempted)")]
    NetworkUnavailable { attempted: usize },

    #[error("Transport fault: {0}")]
    Transport(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
