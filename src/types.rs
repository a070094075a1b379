use strum_macros::{Display, EnumIter};

/// Joystick axes and the servo channel each one drives.
#[derive(Debug, Display, EnumIter, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Axis {
    Pan = 1,  // left to right
    Tilt = 2, // up to down
}

impl Axis {
    pub fn channel(self) -> usize {
        self as usize
    }
}

/// A request line reduced to what the control plane acts on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Command {
    /// Raw joystick offsets, not yet mapped to angles.
    Move { x: i32, y: i32 },
    Stop,
    Unrecognized,
}

/// Station-mode link status as reported by the network interface.
#[derive(Debug, Display, Clone, Copy, Eq, PartialEq)]
pub enum LinkStatus {
    Idle,
    Connecting,
    GotIp,
    WrongPassword,
    NoApFound,
    ConnectFailed,
}

impl LinkStatus {
    /// Whether polling can stop: the link either came up or definitely failed.
    pub fn is_settled(self) -> bool {
        !matches!(self, LinkStatus::Idle | LinkStatus::Connecting)
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            LinkStatus::WrongPassword | LinkStatus::NoApFound | LinkStatus::ConnectFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn axes_map_to_first_two_channels() {
        let channels: Vec<usize> = Axis::iter().map(Axis::channel).collect();
        assert_eq!(channels, vec![1, 2]);
    }

    #[test]
    fn only_terminal_statuses_settle() {
        assert!(!LinkStatus::Idle.is_settled());
        assert!(!LinkStatus::Connecting.is_settled());
        assert!(LinkStatus::GotIp.is_settled());
        assert!(LinkStatus::NoApFound.is_settled());
        assert!(!LinkStatus::GotIp.is_failure());
        assert!(LinkStatus::WrongPassword.is_failure());
    }
}
