use crate::{
    constants::*,
    error::ServoError,
    pwm::PwmPin,
};
use tracing::{debug, info};

/// Maps an angle within `0..=degrees` onto a raw 16-bit duty value.
///
/// `duty = floor(angle / degrees * 8000) + 3000`, evaluated exactly in integer
/// arithmetic. The caller is responsible for range checks.
pub fn duty_for_angle(angle: i32, degrees: i32) -> u16 {
    let scaled = (angle as i64 * DUTY_SPAN as i64).div_euclid(degrees as i64);
    (scaled + DUTY_MIN as i64) as u16
}

struct ServoChannel<P> {
    pin: P,
    duty: u16,
}

/// Owns a fixed set of PWM-driven servo channels addressed 1..=N.
pub struct ServoController<P: PwmPin> {
    channels: Vec<ServoChannel<P>>,
    frequency: u32,
}

impl<P: PwmPin> ServoController<P> {
    pub fn new(pins: Vec<P>, frequency: u32) -> Self {
        let channels = pins
            .into_iter()
            .map(|mut pin| {
                pin.set_frequency(frequency);
                debug!(gpio = pin.gpio(), frequency, "PWM channel ready");
                ServoChannel { pin, duty: DUTY_RELEASED }
            })
            .collect();

        ServoController { channels, frequency }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Last duty written to `channel`, `None` for an unknown channel.
    pub fn duty(&self, channel: usize) -> Option<u16> {
        channel
            .checked_sub(1)
            .and_then(|idx| self.channels.get(idx))
            .map(|c| c.duty)
    }

    pub fn duties(&self) -> Vec<u16> {
        self.channels.iter().map(|c| c.duty).collect()
    }

    fn channel_mut(&mut self, channel: usize) -> Result<&mut ServoChannel<P>, ServoError> {
        let count = self.channels.len();
        channel
            .checked_sub(1)
            .and_then(|idx| self.channels.get_mut(idx))
            .ok_or(ServoError::ChannelOutOfRange { channel, count })
    }

    /// Drives `channel` to `angle` on the default 180 degree range.
    pub fn set_angle(&mut self, channel: usize, angle: i32) -> Result<u16, ServoError> {
        self.set_angle_in_range(channel, angle, DEFAULT_DEGREES)
    }

    pub fn set_angle_in_range(&mut self, channel: usize, angle: i32, degrees: i32) -> Result<u16, ServoError> {
        if degrees <= 0 {
            return Err(ServoError::InvalidRange { degrees });
        }
        let servo = self.channel_mut(channel)?;
        if !(0..=degrees).contains(&angle) {
            return Err(ServoError::AngleOutOfRange { angle, degrees });
        }

        let duty = duty_for_angle(angle, degrees);
        servo.pin.set_duty_u16(duty);
        servo.duty = duty;
        debug!(channel, angle, duty, "servo moved");
        Ok(duty)
    }

    /// Stops holding position on one channel, or on every channel for `None`.
    pub fn release(&mut self, channel: Option<usize>) -> Result<(), ServoError> {
        match channel {
            Some(channel) => {
                let servo = self.channel_mut(channel)?;
                servo.pin.set_duty_u16(DUTY_RELEASED);
                servo.duty = DUTY_RELEASED;
                debug!(channel, "servo released");
            }
            None => self.release_all(),
        }
        Ok(())
    }

    pub fn release_all(&mut self) {
        for (idx, servo) in self.channels.iter_mut().enumerate() {
            servo.pin.set_duty_u16(DUTY_RELEASED);
            servo.duty = DUTY_RELEASED;
            debug!(channel = idx + 1, "servo released");
        }
    }

    /// Deinitializes every PWM output. Consumes the controller.
    pub fn shutdown(self) {
        for mut servo in self.channels {
            servo.pin.deinit();
        }
        info!("All servos deinitialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedPwm;

    fn controller(n: u8) -> ServoController<SimulatedPwm> {
        ServoController::new((0..n).map(SimulatedPwm::new).collect(), 50)
    }

    #[test]
    fn duty_endpoints_and_midpoint() {
        assert_eq!(duty_for_angle(0, 180), 3000);
        assert_eq!(duty_for_angle(180, 180), 11000);
        assert_eq!(duty_for_angle(90, 180), 7000);
        assert_eq!(duty_for_angle(0, 270), 3000);
        assert_eq!(duty_for_angle(270, 270), 11000);
    }

    #[test]
    fn duty_is_floored() {
        // 60 / 180 * 8000 = 2666.67
        assert_eq!(duty_for_angle(60, 180), 5666);
        // 1 / 180 * 8000 = 44.4
        assert_eq!(duty_for_angle(1, 180), 3044);
        for angle in 0..=180 {
            let expected = ((angle as f64 / 180.0) * 8000.0 + 1e-9).floor() as u16 + 3000;
            assert_eq!(duty_for_angle(angle, 180), expected, "angle {}", angle);
        }
    }

    #[test]
    fn new_controller_sets_frequency_and_starts_released() {
        let pins: Vec<SimulatedPwm> = (0..4).map(SimulatedPwm::new).collect();
        let probes: Vec<_> = pins.iter().map(SimulatedPwm::probe).collect();
        let servo = ServoController::new(pins, 50);

        assert_eq!(servo.channel_count(), 4);
        assert_eq!(servo.frequency(), 50);
        assert_eq!(servo.duties(), vec![0, 0, 0, 0]);
        assert!(probes.iter().all(|p| p.frequency() == 50));
    }

    #[test]
    fn set_angle_writes_duty_to_pin() {
        let pins: Vec<SimulatedPwm> = (0..4).map(SimulatedPwm::new).collect();
        let probe = pins[2].probe();
        let mut servo = ServoController::new(pins, 50);

        assert_eq!(servo.set_angle(3, 90), Ok(7000));
        assert_eq!(servo.duty(3), Some(7000));
        assert_eq!(probe.duty(), 7000);

        servo.set_angle(3, 0).unwrap();
        assert_eq!(probe.duty(), 3000);
    }

    #[test]
    fn set_angle_rejects_bad_channel() {
        let mut servo = controller(4);
        assert_eq!(
            servo.set_angle(5, 90),
            Err(ServoError::ChannelOutOfRange { channel: 5, count: 4 })
        );
        assert_eq!(
            servo.set_angle(0, 90),
            Err(ServoError::ChannelOutOfRange { channel: 0, count: 4 })
        );
        assert_eq!(servo.duties(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn set_angle_rejects_bad_angle() {
        let mut servo = controller(4);
        servo.set_angle(1, 45).unwrap();
        let before = servo.duties();

        assert_eq!(
            servo.set_angle_in_range(1, 200, 180),
            Err(ServoError::AngleOutOfRange { angle: 200, degrees: 180 })
        );
        assert_eq!(
            servo.set_angle(1, -1),
            Err(ServoError::AngleOutOfRange { angle: -1, degrees: 180 })
        );
        assert_eq!(
            servo.set_angle_in_range(1, 0, 0),
            Err(ServoError::InvalidRange { degrees: 0 })
        );
        assert_eq!(servo.duties(), before);
    }

    #[test]
    fn set_angle_accepts_custom_range_bounds() {
        let mut servo = controller(1);
        assert_eq!(servo.set_angle_in_range(1, 270, 270), Ok(11000));
        assert!(servo.set_angle_in_range(1, 271, 270).is_err());
    }

    #[test]
    fn release_one_channel_leaves_others() {
        let mut servo = controller(4);
        for ch in 1..=4 {
            servo.set_angle(ch, 90).unwrap();
        }

        servo.release(Some(2)).unwrap();
        assert_eq!(servo.duties(), vec![7000, 0, 7000, 7000]);

        assert_eq!(
            servo.release(Some(9)),
            Err(ServoError::ChannelOutOfRange { channel: 9, count: 4 })
        );
        assert_eq!(servo.duties(), vec![7000, 0, 7000, 7000]);
    }

    #[test]
    fn release_all_zeroes_every_channel() {
        let pins: Vec<SimulatedPwm> = (0..4).map(SimulatedPwm::new).collect();
        let probes: Vec<_> = pins.iter().map(SimulatedPwm::probe).collect();
        let mut servo = ServoController::new(pins, 50);
        for ch in 1..=4 {
            servo.set_angle(ch, 180).unwrap();
        }

        servo.release(None).unwrap();
        assert_eq!(servo.duties(), vec![0, 0, 0, 0]);
        assert!(probes.iter().all(|p| p.duty() == 0));
    }

    #[test]
    fn shutdown_deinitializes_pins() {
        let pins: Vec<SimulatedPwm> = (0..2).map(SimulatedPwm::new).collect();
        let probes: Vec<_> = pins.iter().map(SimulatedPwm::probe).collect();
        let servo = ServoController::new(pins, 50);

        servo.shutdown();
        assert!(probes.iter().all(|p| !p.is_active()));
    }
}
