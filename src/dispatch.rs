use crate::{
    constants::*,
    controller::ServoController,
    error::ServoError,
    pwm::PwmPin,
    types::{Axis, Command},
};
use tracing::info;

/// Maps a joystick offset (nominally -100..=100) onto a servo angle (0..=180).
///
/// Floor division, no clamping: offsets outside the nominal range produce
/// angles the controller will reject.
pub fn joystick_to_angle(offset: i32) -> i32 {
    let angle = ((offset as i64 + JOYSTICK_OFFSET) * JOYSTICK_SCALE_NUM).div_euclid(JOYSTICK_SCALE_DEN);
    angle.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Applies `command` to the servos.
///
/// A rejected pan angle leaves the tilt channel untouched.
pub fn dispatch<P: PwmPin>(command: &Command, servo: &mut ServoController<P>) -> Result<(), ServoError> {
    match *command {
        Command::Move { x, y } => {
            let pan = joystick_to_angle(x);
            let tilt = joystick_to_angle(y);
            info!(pan, tilt, "Setting pan/tilt");
            servo.set_angle(Axis::Pan.channel(), pan)?;
            servo.set_angle(Axis::Tilt.channel(), tilt)?;
        }
        Command::Stop => {
            info!("Stopping servos");
            servo.release_all();
        }
        Command::Unrecognized => {}
    }
    Ok(())
}
