/// A hardware PWM output driving one servo.
pub trait PwmPin {
    fn gpio(&self) -> u8;
    fn set_frequency(&mut self, hz: u32);
    fn set_duty_u16(&mut self, duty: u16);
    /// Releases the underlying peripheral. No further writes follow.
    fn deinit(&mut self);
}
