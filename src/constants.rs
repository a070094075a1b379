use std::time::Duration;

// Duty cycle mapping (raw 16-bit duty values)
pub const DUTY_MIN: u16 = 3000;
pub const DUTY_SPAN: u16 = 8000;
pub const DUTY_RELEASED: u16 = 0;

// Servo movement constants
pub const DEFAULT_DEGREES: i32 = 180;
pub const DEFAULT_PWM_FREQUENCY: u32 = 50;
pub const DEFAULT_PINS: [u8; 4] = [18, 19, 20, 21];

// Joystick offsets arrive in -100..=100 and map onto 0..=180 degrees
pub const JOYSTICK_OFFSET: i64 = 100;
pub const JOYSTICK_SCALE_NUM: i64 = 90;
pub const JOYSTICK_SCALE_DEN: i64 = 100;

// Listener constants
pub const HTTP_PORT: u16 = 80;
pub const LISTEN_BACKLOG: u32 = 1;
pub const REQUEST_BUFFER_SIZE: usize = 1024;
pub const RESPONSE_HEADER: &str = "HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n";

// Network and supervisor timing
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const RESET_COOLDOWN: Duration = Duration::from_secs(5);
