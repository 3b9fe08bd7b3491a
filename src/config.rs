// WaveCtl — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 6;         // D4 — I2C data line
pub const PIN_I2C_SCL: i32 = 7;         // D5 — I2C clock line
pub const PIN_TOF_XSHUT_LEFT: i32 = 2;  // D0 — left sensor shutdown line
pub const PIN_TOF_XSHUT_RIGHT: i32 = 3; // D1 — right sensor shutdown line
pub const PIN_TOF_XSHUT_TOP: i32 = 4;   // D2 — top sensor shutdown line
pub const PIN_LED_R: i32 = 8;
pub const PIN_LED_G: i32 = 9;
pub const PIN_LED_B: i32 = 10;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_TOF_DEFAULT: u8 = 0x29; // VL53L0X power-on address
pub const I2C_ADDR_TOF_LEFT: u8 = 0x30;    // reassigned during boot, one
pub const I2C_ADDR_TOF_RIGHT: u8 = 0x31;   // sensor at a time via XSHUT
pub const I2C_ADDR_TOF_TOP: u8 = 0x32;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SENSOR: usize = 4096;
pub const STACK_GESTURE: usize = 8192;
pub const STACK_CONTROL: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SENSOR_SAMPLE_INTERVAL_MS: u64 = 20; // 50 Hz sample tick

// ---------------------------------------------------------------------------
// Sensor geometry — indices into every per-sensor array
// ---------------------------------------------------------------------------
pub const SENSOR_COUNT: usize = 3;
pub const SENSOR_LEFT: usize = 0;
pub const SENSOR_RIGHT: usize = 1;
pub const SENSOR_TOP: usize = 2;

// ---------------------------------------------------------------------------
// Signal conditioning
// ---------------------------------------------------------------------------
/// Recognized sensing band for the ~3–14 cm gesture plane.
pub const BAND_MIN_MM: u16 = 30;
pub const BAND_MAX_MM: u16 = 140;

/// Nearest-layer gate: how far behind the frame's nearest object a reading
/// may lie and still be attributed to the foreground hand.
pub const NEAR_LAYER_MM: u16 = 20;

/// Consecutive invalid frames before a sensor's smoothed value is forgotten.
pub const INVALID_RESET_COUNT: u8 = 50;

// ---------------------------------------------------------------------------
// Episode state machine
// ---------------------------------------------------------------------------
pub const ENTER_COUNT: u8 = 1;
pub const EXIT_COUNT: u8 = 2;
pub const MIN_EPISODE_MS: u32 = 20;
pub const MAX_EPISODE_MS: u32 = 2000;
pub const COOLDOWN_MS: u32 = 5;

/// Finalize floors: an episode qualifies when it clears the swing floor OR
/// the velocity floor (slow sweeps and fast flicks both pass).
pub const MIN_SWING_MM: u16 = 5;
pub const MIN_PEAK_VEL_MM_S: i32 = 200;

// ---------------------------------------------------------------------------
// Classifier thresholds (tuned against the physical sensor geometry)
// ---------------------------------------------------------------------------
pub const TAP_SWING_MM: u16 = 20;
pub const TAP_VEL_MM_S: i32 = 60;
pub const SWIPE_SWING_MM: u16 = 5;
pub const GAP_MIN_MS: u32 = 5;
pub const GAP_MAX_MS: u32 = 1500;
