// ionblade — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

use smart_leds::RGB8;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;     // D1/A1 — Color button (INPUT_PULLUP, active LOW)
pub const PIN_SPI_SCK: i32 = 4;    // D2    — SD card SPI clock
pub const PIN_SPI_MOSI: i32 = 5;   // D3    — SD card SPI data out
pub const PIN_I2C_SDA: i32 = 6;    // D4    — I2C data line (MPU6050)
pub const PIN_I2C_SCL: i32 = 7;    // D5    — I2C clock line (MPU6050)
pub const PIN_I2S_BCLK: i32 = 8;   // D8    — Amplifier bit clock
pub const PIN_I2S_WS: i32 = 9;     // D9    — Amplifier word select
pub const PIN_STRIP: i32 = 10;     // D10   — WS2812 blade data
pub const PIN_SPI_MISO: i32 = 20;  // D7    — SD card SPI data in
pub const PIN_SPI_CS: i32 = 21;    // D6    — SD card chip select
pub const PIN_I2S_DOUT: i32 = 2;   // D0/A0 — Amplifier data

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Blade (WS2812 strip)
// ---------------------------------------------------------------------------
pub const BLADE_PIXELS: usize = 87;
pub const IGNITION_STEPS: usize = 46; // both-ends fill meets past the middle
pub const IGNITION_STEP_MS: u64 = 20;

/// Selectable blade colors; the button cycles the index, wrapping after the
/// last entry.
pub const BLADE_COLORS: [RGB8; 5] = [
    RGB8 { r: 255, g: 0, b: 0 },   // red
    RGB8 { r: 255, g: 255, b: 0 }, // yellow
    RGB8 { r: 0, g: 0, b: 255 },   // blue
    RGB8 { r: 128, g: 0, b: 128 }, // purple
    RGB8 { r: 0, g: 255, b: 0 },   // green
];

/// Strike accent — full white, held briefly, then the active color returns.
pub const FLASH_WHITE: RGB8 = RGB8 { r: 255, g: 255, b: 255 };

// ---------------------------------------------------------------------------
// Motion thresholds (empirically tuned on the assembled prop)
// ---------------------------------------------------------------------------
/// Divisor applied to every raw axis before the magnitude combine.
pub const AXIS_SCALE_DIV: i32 = 100;

pub const SWING_GYR_MIN: u16 = 80;    // below this the blade is considered still
pub const SWING_GYR_FAST: u16 = 230;  // upper edge of the slow band / lower edge of fast
pub const STRIKE_ACC_MIN: u16 = 60;   // below this no impact is registered
pub const STRIKE_ACC_HARD: u16 = 150; // at or above this an impact counts as hard

// ---------------------------------------------------------------------------
// Effect duration tables (ms) — one lockout entry per recorded sample,
// measured from the actual file lengths
// ---------------------------------------------------------------------------
pub const SWING_TIME_MS: [u32; 4] = [486, 541, 622, 652];
pub const STRIKE_HARD_TIME_MS: [u32; 8] = [879, 663, 787, 802, 773, 761, 766, 735];
pub const STRIKE_SOFT_TIME_MS: [u32; 8] = [355, 267, 286, 350, 352, 355, 350, 338];

pub const FLASH_SOFT_MS: u32 = 50;
pub const FLASH_HARD_MS: u32 = 100;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const CYCLE_INTERVAL_MS: u64 = 10;     // ~100 Hz sample/control loop
pub const BUTTON_DEBOUNCE_MS: u32 = 300;   // minimum gap between accepted presses
pub const HUM_RETRIGGER_MS: u32 = 5000;    // re-issue HUM before the repeat run ends
pub const POWER_ON_SOUND_MS: u64 = 1100;   // length of ON.wav

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------
pub const AUDIO_ROOT: &str = "/sdcard";
pub const HUM_FILE: &str = "HUM.wav";
pub const POWER_ON_FILE: &str = "ON.wav";
/// The HUM sample is short; one trigger queues this many back-to-back plays.
pub const HUM_REPEATS: u32 = 4;
/// All effect files are 8-bit mono PCM at this rate.
pub const AUDIO_SAMPLE_RATE_HZ: u32 = 16_000;
pub const AUDIO_CHUNK_BYTES: usize = 512;

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_AUDIO: usize = 8192;
