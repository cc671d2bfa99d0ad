// ionblade — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up logging, GPIO, the shared I2C bus, SD card, I2S, and RMT.
//   2. Start the audio playback thread.
//   3. Wake and configure the MPU6050.
//   4. Ignition: sweep the blade lit from both ends, play ON.wav.
//   5. Enter the control loop.
//
// The control loop is deliberately single-threaded and cooperative: one
// cycle samples the IMU, classifies the motion, and executes the resulting
// effector commands before the next cycle begins. The only intentional stall
// is the strike flash, which freezes the whole loop for its hold. Audio
// playback is the one collaborator with its own thread, fed fire-and-forget
// commands.

mod classifier;
mod config;
mod control;
mod drivers;
mod events;
mod input;
mod motion;

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_hal::gpio::{AnyIOPin, InputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::i2s::{config as i2s_config, I2sDriver};
use esp_idf_hal::prelude::*;
use esp_idf_hal::spi::{SpiDriver, SpiDriverConfig, SPI2};
use esp_idf_svc::fs::fatfs::Fatfs;
use esp_idf_svc::io::vfs::MountedFatfs;
use esp_idf_svc::sd::{spi::SdSpiHostDriver, SdCardConfiguration, SdCardDriver};
use ws2812_esp32_rmt_driver::Ws2812Esp32Rmt;

use crate::config::*;
use crate::control::Controller;
use crate::drivers::audio::AudioPlayer;
use crate::drivers::imu::Mpu6050;
use crate::drivers::strip::Blade;
use crate::events::Command;
use crate::input::Button;
use crate::motion::Magnitudes;

// ---------------------------------------------------------------------------
// Utility: milliseconds since boot (wraps at ~49 days — fine for timeouts)
// ---------------------------------------------------------------------------
pub fn now_ms() -> u32 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("ionblade firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // Color button (pull-up, active LOW).
    let button = Button::new(PinDriver::input(
        peripherals.pins.gpio3.downgrade_input(),
    )?);

    // ---- I2C bus (MPU6050) ------------------------------------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
    // It will live for the entire programme duration (embedded firmware never exits).
    let i2c_bus: &'static Mutex<I2cDriver<'static>> =
        Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

    // ---- SD card (effect files) -------------------------------------------
    let spi = SpiDriver::new::<SPI2>(
        peripherals.spi2,
        peripherals.pins.gpio4,        // SCK
        peripherals.pins.gpio5,        // MOSI
        Some(peripherals.pins.gpio20), // MISO
        &SpiDriverConfig::new(),
    )?;
    let sd_card = SdCardDriver::new_spi(
        SdSpiHostDriver::new(
            spi,
            Some(peripherals.pins.gpio21), // CS
            AnyIOPin::none(),
            AnyIOPin::none(),
            AnyIOPin::none(),
            None,
        )?,
        &SdCardConfiguration::new(),
    )?;
    let _mounted_fatfs = MountedFatfs::mount(Fatfs::new_fatfs(0, sd_card)?, AUDIO_ROOT, 4)?;
    log::info!("SD card mounted at {}", AUDIO_ROOT);

    // ---- Audio (I2S amplifier + playback thread) --------------------------
    let i2s = I2sDriver::new_std_tx(
        peripherals.i2s0,
        &i2s_config::StdConfig::new(
            i2s_config::Config::default(),
            i2s_config::StdClkConfig::from_sample_rate_hz(AUDIO_SAMPLE_RATE_HZ),
            i2s_config::StdSlotConfig::philips_slot_default(
                i2s_config::DataBitWidth::Bits16,
                i2s_config::SlotMode::Mono,
            ),
            i2s_config::StdGpioConfig::default(),
        ),
        peripherals.pins.gpio8, // BCLK
        peripherals.pins.gpio2, // DOUT
        None::<AnyIOPin>,       // no MCLK
        peripherals.pins.gpio9, // WS
    )?;
    let audio = AudioPlayer::start(i2s)?;

    // ---- IMU --------------------------------------------------------------
    let imu = Mpu6050::new(i2c_bus);
    if !imu.is_connected() {
        log::error!("MPU6050 not responding — check wiring");
        // Continue anyway so we can still debug via serial.
    }
    imu.init()?;

    // ---- Blade ------------------------------------------------------------
    let strip = Ws2812Esp32Rmt::new(peripherals.rmt.channel0, peripherals.pins.gpio10)?;
    let mut blade = Blade::new(strip);

    let mut controller = Controller::new();

    // ---- Ignition ---------------------------------------------------------
    blade.ignite(controller.color_index())?;
    audio.play(POWER_ON_FILE);
    thread::sleep(Duration::from_millis(POWER_ON_SOUND_MS));
    blade.set_color(controller.color_index())?;
    log::info!("Ignition complete — entering control loop");

    // Variant draws come from the hardware RNG.
    let mut variant_rng =
        |lo: u32, hi: u32| lo + unsafe { esp_idf_sys::esp_random() } % (hi - lo + 1);

    // ---- Control loop -----------------------------------------------------
    let interval = Duration::from_millis(CYCLE_INTERVAL_MS);
    loop {
        let tick_start = Instant::now();

        match imu.read_raw() {
            Ok(sample) => {
                let mags = Magnitudes::from_sample(&sample);
                log::debug!("ACC {:>4}  GYR {:>4}", mags.acc, mags.gyr);

                let commands =
                    controller.cycle(now_ms(), mags, button.is_pressed(), &mut variant_rng);
                for command in commands {
                    execute(command, &mut blade, &audio, controller.color_index());
                }
            }
            Err(e) => log::warn!("IMU read error: {}", e),
        }

        // Sleep for the remainder of the cycle interval.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

/// Apply one controller command to the effectors. Effector faults are logged
/// and dropped; the state machine has already moved on.
fn execute(command: Command, blade: &mut Blade, audio: &AudioPlayer, color_index: u8) {
    match command {
        Command::PlayEffect { name } => audio.play(&name),
        Command::PlayHum => audio.play_repeated(HUM_FILE, HUM_REPEATS),
        Command::FlashWhite { hold_ms } => {
            if let Err(e) = blade.flash_white(hold_ms, color_index) {
                log::warn!("blade flash failed: {}", e);
            }
        }
        Command::SetColor { index } => {
            if let Err(e) = blade.set_color(index) {
                log::warn!("blade render failed: {}", e);
            }
        }
    }
}
