// WaveCtl — Firmware Entry Point
//
// Gesture-controlled music transport: three VL53L0X time-of-flight sensors
// watch a small plane above the device; swipes and taps become transport
// commands for the (external) audio player.
//
// Boot sequence:
//   1. Bring up logging and the shared I2C bus.
//   2. Hold all three sensors in reset, then release them one at a time and
//      move each to its own I2C address.
//   3. Run a connectivity self-test and start continuous ranging.
//   4. Spawn sensor, gesture, and control tasks.

mod config;
mod drivers;
mod events;
mod gesture;
mod tasks;

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyOutputPin, Output, OutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;

use crate::config::*;
use crate::drivers::led::StatusLed;
use crate::drivers::tof::{SharedBus, Vl53l0x};
use crate::tasks::control::LogTransport;

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
    log::info!("WaveCtl firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- I2C bus (shared between the three ToF sensors) -------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
    // It will live for the entire programme duration (embedded firmware never exits).
    let i2c_bus: SharedBus =
        Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

    // ---- Sensor bring-up --------------------------------------------------
    // All VL53L0X parts boot at the same address; XSHUT sequencing gives
    // each one its own before the next wakes up.
    let mut xshut = [
        PinDriver::output(peripherals.pins.gpio2.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio3.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio4.downgrade_output())?,
    ];
    for pin in &mut xshut {
        pin.set_low()?;
    }
    thread::sleep(Duration::from_millis(10));

    let sensors = [
        bring_up_sensor(i2c_bus, &mut xshut[0], I2C_ADDR_TOF_LEFT, "left")?,
        bring_up_sensor(i2c_bus, &mut xshut[1], I2C_ADDR_TOF_RIGHT, "right")?,
        bring_up_sensor(i2c_bus, &mut xshut[2], I2C_ADDR_TOF_TOP, "top")?,
    ];

    // ---- Status LED -------------------------------------------------------
    let mut led = StatusLed::new(
        PinDriver::output(peripherals.pins.gpio8.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio9.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio10.downgrade_output())?,
    );
    led.idle();

    log::info!("Boot complete — entering normal operation");

    // ---- Channels ---------------------------------------------------------
    let (sample_tx, sample_rx) = mpsc::channel();
    let (control_tx, control_rx) = mpsc::channel();

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------

    // Sensor task — highest effective priority (tightest timing).
    thread::Builder::new()
        .name("sensor".into())
        .stack_size(STACK_SENSOR)
        .spawn(move || {
            tasks::sensor::sensor_task(sensors, sample_tx);
        })?;

    // Gesture detection task
    thread::Builder::new()
        .name("gesture".into())
        .stack_size(STACK_GESTURE)
        .spawn(move || {
            tasks::gesture::gesture_task(sample_rx, control_tx);
        })?;

    // Control task (LED + transport dispatch)
    thread::Builder::new()
        .name("control".into())
        .stack_size(STACK_CONTROL)
        .spawn(move || {
            tasks::control::control_task(control_rx, led, LogTransport);
        })?;

    // Main thread has nothing left to do — park it forever.
    // (All work happens in the spawned FreeRTOS tasks.)
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

/// Release one sensor's XSHUT line, move it to its assigned address, and
/// start continuous ranging.
fn bring_up_sensor(
    bus: SharedBus,
    xshut: &mut PinDriver<'static, AnyOutputPin, Output>,
    addr: u8,
    name: &str,
) -> anyhow::Result<Vl53l0x> {
    xshut.set_high()?;
    thread::sleep(Duration::from_millis(10));

    let sensor = Vl53l0x::assign_address(bus, addr)?;
    sensor.start_continuous()?;
    log::info!("ToF sensor '{}' online at 0x{:02X}", name, addr);
    Ok(sensor)
}
