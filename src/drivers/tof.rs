// WaveCtl — VL53L0X Time-of-Flight Driver
//
// Minimal register-level driver over a shared I2C bus. All three sensors
// power up at the same address, so boot holds them in reset via XSHUT and
// releases them one at a time, reassigning each to its own address before
// starting continuous back-to-back ranging.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// VL53L0X register addresses
const REG_SYSRANGE_START: u8 = 0x00;
const REG_SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
const REG_RESULT_INTERRUPT_STATUS: u8 = 0x13;
const REG_RESULT_RANGE_MM: u8 = 0x1E; // 16-bit range inside the result block
const REG_I2C_SLAVE_DEVICE_ADDRESS: u8 = 0x8A;
const REG_IDENTIFICATION_MODEL_ID: u8 = 0xC0;

const MODEL_ID_EXPECTED: u8 = 0xEE;
const SYSRANGE_MODE_BACKTOBACK: u8 = 0x02;

/// Readings at or past this value mean "no target in range".
const RANGE_OUT_OF_RANGE_MM: u16 = 8190;

pub struct Vl53l0x {
    bus: SharedBus,
    addr: u8,
}

impl Vl53l0x {
    pub fn new(bus: SharedBus, addr: u8) -> Self {
        Self { bus, addr }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        let mut buf = [0u8; 1];
        match bus.write_read(
            self.addr,
            &[REG_IDENTIFICATION_MODEL_ID],
            &mut buf,
            I2C_TIMEOUT_TICKS,
        ) {
            Ok(()) => buf[0] == MODEL_ID_EXPECTED,
            Err(_) => false,
        }
    }

    /// Move a freshly powered sensor from the power-on address to its
    /// assigned one. Must run while the other sensors are held in reset.
    pub fn assign_address(bus: SharedBus, new_addr: u8) -> anyhow::Result<Self> {
        {
            let mut bus = bus.lock().unwrap();
            bus.write(
                I2C_ADDR_TOF_DEFAULT,
                &[REG_I2C_SLAVE_DEVICE_ADDRESS, new_addr & 0x7F],
                I2C_TIMEOUT_TICKS,
            )?;
        }
        let sensor = Self::new(bus, new_addr);
        anyhow::ensure!(
            sensor.is_connected(),
            "VL53L0X did not answer at 0x{:02X} after reassignment",
            new_addr
        );
        Ok(sensor)
    }

    /// Start continuous back-to-back ranging.
    pub fn start_continuous(&self) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.write(
            self.addr,
            &[REG_SYSRANGE_START, SYSRANGE_MODE_BACKTOBACK],
            I2C_TIMEOUT_TICKS,
        )?;
        log::info!("VL53L0X 0x{:02X} ranging continuously", self.addr);
        Ok(())
    }

    /// Latest range in mm, or `None` when no target is in range or no new
    /// measurement is ready yet.
    pub fn read_range_mm(&self) -> anyhow::Result<Option<u16>> {
        let mut bus = self.bus.lock().unwrap();

        let mut status = [0u8; 1];
        bus.write_read(
            self.addr,
            &[REG_RESULT_INTERRUPT_STATUS],
            &mut status,
            I2C_TIMEOUT_TICKS,
        )?;
        if status[0] & 0x07 == 0 {
            return Ok(None); // measurement not ready
        }

        let mut raw = [0u8; 2];
        bus.write_read(self.addr, &[REG_RESULT_RANGE_MM], &mut raw, I2C_TIMEOUT_TICKS)?;
        bus.write(
            self.addr,
            &[REG_SYSTEM_INTERRUPT_CLEAR, 0x01],
            I2C_TIMEOUT_TICKS,
        )?;

        let mm = u16::from_be_bytes(raw);
        if mm == 0 || mm >= RANGE_OUT_OF_RANGE_MM {
            return Ok(None);
        }
        Ok(Some(mm))
    }
}
