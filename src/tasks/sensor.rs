// WaveCtl — Sensor Task
//
// Reads all three ToF sensors at a fixed 50 Hz tick, stamps each triple with
// the monotonic millisecond clock, and pushes the sample into the gesture
// channel. A failed read degrades to a missing reading; it never stops
// sampling.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::*;
use crate::drivers::tof::Vl53l0x;
use crate::events::RangeSample;

pub fn sensor_task(sensors: [Vl53l0x; SENSOR_COUNT], sample_tx: Sender<RangeSample>) {
    log::info!("Sensor task started");

    let interval = Duration::from_millis(SENSOR_SAMPLE_INTERVAL_MS);

    loop {
        let tick_start = Instant::now();

        let mut mm = [None; SENSOR_COUNT];
        for (i, sensor) in sensors.iter().enumerate() {
            mm[i] = match sensor.read_range_mm() {
                Ok(reading) => reading,
                Err(e) => {
                    log::warn!("ToF read error on sensor {}: {}", i, e);
                    None
                }
            };
        }

        let sample = RangeSample {
            t_ms: crate::now_ms(),
            mm,
        };

        if sample_tx.send(sample).is_err() {
            // Receiver dropped — gesture task has exited. Shut down cleanly.
            log::warn!("Sample channel closed — exiting sensor task");
            return;
        }

        // Sleep for the remainder of the sampling interval to hold 50 Hz.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
