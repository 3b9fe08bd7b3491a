// WaveCtl — Gesture Task
//
// Owns the detection pipeline. Each incoming sample drives one detector
// step; status events and classified gestures are forwarded to the control
// task, which decides how to surface them.

use std::sync::mpsc::{Receiver, Sender};

use crate::events::{ControlEvent, GestureDir, RangeSample};
use crate::gesture::{classify, GestureDetector};

pub fn gesture_task(sample_rx: Receiver<RangeSample>, control_tx: Sender<ControlEvent>) {
    log::info!("Gesture task started");

    let mut detector = GestureDetector::new();

    loop {
        let sample = match sample_rx.recv() {
            Ok(s) => s,
            Err(_) => {
                log::warn!("Sample channel closed — exiting gesture task");
                return;
            }
        };

        let out = detector.step(&sample);

        if let Some(status) = out.status {
            let _ = control_tx.send(ControlEvent::Status(status));
        }

        if out.episode_ready {
            let episode = detector.last_episode();
            let dir = classify(episode);
            log::info!(
                "Episode {} ms, {} samples, max swing {} mm, peak {} mm/s -> {}",
                episode.duration_ms(),
                episode.sample_count,
                episode.max_swing_mm(),
                episode.peak_velocity_mm_s(),
                dir.display_name()
            );
            if dir != GestureDir::None {
                let _ = control_tx.send(ControlEvent::Gesture(dir));
            }
        }
    }
}
