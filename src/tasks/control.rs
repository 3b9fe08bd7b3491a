// WaveCtl — Control Task
//
// The action dispatcher: maps classified gestures to transport commands and
// hands them to a `TransportSink` (the audio player proper lives outside
// this firmware; the shipped sink just logs). Also owns the status LED and
// the warning log for rejected episodes.

use std::sync::mpsc::Receiver;

use crate::drivers::led::StatusLed;
use crate::events::{ControlEvent, StatusEvent, TransportCommand};

/// Where transport commands go. Kept as a trait so the dispatcher does not
/// care whether a real player is wired in.
pub trait TransportSink {
    fn dispatch(&mut self, cmd: TransportCommand);
}

/// Default sink: log the action and nothing else.
pub struct LogTransport;

impl TransportSink for LogTransport {
    fn dispatch(&mut self, cmd: TransportCommand) {
        log::info!("Transport: {:?}", cmd);
    }
}

pub fn control_task(
    control_rx: Receiver<ControlEvent>,
    mut led: StatusLed,
    mut transport: impl TransportSink,
) {
    log::info!("Control task started");

    loop {
        let event = match control_rx.recv() {
            Ok(e) => e,
            Err(_) => {
                log::warn!("Control channel closed — exiting control task");
                return;
            }
        };

        match event {
            ControlEvent::Gesture(dir) => {
                if let Some(cmd) = TransportCommand::from_gesture(dir) {
                    transport.dispatch(cmd);
                }
            }

            ControlEvent::Status(StatusEvent::Idle) => led.idle(),
            ControlEvent::Status(StatusEvent::Busy) => led.busy(),
            ControlEvent::Status(StatusEvent::EpisodeRejected(reason)) => {
                led.warn();
                log::warn!("Episode finalize failed: {}", reason.as_str());
            }
        }
    }
}
