// WaveCtl — Episode State Machine
//
// Drives when an episode starts, continues, and ends. One detector instance
// owns the signal conditioner and the single in-flight episode; the caller
// threads samples through `step` on its own tick and decides what to do with
// the returned status events. The detector itself performs no I/O.

use crate::config::*;
use crate::events::{RangeSample, StatusEvent};
use crate::gesture::episode::Episode;
use crate::gesture::filter::{in_band, SignalConditioner};

/// Per-state data lives inside the variant, so a cooldown deadline cannot
/// exist while idle and debounce streaks cannot leak across states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Idle { enter_streak: u8 },
    Tracking { exit_streak: u8 },
    Cooldown { until_ms: u32 },
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::Idle { enter_streak: 0 }
    }
}

/// Result of one detector step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepOutput {
    /// True when an episode was just finalized; read it via `last_episode`
    /// before the next reset.
    pub episode_ready: bool,
    pub status: Option<StatusEvent>,
}

impl StepOutput {
    fn quiet() -> Self {
        Self::default()
    }

    fn status(status: StatusEvent) -> Self {
        Self {
            episode_ready: false,
            status: Some(status),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GestureDetector {
    conditioner: SignalConditioner,
    state: DetectorState,
    episode: Episode,
}

impl GestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently finalized episode. Only meaningful on the tick that
    /// reported `episode_ready`.
    pub fn last_episode(&self) -> &Episode {
        &self.episode
    }

    /// Advance the pipeline by one sample tick. Timestamps must be
    /// non-decreasing; out-of-order samples corrupt velocity and duration.
    pub fn step(&mut self, sample: &RangeSample) -> StepOutput {
        let now = sample.t_ms;
        let smoothed = self.conditioner.condition(&sample.mm);
        let valid = validity(&smoothed);
        let any_valid = valid.iter().any(|&v| v);

        match self.state {
            DetectorState::Idle { enter_streak } => {
                if !any_valid {
                    self.state = DetectorState::Idle { enter_streak: 0 };
                    return StepOutput::status(StatusEvent::Idle);
                }
                let streak = enter_streak.saturating_add(1);
                if streak < ENTER_COUNT {
                    self.state = DetectorState::Idle { enter_streak: streak };
                    return StepOutput::status(StatusEvent::Idle);
                }
                self.episode = Episode::start(now);
                self.episode.append(&smoothed, &valid, now);
                self.state = DetectorState::Tracking { exit_streak: 0 };
                StepOutput::status(StatusEvent::Busy)
            }

            DetectorState::Tracking { exit_streak } => {
                if any_valid {
                    self.state = DetectorState::Tracking { exit_streak: 0 };
                    self.episode.append(&smoothed, &valid, now);

                    // Time-based ending: the hand lingered long enough.
                    if now.saturating_sub(self.episode.t_start_ms) > MAX_EPISODE_MS {
                        return self.try_finalize(now);
                    }
                    StepOutput::quiet()
                } else {
                    // The hand left the field; debounce before ending so a
                    // mid-episode flicker does not lose the episode.
                    let streak = exit_streak.saturating_add(1);
                    if streak >= EXIT_COUNT {
                        return self.try_finalize(now);
                    }
                    self.state = DetectorState::Tracking { exit_streak: streak };
                    StepOutput::quiet()
                }
            }

            DetectorState::Cooldown { until_ms } => {
                // Residual presence right after a gesture must not retrigger;
                // wait out the deadline and require an empty field.
                if !any_valid && now >= until_ms {
                    self.reset();
                }
                StepOutput::quiet()
            }
        }
    }

    fn try_finalize(&mut self, now_ms: u32) -> StepOutput {
        match self.episode.finalize(now_ms) {
            Ok(()) => {
                self.state = DetectorState::Cooldown {
                    until_ms: now_ms.wrapping_add(COOLDOWN_MS),
                };
                StepOutput {
                    episode_ready: true,
                    status: None,
                }
            }
            Err(reason) => {
                self.reset();
                StepOutput::status(StatusEvent::EpisodeRejected(reason))
            }
        }
    }

    /// Full reset: filters, episode, and state. Used after a rejected
    /// finalization and at cooldown exit.
    fn reset(&mut self) {
        self.conditioner.reset();
        self.episode = Episode::default();
        self.state = DetectorState::default();
    }
}

/// Validity per sensor, recomputed from the conditioned values: in the
/// sensing band and within the nearest-layer margin of the frame's nearest
/// valid sensor.
fn validity(smoothed: &[Option<u16>; SENSOR_COUNT]) -> [bool; SENSOR_COUNT] {
    let frame_min = smoothed
        .iter()
        .flatten()
        .copied()
        .filter(|&mm| in_band(mm))
        .min();

    let Some(frame_min) = frame_min else {
        return [false; SENSOR_COUNT];
    };
    let max_allowed = frame_min.saturating_add(NEAR_LAYER_MM);

    let mut valid = [false; SENSOR_COUNT];
    for i in 0..SENSOR_COUNT {
        valid[i] = smoothed[i].is_some_and(|mm| in_band(mm) && mm <= max_allowed);
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{GestureDir, RejectReason};
    use crate::gesture::classify::classify;

    const TICK_MS: u32 = 20;

    fn sample(t_ms: u32, mm: [Option<u16>; SENSOR_COUNT]) -> RangeSample {
        RangeSample { t_ms, mm }
    }

    /// Left/right raw distances for a slow horizontal sweep entering on the
    /// left: both ramp from 100 mm down to 85 mm, the right sensor joining
    /// `delay_ms` later. Top stays empty.
    fn sweep_frame(t_ms: u32, delay_ms: u32) -> [Option<u16>; SENSOR_COUNT] {
        let ramp = |since: u32| Some(100u16.saturating_sub((since / TICK_MS).min(15) as u16).max(85));
        let left = ramp(t_ms);
        let right = if t_ms >= delay_ms {
            ramp(t_ms - delay_ms)
        } else {
            None
        };
        [left, right, None]
    }

    #[test]
    fn idle_ticks_report_idle_status() {
        let mut det = GestureDetector::new();
        for t in 0..5 {
            let out = det.step(&sample(t * TICK_MS, [None, None, None]));
            assert!(!out.episode_ready);
            assert_eq!(out.status, Some(StatusEvent::Idle));
        }
    }

    #[test]
    fn tracking_starts_after_enter_debounce() {
        let mut det = GestureDetector::new();
        let out = det.step(&sample(0, [Some(80), None, None]));
        assert_eq!(out.status, Some(StatusEvent::Busy));
        assert!(!out.episode_ready);
    }

    #[test]
    fn static_hand_times_out_and_is_rejected() {
        let mut det = GestureDetector::new();
        let mut t = 0;
        loop {
            let out = det.step(&sample(t, [Some(80), None, None]));
            if let Some(StatusEvent::EpisodeRejected(reason)) = out.status {
                assert_eq!(reason, RejectReason::WeakMotion);
                assert!(!out.episode_ready);
                break;
            }
            assert!(t <= MAX_EPISODE_MS + 2 * TICK_MS, "never rejected");
            t += TICK_MS;
        }
        // Rejection resets everything: with an empty field the next tick idles.
        let out = det.step(&sample(t + TICK_MS, [None, None, None]));
        assert_eq!(out.status, Some(StatusEvent::Idle));
    }

    #[test]
    fn left_sweep_finalizes_on_timeout_and_classifies_left() {
        let mut det = GestureDetector::new();
        let mut t = 0;
        let ready_at = loop {
            let out = det.step(&sample(t, sweep_frame(t, 2 * TICK_MS)));
            assert!(out.status != Some(StatusEvent::Idle) || t == 0);
            if out.episode_ready {
                break t;
            }
            assert!(t <= MAX_EPISODE_MS + 2 * TICK_MS, "episode never finalized");
            t += TICK_MS;
        };
        assert!(ready_at > MAX_EPISODE_MS);

        let ep = det.last_episode();
        assert!(ep.duration_ms() > MAX_EPISODE_MS);
        assert_eq!(ep.sensors[SENSOR_LEFT].first_seen_ms, Some(0));
        assert_eq!(ep.sensors[SENSOR_RIGHT].first_seen_ms, Some(2 * TICK_MS));
        assert!(ep.sensors[SENSOR_TOP].swing_mm() == 0);
        assert_eq!(classify(ep), GestureDir::Left);
    }

    #[test]
    fn fast_bilateral_drop_classifies_tap() {
        let mut det = GestureDetector::new();
        // Both flank sensors ramp 130 → 60 mm at 3 mm per tick: deep swing
        // and an approach well over the tap velocity floor.
        let frame = |t: u32| {
            let d = Some(130u16.saturating_sub((t / TICK_MS * 3).min(70) as u16).max(60));
            [d, d, None]
        };
        let mut t = 0;
        loop {
            let out = det.step(&sample(t, frame(t)));
            if out.episode_ready {
                break;
            }
            assert!(t <= MAX_EPISODE_MS + 2 * TICK_MS, "episode never finalized");
            t += TICK_MS;
        }
        let ep = det.last_episode();
        assert!(ep.sensors[SENSOR_LEFT].swing_mm() > TAP_SWING_MM);
        assert!(ep.peak_velocity_mm_s() >= TAP_VEL_MM_S);
        assert_eq!(classify(ep), GestureDir::Tap);
    }

    #[test]
    fn cooldown_returns_to_idle_once_field_clears() {
        let mut det = GestureDetector::new();
        let mut t = 0;
        loop {
            let out = det.step(&sample(t, sweep_frame(t, 2 * TICK_MS)));
            t += TICK_MS;
            if out.episode_ready {
                break;
            }
        }
        // Retained smoothed values keep the field "occupied" until the
        // invalid streak clears them; then one empty tick exits cooldown.
        let mut idled = false;
        for _ in 0..(INVALID_RESET_COUNT as u32 + 10) {
            let out = det.step(&sample(t, [None, None, None]));
            t += TICK_MS;
            if out.status == Some(StatusEvent::Idle) {
                idled = true;
                break;
            }
        }
        assert!(idled, "detector never returned to idle after cooldown");
    }

    #[test]
    fn validity_requires_band_and_nearest_layer() {
        // Both in band, within the layer margin of each other.
        assert_eq!(validity(&[Some(40), Some(55), None]), [true, true, false]);
        // In band but more than NEAR_LAYER_MM behind the frame minimum.
        assert_eq!(validity(&[Some(40), Some(100), None]), [true, false, false]);
        // Outside the sensing band on both ends.
        assert_eq!(validity(&[Some(20), Some(150), None]), [false, false, false]);
        // No established values at all.
        assert_eq!(validity(&[None, None, None]), [false; SENSOR_COUNT]);
    }

    #[test]
    fn stale_smoothed_value_behind_near_layer_stops_contributing() {
        let mut det = GestureDetector::new();
        // Right sensor alone at 100 mm: admitted, episode starts tracking it.
        det.step(&sample(0, [None, Some(100), None]));
        // The hand jumps to 40 mm on the left while the right's raw drops
        // out. The right channel retains a stale smoothed 100 mm, which is
        // in band but far behind the new frame minimum — it must fail the
        // nearest-layer validity check and freeze out of the episode.
        let mut t = 0;
        for _ in 0..10 {
            t += TICK_MS;
            det.step(&sample(t, [Some(40), None, None]));
        }
        let ep = det.last_episode();
        assert_eq!(ep.sensors[SENSOR_RIGHT].first_seen_ms, Some(0));
        assert_eq!(ep.sensors[SENSOR_RIGHT].last_seen_ms, Some(0));
        assert_eq!(ep.sensors[SENSOR_RIGHT].swing_mm(), 0);
        assert_eq!(ep.sensors[SENSOR_LEFT].first_seen_ms, Some(TICK_MS));
        assert_eq!(ep.sensors[SENSOR_LEFT].last_seen_ms, Some(t));
    }

    #[test]
    fn cooldown_deadline_survives_timer_wrap() {
        let mut det = GestureDetector::new();
        // Finalization lands just before the 32-bit millisecond clock wraps,
        // so the cooldown deadline itself crosses the wrap point.
        let base = u32::MAX - 2021;
        let mut t = base;
        let mut ready = false;
        for _ in 0..110 {
            let rel = t.wrapping_sub(base);
            let out = det.step(&sample(t, sweep_frame(rel, 2 * TICK_MS)));
            if out.episode_ready {
                ready = true;
                break;
            }
            t = t.wrapping_add(TICK_MS);
        }
        assert!(ready, "episode never finalized before the wrap");
    }

    #[test]
    fn mid_episode_dropout_keeps_tracking() {
        let mut det = GestureDetector::new();
        det.step(&sample(0, [Some(80), None, None]));
        // Mid-episode dropout shorter than the exit debounce: the episode
        // survives because the retained smoothed value still validates.
        let out = det.step(&sample(TICK_MS, [None, None, None]));
        assert!(out.status.is_none());
        let out = det.step(&sample(2 * TICK_MS, [Some(78), None, None]));
        assert!(out.status.is_none());
    }
}
