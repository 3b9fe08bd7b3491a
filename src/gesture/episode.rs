// WaveCtl — Gesture Episode & Running Statistics
//
// One `Episode` tracks a single candidate gesture from entry debounce to
// exit debounce/timeout. The detector appends every accepted sample; the
// classifier reads the finalized statistics.

use crate::config::*;
use crate::events::RejectReason;

/// Per-sensor running statistics for the episode in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorTrack {
    /// Smallest/largest smoothed distance observed while valid.
    pub min_mm: Option<u16>,
    pub max_mm: Option<u16>,
    /// When this sensor first/last saw the object in this episode.
    pub first_seen_ms: Option<u32>,
    pub last_seen_ms: Option<u32>,
    /// Peak approach velocity toward the sensor, mm/s. Only movement toward
    /// the sensor is tracked; retreat is ignored.
    pub peak_approach_mm_s: i32,
    /// Previous smoothed value/time, kept regardless of validity so velocity
    /// is measured against the continuous signal across one-frame gaps.
    prev: Option<(u16, u32)>,
}

impl SensorTrack {
    /// Radial travel within the episode. A sensor that never went valid
    /// reports 0, never an underflow.
    pub fn swing_mm(&self) -> u16 {
        match (self.min_mm, self.max_mm) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0,
        }
    }

    pub fn active(&self) -> bool {
        self.swing_mm() > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Episode {
    pub t_start_ms: u32,
    pub t_end_ms: u32,
    pub sensors: [SensorTrack; SENSOR_COUNT],
    pub sample_count: u16,
    /// How often the nearest sensor flipped between consecutive samples — a
    /// proxy for lateral motion across the array.
    pub winner_changes: u16,
    last_winner: Option<usize>,
}

impl Episode {
    pub fn start(now_ms: u32) -> Self {
        Self {
            t_start_ms: now_ms,
            ..Self::default()
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.t_end_ms.saturating_sub(self.t_start_ms)
    }

    pub fn max_swing_mm(&self) -> u16 {
        self.sensors.iter().map(SensorTrack::swing_mm).max().unwrap_or(0)
    }

    pub fn peak_velocity_mm_s(&self) -> i32 {
        self.sensors
            .iter()
            .map(|s| s.peak_approach_mm_s)
            .max()
            .unwrap_or(0)
    }

    /// Fold one conditioned sample into the running statistics.
    pub fn append(
        &mut self,
        smoothed: &[Option<u16>; SENSOR_COUNT],
        valid: &[bool; SENSOR_COUNT],
        now_ms: u32,
    ) {
        self.sample_count = self.sample_count.saturating_add(1);

        let mut winner: Option<(usize, u16)> = None;

        for i in 0..SENSOR_COUNT {
            let track = &mut self.sensors[i];

            if valid[i] {
                // Validity implies an established smoothed value.
                let mm = smoothed[i].unwrap_or(0);

                if track.first_seen_ms.is_none() {
                    track.first_seen_ms = Some(now_ms);
                }
                track.last_seen_ms = Some(now_ms);

                // Instantaneous approach velocity against the previous sample.
                if let Some((prev_mm, prev_ms)) = track.prev {
                    let dt = now_ms.saturating_sub(prev_ms);
                    let dv = prev_mm as i32 - mm as i32; // >0 = moving closer
                    if dt > 0 && dv > 0 {
                        let v = dv * 1000 / dt as i32;
                        if v > track.peak_approach_mm_s {
                            track.peak_approach_mm_s = v;
                        }
                    }
                }

                track.min_mm = Some(track.min_mm.map_or(mm, |lo| lo.min(mm)));
                track.max_mm = Some(track.max_mm.map_or(mm, |hi| hi.max(mm)));

                if winner.map_or(true, |(_, best)| mm < best) {
                    winner = Some((i, mm));
                }
            }

            // Velocity reference advances every sample, valid or not.
            track.prev = smoothed[i].map(|mm| (mm, now_ms));
        }

        if let Some((idx, _)) = winner {
            if self.last_winner.is_some_and(|last| last != idx) {
                self.winner_changes += 1;
            }
            self.last_winner = Some(idx);
        }
    }

    /// Close the episode and decide whether it is a real gesture candidate.
    /// Degenerate episodes are rejected with a reason; the caller discards
    /// them without classification.
    pub fn finalize(&mut self, now_ms: u32) -> Result<(), RejectReason> {
        self.t_end_ms = now_ms;

        if self.sample_count < 2 {
            return Err(RejectReason::TooFewSamples);
        }
        if self.duration_ms() < MIN_EPISODE_MS {
            return Err(RejectReason::TooShort);
        }
        // Two-floor policy: slow deliberate sweeps pass on swing, fast flicks
        // pass on velocity.
        if self.max_swing_mm() < MIN_SWING_MM && self.peak_velocity_mm_s() < MIN_PEAK_VEL_MM_S {
            return Err(RejectReason::WeakMotion);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_all() -> [bool; SENSOR_COUNT] {
        [true, true, true]
    }

    #[test]
    fn finalize_rejects_single_sample() {
        let mut ep = Episode::start(100);
        ep.append(&[Some(80), None, None], &[true, false, false], 100);
        assert_eq!(ep.finalize(300), Err(RejectReason::TooFewSamples));
    }

    #[test]
    fn finalize_rejects_short_duration() {
        let mut ep = Episode::start(100);
        ep.append(&[Some(80), Some(90), None], &[true, true, false], 100);
        ep.append(&[Some(70), Some(85), None], &[true, true, false], 110);
        assert_eq!(ep.finalize(110), Err(RejectReason::TooShort));
    }

    #[test]
    fn finalize_rejects_static_hand() {
        let mut ep = Episode::start(0);
        for t in (0..200).step_by(20) {
            ep.append(&[Some(80), Some(80), None], &[true, true, false], t);
        }
        assert_eq!(ep.finalize(200), Err(RejectReason::WeakMotion));
    }

    #[test]
    fn finalize_passes_on_swing_alone() {
        let mut ep = Episode::start(0);
        // 6 mm of slow travel over 400 ms — well under the velocity floor.
        ep.append(&[Some(86), None, None], &[true, false, false], 0);
        ep.append(&[Some(83), None, None], &[true, false, false], 200);
        ep.append(&[Some(80), None, None], &[true, false, false], 400);
        assert_eq!(ep.finalize(400), Ok(()));
        assert_eq!(ep.max_swing_mm(), 6);
        assert!(ep.peak_velocity_mm_s() < MIN_PEAK_VEL_MM_S);
    }

    #[test]
    fn finalize_passes_on_velocity_alone() {
        let mut ep = Episode::start(0);
        // 4 mm in 10 ms = 400 mm/s flick; swing below the swing floor.
        ep.append(&[Some(84), None, None], &[true, false, false], 0);
        ep.append(&[Some(80), None, None], &[true, false, false], 10);
        ep.append(&[Some(80), None, None], &[true, false, false], 30);
        assert_eq!(ep.finalize(30), Ok(()));
        assert!(ep.max_swing_mm() < MIN_SWING_MM);
        assert_eq!(ep.peak_velocity_mm_s(), 400);
    }

    #[test]
    fn unseen_sensor_reports_zero_swing() {
        let mut ep = Episode::start(0);
        ep.append(&[Some(100), None, None], &[true, false, false], 0);
        ep.append(&[Some(60), None, None], &[true, false, false], 50);
        assert_eq!(ep.sensors[SENSOR_RIGHT].swing_mm(), 0);
        assert_eq!(ep.sensors[SENSOR_TOP].swing_mm(), 0);
        assert_eq!(ep.sensors[SENSOR_LEFT].swing_mm(), 40);
    }

    #[test]
    fn only_approach_counts_toward_peak_velocity() {
        let mut ep = Episode::start(0);
        ep.append(&[Some(60), None, None], &[true, false, false], 0);
        // Hand retreats fast — must not register.
        ep.append(&[Some(120), None, None], &[true, false, false], 20);
        assert_eq!(ep.peak_velocity_mm_s(), 0);
        // Then approaches at 50 mm / 20 ms = 2500 mm/s.
        ep.append(&[Some(70), None, None], &[true, false, false], 40);
        assert_eq!(ep.peak_velocity_mm_s(), 2500);
    }

    #[test]
    fn velocity_bridges_invalid_gap_via_previous_value() {
        let mut ep = Episode::start(0);
        ep.append(&[Some(100), None, None], &[true, false, false], 0);
        // Invalid for this sensor, but the smoothed value is still present;
        // the reference advances so the next step measures a 20 ms delta.
        ep.append(&[Some(100), None, None], &[false, false, false], 20);
        ep.append(&[Some(90), None, None], &[true, false, false], 40);
        assert_eq!(ep.peak_velocity_mm_s(), 500);
    }

    #[test]
    fn winner_changes_track_lateral_motion() {
        let mut ep = Episode::start(0);
        // Left nearest, then right, then left again: two flips.
        ep.append(&[Some(60), Some(80), None], &valid_all(), 0);
        ep.append(&[Some(80), Some(60), None], &valid_all(), 20);
        ep.append(&[Some(60), Some(80), None], &valid_all(), 40);
        assert_eq!(ep.winner_changes, 2);
    }
}
