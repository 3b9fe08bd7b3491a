// WaveCtl — Per-Sensor Signal Conditioning
//
// Raw ToF readings are noisy and drop out for single frames when a finger
// edge clips the beam. Each sensor gets a 3-slot history used to substitute
// missing readings (median-of-3), an EMA low-pass, and an invalid-streak
// counter that eventually forgets a stale smoothed value. A per-frame
// nearest-layer gate keeps background objects permanently inside the sensing
// band from ever entering the filters.

use crate::config::*;

/// History depth for the median substitute.
const HIST_DEPTH: usize = 3;

/// True when a distance lies inside the recognized sensing band.
pub fn in_band(mm: u16) -> bool {
    (BAND_MIN_MM..=BAND_MAX_MM).contains(&mm)
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelFilter {
    hist: [Option<u16>; HIST_DEPTH],
    smoothed: Option<u16>,
    invalid_streak: u8,
}

impl ChannelFilter {
    /// Candidate for this frame: the raw reading when present, otherwise the
    /// median of the recent history (bridges single-frame dropouts).
    fn candidate(&self, raw: Option<u16>) -> Option<u16> {
        raw.or_else(|| median(&self.hist))
    }

    fn admit(&mut self, mm: u16) {
        self.invalid_streak = 0;
        self.smoothed = Some(match self.smoothed {
            // First acceptance seeds the filter directly.
            None => mm,
            // EMA with alpha = 1/4.
            Some(old) => ((3 * old as u32 + mm as u32) / 4) as u16,
        });
    }

    fn mark_invalid(&mut self) {
        self.invalid_streak = self.invalid_streak.saturating_add(1);
        if self.invalid_streak >= INVALID_RESET_COUNT {
            // No near-layer target for a long stretch — forget the value.
            self.smoothed = None;
        }
    }
}

/// Median of up to three retained readings. With two present the midpoint is
/// taken; a single reading stands for itself.
fn median(hist: &[Option<u16>; HIST_DEPTH]) -> Option<u16> {
    let mut vals = [0u16; HIST_DEPTH];
    let mut n = 0;
    for v in hist.iter().flatten() {
        vals[n] = *v;
        n += 1;
    }
    match n {
        0 => None,
        1 => Some(vals[0]),
        2 => Some(((vals[0] as u32 + vals[1] as u32) / 2) as u16),
        _ => {
            vals.sort_unstable();
            Some(vals[1])
        }
    }
}

/// Conditioning state for all three sensors. Owned by the detector; holds no
/// episode state of its own.
#[derive(Debug, Clone, Default)]
pub struct SignalConditioner {
    channels: [ChannelFilter; SENSOR_COUNT],
    hist_idx: usize,
}

impl SignalConditioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current smoothed distance per sensor; `None` = no established value.
    pub fn smoothed(&self) -> [Option<u16>; SENSOR_COUNT] {
        [
            self.channels[0].smoothed,
            self.channels[1].smoothed,
            self.channels[2].smoothed,
        ]
    }

    /// Feed one raw frame through history substitution, nearest-layer gating
    /// and EMA smoothing. Returns the updated smoothed snapshot.
    pub fn condition(&mut self, raw: &[Option<u16>; SENSOR_COUNT]) -> [Option<u16>; SENSOR_COUNT] {
        self.hist_idx = (self.hist_idx + 1) % HIST_DEPTH;

        let mut candidates = [None; SENSOR_COUNT];
        for (i, ch) in self.channels.iter_mut().enumerate() {
            ch.hist[self.hist_idx] = raw[i];
            candidates[i] = ch.candidate(raw[i]);
        }

        // Nearest in-band candidate this frame — the foreground object.
        let frame_min = candidates
            .iter()
            .flatten()
            .copied()
            .filter(|&mm| in_band(mm))
            .min();

        let Some(frame_min) = frame_min else {
            // Nothing in the sensing volume at all; decay every channel.
            for ch in &mut self.channels {
                ch.mark_invalid();
            }
            return self.smoothed();
        };

        // Only readings within NEAR_LAYER_MM behind the nearest object are
        // attributed to the hand; stray reflections on other sensors are not.
        let max_allowed = frame_min.saturating_add(NEAR_LAYER_MM);

        for (i, ch) in self.channels.iter_mut().enumerate() {
            match candidates[i] {
                Some(mm) if in_band(mm) && mm <= max_allowed => ch.admit(mm),
                _ => ch.mark_invalid(),
            }
        }

        self.smoothed()
    }
}
