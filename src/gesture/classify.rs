// WaveCtl — Episode Classification
//
// Ordered heuristic rules over a finalized episode; first match wins.
// Sensor geometry: left and right flank the gesture plane, top sits above
// the midline, so horizontal direction comes from which side was entered
// first and vertical direction from bottom-pair vs top entry order.

use crate::config::*;
use crate::events::GestureDir;
use crate::gesture::episode::Episode;

/// True when `later` follows `earlier` by a gap inside [GAP_MIN_MS, GAP_MAX_MS].
/// Simultaneous entry (gap 0) is excluded; the lower bound is inclusive.
fn gap_in_window(earlier: u32, later: u32) -> bool {
    later > earlier && (GAP_MIN_MS..=GAP_MAX_MS).contains(&(later - earlier))
}

/// Map a finalized episode to a gesture label. Pure function of the episode
/// statistics; never fails — anything unmatched is `None`.
pub fn classify(ep: &Episode) -> GestureDir {
    let left = &ep.sensors[SENSOR_LEFT];
    let right = &ep.sensors[SENSOR_RIGHT];
    let top = &ep.sensors[SENSOR_TOP];

    let max_vel = ep.peak_velocity_mm_s();

    // ---------- Tap ----------
    // Simultaneous strong bilateral motion with a fast approach: the palm
    // drops onto the plane, swinging both flank sensors at once.
    if left.swing_mm() > TAP_SWING_MM && right.swing_mm() > TAP_SWING_MM && max_vel >= TAP_VEL_MM_S {
        return GestureDir::Tap;
    }

    // ---------- Left / Right swipes ----------
    // Named by the side the hand entered on: left sensor seen first is a
    // Left swipe. Requires the top sensor quiet so diagonal entries do not
    // double-fire as horizontal.
    if let (Some(t_left), Some(t_right)) = (left.first_seen_ms, right.first_seen_ms) {
        let strong_enough = left.swing_mm() > SWIPE_SWING_MM || right.swing_mm() > SWIPE_SWING_MM;
        if left.active() && right.active() && strong_enough && !top.active() {
            if gap_in_window(t_left, t_right) {
                return GestureDir::Left;
            }
            if gap_in_window(t_right, t_left) {
                return GestureDir::Right;
            }
        }
    }

    // ---------- Up / Down swipes ----------
    // The bottom of the plane is whichever flank sensor saw the hand first.
    let t_bottom = [left, right]
        .into_iter()
        .filter(|s| s.active())
        .filter_map(|s| s.first_seen_ms)
        .min();

    if let (Some(t_bottom), Some(t_top)) = (t_bottom, top.first_seen_ms) {
        let strong_enough = left.swing_mm() > SWIPE_SWING_MM
            || right.swing_mm() > SWIPE_SWING_MM
            || top.swing_mm() > SWIPE_SWING_MM;
        if strong_enough {
            if gap_in_window(t_bottom, t_top) {
                return GestureDir::Up;
            }
            if gap_in_window(t_top, t_bottom) {
                return GestureDir::Down;
            }
        }
    }

    GestureDir::None
}
