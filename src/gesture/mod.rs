// WaveCtl — Gesture Detection Pipeline
//
// Sensor-to-label pipeline: per-sample signal conditioning, episode
// segmentation, feature accumulation, and heuristic classification. Pure
// integer logic with no hardware or esp-idf dependency; the tasks layer
// feeds it samples and dispatches what comes out.

pub mod classify;
pub mod detector;
pub mod episode;
pub mod filter;

pub use classify::classify;
pub use detector::{GestureDetector, StepOutput};
pub use episode::Episode;
