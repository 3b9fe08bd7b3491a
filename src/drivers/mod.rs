pub mod led;
pub mod tof;
