pub mod control;
pub mod gesture;
pub mod sensor;
