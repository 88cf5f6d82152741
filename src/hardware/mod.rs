pub mod profiles;

pub use profiles::{HardwareProfile, Precision, HARDWARE_PROFILES};
