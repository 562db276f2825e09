pub mod engine;
pub mod inference;
pub mod utils;

pub use inference::{Classification, TrafficLightClass, TrafficLightClassifier};
pub use utils::frame::RgbFrame;
