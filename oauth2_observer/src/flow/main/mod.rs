mod classify;
mod detector;
mod schedule;

pub use detector::FlowDetector;
