pub mod generator;

pub use generator::TrafficGenerator;
