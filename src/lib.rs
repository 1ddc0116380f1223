pub mod advantage;
pub mod calibration;
pub mod error;
pub mod game;
pub mod injury;
pub mod monte_carlo;
pub mod possession;
pub mod prediction;
pub mod rng;
pub mod stats;
pub mod strength;
pub mod tuning;

pub use error::{Result, SimError};
pub use monte_carlo::{SimulationRequest, SimulationResult};
pub use stats::TeamStatisticalProfile;
pub use tuning::SimTuning;
