pub mod model;
pub mod simulation;
pub mod topology;
pub mod utils;
