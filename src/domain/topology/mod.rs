pub mod graph;
pub mod normalizer;
pub mod path_finder;
