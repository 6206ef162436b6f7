pub mod model_builder;
pub mod parser;
