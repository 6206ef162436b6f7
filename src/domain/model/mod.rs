pub mod circuit;
pub mod config;
pub mod demand;
pub mod failure;
pub mod interface;
pub mod model;
pub mod node;
pub mod queries;
pub mod rsvp_lsp;
pub mod srlg;
pub mod validation;
