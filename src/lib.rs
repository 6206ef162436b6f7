pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

pub use crate::domain::model::config::SimulationConfig;
pub use crate::domain::model::demand::{Demand, DemandPath, Hop, PathDetail};
pub use crate::domain::model::failure::UnfailMode;
pub use crate::domain::model::interface::{Interface, InterfaceLoad};
pub use crate::domain::model::model::{DemandKey, InterfaceKey, LspKey, Model, SimulationPhase};
pub use crate::domain::model::node::Node;
pub use crate::domain::model::rsvp_lsp::{LspPath, RoutedLspPath, RsvpLsp};
pub use crate::domain::utils::id::{CircuitId, DemandName, InterfaceName, LspName, NodeName, SrlgName};
pub use crate::error::{Error, Result};
pub use crate::loader::model_builder::load_model;
