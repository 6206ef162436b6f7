use std::path::Path;

use crate::api::model_dto::{CircuitDto, InterfaceDto, ModelDto, NodeDto, RsvpLspDto};
use crate::domain::model::config::SimulationConfig;
use crate::domain::model::demand::Demand;
use crate::domain::model::interface::Interface;
use crate::domain::model::model::Model;
use crate::domain::model::node::Node;
use crate::domain::model::rsvp_lsp::RsvpLsp;
use crate::domain::utils::id::{CircuitId, InterfaceName, NodeName, SrlgName};
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Reads a model description file and builds the model through the construction API.
pub fn load_model(file_path: impl AsRef<Path>) -> Result<Model> {
    let dto: ModelDto = parse_json_file(file_path.as_ref())?;
    log::info!("Model description {} parsed successfully.", file_path.as_ref().display());

    Model::try_from(dto)
}

fn build_node(dto: &NodeDto) -> Result<Node> {
    let mut node = Node::new(dto.name.as_str()).with_igp_shortcuts(dto.igp_shortcuts_enabled).with_failed(dto.failed);
    if dto.lat.is_some() || dto.lon.is_some() {
        node = node.with_coordinates(dto.lat.unwrap_or(0.0), dto.lon.unwrap_or(0.0))?;
    }
    Ok(node)
}

fn build_interface(dto: &InterfaceDto, circuit_id: &CircuitId) -> Result<Interface> {
    let mut interface = Interface::new(dto.name.as_str(), dto.node.as_str(), dto.remote_node.as_str(), dto.cost, dto.capacity, circuit_id.clone())?
        .with_rsvp_enabled(dto.rsvp_enabled.unwrap_or(true));

    if let Some(percent) = dto.percent_reservable_bandwidth {
        interface = interface.with_percent_reservable_bandwidth(percent)?;
    }
    Ok(interface)
}

fn build_lsp(dto: &RsvpLspDto) -> Result<RsvpLsp> {
    let mut lsp = RsvpLsp::new(dto.source.as_str(), dto.dest.as_str(), dto.name.as_str())?;
    if let Some(bandwidth) = dto.configured_setup_bandwidth {
        lsp = lsp.with_configured_setup_bandwidth(bandwidth)?;
    }
    if let Some(metric) = dto.manual_metric {
        lsp = lsp.with_manual_metric(metric)?;
    }
    Ok(lsp)
}

fn add_circuit(model: &mut Model, dto: &CircuitDto) -> Result<()> {
    let circuit_id = CircuitId::new(dto.circuit_id.as_str());
    let side_a = build_interface(&dto.side_a, &circuit_id)?;
    let side_b = build_interface(&dto.side_b, &circuit_id)?;
    model.add_circuit(side_a, side_b)?;

    if dto.failed {
        model.fail_interface(&InterfaceName::new(dto.side_a.name.as_str()), &NodeName::new(dto.side_a.node.as_str()))?;
    }
    Ok(())
}

/// Builds a model in dependency order: nodes, circuits, SRLGs, LSPs, demands.
impl TryFrom<ModelDto> for Model {
    type Error = Error;

    fn try_from(dto: ModelDto) -> Result<Self> {
        let mut config = SimulationConfig { parallel_interfaces: dto.config.parallel_interfaces.unwrap_or(true), ..SimulationConfig::default() };
        if let Some(seed) = dto.config.seed {
            config = config.with_seed(seed);
        }

        let mut model = Model::new(config);

        for node_dto in &dto.nodes {
            model.add_node(build_node(node_dto)?)?;
        }

        for circuit_dto in &dto.circuits {
            add_circuit(&mut model, circuit_dto)?;
        }

        for srlg_dto in &dto.srlgs {
            let name = SrlgName::new(srlg_dto.name.as_str());
            let nodes = srlg_dto.nodes.iter().map(|node| NodeName::new(node.as_str()));
            let interfaces =
                srlg_dto.interfaces.iter().map(|interface| (InterfaceName::new(interface.name.as_str()), NodeName::new(interface.node.as_str())));
            model.add_srlg(name.clone(), nodes, interfaces)?;

            if srlg_dto.failed {
                model.fail_srlg(&name)?;
            }
        }

        for lsp_dto in &dto.rsvp_lsps {
            model.add_rsvp_lsp(build_lsp(lsp_dto)?)?;
        }

        for demand_dto in &dto.demands {
            let demand = Demand::new(demand_dto.source.as_str(), demand_dto.dest.as_str(), demand_dto.traffic, demand_dto.name.as_str())?;
            model.add_demand(demand)?;
        }

        log::info!(
            "Model constructed: {} node(s), {} circuit(s), {} demand(s), {} RSVP LSP(s), {} SRLG(s)",
            dto.nodes.len(),
            dto.circuits.len(),
            dto.demands.len(),
            dto.rsvp_lsps.len(),
            dto.srlgs.len()
        );

        Ok(model)
    }
}
