use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use ip_te_simulator::{InterfaceLoad, InterfaceName, Model, NodeName, SrlgName, load_model, logger};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Simulates RSVP-TE LSP signaling and demand routing over an IP topology")]
struct Cli {
    /// JSON model description to load.
    #[arg(long)]
    model: PathBuf,

    /// Fail a node before simulating. May be repeated.
    #[arg(long = "fail-node")]
    fail_nodes: Vec<String>,

    /// Fail an interface, given as `name@node`, before simulating. May be repeated.
    #[arg(long = "fail-interface")]
    fail_interfaces: Vec<String>,

    /// Fail an SRLG before simulating. May be repeated.
    #[arg(long = "fail-srlg")]
    fail_srlgs: Vec<String>,
}

fn split_interface_arg(arg: &str) -> anyhow::Result<(InterfaceName, NodeName)> {
    match arg.split_once('@') {
        Some((name, node)) if !name.is_empty() && !node.is_empty() => Ok((InterfaceName::new(name), NodeName::new(node))),
        _ => bail!("Interface must be given as name@node, got '{}'", arg),
    }
}

fn apply_failures(model: &mut Model, cli: &Cli) -> anyhow::Result<()> {
    for node in &cli.fail_nodes {
        model.fail_node(&NodeName::new(node.as_str())).with_context(|| format!("Failing node {}", node))?;
    }
    for arg in &cli.fail_interfaces {
        let (name, node) = split_interface_arg(arg)?;
        model.fail_interface(&name, &node).with_context(|| format!("Failing interface {}", arg))?;
    }
    for srlg in &cli.fail_srlgs {
        model.fail_srlg(&SrlgName::new(srlg.as_str())).with_context(|| format!("Failing SRLG {}", srlg))?;
    }
    Ok(())
}

fn log_summary(model: &Model) {
    let diagnostics = model.simulation_diagnostics();
    log::info!(
        "Demands routed {}/{}, LSPs routed {}/{}, failed nodes {}, failed interfaces {}",
        diagnostics.routed_demands,
        diagnostics.demands,
        diagnostics.routed_lsps,
        diagnostics.rsvp_lsps,
        diagnostics.failed_nodes,
        diagnostics.failed_interfaces
    );

    for (key, interface) in model.interfaces() {
        match model.interface_utilization(key) {
            Ok(InterfaceLoad::Up(utilization)) => log::info!(
                "{} on {} -> {}: traffic {:.2}, utilization {:.1}%, reserved {:.2}",
                interface.name,
                interface.node,
                interface.remote_node,
                interface.traffic(),
                utilization,
                interface.reserved_bandwidth()
            ),
            Ok(InterfaceLoad::Down) => log::info!("{} on {} -> {}: down", interface.name, interface.node, interface.remote_node),
            Err(e) => log::error!("{}", e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init();

    let mut model = load_model(&cli.model).with_context(|| format!("Loading model {}", cli.model.display()))?;
    apply_failures(&mut model, &cli)?;

    model.update_simulation().context("Simulation did not converge")?;
    log_summary(&model);

    Ok(())
}
