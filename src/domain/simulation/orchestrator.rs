use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::domain::model::model::{Model, SimulationPhase};
use crate::domain::simulation::demand_router::DemandRouter;
use crate::domain::simulation::rsvp_signaling::SignalingEngine;
use crate::error::Result;

impl Model {
    /// Recomputes the whole simulation: reset, signal LSPs, route demands, validate.
    ///
    /// The LSP tie-break draws from an RNG seeded with the model seed, so repeated runs
    /// on an unchanged model produce identical results. On a validation failure the phase
    /// stays at `DemandsRouted` and the results must not be trusted.
    pub fn update_simulation(&mut self) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.update_simulation_with_rng(&mut rng)
    }

    /// Same as [`Model::update_simulation`] with a caller provided tie-break RNG.
    pub fn update_simulation_with_rng<R: RngCore>(&mut self, rng: &mut R) -> Result<()> {
        log::info!(
            "Starting simulation: {} node(s), {} interface(s), {} demand(s), {} RSVP LSP(s)",
            self.nodes.len(),
            self.interfaces.len(),
            self.demands.len(),
            self.lsps.len()
        );

        self.reset_simulation();
        self.phase = SimulationPhase::Reset;

        SignalingEngine::new(self, rng).signal_all();
        self.phase = SimulationPhase::LspsRouted;
        log::info!("RSVP LSPs routed: {}/{}", self.lsps.values().filter(|lsp| lsp.is_routed()).count(), self.lsps.len());

        DemandRouter::new(self).route_all();
        self.phase = SimulationPhase::DemandsRouted;
        log::info!("Demands routed: {}/{}", self.demands.values().filter(|demand| demand.is_routed()).count(), self.demands.len());

        self.validate_model()?;
        self.phase = SimulationPhase::Validated;
        log::info!("Simulation converged");

        Ok(())
    }

    /// Clears every result of the previous run.
    fn reset_simulation(&mut self) {
        for interface in self.interfaces.values_mut() {
            interface.reserved_bandwidth = 0.0;
            interface.traffic = 0.0;
        }
        for lsp in self.lsps.values_mut() {
            lsp.reset();
        }
        for demand in self.demands.values_mut() {
            demand.reset();
        }
    }
}
