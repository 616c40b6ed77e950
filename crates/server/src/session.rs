//! One running game: the world, its ruleset, the rules plugged into the
//! engine, and the queue of world updates waiting to run.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use uuid::Uuid;

use realm_engine::messages::ClientConnection;
use realm_engine::rules::UpdateServices;
use realm_engine::rules::database::Database;
use realm_engine::updates::{KillUnitAction, UpdateContext, WorldUpdates};
use realm_engine::world::ServerWorld;
use realm_engine::world::player::{PlayerId, PlayerServerDetails};
use realm_engine::world::position::MapCoords3D;

use crate::config::SessionConfig;
use crate::metrics::Metrics;
use crate::persistence;

pub struct GameSession {
    id: Uuid,
    config: SessionConfig,
    world: ServerWorld,
    db: Database,
    services: UpdateServices,
    updates: WorldUpdates,
    metrics: Arc<Metrics>,
}

impl GameSession {
    pub fn new(config: SessionConfig, db: Database, services: UpdateServices) -> Self {
        let id = Uuid::new_v4();
        let world = ServerWorld::new(config.map_size());
        let updates = WorldUpdates::new().with_max_invocations(config.max_update_invocations);
        tracing::info!(
            "Session {} created: {}x{}x{} map",
            id,
            config.width,
            config.height,
            config.planes
        );
        Self {
            id,
            config,
            world,
            db,
            services,
            updates,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn world(&self) -> &ServerWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ServerWorld {
        &mut self.world
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Updates queued and not yet processed.
    pub fn pending_updates(&self) -> &WorldUpdates {
        &self.updates
    }

    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
        human: bool,
        tax_rate_id: &str,
        connection: Option<Box<dyn ClientConnection>>,
    ) {
        let mut player = PlayerServerDetails::new(player_id, name, human, tax_rate_id, self.world.map_size());
        player.connection = connection;
        self.world.add_player(player);
        self.metrics.player_joined();
        tracing::info!("{} ({}) joined session {}", name, player_id, self.id);
    }

    // ── Root events ─────────────────────────────────────────────────────

    pub fn kill_unit(&mut self, unit_urn: u32, action: KillUnitAction) -> bool {
        self.updates.add_kill_unit(unit_urn, action)
    }

    pub fn switch_off_spell(&mut self, spell_urn: u32) -> bool {
        self.updates.add_switch_off_spell(spell_urn)
    }

    pub fn remove_combat_area_effect(&mut self, cae_urn: u32) -> bool {
        self.updates.add_remove_combat_area_effect(cae_urn)
    }

    pub fn recheck_transport_capacity(&mut self, map_location: MapCoords3D) -> bool {
        self.updates.add_recheck_transport_capacity(map_location)
    }

    pub fn recalculate_city(&mut self, city_location: MapCoords3D) -> bool {
        self.updates.add_recalculate_city(city_location)
    }

    pub fn recalculate_production(&mut self, player_id: PlayerId) -> bool {
        self.updates.add_recalculate_production(player_id)
    }

    pub fn recalculate_fog_of_war(&mut self, player_id: PlayerId) -> bool {
        self.updates.add_recalculate_fog_of_war(player_id)
    }

    // ── Processing ──────────────────────────────────────────────────────

    /// Run every queued update to a fixed point. Returns the number of update invocations.
    ///
    /// On failure the failing update and everything after it stay queued.
    pub fn process_updates(&mut self) -> Result<usize> {
        if self.updates.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        let queued = self.updates.len();
        let mut ctx = UpdateContext {
            world: &mut self.world,
            db: &self.db,
            services: &mut self.services,
        };

        match self.updates.process(&mut ctx) {
            Ok(invocations) => {
                let elapsed = start.elapsed();
                self.metrics.record_batch(invocations as u64, elapsed);
                tracing::debug!(
                    "Session {}: {} queued updates settled after {} invocations ({:.2?})",
                    self.id,
                    queued,
                    invocations,
                    elapsed
                );
                Ok(invocations)
            }
            Err(e) => {
                self.metrics.record_failure();
                tracing::error!(
                    "Session {}: world updates failed with {} still pending: {}",
                    self.id,
                    self.updates.len(),
                    e
                );
                Err(e).with_context(|| format!("processing world updates for session {}", self.id))
            }
        }
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn save(&self, dir: &Path) -> Result<usize> {
        persistence::save_session(&self.world, dir)
    }

    pub fn load(&mut self, dir: &Path) -> Result<usize> {
        persistence::load_into(&mut self.world, dir)
    }
}
