use super::update::{UpdateContext, WorldUpdateResult};
use crate::error::{Result, UpdateError};
use crate::messages::ServerMessage;

const CALLER: &str = "RemoveCombatAreaEffectUpdate";

/// Remove a combat area effect from the true map and from every player who can see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveCombatAreaEffectUpdate {
    pub cae_urn: u32,
}

impl RemoveCombatAreaEffectUpdate {
    pub fn new(cae_urn: u32) -> Self {
        Self { cae_urn }
    }

    pub(super) fn process(&mut self, ctx: &mut UpdateContext<'_>) -> Result<WorldUpdateResult> {
        let true_cae = ctx
            .world
            .true_map
            .find_combat_area_effect(self.cae_urn)
            .cloned()
            .ok_or_else(|| UpdateError::not_found("combat area effect", self.cae_urn, CALLER))?;

        for player_id in ctx.world.player_ids() {
            if !ctx.services.visibility.can_see_combat_area_effect(ctx.world, &true_cae, player_id) {
                continue;
            }
            let player = ctx.world.player_mut(player_id, CALLER)?;
            if player.memory.remove_combat_area_effect(self.cae_urn).is_some() {
                player.send(ServerMessage::RemoveCombatAreaEffect { cae_urn: self.cae_urn })?;
            }
        }

        ctx.world.true_map.remove_combat_area_effect(self.cae_urn);
        Ok(WorldUpdateResult::Done)
    }
}

