use super::kill_unit::KillUnitUpdate;
use super::kind::KindOfWorldUpdate;
use super::queue::WorldUpdates;
use super::recalculate::{RecalculateCityUpdate, RecalculateFogOfWarUpdate, RecalculateProductionUpdate};
use super::remove_cae::RemoveCombatAreaEffectUpdate;
use super::switch_off_spell::SwitchOffSpellUpdate;
use super::transport::RecheckTransportCapacityUpdate;
use crate::error::Result;
use crate::rules::UpdateServices;
use crate::rules::database::Database;
use crate::world::ServerWorld;

/// Everything an update may read or mutate while it runs.
pub struct UpdateContext<'a> {
    pub world: &'a mut ServerWorld,
    pub db: &'a Database,
    pub services: &'a mut UpdateServices,
}

/// Outcome of processing one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldUpdateResult {
    /// Finished and nothing else changed.
    Done,
    /// Finished, but queued new updates; the queue must be re-sorted.
    DoneAndLaterUpdatesAdded,
    /// Not finished: it queued prerequisites that must run first. Stays pending.
    RedoBecauseEarlierUpdatesAdded,
}

impl WorldUpdateResult {
    /// `DoneAndLaterUpdatesAdded` if `added`, else `Done`.
    pub fn done(added: bool) -> Self {
        if added {
            Self::DoneAndLaterUpdatesAdded
        } else {
            Self::Done
        }
    }
}

/// One pending mutation of the world.
///
/// Equality is identity: kind plus target. Flags such as a kill's action or a
/// spell's retention, and any progress an update has made, are ignored, so a
/// second request to do the same thing to the same target is a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldUpdate {
    RemoveCombatAreaEffect(RemoveCombatAreaEffectUpdate),
    SwitchOffSpell(SwitchOffSpellUpdate),
    KillUnit(KillUnitUpdate),
    RecheckTransportCapacity(RecheckTransportCapacityUpdate),
    RecalculateCity(RecalculateCityUpdate),
    RecalculateProduction(RecalculateProductionUpdate),
    RecalculateFogOfWar(RecalculateFogOfWarUpdate),
}

impl WorldUpdate {
    pub fn kind(&self) -> KindOfWorldUpdate {
        match self {
            Self::RemoveCombatAreaEffect(_) => KindOfWorldUpdate::RemoveCombatAreaEffect,
            Self::SwitchOffSpell(_) => KindOfWorldUpdate::SwitchOffSpell,
            Self::KillUnit(_) => KindOfWorldUpdate::KillUnit,
            Self::RecheckTransportCapacity(_) => KindOfWorldUpdate::RecheckTransportCapacity,
            Self::RecalculateCity(_) => KindOfWorldUpdate::RecalculateCity,
            Self::RecalculateProduction(_) | Self::RecalculateFogOfWar(_) => {
                KindOfWorldUpdate::RecalculateProduction
            }
        }
    }

    pub fn process(&mut self, ctx: &mut UpdateContext<'_>, queue: &mut WorldUpdates) -> Result<WorldUpdateResult> {
        match self {
            Self::RemoveCombatAreaEffect(u) => u.process(ctx),
            Self::SwitchOffSpell(u) => u.process(ctx, queue),
            Self::KillUnit(u) => u.process(ctx, queue),
            Self::RecheckTransportCapacity(u) => u.process(ctx, queue),
            Self::RecalculateCity(u) => u.process(ctx),
            Self::RecalculateProduction(u) => u.process(ctx),
            Self::RecalculateFogOfWar(u) => u.process(ctx),
        }
    }
}

impl std::fmt::Display for WorldUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoveCombatAreaEffect(u) => write!(f, "RemoveCombatAreaEffect(cae {})", u.cae_urn),
            Self::SwitchOffSpell(u) => write!(f, "SwitchOffSpell(spell {})", u.spell_urn),
            Self::KillUnit(u) => write!(f, "KillUnit(unit {}, {:?})", u.unit_urn, u.action),
            Self::RecheckTransportCapacity(u) => write!(f, "RecheckTransportCapacity{}", u.map_location),
            Self::RecalculateCity(u) => write!(f, "RecalculateCity{}", u.city_location),
            Self::RecalculateProduction(u) => write!(f, "RecalculateProduction({})", u.player_id),
            Self::RecalculateFogOfWar(u) => write!(f, "RecalculateFogOfWar({})", u.player_id),
        }
    }
}
