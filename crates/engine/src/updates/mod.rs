//! World updates: cascading consequences of game events, run to a fixed point.
//!
//! A root event such as "kill this unit" is queued on [`WorldUpdates`]; while
//! it runs it may queue further updates (switch off the spells on the unit,
//! recheck transport capacity where it stood, recalculate its owner's
//! production), which may queue more. [`WorldUpdates::process`] keeps going
//! until nothing is pending.

pub mod kill_unit;
pub mod kind;
pub mod queue;
pub mod recalculate;
pub mod remove_cae;
pub mod switch_off_spell;
pub mod transport;
pub mod update;

pub use kill_unit::{KillUnitAction, KillUnitUpdate};
pub use kind::KindOfWorldUpdate;
pub use queue::{DEFAULT_MAX_INVOCATIONS, WorldUpdates};
pub use recalculate::{RecalculateCityUpdate, RecalculateFogOfWarUpdate, RecalculateProductionUpdate};
pub use remove_cae::RemoveCombatAreaEffectUpdate;
pub use switch_off_spell::SwitchOffSpellUpdate;
pub use transport::RecheckTransportCapacityUpdate;
pub use update::{UpdateContext, WorldUpdate, WorldUpdateResult};
