use serde::{Deserialize, Serialize};

/// Scheduling order of world updates. Declaration order is processing order.
///
/// An update whose effect could be invalidated by a not-yet-applied upstream
/// change sorts after that change: a spell's combat area effects go before the
/// spell, spells on a unit go before the unit's death, and deaths settle before
/// transport capacity is checked. Recalculations only read settled state, so
/// they run last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KindOfWorldUpdate {
    RemoveCombatAreaEffect,
    SwitchOffSpell,
    KillUnit,
    RecheckTransportCapacity,
    RecalculateCity,
    /// Shared by production and fog-of-war recalculation.
    RecalculateProduction,
}

impl KindOfWorldUpdate {
    /// 1-based rank; lower is processed first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::RemoveCombatAreaEffect => 1,
            Self::SwitchOffSpell => 2,
            Self::KillUnit => 3,
            Self::RecheckTransportCapacity => 4,
            Self::RecalculateCity => 5,
            Self::RecalculateProduction => 6,
        }
    }
}
