//! Shared fixtures for the world update tests: a small ruleset, a world
//! builder, and recording fakes for every collaborator seam.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use realm_engine::error::Result;
use realm_engine::messages::{ClientConnection, ServerMessage};
use realm_engine::rules::database::{
    CitySize, CitySpellEffect, CombatAreaAffectsPlayers, CombatAreaEffectDefinition, Database,
    LifeformType, SpellBookSection, SpellDefinition, TaxRate, TileType, UnitDefinition,
    UnitMagicRealm, UnitSkill,
};
use realm_engine::rules::{
    CityCalculations, CombatMapGenerator, ExpandedUnitDetails, FogOfWarProcessing,
    ProductionCalculations, RandomUtils, UnitCalculations, UpdateServices, Visibility,
};
use realm_engine::updates::{UpdateContext, WorldUpdates};
use realm_engine::world::city::{MemoryGridCell, OverlandMapCity, TerrainData};
use realm_engine::world::combat::{CombatDetails, CombatMap, CombatMapTile};
use realm_engine::world::map::MapSize;
use realm_engine::world::player::{PlayerId, PlayerServerDetails};
use realm_engine::world::position::MapCoords3D;
use realm_engine::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use realm_engine::world::unit::MemoryUnit;
use realm_engine::world::{FogOfWarMemory, ServerWorld};

pub const P1: PlayerId = PlayerId(1);
pub const P2: PlayerId = PlayerId(2);
pub const P3: PlayerId = PlayerId(3);
pub const P4: PlayerId = PlayerId(4);

pub const GRASS: &str = "TT_GRASS";
pub const OCEAN: &str = "TT_OCEAN";

pub fn loc(x: i32, y: i32) -> MapCoords3D {
    MapCoords3D::new(x, y, 0)
}

/// The cell every ocean test uses.
pub fn sea() -> MapCoords3D {
    loc(5, 5)
}

// ---------------------------------------------------------------------------
// Ruleset
// ---------------------------------------------------------------------------

fn unit(realm: &str, figures: i32, hp: i32, capacity: i32, skills: &[&str]) -> UnitDefinition {
    UnitDefinition {
        unit_magic_realm: realm.to_string(),
        figure_count: figures,
        hit_points: hp,
        transport_capacity: capacity,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        upkeep: BTreeMap::from([("RE01".to_string(), 1)]),
    }
}

fn spell(section: SpellBookSection, combat_cost: Option<i32>, caes: &[&str]) -> SpellDefinition {
    SpellDefinition {
        spell_book_section: section,
        combat_casting_cost: combat_cost,
        combat_area_effects: caes.iter().map(|s| s.to_string()).collect(),
        upkeep: BTreeMap::new(),
    }
}

pub fn test_database() -> Database {
    let mut db = Database::default();

    db.unit_magic_realms.insert("LTN".into(), UnitMagicRealm { lifeform_type: LifeformType::Normal });
    db.unit_magic_realms.insert("LTH".into(), UnitMagicRealm { lifeform_type: LifeformType::Hero });
    db.unit_magic_realms.insert("LTC".into(), UnitMagicRealm { lifeform_type: LifeformType::Summoned });

    db.units.insert("UN_SPEARMEN".into(), unit("LTN", 8, 1, 0, &[]));
    db.units.insert("UN_HERO".into(), unit("LTH", 1, 6, 0, &[]));
    db.units.insert("UN_TRIREME".into(), unit("LTN", 1, 10, 2, &["US_SAILING"]));
    db.units.insert("UN_SPIDERS".into(), unit("LTC", 4, 3, 0, &[]));
    db.units.insert("UN_EAGLES".into(), unit("LTN", 2, 3, 0, &["US_FLIGHT"]));
    db.units.insert("UN_AIRSHIP".into(), unit("LTN", 1, 10, 2, &[]));

    db.unit_skills.insert(
        "US_SAILING".into(),
        UnitSkill { passable_tile_types: vec![OCEAN.into()], ..UnitSkill::default() },
    );
    db.unit_skills.insert(
        "US_FLIGHT".into(),
        UnitSkill { passable_tile_types: vec![OCEAN.into()], ..UnitSkill::default() },
    );
    db.unit_skills.insert(
        "US_WIND_WALKING".into(),
        UnitSkill { passable_tile_types: vec![OCEAN.into()], applies_to_stack: true, ..UnitSkill::default() },
    );
    db.unit_skills.insert("US_LIONHEART".into(), UnitSkill { hit_points_bonus: 3, ..UnitSkill::default() });
    db.unit_skills.insert("US_CHARM".into(), UnitSkill { hit_points_bonus: 1, ..UnitSkill::default() });
    db.unit_skills.insert("US_HOLY_WEAPON".into(), UnitSkill::default());

    db.spells.insert("SP_FLIGHT".into(), spell(SpellBookSection::UnitEnchantments, Some(20), &[]));
    db.spells.insert("SP_WIND_WALKING".into(), spell(SpellBookSection::UnitEnchantments, None, &[]));
    db.spells.insert("SP_LIONHEART".into(), spell(SpellBookSection::UnitEnchantments, Some(20), &[]));
    db.spells.insert("SP_HOLY_WEAPON".into(), spell(SpellBookSection::UnitEnchantments, None, &[]));
    db.spells.insert("SP_WALL_OF_FIRE".into(), spell(SpellBookSection::CityEnchantments, Some(30), &[]));
    db.spells.insert("SP_FAMINE".into(), spell(SpellBookSection::CityCurses, None, &[]));
    db.spells.insert(
        "SP_CHARM_OF_LIFE".into(),
        spell(SpellBookSection::OverlandEnchantments, None, &["CAE_CHARM_OF_LIFE"]),
    );
    db.spells.insert(
        "SP_HOLY_ARMS".into(),
        spell(SpellBookSection::OverlandEnchantments, None, &["CAE_HOLY_ARMS"]),
    );

    db.city_spell_effects.insert(
        "SE_WALL_OF_FIRE".into(),
        CitySpellEffect { combat_area_effect_id: Some("CAE_WALL_OF_FIRE".into()) },
    );
    db.city_spell_effects.insert("SE_FAMINE".into(), CitySpellEffect::default());

    db.combat_area_effects.insert(
        "CAE_WALL_OF_FIRE".into(),
        CombatAreaEffectDefinition { affects_players: CombatAreaAffectsPlayers::BothPlayersInCombat, unit_skills: vec![] },
    );
    db.combat_area_effects.insert(
        "CAE_CHARM_OF_LIFE".into(),
        CombatAreaEffectDefinition {
            affects_players: CombatAreaAffectsPlayers::CasterOnly,
            unit_skills: vec!["US_CHARM".into()],
        },
    );
    db.combat_area_effects.insert(
        "CAE_HOLY_ARMS".into(),
        CombatAreaEffectDefinition {
            affects_players: CombatAreaAffectsPlayers::AllEvenNotInCombat,
            unit_skills: vec!["US_HOLY_WEAPON".into()],
        },
    );

    db.tile_types.insert(GRASS.into(), TileType { movement_cost: Some(2) });
    db.tile_types.insert(OCEAN.into(), TileType { movement_cost: None });

    db.city_sizes.insert("CS_HAMLET".into(), CitySize { min_population: 1000 });
    db.city_sizes.insert("CS_TOWN".into(), CitySize { min_population: 5000 });
    db.tax_rates.insert("TR_NORMAL".into(), TaxRate { unrest_percent: 20 });
    db
}

// ---------------------------------------------------------------------------
// Recording fakes
// ---------------------------------------------------------------------------

pub type Log<T> = Rc<RefCell<Vec<T>>>;

#[derive(Default)]
pub struct RecordingConnection {
    pub sent: Log<ServerMessage>,
}

impl ClientConnection for RecordingConnection {
    fn send(&mut self, message: ServerMessage) -> Result<()> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }
}

/// Every entity is visible to exactly `viewers`.
pub struct FixedVisibility {
    pub viewers: BTreeSet<PlayerId>,
}

impl Visibility for FixedVisibility {
    fn can_see_unit(&self, _: &ServerWorld, _: &MemoryUnit, player: PlayerId) -> bool {
        self.viewers.contains(&player)
    }

    fn can_see_spell(&self, _: &ServerWorld, _: &MemoryMaintainedSpell, player: PlayerId) -> bool {
        self.viewers.contains(&player)
    }

    fn can_see_combat_area_effect(&self, _: &ServerWorld, _: &MemoryCombatAreaEffect, player: PlayerId) -> bool {
        self.viewers.contains(&player)
    }

    fn can_see_city(&self, _: &ServerWorld, _: MapCoords3D, player: PlayerId) -> bool {
        self.viewers.contains(&player)
    }
}

/// Skills come from the definition, spells on the unit and caster-only CAEs;
/// alive figures can be forced to zero per unit.
pub struct FakeUnitCalculations {
    pub no_figures_left: Rc<RefCell<BTreeSet<u32>>>,
    pub blocked_combat_tiles: BTreeSet<String>,
}

impl UnitCalculations for FakeUnitCalculations {
    fn expand_unit(&self, world: &ServerWorld, unit: &MemoryUnit, db: &Database) -> Result<ExpandedUnitDetails> {
        let def = db.find_unit(&unit.unit_id, "FakeUnitCalculations")?;
        let mut skills: BTreeSet<String> = def.skills.iter().cloned().collect();
        for spell in &world.true_map.spells {
            if spell.unit_urn == Some(unit.unit_urn) {
                skills.extend(spell.unit_skill_id.clone());
            }
        }
        Ok(ExpandedUnitDetails {
            unit_urn: unit.unit_urn,
            unit_id: unit.unit_id.clone(),
            owning_player_id: unit.owning_player_id,
            lifeform_type: db.lifeform_type(&unit.unit_id, "FakeUnitCalculations")?,
            skills,
            transport_capacity: def.transport_capacity,
            alive_figure_count: if self.no_figures_left.borrow().contains(&unit.unit_urn) {
                0
            } else {
                def.figure_count
            },
        })
    }

    fn movement_cost_to_enter(
        &self,
        unit: &ExpandedUnitDetails,
        stack_skills: &BTreeSet<String>,
        tile_type_id: &str,
        db: &Database,
    ) -> Result<Option<i32>> {
        if let Some(cost) = db.find_tile_type(tile_type_id, "FakeUnitCalculations")?.movement_cost {
            return Ok(Some(cost));
        }
        for skill_id in stack_skills {
            let skill = db.find_unit_skill(skill_id, "FakeUnitCalculations")?;
            let own = unit.skills.contains(skill_id);
            if (own || skill.applies_to_stack) && skill.passable_tile_types.iter().any(|t| t == tile_type_id) {
                return Ok(Some(1));
            }
        }
        Ok(None)
    }

    fn can_occupy_combat_tile(&self, unit: &ExpandedUnitDetails, tile: &CombatMapTile, _: &Database) -> Result<bool> {
        Ok(!self.blocked_combat_tiles.contains(&tile.tile_type_id) || unit.skills.contains("US_FLIGHT"))
    }
}

pub struct FixedCityCalculations {
    pub minimum_farmers: i32,
    pub rebels: i32,
    pub tax_rates_seen: Log<String>,
}

impl CityCalculations for FixedCityCalculations {
    fn city_size_id(&self, city: &OverlandMapCity, _: &Database) -> Result<Option<String>> {
        Ok(Some(if city.city_population >= 5000 { "CS_TOWN" } else { "CS_HAMLET" }.to_string()))
    }

    fn minimum_farmers(&self, _: &ServerWorld, _: MapCoords3D, _: &Database) -> Result<i32> {
        Ok(self.minimum_farmers)
    }

    fn number_of_rebels(&self, _: &ServerWorld, _: MapCoords3D, tax_rate_id: &str, _: &Database) -> Result<i32> {
        self.tax_rates_seen.borrow_mut().push(tax_rate_id.to_string());
        Ok(self.rebels)
    }
}

pub struct RecordingProduction {
    pub calls: Log<PlayerId>,
}

impl ProductionCalculations for RecordingProduction {
    fn recalculate_global_production_values(&self, world: &mut ServerWorld, player: PlayerId, _: &Database) -> Result<()> {
        self.calls.borrow_mut().push(player);
        let upkeep = world
            .true_map
            .units
            .iter()
            .filter(|u| u.owning_player_id == player && u.is_alive())
            .count() as i32;
        world.player_mut(player, "RecordingProduction")?.production.insert("RE01".into(), -upkeep);
        Ok(())
    }
}

pub struct RecordingFogOfWar {
    pub calls: Log<PlayerId>,
}

impl FogOfWarProcessing for RecordingFogOfWar {
    fn update_and_send_fog_of_war(&self, _: &mut ServerWorld, player: PlayerId, _: &Database) -> Result<()> {
        self.calls.borrow_mut().push(player);
        Ok(())
    }
}

pub struct RecordingCombatMap {
    pub calls: Log<MapCoords3D>,
}

impl CombatMapGenerator for RecordingCombatMap {
    fn regenerate_borders(
        &self,
        true_map: &FogOfWarMemory,
        combat_location: MapCoords3D,
        combat_map: &mut CombatMap,
        _: &Database,
    ) -> Result<()> {
        self.calls.borrow_mut().push(combat_location);
        let walled = true_map
            .spells
            .iter()
            .any(|s| s.city_location == Some(combat_location) && s.city_spell_effect_id.as_deref() == Some("SE_WALL_OF_FIRE"));
        for tile in combat_map.tiles_mut() {
            tile.borders = if walled { vec!["WALL_OF_FIRE".into()] } else { Vec::new() };
        }
        Ok(())
    }
}

/// Returns queued picks in order (0 once they run out) and records each bound asked for.
pub struct FixedRandom {
    pub picks: VecDeque<usize>,
    pub bounds: Log<usize>,
}

impl RandomUtils for FixedRandom {
    fn next_int(&mut self, bound: usize) -> usize {
        self.bounds.borrow_mut().push(bound);
        self.picks.pop_front().unwrap_or(0).min(bound - 1)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A 10x10 single-plane world of grass with an ocean cell at (5, 5), four
/// human players, and every seam replaced by a recording fake.
pub struct Harness {
    pub world: ServerWorld,
    pub db: Database,
    pub services: UpdateServices,
    pub queue: WorldUpdates,
    pub sent: HashMap<PlayerId, Log<ServerMessage>>,
    pub production_calls: Log<PlayerId>,
    pub fog_of_war_calls: Log<PlayerId>,
    pub combat_map_calls: Log<MapCoords3D>,
    pub random_bounds: Log<usize>,
    pub tax_rates_seen: Log<String>,
    pub no_figures_left: Rc<RefCell<BTreeSet<u32>>>,
}

impl Harness {
    /// Everything is visible to `viewers` only.
    pub fn new(viewers: &[PlayerId]) -> Self {
        Self::with_random(viewers, &[])
    }

    pub fn with_random(viewers: &[PlayerId], picks: &[usize]) -> Self {
        let size = MapSize::new(10, 10, 1);
        let mut world = ServerWorld::new(size);
        for y in 0..10 {
            for x in 0..10 {
                let tile = if loc(x, y) == sea() { OCEAN } else { GRASS };
                *world.true_map.cell_mut(loc(x, y)).unwrap() = MemoryGridCell {
                    terrain: TerrainData {
                        tile_type_id: Some(tile.to_string()),
                        city: None,
                    },
                };
            }
        }

        let mut sent = HashMap::new();
        for id in [P1, P2, P3, P4] {
            let connection = RecordingConnection::default();
            sent.insert(id, Rc::clone(&connection.sent));
            let mut player = PlayerServerDetails::new(id, &format!("Wizard {}", id.0), true, "TR_NORMAL", size)
                .with_connection(Box::new(connection));
            player.memory = world.true_map.clone();
            world.add_player(player);
        }

        let production_calls = Log::default();
        let fog_of_war_calls = Log::default();
        let combat_map_calls = Log::default();
        let random_bounds = Log::default();
        let tax_rates_seen = Log::default();
        let no_figures_left = Rc::new(RefCell::new(BTreeSet::new()));

        let services = UpdateServices {
            visibility: Box::new(FixedVisibility { viewers: viewers.iter().copied().collect() }),
            units: Box::new(FakeUnitCalculations {
                no_figures_left: Rc::clone(&no_figures_left),
                blocked_combat_tiles: BTreeSet::from(["CTL_WATER".to_string()]),
            }),
            cities: Box::new(FixedCityCalculations {
                minimum_farmers: 2,
                rebels: 1,
                tax_rates_seen: Rc::clone(&tax_rates_seen),
            }),
            production: Box::new(RecordingProduction { calls: Rc::clone(&production_calls) }),
            fog_of_war: Box::new(RecordingFogOfWar { calls: Rc::clone(&fog_of_war_calls) }),
            combat_map: Box::new(RecordingCombatMap { calls: Rc::clone(&combat_map_calls) }),
            random: Box::new(FixedRandom { picks: picks.iter().copied().collect(), bounds: Rc::clone(&random_bounds) }),
        };

        Self {
            world,
            db: test_database(),
            services,
            queue: WorldUpdates::new(),
            sent,
            production_calls,
            fog_of_war_calls,
            combat_map_calls,
            random_bounds,
            tax_rates_seen,
            no_figures_left,
        }
    }

    /// Put a unit in the true map and in every player's memory.
    pub fn add_unit(&mut self, unit: MemoryUnit) {
        for player in self.world.players.values_mut() {
            player.memory.units.push(unit.clone());
        }
        self.world.true_map.units.push(unit);
    }

    pub fn add_spell(&mut self, spell: MemoryMaintainedSpell) {
        for player in self.world.players.values_mut() {
            player.memory.spells.push(spell.clone());
        }
        self.world.true_map.spells.push(spell);
    }

    pub fn add_cae(&mut self, cae: MemoryCombatAreaEffect) {
        for player in self.world.players.values_mut() {
            player.memory.combat_area_effects.push(cae.clone());
        }
        self.world.true_map.combat_area_effects.push(cae);
    }

    pub fn add_city(&mut self, location: MapCoords3D, city: OverlandMapCity) {
        self.world.true_map.cell_mut(location).unwrap().terrain.city = Some(city.clone());
        for player in self.world.players.values_mut() {
            player.memory.cell_mut(location).unwrap().terrain.city = Some(city.clone());
        }
    }

    pub fn add_combat(&mut self, location: MapCoords3D, attacker: Option<PlayerId>, defender: Option<PlayerId>) {
        self.world.combats.push(CombatDetails {
            combat_location: location,
            attacking_player_id: attacker,
            defending_player_id: defender,
            combat_map: CombatMap::new_filled(4, 4, "CTL_GRASS"),
            items_from_heroes_who_died_in_combat: Vec::new(),
        });
    }

    pub fn process(&mut self) -> Result<usize> {
        let mut ctx = UpdateContext {
            world: &mut self.world,
            db: &self.db,
            services: &mut self.services,
        };
        self.queue.process(&mut ctx)
    }

    pub fn messages(&self, player: PlayerId) -> Vec<ServerMessage> {
        self.sent[&player].borrow().clone()
    }

    pub fn memory(&self, player: PlayerId) -> &FogOfWarMemory {
        &self.world.players[&player].memory
    }
}
