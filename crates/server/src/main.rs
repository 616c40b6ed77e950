use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use realm_engine::updates::KillUnitAction;
use realm_engine::world::city::OverlandMapCity;
use realm_engine::world::player::PlayerId;
use realm_engine::world::position::MapCoords3D;
use realm_engine::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use realm_engine::world::unit::MemoryUnit;
use realm_server::config::SessionConfig;
use realm_server::connection;
use realm_server::session::GameSession;
use realm_server::{database, rules};

#[tokio::main]
async fn main() -> Result<()> {
    let demo_mode = std::env::args().any(|a| a == "--demo");
    let config_path: Option<PathBuf> = std::env::args()
        .skip_while(|a| a != "--config")
        .nth(1)
        .map(PathBuf::from);
    let save_arg: Option<PathBuf> = std::env::args()
        .skip_while(|a| a != "--save")
        .nth(1)
        .map(PathBuf::from);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = match &config_path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if save_arg.is_some() {
        config.save_dir = save_arg;
    }
    let db = match &config.database {
        Some(path) => database::load(path)?,
        None => database::builtin()?,
    };
    let services = rules::standard(&config);

    if demo_mode {
        return run_demo(config, db, services).await;
    }

    tracing::info!("Realm session server");
    let mut session = GameSession::new(config.clone(), db, services);

    // ── Restore the saved session, then refresh everything derived ───────
    if let Some(dir) = &config.save_dir {
        match session.load(dir) {
            Ok(0) => tracing::info!("No saved session in {}", dir.display()),
            Ok(n) => tracing::info!("Loaded {} files from {}", n, dir.display()),
            Err(e) => tracing::error!("Failed to load saved session: {:#}", e),
        }
    }
    for player_id in session.world().player_ids() {
        session.recalculate_production(player_id);
        session.recalculate_fog_of_war(player_id);
    }
    session.process_updates()?;
    log_metrics(&session);

    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
    tracing::info!("Ctrl+C received, shutting down...");

    // ── Save on shutdown ─────────────────────────────────────────────────
    if let Some(dir) = &config.save_dir {
        match session.save(dir) {
            Ok(n) => tracing::info!("Shutdown save complete: {} files written", n),
            Err(e) => tracing::error!("Shutdown save failed: {:#}", e),
        }
    }
    Ok(())
}

fn log_metrics(session: &GameSession) {
    match serde_json::to_string(&session.metrics().snapshot()) {
        Ok(json) => tracing::info!("Metrics: {}", json),
        Err(e) => tracing::warn!("Could not serialize metrics: {}", e),
    }
}

/// A small scripted game: a sinking trireme, a lost enchantment and a wall of
/// fire running out, each followed through to every client.
async fn run_demo(
    config: SessionConfig,
    db: realm_engine::rules::database::Database,
    services: realm_engine::rules::UpdateServices,
) -> Result<()> {
    tracing::info!("Realm world update demo");

    let mut session = GameSession::new(config.clone(), db, services);
    let mut clients: Vec<JoinHandle<usize>> = Vec::new();

    for (id, name) in [(1, "Merlin"), (2, "Freya")] {
        let player_id = PlayerId(id);
        let (conn, rx) = connection::channel(player_id);
        session.add_player(player_id, name, true, "TR_20", Some(Box::new(conn)));
        clients.push(tokio::spawn(connection::log_messages(player_id, rx)));
    }
    session.add_player(PlayerId(3), "Rjak", false, "TR_10", None);

    // ── Scenario ─────────────────────────────────────────────────────────
    let home = MapCoords3D::new(4, 4, 0);
    let sea = MapCoords3D::new(6, 4, 0);
    {
        let world = session.world_mut();
        let size = world.map_size();
        for y in 0..size.height {
            for x in 0..size.width {
                for plane in 0..size.planes {
                    let coords = MapCoords3D::new(x, y, plane);
                    let tile = if x >= 6 { "TT_OCEAN" } else { "TT_GRASSLAND" };
                    world.true_map.cell_mut(coords)?.terrain.tile_type_id = Some(tile.to_string());
                }
            }
        }
        world.true_map.cell_mut(home)?.terrain.city = Some(OverlandMapCity::new("Camelot", PlayerId(1), 7400));

        world.true_map.units.push(MemoryUnit::new(1, "UN_TRIREME", PlayerId(1), sea));
        for urn in [2, 3] {
            world.true_map.units.push(MemoryUnit::new(urn, "UN_SPEARMEN", PlayerId(1), sea));
        }
        let mut hero = MemoryUnit::new(4, "UN_HERO_WARRIOR", PlayerId(2), MapCoords3D::new(5, 4, 0));
        hero.damage_taken = 7;
        world.true_map.units.push(hero);
        world.true_map.units.push(MemoryUnit::new(5, "UN_SWORDSMEN", PlayerId(1), home));

        world.true_map.spells.push(MemoryMaintainedSpell::on_unit(10, "SP_LIONHEART", PlayerId(2), 4, "US_LIONHEART"));
        world.true_map.spells.push(MemoryMaintainedSpell::on_city(11, "SP_WALL_OF_FIRE", PlayerId(1), home, "SE_WALL_OF_FIRE"));
        world.true_map.combat_area_effects.push(MemoryCombatAreaEffect {
            cae_urn: 20,
            combat_area_effect_id: "CAE_WALL_OF_FIRE".into(),
            map_location: Some(home),
            casting_player_id: Some(PlayerId(1)),
        });
    }

    // Everyone gets their first look at the world.
    session.recalculate_city(home);
    for player_id in session.world().player_ids() {
        session.recalculate_production(player_id);
        session.recalculate_fog_of_war(player_id);
    }
    session.process_updates()?;

    tracing::info!("-- The trireme is sunk; its passengers can't swim --");
    session.kill_unit(1, KillUnitAction::HealableOverlandDamage);
    session.process_updates()?;

    tracing::info!("-- Lionheart is dispelled from the wounded hero --");
    session.switch_off_spell(10);
    session.process_updates()?;

    tracing::info!("-- Wall of Fire around Camelot runs out --");
    session.switch_off_spell(11);
    session.process_updates()?;

    let world = session.world();
    tracing::info!(
        "Demo finished: {} units, {} spells, {} combat area effects left in the true map",
        world.true_map.units.len(),
        world.true_map.spells.len(),
        world.true_map.combat_area_effects.len()
    );
    log_metrics(&session);

    if let Some(dir) = &config.save_dir {
        session.save(dir)?;
    }

    // Dropping the session closes every client channel.
    drop(session);
    for client in clients {
        let received = client.await.context("client task panicked")?;
        tracing::debug!("Client task drained {} messages", received);
    }
    Ok(())
}
