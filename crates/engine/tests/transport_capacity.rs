mod support;

use realm_engine::messages::ServerMessage;
use realm_engine::world::spell::MemoryMaintainedSpell;
use realm_engine::world::unit::MemoryUnit;
use support::*;

fn alive_at_sea(h: &Harness) -> Vec<u32> {
    h.world
        .true_map
        .units
        .iter()
        .filter(|u| u.is_alive() && u.unit_location == Some(sea()))
        .map(|u| u.unit_urn)
        .collect()
}

#[test]
fn overloaded_transport_drowns_a_random_passenger() {
    let mut h = Harness::with_random(&[P1, P2], &[1]);
    h.add_unit(MemoryUnit::new(1, "UN_TRIREME", P1, sea()));
    for urn in [2, 3, 4] {
        h.add_unit(MemoryUnit::new(urn, "UN_SPEARMEN", P1, sea()));
    }
    h.queue.add_recheck_transport_capacity(sea());

    h.process().unwrap();

    // Three candidates, the second one picked.
    assert_eq!(*h.random_bounds.borrow(), vec![3]);
    assert_eq!(alive_at_sea(&h), vec![1, 2, 4]);
    assert!(h.messages(P2).contains(&ServerMessage::KillUnit { unit_urn: 3, new_status: None }));
}

#[test]
fn transport_with_room_to_spare_keeps_everyone() {
    let mut h = Harness::new(&[P1]);
    h.add_unit(MemoryUnit::new(1, "UN_TRIREME", P1, sea()));
    h.add_unit(MemoryUnit::new(2, "UN_SPEARMEN", P1, sea()));
    h.queue.add_recheck_transport_capacity(sea());

    assert_eq!(h.process().unwrap(), 1);
    assert_eq!(alive_at_sea(&h), vec![1, 2]);
    assert!(h.random_bounds.borrow().is_empty());
}

#[test]
fn stranded_transport_sinks_with_its_passengers() {
    let mut h = Harness::new(&[P1]);
    h.add_unit(MemoryUnit::new(1, "UN_AIRSHIP", P1, sea()));
    h.add_unit(MemoryUnit::new(2, "UN_SPEARMEN", P1, sea()));
    h.add_unit(MemoryUnit::new(3, "UN_SPEARMEN", P1, sea()));
    h.queue.add_recheck_transport_capacity(sea());

    h.process().unwrap();

    assert!(alive_at_sea(&h).is_empty());
    assert_eq!(*h.random_bounds.borrow(), vec![2, 1]);
}

#[test]
fn units_that_can_enter_the_tile_need_no_room() {
    let mut h = Harness::new(&[P1]);
    h.add_unit(MemoryUnit::new(1, "UN_EAGLES", P1, sea()));
    h.add_unit(MemoryUnit::new(2, "UN_SPEARMEN", P1, sea()));
    h.queue.add_recheck_transport_capacity(sea());

    h.process().unwrap();

    // Flight carries only the unit that has it.
    assert_eq!(alive_at_sea(&h), vec![1]);
}

#[test]
fn stack_wide_passage_carries_everyone_until_it_ends() {
    let mut h = Harness::new(&[P1, P2]);
    for urn in [1, 2, 3] {
        h.add_unit(MemoryUnit::new(urn, "UN_SPEARMEN", P1, sea()));
    }
    h.add_spell(MemoryMaintainedSpell::on_unit(20, "SP_WIND_WALKING", P1, 1, "US_WIND_WALKING"));

    h.queue.add_recheck_transport_capacity(sea());
    h.process().unwrap();
    assert_eq!(alive_at_sea(&h), vec![1, 2, 3]);

    h.queue.add_switch_off_spell(20);
    h.process().unwrap();

    assert!(alive_at_sea(&h).is_empty());
    assert_eq!(*h.random_bounds.borrow(), vec![3, 2, 1]);
    let p2 = h.messages(P2);
    assert_eq!(p2[0], ServerMessage::SwitchOffSpell { spell_urn: 20 });
    assert_eq!(p2.iter().filter(|m| matches!(m, ServerMessage::KillUnit { .. })).count(), 3);
}

#[test]
fn recheck_on_a_cell_without_terrain_fails() {
    let mut h = Harness::new(&[P1]);
    h.world.true_map.cell_mut(loc(0, 0)).unwrap().terrain.tile_type_id = None;
    h.queue.add_recheck_transport_capacity(loc(0, 0));

    let err = h.process().unwrap_err();
    assert!(err.to_string().contains("tile type"), "{err}");
}
