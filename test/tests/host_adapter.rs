/// HOST ADAPTER
///
/// The plugin registers one listener per event kind against the host's
/// dispatch. Events reach the shared Detangler only through those
/// listeners; a clone's death is cancelled.

use std::sync::Arc;

use detangler_host::{EventBus, EventResponse, HostEvent, HostEventKind, Plugin};
use detangler_server::{Detangler, DetanglerConfig};
use detangler_shared::{PartitionKey, TickPhase, WorldRefType};
use detangler_test::{player_id, quiet_config, TestEntity, TestObjectBuilder, TestWorld, OVERWORLD};

fn bus_with_plugin(config: DetanglerConfig) -> (EventBus<TestEntity, TestWorld>, Arc<Detangler<TestEntity>>) {
    let plugin = Plugin::new(config);
    let mut bus = EventBus::new();
    plugin.build(&mut bus);
    (bus, plugin.detangler().clone())
}

fn created(entity: TestEntity, tick: u64) -> HostEvent<TestEntity> {
    HostEvent::ObjectCreated {
        entity,
        partition: PartitionKey::from(OVERWORLD),
        tick,
    }
}

#[test]
fn every_event_kind_gets_one_listener() {
    let (bus, _) = bus_with_plugin(quiet_config());

    for kind in HostEventKind::ALL {
        assert_eq!(bus.listener_count(kind), 1, "{:?}", kind);
    }
}

#[test]
fn events_drive_the_shared_detangler() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let (bus, detangler) = bus_with_plugin(quiet_config());

    bus.dispatch(&mut world, &HostEvent::Started);
    assert!(detangler.is_running());

    assert_eq!(bus.dispatch(&mut world, &created(clone, 10)), EventResponse::Continue);
    assert_eq!(detangler.registry().lookup(&owner).unwrap().entity, clone);

    assert_eq!(
        bus.dispatch(&mut world, &HostEvent::OwnerReassigned { owner, was_death: true }),
        EventResponse::Continue
    );
    assert!(!world.has_object(&clone));
    assert!(detangler.registry().is_empty());

    bus.dispatch(&mut world, &HostEvent::Shutdown);
    assert!(!detangler.is_running());
}

#[test]
fn clone_deaths_are_cancelled() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let player = world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let (bus, _) = bus_with_plugin(quiet_config());
    bus.dispatch(&mut world, &created(clone, 1));

    assert_eq!(
        bus.dispatch(&mut world, &HostEvent::ObjectDied { entity: clone }),
        EventResponse::Cancel
    );
    assert_eq!(
        bus.dispatch(&mut world, &HostEvent::ObjectDied { entity: player }),
        EventResponse::Continue
    );
}

#[test]
fn only_end_of_tick_drives_checks() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let (bus, _) = bus_with_plugin(quiet_config());
    bus.dispatch(&mut world, &HostEvent::Started);
    bus.dispatch(&mut world, &created(clone, 0));

    for tick in 1..=100 {
        bus.dispatch(&mut world, &HostEvent::Tick { tick, phase: TickPhase::Start });
    }
    assert!(world.has_object(&clone));

    for tick in 1..=100 {
        bus.dispatch(&mut world, &HostEvent::Tick { tick, phase: TickPhase::End });
    }
    assert!(!world.has_object(&clone));
}

#[test]
fn session_end_and_revival_end_are_forwarded() {
    let mut world = TestWorld::new();
    let leaving = player_id(1);
    let recovering = player_id(2);
    world.connect_player(leaving, OVERWORLD);
    world.connect_player(recovering, OVERWORLD);
    let leaving_clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, leaving));
    let recovering_clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, recovering));

    let (bus, detangler) = bus_with_plugin(quiet_config());
    bus.dispatch(&mut world, &created(leaving_clone, 1));
    bus.dispatch(&mut world, &created(recovering_clone, 1));

    bus.dispatch(&mut world, &HostEvent::OwnerSessionEnded { owner: leaving });
    bus.dispatch(&mut world, &HostEvent::RevivalEnded { owner: recovering });

    assert!(!world.has_object(&leaving_clone));
    assert!(world.has_object(&recovering_clone));
    assert!(!detangler.registry().is_in_revival(&recovering));
    assert!(detangler.registry().lookup(&recovering).is_some());
}

#[test]
fn a_cancelling_listener_stops_delivery() {
    use detangler_host::EventDispatch;

    let mut world = TestWorld::new();
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, player_id(1)));

    let (mut bus, _) = bus_with_plugin(quiet_config());
    bus.dispatch(&mut world, &created(clone, 1));
    bus.add_listener(
        HostEventKind::ObjectDied,
        Box::new(|_: &mut TestWorld, _: &HostEvent<TestEntity>| panic!("cancelled death was delivered")),
    );

    assert_eq!(
        bus.dispatch(&mut world, &HostEvent::ObjectDied { entity: clone }),
        EventResponse::Cancel
    );
}
