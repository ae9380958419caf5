/// CLONE LIFECYCLE SCENARIOS
///
/// Detected -> Registered -> Active -> Orphaned -> Reclaimed, plus the
/// Superseded path on respawn and the unconditional wipe on shutdown.
/// Every scenario is driven through the Detangler's notification handlers
/// the way a host would call them.

use detangler_server::{DeathDisposition, Detangler, DetanglerConfig};
use detangler_shared::{keys, MarkerValue, PartitionKey, TickPhase, WorldRefType};
use detangler_test::{
    assert_discarded_once, assert_untracked, player_id, quiet_config, run_ticks, started,
    TestObjectBuilder, TestWorld, OVERWORLD,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn overworld() -> PartitionKey {
    PartitionKey::from(OVERWORLD)
}

#[test]
fn creation_marks_and_registers_the_clone() {
    init_logger();
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let player = world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = Detangler::new(quiet_config());
    let registered = detangler.on_object_created(&mut world, &clone, &overworld(), 100);

    assert_eq!(registered, Some(owner));
    assert_eq!(world.marker_of(&clone, keys::CLONE_MARK), Some(MarkerValue::Bool(true)));
    assert_eq!(world.marker_of(&clone, keys::SPAWN_TICK), Some(MarkerValue::Int(100)));
    assert_eq!(world.marker_of(&clone, keys::IS_REVIVAL_CLONE), Some(MarkerValue::Bool(true)));
    assert_eq!(world.marker_of(&clone, keys::OWNER), Some(MarkerValue::Identity(owner)));
    assert_eq!(world.marker_of(&player, keys::IN_REVIVAL), Some(MarkerValue::Bool(true)));

    let tracked = detangler.registry().lookup(&owner).unwrap();
    assert_eq!(tracked.entity, clone);
    assert_eq!(tracked.spawn_tick, 100);
    assert!(detangler.registry().is_in_revival(&owner));
}

#[test]
fn ordinary_objects_are_ignored_on_creation() {
    let mut world = TestWorld::new();
    let player = world.connect_player(player_id(1), OVERWORLD);
    let zombie = world.spawn(TestObjectBuilder::new(OVERWORLD));

    let detangler = Detangler::new(quiet_config());

    assert_eq!(detangler.on_object_created(&mut world, &player, &overworld(), 1), None);
    assert_eq!(detangler.on_object_created(&mut world, &zombie, &overworld(), 1), None);
    assert!(detangler.registry().is_empty());
    assert!(world.object(&zombie).unwrap().markers.is_empty());
}

#[test]
fn clone_without_owner_is_marked_but_not_registered() {
    let mut world = TestWorld::new();
    let body = world.spawn(TestObjectBuilder::new(OVERWORLD).kind("hardcorerevival:body"));

    let detangler = Detangler::new(quiet_config());

    assert_eq!(detangler.on_object_created(&mut world, &body, &overworld(), 1), None);
    assert_eq!(world.marker_of(&body, keys::CLONE_MARK), Some(MarkerValue::Bool(true)));
    assert!(detangler.registry().is_empty());
}

#[test]
fn session_ending_before_check_reclaims_at_next_registry_check() {
    init_logger();
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = started(quiet_config(), &mut world);

    run_ticks(&detangler, &mut world, 1..100);
    detangler.on_object_created(&mut world, &clone, &overworld(), 100);
    run_ticks(&detangler, &mut world, 100..=150);

    // the check at tick 100 saw the owner online and in revival
    assert!(world.has_object(&clone));
    assert!(detangler.registry().lookup(&owner).is_some());

    world.end_session(&owner);
    run_ticks(&detangler, &mut world, 151..200);
    assert!(world.has_object(&clone));

    run_ticks(&detangler, &mut world, 200..=200);
    assert_discarded_once!(world, clone);
    assert_untracked!(detangler, owner);
}

#[test]
fn respawn_supersedes_the_tracked_clone_exactly_once() {
    init_logger();
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let player = world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = started(quiet_config(), &mut world);
    detangler.on_object_created(&mut world, &clone, &overworld(), 5);

    assert!(detangler.on_owner_reassigned(&mut world, &owner, true));

    assert_discarded_once!(world, clone);
    assert_untracked!(detangler, owner);
    assert_eq!(world.marker_of(&player, keys::IN_REVIVAL), None);
    assert_eq!(world.marker_of(&player, keys::IS_REVIVAL_CLONE), None);

    // later passes never touch it again
    run_ticks(&detangler, &mut world, 1..=300);
    assert_eq!(detangler.scan_count(&mut world, true), 0);
    assert_eq!(world.discard_calls(&clone), 1);
    assert!(world.has_object(&player));
}

#[test]
fn reassignment_without_a_tracked_clone_is_harmless() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);

    let detangler = Detangler::new(quiet_config());

    assert!(!detangler.on_owner_reassigned(&mut world, &owner, false));
    assert_eq!(world.total_discard_calls(), 0);
}

#[test]
fn reregistration_replaces_without_discarding() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let first = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));
    let second = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = Detangler::new(quiet_config());
    detangler.on_object_created(&mut world, &first, &overworld(), 1);
    detangler.on_object_created(&mut world, &second, &overworld(), 2);

    assert_eq!(detangler.registry().len(), 1);
    assert_eq!(detangler.registry().lookup(&owner).unwrap().entity, second);
    assert_eq!(world.total_discard_calls(), 0);
}

#[test]
fn logout_discards_the_clone_once() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = Detangler::new(quiet_config());
    detangler.on_object_created(&mut world, &clone, &overworld(), 1);
    world.end_session(&owner);

    assert!(detangler.on_owner_session_ended(&mut world, &owner));
    assert!(!detangler.on_owner_session_ended(&mut world, &owner));

    assert_discarded_once!(world, clone);
    assert_untracked!(detangler, owner);
}

#[test]
fn logout_with_already_removed_clone_skips_discard() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = Detangler::new(quiet_config());
    detangler.on_object_created(&mut world, &clone, &overworld(), 1);
    detangler_shared::WorldMutType::discard(&mut world, &clone).unwrap();

    assert!(!detangler.on_owner_session_ended(&mut world, &owner));
    assert_eq!(world.discard_calls(&clone), 1);
    assert_untracked!(detangler, owner);
}

#[test]
fn revival_ending_lets_the_next_check_reclaim() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = started(quiet_config(), &mut world);
    detangler.on_object_created(&mut world, &clone, &overworld(), 1);
    detangler.on_revival_ended(&owner);

    // still tracked until the check runs
    assert!(detangler.registry().lookup(&owner).is_some());

    run_ticks(&detangler, &mut world, 1..=100);
    assert_discarded_once!(world, clone);
    assert_untracked!(detangler, owner);
}

#[test]
fn shutdown_clears_everything_without_discarding() {
    let mut world = TestWorld::new();
    let first_owner = player_id(1);
    let second_owner = player_id(2);
    world.connect_player(first_owner, OVERWORLD);
    world.connect_player(second_owner, OVERWORLD);
    let first = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, first_owner));
    let second = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, second_owner));

    let detangler = started(quiet_config(), &mut world);
    detangler.on_object_created(&mut world, &first, &overworld(), 1);
    detangler.on_object_created(&mut world, &second, &overworld(), 1);
    assert_eq!(detangler.registry().len(), 2);

    detangler.on_shutdown();

    assert!(detangler.registry().is_empty());
    assert_eq!(detangler.registry().revival_count(), 0);
    assert_eq!(world.total_discard_calls(), 0);
    assert!(world.has_object(&first));
    assert!(world.has_object(&second));
    assert!(!detangler.is_running());
}

#[test]
fn deaths_of_clones_are_suppressed() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let player = world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));
    let in_progress = world.spawn(TestObjectBuilder::new(OVERWORLD).tag("revival_in_progress"));
    let unreadable = world.spawn(TestObjectBuilder::new(OVERWORLD).failing_reads());

    let detangler = Detangler::new(quiet_config());
    // not yet marked
    assert_eq!(detangler.on_object_died(&world, &clone), DeathDisposition::Allow);

    detangler.on_object_created(&mut world, &clone, &overworld(), 1);

    assert_eq!(detangler.on_object_died(&world, &clone), DeathDisposition::Suppress);
    assert_eq!(detangler.on_object_died(&world, &in_progress), DeathDisposition::Suppress);
    assert_eq!(detangler.on_object_died(&world, &player), DeathDisposition::Allow);
    assert_eq!(detangler.on_object_died(&world, &unreadable), DeathDisposition::Allow);
}

// Start / stop

#[test]
fn first_start_runs_one_reclaiming_sweep() {
    init_logger();
    let mut world = TestWorld::new();
    world.connect_player(player_id(1), OVERWORLD);
    let stale = world.spawn(TestObjectBuilder::new(OVERWORLD).tracked().age(5_000));

    let config = DetanglerConfig {
        auto_run_on_start: true,
        ..quiet_config()
    };
    let detangler = started(config, &mut world);
    assert_discarded_once!(world, stale);

    detangler.stop();
    let later = world.spawn(TestObjectBuilder::new(OVERWORLD).tracked().age(5_000));
    detangler.start(&mut world);

    assert!(world.has_object(&later));
    assert!(detangler.is_running());
}

#[test]
fn startup_sweep_can_be_disabled() {
    let mut world = TestWorld::new();
    let stale = world.spawn(TestObjectBuilder::new(OVERWORLD).tracked().age(5_000));

    started(quiet_config(), &mut world);

    assert!(world.has_object(&stale));
}

#[test]
fn ticks_are_ignored_until_started_and_outside_the_end_phase() {
    let mut world = TestWorld::new();
    let owner = player_id(1);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let detangler = Detangler::new(quiet_config());
    detangler.on_object_created(&mut world, &clone, &overworld(), 1);

    run_ticks(&detangler, &mut world, 1..=300);
    assert!(world.has_object(&clone));

    detangler.start(&mut world);
    for tick in 301..=500 {
        detangler.on_tick(&mut world, tick, TickPhase::Start);
    }
    assert!(world.has_object(&clone));

    run_ticks(&detangler, &mut world, 501..=600);
    assert_discarded_once!(world, clone);
}

#[test]
fn periodic_full_sweep_follows_clean_interval() {
    let mut world = TestWorld::new();
    let stale = world.spawn(TestObjectBuilder::new(OVERWORLD).tracked().age(5_000));

    let config = DetanglerConfig {
        clean_interval_ticks: 50,
        ..quiet_config()
    };
    let detangler = started(config, &mut world);

    run_ticks(&detangler, &mut world, 1..50);
    assert!(world.has_object(&stale));

    run_ticks(&detangler, &mut world, 50..=50);
    assert_discarded_once!(world, stale);
}

#[test]
fn periodic_sweep_only_counts_without_auto_remove() {
    let mut world = TestWorld::new();
    let stale = world.spawn(TestObjectBuilder::new(OVERWORLD).tracked().age(5_000));

    let config = DetanglerConfig {
        clean_interval_ticks: 10,
        auto_remove: false,
        ..quiet_config()
    };
    let detangler = started(config, &mut world);

    run_ticks(&detangler, &mut world, 1..=100);

    assert!(world.has_object(&stale));
    assert_eq!(world.total_discard_calls(), 0);
}

#[test]
fn invalid_config_built_in_code_keeps_registry_checks_running() {
    init_logger();
    let mut world = TestWorld::new();
    let owner = player_id(1);
    world.connect_player(owner, OVERWORLD);
    let clone = world.spawn(TestObjectBuilder::revival_clone(OVERWORLD, owner));

    let config = DetanglerConfig {
        registry_check_interval_ticks: 0,
        high_age_ticks: 0,
        ..quiet_config()
    };
    let detangler = started(config, &mut world);
    assert_eq!(detangler.config().registry_check_interval_ticks, 100);
    assert_eq!(detangler.config().high_age_ticks, 200);

    detangler.on_object_created(&mut world, &clone, &overworld(), 0);
    world.end_session(&owner);
    run_ticks(&detangler, &mut world, 1..=100);

    assert_discarded_once!(world, clone);
    assert_untracked!(detangler, owner);
}
