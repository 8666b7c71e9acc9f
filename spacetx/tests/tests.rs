use std::f64::consts::TAU;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use spacetx::simulation::events::{EventQueue, SimEvent};
use spacetx::simulation::integrator::{advance, advance_phase, spiral_position, OrbitFrame};
use spacetx::simulation::quadtree::{Bounds, SpatialIndex};
use spacetx::{
    ConfigError, Entity, EntityId, EntityKind, EntityStore, Frustum, NVec3, OrbitDescriptor, Parameters, Scenario,
    ScenarioConfig, SimError, SimulationCore, Transaction,
};

/// Default parameters with a fixed seed
pub fn test_params() -> Parameters {
    Parameters {
        seed: 1234,
        ..Parameters::default()
    }
}

/// Parameters under which every free body near a major is captured on the first tick
pub fn capture_params() -> Parameters {
    Parameters {
        capture_chance_min: 1.0,
        capture_chance_max: 1.0,
        capture_radius_multiplier: 1.0e4,
        ..test_params()
    }
}

/// Started core with its own seeded ChaCha8 stream
pub fn seeded_core(params: Parameters, seed: u64) -> SimulationCore {
    let mut core = SimulationCore::with_rng(params, ChaCha8Rng::seed_from_u64(seed)).expect("valid parameters");
    core.start();
    core
}

/// Feed every amount, returning the accepted entities
pub fn ingest(core: &mut SimulationCore, amounts: &[f64]) -> Vec<Entity> {
    amounts
        .iter()
        .enumerate()
        .filter_map(|(i, &amount)| core.process_transaction(&Transaction::new(format!("tx-{i}"), amount)))
        .collect()
}

/// Half-size of a box that holds every entity with room to spare
pub fn population_extent(core: &SimulationCore) -> f64 {
    core.entities()
        .iter()
        .fold(1.0, |acc: f64, e| acc.max(e.position.abs().max() + e.scale))
}

// ==================================================================================
// Ingestion tests
// ==================================================================================

#[test]
fn small_amount_becomes_small_body() {
    let mut core = seeded_core(test_params(), 1);

    let entity = core
        .process_transaction(&Transaction::new("a", 50.0))
        .expect("amount above minimum is accepted");

    assert_eq!(entity.kind, EntityKind::SmallBody);
    assert!(entity.scale >= 0.5 && entity.scale < 1.0, "scale {}", entity.scale);
    assert_eq!(entity.parent_id, None);
    assert_eq!(entity.source_amount, 50.0);
    assert!(entity.phase_angle >= 0.0 && entity.phase_angle < TAU);
    assert!(entity.arm_index < core.params().galaxy_arms);
    assert_eq!(core.store().len(), 1);
    assert_eq!(core.index().len(), 1);
}

#[test]
fn amount_below_minimum_is_rejected() {
    let params = Parameters {
        min_transaction_value: 500.0,
        ..test_params()
    };
    let mut core = seeded_core(params, 1);
    core.drain_events();

    assert!(core.process_transaction(&Transaction::new("a", 200.0)).is_none());
    assert!(core.store().is_empty());
    assert!(core.drain_events().is_empty());
    assert_eq!(core.total_mass_ingested(), 0.0);

    let err = core.try_process_transaction(&Transaction::new("b", 200.0)).unwrap_err();
    assert_eq!(err, SimError::InvalidInput { amount: 200.0, min: 500.0 });
}

#[test]
fn non_positive_and_non_finite_amounts_are_rejected() {
    let mut core = seeded_core(test_params(), 1);
    for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        assert!(core.process_transaction(&Transaction::new("x", amount)).is_none());
    }
    assert!(core.store().is_empty());
}

#[test]
fn kinds_follow_amount_tiers() {
    let mut core = seeded_core(test_params(), 2);
    let entities = ingest(&mut core, &[100.0, 400.0, 800.0, 2000.0, 9000.0]);
    let kinds: Vec<EntityKind> = entities.iter().map(|e| e.kind).collect();

    assert_eq!(
        kinds,
        vec![
            EntityKind::SmallBody,
            EntityKind::Radiant,
            EntityKind::Body,
            EntityKind::RingedBody,
            EntityKind::Major
        ]
    );
}

#[test]
fn creation_places_entity_on_its_arm() {
    let mut core = seeded_core(test_params(), 3);
    let entity = core.process_transaction(&Transaction::new("a", 75.0)).unwrap();

    let expected = spiral_position(&entity.orbit, entity.phase_angle, entity.arm_index, core.params());
    assert!((entity.position - expected).norm() < 1e-12);
}

#[test]
fn world_radius_tracks_total_mass() {
    let mut core = seeded_core(test_params(), 4);
    core.drain_events();

    // 100_000 total -> 100 * log10(100) = 200
    ingest(&mut core, &[60_000.0, 40_000.0]);
    assert!((core.world_radius() - 200.0).abs() < 1e-9);
    assert_eq!(core.total_mass_ingested(), 100_000.0);

    let scaled: Vec<f64> = core
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::WorldScaled(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(scaled.last().copied(), Some(core.world_radius()));
}

#[test]
fn small_radius_drift_is_not_announced() {
    let mut core = seeded_core(test_params(), 4);
    ingest(&mut core, &[100_000.0]);
    core.drain_events();

    // 200 -> 200.43
    ingest(&mut core, &[1000.0]);
    assert!((core.world_radius() - 100.0 * 101f64.log10()).abs() < 1e-9);
    let scaled = core
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SimEvent::WorldScaled(_)))
        .count();
    assert_eq!(scaled, 0);

    // drift is measured from the last announced radius, so 200 -> 201.07 fires
    ingest(&mut core, &[1500.0]);
    let scaled: Vec<f64> = core
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::WorldScaled(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(scaled, vec![core.world_radius()]);
}

#[test]
fn world_radius_is_capped() {
    let mut core = seeded_core(test_params(), 4);
    ingest(&mut core, &[1.0e200]);
    assert_eq!(core.world_radius(), 1000.0);
}

// ==================================================================================
// Tick and integration tests
// ==================================================================================

#[test]
fn zero_step_without_majors_changes_nothing() {
    // a capture redraws the phase even on a zero step, so no major is ingested here
    let mut core = seeded_core(test_params(), 5);
    ingest(&mut core, &[10.0, 120.0, 450.0, 900.0, 3000.0]);
    let before = core.entities();

    core.tick(0.0);

    assert_eq!(core.entities(), before);
}

#[test]
fn tick_advances_phase_by_period_fraction() {
    let mut core = seeded_core(test_params(), 6);
    let before = core.process_transaction(&Transaction::new("a", 80.0)).unwrap();

    core.tick(0.5);

    let after = core.entity(before.id).unwrap();
    let expected = advance_phase(before.phase_angle, 0.5, before.orbit.period);
    assert!((after.phase_angle - expected).abs() < 1e-12);
    assert!((core.elapsed() - 0.5).abs() < 1e-12);
}

#[test]
fn stopped_core_ignores_ticks() {
    let mut core = seeded_core(test_params(), 7);
    ingest(&mut core, &[10.0, 20.0, 30.0]);
    core.stop();
    core.drain_events();
    let before = core.entities();

    core.tick(1.0);

    assert!(!core.is_active());
    assert_eq!(core.entities(), before);
    assert_eq!(core.elapsed(), 0.0);
    assert!(core.drain_events().is_empty());

    core.start();
    core.tick(1.0);
    assert_ne!(core.entities(), before);
}

#[test]
fn degenerate_orbit_is_skipped() {
    let params = Parameters {
        min_transaction_value: 1.0e-6,
        ..test_params()
    };
    let mut core = seeded_core(params, 8);

    // log10(0.01) = -2 drives the radius below zero
    let entity = core.process_transaction(&Transaction::new("dust", 0.01)).unwrap();
    assert!(entity.orbit.is_degenerate());
    assert_eq!(entity.position, NVec3::zeros());

    core.tick(1.0);

    let after = core.entity(entity.id).unwrap();
    assert_eq!(after.phase_angle, entity.phase_angle);
    assert_eq!(after.position, entity.position);
}

#[test]
fn advance_reports_degenerate_orbit() {
    let params = test_params();
    let mut core = seeded_core(params.clone(), 9);
    let mut entity = core.process_transaction(&Transaction::new("a", 40.0)).unwrap();
    entity.orbit = OrbitDescriptor::new(0.0, 0.0, 10.0, 0.0);
    let snapshot = entity.clone();

    let result = advance(&mut entity, 1.0, OrbitFrame::Galactic, &params);

    assert_eq!(
        result,
        Err(SimError::DegenerateOrbit {
            entity: entity.id,
            radius: 0.0
        })
    );
    assert_eq!(entity, snapshot);
}

#[test]
fn parent_frame_offsets_by_parent_position() {
    let params = test_params();
    let mut core = seeded_core(params.clone(), 10);
    let mut entity = core.process_transaction(&Transaction::new("a", 40.0)).unwrap();
    let origin = NVec3::new(12.0, -3.0, 7.5);

    let position = advance(&mut entity, 0.25, OrbitFrame::Parent(origin), &params).unwrap();

    let local = spiral_position(&entity.orbit, entity.phase_angle, 0, &params);
    assert!((position - (origin + local)).norm() < 1e-12);
    assert_eq!(entity.position, position);
}

#[test]
fn major_period_is_stretched() {
    let params = test_params();
    let mut core = seeded_core(params.clone(), 11);
    let mut major = core.process_transaction(&Transaction::new("whale", 20_000.0)).unwrap();
    let phase = major.phase_angle;

    advance(&mut major, 1.0, OrbitFrame::Galactic, &params).unwrap();

    let expected = advance_phase(phase, 1.0, major.orbit.period * 5.0);
    assert!((major.phase_angle - expected).abs() < 1e-12);
}

// ==================================================================================
// Capture tests
// ==================================================================================

#[test]
fn certain_capture_links_every_free_body() {
    let mut core = seeded_core(capture_params(), 12);
    let major = ingest(&mut core, &[6000.0]).remove(0);
    let small = ingest(&mut core, &[20.0, 150.0, 700.0, 2500.0]);
    core.drain_events();

    core.tick(0.1);

    let parent = core.entity(major.id).unwrap();
    for e in &small {
        let after = core.entity(e.id).unwrap();
        assert_eq!(after.parent_id, Some(major.id));

        // radius is drawn from [2, 5] * parent scale
        let r = after.orbit.radius;
        assert!(r >= 2.0 * parent.scale - 1e-9 && r <= 5.0 * parent.scale + 1e-9, "radius {r}");
        assert!((after.orbit.period - core.params().base_orbital_period * 0.5).abs() < 1e-12);
    }

    let captures = core
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SimEvent::EntityCaptured { parent, .. } if *parent == major.id))
        .count();
    assert_eq!(captures, small.len());
}

#[test]
fn majors_never_capture_each_other() {
    let mut core = seeded_core(capture_params(), 13);
    let majors = ingest(&mut core, &[6000.0, 8000.0, 50_000.0]);

    for _ in 0..10 {
        core.tick(0.1);
    }

    for m in majors {
        assert_eq!(core.entity(m.id).unwrap().parent_id, None);
    }
}

#[test]
fn one_capture_per_entity_per_tick() {
    let mut core = seeded_core(capture_params(), 27);
    let majors = ingest(&mut core, &[6000.0, 9000.0]);
    let small = ingest(&mut core, &[20.0, 90.0, 400.0]);
    core.drain_events();

    core.tick(0.1);

    let events = core.drain_events();
    for e in &small {
        // majors are scanned in creation order, the first one in range wins
        assert_eq!(core.entity(e.id).unwrap().parent_id, Some(majors[0].id));
        let captures = events
            .iter()
            .filter(|ev| matches!(ev, SimEvent::EntityCaptured { entity, .. } if *entity == e.id))
            .count();
        assert_eq!(captures, 1, "{} captured {} times", e.id, captures);
    }
    assert_eq!(core.entity(majors[1].id).unwrap().parent_id, None);
}

#[test]
fn captured_body_follows_parent() {
    let mut core = seeded_core(capture_params(), 14);
    let major = ingest(&mut core, &[7000.0]).remove(0);
    let small = ingest(&mut core, &[30.0]).remove(0);

    core.tick(0.1);
    core.tick(0.1);

    let parent = core.entity(major.id).unwrap();
    let child = core.entity(small.id).unwrap();
    let local = spiral_position(&child.orbit, child.phase_angle, 0, core.params());
    assert!((child.position - (parent.position + local)).norm() < 1e-9);
}

#[test]
fn captured_offset_stays_within_warped_radius() {
    let params = capture_params();
    // captured orbits sit on arm 0 with phase in [0, 2*pi), so the spiral warp is at most exp(tightness * 2*pi)
    let max_warp = (params.spiral_tightness * TAU).exp();
    let upper = 5.0 * (max_warp * max_warp + params.vertical_scale * params.vertical_scale).sqrt();

    for seed in 0..40 {
        let mut core = seeded_core(params.clone(), seed);
        let major = ingest(&mut core, &[7000.0]).remove(0);
        let small = ingest(&mut core, &[30.0, 250.0, 800.0]);

        for _ in 0..5 {
            core.tick(0.3);
        }

        let parent = core.entity(major.id).unwrap();
        for e in &small {
            let child = core.entity(e.id).unwrap();
            let ratio = (child.position - parent.position).norm() / parent.scale;
            assert!(ratio >= 2.0 - 1e-9 && ratio <= upper + 1e-9, "seed {seed}: offset {ratio} x parent scale");
        }
    }
}

#[test]
fn no_capture_without_chance() {
    let params = Parameters {
        capture_chance_min: 0.0,
        capture_chance_max: 0.0,
        capture_radius_multiplier: 1.0e4,
        ..test_params()
    };
    let mut core = seeded_core(params, 15);
    ingest(&mut core, &[9000.0, 10.0, 20.0, 30.0]);

    for _ in 0..20 {
        core.tick(0.1);
    }

    // only a roll of exactly 0.0 could capture
    assert!(core.entities().iter().all(|e| !e.is_captured()));
}

#[test]
fn missing_parent_falls_back_to_galactic_frame() {
    let mut core = seeded_core(capture_params(), 16);
    let major = ingest(&mut core, &[6000.0]).remove(0);
    let small = ingest(&mut core, &[25.0]).remove(0);
    core.tick(0.1);
    assert_eq!(core.entity(small.id).unwrap().parent_id, Some(major.id));

    assert!(core.remove_entity(major.id));
    core.tick(0.1);

    let orphan = core.entity(small.id).unwrap();
    assert_eq!(orphan.parent_id, Some(major.id));
    let expected = spiral_position(&orphan.orbit, orphan.phase_angle, orphan.arm_index, core.params());
    assert!((orphan.position - expected).norm() < 1e-12);
}

// ==================================================================================
// Spatial index and visibility tests
// ==================================================================================

#[test]
fn index_holds_each_entity_once_after_tick() {
    let mut core = seeded_core(test_params(), 17);
    let amounts: Vec<f64> = (1..=200).map(|i| (i as f64) * 37.0 % 9000.0 + 1.0).collect();
    ingest(&mut core, &amounts);

    core.tick(0.2);

    let mut indexed = core.index().ids();
    indexed.sort();
    assert_eq!(indexed, core.store().ids());
    assert_eq!(core.index().len(), core.store().len());
    assert!(core.index().depth() <= core.params().index_max_depth);
}

#[test]
fn overview_camera_sees_everything() {
    let mut core = seeded_core(test_params(), 18);
    let amounts: Vec<f64> = (1..=120).map(|i| (i as f64) * 53.0 % 7000.0 + 2.0).collect();
    ingest(&mut core, &amounts);
    core.tick(0.5);

    let (eye, frustum) = Frustum::top_down(0.0, 0.0, population_extent(&core));
    let mut visible: Vec<_> = core.query_visible(&eye, &frustum, 1.0e6).into_iter().map(|e| e.id).collect();
    visible.sort();

    assert_eq!(visible, core.store().ids());
}

#[test]
fn camera_facing_away_sees_nothing() {
    let mut core = seeded_core(test_params(), 19);
    ingest(&mut core, &[10.0, 100.0, 1000.0]);
    core.tick(0.1);

    let eye = NVec3::new(0.0, 0.0, 5000.0);
    let frustum = Frustum::perspective(&eye, &NVec3::new(0.0, 0.0, 10_000.0), &NVec3::y(), 1.0, 1.0, 0.1, 1000.0);

    assert!(core.query_visible(&eye, &frustum, 1.0e6).is_empty());
}

#[test]
fn perspective_frustum_contains_target() {
    let eye = NVec3::new(0.0, 50.0, 100.0);
    let frustum = Frustum::perspective(&eye, &NVec3::zeros(), &NVec3::y(), 1.0, 1.5, 0.1, 500.0);

    assert!(frustum.contains_point(&NVec3::zeros()));
    assert!(!frustum.contains_point(&NVec3::new(0.0, 100.0, 200.0))); // behind the eye
    assert!(!frustum.contains_point(&NVec3::new(0.0, -500.0, -1000.0))); // past the far plane
}

#[test]
fn frustum_planes_face_inward() {
    let eye = NVec3::new(10.0, 80.0, 60.0);
    let frustum = Frustum::perspective(&eye, &NVec3::zeros(), &NVec3::y(), 0.8, 1.2, 0.5, 400.0);

    for plane in frustum.planes() {
        assert!((plane.normal.norm() - 1.0).abs() < 1e-9);
        assert!(plane.signed_distance(&NVec3::zeros()) >= 0.0);
    }
    // left, right, bottom, top, near, far
    let near = frustum.planes()[4];
    assert!((near.signed_distance(&eye) + 0.5).abs() < 1e-6);
}

#[test]
fn rebuilt_index_bounds_cover_every_footprint() {
    let mut core = seeded_core(test_params(), 28);
    assert_eq!(core.index().bounds(), Bounds::centered(0.0, 0.0, core.params().galaxy_scale));

    ingest(&mut core, &[15.0, 600.0, 4000.0, 70_000.0, 1.0e7]);
    core.tick(0.4);

    let b = core.index().bounds();
    assert!(b.min_x <= -core.world_radius() && b.max_x >= core.world_radius());
    for e in core.entities() {
        let fp = Bounds::centered(e.position.x, e.position.z, e.scale);
        assert!(b.contains_point(fp.min_x, fp.min_z) && b.contains_point(fp.max_x, fp.max_z), "{} outside", e.id);
    }
}

#[test]
fn quadtree_splits_and_answers_point_queries() {
    let mut core = seeded_core(test_params(), 20);
    let entities = ingest(&mut core, &(1..=60).map(|i| i as f64 * 3.0).collect::<Vec<_>>());

    let mut index = SpatialIndex::new(Bounds::centered(0.0, 0.0, 200.0), 4, 3);
    for e in &entities {
        index.insert(e);
    }

    assert!(index.node_count() > 1);
    assert!(index.depth() <= 3);
    for e in &entities {
        assert!(index.query_point(e.position.x, e.position.z).contains(&e.id));
    }
}

#[test]
fn region_query_is_a_superset_of_intersecting_footprints() {
    let mut core = seeded_core(test_params(), 21);
    let entities = ingest(&mut core, &(1..=80).map(|i| i as f64 * 11.0).collect::<Vec<_>>());

    let mut index = SpatialIndex::new(Bounds::centered(0.0, 0.0, 150.0), 3, 4);
    for e in &entities {
        index.insert(e);
    }

    let region = Bounds::new(-30.0, -60.0, 45.0, 10.0);
    let found = index.query_region(&region);
    for e in &entities {
        let footprint = Bounds::centered(e.position.x, e.position.z, e.scale);
        if footprint.intersects(&region) {
            assert!(found.contains(&e.id), "{} missing", e.id);
        }
    }

    index.clear();
    assert!(index.is_empty());
    assert!(index.query_region(&region).is_empty());
}

// ==================================================================================
// Store tests
// ==================================================================================

/// Usable orbit for building store records by hand
pub fn store_orbit() -> OrbitDescriptor {
    OrbitDescriptor::new(30.0, 0.1, 60.0, 0.0)
}

#[test]
fn set_parent_on_unknown_id_changes_nothing() {
    let mut store = EntityStore::new();
    let a = store.create(store_orbit(), 1, 0.5, 0.8, EntityKind::SmallBody, 40.0);
    let ghost = EntityId(u64::MAX);

    assert!(!store.set_parent(ghost, a.id));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(a.id), Some(&a));
    assert!(store.get(ghost).is_none());

    assert!(store.set_parent(a.id, ghost));
    assert_eq!(store.get(a.id).unwrap().parent_id, Some(ghost));
}

#[test]
fn remove_reports_whether_anything_was_removed() {
    let mut store = EntityStore::new();
    let a = store.create(store_orbit(), 0, 0.0, 0.8, EntityKind::SmallBody, 40.0);
    let b = store.create(store_orbit(), 2, 1.0, 1.2, EntityKind::Radiant, 380.0);

    assert!(store.remove(a.id));
    assert!(!store.remove(a.id));
    assert!(store.get(a.id).is_none());
    assert_eq!(store.ids(), vec![b.id]);

    store.clear();
    assert!(store.is_empty());
    assert!(!store.remove(b.id));
}

#[test]
fn created_records_start_free_at_the_origin() {
    let mut store = EntityStore::new();
    let a = store.create(store_orbit(), 3, 2.0, 2.1, EntityKind::RingedBody, 1400.0);

    assert_eq!(a.position, NVec3::zeros());
    assert_eq!(a.parent_id, None);
    assert_eq!(a.created_at, store.now());
    assert_eq!(a.arm_index, 3);
}

// ==================================================================================
// Eviction and event tests
// ==================================================================================

#[test]
fn eviction_removes_oldest_first() {
    let mut core = seeded_core(test_params(), 22);
    let first = ingest(&mut core, &[10.0, 20.0]);
    core.tick(1.0);
    let second = ingest(&mut core, &[30.0, 40.0, 50.0]);
    core.drain_events();

    let oldest: Vec<_> = core.oldest_beyond(2).into_iter().map(|e| e.id).collect();
    assert_eq!(oldest, vec![first[0].id, first[1].id, second[0].id]);
    assert!(core.oldest_beyond(5).is_empty());

    assert_eq!(core.evict_oldest_beyond(2), 3);
    let mut left = core.store().ids();
    left.sort();
    assert_eq!(left, vec![second[1].id, second[2].id]);
    assert_eq!(core.drain_events(), vec![SimEvent::EntitiesEvicted(3)]);

    assert_eq!(core.evict_oldest_beyond(2), 0);
    assert!(core.drain_events().is_empty());
}

#[test]
fn recent_uses_simulation_clock() {
    let mut core = seeded_core(test_params(), 23);
    let old = ingest(&mut core, &[10.0]).remove(0);
    core.tick(5.0);
    let new = ingest(&mut core, &[20.0]).remove(0);
    core.tick(1.0);

    let recent: Vec<_> = core.store().recent(2.0).into_iter().map(|e| e.id).collect();
    assert_eq!(recent, vec![new.id]);
    assert_eq!(core.store().recent(10.0).len(), 2);
    assert_eq!(old.created_at, 0.0);
    assert_eq!(new.created_at, 5.0);
}

#[test]
fn capacity_is_reported_not_enforced() {
    let params = Parameters {
        max_entities: 3,
        ..test_params()
    };
    let mut core = seeded_core(params, 24);
    ingest(&mut core, &[1.0, 2.0, 3.0]);
    assert_eq!(core.check_capacity(), Ok(()));
    assert!((core.occupancy() - 1.0).abs() < 1e-12);

    ingest(&mut core, &[4.0]);
    assert_eq!(core.store().len(), 4);
    assert_eq!(core.check_capacity(), Err(SimError::CapacityExceeded { count: 4, max: 3 }));
}

#[test]
fn events_arrive_in_order() {
    let mut core = SimulationCore::with_rng(test_params(), ChaCha8Rng::seed_from_u64(25)).unwrap();
    core.start();
    let entity = core.process_transaction(&Transaction::new("a", 10.0)).unwrap();
    core.tick(0.25);
    core.stop();

    let events = core.drain_events();
    assert_eq!(events.first(), Some(&SimEvent::Started));
    assert!(events.contains(&SimEvent::EntityCreated(entity)));
    assert!(events.contains(&SimEvent::TickCompleted(0.25)));
    assert_eq!(events.last(), Some(&SimEvent::Stopped));
    assert!(core.drain_events().is_empty());
}

#[test]
fn event_queue_drains_oldest_first() {
    let mut queue = EventQueue::new();
    assert!(queue.is_empty());

    queue.push(SimEvent::Started);
    queue.push(SimEvent::TickCompleted(0.5));
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.drain(), vec![SimEvent::Started, SimEvent::TickCompleted(0.5)]);
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn ids_are_unique_across_cores() {
    let mut a = seeded_core(test_params(), 26);
    let mut b = seeded_core(test_params(), 26);
    let ea = ingest(&mut a, &[10.0]).remove(0);
    let eb = ingest(&mut b, &[10.0]).remove(0);

    assert_ne!(ea.id, eb.id);
    assert_eq!(ea.orbit, eb.orbit);
}

// ==================================================================================
// Configuration and scenario tests
// ==================================================================================

#[test]
fn parameters_are_validated() {
    let bad_chance = Parameters {
        capture_chance_min: 0.6,
        capture_chance_max: 0.4,
        ..test_params()
    };
    assert_eq!(
        SimulationCore::new(bad_chance).err(),
        Some(ConfigError::CaptureChanceRange { min: 0.6, max: 0.4 })
    );

    let no_arms = Parameters {
        galaxy_arms: 0,
        ..test_params()
    };
    assert_eq!(
        SimulationCore::new(no_arms).err(),
        Some(ConfigError::ZeroCount { name: "galaxy_arms" })
    );

    let inverted = Parameters {
        min_radius: 100.0,
        max_radius: 20.0,
        ..test_params()
    };
    assert!(matches!(SimulationCore::new(inverted), Err(ConfigError::RadiusRange { .. })));

    let negative_tilt = Parameters {
        max_tilt: -0.1,
        ..test_params()
    };
    assert!(matches!(
        SimulationCore::new(negative_tilt),
        Err(ConfigError::Negative { name: "max_tilt", .. })
    ));
}

const SCENARIO_YAML: &str = r#"
parameters:
  galaxy_arms: 3
  seed: 99
run:
  ticks: 10
  delta_time: 0.1
  keep_count: 4
transactions:
  - amount: 6000.0
  - amount: 12.0
  - amount: 0.5
  - amount: 340.0
    id: "tx-named"
    timestamp: 3.5
    direction: sell
  - amount: 45.0
  - amount: 700.0
"#;

#[test]
fn scenario_yaml_builds_and_runs() {
    let cfg: ScenarioConfig = serde_yaml::from_str(SCENARIO_YAML).unwrap();
    let mut scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.core.params().galaxy_arms, 3);
    assert_eq!(scenario.transactions.len(), 6);
    assert_eq!(scenario.transactions[3].id, "tx-named");
    assert_eq!(scenario.transactions[3].timestamp, 3.5);
    assert_eq!(scenario.transactions[0].timestamp, 0.0);
    assert_eq!(scenario.transactions[1].id, "tx-1");

    let summary = scenario.run();

    assert_eq!(summary.ticks, 10);
    assert_eq!(summary.accepted, 5); // 0.5 is under the default minimum of 1
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.entities, 4);
    assert_eq!(summary.evicted, 1);
    assert_eq!(summary.visible_from_overview, summary.entities);
    assert!(!scenario.core.is_active());
}

#[test]
fn scenario_rejects_unknown_parameters() {
    let yaml = "parameters:\n  warp_drive: 9\nrun:\n  ticks: 1\n";
    assert!(serde_yaml::from_str::<ScenarioConfig>(yaml).is_err());
}

#[test]
fn scenario_rejects_negative_step() {
    let yaml = "run:\n  ticks: 1\n  delta_time: -0.5\n";
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        Scenario::build_scenario(cfg).err(),
        Some(ConfigError::Negative { name: "delta_time", value: -0.5 })
    );
}

#[test]
fn scenario_step_defaults_to_frame_delta() {
    let yaml = "parameters:\n  update_frequency: 30.0\nrun:\n  ticks: 2\n";
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();
    assert!((scenario.run.delta_time - 1.0 / 30.0).abs() < 1e-12);
}
