//! Fixed timestep simulation tick
//!
//! Advances a run deterministically. Per tick, in order:
//! commands, body, contacts, risk gauge, chunks, hazard spawns, hazard
//! motion, entity flush, distance.

use super::events::{DeathCause, RunEvent, SoundCue};
use super::gauge::GaugeTick;
use super::state::{Run, RunState};
use super::world::{EntityId, EntityKind};
use crate::catalog::ObjectKind;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Launch in Ready, mode toggle in Flying
    pub tap: bool,
    /// Restart from GameOver
    pub retry: bool,
    /// Continue from GameOver (once per run)
    pub revive: bool,
}

/// Advance the run by one fixed timestep
pub fn tick(run: &mut Run, input: &TickInput, dt: f32) {
    run.time_ticks += 1;

    // A tap that lands on the same tick as a state change is dropped
    let state_before = run.state;
    if input.retry {
        run.retry();
    }
    if input.revive {
        run.revive();
    }
    if input.tap && run.state == state_before {
        run.tap();
    }

    run.body.integrate(dt);

    if run.state == RunState::Flying {
        resolve_contacts(run);
    }

    let mode = run.mode.mode();
    if run.gauge.tick(dt, run.state, mode) == GaugeTick::Exhausted {
        run.body.freeze();
        run.terminate(DeathCause::GaugeExhausted);
    }

    let player_pos = run.body.pos;
    run.chunks
        .tick(&mut run.world, &run.catalog, player_pos.x, &mut run.events);

    if run.state == RunState::Flying {
        run.hazards.tick(
            &mut run.world,
            run.catalog.hazard.as_ref(),
            player_pos,
            &mut run.events,
        );
    }
    run.hazards
        .update_hazards(&mut run.world, player_pos.x, dt, &mut run.events);

    run.world.flush();

    if run.state == RunState::Flying {
        run.stats.update(run.body.pos.x);
    }
}

/// Presentation-rate update: launch sweep and the invincibility countdown
/// run on real time, outside the fixed step.
pub fn frame(run: &mut Run, real_dt: f32) {
    if let Some(sampler) = run.sampler.as_mut() {
        sampler.update(real_dt);
    }
    if run.invincibility.advance(real_dt).is_some() {
        run.end_invincibility();
    }
}

/// Fire effects for entities the player started overlapping this tick.
///
/// `touching` is only refreshed while contact is allowed, so switching back
/// to Interactive while inside an object counts as a new contact.
fn resolve_contacts(run: &mut Run) {
    let center = run.body.pos;
    let radius = run.body.radius;

    let mut began: Vec<EntityId> = Vec::new();
    for entity in run.world.iter_mut() {
        if matches!(entity.kind, EntityKind::Chunk { .. }) {
            continue;
        }
        if !run.mode.allows_contact(entity.caps) {
            continue;
        }
        let overlapping = entity.overlaps_circle(center, radius);
        if overlapping && !entity.touching {
            began.push(entity.id);
        }
        entity.touching = overlapping;
    }

    for id in began {
        if run.state != RunState::Flying {
            break;
        }
        if run.world.is_pending_destroy(id) {
            continue;
        }
        let Some(kind) = run.world.get(id).map(|e| e.kind.clone()) else {
            continue;
        };
        match kind {
            EntityKind::Object { kind } => trigger_object(run, id, kind),
            EntityKind::Hazard => {
                log::debug!("[Tick] Hazard #{} hit", id);
                // Removed at once so it cannot fire twice
                run.world.queue_destroy(id);
                run.events.push(RunEvent::HazardDespawned { id });
                run.body.freeze();
                run.terminate(DeathCause::Hazard);
            }
            EntityKind::Chunk { .. } => {}
        }
    }
}

fn trigger_object(run: &mut Run, id: EntityId, kind: ObjectKind) {
    log::debug!("[Tick] Object #{} {:?}", id, kind);
    run.events.push(RunEvent::ObjectTriggered { id, kind });

    match kind {
        ObjectKind::BoostPad { impulse } => run.body.apply_impulse(impulse),
        ObjectKind::SlowZone { x_mul, y_mul } => run.body.multiply_velocity(x_mul, y_mul),
        ObjectKind::UpperHit {
            angle_deg,
            min_speed,
            extra_speed,
        } => run.body.reorient_velocity(angle_deg, min_speed, extra_speed),
        ObjectKind::Trap => {
            run.body.freeze();
            run.terminate(DeathCause::Hazard);
            return;
        }
    }
    run.events.push(RunEvent::Sound(SoundCue::ObjectHit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HazardTemplate, TemplateCatalog};
    use crate::consts::SIM_DT;
    use crate::settings::Tuning;
    use crate::sim::mode::PlayerMode;
    use crate::sim::world::Capabilities;
    use glam::Vec2;

    const TAP: TickInput = TickInput {
        tap: true,
        retry: false,
        revive: false,
    };
    const RETRY: TickInput = TickInput {
        tap: false,
        retry: true,
        revive: false,
    };
    const REVIVE: TickInput = TickInput {
        tap: false,
        retry: false,
        revive: true,
    };

    fn new_run(seed: u64) -> Run {
        Run::new(Tuning::default(), TemplateCatalog::builtin(), seed)
    }

    fn idle(run: &mut Run, ticks: u32) {
        for _ in 0..ticks {
            tick(run, &TickInput::default(), SIM_DT);
        }
    }

    /// Drop an object right on top of the player
    fn place_object(run: &mut Run, kind: ObjectKind) -> EntityId {
        let pos = run.body.pos;
        run.world.spawn(
            EntityKind::Object { kind },
            None,
            pos,
            Vec2::splat(1.0),
            Capabilities {
                interactable: true,
                is_hazard: kind.is_hazard(),
            },
        )
    }

    #[test]
    fn test_tick_ready_to_flying() {
        let mut run = new_run(12345);
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert_eq!(run.state(), RunState::Ready);
        let start = run.body().pos;
        idle(&mut run, 30);
        assert_eq!(run.body().pos, start);

        tick(&mut run, &TAP, SIM_DT);
        assert_eq!(run.state(), RunState::Flying);
        idle(&mut run, 30);
        assert!(run.body().pos.x > start.x);
        assert!(run.stats().current_distance() > 0.0);
    }

    #[test]
    fn test_passthrough_exhausts_gauge() {
        let mut run = new_run(7);
        tick(&mut run, &TAP, SIM_DT);
        tick(&mut run, &TAP, SIM_DT);
        assert_eq!(run.mode(), PlayerMode::Passthrough);

        // 3s budget at 1/s, plus slack
        for _ in 0..(3.2 / SIM_DT) as u32 {
            tick(&mut run, &TickInput::default(), SIM_DT);
            if run.state() == RunState::GameOver {
                break;
            }
        }
        assert_eq!(run.state(), RunState::GameOver);
        assert_eq!(run.last_death(), Some(DeathCause::GaugeExhausted));
        assert!(!run.body().is_simulated());
    }

    #[test]
    fn test_boost_pad_fires_once() {
        let mut run = new_run(1);
        tick(&mut run, &TAP, SIM_DT);
        let id = place_object(&mut run, ObjectKind::BoostPad {
            impulse: Vec2::new(6.0, 0.0),
        });
        let vx = run.body().vel.x;
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert!(run.body().vel.x > vx + 5.0);

        let triggers = |run: &mut Run| {
            run.drain_events()
                .iter()
                .filter(|e| matches!(e, RunEvent::ObjectTriggered { id: hit, .. } if *hit == id))
                .count()
        };
        assert_eq!(triggers(&mut run), 1);
        run.body.set_position(run.world.get(id).unwrap().pos);
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert_eq!(triggers(&mut run), 0);
    }

    #[test]
    fn test_objects_ignored_in_passthrough() {
        let mut run = new_run(1);
        tick(&mut run, &TAP, SIM_DT);
        tick(&mut run, &TAP, SIM_DT);
        place_object(&mut run, ObjectKind::Trap);
        idle(&mut run, 2);
        assert_eq!(run.state(), RunState::Flying);
    }

    #[test]
    fn test_trap_ends_run() {
        let mut run = new_run(1);
        tick(&mut run, &TAP, SIM_DT);
        place_object(&mut run, ObjectKind::Trap);
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert_eq!(run.state(), RunState::GameOver);
        assert_eq!(run.last_death(), Some(DeathCause::Hazard));
        assert_eq!(run.body().vel, Vec2::ZERO);
    }

    #[test]
    fn test_slow_zone_and_upper_hit() {
        let mut run = new_run(1);
        tick(&mut run, &TAP, SIM_DT);
        run.body.set_velocity(Vec2::new(10.0, 0.0));
        place_object(&mut run, ObjectKind::SlowZone {
            x_mul: 0.5,
            y_mul: 1.0,
        });
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert!((run.body().vel.x - 5.0).abs() < 0.1);

        place_object(&mut run, ObjectKind::UpperHit {
            angle_deg: 35.0,
            min_speed: 8.0,
            extra_speed: 0.0,
        });
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert!(run.body().vel.x > 0.0 && run.body().vel.y > 0.0);
        assert!(run.body().speed() >= 7.9);
    }

    #[test]
    fn test_hazard_contact_is_destroyed() {
        let mut run = new_run(3);
        tick(&mut run, &TAP, SIM_DT);
        let pos = run.body.pos;
        let id = run.world.spawn(
            EntityKind::Hazard,
            None,
            pos,
            HazardTemplate::default().half_extents,
            Capabilities {
                interactable: true,
                is_hazard: true,
            },
        );
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert_eq!(run.state(), RunState::GameOver);
        assert!(run.world().get(id).is_none());
    }

    #[test]
    fn test_tap_not_reused_after_retry() {
        let mut run = new_run(5);
        tick(&mut run, &TAP, SIM_DT);
        place_object(&mut run, ObjectKind::Trap);
        tick(&mut run, &TickInput::default(), SIM_DT);
        assert_eq!(run.state(), RunState::GameOver);

        // Tap ignored in GameOver
        tick(&mut run, &TAP, SIM_DT);
        assert_eq!(run.state(), RunState::GameOver);

        let both = TickInput {
            tap: true,
            retry: true,
            revive: false,
        };
        tick(&mut run, &both, SIM_DT);
        assert_eq!(run.state(), RunState::Ready);
    }

    #[test]
    fn test_retry_restores_level() {
        let mut run = new_run(9);
        tick(&mut run, &TAP, SIM_DT);
        idle(&mut run, 240);
        run.terminate(DeathCause::Hazard);

        tick(&mut run, &RETRY, SIM_DT);
        assert_eq!(run.state(), RunState::Ready);
        assert_eq!(run.chunks().len(), 7);
        let chunk_entities = run
            .world()
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Chunk { .. }))
            .count();
        assert_eq!(chunk_entities, 7);
        assert_eq!(run.stats().current_distance(), 0.0);
    }

    #[test]
    fn test_revive_invincibility_window() {
        let mut run = new_run(11);
        tick(&mut run, &TAP, SIM_DT);
        run.terminate(DeathCause::Hazard);

        tick(&mut run, &REVIVE, SIM_DT);
        assert_eq!(run.state(), RunState::Ready);
        assert_eq!(run.mode(), PlayerMode::Invulnerable);

        tick(&mut run, &TAP, SIM_DT);
        assert_eq!(run.state(), RunState::Flying);

        // Traps pass harmlessly while invulnerable
        place_object(&mut run, ObjectKind::Trap);
        idle(&mut run, 2);
        assert_eq!(run.state(), RunState::Flying);
        let budget = run.gauge().time_left();
        idle(&mut run, 60);
        assert_eq!(run.gauge().time_left(), budget);

        frame(&mut run, 1.0);
        assert_eq!(run.mode(), PlayerMode::Invulnerable);
        frame(&mut run, 1.1);
        assert_eq!(run.mode(), PlayerMode::Interactive);
        assert!(!run.revive_flags().invincible_active);
        assert!(!run.gauge().is_paused());
    }

    #[test]
    fn test_launch_sweep_sets_power() {
        let mut run = new_run(2);
        // Sweep speed 1.5/s: half a second lands at 0.75
        frame(&mut run, 0.5);
        tick(&mut run, &TAP, SIM_DT);
        let expected = 8.0 + (18.0 - 8.0) * 0.75;
        let events = run.drain_events();
        let power = events
            .iter()
            .find_map(|e| match e {
                RunEvent::Launched { power } => Some(*power),
                _ => None,
            })
            .unwrap();
        assert!((power - expected).abs() < 1e-3);
    }

    #[test]
    fn test_hazards_spawn_past_start_distance() {
        let mut run = new_run(4);
        tick(&mut run, &TAP, SIM_DT);
        tick(&mut run, &TAP, SIM_DT);
        // Skip ahead without touching anything
        run.body.set_position(Vec2::new(260.0, 4.0));
        run.gauge.set_paused(true);
        tick(&mut run, &TickInput::default(), SIM_DT);
        let hazards = run
            .world()
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Hazard))
            .count();
        assert_eq!(hazards, 1);
    }

    #[test]
    fn test_determinism() {
        let mut run1 = new_run(99999);
        let mut run2 = new_run(99999);

        let mut inputs = vec![TickInput::default(); 10];
        inputs.push(TAP);
        inputs.extend(vec![TickInput::default(); 200]);
        inputs.push(TAP);
        inputs.extend(vec![TickInput::default(); 100]);
        inputs.push(TAP);
        inputs.extend(vec![TickInput::default(); 400]);

        for input in &inputs {
            tick(&mut run1, input, SIM_DT);
            tick(&mut run2, input, SIM_DT);
        }

        assert_eq!(run1.time_ticks(), run2.time_ticks());
        assert_eq!(run1.state(), run2.state());
        assert_eq!(run1.body().pos, run2.body().pos);
        assert_eq!(run1.world().len(), run2.world().len());
        assert_eq!(run1.drain_events(), run2.drain_events());
    }
}
