//! Run state machine
//!
//! `Run` owns every component of a run and is the only place `RunState`
//! changes. Collaborators it cannot do without are owned directly; optional
//! ones (launch sampler, presenter) are skipped when absent.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::chunks::ChunkGenerator;
use super::events::{DeathCause, Presenter, RunEvent, SoundCue};
use super::gauge::RiskGauge;
use super::hazards::HazardSpawner;
use super::launch::{LaunchGauge, PowerSampler};
use super::mode::{InteractionModeController, ModeChange, ModeSubscriber, PlayerMode};
use super::timer::Timer;
use super::world::World;
use crate::catalog::TemplateCatalog;
use crate::settings::Tuning;
use crate::stats::RunStats;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Player held at the start, launch gauge sweeping
    #[default]
    Ready,
    /// Physics live, gauge live
    Flying,
    /// Player frozen, waiting for retry or revive
    GameOver,
}

/// One-shot revive bookkeeping, scoped to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviveFlags {
    pub used_this_run: bool,
    /// Revive taken; invincibility countdown starts at the next launch
    pub revive_flow_active: bool,
    pub invincible_active: bool,
}

/// A complete run: state machine plus the components it drives
pub struct Run {
    pub(crate) tuning: Tuning,
    pub(crate) catalog: TemplateCatalog,
    pub(crate) seed: u64,
    pub(crate) state: RunState,
    pub(crate) body: PlayerBody,
    pub(crate) mode: InteractionModeController,
    pub(crate) gauge: RiskGauge,
    pub(crate) chunks: ChunkGenerator,
    pub(crate) hazards: HazardSpawner,
    pub(crate) world: World,
    pub(crate) stats: RunStats,
    pub(crate) sampler: Option<Box<dyn PowerSampler>>,
    pub(crate) presenter: Option<Box<dyn Presenter>>,
    pub(crate) revive: ReviveFlags,
    /// Post-revive invincibility countdown (real time)
    pub(crate) invincibility: Timer,
    /// Where retry puts the player back
    pub(crate) start_pos: Vec2,
    pub(crate) last_death: Option<DeathCause>,
    pub(crate) events: Vec<RunEvent>,
    pub(crate) time_ticks: u64,
}

impl Run {
    /// Build a run in the Ready state with the initial chunks laid out
    ///
    /// Tuning that fails [`Tuning::validate`] is replaced by the defaults.
    pub fn new(tuning: Tuning, catalog: TemplateCatalog, seed: u64) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("[Run] Invalid tuning ({}), using defaults", e);
                Tuning::default()
            }
        };

        let body = PlayerBody::new(&tuning.player);
        let start_pos = body.pos;

        let mut mode = InteractionModeController::new();
        mode.subscribe(ModeSubscriber::RiskGauge);
        mode.subscribe(ModeSubscriber::Presentation);

        if catalog.is_empty() {
            log::warn!("[Run] Template catalog is empty");
        }

        let mut run = Self {
            gauge: RiskGauge::new(&tuning.gauge),
            chunks: ChunkGenerator::new(&tuning.chunks, seed),
            hazards: HazardSpawner::new(&tuning.hazards, seed),
            sampler: Some(Box::new(LaunchGauge::new(tuning.launch.oscillator_speed))),
            tuning,
            catalog,
            seed,
            state: RunState::Ready,
            body,
            mode,
            world: World::new(),
            stats: RunStats::new(),
            presenter: None,
            revive: ReviveFlags::default(),
            invincibility: Timer::new(),
            start_pos,
            last_death: None,
            events: Vec::new(),
            time_ticks: 0,
        };

        let x = run.body.pos.x;
        run.chunks.reset(&mut run.world, &run.catalog, x, &mut run.events);
        run.hazards.reset_run(x);
        run.transition(RunState::Ready);
        run
    }

    /// Use a distance tracker with persistence
    pub fn with_stats(mut self, mut stats: RunStats) -> Self {
        stats.begin_run(self.body.pos.x);
        self.stats = stats;
        self
    }

    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Replace (or remove) the launch power sampler
    pub fn with_sampler(mut self, sampler: Option<Box<dyn PowerSampler>>) -> Self {
        self.sampler = sampler;
        self
    }

    // === Queries ===

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode.mode()
    }

    pub fn mode_controller(&self) -> &InteractionModeController {
        &self.mode
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn gauge(&self) -> &RiskGauge {
        &self.gauge
    }

    pub fn chunks(&self) -> &ChunkGenerator {
        &self.chunks
    }

    pub fn hazards(&self) -> &HazardSpawner {
        &self.hazards
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn revive_flags(&self) -> ReviveFlags {
        self.revive
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Current launch sampler value, if a sampler is attached
    pub fn launch_power01(&self) -> Option<f32> {
        self.sampler.as_ref().map(|s| s.sample01())
    }

    /// Cause of the most recent game over
    pub fn last_death(&self) -> Option<DeathCause> {
        self.last_death
    }

    /// Remaining post-revive invincibility, if counting down
    pub fn invincibility_remaining(&self) -> Option<f32> {
        self.invincibility.remaining()
    }

    /// Whether a revive command would be accepted right now
    pub fn can_revive(&self) -> bool {
        self.state == RunState::GameOver && self.revive_allowed()
    }

    fn revive_allowed(&self) -> bool {
        self.tuning.revive.allow_revive_once && !self.revive.used_this_run
    }

    /// Take all events recorded since the last drain.
    ///
    /// The outbox is never cleared by the simulation itself; hosts must
    /// drain it every frame.
    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    // === Commands ===

    /// Persist the best distance now, e.g. when the host shuts down mid-run
    pub fn commit_stats(&mut self) {
        self.stats.commit();
    }

    /// Tap: launch in Ready, toggle mode in Flying, ignored in GameOver
    pub fn tap(&mut self) {
        match self.state {
            RunState::Ready => self.launch(),
            RunState::Flying => {
                if self.revive.invincible_active {
                    log::debug!("[Run] Tap ignored during invincibility");
                    return;
                }
                if let Some(change) = self.mode.toggle() {
                    self.dispatch_mode_change(change);
                }
            }
            RunState::GameOver => log::debug!("[Run] Tap ignored in GameOver"),
        }
    }

    fn launch(&mut self) {
        let v01 = match self.sampler.as_ref() {
            Some(sampler) => sampler.sample01(),
            None => {
                log::debug!("[Run] No launch sampler, launching at minimum power");
                0.0
            }
        };
        log::info!("[Run] Launch gauge sample {:.2}", v01);

        // Physics must be on before the impulse lands
        self.transition(RunState::Flying);
        let power = self.body.launch_by_gauge(v01, 1.0);
        self.events.push(RunEvent::Launched { power });
        self.events.push(RunEvent::Sound(SoundCue::Launch));
    }

    /// Retry from GameOver: back to the start with a fresh level
    pub fn retry(&mut self) {
        if self.state != RunState::GameOver {
            log::debug!("[Run] Retry ignored in {:?}", self.state);
            return;
        }
        log::info!("[Run] Retry");

        self.body.reset_run(self.start_pos);
        let x = self.body.pos.x;

        self.hazards.clear(&mut self.world);
        self.chunks
            .reset(&mut self.world, &self.catalog, x, &mut self.events);
        self.hazards.reset_run(x);

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.hide_panel();
        }
        self.transition(RunState::Ready);
    }

    /// Revive from GameOver (once per run): relaunch from where the player
    /// died, invulnerable until the countdown after the relaunch ends
    pub fn revive(&mut self) {
        if !self.can_revive() {
            log::debug!(
                "[Run] Revive ignored (state {:?}, used {})",
                self.state,
                self.revive.used_this_run
            );
            return;
        }
        log::info!("[Run] Revive");

        self.revive.used_this_run = true;
        self.revive.revive_flow_active = true;
        self.begin_invincibility();
        self.body.set_simulation_enabled(true);

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.hide_panel();
        }
        self.events.push(RunEvent::Revived);
        self.transition(RunState::Ready);
    }

    /// Hazard contact or gauge exhaustion. Ignored unless Flying.
    pub fn terminate(&mut self, cause: DeathCause) {
        match self.state {
            RunState::Flying => {}
            RunState::GameOver => {
                log::debug!("[Run] Already GameOver, ignoring {:?}", cause);
                return;
            }
            RunState::Ready => {
                log::debug!("[Run] {:?} ignored in Ready", cause);
                return;
            }
        }
        self.last_death = Some(cause);
        self.transition(RunState::GameOver);
    }

    // === Transitions ===

    /// Change state and run its entry effects. Entering Ready resets the
    /// revive flags unless a revive is pending.
    fn transition(&mut self, new: RunState) {
        let prev = self.state;
        self.state = new;
        log::info!("[Run] State -> {:?}", new);
        if prev != new {
            self.events.push(RunEvent::StateChanged { new, prev });
        }

        match new {
            RunState::Ready => self.enter_ready(!self.revive.revive_flow_active),
            RunState::Flying => self.enter_flying(),
            RunState::GameOver => self.enter_game_over(),
        }
    }

    fn enter_ready(&mut self, reset_revive: bool) {
        if reset_revive {
            self.end_invincibility();
            self.set_mode(PlayerMode::Interactive);
            self.revive = ReviveFlags::default();
            self.last_death = None;
        }

        // Held in place until launch
        self.body.set_simulation_enabled(false);
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.set_visible(true);
            sampler.set_running(true);
        }
        self.gauge.reset();
        // A countdown never survives a return to Ready
        self.invincibility.cancel();
        self.stats.begin_run(self.body.pos.x);
    }

    fn enter_flying(&mut self) {
        self.body.set_simulation_enabled(true);
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.set_running(false);
            sampler.set_visible(false);
        }

        if self.revive.revive_flow_active {
            self.revive.revive_flow_active = false;
            let seconds = self.tuning.revive.invincible_seconds;
            self.invincibility.start(seconds);
            log::info!("[Run] Invincible for {:.1}s", seconds);
        }
    }

    fn enter_game_over(&mut self) {
        self.body.freeze();
        self.end_invincibility();

        let can_revive = self.revive_allowed();
        let distance = self.stats.current_distance();
        self.stats.commit();
        let best = self.stats.best_distance();
        log::info!(
            "[Run] Game over ({:?}) at {:.1}, best {:.1}, can revive: {}",
            self.last_death,
            distance,
            best,
            can_revive
        );

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.show_game_over_panel(can_revive, distance, best);
        }
        self.events.push(RunEvent::GameOver {
            cause: self.last_death.unwrap_or(DeathCause::Hazard),
            can_revive,
            distance,
        });
        self.events.push(RunEvent::Sound(SoundCue::GameOver));
    }

    // === Mode / invincibility ===

    fn set_mode(&mut self, mode: PlayerMode) {
        if let Some(change) = self.mode.set_mode(mode) {
            self.dispatch_mode_change(change);
        }
    }

    /// Deliver a mode change to every subscriber before returning
    fn dispatch_mode_change(&mut self, change: ModeChange) {
        for subscriber in self.mode.subscribers().to_vec() {
            match subscriber {
                // Forced changes outside flight never pay a snap bonus
                ModeSubscriber::RiskGauge if self.state != RunState::Flying => {}
                ModeSubscriber::RiskGauge => {
                    if let Some(amount) = self.gauge.on_mode_changed(change) {
                        self.events.push(RunEvent::SnapBonus { amount });
                    }
                }
                ModeSubscriber::Presentation => {
                    self.events.push(RunEvent::ModeChanged {
                        new: change.new,
                        prev: change.prev,
                    });
                    self.events.push(RunEvent::Sound(SoundCue::ModeSwitch));
                }
            }
        }
    }

    /// Gauge paused, mode forced to Invulnerable
    fn begin_invincibility(&mut self) {
        self.invincibility.cancel();
        self.revive.invincible_active = true;
        self.gauge.set_paused(true);
        self.set_mode(PlayerMode::Invulnerable);
        self.events.push(RunEvent::InvincibilityStarted);
        self.events.push(RunEvent::Sound(SoundCue::Invincible));
    }

    /// Stop any countdown and, if invincible, restore normal rules
    pub(crate) fn end_invincibility(&mut self) {
        self.invincibility.cancel();
        if !self.revive.invincible_active {
            return;
        }
        self.revive.invincible_active = false;
        self.gauge.set_paused(false);
        self.set_mode(PlayerMode::Interactive);
        self.events.push(RunEvent::InvincibilityEnded);
        log::info!("[Run] Invincibility ended");
    }
}
