//! Round session and the per-frame sequencer

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::MS_PER_SECOND;

use super::actor::{Actor, ActorSetup, AttackKind, Controls, DeviceClass, Facing};
use super::ai::{OpponentController, RandomSource};
use super::combat::{CombatSystem, HitResult};
use super::input::{HeldInputs, InputSource, InputSystem};
use super::physics::{Arena, PhysicsSystem};

/// Default countdown length
pub const ROUND_SECONDS: u32 = 99;

/// Default bot aggression
pub const DEFAULT_AGGRESSION: f32 = 0.7;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Not started, or halted by the owner between frames
    Stopped,
    /// Frames are being simulated
    Running,
    /// Terminal; only a reset leaves this phase
    Ended,
}

/// Parameters fixed for a whole match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSetup {
    pub device: DeviceClass,
    pub arena_width: f32,
    /// Canvas height; the floor sits a device-dependent margin above it
    pub canvas_height: f32,
    pub round_seconds: u32,
    pub aggression: f32,
    /// Hand the second fighter to the AI as well
    pub autoplay: bool,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            device: DeviceClass::Desktop,
            arena_width: 1280.0,
            canvas_height: 720.0,
            round_seconds: ROUND_SECONDS,
            aggression: DEFAULT_AGGRESSION,
            autoplay: false,
        }
    }
}

impl MatchSetup {
    pub fn floor_y(&self) -> f32 {
        self.canvas_height - self.device.profile().floor_margin
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.floor_y())
    }

    /// Spawn x for each slot
    pub fn spawn_x(&self) -> [f32; 2] {
        let profile = self.device.profile();
        [
            profile.left_spawn_x,
            self.arena_width - profile.right_spawn_inset,
        ]
    }

    /// Slot 0 is the bot on the left, slot 1 the keyboard fighter on the right
    pub fn build_actors(&self) -> [Actor; 2] {
        let [left_x, right_x] = self.spawn_x();
        let floor_y = self.floor_y();
        [
            Actor::new(
                ActorSetup {
                    name: "Vamanan".to_string(),
                    color: "#4ade80".to_string(),
                    x: left_x,
                    face: Facing::Right,
                    controls: Controls::wasd(),
                    is_bot: true,
                    device: self.device,
                    aggression: self.aggression,
                },
                floor_y,
            ),
            Actor::new(
                ActorSetup {
                    name: "Maveli".to_string(),
                    color: "#60a5fa".to_string(),
                    x: right_x,
                    face: Facing::Left,
                    controls: Controls::arrows(),
                    is_bot: self.autoplay,
                    device: self.device,
                    aggression: self.aggression,
                },
                floor_y,
            ),
        ]
    }
}

/// Terminal result of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundOutcome {
    Winner { slot: usize, name: String },
    Draw,
}

impl RoundOutcome {
    /// Label shown by the UI
    pub fn label(&self) -> String {
        match self {
            Self::Winner { name, .. } => format!("{name} Wins!"),
            Self::Draw => "Draw!".to_string(),
        }
    }

    /// Time-out compares HP; otherwise the surviving fighter wins
    pub fn decide(actors: &[Actor; 2], time_expired: bool) -> Self {
        let winner = |slot: usize| Self::Winner {
            slot,
            name: actors[slot].name.clone(),
        };
        let [a, b] = actors;
        if time_expired {
            if a.hp > b.hp {
                winner(0)
            } else if b.hp > a.hp {
                winner(1)
            } else {
                Self::Draw
            }
        } else {
            match (a.dead, b.dead) {
                (false, true) => winner(0),
                (true, false) => winner(1),
                _ => Self::Draw,
            }
        }
    }
}

/// Something that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameEvent {
    Hit {
        attacker: usize,
        defender: usize,
        kind: AttackKind,
        damage: f32,
        defender_hp: f32,
    },
    Knockout {
        slot: usize,
    },
}

/// Per-frame data for the UI collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub hp: [f32; 2],
    pub seconds_left: u32,
    pub events: Vec<FrameEvent>,
}

/// Result of one sequencer step
#[derive(Debug, Clone, PartialEq)]
pub enum FrameResult {
    /// The session is stopped or already ended; nothing was simulated
    Halted,
    Running(FrameReport),
    /// The frame that ended the round. Emitted exactly once per round.
    Ended {
        report: FrameReport,
        outcome: RoundOutcome,
    },
}

impl FrameResult {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Halted => None,
            Self::Running(report) | Self::Ended { report, .. } => Some(report),
        }
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        match self {
            Self::Ended { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Forward this frame to a UI collaborator
    pub fn notify<O: RoundObserver + ?Sized>(&self, observer: &mut O) {
        if let Some(report) = self.report() {
            observer.on_frame(report.hp[0], report.hp[1], report.seconds_left);
        }
        if let Some(outcome) = self.outcome() {
            observer.on_round_end(&outcome.label());
        }
    }
}

/// UI-side receiver of per-frame and end-of-round notifications
pub trait RoundObserver {
    fn on_frame(&mut self, hp1: f32, hp2: f32, seconds_left: u32);
    fn on_round_end(&mut self, label: &str);
}

/// One match: both fighters, the held inputs, the AI's random source and the round clock.
/// Everything the frame loop mutates lives here.
pub struct RoundSession<R: RandomSource = ChaCha8Rng> {
    id: Uuid,
    setup: MatchSetup,
    arena: Arena,
    actors: [Actor; 2],
    inputs: HeldInputs,
    rng: R,
    phase: RoundPhase,
    seconds_left: u32,
    /// Milliseconds not yet drained into whole countdown seconds
    clock_acc: f32,
    last_tick: Option<f64>,
    frame: u64,
}

impl RoundSession<ChaCha8Rng> {
    pub fn seeded(setup: MatchSetup, seed: u64) -> Self {
        Self::new(setup, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> RoundSession<R> {
    pub fn new(setup: MatchSetup, rng: R) -> Self {
        let actors = setup.build_actors();
        Self {
            id: Uuid::new_v4(),
            arena: setup.arena(),
            seconds_left: setup.round_seconds,
            setup,
            actors,
            inputs: HeldInputs::new(),
            rng,
            phase: RoundPhase::Stopped,
            clock_acc: 0.0,
            last_tick: None,
            frame: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn setup(&self) -> &MatchSetup {
        &self.setup
    }

    pub fn actors(&self) -> &[Actor; 2] {
        &self.actors
    }

    pub fn actor(&self, slot: usize) -> &Actor {
        &self.actors[slot]
    }

    /// Direct access for hosts that script fighters (tests, replays)
    pub fn actors_mut(&mut self) -> &mut [Actor; 2] {
        &mut self.actors
    }

    pub fn press(&mut self, source: InputSource, id: &str) {
        self.inputs.press(source, id);
    }

    pub fn release(&mut self, source: InputSource, id: &str) {
        self.inputs.release(source, id);
    }

    pub fn inputs(&self) -> &HeldInputs {
        &self.inputs
    }

    /// Begin (or resume) simulating. `now` is the host clock in ms. An ended round stays ended.
    pub fn start(&mut self, now: f64) {
        if self.phase == RoundPhase::Ended {
            return;
        }
        self.last_tick = Some(now);
        self.phase = RoundPhase::Running;
        info!(
            round_id = %self.id,
            seconds_left = self.seconds_left,
            "Round running"
        );
    }

    /// Halt between frames; state stays as of the last completed frame
    pub fn stop(&mut self) {
        if self.phase == RoundPhase::Running {
            self.phase = RoundPhase::Stopped;
            info!(round_id = %self.id, frame = self.frame, "Round stopped");
        }
    }

    /// Put both fighters back on their marks and rewind the clock. Leaves the session stopped.
    pub fn reset(&mut self) {
        let [left_x, right_x] = self.setup.spawn_x();
        let floor_y = self.arena.floor_y;
        self.actors[0].reset(left_x, Facing::Right, floor_y);
        self.actors[1].reset(right_x, Facing::Left, floor_y);
        self.inputs.clear();
        self.seconds_left = self.setup.round_seconds;
        self.clock_acc = 0.0;
        self.last_tick = None;
        self.frame = 0;
        self.phase = RoundPhase::Stopped;
        debug!(round_id = %self.id, "Round reset");
    }

    /// Reset and start in one call
    pub fn restart(&mut self, now: f64) {
        self.reset();
        self.start(now);
    }

    /// Step using the host clock. The first frame after `start` measures from the start time.
    pub fn frame(&mut self, now: f64) -> FrameResult {
        let last = self.last_tick.unwrap_or(now);
        self.last_tick = Some(now);
        self.tick((now - last) as f32)
    }

    /// Advance the round by `dt` ms
    pub fn tick(&mut self, dt: f32) -> FrameResult {
        if self.phase != RoundPhase::Running {
            return FrameResult::Halted;
        }
        let dt = dt.max(0.0);
        self.frame += 1;
        self.advance_clock(dt);

        let [a, b] = &mut self.actors;

        Self::drive(a, b, dt, &self.inputs, &mut self.rng);
        Self::drive(b, a, dt, &self.inputs, &mut self.rng);

        PhysicsSystem::update_actor(a, b, dt, &self.arena);
        PhysicsSystem::update_actor(b, a, dt, &self.arena);

        let mut events = Vec::new();
        if let Some(hit) = CombatSystem::apply_attack(a, b, dt) {
            Self::record_hit(&mut events, 0, 1, hit);
        }
        if let Some(hit) = CombatSystem::apply_attack(b, a, dt) {
            Self::record_hit(&mut events, 1, 0, hit);
        }

        let report = FrameReport {
            frame: self.frame,
            hp: [self.actors[0].hp, self.actors[1].hp],
            seconds_left: self.seconds_left,
            events,
        };

        let time_expired = self.seconds_left == 0;
        if !(time_expired || self.actors[0].dead || self.actors[1].dead) {
            return FrameResult::Running(report);
        }

        self.phase = RoundPhase::Ended;
        let outcome = RoundOutcome::decide(&self.actors, time_expired);
        info!(
            round_id = %self.id,
            frame = self.frame,
            hp_left = self.actors[0].hp,
            hp_right = self.actors[1].hp,
            time_expired,
            outcome = %outcome.label(),
            "Round ended"
        );
        FrameResult::Ended { report, outcome }
    }

    fn drive(p: &mut Actor, opponent: &Actor, dt: f32, inputs: &HeldInputs, rng: &mut R) {
        if p.is_bot {
            OpponentController::update(p, opponent, dt, rng);
        } else {
            InputSystem::apply(p, inputs);
        }
    }

    /// Drain whole seconds from the accumulator, keeping the remainder
    fn advance_clock(&mut self, dt: f32) {
        self.clock_acc += dt;
        while self.clock_acc >= MS_PER_SECOND {
            self.clock_acc -= MS_PER_SECOND;
            self.seconds_left = self.seconds_left.saturating_sub(1);
        }
    }

    fn record_hit(events: &mut Vec<FrameEvent>, attacker: usize, defender: usize, hit: HitResult) {
        events.push(FrameEvent::Hit {
            attacker,
            defender,
            kind: hit.kind,
            damage: hit.damage,
            defender_hp: hit.defender_hp,
        });
        if hit.knocked_out {
            events.push(FrameEvent::Knockout { slot: defender });
        }
    }
}
