//! Opponent controller: a time-gated finite-state machine driving a bot fighter.
//!
//! The controller only looks at the opponent's body position, never at the
//! opponent's inputs. Every random draw goes through [`RandomSource`] so a
//! seeded or scripted source makes the bot fully reproducible.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::actor::{Actor, AttackKind};
use super::combat::CombatSystem;

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for ChaCha8Rng {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Bot behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Idle,
    Chase,
    Attack,
    Retreat,
    JumpAttack,
}

/// Per-bot controller memory, stored on the actor
#[derive(Debug, Clone, PartialEq)]
pub struct AiMemory {
    pub state: AiState,
    /// Milliseconds spent in the current state
    pub timer: f32,
    /// Reevaluation threshold for the current state, rolled on first use
    pub threshold: Option<f32>,
    /// Chance in [0, 1] of committing to an attack when already in range
    pub aggression: f32,
}

impl AiMemory {
    pub fn new(aggression: f32) -> Self {
        Self {
            state: AiState::Idle,
            timer: 0.0,
            threshold: None,
            aggression: aggression.clamp(0.0, 1.0),
        }
    }

    pub fn reset(&mut self) {
        self.state = AiState::Idle;
        self.timer = 0.0;
        self.threshold = None;
    }
}

/// Nominal sprite box used for range checks, independent of the body size
pub const NOMINAL_WIDTH: f32 = 200.0;
pub const NOMINAL_HEIGHT: f32 = 100.0;

const HORIZONTAL_RANGE_FACTOR: f32 = 0.25;
const VERTICAL_RANGE_FACTOR: f32 = 0.4;
const CLOSE_RANGE_FACTOR: f32 = 3.0;

/// (base, jitter) in ms for each time-gated state
const IDLE_WINDOW: (f32, f32) = (200.0, 300.0);
const CHASE_WINDOW: (f32, f32) = (800.0, 400.0);
const ATTACK_WINDOW: (f32, f32) = (300.0, 200.0);
const RETREAT_WINDOW: (f32, f32) = (400.0, 300.0);

const IDLE_RETREAT_CHANCE: f32 = 0.25;
const CHASE_SPEED: f32 = 0.9;
const CHASE_JUMP_CHANCE: f32 = 0.02;
/// Opponent counts as "above" when its top edge is this far over the bot's
const ABOVE_THRESHOLD: f32 = 30.0;
const NUDGE_SPEED: f32 = 0.4;
const NUDGE_START: f32 = 0.8;
const PUNCH_CHANCE: f32 = 0.6;
const ATTACK_RETREAT_CHANCE: f32 = 0.4;
const AIR_DRIFT_SPEED: f32 = 0.5;
const AIR_KICK_CHANCE: f32 = 0.7;

/// Relative geometry between the bot and its opponent for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engagement {
    pub dist_x: f32,
    pub dist_y: f32,
    pub horizontal_range: f32,
    pub vertical_range: f32,
    pub close_range: f32,
    /// +1 when the opponent is to the right, -1 otherwise
    pub toward: f32,
    pub opponent_above: bool,
}

impl Engagement {
    pub fn measure(bot: &Actor, opponent: &Actor) -> Self {
        let bot_cx = bot.x + NOMINAL_WIDTH / 2.0;
        let bot_cy = bot.y + NOMINAL_HEIGHT / 2.0;
        let opp_cx = opponent.x + NOMINAL_WIDTH / 2.0;
        let opp_cy = opponent.y + NOMINAL_HEIGHT / 2.0;

        Self {
            dist_x: (bot_cx - opp_cx).abs(),
            dist_y: (bot_cy - opp_cy).abs(),
            horizontal_range: 2.0 * NOMINAL_WIDTH * HORIZONTAL_RANGE_FACTOR,
            vertical_range: 2.0 * NOMINAL_HEIGHT * VERTICAL_RANGE_FACTOR,
            close_range: 2.0 * NOMINAL_WIDTH * CLOSE_RANGE_FACTOR,
            toward: if opp_cx > bot_cx { 1.0 } else { -1.0 },
            opponent_above: opponent.y < bot.y - ABOVE_THRESHOLD,
        }
    }

    pub fn in_range(&self) -> bool {
        self.dist_x < self.horizontal_range && self.dist_y < self.vertical_range
    }

    pub fn within_close_range(&self) -> bool {
        self.dist_x < self.close_range
    }
}

/// Drives bot actors
pub struct OpponentController;

impl OpponentController {
    /// Run one decision step for `bot`. Dead or stunned bots are left untouched.
    pub fn update<R: RandomSource>(bot: &mut Actor, opponent: &Actor, dt: f32, rng: &mut R) {
        if !bot.is_bot || bot.is_inert() {
            return;
        }

        bot.ai.timer += dt;
        let view = Engagement::measure(bot, opponent);

        match bot.ai.state {
            AiState::Idle => {
                // Stand still between decisions instead of coasting on the last chase velocity
                bot.vx = 0.0;
                if Self::window_elapsed(bot, rng, IDLE_WINDOW) {
                    let next = if view.in_range() && rng.next_unit() < bot.ai.aggression {
                        AiState::Attack
                    } else if view.within_close_range() && rng.next_unit() < IDLE_RETREAT_CHANCE {
                        AiState::Retreat
                    } else {
                        AiState::Chase
                    };
                    Self::enter(bot, next);
                }
            }
            AiState::Chase => {
                bot.vx = view.toward * bot.speed * CHASE_SPEED;
                // Range wins over the jump trigger, so a bot that reaches its target attacks grounded
                if view.in_range() {
                    Self::enter(bot, AiState::Attack);
                } else if bot.on_ground
                    && (view.opponent_above || rng.next_unit() < CHASE_JUMP_CHANCE)
                {
                    bot.try_jump();
                    Self::enter(bot, AiState::JumpAttack);
                } else if Self::window_elapsed(bot, rng, CHASE_WINDOW) {
                    Self::enter(bot, AiState::Idle);
                }
            }
            AiState::Attack => {
                bot.vx = if view.dist_x > view.horizontal_range * NUDGE_START {
                    view.toward * bot.speed * NUDGE_SPEED
                } else {
                    0.0
                };
                if CombatSystem::can_attack(bot) {
                    let kind = if rng.next_unit() < PUNCH_CHANCE {
                        AttackKind::Punch
                    } else {
                        AttackKind::Kick
                    };
                    CombatSystem::start_attack(bot, kind);
                }
                if Self::window_elapsed(bot, rng, ATTACK_WINDOW) {
                    let next = if rng.next_unit() < ATTACK_RETREAT_CHANCE {
                        AiState::Retreat
                    } else {
                        AiState::Idle
                    };
                    Self::enter(bot, next);
                }
            }
            AiState::Retreat => {
                bot.vx = -view.toward * bot.speed;
                if Self::window_elapsed(bot, rng, RETREAT_WINDOW) {
                    Self::enter(bot, AiState::Idle);
                }
            }
            AiState::JumpAttack => {
                bot.vx = view.toward * bot.speed * AIR_DRIFT_SPEED;
                if !bot.on_ground
                    && view.in_range()
                    && CombatSystem::can_attack(bot)
                    && rng.next_unit() < AIR_KICK_CHANCE
                {
                    CombatSystem::start_attack(bot, AttackKind::Kick);
                }
                if bot.on_ground {
                    Self::enter(bot, AiState::Idle);
                }
            }
        }

        bot.settle_motion_state(bot.vx != 0.0);
    }

    fn window_elapsed<R: RandomSource>(bot: &mut Actor, rng: &mut R, window: (f32, f32)) -> bool {
        let (base, jitter) = window;
        let threshold = *bot
            .ai
            .threshold
            .get_or_insert_with(|| base + rng.next_unit() * jitter);
        bot.ai.timer > threshold
    }

    fn enter(bot: &mut Actor, next: AiState) {
        trace!(bot = %bot.name, from = ?bot.ai.state, to = ?next, "AI transition");
        bot.ai.state = next;
        bot.ai.timer = 0.0;
        bot.ai.threshold = None;
    }
}
