//! Fighter state (authoritative) and its factory/reset operations

use serde::Serialize;

use crate::util::geometry::Rect;

use super::ai::AiMemory;

/// Starting and maximum hit points
pub const MAX_HP: f32 = 100.0;

/// Horizontal facing, recomputed every physics step from the opponent's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
        }
    }

    /// Facing of an actor at `x` looking at an opponent at `opponent_x`.
    /// Ties face left.
    pub fn toward(x: f32, opponent_x: f32) -> Self {
        if x < opponent_x {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Descriptive state consumed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    Idle,
    Run,
    Jump,
    Punch,
    Kick,
    Hurt,
    Ko,
}

/// Device class selected once per setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    #[default]
    Desktop,
    MobilePortrait,
    MobileLandscape,
}

/// Size, speed and layout multipliers for a device class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub jump_impulse: f32,
    /// Multiplier applied to attack reach and height
    pub reach_scale: f32,
    /// Distance from the bottom of the canvas to the floor line
    pub floor_margin: f32,
    /// Spawn x of the left-hand actor
    pub left_spawn_x: f32,
    /// Spawn x of the right-hand actor, measured back from the arena width
    pub right_spawn_inset: f32,
}

impl DeviceClass {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Some(Self::Desktop),
            "mobile" | "mobile-portrait" => Some(Self::MobilePortrait),
            "mobile-landscape" => Some(Self::MobileLandscape),
            _ => None,
        }
    }

    pub fn profile(self) -> DeviceProfile {
        match self {
            Self::Desktop => DeviceProfile {
                width: 60.0,
                height: 130.0,
                speed: 4.2,
                jump_impulse: 14.0,
                reach_scale: 1.0,
                floor_margin: 90.0,
                left_spawn_x: 120.0,
                right_spawn_inset: 170.0,
            },
            Self::MobilePortrait => DeviceProfile {
                width: 50.0,
                height: 110.0,
                speed: 3.5,
                jump_impulse: 12.0,
                reach_scale: 0.8,
                floor_margin: 60.0,
                left_spawn_x: 60.0,
                right_spawn_inset: 100.0,
            },
            Self::MobileLandscape => DeviceProfile {
                width: 45.0,
                height: 90.0,
                speed: 3.5,
                jump_impulse: 12.0,
                reach_scale: 0.8,
                floor_margin: 60.0,
                left_spawn_x: 60.0,
                right_spawn_inset: 100.0,
            },
        }
    }
}

/// Logical action -> input identifier bindings. Immutable per actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub left: String,
    pub right: String,
    pub up: String,
    pub punch: String,
    pub kick: String,
}

impl Controls {
    pub fn new(left: &str, right: &str, up: &str, punch: &str, kick: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            up: up.to_string(),
            punch: punch.to_string(),
            kick: kick.to_string(),
        }
    }

    /// a/d/w with f/g for punch/kick
    pub fn wasd() -> Self {
        Self::new("a", "d", "w", "f", "g")
    }

    /// Arrow keys with `/` and `.` for punch/kick
    pub fn arrows() -> Self {
        Self::new("ArrowLeft", "ArrowRight", "ArrowUp", "/", ".")
    }
}

/// Kind of melee attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Short reach, fast, low damage
    Punch,
    /// Long reach, slow, high damage
    Kick,
}

impl AttackKind {
    pub fn state(self) -> ActorState {
        match self {
            Self::Punch => ActorState::Punch,
            Self::Kick => ActorState::Kick,
        }
    }
}

/// Live hitbox owned by the attacking actor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attack {
    pub kind: AttackKind,
    pub hitbox: Rect,
    pub dmg: f32,
    pub knock: f32,
    /// Remaining lifetime in ms
    pub ttl: f32,
    /// Set the instant the hitbox first lands; guards against repeat damage
    pub has_hit: bool,
}

/// Identity and placement for a new actor
#[derive(Debug, Clone)]
pub struct ActorSetup {
    pub name: String,
    pub color: String,
    pub x: f32,
    pub face: Facing,
    pub controls: Controls,
    pub is_bot: bool,
    pub device: DeviceClass,
    pub aggression: f32,
}

/// A fighter. Mutated in place by the frame systems; owned by the round session.
#[derive(Debug, Clone)]
pub struct Actor {
    // Identity
    pub name: String,
    pub color: String,
    pub controls: Controls,
    pub is_bot: bool,
    pub device: DeviceClass,

    // Body
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub jump_impulse: f32,
    pub face: Facing,
    pub on_ground: bool,

    // Vitality
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    pub stun: f32,
    pub combo_lock: f32,

    // Behavior
    pub state: ActorState,
    pub attack: Option<Attack>,
    pub ai: AiMemory,
    pub anim_time: f32,
    pub hit_this_frame: bool,
}

impl Actor {
    /// Build a fresh actor standing on `floor_y`
    pub fn new(setup: ActorSetup, floor_y: f32) -> Self {
        let profile = setup.device.profile();
        Self {
            name: setup.name,
            color: setup.color,
            controls: setup.controls,
            is_bot: setup.is_bot,
            device: setup.device,
            x: setup.x,
            y: floor_y - profile.height,
            w: profile.width,
            h: profile.height,
            vx: 0.0,
            vy: 0.0,
            speed: profile.speed,
            jump_impulse: profile.jump_impulse,
            face: setup.face,
            on_ground: true,
            hp: MAX_HP,
            max_hp: MAX_HP,
            dead: false,
            stun: 0.0,
            combo_lock: 0.0,
            state: ActorState::Idle,
            attack: None,
            ai: AiMemory::new(setup.aggression),
            anim_time: 0.0,
            hit_this_frame: false,
        }
    }

    /// Return to full-HP idle at a new position. Identity, size and capabilities are kept.
    pub fn reset(&mut self, x: f32, face: Facing, floor_y: f32) {
        self.x = x;
        self.y = floor_y - self.h;
        self.vx = 0.0;
        self.vy = 0.0;
        self.face = face;
        self.on_ground = true;
        self.hp = self.max_hp;
        self.dead = false;
        self.stun = 0.0;
        self.combo_lock = 0.0;
        self.state = ActorState::Idle;
        self.attack = None;
        self.ai.reset();
        self.anim_time = 0.0;
        self.hit_this_frame = false;
    }

    pub fn body(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Dead or stunned actors accept no input and make no AI decisions
    pub fn is_inert(&self) -> bool {
        self.dead || self.stun > 0.0
    }

    /// Change the descriptive state, restarting the animation clock on a real change
    pub fn set_state(&mut self, state: ActorState) {
        if self.state != state {
            self.state = state;
            self.anim_time = 0.0;
        }
    }

    /// Derive idle/run/jump from motion. Leaves attack states alone while a hitbox is live.
    pub fn settle_motion_state(&mut self, moving: bool) {
        if self.attack.is_some() {
            return;
        }
        let next = if !self.on_ground {
            ActorState::Jump
        } else if moving {
            ActorState::Run
        } else {
            ActorState::Idle
        };
        self.set_state(next);
    }

    /// Launch upward if standing on the floor. Returns whether the jump happened.
    pub fn try_jump(&mut self) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vy = -self.jump_impulse;
        self.on_ground = false;
        true
    }
}
