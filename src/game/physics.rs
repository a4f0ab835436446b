//! Fighter physics: gravity, floor, walls, body separation

use crate::util::geometry::{clamp, rects_overlap};

use super::actor::{Actor, ActorState, Facing};

/// Downward acceleration added to vertical velocity once per step
pub const GRAVITY: f32 = 0.7;

/// Minimum distance kept between a fighter and either side wall
pub const WALL_MARGIN: f32 = 10.0;

/// Gap left on each side of the midpoint when two bodies are pushed apart
pub const SEPARATION_MARGIN: f32 = 2.0;

/// Arena bounds in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    /// Floor line; fighters rest with their lower edge on it
    pub floor_y: f32,
}

impl Arena {
    pub fn new(width: f32, floor_y: f32) -> Self {
        Self { width, floor_y }
    }

    /// Smallest legal x for any fighter
    pub fn min_x(&self) -> f32 {
        WALL_MARGIN
    }

    /// Largest legal x for a fighter of width `w`
    pub fn max_x(&self, w: f32) -> f32 {
        self.width - w - WALL_MARGIN
    }
}

/// Physics system for updating fighter bodies
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance one fighter by one step. `dt` (ms) drives the timers only;
    /// velocities are in pixels per step.
    pub fn update_actor(p: &mut Actor, opponent: &mut Actor, dt: f32, arena: &Arena) {
        p.face = Facing::toward(p.x, opponent.x);

        p.combo_lock = (p.combo_lock - dt).max(0.0);
        p.stun = (p.stun - dt).max(0.0);
        p.anim_time += dt;
        p.hit_this_frame = false;

        p.vy += GRAVITY;
        p.x += p.vx;
        p.y += p.vy;

        Self::land_on_floor(p, arena);
        Self::clamp_to_walls(p, arena);
        Self::separate(p, opponent, arena);

        if p.hp <= 0.0 && !p.dead {
            p.dead = true;
            p.state = ActorState::Ko;
            p.anim_time = 0.0;
        }
        debug_assert!(!p.dead || p.hp <= 0.0);
    }

    /// Snap to the floor if the body passed it; the grounded flag follows the floor test
    pub fn land_on_floor(p: &mut Actor, arena: &Arena) {
        if p.y + p.h >= arena.floor_y {
            p.y = arena.floor_y - p.h;
            p.vy = 0.0;
            p.on_ground = true;
        } else {
            p.on_ground = false;
        }
    }

    pub fn clamp_to_walls(p: &mut Actor, arena: &Arena) {
        p.x = clamp(p.x, arena.min_x(), arena.max_x(p.w));
    }

    /// Push two overlapping bodies apart around the midpoint of their left edges,
    /// then keep both inside the walls.
    pub fn separate(a: &mut Actor, b: &mut Actor, arena: &Arena) {
        if !rects_overlap(&a.body(), &b.body()) {
            return;
        }

        let (left, right) = if a.x < b.x { (a, b) } else { (b, a) };
        let mid = (left.x + right.x) / 2.0;
        left.x = left.x.min(mid - left.w - SEPARATION_MARGIN);
        right.x = right.x.max(mid + SEPARATION_MARGIN);

        Self::clamp_to_walls(left, arena);
        Self::clamp_to_walls(right, arena);

        if rects_overlap(&left.body(), &right.body()) {
            // One body is pinned against a wall; move the other one clear of it
            if right.x >= arena.max_x(right.w) {
                left.x = right.x - left.w - SEPARATION_MARGIN;
            } else {
                right.x = left.x + left.w + SEPARATION_MARGIN;
            }
            Self::clamp_to_walls(left, arena);
            Self::clamp_to_walls(right, arena);
        }
    }
}
