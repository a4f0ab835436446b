//! Combat system - attack start, hitbox tracking, hit resolution

use serde::Serialize;
use tracing::debug;

use crate::util::geometry::{rects_overlap, Rect};

use super::actor::{Actor, ActorState, Attack, AttackKind, DeviceClass, Facing};

/// Stun applied to a defender on every landed hit (ms)
pub const HIT_STUN_MS: f32 = 180.0;

/// Hitbox top edge, measured down from the owner's top edge
pub const HITBOX_TOP_OFFSET: f32 = 20.0;

/// Upward velocity given to a grounded defender on hit
pub const GROUND_POP: f32 = 4.0;

/// Extra upward velocity given to an airborne defender on hit
pub const AIR_POP: f32 = 2.0;

/// Attack stats per kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackStats {
    /// Hitbox width in front of the owner
    pub reach: f32,
    /// Hitbox height
    pub height: f32,
    /// Damage per landed hit
    pub damage: f32,
    /// Horizontal knockback speed
    pub knockback: f32,
    /// Hitbox lifetime (ms)
    pub ttl: f32,
    /// Lockout before the next attack (ms). Always longer than `ttl`.
    pub combo_lock: f32,
}

impl AttackStats {
    pub fn for_kind(kind: AttackKind, device: DeviceClass) -> Self {
        let base = match kind {
            AttackKind::Punch => Self {
                reach: 38.0,
                height: 26.0,
                damage: 8.0,
                knockback: 6.0,
                ttl: 120.0,
                combo_lock: 160.0,
            },
            AttackKind::Kick => Self {
                reach: 64.0,
                height: 34.0,
                damage: 12.0,
                knockback: 10.0,
                ttl: 160.0,
                combo_lock: 260.0,
            },
        };
        let scale = device.profile().reach_scale;
        Self {
            reach: base.reach * scale,
            height: base.height * scale,
            ..base
        }
    }
}

/// Outcome of a landed hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitResult {
    pub kind: AttackKind,
    pub damage: f32,
    pub defender_hp: f32,
    pub knocked_out: bool,
}

/// Combat system for starting and resolving melee attacks
pub struct CombatSystem;

impl CombatSystem {
    /// Check if an actor may start a new attack
    pub fn can_attack(actor: &Actor) -> bool {
        actor.combo_lock <= 0.0 && actor.stun <= 0.0 && !actor.dead
    }

    /// Start an attack in front of the actor. Returns false (and changes nothing)
    /// while locked out, stunned or dead.
    pub fn start_attack(actor: &mut Actor, kind: AttackKind) -> bool {
        if !Self::can_attack(actor) {
            return false;
        }
        debug_assert!(
            actor.attack.is_none(),
            "combo lock outlives every attack, so no hitbox can still be live"
        );

        let stats = AttackStats::for_kind(kind, actor.device);
        actor.attack = Some(Attack {
            kind,
            hitbox: Self::hitbox_for(actor, stats.reach, stats.height),
            dmg: stats.damage,
            knock: stats.knockback,
            ttl: stats.ttl,
            has_hit: false,
        });
        actor.state = kind.state();
        actor.combo_lock = stats.combo_lock;
        actor.anim_time = 0.0;
        true
    }

    /// Age the attacker's hitbox and resolve it against the defender at most once
    pub fn apply_attack(attacker: &mut Actor, defender: &mut Actor, dt: f32) -> Option<HitResult> {
        let mut attack = attacker.attack.take()?;

        if attacker.dead {
            // A knocked-out fighter's swing is dropped without touching the ko state
            return None;
        }

        attack.ttl -= dt;
        if attack.ttl <= 0.0 {
            attacker.state = if attacker.on_ground {
                ActorState::Idle
            } else {
                ActorState::Jump
            };
            attacker.anim_time = 0.0;
            return None;
        }

        attack.hitbox = Self::hitbox_for(attacker, attack.hitbox.w, attack.hitbox.h);

        let mut hit = None;
        if !attack.has_hit && !defender.dead && rects_overlap(&attack.hitbox, &defender.body()) {
            attack.has_hit = true;
            hit = Some(Self::land_hit(&attack, attacker.face, defender));
        }

        attacker.attack = Some(attack);
        hit
    }

    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_hp: f32, damage: f32) -> (f32, bool) {
        let new_hp = (current_hp - damage).max(0.0);
        (new_hp, new_hp <= 0.0)
    }

    fn land_hit(attack: &Attack, attacker_face: Facing, defender: &mut Actor) -> HitResult {
        let (hp, knocked_out) = CombatSystem::apply_damage(defender.hp, attack.dmg);
        defender.hp = hp;
        defender.stun = HIT_STUN_MS;
        defender.state = if knocked_out {
            ActorState::Ko
        } else {
            ActorState::Hurt
        };
        defender.vx = attacker_face.sign() * attack.knock;
        defender.vy = if defender.on_ground {
            -GROUND_POP
        } else {
            defender.vy - AIR_POP
        };
        defender.anim_time = 0.0;
        defender.hit_this_frame = true;
        if knocked_out {
            defender.dead = true;
        }
        debug_assert!(defender.hp >= 0.0 && defender.hp <= defender.max_hp);

        debug!(
            defender = %defender.name,
            kind = ?attack.kind,
            damage = attack.dmg,
            hp = defender.hp,
            "Hit landed"
        );

        HitResult {
            kind: attack.kind,
            damage: attack.dmg,
            defender_hp: defender.hp,
            knocked_out,
        }
    }

    fn hitbox_for(owner: &Actor, reach: f32, height: f32) -> Rect {
        let x = match owner.face {
            Facing::Right => owner.x + owner.w,
            Facing::Left => owner.x - reach,
        };
        Rect::new(x, owner.y + HITBOX_TOP_OFFSET, reach, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::tests::actor_at;

    /// Attacker at 100 facing right, defender close enough for a punch
    fn in_range_pair() -> (Actor, Actor) {
        let attacker = actor_at(100.0);
        let mut defender = actor_at(180.0);
        defender.face = Facing::Left;
        (attacker, defender)
    }

    #[test]
    fn punch_creates_hitbox_in_front() {
        let mut a = actor_at(100.0);
        assert!(CombatSystem::start_attack(&mut a, AttackKind::Punch));
        let attack = a.attack.as_ref().unwrap();
        assert_eq!(attack.hitbox.x, 160.0);
        assert_eq!(attack.hitbox.y, a.y + HITBOX_TOP_OFFSET);
        assert_eq!(attack.hitbox.w, 38.0);
        assert_eq!(attack.dmg, 8.0);
        assert_eq!(a.state, ActorState::Punch);
        assert_eq!(a.combo_lock, 160.0);
    }

    #[test]
    fn left_facing_hitbox_extends_left() {
        let mut a = actor_at(300.0);
        a.face = Facing::Left;
        CombatSystem::start_attack(&mut a, AttackKind::Kick);
        let attack = a.attack.as_ref().unwrap();
        assert_eq!(attack.hitbox.x, 300.0 - 64.0);
        assert_eq!(a.combo_lock, 260.0);
    }

    #[test]
    fn mobile_hitbox_is_scaled() {
        let stats = AttackStats::for_kind(AttackKind::Kick, DeviceClass::MobilePortrait);
        assert!((stats.reach - 51.2).abs() < 1e-4);
        assert!((stats.height - 27.2).abs() < 1e-4);
        assert_eq!(stats.damage, 12.0);
    }

    #[test]
    fn combo_lock_outlasts_ttl() {
        for kind in [AttackKind::Punch, AttackKind::Kick] {
            let stats = AttackStats::for_kind(kind, DeviceClass::Desktop);
            assert!(stats.combo_lock > stats.ttl);
        }
    }

    #[test]
    fn combo_lock_blocks_new_attack() {
        let mut a = actor_at(100.0);
        CombatSystem::start_attack(&mut a, AttackKind::Punch);
        let before = a.attack.clone();
        assert!(!CombatSystem::start_attack(&mut a, AttackKind::Kick));
        assert_eq!(a.attack, before);
        assert_eq!(a.state, ActorState::Punch);
    }

    #[test]
    fn stunned_or_dead_cannot_attack() {
        let mut a = actor_at(100.0);
        a.stun = 10.0;
        assert!(!CombatSystem::start_attack(&mut a, AttackKind::Punch));
        a.stun = 0.0;
        a.dead = true;
        assert!(!CombatSystem::start_attack(&mut a, AttackKind::Punch));
        assert!(a.attack.is_none());
    }

    #[test]
    fn punch_lands_once() {
        let (mut a, mut b) = in_range_pair();
        CombatSystem::start_attack(&mut a, AttackKind::Punch);

        let hit = CombatSystem::apply_attack(&mut a, &mut b, 16.0).unwrap();
        assert_eq!(hit.damage, 8.0);
        assert_eq!(b.hp, 92.0);
        assert_eq!(b.state, ActorState::Hurt);
        assert_eq!(b.stun, HIT_STUN_MS);
        assert!(b.hit_this_frame);
        assert!(!b.dead);
        assert_eq!(b.vx, 6.0);
        assert_eq!(b.vy, -GROUND_POP);

        // Overlap persists, but the same attack never lands twice
        for _ in 0..5 {
            assert!(CombatSystem::apply_attack(&mut a, &mut b, 16.0).is_none());
        }
        assert_eq!(b.hp, 92.0);
    }

    #[test]
    fn airborne_defender_gets_extra_pop() {
        let (mut a, mut b) = in_range_pair();
        b.on_ground = false;
        b.vy = 3.0;
        CombatSystem::start_attack(&mut a, AttackKind::Punch);
        CombatSystem::apply_attack(&mut a, &mut b, 16.0);
        assert_eq!(b.vy, 1.0);
    }

    #[test]
    fn attack_expires_and_reverts_state() {
        let mut a = actor_at(100.0);
        let mut far = actor_at(900.0);
        CombatSystem::start_attack(&mut a, AttackKind::Punch);
        assert!(CombatSystem::apply_attack(&mut a, &mut far, 100.0).is_none());
        assert!(a.attack.is_some());
        assert!(CombatSystem::apply_attack(&mut a, &mut far, 20.0).is_none());
        assert!(a.attack.is_none());
        assert_eq!(a.state, ActorState::Idle);

        a.combo_lock = 0.0;
        a.on_ground = false;
        CombatSystem::start_attack(&mut a, AttackKind::Kick);
        CombatSystem::apply_attack(&mut a, &mut far, 500.0);
        assert_eq!(a.state, ActorState::Jump);
    }

    #[test]
    fn hitbox_tracks_owner() {
        let mut a = actor_at(100.0);
        let mut far = actor_at(900.0);
        CombatSystem::start_attack(&mut a, AttackKind::Kick);
        a.x = 130.0;
        CombatSystem::apply_attack(&mut a, &mut far, 16.0);
        assert_eq!(a.attack.as_ref().unwrap().hitbox.x, 190.0);
    }

    #[test]
    fn lethal_hit_latches_death() {
        let (mut a, mut b) = in_range_pair();
        b.hp = 5.0;
        CombatSystem::start_attack(&mut a, AttackKind::Kick);
        let hit = CombatSystem::apply_attack(&mut a, &mut b, 16.0).unwrap();
        assert!(hit.knocked_out);
        assert_eq!(b.hp, 0.0);
        assert!(b.dead);
        assert_eq!(b.state, ActorState::Ko);
    }

    #[test]
    fn dead_defender_is_not_hit_again() {
        let (mut a, mut b) = in_range_pair();
        b.hp = 0.0;
        b.dead = true;
        b.state = ActorState::Ko;
        CombatSystem::start_attack(&mut a, AttackKind::Punch);
        assert!(CombatSystem::apply_attack(&mut a, &mut b, 16.0).is_none());
        assert_eq!(b.state, ActorState::Ko);
        assert!(!b.hit_this_frame);
    }

    #[test]
    fn dead_attacker_swing_is_discarded() {
        let (mut a, mut b) = in_range_pair();
        CombatSystem::start_attack(&mut a, AttackKind::Punch);
        a.hp = 0.0;
        a.dead = true;
        a.state = ActorState::Ko;
        assert!(CombatSystem::apply_attack(&mut a, &mut b, 16.0).is_none());
        assert!(a.attack.is_none());
        assert_eq!(a.state, ActorState::Ko);
        assert_eq!(b.hp, 100.0);
    }

    #[test]
    fn apply_damage_floors_at_zero() {
        assert_eq!(CombatSystem::apply_damage(5.0, 12.0), (0.0, true));
        assert_eq!(CombatSystem::apply_damage(50.0, 8.0), (42.0, false));
    }
}
