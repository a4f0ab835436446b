//! Read-only views of fighter state for the presentation layer

use serde::Serialize;

use crate::util::geometry::Rect;

use super::actor::{Actor, ActorState, AttackKind};

/// What a renderer may read about a fighter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// +1 facing right, -1 facing left
    pub face: i8,
    pub state: ActorState,
    pub anim_time: f32,
    pub attack: Option<AttackSnapshot>,
    pub hp: f32,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackSnapshot {
    pub kind: AttackKind,
    pub hitbox: Rect,
}

impl ActorSnapshot {
    pub fn capture(actor: &Actor) -> Self {
        Self {
            name: actor.name.clone(),
            x: actor.x,
            y: actor.y,
            w: actor.w,
            h: actor.h,
            face: actor.face.sign() as i8,
            state: actor.state,
            anim_time: actor.anim_time,
            attack: actor.attack.as_ref().map(|a| AttackSnapshot {
                kind: a.kind,
                hitbox: a.hitbox,
            }),
            hp: actor.hp,
            is_bot: actor.is_bot,
        }
    }
}

/// Full frame view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub seconds_left: u32,
    pub actors: [ActorSnapshot; 2],
}

/// Emits a snapshot every `interval` frames
pub struct SnapshotBuilder {
    frames_since_snapshot: u32,
    interval: u32,
}

impl SnapshotBuilder {
    pub fn new(interval: u32) -> Self {
        let interval = interval.max(1);
        Self {
            // First frame always produces a snapshot
            frames_since_snapshot: interval - 1,
            interval,
        }
    }

    /// Check if it's time to emit a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force a snapshot on the next check (round end)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.interval;
    }

    pub fn build(&self, frame: u64, seconds_left: u32, actors: &[Actor; 2]) -> FrameSnapshot {
        FrameSnapshot {
            frame,
            seconds_left,
            actors: [
                ActorSnapshot::capture(&actors[0]),
                ActorSnapshot::capture(&actors[1]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::tests::actor_at;
    use crate::game::combat::CombatSystem;

    #[test]
    fn capture_reads_presentation_fields() {
        let mut a = actor_at(100.0);
        CombatSystem::start_attack(&mut a, AttackKind::Kick);
        let snap = ActorSnapshot::capture(&a);
        assert_eq!(snap.face, 1);
        assert_eq!(snap.state, ActorState::Kick);
        assert_eq!(snap.attack.as_ref().map(|s| s.kind), Some(AttackKind::Kick));
        assert_eq!(snap.hp, 100.0);
        assert!(!snap.is_bot);
    }

    #[test]
    fn serializes_state_as_lowercase() {
        let snap = ActorSnapshot::capture(&actor_at(100.0));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["attack"], serde_json::Value::Null);
    }

    #[test]
    fn builder_emits_on_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..7).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![true, false, false, true, false, false, true]);

        builder.force_next();
        assert!(builder.should_send());
    }
}
