//! Held-input tracking and the keyboard/touch input mapper

use std::collections::HashSet;

use super::actor::{Actor, AttackKind};
use super::combat::CombatSystem;

/// Input source an identifier was pressed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    /// Virtual on-screen buttons
    Touch,
}

/// Identifiers currently held down, per source. Both sources count the same.
#[derive(Debug, Clone, Default)]
pub struct HeldInputs {
    keys: HashSet<String>,
    buttons: HashSet<String>,
}

impl HeldInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, source: InputSource, id: &str) {
        self.set_mut(source).insert(id.to_string());
    }

    pub fn release(&mut self, source: InputSource, id: &str) {
        self.set_mut(source).remove(id);
    }

    /// Drop everything held (focus loss, round reset)
    pub fn clear(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }

    pub fn is_held(&self, id: &str) -> bool {
        self.keys.contains(id) || self.buttons.contains(id)
    }

    fn set_mut(&mut self, source: InputSource) -> &mut HashSet<String> {
        match source {
            InputSource::Keyboard => &mut self.keys,
            InputSource::Touch => &mut self.buttons,
        }
    }
}

/// Maps held identifiers onto a human-controlled actor's intent for one frame
pub struct InputSystem;

impl InputSystem {
    pub fn apply(p: &mut Actor, held: &HeldInputs) {
        if p.is_inert() || p.is_bot {
            return;
        }

        let moving = if held.is_held(&p.controls.left) {
            p.vx = -p.speed;
            true
        } else if held.is_held(&p.controls.right) {
            p.vx = p.speed;
            true
        } else {
            p.vx = 0.0;
            false
        };

        if held.is_held(&p.controls.up) {
            p.try_jump();
        }

        // Both may be held; the first one started sets the combo lock and blocks the second
        if held.is_held(&p.controls.punch) {
            CombatSystem::start_attack(p, AttackKind::Punch);
        }
        if held.is_held(&p.controls.kick) {
            CombatSystem::start_attack(p, AttackKind::Kick);
        }

        p.settle_motion_state(moving);
    }
}
