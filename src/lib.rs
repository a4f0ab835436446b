//! Arena Duel - frame simulation for a two-fighter arena brawler
//!
//! The crate advances two fighters (one keyboard/touch driven, one AI driven)
//! one frame at a time:
//! - Input mapping and the opponent state machine turn held keys or geometry into intent
//! - Physics integrates gravity, floor, walls and body separation
//! - Combat spawns hitboxes and resolves each one against the defender at most once
//! - The round session sequences those systems and runs the countdown
//!
//! Rendering, assets and menus belong to the host; it reads snapshots and
//! receives per-frame reports.

pub mod config;
pub mod game;
pub mod util;
