use arena_duel::game::actor::{Actor, ActorState, AttackKind, Facing, MAX_HP};
use arena_duel::game::combat::CombatSystem;
use arena_duel::game::{
    AiState, DeviceClass, FrameEvent, FrameResult, InputSource, MatchSetup, RoundOutcome,
    RoundPhase, RoundSession, ScriptedRandom,
};
use proptest::prelude::*;

const BOT: usize = 0;
const HUMAN: usize = 1;

fn session_with(setup: MatchSetup) -> RoundSession<ScriptedRandom> {
    let mut session = RoundSession::new(setup, ScriptedRandom::constant(0.5));
    session.start(0.0);
    session
}

/// Bot at 120, keyboard fighter close enough on its right for a punch to land
fn close_quarters() -> RoundSession<ScriptedRandom> {
    let mut session = session_with(MatchSetup::default());
    session.actors_mut()[HUMAN].x = 200.0;
    session
}

fn hits(result: &FrameResult) -> usize {
    result
        .report()
        .map(|r| {
            r.events
                .iter()
                .filter(|e| matches!(e, FrameEvent::Hit { .. }))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn single_punch_scenario() {
    let mut session = close_quarters();
    assert_eq!(session.seconds_left(), 99);

    session.press(InputSource::Keyboard, "/");
    let result = session.tick(16.0);

    let report = result.report().unwrap();
    assert_eq!(report.hp, [92.0, 100.0]);
    assert_eq!(
        report.events,
        vec![FrameEvent::Hit {
            attacker: HUMAN,
            defender: BOT,
            kind: AttackKind::Punch,
            damage: 8.0,
            defender_hp: 92.0,
        }]
    );

    let bot = session.actor(BOT);
    assert_eq!(bot.state, ActorState::Hurt);
    assert!(bot.stun > 0.0);
    assert!(!bot.dead);
    assert!(bot.hit_this_frame);
    assert_eq!(session.actor(HUMAN).hp, 100.0);
}

#[test]
fn held_punch_lands_once_per_attack() {
    let mut session = close_quarters();
    session.press(InputSource::Keyboard, "/");

    let mut total_hits = 0;
    // Within the punch's combo lock no second attack can start
    for _ in 0..6 {
        total_hits += hits(&session.tick(16.0));
    }
    assert_eq!(total_hits, 1);
    assert_eq!(session.actor(BOT).hp, 92.0);
}

#[test]
fn touch_buttons_count_as_keys() {
    let mut session = close_quarters();
    session.press(InputSource::Touch, ".");
    session.tick(16.0);
    assert_eq!(session.actor(BOT).hp, 88.0);
}

#[test]
fn simultaneous_trade_hits_both() {
    let mut session = close_quarters();
    assert!(CombatSystem::start_attack(
        &mut session.actors_mut()[BOT],
        AttackKind::Punch
    ));
    session.press(InputSource::Keyboard, "/");

    let result = session.tick(16.0);
    assert_eq!(result.report().unwrap().hp, [92.0, 92.0]);
    assert_eq!(hits(&result), 2);
}

#[test]
fn time_out_awards_higher_hp() {
    let mut session = session_with(MatchSetup {
        round_seconds: 1,
        ..MatchSetup::default()
    });
    session.actors_mut()[BOT].hp = 40.0;
    session.actors_mut()[HUMAN].hp = 70.0;

    let result = session.tick(1000.0);
    assert_eq!(
        result.outcome(),
        Some(&RoundOutcome::Winner {
            slot: HUMAN,
            name: "Maveli".to_string()
        })
    );
    assert_eq!(result.outcome().unwrap().label(), "Maveli Wins!");
}

#[test]
fn time_out_with_equal_hp_is_a_draw() {
    let mut session = session_with(MatchSetup {
        round_seconds: 1,
        ..MatchSetup::default()
    });
    session.actors_mut()[BOT].hp = 50.0;
    session.actors_mut()[HUMAN].hp = 50.0;

    let result = session.tick(1000.0);
    assert_eq!(result.outcome(), Some(&RoundOutcome::Draw));
    assert_eq!(result.outcome().unwrap().label(), "Draw!");
}

#[test]
fn knockout_ends_round_before_time() {
    let mut session = close_quarters();
    session.actors_mut()[BOT].hp = 5.0;
    session.press(InputSource::Keyboard, ".");

    let result = session.tick(16.0);
    let report = result.report().unwrap();
    assert!(report.events.contains(&FrameEvent::Knockout { slot: BOT }));
    assert_eq!(report.seconds_left, 99);
    assert_eq!(result.outcome().unwrap().label(), "Maveli Wins!");

    let bot = session.actor(BOT);
    assert!(bot.dead);
    assert_eq!(bot.hp, 0.0);
    assert_eq!(bot.state, ActorState::Ko);

    // Terminal: no further frames are simulated
    assert_eq!(session.phase(), RoundPhase::Ended);
    assert_eq!(session.tick(16.0), FrameResult::Halted);
    assert_eq!(session.actor(BOT).state, ActorState::Ko);
}

#[test]
fn reset_after_knockout_revives() {
    let mut session = close_quarters();
    session.actors_mut()[BOT].hp = 5.0;
    session.press(InputSource::Keyboard, ".");
    session.tick(16.0);
    assert_eq!(session.phase(), RoundPhase::Ended);

    session.restart(5000.0);
    assert_eq!(session.phase(), RoundPhase::Running);
    let bot = session.actor(BOT);
    assert!(!bot.dead);
    assert_eq!(bot.hp, MAX_HP);
    assert_eq!(bot.state, ActorState::Idle);
    assert_eq!(bot.ai.state, AiState::Idle);
    assert!(matches!(session.frame(5016.0), FrameResult::Running(_)));
}

#[test]
fn bot_chases_distant_opponent() {
    let mut session = RoundSession::seeded(
        MatchSetup {
            arena_width: 2000.0,
            ..MatchSetup::default()
        },
        7,
    );
    session.start(0.0);

    let gap = |s: &RoundSession| (s.actor(BOT).x - s.actor(HUMAN).x).abs();
    assert!(gap(&session) > 1200.0);

    let mut chased_frames = 0;
    let mut first_chase = None;
    for frame in 0..90 {
        let was_chasing = session.actor(BOT).ai.state == AiState::Chase;
        let before = gap(&session);
        session.tick(16.0);
        if session.actor(BOT).ai.state == AiState::Chase && first_chase.is_none() {
            first_chase = Some(frame);
        }
        if was_chasing {
            assert!(gap(&session) < before, "bot fell back while chasing");
            chased_frames += 1;
        }
    }

    // The idle window is at most 500 ms
    assert!(first_chase.unwrap() <= 32);
    assert!(chased_frames > 0);
}

#[test]
fn autoplay_round_always_terminates() {
    let mut session = RoundSession::seeded(
        MatchSetup {
            autoplay: true,
            round_seconds: 20,
            ..MatchSetup::default()
        },
        1234,
    );
    session.start(0.0);

    let mut outcome = None;
    for _ in 0..(21 * 60) {
        let result = session.tick(1000.0 / 60.0);
        for actor in session.actors() {
            assert!(actor.hp >= 0.0 && actor.hp <= actor.max_hp);
            assert!(actor.y + actor.h <= session.arena().floor_y);
        }
        if let Some(o) = result.outcome() {
            outcome = Some(o.clone());
            break;
        }
    }
    assert!(outcome.is_some());
    assert_eq!(session.phase(), RoundPhase::Ended);
}

#[test]
fn mobile_profile_scales_fighters() {
    let session = session_with(MatchSetup {
        device: DeviceClass::MobilePortrait,
        arena_width: 400.0,
        canvas_height: 700.0,
        ..MatchSetup::default()
    });
    let bot = session.actor(BOT);
    assert_eq!((bot.w, bot.h), (50.0, 110.0));
    assert_eq!(bot.x, 60.0);
    assert_eq!(session.actor(HUMAN).x, 300.0);
    assert_eq!(session.arena().floor_y, 640.0);
}

fn fighter(x: f32) -> Actor {
    let [_, mut actor] = MatchSetup::default().build_actors();
    actor.x = x;
    actor.face = Facing::Right;
    actor
}

proptest! {
    #[test]
    fn hp_stays_in_bounds(
        start_hp in 0.0f32..=100.0,
        swings in prop::collection::vec((any::<bool>(), 1.0f32..200.0), 1..40),
    ) {
        let mut attacker = fighter(100.0);
        let mut defender = fighter(170.0);
        defender.hp = start_hp;
        defender.dead = start_hp <= 0.0;

        for (punch, dt) in swings {
            let kind = if punch { AttackKind::Punch } else { AttackKind::Kick };
            attacker.combo_lock = 0.0;
            attacker.attack = None;
            CombatSystem::start_attack(&mut attacker, kind);
            CombatSystem::apply_attack(&mut attacker, &mut defender, dt);
            prop_assert!(defender.hp >= 0.0);
            prop_assert!(defender.hp <= defender.max_hp);
            prop_assert_eq!(defender.dead, defender.hp <= 0.0);
        }
    }
}
