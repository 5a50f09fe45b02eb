//! Integration tests for the liveness path
//!
//! Tests the full path: landmarks → geometry → ChallengeEngine → Verdict

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use veritas::config::{LivenessSettings, Settings};
use veritas::core::{geometry, risk_channel, ChallengeEngine, LivenessMonitor};
use veritas::types::{
    Challenge, ColorCategory, GeometrySignals, KeyPoints, LandmarkSet, Point, SessionPhase,
    CHALLENGE_CATALOG,
};
use veritas::{ADVANCE_COOLDOWN_MS, DEBOUNCE_FRAMES};

const FRAME: Duration = Duration::from_millis(33);

fn face(nose_x: f64, lid_gap: f64) -> LandmarkSet {
    LandmarkSet::from_key_points(KeyPoints {
        nose: Point::new(nose_x, 0.52),
        left_ear: Point::new(0.30, 0.48),
        right_ear: Point::new(0.70, 0.48),
        right_upper_lid: Point::new(0.56, 0.40),
        right_lower_lid: Point::new(0.56, 0.40 + lid_gap),
        left_upper_lid: Point::new(0.44, 0.40),
        left_lower_lid: Point::new(0.44, 0.40 + lid_gap),
    })
}

fn frontal() -> LandmarkSet {
    face(0.50, 0.03)
}

fn blinking() -> LandmarkSet {
    face(0.50, 0.004)
}

fn looking_left() -> LandmarkSet {
    face(0.33, 0.03)
}

fn looking_right() -> LandmarkSet {
    face(0.67, 0.03)
}

fn quiet_settings() -> Settings {
    let mut s = Settings::default();
    s.liveness.jitter = false;
    s
}

/// Subject completes all three challenges with pauses between them
#[test]
fn test_full_challenge_sequence_verifies() {
    let start = Instant::now();
    let (_writer, reader) = risk_channel();
    let mut monitor = LivenessMonitor::new_at(&quiet_settings(), reader, start);
    let mut t = start + Duration::from_secs(2);

    let v = monitor.process_at(Some(&frontal()), t);
    assert_eq!(v.status_text, "ACTION: BLINK EYES");

    for (gesture, next) in [
        (blinking(), "ACTION: TURN LEFT"),
        (looking_left(), "ACTION: TURN RIGHT"),
        (looking_right(), "IDENTITY CONFIRMED [SAFE]"),
    ] {
        for _ in 0..=DEBOUNCE_FRAMES {
            monitor.process_at(Some(&gesture), t);
            t += FRAME;
        }
        let v = monitor.process_at(Some(&frontal()), t);
        assert_eq!(v.status_text, next);
        t += Duration::from_secs(2);
    }

    assert_eq!(monitor.phase(), SessionPhase::Verified);
    let v = monitor.process_at(Some(&frontal()), t);
    assert_eq!(v.color, ColorCategory::Safe);
    assert!(v.liveness_percent >= 99);
    assert!(v.human_verified);
}

/// No face between gestures does not reset anything
#[test]
fn test_face_dropout_is_not_failure() {
    let start = Instant::now();
    let (_writer, reader) = risk_channel();
    let mut monitor = LivenessMonitor::new_at(&quiet_settings(), reader, start);
    let t = start + Duration::from_secs(2);

    for i in 0..4 {
        monitor.process_at(Some(&blinking()), t + FRAME * i);
    }
    let v = monitor.process_at(None, t + FRAME * 4);
    assert_eq!(v.color, ColorCategory::Neutral);
    assert_eq!(monitor.engine().session().consecutive_pass_frames, 4);

    for i in 5..7 {
        monitor.process_at(Some(&blinking()), t + FRAME * i);
    }
    assert_eq!(monitor.engine().active_challenge(), Some(Challenge::TurnLeft));
}

/// Zero ear span never faults and reads as facing forward
#[test]
fn test_degenerate_face_is_neutral() {
    for x in [0.0, 0.25, 0.5, 0.99] {
        let set = LandmarkSet::from_key_points(KeyPoints {
            nose: Point::new(x, 0.5),
            left_ear: Point::new(0.4, 0.5),
            right_ear: Point::new(0.4, 0.5),
            right_upper_lid: Point::new(0.4, 0.5),
            right_lower_lid: Point::new(0.4, 0.5),
            left_upper_lid: Point::new(0.4, 0.5),
            left_lower_lid: Point::new(0.4, 0.5),
        });
        let signals = geometry::extract(&set);
        assert_eq!(signals.facing_ratio, 0.5);
    }
}

/// Index is non-decreasing and advances at most once per cooldown window
#[test]
fn test_random_frames_respect_cooldown() {
    let mut rng = StdRng::seed_from_u64(7);
    let cooldown = Duration::from_millis(ADVANCE_COOLDOWN_MS);

    for _ in 0..50 {
        let start = Instant::now();
        let mut engine = ChallengeEngine::new_at(LivenessSettings::default(), start);
        let mut t = start;
        let mut last_index = 0;
        let mut last_advance = start;

        for _ in 0..2_000 {
            t += Duration::from_millis(rng.gen_range(1..60));
            let signals = GeometrySignals::new(rng.gen_range(-0.2..1.2), rng.gen_range(0.0..0.03));
            let out = engine.update_at(&signals, t);

            assert!(out.index >= last_index);
            assert!(out.index <= last_index + 1);
            if out.index > last_index {
                assert!(t.duration_since(last_advance) > cooldown);
                last_advance = t;
            }
            last_index = out.index;
        }
        assert!(last_index <= CHALLENGE_CATALOG.len());
    }
}

/// A single good frame among bad ones never advances
#[test]
fn test_isolated_pass_never_advances() {
    let start = Instant::now();
    let mut engine = ChallengeEngine::new_at(LivenessSettings::default(), start);
    let mut t = start + Duration::from_secs(10);
    let blink = geometry::extract(&blinking());
    let open = geometry::extract(&frontal());

    for _ in 0..100 {
        engine.update_at(&blink, t);
        t += FRAME;
        for _ in 0..DEBOUNCE_FRAMES {
            engine.update_at(&open, t);
            t += FRAME;
        }
    }
    assert_eq!(engine.current_index(), 0);
}

/// Once verified, no input sequence un-verifies
#[test]
fn test_verified_survives_any_input() {
    let start = Instant::now();
    let mut engine = ChallengeEngine::new_at(LivenessSettings::default(), start);
    let mut t = start;
    for gesture in [blinking(), looking_left(), looking_right()] {
        t += Duration::from_secs(2);
        let signals = geometry::extract(&gesture);
        for _ in 0..=DEBOUNCE_FRAMES {
            engine.update_at(&signals, t);
            t += FRAME;
        }
    }
    assert!(engine.is_verified());

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1_000 {
        t += FRAME;
        let signals = GeometrySignals::new(rng.gen_range(-1.0..2.0), rng.gen_range(0.0..0.1));
        assert!(engine.update_at(&signals, t).is_verified());
    }
}
