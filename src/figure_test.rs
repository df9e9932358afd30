use crate::figure::*;
use crate::hangman::{evaluate, GameState};

/// Derives the state the way the game does before asking for a step.
fn step_at(miss_count: u32, max_misses: u32) -> u32 {
    let state = evaluate(1, miss_count, 20, max_misses);
    draw_step(state, miss_count, max_misses)
}

#[test]
fn identity_table_for_ten_misses() {
    for miss in 0..=9 {
        assert_eq!(step_at(miss, 10), miss);
    }
}

#[test]
fn published_tables() {
    // maxMisses = 7
    for (miss, step) in [(1, 2), (2, 4), (3, 5), (4, 6), (5, 7), (6, 8)] {
        assert_eq!(step_at(miss, 7), step);
    }
    // maxMisses = 5
    for (miss, step) in [(1, 2), (2, 4), (3, 6), (4, 8)] {
        assert_eq!(step_at(miss, 5), step);
    }
    // maxMisses = 3
    for (miss, step) in [(1, 4), (2, 8)] {
        assert_eq!(step_at(miss, 3), step);
    }
}

#[test]
fn terminal_states_draw_the_full_figure() {
    assert_eq!(draw_step(GameState::Won, 0, 10), 10);
    assert_eq!(draw_step(GameState::Lost, 10, 10), 10);
    assert_eq!(draw_step(GameState::Lost, 3, 3), 10);
    assert_eq!(draw_step(GameState::Won, 4, 7), 10);
}

#[test]
fn unlisted_difficulties_interpolate() {
    // round(miss / max * 10), clamped to 10
    assert_eq!(step_at(0, 4), 0);
    assert_eq!(step_at(1, 4), 3);
    assert_eq!(step_at(2, 4), 5);
    assert_eq!(step_at(3, 4), 8);
    assert_eq!(step_at(1, 20), 1);
    assert_eq!(step_at(19, 20), 10);
    assert_eq!(step_at(1, 2), 5);
}

#[test]
fn loss_boundary_with_full_budget() {
    // With maxMisses = 10 the 10th miss is Lost and the figure is complete.
    let state = evaluate(3, 10, 20, 10);
    assert_eq!(state, GameState::Lost);
    assert_eq!(draw_step(state, 10, 10), 10);
}

#[test]
fn body_parts_unlock_cumulatively() {
    let order = [
        Part::Head,
        Part::Body,
        Part::LeftArm,
        Part::RightArm,
        Part::LeftHand,
        Part::RightHand,
        Part::LeftLeg,
        Part::RightLeg,
        Part::LeftFoot,
        Part::RightFoot,
    ];

    let mut shown = Vec::new();
    for miss in 0..=9u32 {
        let state = evaluate(1, miss, 20, 10);
        let visible = parts(state, miss, 10);

        // Exactly the first `miss` parts of the order are visible, and the
        // nose rides along with the head.
        for (i, part) in order.iter().enumerate() {
            assert_eq!(visible.contains(part), i < miss as usize, "miss {}", miss);
        }
        assert_eq!(visible.contains(&Part::Nose), miss >= 1);

        // Nothing shown at a lower step ever disappears.
        for part in &shown {
            assert!(visible.contains(part));
        }
        shown = visible
            .into_iter()
            .filter(|p| order.contains(p) || *p == Part::Nose)
            .collect();
    }
}

#[test]
fn frame_and_rope_rules() {
    let progressing = parts(GameState::Progressing, 1, 10);
    assert!(progressing.contains(&Part::Frame));
    assert!(progressing.contains(&Part::Rope));

    // The rope comes down on a win.
    let won = parts(GameState::Won, 2, 10);
    assert!(won.contains(&Part::Frame));
    assert!(!won.contains(&Part::Rope));

    let lost = parts(GameState::Lost, 10, 10);
    assert!(lost.contains(&Part::Rope));
}

#[test]
fn face_follows_state() {
    let pending = parts(GameState::Pending, 0, 10);
    assert!(!pending.iter().any(|p| matches!(p, Part::Mouth(_))));

    let progressing = parts(GameState::Progressing, 1, 10);
    assert!(progressing.contains(&Part::LeftEye(Face::Normal)));
    assert!(progressing.contains(&Part::RightEye(Face::Normal)));
    assert!(progressing.contains(&Part::Mouth(Face::Normal)));

    let imperiled = parts(GameState::Imperiled, 6, 10);
    assert!(imperiled.contains(&Part::Mouth(Face::Worried)));

    let won = parts(GameState::Won, 0, 10);
    assert!(won.contains(&Part::Mouth(Face::Happy)));

    let lost = parts(GameState::Lost, 10, 10);
    assert!(lost.contains(&Part::Mouth(Face::Dead)));
}

#[test]
fn full_figure_has_every_body_part() {
    let lost = parts(GameState::Lost, 3, 3);
    for part in [
        Part::Head,
        Part::Nose,
        Part::Body,
        Part::LeftArm,
        Part::RightArm,
        Part::LeftHand,
        Part::RightHand,
        Part::LeftLeg,
        Part::RightLeg,
        Part::LeftFoot,
        Part::RightFoot,
    ] {
        assert!(lost.contains(&part));
    }
}
