/// The mapping from game state to the gallows figure. The figure always has
/// exactly 10 escalation levels no matter how many misses are allowed, so
/// stricter difficulties escalate it faster. This module only decides *what*
/// is visible; turning the part list into output is the renderer's job.
use crate::hangman::GameState;

/// Face selects the figure's expression. Keyed purely on game state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Face {
    Happy,
    Normal,
    Worried,
    Dead,
}

/// Part is one drawable element of the scene.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Part {
    Frame,
    Rope,
    Head,
    Nose,
    Body,
    LeftArm,
    RightArm,
    LeftHand,
    RightHand,
    LeftLeg,
    RightLeg,
    LeftFoot,
    RightFoot,
    LeftEye(Face),
    RightEye(Face),
    Mouth(Face),
}

/// `draw_step` maps the miss count to a 0-10 severity step. Won and lost
/// games always show the full figure. For the standard difficulties the steps
/// follow fixed tables; the final permitted miss lands near step 10 so the
/// figure is almost complete when one miss remains. Any other difficulty
/// interpolates linearly, `round(miss / max * 10)` clamped to 10.
pub fn draw_step(state: GameState, miss_count: u32, max_misses: u32) -> u32 {
    if matches!(state, GameState::Won | GameState::Lost) {
        return 10;
    }

    match (max_misses, miss_count) {
        (10, n) => n,
        (7, 1) => 2,
        (7, 2) => 4,
        (7, 3) => 5,
        (7, 4) => 6,
        (7, 5) => 7,
        (7, 6) => 8,
        (5, 1) => 2,
        (5, 2) => 4,
        (5, 3) => 6,
        (5, 4) => 8,
        (3, 1) => 4,
        (3, 2) => 8,
        (_, 0) => 0,
        (max, n) => (((n as f64 / max.max(1) as f64) * 10.0).round() as u32).min(10),
    }
}

/// `parts` returns everything visible for the given state and counts. The
/// body parts are cumulative in `step`: each step from 1 to 10 unlocks exactly
/// one more part in a fixed order (the head brings the nose with it), so a
/// higher step never hides anything already shown.
pub fn parts(state: GameState, miss_count: u32, max_misses: u32) -> Vec<Part> {
    let step = draw_step(state, miss_count, max_misses);
    let mut parts = vec![Part::Frame];

    // The rope is taken down when the player wins.
    if state != GameState::Won {
        parts.push(Part::Rope);
    }

    let face = match state {
        GameState::Progressing if step > 0 => Some(Face::Normal),
        GameState::Imperiled => Some(Face::Worried),
        GameState::Won => Some(Face::Happy),
        GameState::Lost => Some(Face::Dead),
        _ => None,
    };
    if let Some(face) = face {
        parts.push(Part::LeftEye(face));
        parts.push(Part::RightEye(face));
        parts.push(Part::Mouth(face));
    }

    if step >= 1 {
        parts.push(Part::Head);
        parts.push(Part::Nose);
    }
    if step >= 2 {
        parts.push(Part::Body);
    }
    if step >= 3 {
        parts.push(Part::LeftArm);
    }
    if step >= 4 {
        parts.push(Part::RightArm);
    }
    if step >= 5 {
        parts.push(Part::LeftHand);
    }
    if step >= 6 {
        parts.push(Part::RightHand);
    }
    if step >= 7 {
        parts.push(Part::LeftLeg);
    }
    if step >= 8 {
        parts.push(Part::RightLeg);
    }
    if step >= 9 {
        parts.push(Part::LeftFoot);
    }
    if step >= 10 {
        parts.push(Part::RightFoot);
    }

    parts
}
