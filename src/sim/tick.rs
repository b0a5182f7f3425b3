//! Per-frame simulation step
//!
//! `tick` advances the car, handles checkpoint arrival and track end, and
//! refreshes the camera framing. It is a total, synchronous function: terminal
//! and waiting phases make it a no-op.

use crate::consts::*;
use crate::funcgen::FunctionRecord;

use super::state::{CrashCause, Phase, RaceState};

/// Camera framing as a pure function of the car position.
///
/// The car sits a third of the viewport from the left edge, and the vertical
/// clamp keeps it from being framed behind the fixed-height HUD header.
pub fn camera_for(record: &FunctionRecord, car_x: f64) -> (f64, f64) {
    let car_y = record.evaluate(car_x);
    let camera_x = (car_x - CAMERA_LEAD).max(0.0);
    let camera_y = (car_y - HEADER_CLEARANCE).min(car_y - VIEWPORT_HEIGHT / 2.0);
    (camera_x, camera_y)
}

/// Advance the race by one simulation step.
pub fn tick(state: &mut RaceState) {
    if state.phase != Phase::Driving {
        return;
    }

    state.car_x += state.speed;

    // Checkpoint arrival: snap onto the exact position and ask the question
    if let Some(&checkpoint) = state.checkpoints.get(state.checkpoints_passed) {
        if state.car_x >= checkpoint.x - CHECKPOINT_SNAP {
            state.car_x = checkpoint.x;
            state.speed = 0.0;
            state.phase = Phase::AwaitingAnswer;
            state.message = format!(
                "What is {} at x = {:.0}?",
                checkpoint.kind.label(),
                checkpoint.x
            );
            log::debug!(
                "checkpoint {} reached at x={}",
                state.checkpoints_passed,
                checkpoint.x
            );
            refresh_camera(state);
            return;
        }
    }

    // Track end
    let track_end = state.record.domain.1 - END_MARGIN;
    if state.car_x >= track_end {
        state.car_x = track_end;
        state.speed = 0.0;
        if state.checkpoints_passed == state.checkpoints.len() {
            state.score += COMPLETION_BONUS_PER_LEVEL * state.difficulty.level();
            state.phase = Phase::Finished;
            state.message = format!("Victory! Final score: {}", state.score);
            log::info!("race finished, score {}", state.score);
        } else {
            state.phase = Phase::Crashed;
            state.crash_cause = Some(CrashCause::OutOfTrack);
            state.message = "End of the track! Not every checkpoint was cleared.".to_string();
            log::info!(
                "race over with {}/{} checkpoints",
                state.checkpoints_passed,
                state.checkpoints.len()
            );
        }
    }

    refresh_camera(state);
}

fn refresh_camera(state: &mut RaceState) {
    let (camera_x, camera_y) = camera_for(&state.record, state.car_x);
    state.camera_x = camera_x;
    state.camera_y = camera_y;
}
