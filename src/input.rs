use crate::state::State;
use std::path::Path;
use std::time::Instant;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta},
};

/// Button that both clicks cells and drags the view
pub const PAN_BUTTON: MouseButton = MouseButton::Left;
/// Pixels per wheel line, so line and pixel deltas land on the same scale
const LINE_HEIGHT_PX: f64 = 100.0;

pub fn handle_zoom(state: &mut State, delta: MouseScrollDelta) {
    // winit reports scrolling up as positive; the session expects the opposite
    let delta_px = match delta {
        MouseScrollDelta::LineDelta(_, y) => -(y as f64) * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y,
    };
    if delta_px != 0.0 {
        state.session.wheel(delta_px, Instant::now());
        log::debug!("Zoom: {:.2}", state.session.viewport().zoom());
    }
}

pub fn handle_mouse_input(state: &mut State, button: MouseButton, element_state: ElementState) {
    if button != PAN_BUTTON {
        return;
    }
    match element_state {
        ElementState::Pressed => {
            state.is_pan_pressed = true;
            if let Some(pos) = state.cursor_pos {
                state.session.pointer_down(pos.x, pos.y, Instant::now());
            }
        }
        ElementState::Released => {
            state.is_pan_pressed = false;
            state.session.pointer_up();
        }
    }
}

pub fn handle_cursor_move(state: &mut State, position: PhysicalPosition<f64>) {
    state.cursor_pos = Some(position);
    state.session.pointer_move(position.x, position.y, state.is_pan_pressed);
}

pub fn handle_cursor_left(state: &mut State) {
    state.cursor_pos = None;
    // Keep the button state, a drag may continue when the cursor comes back
}

pub fn handle_dropped_file(state: &mut State, path: &Path) {
    state.file_hovered = false;
    state.pattern_path = path.display().to_string();
    state.load_pattern_file(path);
}
