// Desktop host for the simulator: window, GPU drawing and the control panel
mod input;
mod render;
mod state;

use crate::state::State;
use canvas_life::viewport::{MAX_ZOOM, MIN_ZOOM};
use canvas_life::{LifeConfig, Pattern};

use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};
use std::sync::Arc;
use std::time::Instant;

const MAX_RATE: i64 = 60;

fn side_panel(ctx: &egui::Context, state: &mut State) {
    // Define a frame with a semi-transparent background
    let panel_frame = egui::Frame {
        fill: egui::Color32::from_rgba_unmultiplied(25, 25, 25, 200),
        ..egui::Frame::side_top_panel(&ctx.style())
    };

    egui::SidePanel::left("side_panel")
        .frame(panel_frame)
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Game of Life");
            ui.separator();

            ui.horizontal(|ui| {
                let label = if state.session.playback().is_running() { "Stop" } else { "Start" };
                if ui.button(label).clicked() {
                    state.session.toggle_running(Instant::now());
                }
                if ui.button("Reset").clicked() {
                    state.session.reset();
                }
            });

            let mut rate = state.session.playback().rate() as i64;
            if ui.add(egui::Slider::new(&mut rate, 1..=MAX_RATE).text("Generations/s")).changed() {
                if let Err(err) = state.session.set_rate(rate) {
                    state.status = Some(err.to_string());
                }
            }

            let mut zoom = state.session.viewport().zoom();
            if ui
                .add(egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM).logarithmic(true).text("Zoom"))
                .changed()
            {
                state.session.set_zoom(zoom);
            }

            let mut grid_lines = state.session.show_grid_lines();
            if ui.checkbox(&mut grid_lines, "Grid lines").changed() {
                state.session.set_grid_lines(grid_lines);
            }
            ui.separator();

            ui.label("Insert at view centre:");
            for pattern in Pattern::ALL {
                if ui.button(pattern.name()).clicked() {
                    let (cx, cy) = state.session.viewport().screen_to_cell(
                        state.size.width as f64 / 2.0,
                        state.size.height as f64 / 2.0,
                    );
                    state.session.stamp(pattern, cx, cy);
                }
            }
            ui.separator();

            ui.label("Pattern file:");
            ui.text_edit_singleline(&mut state.pattern_path);
            if ui.button("Load").clicked() && !state.pattern_path.trim().is_empty() {
                let path = std::path::PathBuf::from(state.pattern_path.trim());
                state.load_pattern_file(&path);
            }
            let hint = if state.file_hovered { "Release to load" } else { "or drop a file on the window" };
            ui.weak(hint);
            ui.separator();

            let grid = state.session.grid();
            let offset = state.session.viewport().offset();
            ui.label(format!("Generation: {}", state.session.playback().generation()));
            ui.label(format!("Live Cells: {}", grid.live_count()));
            ui.label(format!("Grid: {}x{}", grid.width(), grid.height()));
            ui.label(format!("Zoom: {:.2}", state.session.viewport().zoom()));
            ui.label(format!("Offset: [{:.1}, {:.1}]", offset[0], offset[1]));
            if let Some(status) = &state.status {
                ui.separator();
                ui.label(status.as_str());
            }
        });
}

fn redraw(state: &mut State) {
    let output_frame = match state.render() {
        Ok(frame) => frame,
        Err(err) => {
            // Lost was handled by reconfiguring inside render(); everything else is transient
            log::warn!("Skipping frame due to surface {:?}", err);
            state.window.request_redraw();
            return;
        }
    };
    let output_view = output_frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Begin egui frame
    let ctx = state.egui_ctx.clone();
    let raw_input = state.egui_winit_state.take_egui_input(&state.window);
    ctx.begin_frame(raw_input);

    // Use an Area for the menu button, positioned top-right so it stays clear of the panel
    egui::Area::new(egui::Id::new("menu_button_area"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-5.0, 5.0))
        .show(&ctx, |ui| {
            if ui.button("☰").clicked() {
                state.menu_open = !state.menu_open;
            }
        });
    if state.menu_open {
        side_panel(&ctx, state);
    }

    // End egui frame
    let full_output = ctx.end_frame();
    let paint_jobs = ctx.tessellate(full_output.shapes, state.window.scale_factor() as f32);
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [state.config.width, state.config.height],
        pixels_per_point: state.window.scale_factor() as f32,
    };

    // Upload egui data to GPU
    let mut encoder = state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui Encoder"),
    });
    for (id, image_delta) in &full_output.textures_delta.set {
        state.egui_renderer.update_texture(&state.device, &state.queue, *id, image_delta);
    }
    let _tdelta = state.egui_renderer.update_buffers(
        &state.device,
        &state.queue,
        &mut encoder,
        &paint_jobs,
        &screen_descriptor,
    );
    state.egui_winit_state.handle_platform_output(&state.window, full_output.platform_output);

    // Render egui on top of the grid
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Load the existing grid render
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        state.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
    }

    // Free texture delta
    for id in &full_output.textures_delta.free {
        state.egui_renderer.free_texture(id);
    }

    state.queue.submit(Some(encoder.finish()));
    output_frame.present();
}

async fn run(event_loop: EventLoop<()>, window: Arc<Window>, config: LifeConfig) {
    let mut state = match State::new(window, &config).await {
        Ok(state) => state,
        Err(err) => {
            log::error!("Failed to start: {err}");
            return;
        }
    };

    let result = event_loop.run(move |event, window_target| {
        match event {
            Event::WindowEvent { window_id, ref event }
                if window_id == state.window.id() =>
            {
                // Pass window-specific events to egui_winit FIRST
                let response = state.egui_winit_state.on_window_event(&state.window, event);

                if response.repaint {
                    state.window.request_redraw();
                }

                // If egui consumed the event, skip further processing for this event
                // unless it was a Resize or a button release, which must always reach the game.
                let consumed_by_egui = response.consumed
                    && !matches!(
                        event,
                        WindowEvent::Resized(_)
                            | WindowEvent::MouseInput { state: ElementState::Released, .. }
                    );
                if consumed_by_egui {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(*new_size);
                    }
                    WindowEvent::MouseInput { state: element_state, button, .. } => {
                        input::handle_mouse_input(&mut state, *button, *element_state);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input::handle_cursor_move(&mut state, *position);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input::handle_cursor_left(&mut state);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        input::handle_zoom(&mut state, *delta);
                    }
                    WindowEvent::HoveredFile(_) => {
                        state.file_hovered = true;
                        state.window.request_redraw();
                    }
                    WindowEvent::HoveredFileCancelled => {
                        state.file_hovered = false;
                        state.window.request_redraw();
                    }
                    WindowEvent::DroppedFile(path) => {
                        input::handle_dropped_file(&mut state, path);
                    }
                    WindowEvent::RedrawRequested => {
                        redraw(&mut state);
                    }
                    _ => (),
                }
            }
            Event::AboutToWait => {
                // Timers: pending click, playback; the session requests redraws itself
                state.session.advance(Instant::now());
                let flow = match state.session.next_deadline() {
                    Some(deadline) => ControlFlow::WaitUntil(deadline),
                    None => ControlFlow::Wait,
                };
                window_target.set_control_flow(flow);
            }
            _ => ()
        }
    });

    if let Err(err) = result {
        log::error!("Event loop terminated: {err}");
    }
}

fn main() {
    env_logger::init();

    let config = match LifeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(2);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    let initial_size = winit::dpi::LogicalSize::new(1280.0, 800.0);

    let window = Arc::new(winit::window::WindowBuilder::new()
        .with_title("Game of Life")
        .with_inner_size(initial_size)
        .build(&event_loop)
        .expect("Failed to create window"));

    pollster::block_on(run(event_loop, window, config));
}
