use crate::render::{create_cell_buffer, create_render_bind_group, create_render_bind_group_layout, RenderParams};
use canvas_life::{LifeConfig, Redraw, Session};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalPosition, window::Window};
use std::sync::Arc;

// GUI Imports
use egui_winit::State as EguiWinitState;
use egui_wgpu::Renderer as EguiWgpuRenderer;
use egui::Context as EguiContext;

/// Render callback for the session: schedule a `RedrawRequested` on the window.
pub struct WindowRedraw(pub Arc<Window>);

impl Redraw for WindowRedraw {
    fn request_redraw(&self) {
        self.0.request_redraw();
    }
}

pub struct State {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    pub session: Session<WindowRedraw>,
    pub cell_buffer: wgpu::Buffer,
    uploaded_version: Option<u64>,

    pub render_pipeline: wgpu::RenderPipeline,
    pub render_bind_group: wgpu::BindGroup,
    pub render_param_buffer: wgpu::Buffer,

    pub is_pan_pressed: bool,
    pub cursor_pos: Option<PhysicalPosition<f64>>, // MouseInput carries no position

    // GUI state
    pub egui_ctx: EguiContext,
    pub egui_winit_state: EguiWinitState,
    pub egui_renderer: EguiWgpuRenderer,
    pub menu_open: bool,
    pub pattern_path: String,
    pub file_hovered: bool,
    pub status: Option<String>,
}

impl State {
    pub async fn new(window: Arc<Window>, life_config: &LifeConfig) -> canvas_life::Result<Self> {
        let size = window.inner_size();
        let session = Session::new(life_config, WindowRedraw(window.clone()))?;

        log::info!("Initializing wgpu...");

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone()).expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .expect("Failed to find an appropriate adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![surface_format],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Grid and view uniforms
        let cell_buffer = create_cell_buffer(&device, session.grid());
        let render_param_data = RenderParams::new(session.viewport(), session.grid(), session.show_grid_lines());
        let render_param_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Render Parameters"),
            contents: bytemuck::bytes_of(&render_param_data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let render_shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("render.wgsl").into()),
        });

        // Render Pipeline
        let render_bind_group_layout = create_render_bind_group_layout(&device);
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&render_bind_group_layout],
            push_constant_ranges: &[],
        });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader_module,
                entry_point: "fs_main",
                targets: &[Some(config.format.into())],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        let render_bind_group = create_render_bind_group(
            &device, &render_bind_group_layout, &render_param_buffer, &cell_buffer
        );

        log::info!("Initializing egui...");
        let egui_ctx = EguiContext::default();
        let egui_winit_state = EguiWinitState::new(egui_ctx.clone(), egui_ctx.viewport_id(), &window, None, None);
        let egui_renderer = EguiWgpuRenderer::new(&device, config.format, None, 1);
        log::info!("egui initialized.");

        log::info!("wgpu initialized successfully.");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            session,
            cell_buffer,
            uploaded_version: None,
            render_pipeline,
            render_bind_group,
            render_param_buffer,
            is_pan_pressed: false,
            cursor_pos: None,
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            menu_open: true,
            pattern_path: String::new(),
            file_hovered: false,
            status: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            // Grid and view are independent of the window size; only the surface changes
            self.window.request_redraw();
            log::info!("Reconfigured surface to: {}x{}", new_size.width, new_size.height);
        } else {
            log::warn!("Ignoring resize to zero dimensions: {}x{}", new_size.width, new_size.height);
        }
    }

    /// Load a pattern file and remember the outcome for the side panel.
    pub fn load_pattern_file(&mut self, path: &std::path::Path) {
        self.status = Some(match self.session.load_pattern_file(path) {
            Ok(live) => format!("Loaded {} ({live} live cells)", path.display()),
            Err(err) => err.to_string(),
        });
    }

    // Copy the grid to the GPU only when it changed since the last frame
    fn upload_grid(&mut self) {
        let version = self.session.grid_version();
        if self.uploaded_version == Some(version) {
            return;
        }
        self.queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(self.session.grid().words()));
        self.uploaded_version = Some(version);
    }

    /// Render the grid state. Returns the surface texture for egui to draw on.
    pub fn render(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.upload_grid();
        let params = RenderParams::new(self.session.viewport(), self.session.grid(), self.session.show_grid_lines());
        self.queue.write_buffer(&self.render_param_buffer, 0, bytemuck::bytes_of(&params));

        // --- Get Surface Texture (early exit on error) ---
        let output_frame = match self.surface.get_current_texture() {
             Ok(frame) => frame,
             Err(wgpu::SurfaceError::Lost) => {
                 log::warn!("Surface lost, recreating...");
                 self.resize(self.size); // Reconfigure the surface
                 // Return the error, the caller (main loop) should handle skipping the frame
                 return Err(wgpu::SurfaceError::Lost);
             }
             Err(e) => {
                 log::error!("Failed to acquire next swap chain texture: {:?}", e);
                 return Err(e);
             }
         };

        // --- Render Pass ---
        let output_view = output_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut render_encoder = self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });
        {
            let mut render_pass = render_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &output_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })
                ],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.render_bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Draw full-screen triangle
        }
        self.queue.submit(Some(render_encoder.finish()));
        // output_frame.present(); // DON'T present here, egui will do it later

        Ok(output_frame)
    }
}
