use bytemuck::{Pod, Zeroable};
use canvas_life::{Grid, Viewport};
use std::num::NonZeroU64;

// Uniforms read by the fragment shader in render.wgsl
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct RenderParams {
    pub view_offset: [f32; 2],
    pub zoom: f32,
    pub cell_size: f32,
    pub grid_size: [u32; 2],
    pub show_grid: u32,
    pub _padding: u32, // Ensure 16-byte alignment (8 + 4 + 4 + 8 + 4 + 4 = 32)
}

impl RenderParams {
    pub fn new(viewport: &Viewport, grid: &Grid, show_grid: bool) -> Self {
        let offset = viewport.offset();
        Self {
            view_offset: [offset[0] as f32, offset[1] as f32],
            zoom: viewport.zoom() as f32,
            cell_size: viewport.cell_size() as f32,
            grid_size: [grid.width(), grid.height()],
            show_grid: u32::from(show_grid),
            _padding: 0,
        }
    }
}

pub fn create_render_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Render Bind Group Layout"),
        entries: &[
            // RenderParams Uniform (Binding 0)
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<RenderParams>() as u64),
                },
                count: None,
            },
            // Cell Buffer (Binding 1), one u32 per cell, row-major
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

pub fn create_cell_buffer(device: &wgpu::Device, grid: &Grid) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Cell Buffer"),
        size: std::mem::size_of_val(grid.words()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub fn create_render_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    render_param_buffer: &wgpu::Buffer,
    cell_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Render Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: render_param_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: cell_buffer.as_entire_binding() },
        ],
    })
}
