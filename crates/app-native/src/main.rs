use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use wgpu::util::DeviceExt;
use winit::{event::*, event_loop::EventLoop, keyboard::{KeyCode, PhysicalKey}, window::WindowBuilder};

use app_core::{
    build_effect, CameraConfig, Collider, EffectDesc, OrbitCameraController, ParticleEffect,
    ParticleInstance, PointerKind, Scene, TrailVertex, RECENTER_RATE, TRAIL_OPACITY,
};
use glam::Vec3;

/// Horizontal spacing between showcase slots before re-centering pulls the
/// selected effect to x = 0.
const SLIDE_SPACING: f32 = 2.5;
/// One wheel "line" worth of zoom, in delta-y units.
const WHEEL_LINE_SCALE: f32 = 40.0;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
}

/// The showcase world: the effect catalog instances, the selection, the
/// visibility registry, and the orbit camera.
struct Showcase {
    effects: Vec<(String, ParticleEffect)>,
    selected: usize,
    scene: Scene,
    camera: OrbitCameraController,
    focus: Rc<Cell<Vec3>>,
}

impl Showcase {
    fn new() -> anyhow::Result<Self> {
        // One entry per variant, plus the two explosion sizes from the
        // original showcase definition.
        let entries: [(&str, &str, EffectDesc); 7] = [
            ("Large Explosion", "explosion", {
                let mut d = EffectDesc::default();
                d.radius = Some(1.0);
                d.size = Some(0.3);
                d
            }),
            ("Small Explosion", "explosion", {
                let mut d = EffectDesc::default();
                d.radius = Some(0.2);
                d.size = Some(0.05);
                d
            }),
            ("Firework", "firework", EffectDesc::default()),
            ("Fountain", "fountain", EffectDesc::default()),
            ("Smoke Puff", "smoke", EffectDesc::default()),
            ("Starburst", "starburst", EffectDesc::default()),
            ("Ring Trail", "ringtrail", EffectDesc::default()),
        ];

        let mid = entries.len() / 2;
        let mut effects = Vec::with_capacity(entries.len());
        for (i, (label, kind, mut desc)) in entries.into_iter().enumerate() {
            desc.position = Vec3::new((i as f32 - mid as f32) * SLIDE_SPACING, 1.0, 0.0);
            let effect = build_effect(kind, &desc, 42 + i as u64)?;
            effects.push((label.to_string(), effect));
        }

        let selected = mid;
        let focus = Rc::new(Cell::new(effects[selected].1.origin()));

        // Wall slabs from the showcase room; the camera ray-tests against
        // these so it never clips through them.
        let walls = vec![
            wall(Vec3::new(-0.75, 1.0, -2.4), Vec3::new(4.0, 3.0, 0.1)),
            wall(Vec3::new(-2.7, 1.0, 0.0), Vec3::new(0.1, 4.0, 6.0)),
            wall(Vec3::new(0.0, 2.5, 0.0), Vec3::new(10.0, 0.1, 10.0)),
        ];

        let config = CameraConfig {
            initial_yaw: -100.0,
            initial_pitch: -30.0,
            initial_distance: 5.0,
            ..CameraConfig::default()
        };
        let focus_for_camera = Rc::clone(&focus);
        let camera = OrbitCameraController::with_colliders(
            config,
            Box::new(move || focus_for_camera.get()),
            walls,
            0.25,
        );

        let mut show = Self {
            effects,
            selected,
            scene: Scene::new(),
            camera,
            focus,
        };
        show.effects[selected].1.add_to_scene(&mut show.scene);
        Ok(show)
    }

    fn selected_name(&self) -> &str {
        &self.effects[self.selected].0
    }

    fn select_offset(&mut self, offset: isize) {
        let len = self.effects.len() as isize;
        let next = (self.selected as isize + offset).rem_euclid(len) as usize;
        self.effects[self.selected].1.remove_from_scene(&mut self.scene);
        self.selected = next;
        self.effects[self.selected].1.add_to_scene(&mut self.scene);
        log::info!("showing {}", self.selected_name());
    }

    /// One simulation frame: advance every effect, re-center the selected
    /// one, refresh the camera focus, and tick the camera.
    fn update(&mut self, dt: f32) {
        for (_, effect) in &mut self.effects {
            effect.update(dt);
        }
        let sel = &mut self.effects[self.selected].1;
        let mut origin = sel.origin();
        origin.x += (0.0 - origin.x) * RECENTER_RATE;
        sel.set_origin(origin);
        self.focus.set(origin);
        self.camera.update();
    }

    /// Collect draw data for everything the scene says is visible.
    fn collect(&self, instances: &mut Vec<ParticleInstance>, trail_vertices: &mut Vec<TrailVertex>, trail_runs: &mut Vec<(u32, u32)>) {
        instances.clear();
        trail_vertices.clear();
        trail_runs.clear();
        for (_, effect) in &self.effects {
            if !self.scene.contains(effect.id()) {
                continue;
            }
            effect.write_instances(instances);
            let [r, g, b] = effect.color();
            for trail in effect.trails() {
                let start = trail_vertices.len() as u32;
                for p in trail {
                    trail_vertices.push(TrailVertex {
                        position: p.to_array(),
                        color: [r, g, b, TRAIL_OPACITY],
                    });
                }
                let len = trail_vertices.len() as u32 - start;
                if len >= 2 {
                    trail_runs.push((start, len));
                }
            }
        }
    }

    // Buffer budgets cover every effect at once: the scene allows several
    // simultaneous attachments, and collect() gathers all of them.
    fn total_particle_count(&self) -> usize {
        self.effects.iter().map(|(_, e)| e.particle_count()).sum()
    }

    fn total_trail_vertices(&self) -> usize {
        self.effects
            .iter()
            .map(|(_, e)| e.trails().len() * e.trail_capacity().max(1))
            .sum()
    }
}

fn wall(center: Vec3, size: Vec3) -> Collider {
    Collider::Aabb {
        min: center - size * 0.5,
        max: center + size * 0.5,
    }
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    particle_pipeline: wgpu::RenderPipeline,
    trail_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    trail_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    last_frame: Instant,
    instances: Vec<ParticleInstance>,
    trail_vertices: Vec<TrailVertex>,
    trail_runs: Vec<(u32, u32)>,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window, show: &Showcase) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(app_core::SCENE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad corners for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<ParticleInstance>() * show.total_particle_count().max(1))
                as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let trail_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trail_vb"),
            size: (std::mem::size_of::<TrailVertex>() * show.total_trail_vertices().max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let particle_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-particle instance data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 16,
                        shader_location: 3,
                    },
                ],
            },
        ];
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_particle"),
                buffers: &particle_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let trail_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TrailVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }];
        let trail_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trail_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_trail"),
                buffers: &trail_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_trail"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            particle_pipeline,
            trail_pipeline,
            uniform_buffer,
            quad_vb,
            instance_vb,
            trail_vb,
            bind_group,
            width: size.width.max(1),
            height: size.height.max(1),
            last_frame: Instant::now(),
            instances: Vec::new(),
            trail_vertices: Vec::new(),
            trail_runs: Vec::new(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn render(&mut self, show: &mut Showcase) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        show.update(dt);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = self.width as f32 / self.height as f32;
        let camera = show.camera.camera(aspect);
        let (right, up) = camera.billboard_axes();
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_proj_matrix().to_cols_array_2d(),
                cam_right: [right.x, right.y, right.z, 0.0],
                cam_up: [up.x, up.y, up.z, 0.0],
            }),
        );

        let mut instances = std::mem::take(&mut self.instances);
        let mut trail_vertices = std::mem::take(&mut self.trail_vertices);
        let mut trail_runs = std::mem::take(&mut self.trail_runs);
        show.collect(&mut instances, &mut trail_vertices, &mut trail_runs);
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&instances));
        }
        if !trail_vertices.is_empty() {
            self.queue
                .write_buffer(&self.trail_vb, 0, bytemuck::cast_slice(&trail_vertices));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for &(start, len) in &trail_runs {
                rpass.set_pipeline(&self.trail_pipeline);
                rpass.set_bind_group(0, &self.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.trail_vb.slice(..));
                rpass.draw(start..start + len, 0..1);
            }
            if !instances.is_empty() {
                rpass.set_pipeline(&self.particle_pipeline);
                rpass.set_bind_group(0, &self.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
                rpass.draw(0..6, 0..instances.len() as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();

        self.instances = instances;
        self.trail_vertices = trail_vertices;
        self.trail_runs = trail_runs;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut show = Showcase::new()?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(format!("VFX Showcase - {}", show.selected_name()))
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window, &show))?;
    let mut cursor = (0.0f32, 0.0f32);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            cursor = (position.x as f32, position.y as f32);
            show.camera.pointer_move(cursor.0, cursor.1);
        }
        Event::WindowEvent {
            event: WindowEvent::MouseInput { state: button_state, button, .. },
            ..
        } => {
            let kind = match button {
                MouseButton::Left => PointerKind::Mouse(0),
                MouseButton::Middle => PointerKind::Mouse(1),
                MouseButton::Right => PointerKind::Mouse(2),
                _ => PointerKind::Mouse(255),
            };
            match button_state {
                ElementState::Pressed => show.camera.pointer_down(cursor.0, cursor.1, kind),
                ElementState::Released => show.camera.pointer_up(),
            }
        }
        Event::WindowEvent {
            event: WindowEvent::Touch(touch),
            ..
        } => {
            let (x, y) = (touch.location.x as f32, touch.location.y as f32);
            match touch.phase {
                TouchPhase::Started => show.camera.pointer_down(x, y, PointerKind::Touch),
                TouchPhase::Moved => show.camera.pointer_move(x, y),
                TouchPhase::Ended | TouchPhase::Cancelled => show.camera.pointer_up(),
            }
        }
        Event::WindowEvent {
            event: WindowEvent::MouseWheel { delta, .. },
            ..
        } => {
            let delta_y = match delta {
                MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_SCALE,
                MouseScrollDelta::PixelDelta(p) => -p.y as f32,
            };
            show.camera.wheel(delta_y);
        }
        Event::WindowEvent {
            event: WindowEvent::KeyboardInput { event: key, .. },
            ..
        } => {
            if key.state == ElementState::Pressed {
                match key.physical_key {
                    PhysicalKey::Code(KeyCode::ArrowLeft) => {
                        show.select_offset(-1);
                        state
                            .window
                            .set_title(&format!("VFX Showcase - {}", show.selected_name()));
                    }
                    PhysicalKey::Code(KeyCode::ArrowRight) => {
                        show.select_offset(1);
                        state
                            .window
                            .set_title(&format!("VFX Showcase - {}", show.selected_name()));
                    }
                    _ => {}
                }
            }
        }
        Event::AboutToWait => match state.render(&mut show) {
            Ok(_) => state.window.request_redraw(),
            Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(_) => {}
        },
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_budgets_cover_every_visible_effect() {
        let mut show = Showcase::new().unwrap();
        for i in 0..show.effects.len() {
            let (_, effect) = &show.effects[i];
            effect.add_to_scene(&mut show.scene);
        }
        show.update(0.016);

        let mut instances = Vec::new();
        let mut trail_vertices = Vec::new();
        let mut trail_runs = Vec::new();
        show.collect(&mut instances, &mut trail_vertices, &mut trail_runs);
        assert_eq!(instances.len(), show.total_particle_count());
        assert!(trail_vertices.len() <= show.total_trail_vertices());
    }
}
