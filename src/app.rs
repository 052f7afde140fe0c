use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::AssetLoader,
    config::{ViewerConfig, WindowConfig},
    context::AppContext,
    gfx::RenderEngine,
    ui::{furnish_panels, UiManager},
};

/// The furniture viewer: a window, a renderer and the application context
pub struct FurnishApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    context: AppContext,
    fatal: Option<anyhow::Error>,
}

impl FurnishApp {
    pub fn new(config: &ViewerConfig, loader: Box<dyn AssetLoader>) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let context = AppContext::new(config, loader);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window_config: config.window.clone(),
                window: None,
                render_engine: None,
                ui_manager: None,
                context,
                fatal: None,
            },
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("Event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")?;

        match self.app_state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.app_state.context
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let (width, height) = window.inner_size().into();
        let renderer = pollster::block_on(RenderEngine::new(window.clone(), width, height))?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);
        self.context.set_viewport(width, height);

        info!("Viewer ready at {}x{}", width, height);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        self.context.update();

        let mut edits = Vec::new();
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let overview = self.context.overview();
            let properties = self.context.properties_mut();
            ui_manager.update_logic(window, |ui| {
                edits = furnish_panels(ui, &overview, properties);
            });
        }
        self.context.dispatch_all(edits);

        let overlay = self.ui_manager.as_mut().map(|ui_manager| {
            move |device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.render_overlay(device, queue, encoder, view);
            }
        });

        match render_engine.render_frame(
            self.context.graph(),
            self.context.camera_uniform(),
            overlay,
        ) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_engine.get_surface_size();
                render_engine.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("Skipped frame: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            error!("Failed to start viewer: {:#}", e);
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Panels get first refusal on input
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.context.key_pressed(key_code);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.context.set_modifiers(modifiers.state());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.context
                    .pointer_moved((position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.context.pointer_pressed(),
                ElementState::Released => self.context.pointer_released(),
            },
            WindowEvent::MouseWheel { delta, .. } => self.context.scrolled(&delta),
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                self.context.pointer_cancelled();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.context.set_viewport(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
