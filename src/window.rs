//! Windowed host: winit event loop, keyboard input and presentation.

use std::sync::Arc;

use glam::UVec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::canvas::Canvas;
use crate::config::EffectConfig;
use crate::effect::FlowEffect;
use crate::error::AppError;
use crate::input::Input;
use crate::present::Presenter;
use crate::source::ImageSource;
use crate::surface::Surface;

/// Open a window and run the effect until it is closed.
///
/// The source image is loaded before any window is created, so a missing
/// asset fails fast.
pub fn run(config: EffectConfig) -> Result<(), AppError> {
    config.validate()?;
    let image = ImageSource::load(&config.image_path)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, image);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    presenter: Presenter,
    effect: FlowEffect,
    canvas: Canvas,
}

struct App {
    config: EffectConfig,
    image: Option<ImageSource>,
    running: Option<Running>,
    input: Input,
    error: Option<AppError>,
}

impl App {
    fn new(config: EffectConfig, image: ImageSource) -> Self {
        Self {
            config,
            image: Some(image),
            running: None,
            input: Input::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let Some(image) = self.image.take() else {
            return Ok(());
        };

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone()))?;

        let size = window.inner_size();
        let effect = FlowEffect::new(&self.config, image, UVec2::new(size.width, size.height))?;
        let canvas = Canvas::new(effect.canvas_size());

        window.request_redraw();
        self.running = Some(Running {
            window,
            presenter,
            effect,
            canvas,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_none() {
            if let Err(err) = self.start(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                running.presenter.resize(size.width, size.height);
                running.effect.resize(UVec2::new(size.width, size.height));
                running.canvas.resize(running.effect.canvas_size());
            }
            WindowEvent::KeyboardInput { .. } => {
                for command in self.input.commands() {
                    running.effect.apply(command);
                }
                self.input.begin_frame();
            }
            WindowEvent::RedrawRequested => {
                running.effect.render(&mut running.canvas);
                match running.presenter.present(running.canvas.pixels()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        running.presenter.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => log::error!("Frame skipped: {:?}", e),
                }
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}
