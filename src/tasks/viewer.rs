pub mod input;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::Configuration;
use crate::events::{Key, ViewerInput};
use crate::gpu::{self, FrameOutcome, quad::QuadRenderer};
use crate::tasks::loader::Assets;
use input::InputTranslator;
use state::ViewState;

struct ViewerApp {
    cfg: Configuration,
    assets: Assets,
    state: ViewState,
    window: Option<Arc<Window>>,
    renderer: Option<QuadRenderer>,
    input: Option<InputTranslator>,
    redraw: RedrawTracker,
    // first fatal error; reported once the event loop has returned
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(cfg: Configuration, assets: Assets, state: ViewState) -> Self {
        Self {
            cfg,
            assets,
            state,
            window: None,
            renderer: None,
            input: None,
            redraw: RedrawTracker::default(),
            failure: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Ok(window.clone());
        }

        let opts = &self.cfg.window;
        let attrs = WindowAttributes::default()
            .with_title(opts.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(opts.width),
                f64::from(opts.height),
            ))
            .with_resizable(opts.resizable);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create viewer window")?,
        );
        self.window = Some(window.clone());
        Ok(window)
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = self.ensure_window(event_loop)?;
        if self.renderer.is_none() {
            let renderer =
                QuadRenderer::new(window.clone(), &self.assets, self.cfg.gpu_error_limit)?;
            self.renderer = Some(renderer);
        }
        if self.input.is_none() {
            let size = window.inner_size();
            let mut input = InputTranslator::new(size);
            input.warp_cursor(f64::from(size.width) / 2.0, f64::from(size.height) / 2.0);
            self.input = Some(input);
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!(error = ?err, "viewer stopping");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn request_redraw(&mut self) {
        self.redraw.request();
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn handle_input(&mut self, event_loop: &ActiveEventLoop, input: ViewerInput) {
        if input == ViewerInput::KeyPressed(Key::Escape) {
            info!("escape pressed; closing viewer");
            event_loop.exit();
            return;
        }
        if let Some(transition) = self.state.apply(&input) {
            debug!(?transition, "view changed");
            self.request_redraw();
        }
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match gpu::render_frame(&self.state, renderer) {
            Ok(outcome) => self.redraw.finish(outcome),
            Err(err) => self.fail(event_loop, err),
        }
    }
}

/// Tracks whether the current view still has to reach the screen.
///
/// A request stays pending until a frame is actually presented, so frames
/// skipped on surface loss or timeout are retried from `about_to_wait`.
#[derive(Debug, Default, Clone, Copy)]
struct RedrawTracker {
    pending: bool,
}

impl RedrawTracker {
    fn request(&mut self) {
        self.pending = true;
    }

    fn finish(&mut self, outcome: FrameOutcome) {
        if outcome == FrameOutcome::Presented {
            self.pending = false;
        }
    }

    fn pending(self) -> bool {
        self.pending
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
            return;
        }
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("viewer window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
                if let Some(input) = self.input.as_mut() {
                    input.resize(new_size);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.draw(event_loop),
            other => {
                let translated = self
                    .input
                    .as_mut()
                    .and_then(|input| input.translate(&other));
                if let Some(input) = translated {
                    self.handle_input(event_loop, input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.redraw.pending()
            && let Some(window) = self.window.as_ref()
        {
            window.request_redraw();
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run_windowed(cfg: Configuration, assets: Assets) -> Result<()> {
    let state = ViewState::new(assets.image_sizes(), cfg.controls)?;
    let event_loop = EventLoop::new().context("failed to build viewer event loop")?;

    let mut app = ViewerApp::new(cfg, assets, state);
    let run_result = event_loop.run_app(&mut app);
    if let Some(err) = app.failure.take() {
        return Err(err);
    }
    run_result.context("viewer event loop failed")?;
    info!("viewer closed");
    Ok(())
}
