//! Interactive viewer: orbit a generated sphere scene while it converges.
//!
//! Usage: `spheretrace [preset.toml]`. Drag to orbit, shift-drag to pan,
//! scroll to zoom, `R` for a new random scene, `Escape` to quit.

use std::path::Path;
use std::sync::Arc;

use spheretrace::camera::input::InputHandler;
use spheretrace::camera::OrbitController;
use spheretrace::gpu::{
    AccumulationCompositor, GpuTargetAllocator, RenderContext, ShaderComposer,
    WgpuComputeBackend,
};
use spheretrace::options::Options;
use spheretrace::session::TracingSession;
use spheretrace::TracerError;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

type Session = TracingSession<GpuTargetAllocator, WgpuComputeBackend>;

/// GPU state that only exists once the window does.
struct Viewer {
    context: RenderContext,
    session: Session,
    compositor: AccumulationCompositor,
    orbit: OrbitController,
}

impl Viewer {
    fn new(window: Arc<Window>, options: &Options) -> Result<Self, TracerError> {
        let size = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window,
            (size.width, size.height),
        ))?;

        let mut composer = ShaderComposer::new()?;
        let backend =
            WgpuComputeBackend::new(&context.device, &context.queue, &mut composer)?;
        let compositor = AccumulationCompositor::new(
            &context.device,
            &context.queue,
            &mut composer,
            context.format(),
        )?;
        let allocator = GpuTargetAllocator::new(context.device.clone());
        let session = TracingSession::new(backend, allocator, options)?;

        let (width, height) = context.size();
        let orbit =
            OrbitController::new(&options.camera, width as f32 / height as f32);

        Ok(Self {
            context,
            session,
            compositor,
            orbit,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.orbit.resize(width, height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.compositor.set_output(view);

        let (width, height) = self.context.size();
        let camera = self.orbit.camera().matrices();
        match self
            .session
            .render_frame(&mut self.compositor, &camera, width, height)
        {
            Ok(stats) => log::trace!(
                "sample {} (weight {:.4})",
                stats.sample_index,
                stats.weight
            ),
            Err(e) => log::error!("frame failed: {e}"),
        }
        frame.present();
        Ok(())
    }
}

struct TraceApp {
    options: Options,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    input: InputHandler,
}

impl TraceApp {
    fn new(options: Options) -> Self {
        Self {
            options,
            window: None,
            viewer: None,
            input: InputHandler::new(),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyR => {
                if let Some(viewer) = &mut self.viewer {
                    let seed = rand::random::<i32>();
                    match viewer.session.reseed(seed) {
                        Ok(()) => log::info!("reseeded scene with {seed}"),
                        Err(e) => log::error!("reseed failed: {e}"),
                    }
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for TraceApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("spheretrace")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match Viewer::new(window.clone(), &self.options) {
            Ok(viewer) => {
                window.request_redraw();
                self.window = Some(window);
                self.viewer = Some(viewer);
            }
            Err(e) => {
                log::error!("failed to start renderer: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(viewer)) =
                    (&self.window, &mut self.viewer)
                {
                    match viewer.render() {
                        Ok(()) => {}
                        Err(
                            wgpu::SurfaceError::Outdated
                            | wgpu::SurfaceError::Lost,
                        ) => {
                            let inner = window.inner_size();
                            viewer.resize(inner.width, inner.height);
                        }
                        Err(e) => {
                            log::error!("surface error: {e:?}");
                        }
                    }
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }

            other => {
                if let Some(viewer) = &mut self.viewer {
                    let _ = self.input.handle_event(&mut viewer.orbit, &other);
                }
            }
        }
    }
}

fn main() -> Result<(), TracerError> {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => Options::load(Path::new(&path))?,
        None => Options::default(),
    };

    let mut app = TraceApp::new(options);
    let event_loop =
        EventLoop::new().map_err(|e| TracerError::Viewer(e.to_string()))?;

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut app)
        .map_err(|e| TracerError::Viewer(e.to_string()))
}
