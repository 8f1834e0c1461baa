//! # Application Core (`app.rs`)
//!
//! The `App` struct is the `winit` application handler. It creates the window, builds the
//! [`Renderer`] (synchronously on desktop, asynchronously on the web), forwards window events to
//! egui, and drives one frame per redraw.
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**: the renderer is created with `pollster::block_on` inside `resumed`. If creation
//!   fails, the error is logged and the event loop exits.
//! - **WebAssembly**: the renderer is created on a spawned future and handed back through a
//!   `oneshot` channel; window events are ignored until it arrives.
//!
//! ## Controls
//!
//! The "Torus" egui window edits a [`SceneControls`] value that is passed to the renderer every
//! frame. Escape or closing the window exits.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use std::sync::Arc;

use web_time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window, WindowAttributes, WindowId},
};

use crate::renderer::Renderer;
use crate::scene::SceneControls;

#[derive(Default)]
pub struct App {
    window: Option<Arc<Window>>,

    renderer: Option<Renderer>,

    gui_state: Option<egui_winit::State>,

    last_frame: Option<Instant>,

    #[cfg(target_arch = "wasm32")]
    pending_renderer: Option<futures::channel::oneshot::Receiver<Renderer>>,

    surface_size: (u32, u32),

    controls: SceneControls,
}

impl App {
    /// Window attributes for the current platform and the initial surface size.
    ///
    /// On the web the window wraps the page's `<canvas id="canvas">`; `None` if it is missing.
    fn window_attributes() -> Option<(WindowAttributes, (u32, u32))> {
        let attributes = Window::default_attributes();

        #[cfg(not(target_arch = "wasm32"))]
        {
            Some((attributes.with_title("Torus"), (0, 0)))
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = wgpu::web_sys::window()?
                .document()?
                .get_element_by_id("canvas")?
                .dyn_into::<wgpu::web_sys::HtmlCanvasElement>()
                .ok()?;
            let size = (canvas.width(), canvas.height());
            Some((attributes.with_canvas(Some(canvas)), size))
        }
    }

    fn create_gui_state(window: &Window) -> egui_winit::State {
        let gui_context = egui::Context::default();

        #[cfg(target_arch = "wasm32")]
        gui_context.set_pixels_per_point(window.scale_factor() as f32);

        let viewport_id = gui_context.viewport_id();
        egui_winit::State::new(
            gui_context,
            viewport_id,
            window,
            Some(window.scale_factor() as f32),
            Some(Theme::Dark),
            None,
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn start_renderer(&mut self, event_loop: &ActiveEventLoop, window: Arc<Window>) {
        let (width, height) = self.surface_size;
        match pollster::block_on(Renderer::new(window, width, height)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(error) => {
                log::error!("Failed to create renderer: {error}");
                event_loop.exit();
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn start_renderer(&mut self, _event_loop: &ActiveEventLoop, window: Arc<Window>) {
        let (width, height) = self.surface_size;
        let (sender, receiver) = futures::channel::oneshot::channel();
        self.pending_renderer = Some(receiver);

        log::info!("Canvas dimensions: ({width} x {height})");
        wasm_bindgen_futures::spawn_local(async move {
            match Renderer::new(window, width, height).await {
                Ok(renderer) => {
                    if sender.send(renderer).is_err() {
                        log::error!("Renderer was ready after the app went away");
                    }
                }
                Err(error) => log::error!("Failed to create renderer: {error}"),
            }
        });
    }

    /// Moves a renderer finished by the async initializer into place.
    #[cfg(target_arch = "wasm32")]
    fn receive_renderer(&mut self) {
        let Some(receiver) = self.pending_renderer.as_mut() else {
            return;
        };
        if let Ok(Some(renderer)) = receiver.try_recv() {
            self.renderer = Some(renderer);
            self.pending_renderer = None;
        }
    }

    /// Runs the egui panel for one frame, then renders the scene and the panel.
    fn redraw(&mut self) {
        let (Some(gui_state), Some(renderer), Some(window)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let now = Instant::now();
        let delta_time = self
            .last_frame
            .replace(now)
            .map(|last| now - last)
            .unwrap_or_default();

        let gui_input = gui_state.take_egui_input(window);
        let egui::FullOutput {
            textures_delta,
            shapes,
            pixels_per_point,
            platform_output,
            ..
        } = gui_state
            .egui_ctx()
            .run(gui_input, |ctx| controls_panel(ctx, &mut self.controls));

        gui_state.handle_platform_output(window, platform_output);
        let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

        let (width, height) = self.surface_size;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: window.scale_factor() as f32,
        };

        renderer.render_frame(
            screen_descriptor,
            paint_jobs,
            textures_delta,
            delta_time,
            &self.controls,
        );
    }
}

fn controls_panel(ctx: &egui::Context, controls: &mut SceneControls) {
    egui::Window::new("Torus").show(ctx, |ui| {
        ui.checkbox(&mut controls.show_material, "Material torus");
        ui.checkbox(&mut controls.show_textured, "Textured torus");
        ui.add(egui::Slider::new(&mut controls.rotation_speed, 0.0..=180.0).text("Rotation (deg/s)"));
        ui.add(
            egui::Slider::new(&mut controls.shininess, 1.0..=256.0)
                .logarithmic(true)
                .text("Shininess"),
        );
        ui.horizontal(|ui| {
            ui.label("Diffuse");
            ui.color_edit_button_rgb(&mut controls.diffuse_colour);
        });
        if ui.button("Reset").clicked() {
            *controls = SceneControls::default();
        }
    });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let Some((attributes, canvas_size)) = Self::window_attributes() else {
            log::error!("No <canvas id=\"canvas\"> element found");
            event_loop.exit();
            return;
        };

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };

        self.surface_size = if cfg!(target_arch = "wasm32") {
            canvas_size
        } else {
            let inner_size = window.inner_size();
            (inner_size.width, inner_size.height)
        };

        self.gui_state = Some(Self::create_gui_state(&window));
        self.window = Some(window.clone());
        self.start_renderer(event_loop, window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        #[cfg(target_arch = "wasm32")]
        self.receive_renderer();

        let (Some(gui_state), Some(window)) = (self.gui_state.as_mut(), self.window.clone()) else {
            return;
        };
        if self.renderer.is_none() {
            return;
        }

        if gui_state.on_window_event(&window, &event).consumed {
            window.request_redraw();
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                log::info!("Exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::info!("Resizing surface to ({}, {})", size.width, size.height);
                self.surface_size = (size.width, size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }

        window.request_redraw();
    }
}
