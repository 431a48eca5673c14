use std::any::Any;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use shader_gallery::{
    Camera, Gallery, InputState, KeyCode, MouseButton, MoveStep, NamedKey, RecordingBackend,
    RenderSelection, Renderer, Scene, ShaderVariant, Viewport,
};

/// Fly through a scene and switch between shading techniques.
#[derive(Debug, Parser)]
#[command(name = "shader-gallery", version)]
struct Cli {
    /// Scene XML file. Mesh and texture paths resolve relative to it. The
    /// built-in quad scene is used when omitted.
    scene: Option<PathBuf>,
    /// Load the scene, assemble one frame without a window and print it.
    #[arg(long)]
    summary_only: bool,
    /// Initial shader: unlit, textured, phong, normal-mapped or pbr.
    #[arg(long, default_value = "phong")]
    variant: ShaderVariant,
    /// Scale camera movement by frame time instead of a fixed step per frame.
    #[arg(long, value_name = "UNITS_PER_SEC")]
    move_speed: Option<f32>,
    /// Keep the directional light still.
    #[arg(long)]
    no_animate: bool,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
}

impl Cli {
    fn camera(&self) -> Camera {
        let step = match self.move_speed {
            Some(speed) => MoveStep::PerSecond(speed),
            None => MoveStep::default(),
        };
        Camera::new().with_step(step)
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.width.max(1), self.height.max(1))
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let (scene, asset_root) = load_scene(cli.scene.as_deref())?;

    println!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights.len()
    );
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }

    if cli.summary_only {
        return run_headless(&cli, &scene, &asset_root);
    }
    match run_interactive(&cli, &scene, &asset_root) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(&cli, &scene, &asset_root)
            } else {
                Err(err)
            }
        }
    }
}

fn load_scene(path: Option<&Path>) -> Result<(Scene, PathBuf)> {
    let Some(path) = path else {
        return Ok((Scene::default_scene(), PathBuf::from(".")));
    };
    let xml = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((scene, root))
}

fn prepare(gallery: &mut Gallery, cli: &Cli) {
    gallery.selection = RenderSelection::new(cli.variant);
    gallery.animate_light = !cli.no_animate;
}

fn run_headless(cli: &Cli, scene: &Scene, asset_root: &Path) -> Result<()> {
    let mut backend = RecordingBackend::new();
    let mut gallery = Gallery::load(scene, asset_root, &mut backend, cli.camera())?;
    prepare(&mut gallery, cli);

    let viewport = cli.viewport();
    let draws = gallery.draw(&mut backend, viewport);
    println!(
        "Assembled {draws} draw(s) with the {} shader at {}x{}",
        cli.variant, viewport.width, viewport.height
    );

    let program = backend.program(cli.variant);
    for (entry, draw) in gallery.entries.iter().zip(program.draws.iter()) {
        let missing = draw.missing_uniforms(cli.variant);
        if !missing.is_empty() {
            warn!("{} is missing uniforms: {}", entry.name, missing.join(", "));
        }
        println!(
            " - {}: {} uniforms, {} textures",
            entry.name,
            draw.uniforms.len(),
            draw.textures.len()
        );
    }
    Ok(())
}

fn run_interactive(cli: &Cli, scene: &Scene, asset_root: &Path) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Shader Gallery")
            .with_visible(false)
            .with_inner_size(LogicalSize::new(cli.width as f64, cli.height as f64))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let mut gallery = Gallery::load(scene, asset_root, &mut renderer, cli.camera())?;
    prepare(&mut gallery, cli);
    window.set_title(&gallery.title());
    window.set_visible(true);

    let mut app = AppState {
        renderer,
        gallery,
        input: InputState::new(),
        last_frame: Instant::now(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    renderer: Renderer,
    gallery: Gallery,
    input: InputState,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                    }
                    WindowEvent::Focused(false) => {
                        self.input.clear();
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input, control_flow);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.input.set_mouse_position(pos);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                self.gallery.update(&self.input, elapsed);
                let size = self.renderer.size();
                self.gallery
                    .draw(&mut self.renderer, Viewport::new(size.width, size.height));
                if let Err(err) = self.renderer.render() {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            let size = self.renderer.window().inner_size();
                            self.renderer.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            info!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput, control_flow: &mut ControlFlow) {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        match input.state {
            ElementState::Pressed => {
                // Key repeat delivers further presses while held.
                if !self.input.is_key_down(keycode) {
                    self.on_key_pressed(keycode, control_flow);
                }
                self.input.set_key_down(keycode);
            }
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }

    fn on_key_pressed(&mut self, keycode: KeyCode, control_flow: &mut ControlFlow) {
        if keycode == KeyCode::Named(NamedKey::Escape) {
            control_flow.set_exit();
            return;
        }
        if self.gallery.handle_key(keycode).is_some() {
            self.renderer.window().set_title(&self.gallery.title());
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let Some(button) = map_mouse_button(button) else {
            return;
        };
        match state {
            ElementState::Pressed => self.input.set_mouse_button_down(button),
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }
}

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Return => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Up => KeyCode::Named(NamedKey::Up),
        Key::Down => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::LShift => KeyCode::Named(NamedKey::LeftShift),
        Key::RShift => KeyCode::Named(NamedKey::RightShift),
        Key::Key0 => KeyCode::Digit(0),
        Key::Key1 => KeyCode::Digit(1),
        Key::Key2 => KeyCode::Digit(2),
        Key::Key3 => KeyCode::Digit(3),
        Key::Key4 => KeyCode::Digit(4),
        Key::Key5 => KeyCode::Digit(5),
        Key::Key6 => KeyCode::Digit(6),
        Key::Key7 => KeyCode::Digit(7),
        Key::Key8 => KeyCode::Digit(8),
        Key::Key9 => KeyCode::Digit(9),
        Key::A => KeyCode::Character('A'),
        Key::D => KeyCode::Character('D'),
        Key::L => KeyCode::Character('L'),
        Key::S => KeyCode::Character('S'),
        Key::W => KeyCode::Character('W'),
        Key::X => KeyCode::Character('X'),
        Key::Z => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        _ => return None,
    })
}

fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Other(value) => u8::try_from(value).ok()?,
    };
    Some(MouseButton::new(index))
}
