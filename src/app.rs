use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::{AnimationClock, DEFAULT_DEGREES_PER_SECOND};
use crate::color_pass::{ColorPass, SurfaceFrame};
use crate::error::{Error, Result};
use crate::frame::{FrameDriver, FrameStatus, StopSignal};
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::mesh::{self, AssembledMesh, ColoredMesh};
use crate::transform::{self, DEFAULT_PROJECTION_SCALE, ViewPreset};
use crate::viewport::ViewportManager;

/// Where the displayed solid comes from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MeshSource {
    /// The built-in cube.
    #[default]
    BuiltinCube,
    /// A mesh file whose format is chosen by extension. The geometry is
    /// recentered and scaled to fit the unit cube.
    File(PathBuf),
}

impl MeshSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        MeshSource::File(path.into())
    }

    /// Loads the raw geometry this source points at.
    pub fn load(&self) -> Result<RawGeometry> {
        match self {
            MeshSource::BuiltinCube => Ok(RawGeometry::cube()),
            MeshSource::File(path) => {
                let mut geometry = RawGeometry::from_file(path)?;
                geometry.fit_unit_cube();
                Ok(geometry)
            }
        }
    }
}

/// Configuration for the app window and the animation.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub mesh: MeshSource,
    pub degrees_per_second: f64,
    pub view: ViewPreset,
    pub scale: f32,
    pub stop: StopSignal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "isoview".to_string(),
            width: 800,
            height: 600,
            mesh: MeshSource::default(),
            degrees_per_second: DEFAULT_DEGREES_PER_SECOND,
            view: ViewPreset::default(),
            scale: DEFAULT_PROJECTION_SCALE,
            stop: StopSignal::new(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn mesh(mut self, mesh: MeshSource) -> Self {
        self.mesh = mesh;
        self
    }

    /// Angular rate of the spin, in degrees per second.
    pub fn speed(mut self, degrees_per_second: f64) -> Self {
        self.degrees_per_second = degrees_per_second;
        self
    }

    pub fn view(mut self, view: ViewPreset) -> Self {
        self.view = view;
        self
    }

    /// Uniform scale in front of the view orientation.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Shares a stop signal so the loop can be ended from outside.
    pub fn stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// The once-set projection uniform for this configuration.
    pub fn projection(&self) -> glam::Mat4 {
        transform::projection(self.view, self.scale)
    }
}

/// Run the demo with the default configuration.
pub fn run() -> Result<()> {
    run_with_config(AppConfig::default())
}

/// Load the mesh, open the window and spin until closed or stopped.
///
/// Returns [`Error::AssetLoad`] before any window opens if the mesh is
/// unusable, and [`Error::EnvironmentUnavailable`] if the window or GPU
/// cannot be brought up.
pub fn run_with_config(config: AppConfig) -> Result<()> {
    report(spin(config))
}

/// Logs a fatal error once before it is handed back to the caller.
fn report<T>(result: Result<T>) -> Result<T> {
    result.inspect_err(|e| log::error!("{}", e))
}

fn spin(config: AppConfig) -> Result<()> {
    let geometry = config.mesh.load()?;
    let assembled = mesh::assemble(&geometry)?;
    log::info!(
        "assembled {} vertices from {} triangles",
        assembled.vertex_count(),
        geometry.triangle_count()
    );

    let event_loop = EventLoop::new().map_err(Error::environment)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = IsoviewApp::Pending { config, assembled };
    event_loop.run_app(&mut app).map_err(Error::environment)?;

    match app {
        IsoviewApp::Failed(e) => Err(e),
        IsoviewApp::Running(running) => {
            log::info!(
                "stopped after {} frames at {:.1} degrees",
                running.driver.frames(),
                running.driver.angle()
            );
            Ok(())
        }
        IsoviewApp::Pending { .. } => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    pass: ColorPass,
    mesh: ColoredMesh,
    viewports: ViewportManager,
    driver: FrameDriver,
    start_time: Instant,
}

enum IsoviewApp {
    Pending {
        config: AppConfig,
        assembled: AssembledMesh,
    },
    Running(Box<Running>),
    Failed(Error),
}

impl IsoviewApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        assembled: &AssembledMesh,
    ) -> Result<Running> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(Error::environment)?,
        );
        let gpu = GpuContext::new(window.clone())?;

        let mut viewports = ViewportManager::new();
        let size = window.inner_size();
        viewports.resize(size.width, size.height);

        let pass = ColorPass::new(&gpu);
        pass.set_transform(&gpu, config.projection());
        log::info!("{} view, scale {}", config.view, config.scale);

        let mesh = ColoredMesh::upload(&gpu, assembled);
        let driver = FrameDriver::new(
            AnimationClock::with_rate(config.degrees_per_second),
            mesh.vertex_count(),
            config.stop.clone(),
        );

        Ok(Running {
            window,
            gpu,
            pass,
            mesh,
            viewports,
            driver,
            start_time: Instant::now(),
        })
    }
}

impl ApplicationHandler for IsoviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let IsoviewApp::Pending { config, assembled } = self else {
            return;
        };

        match Self::start(event_loop, config, assembled) {
            Ok(running) => {
                running.window.request_redraw();
                *self = IsoviewApp::Running(Box::new(running));
            }
            Err(e) => {
                *self = IsoviewApp::Failed(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let IsoviewApp::Running(running) = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                running.driver.stop_signal().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.viewports.resize(size.width, size.height);
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now_ms = running.start_time.elapsed().as_secs_f64() * 1000.0;
                let mut target = SurfaceFrame::new(
                    &running.gpu,
                    &mut running.pass,
                    &running.mesh,
                    running.viewports.current(),
                );

                match running.driver.tick(now_ms, &mut target) {
                    FrameStatus::Continue => running.window.request_redraw(),
                    FrameStatus::Stopped => event_loop.exit(),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let IsoviewApp::Running(running) = self {
            if running.driver.stop_signal().is_stopped() {
                event_loop.exit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn default_config_matches_demo() {
        let config = AppConfig::default();
        assert_eq!(config.mesh, MeshSource::BuiltinCube);
        assert_eq!(config.degrees_per_second, 30.0);
        assert_eq!(config.view, ViewPreset::Isometric);
        assert_eq!(config.scale, 0.5);
        assert!(!config.stop.is_stopped());
    }

    #[test]
    fn builder_sets_fields() {
        let config = AppConfig::new()
            .title("spin")
            .size(1024, 768)
            .speed(45.0)
            .view(ViewPreset::Top)
            .scale(0.25)
            .mesh(MeshSource::from_path("part.stl"));

        assert_eq!(config.title, "spin");
        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.degrees_per_second, 45.0);
        assert_eq!(config.view, ViewPreset::Top);
        assert_eq!(config.scale, 0.25);
        assert_eq!(config.mesh, MeshSource::File(PathBuf::from("part.stl")));
    }

    #[test]
    fn shared_stop_signal_reaches_config() {
        let stop = StopSignal::new();
        let config = AppConfig::new().stop_signal(stop.clone());
        stop.stop();
        assert!(config.stop.is_stopped());
    }

    #[test]
    fn projection_uses_view_and_scale() {
        let config = AppConfig::new().view(ViewPreset::Front).scale(2.0);
        assert_eq!(config.projection(), transform::scale(2.0, 2.0, 2.0));
    }

    #[test]
    fn builtin_source_loads_the_cube() {
        let geometry = MeshSource::BuiltinCube.load().unwrap();
        assert_eq!(geometry, RawGeometry::cube());
    }

    struct Capture(Mutex<Vec<(log::Level, String)>>);

    impl log::Log for Capture {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    fn logged_errors() -> Vec<String> {
        CAPTURE
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn capture_logs() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
    }

    #[test]
    fn environment_failure_is_logged_before_returning() {
        capture_logs();
        let result: Result<()> = report(Err(Error::environment("no display")));

        assert!(matches!(result, Err(Error::EnvironmentUnavailable(_))));
        assert!(
            logged_errors()
                .iter()
                .any(|m| m == "graphics environment unavailable: no display")
        );
    }

    #[test]
    fn asset_failure_is_logged_once() {
        capture_logs();
        let result = run_with_config(AppConfig::new().mesh(MeshSource::from_path("gone.obj")));

        assert!(matches!(result, Err(Error::AssetLoad(_))));
        let count = logged_errors()
            .iter()
            .filter(|m| m.contains("'obj'"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn bad_mesh_source_is_an_asset_error() {
        let err = MeshSource::from_path("missing.obj").load().unwrap_err();
        assert!(matches!(
            err,
            Error::AssetLoad(crate::AssetLoadError::UnknownFormat(_))
        ));
    }
}
