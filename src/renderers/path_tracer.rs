// Copyright @yucwang 2026

use std::any::Any;
use std::panic::{ self, AssertUnwindSafe };
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::Arc;
use std::thread::{ self, JoinHandle };
use std::time::Instant;

use log::{ debug, info, warn };

use crate::core::arena::{ ScratchArena, ARENA_RELEASE_THRESHOLD };
use crate::core::config::RendererSettings;
use crate::core::error::{ ConstructionError, RenderError };
use crate::core::film::Film;
use crate::core::integrator::Integrator;
use crate::core::reporter::ProgressReporter;
use crate::core::rng::splitmix64;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector2f };
use crate::renderers::renderer::{ divide_grids, GridTask, Renderer };

/// Seed of the sampler stream for a task, fixed by its grid origin.
pub fn task_seed(base_seed: u64, task: &GridTask) -> u64 {
    let origin = ((task.y_beg as u64) << 32) | task.x_beg as u64;
    splitmix64(base_seed ^ splitmix64(origin))
}

struct RunningRender {
    workers: Vec<JoinHandle<Result<(), String>>>,
    stop: Arc<AtomicBool>,
    reporter: Arc<dyn ProgressReporter>,
    start: Instant,
}

/// Tile-based renderer: a pool of workers pulls grid tasks by atomic index,
/// renders each into a private film grid and merges it into the shared film.
pub struct PathTracerRenderer {
    integrator: Arc<dyn Integrator>,
    sampler: Arc<dyn Sampler>,
    settings: RendererSettings,
    seed: u64,
    running: Option<RunningRender>,
}

/// Everything a worker reads; shared between all workers of one render.
struct RenderContext {
    integrator: Arc<dyn Integrator>,
    sampler: Arc<dyn Sampler>,
    scene: Arc<Scene>,
    film: Arc<Film>,
    reporter: Arc<dyn ProgressReporter>,
    tasks: Vec<GridTask>,
    next_task: AtomicUsize,
    finished: AtomicUsize,
    stop: Arc<AtomicBool>,
    seed: u64,
}

impl RenderContext {
    fn run_worker(&self) {
        let mut arena = ScratchArena::new();
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return;
            }
            let idx = self.next_task.fetch_add(1, Ordering::Relaxed);
            let task = match self.tasks.get(idx) {
                Some(task) => *task,
                None => return,
            };
            if !self.render_task(&task, &mut arena) {
                return;
            }
            let done = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
            self.reporter.progress(100.0 * done as Float / self.tasks.len() as Float);
        }
    }

    /// Returns false when the render was stopped midway; the partial grid is dropped.
    fn render_task(&self, task: &GridTask, arena: &mut ScratchArena) -> bool {
        let (width, height) = self.film.resolution();
        let mut grid = self.film.new_grid(task.x_beg, task.x_end, task.y_beg, task.y_end);
        let mut sampler = self.sampler.clone_seeded(task_seed(self.seed, task));
        let camera = self.scene.camera();

        let (sx_beg, sx_end) = grid.sample_x_range();
        let (sy_beg, sy_end) = grid.sample_y_range();
        for py in sy_beg..sy_end {
            for px in sx_beg..sx_end {
                sampler.start_pixel(px.max(0) as u32, py.max(0) as u32);
                while sampler.next_sample() {
                    if self.stop.load(Ordering::Relaxed) {
                        return false;
                    }
                    let film_pos = Vector2f::new(px as Float + sampler.sample1(), py as Float + sampler.sample1());
                    let film_coord = Vector2f::new(film_pos.x / width as Float, film_pos.y / height as Float);
                    let lens = sampler.sample2();
                    if let Some(camera_ray) = camera.generate_ray(&film_coord, &lens) {
                        let sample = self.integrator.eval(&camera_ray.ray, &self.scene, sampler.as_mut(), arena);
                        grid.add_sample(&film_pos, &(sample.radiance * camera_ray.weight), &sample.gbuffer, 1.0);
                    }
                    arena.release_if_exceeds(ARENA_RELEASE_THRESHOLD);
                }
            }
        }

        self.film.merge_grid(&grid);
        debug!("grid [{}, {}) x [{}, {}) merged", task.x_beg, task.x_end, task.y_beg, task.y_end);
        true
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

impl PathTracerRenderer {
    pub fn new(integrator: Arc<dyn Integrator>,
               sampler: Arc<dyn Sampler>,
               settings: RendererSettings) -> Result<Self, ConstructionError> {
        settings.validate()?;
        Ok(Self { integrator, sampler, settings, seed: 0, running: None })
    }

    /// Base seed mixed into every task seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        let running = self.running.take().ok_or(RenderError::NotRunning)?;
        let mut faults = Vec::new();
        for (i, worker) in running.workers.into_iter().enumerate() {
            match worker.join() {
                Ok(Ok(())) => {}
                Ok(Err(msg)) => faults.push(format!("worker {} failed: {}", i, msg)),
                Err(payload) => faults.push(format!("worker {} failed: {}", i, panic_message(payload))),
            }
        }
        for fault in &faults {
            warn!("{}", fault);
            running.reporter.message(fault);
        }

        let elapsed = running.start.elapsed();
        let stopped = running.stop.load(Ordering::Relaxed);
        running.reporter.end_stage();
        running.reporter.message(&format!("total time: {:.3}s{}", elapsed.as_secs_f64(),
                                          if stopped { " (stopped)" } else { "" }));
        running.reporter.end();
        info!("render finished in {:.3}s with {} worker fault(s)", elapsed.as_secs_f64(), faults.len());
        Ok(())
    }
}

impl Renderer for PathTracerRenderer {
    fn render_async(&mut self,
                    scene: Arc<Scene>,
                    reporter: Arc<dyn ProgressReporter>,
                    film: Arc<Film>) -> Result<(), RenderError> {
        if self.running.is_some() {
            return Err(RenderError::AlreadyRunning);
        }

        let (width, height) = film.resolution();
        let tasks = divide_grids(width, height, self.settings.task_grid_size as usize);
        let worker_count = self.settings.resolved_worker_count();
        info!("rendering {}x{} with {} workers, {} tasks, {}",
              width, height, worker_count, tasks.len(), self.integrator.describe());

        let stop = Arc::new(AtomicBool::new(false));
        let context = Arc::new(RenderContext {
            integrator: self.integrator.clone(),
            sampler: self.sampler.clone(),
            scene,
            film,
            reporter: reporter.clone(),
            tasks,
            next_task: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            stop: stop.clone(),
            seed: self.seed,
        });

        reporter.begin();
        reporter.new_stage("render");
        let start = Instant::now();

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let context = context.clone();
            let spawned = thread::Builder::new()
                .name(format!("render-worker-{}", i))
                .spawn(move || {
                    panic::catch_unwind(AssertUnwindSafe(|| context.run_worker()))
                        .map_err(panic_message)
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    stop.store(true, Ordering::Relaxed);
                    for worker in workers {
                        let _ = worker.join();
                    }
                    reporter.end();
                    return Err(RenderError::Spawn(e.to_string()));
                }
            }
        }

        self.running = Some(RunningRender { workers, stop, reporter, start });
        Ok(())
    }

    fn join(&mut self) -> Result<(), RenderError> {
        self.finish()
    }

    fn stop(&mut self) -> Result<(), RenderError> {
        let running = self.running.as_ref().ok_or(RenderError::NotRunning)?;
        running.stop.store(true, Ordering::Relaxed);
        self.finish()
    }
}

impl Drop for PathTracerRenderer {
    fn drop(&mut self) {
        if self.running.is_some() {
            match self.stop() {
                Ok(()) => debug!("render stopped on drop"),
                Err(e) => warn!("failed to stop render on drop: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::core::config::BvhSettings;
    use crate::core::film::GBufferPixel;
    use crate::core::integrator::PixelSample;
    use crate::core::scene::SceneBuilder;
    use crate::filters::box_filter::BoxFilter;
    use crate::math::constants::Vector3f;
    use crate::math::ray::Ray3f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::samplers::independent::IndependentSampler;
    use crate::sensors::perspective::PerspectiveCamera;

    #[derive(Default)]
    struct CollectingReporter {
        messages: Mutex<Vec<String>>,
        last_progress: Mutex<Float>,
    }

    impl ProgressReporter for CollectingReporter {
        fn begin(&self) {}
        fn new_stage(&self, _name: &str) {}
        fn progress(&self, percent: Float) {
            let mut last = self.last_progress.lock().expect("lock");
            *last = last.max(percent);
        }
        fn message(&self, text: &str) {
            self.messages.lock().expect("lock").push(text.to_string());
        }
        fn end_stage(&self) {}
        fn end(&self) {}
    }

    /// Same radiance for every camera ray.
    struct ConstantIntegrator;

    impl Integrator for ConstantIntegrator {
        fn eval(&self, _ray: &Ray3f, _scene: &Scene, _sampler: &mut dyn Sampler, _arena: &ScratchArena) -> PixelSample {
            PixelSample { radiance: RGBSpectrum::splat(2.0), gbuffer: GBufferPixel::default() }
        }
    }

    struct PanickingIntegrator;

    impl Integrator for PanickingIntegrator {
        fn eval(&self, _ray: &Ray3f, _scene: &Scene, _sampler: &mut dyn Sampler, _arena: &ScratchArena) -> PixelSample {
            panic!("shading blew up");
        }
    }

    fn empty_scene() -> Arc<Scene> {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::zeros(),
                                            Vector3f::new(0.0, 1.0, 0.0), 0.8, 1.0).expect("camera");
        let mut builder = SceneBuilder::new();
        builder.set_camera(Box::new(camera));
        Arc::new(builder.build(&BvhSettings::default()).expect("scene"))
    }

    fn renderer(integrator: Arc<dyn Integrator>, workers: i32, grid: i32) -> PathTracerRenderer {
        let settings = RendererSettings { worker_count: workers, task_grid_size: grid };
        PathTracerRenderer::new(integrator, Arc::new(IndependentSampler::new(2, 0)), settings).expect("renderer")
    }

    #[test]
    fn test_render_fills_every_pixel() {
        let film = Arc::new(Film::with_filter(10, 7, Arc::new(BoxFilter::new(0.5).expect("filter"))));
        let reporter = Arc::new(CollectingReporter::default());
        let mut r = renderer(Arc::new(ConstantIntegrator), 3, 4);
        r.render(empty_scene(), reporter.clone(), film.clone()).expect("render");

        let image = film.image();
        for y in 0..7 {
            for x in 0..10 {
                assert!((image[(x, y)].x - 2.0).abs() < 1e-5);
            }
        }
        assert_eq!(*reporter.last_progress.lock().expect("lock"), 100.0);
        assert!(!r.is_running());
    }

    #[test]
    fn test_control_errors() {
        let mut r = renderer(Arc::new(ConstantIntegrator), 1, 8);
        assert_eq!(r.join(), Err(RenderError::NotRunning));
        assert_eq!(r.stop(), Err(RenderError::NotRunning));

        let film = Arc::new(Film::with_filter(64, 64, Arc::new(BoxFilter::new(0.5).expect("filter"))));
        let reporter: Arc<dyn ProgressReporter> = Arc::new(CollectingReporter::default());
        r.render_async(empty_scene(), reporter.clone(), film.clone()).expect("start");
        assert_eq!(r.render_async(empty_scene(), reporter, film), Err(RenderError::AlreadyRunning));
        assert!(r.stop().is_ok());
        assert!(!r.is_running());

        let bad = RendererSettings { worker_count: 1, task_grid_size: 0 };
        assert!(PathTracerRenderer::new(Arc::new(ConstantIntegrator), Arc::new(IndependentSampler::new(1, 0)), bad).is_err());
    }

    #[test]
    fn test_drop_stops_a_running_render() {
        let film = Arc::new(Film::with_filter(256, 256, Arc::new(BoxFilter::new(0.5).expect("filter"))));
        let reporter = Arc::new(CollectingReporter::default());
        let mut r = renderer(Arc::new(ConstantIntegrator), 2, 8);
        r.render_async(empty_scene(), reporter.clone(), film).expect("start");
        assert!(r.is_running());
        drop(r);

        // Workers were joined and the run was closed out like an explicit stop.
        let messages = reporter.messages.lock().expect("lock");
        assert!(messages.iter().any(|m| m.starts_with("total time") && m.ends_with("(stopped)")));
    }

    #[test]
    fn test_worker_panics_are_reported() {
        let film = Arc::new(Film::with_filter(8, 8, Arc::new(BoxFilter::new(0.5).expect("filter"))));
        let reporter = Arc::new(CollectingReporter::default());
        let mut r = renderer(Arc::new(PanickingIntegrator), 2, 4);
        assert!(r.render(empty_scene(), reporter.clone(), film).is_ok());

        let messages = reporter.messages.lock().expect("lock");
        let faults = messages.iter().filter(|m| m.contains("shading blew up")).count();
        assert_eq!(faults, 2);
        assert!(messages.iter().any(|m| m.starts_with("total time")));
    }

    #[test]
    fn test_task_seed_depends_only_on_origin() {
        let a = GridTask { x_beg: 32, x_end: 64, y_beg: 0, y_end: 32 };
        let b = GridTask { x_beg: 32, x_end: 40, y_beg: 0, y_end: 9 };
        let c = GridTask { x_beg: 0, x_end: 32, y_beg: 32, y_end: 64 };
        assert_eq!(task_seed(7, &a), task_seed(7, &b));
        assert_ne!(task_seed(7, &a), task_seed(7, &c));
        assert_ne!(task_seed(7, &a), task_seed(8, &a));
    }
}
