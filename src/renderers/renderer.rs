// Copyright @yucwang 2021

use std::sync::Arc;

use crate::core::error::RenderError;
use crate::core::film::Film;
use crate::core::reporter::ProgressReporter;
use crate::core::scene::Scene;

/// Drives an integrator over a film.
pub trait Renderer {
    /// Starts rendering in the background and returns immediately.
    fn render_async(&mut self,
                    scene: Arc<Scene>,
                    reporter: Arc<dyn ProgressReporter>,
                    film: Arc<Film>) -> Result<(), RenderError>;

    /// Blocks until the running render is done.
    fn join(&mut self) -> Result<(), RenderError>;

    /// Asks the running render to finish early and waits for it.
    fn stop(&mut self) -> Result<(), RenderError>;

    fn render(&mut self,
              scene: Arc<Scene>,
              reporter: Arc<dyn ProgressReporter>,
              film: Arc<Film>) -> Result<(), RenderError> {
        self.render_async(scene, reporter, film)?;
        self.join()
    }
}

/// Pixel rectangle `[x_beg, x_end) x [y_beg, y_end)` rendered by one task.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridTask {
    pub x_beg: usize,
    pub x_end: usize,
    pub y_beg: usize,
    pub y_end: usize,
}

/// Splits the image into square grids in row-major order.
pub fn divide_grids(width: usize, height: usize, grid_size: usize) -> Vec<GridTask> {
    let grid_size = grid_size.max(1);
    let mut tasks = Vec::new();
    let mut y_beg = 0;
    while y_beg < height {
        let y_end = (y_beg + grid_size).min(height);
        let mut x_beg = 0;
        while x_beg < width {
            let x_end = (x_beg + grid_size).min(width);
            tasks.push(GridTask { x_beg, x_end, y_beg, y_end });
            x_beg = x_end;
        }
        y_beg = y_end;
    }
    tasks
}
