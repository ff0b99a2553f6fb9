// Copyright @yucwang 2026

use std::sync::{ Arc, Mutex };

use crate::core::config::FilmSettings;
use crate::core::error::ConstructionError;
use crate::core::filter::FilmFilter;
use crate::filters::create_filter;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// First-hit attributes recorded alongside radiance.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GBufferPixel {
    pub albedo: RGBSpectrum,
    pub normal: Vector3f,
    pub depth: Float,
}

/// Channel storage shared by `Film` and `FilmGrid`.
#[derive(Debug, Clone)]
struct Channels {
    width: usize,
    height: usize,
    value: Vec<RGBSpectrum>,
    weight: Vec<Float>,
    albedo: Vec<RGBSpectrum>,
    normal: Vec<Vector3f>,
    depth: Vec<Float>,
}

impl Channels {
    fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            value: vec![RGBSpectrum::default(); n],
            weight: vec![0.0; n],
            albedo: vec![RGBSpectrum::default(); n],
            normal: vec![Vector3f::zeros(); n],
            depth: vec![0.0; n],
        }
    }

    fn splat(&mut self, idx: usize, value: &RGBSpectrum, gpixel: &GBufferPixel, w: Float) {
        self.value[idx] += *value * w;
        self.weight[idx] += w;
        self.albedo[idx] += gpixel.albedo * w;
        self.normal[idx] += gpixel.normal * w;
        self.depth[idx] += gpixel.depth * w;
    }

    fn resolve<F: Fn(usize) -> Vector3f>(&self, texel: F) -> Bitmap {
        let mut bitmap = Bitmap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let w = self.weight[idx];
                if w > 0.0 {
                    bitmap[(x, y)] = texel(idx) / w;
                }
            }
        }
        bitmap
    }
}

/// Accumulation window for one render task.
///
/// Pixels `[x_beg, x_end) x [y_beg, y_end)` are owned by the grid. Samples are
/// drawn from a window grown by the filter radius so that border pixels get
/// their full filter support.
pub struct FilmGrid {
    x_beg: usize,
    x_end: usize,
    y_beg: usize,
    y_end: usize,
    sample_x: (i64, i64),
    sample_y: (i64, i64),
    filter: Arc<dyn FilmFilter>,
    channels: Channels,
}

impl FilmGrid {
    fn new(x_beg: usize, x_end: usize, y_beg: usize, y_end: usize, filter: Arc<dyn FilmFilter>) -> Self {
        let r = filter.radius();
        let sample_x = ((x_beg as Float + 0.5 - r).floor() as i64, (x_end as Float - 0.5 + r).ceil() as i64);
        let sample_y = ((y_beg as Float + 0.5 - r).floor() as i64, (y_end as Float - 0.5 + r).ceil() as i64);
        Self {
            x_beg, x_end, y_beg, y_end,
            sample_x, sample_y,
            channels: Channels::new(x_end - x_beg, y_end - y_beg),
            filter,
        }
    }

    /// Pixel range `[begin, end)` to draw samples from along x. May leave the film.
    pub fn sample_x_range(&self) -> (i64, i64) {
        self.sample_x
    }

    pub fn sample_y_range(&self) -> (i64, i64) {
        self.sample_y
    }

    pub fn pixel_count(&self) -> usize {
        (self.x_end - self.x_beg) * (self.y_end - self.y_beg)
    }

    /// Splats a sample at continuous film position `pos` (pixel units).
    ///
    /// Pixel `x` (centre `c = x + 0.5`) receives samples with `pos` in
    /// `[c - r, c + r)`, so a sample on a shared boundary lands in one pixel only.
    pub fn add_sample(&mut self, pos: &Vector2f, value: &RGBSpectrum, gpixel: &GBufferPixel, w: Float) {
        let r = self.filter.radius();
        let x_lo = ((pos.x - r - 0.5).floor() as i64 + 1).max(self.x_beg as i64);
        let y_lo = ((pos.y - r - 0.5).floor() as i64 + 1).max(self.y_beg as i64);
        let x_hi = ((pos.x + r - 0.5).floor() as i64 + 1).min(self.x_end as i64);
        let y_hi = ((pos.y + r - 0.5).floor() as i64 + 1).min(self.y_end as i64);

        for y in y_lo..y_hi {
            let dy = y as Float + 0.5 - pos.y;
            if dy <= -r || dy > r {
                continue;
            }
            for x in x_lo..x_hi {
                let dx = x as Float + 0.5 - pos.x;
                if dx <= -r || dx > r {
                    continue;
                }
                let weight = w * self.filter.eval(dx.abs(), dy.abs());
                let lx = x as usize - self.x_beg;
                let ly = y as usize - self.y_beg;
                let idx = ly * self.channels.width + lx;
                self.channels.splat(idx, value, gpixel, weight);
            }
        }
    }
}

/// Shared accumulation buffer. Grids are merged under a mutex.
pub struct Film {
    width: usize,
    height: usize,
    filter: Arc<dyn FilmFilter>,
    channels: Mutex<Channels>,
}

impl Film {
    pub fn new(settings: &FilmSettings) -> Result<Self, ConstructionError> {
        settings.validate()?;
        Ok(Self::with_filter(settings.width, settings.height, create_filter(&settings.filter)?))
    }

    pub fn with_filter(width: usize, height: usize, filter: Arc<dyn FilmFilter>) -> Self {
        Self { width, height, filter, channels: Mutex::new(Channels::new(width, height)) }
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Creates a grid over pixels `[x_beg, x_end) x [y_beg, y_end)`, clipped to the film.
    pub fn new_grid(&self, x_beg: usize, x_end: usize, y_beg: usize, y_end: usize) -> FilmGrid {
        let x_end = x_end.min(self.width);
        let y_end = y_end.min(self.height);
        FilmGrid::new(x_beg.min(x_end), x_end, y_beg.min(y_end), y_end, self.filter.clone())
    }

    pub fn merge_grid(&self, grid: &FilmGrid) {
        let mut dst = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let src = &grid.channels;
        for ly in 0..src.height {
            for lx in 0..src.width {
                let s = ly * src.width + lx;
                let d = (ly + grid.y_beg) * self.width + lx + grid.x_beg;
                dst.value[d] += src.value[s];
                dst.weight[d] += src.weight[s];
                dst.albedo[d] += src.albedo[s];
                dst.normal[d] += src.normal[s];
                dst.depth[d] += src.depth[s];
            }
        }
    }

    pub fn clear(&self) {
        let mut dst = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        *dst = Channels::new(self.width, self.height);
    }

    pub fn image(&self) -> Bitmap {
        let c = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        c.resolve(|i| c.value[i].to_vec())
    }

    pub fn albedo_image(&self) -> Bitmap {
        let c = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        c.resolve(|i| c.albedo[i].to_vec())
    }

    pub fn normal_image(&self) -> Bitmap {
        let c = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        c.resolve(|i| c.normal[i])
    }

    pub fn depth_image(&self) -> Bitmap {
        let c = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        c.resolve(|i| Vector3f::repeat(c.depth[i]))
    }

    /// Total filter weight over the film, mostly for diagnostics.
    pub fn total_weight(&self) -> Float {
        let c = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        c.weight.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::box_filter::BoxFilter;
    use crate::filters::gaussian::GaussianFilter;

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() < tol, "expected {} ~ {}", a, b);
    }

    #[test]
    fn test_grid_window_grows_by_radius() {
        let film = Film::with_filter(16, 16, Arc::new(GaussianFilter::new(1.5, 2.0).expect("filter")));
        let grid = film.new_grid(4, 8, 0, 4);
        assert_eq!(grid.sample_x_range(), (3, 9));
        assert_eq!(grid.sample_y_range(), (-1, 5));

        let film = Film::with_filter(16, 16, Arc::new(BoxFilter::new(0.5).expect("filter")));
        let grid = film.new_grid(4, 8, 0, 4);
        assert_eq!(grid.sample_x_range(), (4, 8));
        assert_eq!(film.new_grid(12, 20, 0, 2).pixel_count(), 8);
    }

    #[test]
    fn test_merge_and_resolve() {
        let film = Film::with_filter(4, 2, Arc::new(BoxFilter::new(0.5).expect("filter")));
        let mut grid = film.new_grid(2, 4, 0, 2);
        let g = GBufferPixel { albedo: RGBSpectrum::splat(0.5), normal: Vector3f::new(0.0, 1.0, 0.0), depth: 3.0 };
        grid.add_sample(&Vector2f::new(2.5, 0.5), &RGBSpectrum::splat(2.0), &g, 1.0);
        grid.add_sample(&Vector2f::new(2.6, 0.4), &RGBSpectrum::splat(4.0), &g, 1.0);
        // Outside the grid's own pixels; dropped.
        grid.add_sample(&Vector2f::new(1.5, 0.5), &RGBSpectrum::splat(9.0), &g, 1.0);
        film.merge_grid(&grid);

        let image = film.image();
        assert_close(image[(2, 0)].x, 3.0, 1e-5);
        assert_eq!(image[(1, 0)], Vector3f::zeros());
        assert_close(film.albedo_image()[(2, 0)].y, 0.5, 1e-5);
        assert_close(film.normal_image()[(2, 0)].y, 1.0, 1e-5);
        assert_close(film.depth_image()[(2, 0)].z, 3.0, 1e-5);
        assert_close(film.total_weight(), 2.0, 1e-5);

        film.clear();
        assert_eq!(film.total_weight(), 0.0);
    }

    #[test]
    fn test_wide_filter_splats_into_neighbours() {
        let film = Film::with_filter(4, 1, Arc::new(BoxFilter::new(1.0).expect("filter")));
        let mut grid = film.new_grid(0, 4, 0, 1);
        grid.add_sample(&Vector2f::new(1.3, 0.5), &RGBSpectrum::one(), &GBufferPixel::default(), 1.0);
        film.merge_grid(&grid);
        let image = film.image();
        for x in 0..2 {
            assert_close(image[(x, 0)].x, 1.0, 1e-5);
        }
        assert_eq!(image[(2, 0)], Vector3f::zeros());
        assert_close(film.total_weight(), 2.0, 1e-5);
    }

    #[test]
    fn test_boundary_sample_lands_in_one_pixel() {
        let film = Film::with_filter(4, 4, Arc::new(BoxFilter::new(0.5).expect("filter")));
        let mut grid = film.new_grid(0, 4, 0, 4);
        // Exactly on the corner shared by pixels (1, 1), (2, 1), (1, 2) and (2, 2).
        grid.add_sample(&Vector2f::new(2.0, 2.0), &RGBSpectrum::one(), &GBufferPixel::default(), 1.0);
        film.merge_grid(&grid);
        assert_close(film.total_weight(), 1.0, 1e-6);
        assert_close(film.image()[(2, 2)].x, 1.0, 1e-6);

        // Wider filters cover an integer number of pixels at a boundary too.
        let film = Film::with_filter(6, 1, Arc::new(BoxFilter::new(1.0).expect("filter")));
        let mut grid = film.new_grid(0, 6, 0, 1);
        grid.add_sample(&Vector2f::new(3.0, 0.5), &RGBSpectrum::one(), &GBufferPixel::default(), 1.0);
        film.merge_grid(&grid);
        assert_close(film.total_weight(), 2.0, 1e-6);
    }

    #[test]
    fn test_rejects_empty_resolution() {
        let settings = FilmSettings { width: 0, height: 4, ..FilmSettings::default() };
        assert!(Film::new(&settings).is_err());
        let film = Film::new(&FilmSettings::default()).expect("film");
        assert_eq!(film.resolution(), (640, 480));
    }
}
