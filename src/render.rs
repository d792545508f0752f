use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::time::Instant;

use log::{ debug, info };
use rayon::prelude::*;

use crate::color::Color;
use crate::consts::PROGRESS_STEP;
use crate::context::RenderContext;
use crate::error::{ RenderError, TraceError };
use crate::frame::FrameBuffer;

/// Reports render progress as a percentage of finished rows.
///
/// Percentages are logged in steps of `PROGRESS_STEP` and only ever
/// increase, even when rows finish out of order on several threads.
struct Progress {
    total: usize,
    done: AtomicUsize,
    reported: AtomicUsize,
}

impl Progress {
    fn new(total: usize) -> Progress {
        Progress {
            total: total.max(1),
            done: AtomicUsize::new(0),
            reported: AtomicUsize::new(0),
        }
    }

    fn row_finished(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let percent = done * 100 / self.total;
        let step = percent / PROGRESS_STEP * PROGRESS_STEP;

        if step > self.reported.fetch_max(step, Ordering::Relaxed) {
            info!("{}% complete", step);
        }
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map_or(false, |c| c.load(Ordering::Relaxed))
}

/// Traces one image row, row 0 being the top of the frame.
///
/// The camera counts rows up from the bottom, so the row is flipped before
/// casting rays. Colors are clamped as they are stored.
fn render_row(ctx: &RenderContext, row: usize, pixels: &mut [Color])
    -> Result<(), RenderError> {
    let py = ctx.camera.vsize - 1 - row;

    for (x, pixel) in pixels.iter_mut().enumerate() {
        let color = ctx.color_for_pixel(x, py).map_err(|source| {
            debug!("pixel ({}, {}) failed: {}", x, row, source);
            RenderError::Trace { x, y: row, source }
        })?;

        *pixel = color.clamp();
    }

    Ok(())
}

/// The frame dimensions, rejecting a camera with an empty image.
///
/// `Camera::new` refuses zero sizes, but a camera built field by field may
/// still carry one.
fn frame_size(ctx: &RenderContext) -> Result<(usize, usize), RenderError> {
    let (width, height) = (ctx.camera.hsize, ctx.camera.vsize);

    if width == 0 || height == 0 {
        return Err(RenderError::Trace {
            x: 0,
            y: 0,
            source: TraceError::InvalidCamera(format!(
                "image size must be positive, got {}x{}", width, height
            )),
        });
    }

    Ok((width, height))
}

fn log_summary(ctx: &RenderContext, started: Instant) {
    let stats = ctx.stats();
    info!("rendered {}x{} in {:.2?}: {} primary, {} reflection, {} shadow rays",
        ctx.camera.hsize, ctx.camera.vsize, started.elapsed(),
        stats.primary_rays(), stats.reflection_rays(), stats.shadow_rays());
}

/// Renders a frame on the calling thread, one row at a time.
pub fn render(ctx: &RenderContext) -> Result<FrameBuffer, RenderError> {
    let (width, height) = frame_size(ctx)?;
    let started = Instant::now();
    let mut frame = FrameBuffer::new(width, height);
    let progress = Progress::new(height);

    for (row, pixels) in frame.pixels_mut().chunks_mut(width).enumerate() {
        render_row(ctx, row, pixels)?;
        progress.row_finished();
    }

    log_summary(ctx, started);
    Ok(frame)
}

/// Renders a frame with rows spread across worker threads.
///
/// Each worker writes only the rows it was handed, so the frame needs no
/// locking. Setting `cancel` stops the render before the next row starts and
/// yields `RenderError::Cancelled`. The worker count comes from
/// `config.threads`; 0 uses rayon's global pool.
pub fn render_parallel(ctx: &RenderContext, cancel: Option<&AtomicBool>)
    -> Result<FrameBuffer, RenderError> {
    if ctx.config.threads == 0 {
        return render_rows_parallel(ctx, cancel);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.config.threads)
        .build()
        .map_err(|e| RenderError::ThreadPool(e.to_string()))?;

    info!("rendering using {} threads", ctx.config.threads);
    pool.install(|| render_rows_parallel(ctx, cancel))
}

fn render_rows_parallel(ctx: &RenderContext, cancel: Option<&AtomicBool>)
    -> Result<FrameBuffer, RenderError> {
    let (width, height) = frame_size(ctx)?;
    let started = Instant::now();
    let mut frame = FrameBuffer::new(width, height);
    let progress = Progress::new(height);

    frame.pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .try_for_each(|(row, pixels)| {
            if is_cancelled(cancel) {
                return Err(RenderError::Cancelled);
            }

            render_row(ctx, row, pixels)?;
            progress.row_finished();
            Ok(())
        })?;

    log_summary(ctx, started);
    Ok(frame)
}

#[cfg(test)]
fn checkerboard_context(threads: usize) -> RenderContext {
    use crate::camera::Camera;
    use crate::config::RenderConfig;
    use crate::geometry::Primitive;
    use crate::light::Material;
    use crate::pattern::checker;
    use crate::vector::Vector3;
    use crate::world::Scene;

    // Only ambient light, so each cell shows its pattern color exactly
    let ground = Material {
        diffuse_color: checker(Color::red(), Color::blue(), 2.0),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };

    let mut scene = Scene::empty();
    scene.add(Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        ground).unwrap());

    // Looking straight down from 2 units up with a 90 degree view, one
    // pixel covers exactly one checker cell.
    let camera = Camera::new(Vector3::new(10.0, 2.0, 10.0),
        Vector3::new(0.0, -1.0, 0.0), 90.0, 8, 8).unwrap();

    let config = RenderConfig { threads, ..Default::default() };
    RenderContext::new(scene, camera, config)
}

#[test]
fn ground_plane_renders_checkerboard() {
    let ctx = checkerboard_context(0);
    let frame = render(&ctx).unwrap();

    for row in 0..8 {
        for col in 0..8 {
            let expected = if (col + row) % 2 == 0 {
                Color::red()
            } else {
                Color::blue()
            };
            assert_eq!(frame.read_pixel(col, row).unwrap(), expected,
                "pixel ({}, {})", col, row);
        }
    }

    assert_eq!(ctx.stats().primary_rays(), 64);
}

#[test]
fn checkerboard_cell_doubles_across_axis() {
    use crate::camera::Camera;
    use crate::vector::Vector3;

    // Centered on the origin the pixel centers run from -1.75 to 1.75. Both
    // +0.25 and -0.25 truncate into cell 0, so the middle two columns (and
    // rows) share a parity.
    let ctx = checkerboard_context(0);
    let camera = Camera::new(Vector3::new(0.0, 2.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0), 90.0, 8, 8).unwrap();
    let ctx = RenderContext::new(ctx.scene, camera, ctx.config);
    let frame = render(&ctx).unwrap();

    let parity = [1, 0, 1, 0, 0, 1, 0, 1];
    for row in 0..8 {
        for col in 0..8 {
            let expected = if parity[col] == parity[row] {
                Color::red()
            } else {
                Color::blue()
            };
            assert_eq!(frame.read_pixel(col, row).unwrap(), expected,
                "pixel ({}, {})", col, row);
        }
    }

    assert_eq!(frame.read_pixel(3, 0), frame.read_pixel(4, 0));
}

#[test]
fn empty_image_is_rejected() {
    use crate::camera::Camera;
    use crate::config::RenderConfig;
    use crate::world::Scene;

    let camera = Camera { vsize: 2, ..Camera::default() };
    let ctx = RenderContext::new(Scene::empty(), camera, RenderConfig::default());

    assert!(matches!(render(&ctx), Err(RenderError::Trace {
        source: TraceError::InvalidCamera(_), ..
    })));
    assert!(matches!(render_parallel(&ctx, None), Err(RenderError::Trace {
        source: TraceError::InvalidCamera(_), ..
    })));
    assert_eq!(ctx.stats().primary_rays(), 0);
}

#[test]
fn progress_never_goes_backwards() {
    let progress = Progress::new(10);
    let mut last = 0;

    for _ in 0..10 {
        progress.row_finished();
        let reported = progress.reported.load(Ordering::Relaxed);
        assert!(reported >= last);
        last = reported;
    }
    assert_eq!(last, 100);

    // A row finishing late on a slow thread reports a smaller step
    let progress = Progress::new(10);
    progress.reported.store(70, Ordering::Relaxed);
    progress.row_finished();
    assert_eq!(progress.reported.load(Ordering::Relaxed), 70);
}

#[test]
fn parallel_render_matches_sequential() {
    let sequential = render(&checkerboard_context(0)).unwrap();
    let parallel = render_parallel(&checkerboard_context(3), None).unwrap();
    let global = render_parallel(&checkerboard_context(0), None).unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(sequential, global);
}

#[test]
fn cancelled_render_stops() {
    let ctx = checkerboard_context(2);
    let cancel = AtomicBool::new(true);

    assert_eq!(render_parallel(&ctx, Some(&cancel)), Err(RenderError::Cancelled));
    assert_eq!(ctx.stats().primary_rays(), 0);
}

#[test]
fn top_row_of_frame_is_top_of_view() {
    use crate::camera::Camera;
    use crate::config::RenderConfig;
    use crate::geometry::Primitive;
    use crate::light::Material;
    use crate::vector::Vector3;
    use crate::world::Scene;

    let glow = Material {
        emissive: Color::green(),
        ambient: 0.0,
        ..Default::default()
    };

    let mut scene = Scene::empty();
    scene.add(Primitive::sphere(Vector3::new(0.0, 2.0, -5.0), 1.0, glow)
        .unwrap());

    let camera = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        90.0, 5, 5).unwrap();
    let ctx = RenderContext::new(scene, camera, RenderConfig::default());

    let frame = render(&ctx).unwrap();
    assert_eq!(frame.read_pixel(2, 1).unwrap(), Color::green());
    assert_eq!(frame.read_pixel(2, 3).unwrap(), Color::black());
}

#[test]
fn bright_colors_are_clamped() {
    use crate::camera::Camera;
    use crate::config::RenderConfig;
    use crate::geometry::Primitive;
    use crate::light::Material;
    use crate::vector::Vector3;
    use crate::world::Scene;

    let hot = Material {
        emissive: Color::rgb(3.0, 0.5, 0.0),
        ambient: 0.0,
        ..Default::default()
    };

    let mut scene = Scene::empty();
    scene.add(Primitive::sphere(Vector3::new(0.0, 0.0, -5.0), 2.0, hot).unwrap());

    let camera = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        30.0, 3, 3).unwrap();
    let ctx = RenderContext::new(scene, camera, RenderConfig::default());

    let frame = render(&ctx).unwrap();
    assert_eq!(frame.read_pixel(1, 1).unwrap(), Color::rgb(1.0, 0.5, 0.0));
}
