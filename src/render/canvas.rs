//! Vector rasterizer: draws a [`VisualTree`] into an RGBA bitmap.
//!
//! Drawing happens in native page coordinates under a uniform
//! `Transform::from_scale(density, density)`, so the same tree rasterizes
//! crisply at any density. Images are the exception: they are resampled to
//! their device-pixel size first and then blitted 1:1.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, LinearGradient, PathBuilder, Pixmap, PixmapPaint,
    SpreadMode, Transform,
};

use super::CaptureOptions;
use super::font::text_path;
use crate::document::resolve::ImageMap;
use crate::error::VizdocError;
use crate::scene::{self, Color, Node, PathSeg, Point, Rect, VisualTree, polar};

/// Fill of a missing image.
const MISSING_TILE: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const MISSING_MARK: Color = Color::rgb(0x9c, 0xa3, 0xaf);

fn sk_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn solid(c: Color) -> tiny_skia::Paint<'static> {
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

fn to_paint(paint: &scene::Paint) -> tiny_skia::Paint<'static> {
    match paint {
        scene::Paint::Solid { color } => solid(*color),
        scene::Paint::Linear { from, to, stops } => {
            let sk_stops = stops
                .iter()
                .map(|s| tiny_skia::GradientStop::new(s.offset, sk_color(s.color)))
                .collect();
            let shader = LinearGradient::new(
                tiny_skia::Point::from_xy(from.x as f32, from.y as f32),
                tiny_skia::Point::from_xy(to.x as f32, to.y as f32),
                sk_stops,
                SpreadMode::Pad,
                Transform::identity(),
            );
            match shader {
                Some(shader) => tiny_skia::Paint {
                    shader,
                    anti_alias: true,
                    ..Default::default()
                },
                // degenerate gradient
                None => solid(stops.first().map(|s| s.color).unwrap_or(Color::TRANSPARENT)),
            }
        }
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Append an arc as cubic Béziers, at most 90° per piece.
fn append_arc(pb: &mut PathBuilder, center: Point, radius: f64, start: f64, end: f64) {
    let sweep = end - start;
    if sweep.abs() < 1e-9 || radius <= 0.0 {
        return;
    }
    let pieces = (sweep.abs() / 90.0).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    let k = 4.0 / 3.0 * (step.to_radians() / 4.0).tan();
    for i in 0..pieces {
        let a0 = start + step * i as f64;
        let a1 = a0 + step;
        let p0 = polar(center, radius, a0);
        let p3 = polar(center, radius, a1);
        let (s0, c0) = a0.to_radians().sin_cos();
        let (s1, c1) = a1.to_radians().sin_cos();
        pb.cubic_to(
            (p0.x - k * radius * s0) as f32,
            (p0.y + k * radius * c0) as f32,
            (p3.x + k * radius * s1) as f32,
            (p3.y - k * radius * c1) as f32,
            p3.x as f32,
            p3.y as f32,
        );
    }
}

fn build_path(path: &scene::Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for seg in &path.segs {
        match *seg {
            PathSeg::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathSeg::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathSeg::Arc {
                center,
                radius,
                start,
                end,
            } => append_arc(&mut pb, center, radius, start, end),
            PathSeg::Close => pb.close(),
        }
    }
    pb.finish()
}

fn rect_path(rect: Rect, radius: f64) -> Option<tiny_skia::Path> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 {
        let sk = tiny_skia::Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        )?;
        return Some(PathBuilder::from_rect(sk));
    }
    let path = scene::Path::new()
        .move_to(Point::new(rect.x + r, rect.y))
        .line_to(Point::new(rect.right() - r, rect.y))
        .arc(Point::new(rect.right() - r, rect.y + r), r, -90.0, 0.0)
        .line_to(Point::new(rect.right(), rect.bottom() - r))
        .arc(Point::new(rect.right() - r, rect.bottom() - r), r, 0.0, 90.0)
        .line_to(Point::new(rect.x + r, rect.bottom()))
        .arc(Point::new(rect.x + r, rect.bottom() - r), r, 90.0, 180.0)
        .line_to(Point::new(rect.x, rect.y + r))
        .arc(Point::new(rect.x + r, rect.y + r), r, 180.0, 270.0)
        .close();
    build_path(&path)
}

// ============================================================================
// IMAGES
// ============================================================================

/// Device-pixel box of a native rect: `(x, y, width, height)`.
fn device_box(rect: Rect, density: f32) -> (i32, i32, u32, u32) {
    let d = density as f64;
    let x = (rect.x * d).round();
    let y = (rect.y * d).round();
    let w = (rect.right() * d).round() - x;
    let h = (rect.bottom() * d).round() - y;
    (x as i32, y as i32, w.max(0.0) as u32, h.max(0.0) as u32)
}

/// Cover-fit `image` into a `w`×`h` premultiplied pixmap.
fn cover_pixmap(image: &image::DynamicImage, w: u32, h: u32) -> Option<Pixmap> {
    let fitted = image.resize_to_fill(w, h, FilterType::Triangle).to_rgba8();
    let mut data = fitted.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, IntSize::from_wh(w, h)?)
}

fn draw_missing(pixmap: &mut Pixmap, rect: Rect, transform: Transform) {
    if let Some(path) = rect_path(rect, 0.0) {
        pixmap.fill_path(&path, &solid(MISSING_TILE), FillRule::Winding, transform, None);
    }
    let cross = scene::Path::new()
        .move_to(Point::new(rect.x, rect.y))
        .line_to(Point::new(rect.right(), rect.bottom()))
        .move_to(Point::new(rect.right(), rect.y))
        .line_to(Point::new(rect.x, rect.bottom()));
    if let Some(path) = build_path(&cross) {
        let stroke = tiny_skia::Stroke {
            width: 2.0,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &solid(MISSING_MARK), &stroke, transform, None);
    }
}

// ============================================================================
// RASTERIZE
// ============================================================================

fn draw_node(pixmap: &mut Pixmap, node: &Node, images: &ImageMap, density: f32, transform: Transform) {
    match node {
        Node::Rect { rect, paint, radius } => {
            if let Some(path) = rect_path(*rect, *radius) {
                pixmap.fill_path(&path, &to_paint(paint), FillRule::Winding, transform, None);
            }
        }
        Node::Circle { center, radius, paint } => {
            if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, *radius as f32) {
                pixmap.fill_path(&path, &to_paint(paint), FillRule::Winding, transform, None);
            }
        }
        Node::Path { path, fill, stroke } => {
            let Some(sk_path) = build_path(path) else {
                return;
            };
            if let Some(fill) = fill {
                pixmap.fill_path(&sk_path, &to_paint(fill), FillRule::Winding, transform, None);
            }
            if let Some(stroke) = stroke {
                let sk_stroke = tiny_skia::Stroke {
                    width: stroke.width as f32,
                    line_cap: LineCap::Round,
                    line_join: LineJoin::Round,
                    ..Default::default()
                };
                pixmap.stroke_path(&sk_path, &solid(stroke.color), &sk_stroke, transform, None);
            }
        }
        Node::Text(text) => {
            if let Some(path) = text_path(text) {
                pixmap.fill_path(&path, &solid(text.color), FillRule::Winding, transform, None);
            }
        }
        Node::Image { rect, source } => {
            let (x, y, w, h) = device_box(*rect, density);
            if w == 0 || h == 0 {
                return;
            }
            match images.get(source).and_then(|img| cover_pixmap(img, w, h)) {
                Some(tile) => pixmap.draw_pixmap(
                    x,
                    y,
                    tile.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                ),
                None => draw_missing(pixmap, *rect, transform),
            }
        }
    }
}

/// Rasterize `tree` with the density, region and background of `opts`.
///
/// The output covers the region `(0, 0)`–`size_override` (or the tree's own
/// size) in native pixels; parts of the region beyond the tree show only the
/// background.
pub fn rasterize(tree: &VisualTree, images: &ImageMap, opts: &CaptureOptions) -> Result<RgbaImage, VizdocError> {
    if !(opts.density.is_finite() && opts.density > 0.0) {
        return Err(VizdocError::Image(format!("invalid density {}", opts.density)));
    }
    let region = opts.size_override.unwrap_or(tree.size);
    let (width, height) = region.at_density(opts.density);
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| VizdocError::Image(format!("cannot allocate {}x{} canvas", width, height)))?;
    pixmap.fill(sk_color(opts.background.unwrap_or(tree.background)));

    let transform = Transform::from_scale(opts.density, opts.density);
    for node in &tree.nodes {
        draw_node(&mut pixmap, node, images, opts.density, transform);
    }

    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}
