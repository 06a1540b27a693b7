//! CPU tessellating surface.
//!
//! Tessellates every fill and stroke with lyon into a flat triangle-list
//! vertex buffer, ready for a GPU upload. Also serves as the headless surface
//! in tests, where "blank" simply means an empty buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use super::color::Color;
use super::traits::{Paint, Surface, Viewport};

/// Tolerance for curve flattening. Particles are only a few pixels wide.
const TOLERANCE: f32 = 0.1;

/// Per-vertex data: position plus straight RGBA.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 6;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn placed(local: Vec2, transform: &Affine2, color: Color) -> Self {
        let p = transform.transform_point2(local);
        Self {
            x: p.x,
            y: p.y,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

struct FillVertexCtor {
    transform: Affine2,
    color: Color,
}

impl FillVertexConstructor<VectorVertex> for FillVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        let pos = vertex.position();
        VectorVertex::placed(Vec2::new(pos.x, pos.y), &self.transform, self.color)
    }
}

struct StrokeVertexCtor {
    transform: Affine2,
    color: Color,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        let pos = vertex.position();
        VectorVertex::placed(Vec2::new(pos.x, pos.y), &self.transform, self.color)
    }
}

/// Lyon-backed [`Surface`] producing a triangle list.
pub struct VectorSurface {
    viewport: Viewport,
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(16384 * VectorVertex::FLOATS),
        }
    }

    /// Number of vertices currently in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Flat float buffer, `FLOATS` per vertex.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Vertex view of the buffer.
    pub fn vertices(&self) -> &[VectorVertex] {
        bytemuck::cast_slice(&self.buffer)
    }

    /// Flush indexed geometry to the flat buffer as triangle list.
    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = &self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }
}

impl Surface for VectorSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clear();
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    // Glow is a rasterizer effect; the triangle list carries only the solid fill.
    fn fill_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint) {
        let ctor = FillVertexCtor {
            transform: *transform,
            color: paint.effective_color(),
        };
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut self.geometry, ctor),
        );

        match result {
            Ok(()) => self.flush_geometry(),
            Err(err) => {
                log::debug!("fill tessellation failed: {:?}", err);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint, line_width: f32) {
        let ctor = StrokeVertexCtor {
            transform: *transform,
            color: paint.effective_color(),
        };
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(TOLERANCE).with_line_width(line_width),
            &mut BuffersBuilder::new(&mut self.geometry, ctor),
        );

        match result {
            Ok(()) => self.flush_geometry(),
            Err(err) => {
                log::debug!("stroke tessellation failed: {:?}", err);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::math::point;
    use std::mem::size_of;

    fn square(side: f32) -> Path {
        let mut builder = Path::builder();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(side, 0.0));
        builder.line_to(point(side, side));
        builder.line_to(point(0.0, side));
        builder.close();
        builder.build()
    }

    #[test]
    fn vector_vertex_is_24_bytes() {
        assert_eq!(size_of::<VectorVertex>(), 24);
        assert_eq!(VectorVertex::STRIDE_BYTES, 24);
    }

    #[test]
    fn fill_square_produces_two_triangles() {
        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        surface.fill_path(&square(10.0), &Affine2::IDENTITY, &Paint::new(Color::WHITE, 1.0));
        assert_eq!(surface.vertex_count(), 6);
    }

    #[test]
    fn transform_places_vertices() {
        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        let t = Affine2::from_translation(Vec2::new(50.0, 40.0));
        surface.fill_path(&square(10.0), &t, &Paint::new(Color::WHITE, 1.0));
        for v in surface.vertices() {
            assert!(v.x >= 50.0 - 1e-4 && v.x <= 60.0 + 1e-4, "x = {}", v.x);
            assert!(v.y >= 40.0 - 1e-4 && v.y <= 50.0 + 1e-4, "y = {}", v.y);
        }
    }

    #[test]
    fn paint_alpha_reaches_vertices() {
        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        surface.fill_path(&square(10.0), &Affine2::IDENTITY, &Paint::new(Color::WHITE, 0.5));
        assert!(surface.vertices().iter().all(|v| v.a == 0.5));
    }

    #[test]
    fn stroke_open_line_produces_vertices() {
        let mut builder = Path::builder();
        builder.begin(point(-3.0, 0.0));
        builder.line_to(point(3.0, 0.0));
        builder.end(false);
        let path = builder.build();

        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        surface.stroke_path(&path, &Affine2::IDENTITY, &Paint::new(Color::VEIN, 1.0), 1.0);
        assert!(surface.vertex_count() > 0);
    }

    #[test]
    fn clear_and_resize_blank_the_surface() {
        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        surface.fill_path(&square(10.0), &Affine2::IDENTITY, &Paint::new(Color::WHITE, 1.0));
        surface.clear();
        assert!(surface.is_blank());

        surface.fill_path(&square(10.0), &Affine2::IDENTITY, &Paint::new(Color::WHITE, 1.0));
        surface.resize(Viewport::new(320.0, 240.0));
        assert!(surface.is_blank());
        assert_eq!(surface.viewport(), Viewport::new(320.0, 240.0));
    }
}
