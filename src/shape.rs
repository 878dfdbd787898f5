//! Parametric demonstration shapes.

use cgmath::{InnerSpace, Vector2, Vector3};
use std::f32::consts::PI;

use crate::mesh::{Geometry, Vertex};

/// Small step used to estimate tangents by finite differences.
const NUDGE: f32 = 0.01;

/// Sampling of a shape's two-dimensional parameter domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Number of vertices along each axis.
    pub divisions: (u32, u32),

    /// The domain spans `[0, upper_bound]` on each axis.
    pub upper_bound: (f32, f32),

    /// How many times the texture repeats along each axis.
    pub texture_count: (f32, f32),
}

/// A surface defined by a function from a 2D domain into 3D space.
pub trait ParametricSurface {
    /// Returns the domain sampling.
    fn interval(&self) -> Interval;

    /// Maps a point of the domain onto the surface.
    fn evaluate(&self, domain: Vector2<f32>) -> Vector3<f32>;

    /// Sample the surface into a grid of vertices with line and triangle
    /// connectivity.
    fn geometry(&self) -> Geometry {
        let interval = self.interval();
        let (dx, dy) = interval.divisions;
        let slices = (dx.saturating_sub(1), dy.saturating_sub(1));
        let domain = |s: f32, t: f32| {
            Vector2::new(
                s * interval.upper_bound.0 / slices.0.max(1) as f32,
                t * interval.upper_bound.1 / slices.1.max(1) as f32,
            )
        };

        let mut vertices = Vec::with_capacity((dx * dy) as usize);
        for j in 0..dy {
            for i in 0..dx {
                let position = self.evaluate(domain(i as f32, j as f32));

                // Pull edge samples inwards so the tangents stay on the surface.
                let mut s = i as f32;
                let mut t = j as f32;
                if i == 0 {
                    s += NUDGE;
                }
                if i + 1 == dx {
                    s -= NUDGE;
                }
                if j == 0 {
                    t += NUDGE;
                }
                if j + 1 == dy {
                    t -= NUDGE;
                }
                let p = self.evaluate(domain(s, t));
                let u = self.evaluate(domain(s + NUDGE, t)) - p;
                let v = self.evaluate(domain(s, t + NUDGE)) - p;
                let normal = u.cross(v);
                let normal = if normal.magnitude2() > 0.0 {
                    normal.normalize()
                } else {
                    Vector3::unit_z()
                };

                let texcoord = [
                    interval.texture_count.0 * i as f32 / slices.0.max(1) as f32,
                    interval.texture_count.1 * j as f32 / slices.1.max(1) as f32,
                ];

                vertices.push(Vertex {
                    position: position.into(),
                    normal: normal.into(),
                    texcoord,
                });
            }
        }

        let quads = (slices.0 * slices.1) as usize;
        let mut line_indices = Vec::with_capacity(4 * quads);
        let mut triangle_indices = Vec::with_capacity(6 * quads);
        for j in 0..slices.1 {
            for i in 0..slices.0 {
                let vertex = (j * dx + i) as u16;
                let right = vertex + 1;
                let up = vertex + dx as u16;
                let diagonal = up + 1;

                line_indices.extend_from_slice(&[vertex, right, vertex, up]);
                triangle_indices.extend_from_slice(&[vertex, up, right, right, up, diagonal]);
            }
        }

        Geometry {
            vertices,
            line_indices,
            triangle_indices,
        }
    }
}

/// A cone with its apex on the positive Y axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cone {
    pub height: f32,
    pub radius: f32,
}

impl ParametricSurface for Cone {
    fn interval(&self) -> Interval {
        Interval {
            divisions: (20, 20),
            upper_bound: (2.0 * PI, 1.0),
            texture_count: (3.0, 1.0),
        }
    }

    fn evaluate(&self, domain: Vector2<f32>) -> Vector3<f32> {
        let (u, v) = (domain.x, domain.y);
        let r = self.radius * (1.0 - v);
        Vector3::new(r * u.cos(), self.height * (v - 0.5), r * -u.sin())
    }
}

/// A sphere centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub radius: f32,
}

impl ParametricSurface for Sphere {
    fn interval(&self) -> Interval {
        Interval {
            divisions: (20, 20),
            upper_bound: (PI, 2.0 * PI),
            texture_count: (2.0, 4.0),
        }
    }

    fn evaluate(&self, domain: Vector2<f32>) -> Vector3<f32> {
        let (u, v) = (domain.x, domain.y);
        Vector3::new(
            self.radius * u.sin() * v.cos(),
            self.radius * u.cos(),
            self.radius * -u.sin() * v.sin(),
        )
    }
}

/// A torus around the Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Torus {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl ParametricSurface for Torus {
    fn interval(&self) -> Interval {
        Interval {
            divisions: (20, 20),
            upper_bound: (2.0 * PI, 2.0 * PI),
            texture_count: (4.0, 2.0),
        }
    }

    fn evaluate(&self, domain: Vector2<f32>) -> Vector3<f32> {
        let (u, v) = (domain.x, domain.y);
        let ring = self.major_radius + self.minor_radius * v.cos();
        Vector3::new(ring * u.cos(), ring * u.sin(), self.minor_radius * v.sin())
    }
}

/// The closed set of shapes a surface can draw.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Shape {
    Cone,
    #[default]
    Sphere,
    Torus,
}

impl Shape {
    /// Every shape, in index order.
    pub const ALL: [Shape; 3] = [Shape::Cone, Shape::Sphere, Shape::Torus];

    /// Position of the shape in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Generates the shape at its demonstration size.
    pub fn geometry(self) -> Geometry {
        match self {
            Shape::Cone => Cone { height: 3.0, radius: 1.0 }.geometry(),
            Shape::Sphere => Sphere { radius: 1.4 }.geometry(),
            Shape::Torus => Torus { major_radius: 1.4, minor_radius: 0.3 }.geometry(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts_follow_divisions() {
        for shape in Shape::ALL {
            let geometry = shape.geometry();
            assert_eq!(geometry.vertices.len(), 20 * 20, "{:?}", shape);
            assert_eq!(geometry.line_indices.len(), 4 * 19 * 19, "{:?}", shape);
            assert_eq!(geometry.triangle_indices.len(), 6 * 19 * 19, "{:?}", shape);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        for shape in Shape::ALL {
            let geometry = shape.geometry();
            let count = geometry.vertices.len() as u16;
            assert!(geometry.line_indices.iter().all(|&i| i < count));
            assert!(geometry.triangle_indices.iter().all(|&i| i < count));
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for shape in Shape::ALL {
            for vertex in shape.geometry().vertices {
                let normal = Vector3::from(vertex.normal);
                assert!((normal.magnitude() - 1.0).abs() < 1e-3, "{:?}: {:?}", shape, vertex);
            }
        }
    }

    #[test]
    fn sphere_vertices_lie_on_the_radius() {
        let sphere = Sphere { radius: 2.0 };
        for vertex in sphere.geometry().vertices {
            let position = Vector3::from(vertex.position);
            assert!((position.magnitude() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn texcoords_span_the_texture_count() {
        let geometry = Torus { major_radius: 1.0, minor_radius: 0.5 }.geometry();
        let last = geometry.vertices.last().unwrap();
        assert!((last.texcoord[0] - 4.0).abs() < 1e-5);
        assert!((last.texcoord[1] - 2.0).abs() < 1e-5);
        assert_eq!(geometry.vertices[0].texcoord, [0.0, 0.0]);
    }

    #[test]
    fn shape_indices_match_all() {
        for (index, shape) in Shape::ALL.iter().enumerate() {
            assert_eq!(shape.index(), index);
        }
    }
}
