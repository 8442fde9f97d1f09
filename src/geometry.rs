//! Platonic polyhedra, optionally subdivided towards a sphere.

use std::collections::BTreeSet;

use glam::Vec3;

/// Welded vertex positions plus triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// Floats per vertex in [`Geometry::flat_shaded`]: position then normal.
pub const FLAT_STRIDE: usize = 6;

/// The shape kinds floaters cycle through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Octahedron,
    Tetrahedron,
    Icosahedron,
    Dodecahedron,
}

impl ShapeKind {
    pub const CATALOG: [ShapeKind; 4] = [
        ShapeKind::Octahedron,
        ShapeKind::Tetrahedron,
        ShapeKind::Icosahedron,
        ShapeKind::Dodecahedron,
    ];

    /// Round-robin pick for the `index`-th floater.
    pub fn for_index(index: usize) -> Self {
        Self::CATALOG[index % Self::CATALOG.len()]
    }

    pub fn build(self, radius: f32) -> Geometry {
        match self {
            ShapeKind::Octahedron => Geometry::octahedron(radius, 0),
            ShapeKind::Tetrahedron => Geometry::tetrahedron(radius, 0),
            ShapeKind::Icosahedron => Geometry::icosahedron(radius, 0),
            ShapeKind::Dodecahedron => Geometry::dodecahedron(radius, 0),
        }
    }
}

impl Geometry {
    pub fn tetrahedron(radius: f32, detail: u32) -> Self {
        #[rustfmt::skip]
        let verts = [
            1.0, 1.0, 1.0,   -1.0, -1.0, 1.0,   -1.0, 1.0, -1.0,   1.0, -1.0, -1.0,
        ];
        let faces = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];
        Self::polyhedron(&verts, &faces, radius, detail)
    }

    pub fn octahedron(radius: f32, detail: u32) -> Self {
        #[rustfmt::skip]
        let verts = [
            1.0, 0.0, 0.0,   -1.0, 0.0, 0.0,   0.0, 1.0, 0.0,
            0.0, -1.0, 0.0,   0.0, 0.0, 1.0,   0.0, 0.0, -1.0,
        ];
        #[rustfmt::skip]
        let faces = [
            0, 2, 4,   0, 4, 3,   0, 3, 5,   0, 5, 2,
            1, 2, 5,   1, 5, 3,   1, 3, 4,   1, 4, 2,
        ];
        Self::polyhedron(&verts, &faces, radius, detail)
    }

    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let t = (1.0 + 5f32.sqrt()) / 2.0;
        #[rustfmt::skip]
        let verts = [
            -1.0, t, 0.0,   1.0, t, 0.0,   -1.0, -t, 0.0,   1.0, -t, 0.0,
            0.0, -1.0, t,   0.0, 1.0, t,   0.0, -1.0, -t,   0.0, 1.0, -t,
            t, 0.0, -1.0,   t, 0.0, 1.0,   -t, 0.0, -1.0,   -t, 0.0, 1.0,
        ];
        #[rustfmt::skip]
        let faces = [
            0, 11, 5,   0, 5, 1,   0, 1, 7,   0, 7, 10,   0, 10, 11,
            1, 5, 9,   5, 11, 4,   11, 10, 2,   10, 7, 6,   7, 1, 8,
            3, 9, 4,   3, 4, 2,   3, 2, 6,   3, 6, 8,   3, 8, 9,
            4, 9, 5,   2, 4, 11,   6, 2, 10,   8, 6, 7,   9, 8, 1,
        ];
        Self::polyhedron(&verts, &faces, radius, detail)
    }

    pub fn dodecahedron(radius: f32, detail: u32) -> Self {
        let t = (1.0 + 5f32.sqrt()) / 2.0;
        let r = 1.0 / t;
        #[rustfmt::skip]
        let verts = [
            -1.0, -1.0, -1.0,   -1.0, -1.0, 1.0,   -1.0, 1.0, -1.0,   -1.0, 1.0, 1.0,
            1.0, -1.0, -1.0,   1.0, -1.0, 1.0,   1.0, 1.0, -1.0,   1.0, 1.0, 1.0,
            0.0, -r, -t,   0.0, -r, t,   0.0, r, -t,   0.0, r, t,
            -r, -t, 0.0,   -r, t, 0.0,   r, -t, 0.0,   r, t, 0.0,
            -t, 0.0, -r,   t, 0.0, -r,   -t, 0.0, r,   t, 0.0, r,
        ];
        // Each pentagon is split into three triangles.
        #[rustfmt::skip]
        let faces = [
            3, 11, 7,   3, 7, 15,   3, 15, 13,
            7, 19, 17,   7, 17, 6,   7, 6, 15,
            17, 4, 8,   17, 8, 10,   17, 10, 6,
            8, 0, 16,   8, 16, 2,   8, 2, 10,
            0, 12, 1,   0, 1, 18,   0, 18, 16,
            6, 10, 2,   6, 2, 13,   6, 13, 15,
            2, 16, 18,   2, 18, 3,   2, 3, 13,
            18, 1, 9,   18, 9, 11,   18, 11, 3,
            4, 14, 12,   4, 12, 0,   4, 0, 8,
            11, 9, 5,   11, 5, 19,   11, 19, 7,
            19, 5, 14,   19, 14, 4,   19, 4, 17,
            1, 12, 14,   1, 14, 5,   1, 5, 9,
        ];
        Self::polyhedron(&verts, &faces, radius, detail)
    }

    /// Splits every face into `(detail + 1)^2` triangles and pushes all
    /// vertices out to `radius`.
    fn polyhedron(verts: &[f32], faces: &[u32], radius: f32, detail: u32) -> Self {
        let corner = |i: u32| {
            let i = i as usize * 3;
            Vec3::new(verts[i], verts[i + 1], verts[i + 2])
        };

        let mut welder = Welder::new(radius);
        let cols = detail as usize + 1;

        for face in faces.chunks_exact(3) {
            let (a, b, c) = (corner(face[0]), corner(face[1]), corner(face[2]));

            // grid[i][j]: row i walks from edge ab towards c
            let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let f = i as f32 / cols as f32;
                let aj = a.lerp(c, f);
                let bj = b.lerp(c, f);
                let rows = cols - i;
                let row = (0..=rows)
                    .map(|j| {
                        let v = if rows == 0 {
                            aj
                        } else {
                            aj.lerp(bj, j as f32 / rows as f32)
                        };
                        welder.index(v.normalize() * radius)
                    })
                    .collect();
                grid.push(row);
            }

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let tri = if j % 2 == 0 {
                        [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                    } else {
                        [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                    };
                    welder.triangles.push(tri);
                }
            }
        }

        Self {
            positions: welder.positions,
            triangles: welder.triangles,
        }
    }

    /// Unique undirected edges, each as `(low, high)` vertex indices.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut set = BTreeSet::new();
        for &[a, b, c] in &self.triangles {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                set.insert((p.min(q), p.max(q)));
            }
        }
        set.into_iter().collect()
    }

    /// Line-list positions for wireframe drawing.
    pub fn wireframe_lines(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for (a, b) in self.edges() {
            out.extend_from_slice(&self.positions[a as usize].to_array());
            out.extend_from_slice(&self.positions[b as usize].to_array());
        }
        out
    }

    /// Unindexed triangles with one outward normal per face, laid out as
    /// [`FLAT_STRIDE`] floats per vertex.
    pub fn flat_shaded(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.triangles.len() * 3 * FLAT_STRIDE);
        for &[a, b, c] in &self.triangles {
            let (pa, mut pb, mut pc) = (
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            );
            let mut normal = (pb - pa).cross(pc - pa).normalize_or_zero();
            // Every shape here is convex and centred, so outward means away from the origin.
            if normal.dot(pa + pb + pc) < 0.0 {
                std::mem::swap(&mut pb, &mut pc);
                normal = -normal;
            }
            for p in [pa, pb, pc] {
                out.extend_from_slice(&p.to_array());
                out.extend_from_slice(&normal.to_array());
            }
        }
        out
    }
}

/// Merges vertices that subdivision produces once per adjacent face.
struct Welder {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    tolerance_sq: f32,
}

impl Welder {
    fn new(radius: f32) -> Self {
        let tolerance = radius.abs().max(1.0) * 1e-4;
        Self {
            positions: Vec::new(),
            triangles: Vec::new(),
            tolerance_sq: tolerance * tolerance,
        }
    }

    fn index(&mut self, v: Vec3) -> u32 {
        if let Some(i) = self
            .positions
            .iter()
            .position(|p| p.distance_squared(v) <= self.tolerance_sq)
        {
            return i as u32;
        }
        self.positions.push(v);
        (self.positions.len() - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn euler(g: &Geometry) -> i64 {
        g.positions.len() as i64 - g.edges().len() as i64 + g.triangles.len() as i64
    }

    #[test]
    fn base_solids_have_expected_counts() {
        let cases = [
            (Geometry::tetrahedron(1.0, 0), 4, 6, 4),
            (Geometry::octahedron(1.0, 0), 6, 12, 8),
            (Geometry::icosahedron(1.0, 0), 12, 30, 20),
            (Geometry::dodecahedron(1.0, 0), 20, 54, 36),
        ];
        for (g, v, e, f) in cases {
            assert_eq!(g.positions.len(), v);
            assert_eq!(g.edges().len(), e);
            assert_eq!(g.triangles.len(), f);
        }
    }

    #[test]
    fn subdivision_stays_closed_and_spherical() {
        let g = Geometry::icosahedron(10.0, 2);
        assert_eq!(g.triangles.len(), 20 * 9);
        assert_eq!(g.positions.len(), 92);
        assert_eq!(euler(&g), 2);
        for p in &g.positions {
            assert_relative_eq!(p.length(), 10.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn flat_normals_point_outward() {
        for kind in ShapeKind::CATALOG {
            let data = kind.build(2.0).flat_shaded();
            assert_eq!(data.len() % (3 * FLAT_STRIDE), 0);
            for v in data.chunks_exact(FLAT_STRIDE) {
                let p = Vec3::new(v[0], v[1], v[2]);
                let n = Vec3::new(v[3], v[4], v[5]);
                assert!(p.dot(n) > 0.0, "{kind:?} has an inward face");
                assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn wireframe_has_two_endpoints_per_edge() {
        let g = Geometry::octahedron(1.0, 1);
        assert_eq!(g.wireframe_lines().len(), g.edges().len() * 6);
    }

    #[test]
    fn catalog_is_round_robin() {
        let kinds: Vec<_> = (0..5).map(ShapeKind::for_index).collect();
        assert_eq!(kinds[0], kinds[4]);
        assert_ne!(kinds[0], kinds[1]);
        assert_eq!(kinds[3], ShapeKind::Dodecahedron);
    }
}
