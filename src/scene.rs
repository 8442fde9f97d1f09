//! Arena-backed scene graph.
//!
//! Nodes, geometries and materials live in flat vectors and are addressed by
//! typed indices, so per-entity side data (animation parameters, GPU buffers)
//! can be keyed by handle instead of hanging off the nodes themselves.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::Rgb;
use crate::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local transform. Rotation is Euler angles in radians, applied X then Y then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Edges only, unlit.
    Wireframe,
    /// Flat faces lit by the scene lights.
    Lit,
    /// Screen-facing sprites; `size` is in world units at unit distance.
    Points { size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    pub shading: Shading,
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    /// Flat `x, y, z` triples in local space.
    Points {
        positions: Vec<f32>,
        material: MaterialId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub kind: NodeKind,
    pub transform: Transform,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Default)]
pub struct Lights {
    pub point: Option<PointLight>,
    pub ambient: Option<AmbientLight>,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    pub lights: Lights,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Adds a node under `parent`, or at the root when `None`.
    pub fn add_node(
        &mut self,
        name: &'static str,
        kind: NodeKind,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> NodeId {
        debug_assert!(parent.map_or(true, |p| p.0 < self.nodes.len()));
        self.nodes.push(Node {
            name,
            kind,
            transform,
            parent,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn transform(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0].transform
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Local-to-world matrix, composing every ancestor's transform.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }
}
