use crate::camera3d::Camera3D;
use crate::shapes::{RenderGeometry, SurfaceMaterial};
use glam::{Quat, Vec3};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

/// Scene graph the playground draws into. Nodes are created per entity and disposed exactly
/// once when the entity goes away.
pub trait SceneRenderer {
    fn add_node(&mut self, geometry: &RenderGeometry, material: &SurfaceMaterial) -> RenderId;
    fn set_node_transform(&mut self, id: RenderId, transform: NodeTransform);
    fn remove_node(&mut self, id: RenderId);
    fn render(&mut self, camera: &Camera3D, status: &str);
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    pub geometry: RenderGeometry,
    pub material: SurfaceMaterial,
    pub transform: NodeTransform,
}

/// Renderer that keeps the scene in memory. Used by the headless binary and by tests to
/// observe what would be drawn.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    nodes: BTreeMap<RenderId, RenderNode>,
    disposed: Vec<RenderId>,
    stale_removals: usize,
    frames_rendered: u64,
    last_status: String,
    last_camera: Option<Camera3D>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn disposed(&self) -> &[RenderId] {
        &self.disposed
    }

    /// Removals that targeted an id which was never added or already disposed.
    pub fn stale_removals(&self) -> usize {
        self.stale_removals
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_status(&self) -> &str {
        &self.last_status
    }

    pub fn last_camera(&self) -> Option<&Camera3D> {
        self.last_camera.as_ref()
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn add_node(&mut self, geometry: &RenderGeometry, material: &SurfaceMaterial) -> RenderId {
        self.next_id += 1;
        let id = RenderId(self.next_id);
        self.nodes.insert(
            id,
            RenderNode { geometry: geometry.clone(), material: *material, transform: NodeTransform::default() },
        );
        id
    }

    fn set_node_transform(&mut self, id: RenderId, transform: NodeTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
        }
    }

    fn remove_node(&mut self, id: RenderId) {
        if self.nodes.remove(&id).is_some() {
            self.disposed.push(id);
        } else {
            log::warn!("[renderer] remove of unknown node {}", id.0);
            self.stale_removals += 1;
        }
    }

    fn render(&mut self, camera: &Camera3D, status: &str) {
        self.frames_rendered += 1;
        if self.last_status != status {
            self.last_status.clear();
            self.last_status.push_str(status);
        }
        self.last_camera = Some(camera.clone());
    }
}

/// Renderer handle shared between a playground and an observer, e.g. a test.
impl<R: SceneRenderer + ?Sized> SceneRenderer for std::rc::Rc<std::cell::RefCell<R>> {
    fn add_node(&mut self, geometry: &RenderGeometry, material: &SurfaceMaterial) -> RenderId {
        self.borrow_mut().add_node(geometry, material)
    }

    fn set_node_transform(&mut self, id: RenderId, transform: NodeTransform) {
        self.borrow_mut().set_node_transform(id, transform)
    }

    fn remove_node(&mut self, id: RenderId) {
        self.borrow_mut().remove_node(id)
    }

    fn render(&mut self, camera: &Camera3D, status: &str) {
        self.borrow_mut().render(camera, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    #[test]
    fn nodes_are_disposed_once() {
        let mut renderer = HeadlessRenderer::new();
        let descriptor = ShapeKind::Cube.descriptor(0x336699);
        let id = renderer.add_node(&descriptor.render, &descriptor.material);
        renderer.set_node_transform(
            id,
            NodeTransform { translation: Vec3::Y, rotation: Quat::IDENTITY, scale: Vec3::new(1.2, 0.6, 1.2) },
        );
        assert_eq!(renderer.node(id).map(|n| n.transform.scale.y), Some(0.6));
        renderer.remove_node(id);
        renderer.remove_node(id);
        assert_eq!(renderer.disposed(), &[id]);
        assert_eq!(renderer.stale_removals(), 1);
        assert_eq!(renderer.node_count(), 0);
    }
}
