use glam::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Sphere,
    Tetra,
    Tube,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [ShapeKind::Cube, ShapeKind::Sphere, ShapeKind::Tetra, ShapeKind::Tube];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Cube => "cube",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Tetra => "tetra",
            ShapeKind::Tube => "tube",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "cube" => Some(ShapeKind::Cube),
            "sphere" => Some(ShapeKind::Sphere),
            "tetra" | "triangle" | "tetrahedron" => Some(ShapeKind::Tetra),
            "tube" => Some(ShapeKind::Tube),
            _ => None,
        }
    }

    pub fn descriptor(self, color: u32) -> ShapeDescriptor {
        match self {
            ShapeKind::Cube => ShapeDescriptor {
                kind: self,
                collider: ColliderGeometry::Cuboid { half_extents: Vec3::splat(0.5) },
                contact: ContactMaterial { restitution: 0.8, friction: 0.5, density: 1.0 },
                damping: Damping { linear: 0.3, angular: 0.5 },
                render: RenderGeometry::Box { size: Vec3::ONE, segments: 4 },
                material: SurfaceMaterial { color, metalness: 0.2, roughness: 0.45, double_sided: false },
                half_extent: 0.5,
            },
            ShapeKind::Sphere => ShapeDescriptor {
                kind: self,
                collider: ColliderGeometry::Ball { radius: 0.5 },
                contact: ContactMaterial { restitution: 0.95, friction: 0.3, density: 1.0 },
                damping: Damping { linear: 0.1, angular: 0.3 },
                render: RenderGeometry::Sphere { radius: 0.5, width_segments: 32, height_segments: 32 },
                material: SurfaceMaterial { color, metalness: 0.25, roughness: 0.4, double_sided: false },
                half_extent: 0.5,
            },
            ShapeKind::Tetra => ShapeDescriptor {
                kind: self,
                collider: ColliderGeometry::ConvexHull {
                    points: vec![
                        Vec3::new(0.0, 0.6, 0.0),
                        Vec3::new(-0.5, -0.3, 0.5),
                        Vec3::new(0.5, -0.3, 0.5),
                        Vec3::new(0.0, -0.3, -0.5),
                    ],
                },
                contact: ContactMaterial { restitution: 0.75, friction: 0.6, density: 1.0 },
                damping: Damping { linear: 0.3, angular: 0.5 },
                render: RenderGeometry::Tetrahedron { radius: 0.7 },
                material: SurfaceMaterial { color, metalness: 0.18, roughness: 0.5, double_sided: false },
                half_extent: 0.6,
            },
            ShapeKind::Tube => ShapeDescriptor {
                kind: self,
                collider: ColliderGeometry::Capsule { half_height: 0.5, radius: 0.3 },
                contact: ContactMaterial { restitution: 0.85, friction: 0.5, density: 1.0 },
                damping: Damping { linear: 0.3, angular: 0.5 },
                render: RenderGeometry::Tube {
                    path: vec![
                        Vec3::new(0.0, -0.5, 0.0),
                        Vec3::new(0.2, -0.25, 0.1),
                        Vec3::new(-0.1, 0.0, -0.1),
                        Vec3::new(0.15, 0.25, 0.05),
                        Vec3::new(0.0, 0.5, 0.0),
                    ],
                    tubular_segments: 20,
                    radius: 0.15,
                    radial_segments: 16,
                },
                material: SurfaceMaterial { color, metalness: 0.22, roughness: 0.42, double_sided: true },
                half_extent: 0.8,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColliderGeometry {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    ConvexHull { points: Vec<Vec3> },
    Capsule { half_height: f32, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderGeometry {
    Box { size: Vec3, segments: u32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    Tetrahedron { radius: f32 },
    /// Catmull-Rom tube through `path`.
    Tube { path: Vec<Vec3>, tubular_segments: u32, radius: f32, radial_segments: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickVolume {
    Sphere { radius: f32 },
    Box { min: Vec3, max: Vec3 },
}

impl RenderGeometry {
    /// Local-space volume used for pointer hit tests against the rendered mesh.
    pub fn pick_volume(&self) -> PickVolume {
        match self {
            RenderGeometry::Box { size, .. } => PickVolume::Box { min: -*size * 0.5, max: *size * 0.5 },
            RenderGeometry::Sphere { radius, .. } => PickVolume::Sphere { radius: *radius },
            RenderGeometry::Tetrahedron { radius } => {
                let h = radius / 3.0_f32.sqrt();
                PickVolume::Box { min: Vec3::splat(-h), max: Vec3::splat(h) }
            }
            RenderGeometry::Tube { path, radius, .. } => {
                let (min, max) = path.iter().fold(
                    (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                    |(min, max), p| (min.min(*p), max.max(*p)),
                );
                if !min.is_finite() || !max.is_finite() {
                    return PickVolume::Sphere { radius: *radius };
                }
                PickVolume::Box { min: min - Vec3::splat(*radius), max: max + Vec3::splat(*radius) }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub color: u32,
    pub metalness: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

/// Everything needed to build one manipulable shape: the physics side (collider, contact
/// material, damping) and the render side (geometry, material).
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub collider: ColliderGeometry,
    pub contact: ContactMaterial,
    pub damping: Damping,
    pub render: RenderGeometry,
    pub material: SurfaceMaterial,
    pub half_extent: f32,
}

pub fn random_color(rng: &mut impl Rng) -> u32 {
    rng.gen_range(0..=0x00ff_ffff)
}

/// Spawn point used by toolbar spawn requests: above the ground near the origin.
pub fn random_spawn_point(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(5.0..7.0), rng.gen_range(-1.0..1.0))
}
