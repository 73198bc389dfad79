use crate::shapes::PickVolume;
use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir: dir.normalize_or_zero() }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl Plane {
    pub const GROUND: Plane = Plane { normal: Vec3::Y, point: Vec3::ZERO };

    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self { normal: normal.normalize_or_zero(), point }
    }
}

/// Forward hit of `ray` with `plane`. Rays (nearly) parallel to the plane or pointing away
/// from it miss.
pub fn intersect_ray_plane(ray: &Ray, plane: &Plane) -> Option<Vec3> {
    let denom = plane.normal.dot(ray.dir);
    if denom.abs() < 1e-4 {
        return None;
    }
    let t = (plane.point - ray.origin).dot(plane.normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

pub fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let mut t = -b - sqrt_d;
    if t < 0.0 {
        t = -b + sqrt_d;
    }
    if t < 0.0 {
        return None;
    }
    Some(t)
}

pub fn ray_hit_obb(
    origin: Vec3,
    dir: Vec3,
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    min: Vec3,
    max: Vec3,
) -> Option<f32> {
    if !scale.is_finite() {
        return None;
    }
    let min_scale = 0.0001;
    let scale = Vec3::new(scale.x.abs().max(min_scale), scale.y.abs().max(min_scale), scale.z.abs().max(min_scale));
    let world = Mat4::from_scale_rotation_translation(scale, rotation, translation);
    let inv = world.inverse();
    if !matrix_is_finite(&inv) {
        return None;
    }
    let origin_local = inv.transform_point3(origin);
    let dir_local = inv.transform_vector3(dir);
    if dir_local.length_squared() <= f32::EPSILON {
        return None;
    }
    let dir_local = dir_local.normalize();
    let (t_local, hit_local) = ray_aabb_intersection(origin_local, dir_local, min, max)?;
    if t_local < 0.0 {
        return None;
    }
    let hit_world = world.transform_point3(hit_local);
    Some((hit_world - origin).length())
}

pub fn matrix_is_finite(mat: &Mat4) -> bool {
    mat.to_cols_array().iter().all(|v| v.is_finite())
}

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    let origin_arr = origin.to_array();
    let dir_arr = dir.to_array();
    let min_arr = min.to_array();
    let max_arr = max.to_array();
    for i in 0..3 {
        let o = origin_arr[i];
        let d = dir_arr[i];
        let min_axis = min_arr[i];
        let max_axis = max_arr[i];
        if d.abs() < 1e-6 {
            if o < min_axis || o > max_axis {
                return None;
            }
        } else {
            let inv_d = 1.0 / d;
            let mut t1 = (min_axis - o) * inv_d;
            let mut t2 = (max_axis - o) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    let hit = origin + dir * t_hit;
    Some((t_hit, hit))
}

/// Distance along `ray` to a posed pick volume. Sphere volumes scale by the largest axis.
pub fn ray_hit_volume(ray: &Ray, volume: &PickVolume, translation: Vec3, rotation: Quat, scale: Vec3) -> Option<f32> {
    match volume {
        PickVolume::Sphere { radius } => {
            let max_scale = scale.abs().max_element().max(0.0001);
            ray_sphere_intersection(ray.origin, ray.dir, translation, radius * max_scale)
        }
        PickVolume::Box { min, max } => ray_hit_obb(ray.origin, ray.dir, translation, rotation, scale, *min, *max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_plane_hit_from_above() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = intersect_ray_plane(&ray, &Plane::GROUND).expect("ray hits ground");
        assert!((hit - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn parallel_and_receding_rays_miss_plane() {
        let flat = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::X);
        assert!(intersect_ray_plane(&flat, &Plane::GROUND).is_none());
        let up = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.2));
        assert!(intersect_ray_plane(&up, &Plane::GROUND).is_none());
    }

    #[test]
    fn rotated_box_is_hit_at_its_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let distance = ray_hit_volume(
            &ray,
            &PickVolume::Box { min: Vec3::splat(-0.5), max: Vec3::splat(0.5) },
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            Vec3::ONE,
        )
        .expect("box hit");
        assert!((distance - (10.0 - 0.5 * 2.0_f32.sqrt())).abs() < 1e-3);
    }

    #[test]
    fn sphere_volume_uses_largest_scale() {
        let ray = Ray::new(Vec3::new(0.9, 0.0, 10.0), Vec3::NEG_Z);
        let volume = PickVolume::Sphere { radius: 0.5 };
        assert!(ray_hit_volume(&ray, &volume, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE).is_none());
        assert!(ray_hit_volume(&ray, &volume, Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 2.0, 1.0)).is_some());
    }
}
