use bevy::prelude::*;

use crate::game::camera::RtsCamera;

/// Surface tags. A `Surface` may carry several; hit tests match on any shared bit.
pub mod surfaces {
    pub const NONE: u32 = 0;
    pub const CLICKABLE: u32 = 1 << 0;
    pub const GROUND: u32 = 1 << 1;
    pub const ATTACKABLE: u32 = 1 << 2;
}

/// Makes an entity visible to [`SpatialProbe`] hit tests as a sphere of `radius`,
/// centred `height` above the entity's origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct Surface {
    pub mask: u32,
    pub radius: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(mask: u32, radius: f32) -> Self {
        Self { mask, radius, height: 0.0 }
    }

    /// Lift the hit sphere to the middle of a body standing on the entity's origin.
    pub fn lifted(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
}

/// Result of a hit test. `entity` is `None` for the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub entity: Option<Entity>,
    pub point: Vec3,
}

/// Maps between screen space and the world.
pub trait ScreenProjection: Send + Sync + 'static {
    fn screen_ray(&self, screen: Vec2) -> Option<Ray3d>;
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;
}

/// Orthographic view straight down the Y axis. Screen X follows world X and
/// screen Y follows world Z, scaled by `pixels_per_unit`.
#[derive(Debug, Clone, Copy)]
pub struct TopDownProjection {
    pub pixels_per_unit: f32,
    pub origin: Vec2,
    pub eye_height: f32,
}

impl Default for TopDownProjection {
    fn default() -> Self {
        Self {
            pixels_per_unit: 10.0,
            origin: Vec2::ZERO,
            eye_height: 100.0,
        }
    }
}

impl ScreenProjection for TopDownProjection {
    fn screen_ray(&self, screen: Vec2) -> Option<Ray3d> {
        let ground = (screen - self.origin) / self.pixels_per_unit;
        Some(Ray3d::new(Vec3::new(ground.x, self.eye_height, ground.y), Dir3::NEG_Y))
    }

    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        Some(self.origin + Vec2::new(world.x, world.z) * self.pixels_per_unit)
    }
}

/// Projection through a live Bevy camera.
#[derive(Clone)]
pub struct CameraProjection {
    pub camera: Camera,
    pub transform: GlobalTransform,
}

impl ScreenProjection for CameraProjection {
    fn screen_ray(&self, screen: Vec2) -> Option<Ray3d> {
        self.camera.viewport_to_world(&self.transform, screen).ok()
    }

    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        self.camera.world_to_viewport(&self.transform, world).ok()
    }
}

#[derive(Debug, Clone, Copy)]
struct ProbeTarget {
    entity: Entity,
    center: Vec3,
    radius: f32,
    mask: u32,
}

/// Screen-point to world hit testing against tagged surfaces and the ground plane.
#[derive(Resource)]
pub struct SpatialProbe {
    projection: Box<dyn ScreenProjection>,
    targets: Vec<ProbeTarget>,
}

impl Default for SpatialProbe {
    fn default() -> Self {
        Self::new(TopDownProjection::default())
    }
}

impl SpatialProbe {
    pub fn new(projection: impl ScreenProjection) -> Self {
        Self {
            projection: Box::new(projection),
            targets: Vec::new(),
        }
    }

    pub fn set_projection(&mut self, projection: impl ScreenProjection) {
        self.projection = Box::new(projection);
    }

    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        self.projection.world_to_screen(world)
    }

    /// Nearest surface along the ray through `screen` whose tags intersect `mask`.
    pub fn hit_test(&self, screen: Vec2, mask: u32) -> Option<SurfaceHit> {
        if mask == surfaces::NONE {
            return None;
        }
        let ray = self.projection.screen_ray(screen)?;
        let direction: Vec3 = ray.direction.into();

        let mut closest: Option<(f32, SurfaceHit)> = None;
        for target in self.targets.iter().filter(|t| t.mask & mask != 0) {
            let to_center = target.center - ray.origin;
            let projection = to_center.dot(direction);
            if projection < 0.0 {
                continue;
            }
            let distance_sq = to_center.length_squared() - projection * projection;
            let radius_sq = target.radius * target.radius;
            if distance_sq >= radius_sq {
                continue;
            }
            let t = projection - (radius_sq - distance_sq).sqrt();
            if closest.is_none_or(|(best, _)| t < best) {
                closest = Some((t, SurfaceHit {
                    entity: Some(target.entity),
                    point: ray.origin + direction * t,
                }));
            }
        }

        if mask & surfaces::GROUND != 0 {
            if let Some(t) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y)) {
                if closest.is_none_or(|(best, _)| t < best) {
                    closest = Some((t, SurfaceHit {
                        entity: None,
                        point: ray.origin + direction * t,
                    }));
                }
            }
        }

        closest.map(|(_, hit)| hit)
    }

    fn rebuild<'a>(&mut self, targets: impl Iterator<Item = (Entity, &'a Transform, &'a Surface)>) {
        self.targets.clear();
        self.targets.extend(targets.map(|(entity, transform, surface)| ProbeTarget {
            entity,
            center: transform.translation + Vec3::Y * surface.height,
            radius: surface.radius,
            mask: surface.mask,
        }));
    }
}

/// Snapshot tagged surfaces once per tick so every hit test this tick sees the same world.
pub(super) fn refresh_probe_targets(
    q_surfaces: Query<(Entity, &Transform, &Surface)>,
    mut probe: ResMut<SpatialProbe>,
) {
    probe.rebuild(q_surfaces.iter());
}

/// Windowed: route hit tests through the RTS camera.
pub(super) fn refresh_camera_projection(
    q_camera: Query<(&Camera, &GlobalTransform), With<RtsCamera>>,
    mut probe: ResMut<SpatialProbe>,
) {
    let Ok((camera, transform)) = q_camera.single() else { return };
    probe.set_projection(CameraProjection {
        camera: camera.clone(),
        transform: *transform,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_with(targets: &[(Entity, Vec3, f32, u32)]) -> SpatialProbe {
        let mut probe = SpatialProbe::default();
        probe.targets = targets
            .iter()
            .map(|&(entity, center, radius, mask)| ProbeTarget { entity, center, radius, mask })
            .collect();
        probe
    }

    #[test]
    fn top_down_round_trip() {
        let projection = TopDownProjection::default();
        let screen = projection.world_to_screen(Vec3::new(3.0, 0.0, 4.0)).unwrap();
        assert_eq!(screen, Vec2::new(30.0, 40.0));
        let ray = projection.screen_ray(screen).unwrap();
        assert_eq!(ray.origin.x, 3.0);
        assert_eq!(ray.origin.z, 4.0);
    }

    #[test]
    fn hits_clickable_unit_under_cursor() {
        let unit = World::new().spawn_empty().id();
        let probe = probe_with(&[(unit, Vec3::new(3.0, 0.0, 4.0), 0.6, surfaces::CLICKABLE)]);
        let hit = probe.hit_test(Vec2::new(30.0, 40.0), surfaces::CLICKABLE).unwrap();
        assert_eq!(hit.entity, Some(unit));
        assert!((hit.point.y - 0.6).abs() < 1e-4);

        assert!(probe.hit_test(Vec2::new(37.0, 40.0), surfaces::CLICKABLE).is_none());
    }

    #[test]
    fn mask_filters_targets() {
        let unit = World::new().spawn_empty().id();
        let probe = probe_with(&[(unit, Vec3::ZERO, 0.6, surfaces::CLICKABLE)]);
        assert!(probe.hit_test(Vec2::ZERO, surfaces::ATTACKABLE).is_none());
        assert!(probe.hit_test(Vec2::ZERO, surfaces::NONE).is_none());
    }

    #[test]
    fn ground_hit_has_no_entity() {
        let probe = SpatialProbe::default();
        let hit = probe.hit_test(Vec2::new(-50.0, 20.0), surfaces::GROUND).unwrap();
        assert_eq!(hit.entity, None);
        assert_eq!(hit.point, Vec3::new(-5.0, 0.0, 2.0));
    }

    #[test]
    fn nearest_target_along_ray_wins() {
        let mut world = World::new();
        let low = world.spawn_empty().id();
        let high = world.spawn_empty().id();
        let probe = probe_with(&[
            (low, Vec3::new(1.0, 0.0, 1.0), 0.5, surfaces::CLICKABLE),
            (high, Vec3::new(1.0, 3.0, 1.0), 0.5, surfaces::CLICKABLE),
        ]);
        let hit = probe
            .hit_test(Vec2::new(10.0, 10.0), surfaces::CLICKABLE | surfaces::GROUND)
            .unwrap();
        assert_eq!(hit.entity, Some(high));
    }

    /// Looks along +X at the height given by screen Y.
    struct SideProjection;

    impl ScreenProjection for SideProjection {
        fn screen_ray(&self, screen: Vec2) -> Option<Ray3d> {
            Some(Ray3d::new(Vec3::new(-20.0, screen.y, screen.x), Dir3::X))
        }

        fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
            Some(Vec2::new(world.z, world.y))
        }
    }

    #[test]
    fn lifted_surface_covers_upper_body() {
        let mut world = World::new();
        let unit = world.spawn_empty().id();
        let transform = Transform::from_xyz(0.0, 0.0, 0.0);

        let mut probe = SpatialProbe::new(SideProjection);
        let flat = Surface::new(surfaces::CLICKABLE, 0.6);
        probe.rebuild([(unit, &transform, &flat)].into_iter());
        assert!(probe.hit_test(Vec2::new(0.0, 1.4), surfaces::CLICKABLE).is_none());

        let lifted = flat.lifted(1.0);
        probe.rebuild([(unit, &transform, &lifted)].into_iter());
        let hit = probe.hit_test(Vec2::new(0.0, 1.4), surfaces::CLICKABLE).unwrap();
        assert_eq!(hit.entity, Some(unit));
        assert!(hit.point.y > 1.0);
    }
}
