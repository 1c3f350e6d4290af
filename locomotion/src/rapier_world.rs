//! Rapier-based query world for immutable level geometry.
//!
//! Built once from a list of static collider definitions and shared (read-only) by every
//! character: the kinematic bodies sweep against it through Rapier's
//! `KinematicCharacterController`, and the ground probe runs its sphere queries against it
//! through parry.
//!
//! Conventions
//! - Units are meters.
//! - Insertion order is the definition `id` order, so the same input always builds the same sets.
//! - A collider's layers are stored in its `user_data`.
//! - Trigger volumes are Rapier sensors; they never block movement and never count as ground.

use rapier3d::{
    na::{Translation3, UnitQuaternion},
    parry::query::{self, ShapeCastOptions},
    prelude::*,
};

use crate::{
    ground::GroundSensor,
    types::{Iso, LayerMask, Quat, SurfaceHit, Vec3},
};

/// Static collider as authored in a level.
#[derive(Clone, Debug)]
pub struct StaticColliderDef {
    /// Stable identifier; colliders are inserted in ascending `id` order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layers: LayerMask,
    /// Triggers report overlap only.
    pub is_trigger: bool,
}

impl StaticColliderDef {
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
            layers: LayerMask::GROUND,
            is_trigger: false,
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn on_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space. The normal is `rotation * +Y`; the plane passes through
    /// `translation + normal * offset_along_normal`.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    CapsuleY { radius: f32, half_height: f32 },
    CylinderY { radius: f32, half_height: f32 },
}

/// Static colliders plus the broad/narrow phase needed for scene queries.
pub struct StaticWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl StaticWorld {
    pub fn build(mut defs: Vec<StaticColliderDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            let iso = Iso::from_parts(Translation3::from(def.translation), def.rotation);
            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only: refreshes the broad-phase BVH so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::info!("static world built with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed `QueryPipeline` for scene queries and the character controller.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Solid colliders whose layers intersect `mask`.
    fn solid_colliders(&self, mask: LayerMask) -> impl Iterator<Item = &Collider> + '_ {
        self.colliders
            .iter()
            .map(|(_, co)| co)
            .filter(move |co| !co.is_sensor() && collider_layers(co).intersects(mask))
    }
}

#[inline]
fn collider_layers(co: &Collider) -> LayerMask {
    LayerMask(co.user_data as u32)
}

impl GroundSensor for StaticWorld {
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool {
        if radius <= 0.0 {
            return false;
        }
        let ball = Ball::new(radius);
        let pos = Iso::translation(center.x, center.y, center.z);
        self.solid_colliders(mask).any(|co| {
            matches!(
                query::intersection_test(&pos, &ball, co.position(), co.shape()),
                Ok(true)
            )
        })
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        translation: Vec3,
        mask: LayerMask,
    ) -> Option<SurfaceHit> {
        if radius <= 0.0 {
            return None;
        }
        let ball = Ball::new(radius);
        let pos = Iso::translation(origin.x, origin.y, origin.z);

        let mut best: Option<SurfaceHit> = None;
        for co in self.solid_colliders(mask) {
            let mut opts = ShapeCastOptions::with_max_time_of_impact(1.0);
            opts.stop_at_penetration = true;
            let Ok(Some(hit)) = query::cast_shapes(
                &pos,
                &translation,
                &ball,
                co.position(),
                &Vec3::zeros(),
                co.shape(),
                opts,
            ) else {
                continue;
            };

            // Normal on the ball (identity rotation, so already world space), facing the sweep.
            let mut normal = hit.normal1.into_inner();
            if normal.dot(&translation) > 0.0 {
                normal = -normal;
            }
            if best.is_none_or(|b| hit.time_of_impact < b.fraction) {
                best = Some(SurfaceHit {
                    normal,
                    fraction: hit.time_of_impact,
                });
            }
        }
        best
    }
}

/// Collider for one definition, positioned relative to its fixed parent body.
fn collider_from_def(def: &StaticColliderDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => ColliderBuilder::halfspace(Vector::y_axis())
            .translation(Vector::y() * *offset_along_normal),
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder
        .sensor(def.is_trigger)
        .user_data(def.layers.0 as u128)
        .build()
}

/// Rotation about +Z. Applied to a plane or cuboid it makes a ramp rising toward +X.
pub fn tilt_about_z(angle_deg: f32) -> Quat {
    UnitQuaternion::from_axis_angle(&Vector::z_axis(), angle_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> StaticColliderDef {
        StaticColliderDef::new(
            0,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
    }

    #[test]
    fn sphere_overlaps_floor_only_on_matching_layers() {
        let world = StaticWorld::build(vec![floor()]);
        assert!(world.check_sphere(Vec3::new(0.0, 0.2, 0.0), 0.3, LayerMask::GROUND));
        assert!(!world.check_sphere(Vec3::new(0.0, 0.5, 0.0), 0.3, LayerMask::GROUND));
        assert!(!world.check_sphere(Vec3::new(0.0, 0.2, 0.0), 0.3, LayerMask(0b10)));
    }

    #[test]
    fn downward_cast_hits_floor_with_upward_normal() {
        let world = StaticWorld::build(vec![floor()]);
        let hit = world
            .cast_sphere(
                Vec3::new(0.0, 0.5, 0.0),
                0.3,
                Vec3::new(0.0, -0.4, 0.0),
                LayerMask::ALL,
            )
            .unwrap();
        assert!((hit.fraction - 0.5).abs() < 1.0e-3);
        assert!((hit.normal - Vec3::y()).norm() < 1.0e-4);
    }

    #[test]
    fn triggers_are_not_ground() {
        let zone = StaticColliderDef::new(
            1,
            Vec3::new(0.0, 0.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(1.0, 1.0, 1.0),
            },
        )
        .on_layers(LayerMask::ALL)
        .trigger();
        let world = StaticWorld::build(vec![zone]);

        assert_eq!(world.colliders.len(), 1);
        assert!(!world.check_sphere(Vec3::zeros(), 0.3, LayerMask::ALL));
        assert!(
            world
                .cast_sphere(Vec3::new(0.0, 3.0, 0.0), 0.3, Vec3::new(0.0, -5.0, 0.0), LayerMask::ALL)
                .is_none()
        );
    }

    #[test]
    fn tilted_plane_normal_follows_rotation() {
        let ramp = floor().rotated(tilt_about_z(30.0));
        let world = StaticWorld::build(vec![ramp]);
        let hit = world
            .cast_sphere(
                Vec3::new(0.0, 1.0, 0.0),
                0.3,
                Vec3::new(0.0, -2.0, 0.0),
                LayerMask::GROUND,
            )
            .unwrap();
        let slope = crate::utils::slope_angle_deg(hit.normal);
        assert!((slope - 30.0).abs() < 0.1);
    }
}
