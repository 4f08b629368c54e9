// src/transform.rs
//! Rotation/mirror/translation between structure-local and world coordinates.

use bevy::math::{I64Vec3, IVec3, UVec3};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::structure::Structure;
use crate::world::BlockBox;

// ---------- Rotation ----------

/// Rotation about the vertical axis, clockwise seen from above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    CounterClockwise90,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::CounterClockwise90,
    ];

    /// Accepts any multiple of 90, negative values included.
    pub fn from_degrees(degrees: i32) -> Result<Rotation, PlacementError> {
        if degrees % 90 != 0 {
            return Err(PlacementError::InvalidRotation(degrees));
        }
        Ok(Self::from_quarter_turns(degrees.rem_euclid(360) / 90))
    }

    pub const fn from_quarter_turns(turns: i32) -> Rotation {
        match turns.rem_euclid(4) {
            0 => Rotation::None,
            1 => Rotation::Clockwise90,
            2 => Rotation::Clockwise180,
            _ => Rotation::CounterClockwise90,
        }
    }

    pub const fn quarter_turns(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 1,
            Rotation::Clockwise180 => 2,
            Rotation::CounterClockwise90 => 3,
        }
    }

    pub const fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    /// `self` followed by `next`.
    pub const fn then(self, next: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + next.quarter_turns())
    }

    pub const fn inverse(self) -> Rotation {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }

    #[inline]
    pub fn apply(self, v: IVec3) -> IVec3 {
        match self {
            Rotation::None => v,
            Rotation::Clockwise90 => IVec3::new(v.z.saturating_neg(), v.y, v.x),
            Rotation::Clockwise180 => IVec3::new(v.x.saturating_neg(), v.y, v.z.saturating_neg()),
            Rotation::CounterClockwise90 => IVec3::new(v.z, v.y, v.x.saturating_neg()),
        }
    }
}

// ---------- Mirror ----------

/// Mirror across a vertical plane. `X` negates x (east/west swap),
/// `Z` negates z (north/south swap).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    #[default]
    None,
    X,
    Z,
}

impl Mirror {
    pub const ALL: [Mirror; 3] = [Mirror::None, Mirror::X, Mirror::Z];

    #[inline]
    pub fn apply(self, v: IVec3) -> IVec3 {
        match self {
            Mirror::None => v,
            Mirror::X => IVec3::new(v.x.saturating_neg(), v.y, v.z),
            Mirror::Z => IVec3::new(v.x, v.y, v.z.saturating_neg()),
        }
    }
}

/// Linear part of a transform: mirror first, then rotate.
fn compose_linear(
    (first_rot, first_mirror): (Rotation, Mirror),
    (next_rot, next_mirror): (Rotation, Mirror),
) -> (Rotation, Mirror) {
    // next_mirror * first_rot == first_rot^-1 * next_mirror
    let moved = if next_mirror == Mirror::None { first_rot } else { first_rot.inverse() };
    let rotation = next_rot.then(moved);
    match (next_mirror, first_mirror) {
        (Mirror::None, m) | (m, Mirror::None) => (rotation, m),
        (a, b) if a == b => (rotation, Mirror::None),
        // X * Z negates both horizontal axes
        _ => (rotation.then(Rotation::Clockwise180), Mirror::None),
    }
}

// ---------- Transform ----------

/// `world = translation + R(M(local - pivot))`. Rotating about the pivot is the
/// same as rotating about the bounding-box centre and then moving the pivot
/// onto `translation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    rotation: Rotation,
    mirror: Mirror,
    translation: IVec3,
    pivot: Option<IVec3>,
    bounds: Option<UVec3>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: Rotation::None,
        mirror: Mirror::None,
        translation: IVec3::ZERO,
        pivot: None,
        bounds: None,
    };

    /// Rejects rotations that are not a multiple of 90 degrees.
    pub fn compute(rotation_degrees: i32, mirror: Mirror, translation: IVec3) -> Result<Self, PlacementError> {
        Ok(Self::new(Rotation::from_degrees(rotation_degrees)?, mirror, translation))
    }

    pub const fn new(rotation: Rotation, mirror: Mirror, translation: IVec3) -> Self {
        Self { rotation, mirror, translation, pivot: None, bounds: None }
    }

    pub const fn translation_only(translation: IVec3) -> Self {
        Self::new(Rotation::None, Mirror::None, translation)
    }

    /// Binds the structure's bounds and, unless a pivot is already set,
    /// pivots on its origin.
    pub fn fitted_to(&self, structure: &Structure) -> Self {
        Self {
            pivot: Some(self.pivot.unwrap_or(structure.origin())),
            bounds: Some(structure.size()),
            ..*self
        }
    }

    /// Pivots on a named anchor so that anchor lands on `translation`.
    pub fn anchored_at(&self, structure: &Structure, anchor: &str) -> Result<Self, PlacementError> {
        let pivot = structure
            .anchor(anchor)
            .ok_or_else(|| PlacementError::UnknownAnchor(anchor.to_string()))?;
        Ok(Self { pivot: Some(pivot), bounds: Some(structure.size()), ..*self })
    }

    pub fn with_pivot(&self, pivot: IVec3) -> Self {
        Self { pivot: Some(pivot), ..*self }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn mirror(&self) -> Mirror {
        self.mirror
    }

    pub fn translation(&self) -> IVec3 {
        self.translation
    }

    pub fn pivot(&self) -> IVec3 {
        self.pivot.unwrap_or(IVec3::ZERO)
    }

    pub fn bounds(&self) -> Option<UVec3> {
        self.bounds
    }

    /// Same mapping on 64-bit lanes; cannot overflow for any i32 input.
    #[inline]
    fn linear_wide(&self, v: I64Vec3) -> I64Vec3 {
        rotate_wide(self.rotation, mirror_wide(self.mirror, v))
    }

    #[inline]
    fn linear_inverse_wide(&self, v: I64Vec3) -> I64Vec3 {
        mirror_wide(self.mirror, rotate_wide(self.rotation.inverse(), v))
    }

    #[inline]
    fn apply_wide(&self, local: IVec3) -> I64Vec3 {
        self.translation.as_i64vec3() + self.linear_wide(local.as_i64vec3() - self.pivot().as_i64vec3())
    }

    /// Saturates at the i32 range; [`Transform::apply_checked`] reports it instead.
    #[inline]
    pub fn apply(&self, local: IVec3) -> IVec3 {
        clamp_narrow(self.apply_wide(local))
    }

    /// `None` when the world coordinate does not fit in an `IVec3`.
    pub fn apply_checked(&self, local: IVec3) -> Option<IVec3> {
        narrow(self.apply_wide(local))
    }

    /// `None` when the transform is fitted and `world` falls outside the
    /// transformed structure.
    pub fn invert(&self, world: IVec3) -> Option<IVec3> {
        let wide = self.linear_inverse_wide(world.as_i64vec3() - self.translation.as_i64vec3())
            + self.pivot().as_i64vec3();
        let local = narrow(wide)?;
        match self.bounds {
            Some(size) if !in_size(local, size) => None,
            _ => Some(local),
        }
    }

    /// World-space box covered by a structure of `size` under this transform.
    /// Corners past the i32 range are clamped onto it.
    pub fn world_bounds(&self, size: UVec3) -> BlockBox {
        let far = size.as_ivec3() - IVec3::ONE;
        let first = self.apply(IVec3::ZERO);
        let mut out = BlockBox::new(first, first);
        for corner in [
            IVec3::new(far.x, 0, 0),
            IVec3::new(0, far.y, 0),
            IVec3::new(0, 0, far.z),
            IVec3::new(far.x, far.y, 0),
            IVec3::new(far.x, 0, far.z),
            IVec3::new(0, far.y, far.z),
            far,
        ] {
            out = out.union(self.apply(corner));
        }
        out
    }

    /// Applies `self`, then `next`. Keeps this transform's pivot and bounds.
    pub fn then(&self, next: &Transform) -> Transform {
        let (rotation, mirror) = compose_linear((self.rotation, self.mirror), (next.rotation, next.mirror));
        Transform {
            rotation,
            mirror,
            translation: next.apply(self.translation),
            pivot: self.pivot,
            bounds: self.bounds,
        }
    }

    /// Mapping from world back to local, without bounds.
    pub fn inverse(&self) -> Transform {
        let (rotation, mirror) = match self.mirror {
            Mirror::None => (self.rotation.inverse(), Mirror::None),
            // (R*M)^-1 = M*R^-1 = R*M
            m => (self.rotation, m),
        };
        Transform {
            rotation,
            mirror,
            translation: self.pivot(),
            pivot: Some(self.translation),
            bounds: None,
        }
    }
}

fn rotate_wide(rotation: Rotation, v: I64Vec3) -> I64Vec3 {
    match rotation {
        Rotation::None => v,
        Rotation::Clockwise90 => I64Vec3::new(-v.z, v.y, v.x),
        Rotation::Clockwise180 => I64Vec3::new(-v.x, v.y, -v.z),
        Rotation::CounterClockwise90 => I64Vec3::new(v.z, v.y, -v.x),
    }
}

fn mirror_wide(mirror: Mirror, v: I64Vec3) -> I64Vec3 {
    match mirror {
        Mirror::None => v,
        Mirror::X => I64Vec3::new(-v.x, v.y, v.z),
        Mirror::Z => I64Vec3::new(v.x, v.y, -v.z),
    }
}

fn narrow(v: I64Vec3) -> Option<IVec3> {
    Some(IVec3::new(v.x.try_into().ok()?, v.y.try_into().ok()?, v.z.try_into().ok()?))
}

fn clamp_narrow(v: I64Vec3) -> IVec3 {
    let lo = I64Vec3::splat(i32::MIN as i64);
    let hi = I64Vec3::splat(i32::MAX as i64);
    v.clamp(lo, hi).as_ivec3()
}

#[inline]
pub(crate) fn in_size(p: IVec3, size: UVec3) -> bool {
    p.cmpge(IVec3::ZERO).all() && p.cmplt(size.as_ivec3()).all()
}
