// src/orientation.rs
//! Seeded orientation picks (deterministic per seed and position), for hosts
//! scattering the same structure around a world without it looking stamped.

use bevy::math::IVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::transform::{Mirror, Rotation, Transform};

#[inline]
fn rng_for(seed: u64, position: IVec3) -> ChaCha8Rng {
    // Stable per (seed, position)
    let mix = seed
        ^ ((position.x as u32 as u64) << 8)
        ^ ((position.z as u32 as u64) << 32)
        ^ ((position.y as u16 as u64) << 48)
        ^ 0xA5A5_5A5A_D3F0_1234u64;
    ChaCha8Rng::seed_from_u64(mix)
}

pub fn random_orientation(seed: u64, position: IVec3, allow_mirror: bool) -> (Rotation, Mirror) {
    let mut rng = rng_for(seed, position);
    let rotation = Rotation::ALL[rng.random_range(0..Rotation::ALL.len())];
    let mirror = if allow_mirror {
        Mirror::ALL[rng.random_range(0..Mirror::ALL.len())]
    } else {
        Mirror::None
    };
    (rotation, mirror)
}

impl Transform {
    /// Random-looking but reproducible orientation at `translation`.
    pub fn seeded(seed: u64, translation: IVec3, allow_mirror: bool) -> Transform {
        let (rotation, mirror) = random_orientation(seed, translation, allow_mirror);
        Transform::new(rotation, mirror, translation)
    }
}
