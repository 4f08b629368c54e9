// src/profiles.rs
//! Named placement presets (policy + execution mode + batch size), loaded
//! from `*.placement.ron` manifests.

use bevy::asset::{io::Reader, Asset, AssetLoader, LoadContext};
use bevy::reflect::TypePath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::executor::{ExecutionMode, Executor, PlacementOutcome, DEFAULT_BATCH_SIZE};
use crate::planner::{plan, PlacementPlan, PlacementPolicy};
use crate::structure::Structure;
use crate::transform::Transform;
use crate::world::{CancellationCheck, WorldWriter};

// ---------- Profile (data form) ----------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementProfile {
    /// Unique name used for lookup.
    pub name: String,

    #[serde(default)]
    pub policy: PlacementPolicy,

    #[serde(default)]
    pub mode: ExecutionMode,

    /// Writes between cancellation polls.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl PlacementProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: PlacementPolicy::default(),
            mode: ExecutionMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn executor(&self) -> Executor {
        Executor::new(self.mode).with_batch_size(self.batch_size)
    }

    /// Plan against `world` with this profile's policy, then run the plan.
    pub fn place<W: WorldWriter + ?Sized>(
        &self,
        structure: &Structure,
        transform: &Transform,
        world: &mut W,
        cancel: &dyn CancellationCheck,
    ) -> (PlacementPlan, PlacementOutcome) {
        let plan = plan(structure, transform, &*world, self.policy);
        let outcome = self.executor().run(&plan, world, cancel);
        (plan, outcome)
    }
}

// ---------- Runtime asset ----------

#[derive(Asset, TypePath, Clone, Debug, Default)]
pub struct PlacementProfiles {
    /// Manifest order.
    pub profiles: Vec<PlacementProfile>,
    /// Name → index into `profiles`.
    pub name_to_index: HashMap<String, u32>,
}

impl PlacementProfiles {
    pub fn from_profiles(profiles: Vec<PlacementProfile>) -> Result<Self, ProfilesLoadError> {
        let mut name_to_index = HashMap::with_capacity(profiles.len());
        for (i, p) in profiles.iter().enumerate() {
            if let Some(prev) = name_to_index.insert(p.name.clone(), i as u32) {
                return Err(ProfilesLoadError::DuplicateName {
                    name: p.name.clone(),
                    first: prev,
                    second: i as u32,
                });
            }
        }
        Ok(Self { profiles, name_to_index })
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, ProfilesLoadError> {
        let defs: Vec<PlacementProfile> =
            ron::de::from_bytes(bytes).map_err(|e| ProfilesLoadError::Ron(e.to_string()))?;
        Self::from_profiles(defs)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ProfilesLoadError> {
        Self::from_ron_bytes(text.as_bytes())
    }

    pub fn get(&self, name: &str) -> Option<&PlacementProfile> {
        self.name_to_index.get(name).and_then(|&i| self.profiles.get(i as usize))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ---------- Asset loader for `.placement.ron` ----------

#[derive(Default)]
pub struct PlacementProfilesLoader;

impl AssetLoader for PlacementProfilesLoader {
    type Asset = PlacementProfiles;
    type Settings = ();
    type Error = ProfilesLoadError;

    fn extensions(&self) -> &[&str] {
        &["placement.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        PlacementProfiles::from_ron_bytes(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum ProfilesLoadError {
    #[error("I/O while reading placement profiles: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate profile name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: u32, second: u32 },
}
