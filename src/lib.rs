//! Structure placement for voxel worlds: rotate/mirror/translate a stored
//! structure, plan it against a live world, then write it in batches.

pub mod block_state;
pub mod cell;
pub mod error;
pub mod executor;
pub mod memory;
pub mod orientation;
pub mod planner;
pub mod plugin;
pub mod profiles;
pub mod rules;
pub mod structure;
pub mod transform;
pub mod world;

pub use cell::{Cell, Direction, HorizontalAxis};
pub use error::{PlacementError, WriteRejected};
pub use executor::{execute, ExecutionMode, Executor, OutcomeStatus, PlacementOutcome, DEFAULT_BATCH_SIZE};
pub use memory::MemoryWorld;
pub use orientation::random_orientation;
pub use planner::{plan, Conflict, ConflictKind, PlacementPlan, PlacementPolicy, PlannedWrite};
pub use plugin::{PlacementPlugin, PlacementProfilesHandle, PlacementRules, PlacementSettings};
pub use profiles::{PlacementProfile, PlacementProfiles, PlacementProfilesLoader, ProfilesLoadError};
pub use rules::{refresh_shapes, PlaceContext, PlacementRule, RuleRegistry, UpdateContext};
pub use structure::{Structure, StructureBuilder};
pub use transform::{Mirror, Rotation, Transform};
pub use world::{BlockBox, CancellationCheck, NeverCancel, PollBudget, WorldView, WorldWriter};
