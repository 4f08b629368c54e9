//! Bevy wiring: profile asset + loader, settings, and the vanilla rule set
//! as a resource.

use bevy::prelude::*;

use crate::profiles::{PlacementProfiles, PlacementProfilesLoader};
use crate::rules::RuleRegistry;

/// Where the profile manifest lives.
#[derive(Resource, Clone, Debug)]
pub struct PlacementSettings {
    pub profiles_path: String,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            profiles_path: "placement/profiles.placement.ron".to_string(),
        }
    }
}

/// Handle to the loaded PlacementProfiles asset.
#[derive(Resource, Default)]
pub struct PlacementProfilesHandle(pub Handle<PlacementProfiles>);

/// Block rules used when resolving placements and refreshing neighbours.
#[derive(Resource, Clone, Debug)]
pub struct PlacementRules(pub RuleRegistry);

impl Default for PlacementRules {
    fn default() -> Self {
        Self(RuleRegistry::vanilla())
    }
}

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PlacementProfiles>()
            .register_asset_loader(PlacementProfilesLoader)
            .init_resource::<PlacementSettings>()
            .init_resource::<PlacementProfilesHandle>()
            .init_resource::<PlacementRules>()
            .add_systems(Startup, load_profiles)
            .add_systems(Update, monitor_profiles_ready);
    }
}

/// Startup: request the profile manifest, store the handle.
fn load_profiles(
    mut handle_res: ResMut<PlacementProfilesHandle>,
    settings: Res<PlacementSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    handle_res.0 = assets.load(settings.profiles_path.as_str());
    info!("Placement: loading profiles from '{}'", settings.profiles_path);
}

/// Update: log once when the profiles become available.
fn monitor_profiles_ready(
    handle_res: Res<PlacementProfilesHandle>,
    profiles: Res<Assets<PlacementProfiles>>,
    mut logged: Local<bool>,
) {
    if *logged { return; }
    if let Some(loaded) = profiles.get(&handle_res.0) {
        *logged = true;
        info!("Placement: {} profiles loaded and ready", loaded.len());
    }
}
