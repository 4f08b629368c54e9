// src/rules/registry.rs
//! Block id → rule lookup, plus the neighbour-refresh pass run after a
//! structure lands.

use bevy::log::{debug, warn};
use bevy::math::IVec3;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::cell::{Cell, Direction};
use crate::world::{WorldView, WorldWriter};

use super::{
    AxisRule, BannerRule, BedRule, ButtonRule, CactusRule, CeilingHangingSignRule, ChestRule,
    CropRule, DoorRule, FenceGateRule, FenceRule, GlassPaneRule, HorizontalFacingRule,
    MushroomRule, PlaceContext, PlacementRule, RailRule, SlabRule, StairRule, StandingSignRule,
    SugarCaneRule, TallPlantRule, TrapdoorRule, UpdateContext, WallHangingSignRule, WallRule,
    WallSignRule,
};

/// Exact ids win over name suffixes; among suffixes the longest match wins.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    exact: HashMap<String, Arc<dyn PlacementRule>>,
    suffixes: Vec<(String, Arc<dyn PlacementRule>)>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("exact", &self.exact.len())
            .field("suffixes", &self.suffixes.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule for one namespaced id (`minecraft:furnace`). Replaces any previous one.
    pub fn register(&mut self, id: impl Into<String>, rule: impl PlacementRule) -> &mut Self {
        self.exact.insert(id.into(), Arc::new(rule));
        self
    }

    /// Rule for every block whose un-namespaced name ends with `suffix`.
    pub fn register_suffix(&mut self, suffix: impl Into<String>, rule: impl PlacementRule) -> &mut Self {
        let suffix = suffix.into();
        let rule: Arc<dyn PlacementRule> = Arc::new(rule);
        match self.suffixes.iter().position(|(s, _)| *s == suffix) {
            Some(i) => self.suffixes[i].1 = rule,
            None => self.suffixes.push((suffix, rule)),
        }
        self
    }

    pub fn rule_for(&self, cell: &Cell) -> Option<&dyn PlacementRule> {
        if let Some(rule) = self.exact.get(cell.id()) {
            return Some(rule.as_ref());
        }
        let name = cell.name();
        self.suffixes
            .iter()
            .filter(|(s, _)| name.ends_with(s.as_str()))
            .max_by_key(|(s, _)| s.len())
            .map(|(_, rule)| rule.as_ref())
    }

    /// Resolved placement state. Blocks without a rule place unchanged.
    pub fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        match self.rule_for(&ctx.cell) {
            Some(rule) => rule.place(ctx, world),
            None => Some(ctx.cell.clone()),
        }
    }

    /// The placed cell followed by any extra cells its rule adds (door tops,
    /// bed heads). `None` when the rule refuses.
    pub fn place_all(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Vec<(IVec3, Cell)>> {
        let placed = self.place(ctx, world)?;
        let extra = self.rule_for(&ctx.cell).map(|rule| rule.companions(ctx, &placed)).unwrap_or_default();
        let mut cells = Vec::with_capacity(1 + extra.len());
        cells.push((ctx.position, placed));
        cells.extend(extra);
        Some(cells)
    }

    pub fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        match self.rule_for(&ctx.current) {
            Some(rule) => rule.update(ctx, world),
            None => ctx.current.clone(),
        }
    }

    /// Number of registered ids and suffixes.
    pub fn len(&self) -> usize {
        self.exact.len() + self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rules for the common vanilla families.
    pub fn vanilla() -> Self {
        let mut reg = Self::new();
        reg.register_suffix("_stairs", StairRule)
            .register_suffix("_slab", SlabRule)
            .register_suffix("_fence", FenceRule)
            .register_suffix("_fence_gate", FenceGateRule)
            .register_suffix("_wall", WallRule)
            .register_suffix("_door", DoorRule)
            .register_suffix("_trapdoor", TrapdoorRule)
            .register_suffix("_bed", BedRule)
            .register_suffix("_button", ButtonRule)
            .register_suffix("glass_pane", GlassPaneRule)
            .register_suffix("_banner", BannerRule)
            .register_suffix("_sign", StandingSignRule)
            .register_suffix("_wall_sign", WallSignRule)
            .register_suffix("_hanging_sign", CeilingHangingSignRule)
            .register_suffix("_wall_hanging_sign", WallHangingSignRule)
            .register_suffix("_glazed_terracotta", HorizontalFacingRule);
        for suffix in ["_log", "_wood", "_stem", "_hyphae"] {
            reg.register_suffix(suffix, AxisRule);
        }

        reg.register("minecraft:iron_bars", GlassPaneRule)
            .register("minecraft:cactus", CactusRule)
            .register("minecraft:sugar_cane", SugarCaneRule);
        for crop in ["wheat", "carrots", "potatoes", "beetroots"] {
            reg.register(format!("minecraft:{crop}"), CropRule);
        }
        for rail in ["rail", "powered_rail", "detector_rail", "activator_rail"] {
            reg.register(format!("minecraft:{rail}"), RailRule);
        }
        for id in ["chest", "trapped_chest"] {
            reg.register(format!("minecraft:{id}"), ChestRule);
        }
        for id in ["sunflower", "lilac", "rose_bush", "peony", "tall_grass", "large_fern"] {
            reg.register(format!("minecraft:{id}"), TallPlantRule);
        }
        for id in ["brown_mushroom", "red_mushroom"] {
            reg.register(format!("minecraft:{id}"), MushroomRule);
        }
        for id in ["furnace", "blast_furnace", "smoker"] {
            reg.register(format!("minecraft:{id}"), HorizontalFacingRule);
        }
        for id in ["hay_block", "bone_block", "basalt", "quartz_pillar", "purpur_pillar"] {
            reg.register(format!("minecraft:{id}"), AxisRule);
        }
        reg
    }
}

/// Re-run `update` on every written coordinate, its horizontal neighbours
/// and the block above. Only changed cells are written back. Returns how
/// many cells changed.
pub fn refresh_shapes<W: WorldWriter>(world: &mut W, rules: &RuleRegistry, coords: &[IVec3]) -> usize {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for &c in coords {
        let around = Direction::HORIZONTAL.into_iter().map(move |d| c + d.offset());
        for t in std::iter::once(c).chain(around).chain(std::iter::once(c + IVec3::Y)) {
            if seen.insert(t) {
                targets.push(t);
            }
        }
    }

    let mut changed = 0;
    for position in targets {
        let Some(current) = world.cell_at(position) else {
            continue;
        };
        if current.is_air() || rules.rule_for(&current).is_none() {
            continue;
        }
        let updated = rules.update(&UpdateContext { current: current.clone(), position }, &*world);
        if updated == current {
            continue;
        }
        match world.set_cell(position, &updated) {
            Ok(()) => changed += 1,
            Err(e) => warn!("refresh at {} failed: {}", position, e),
        }
    }

    debug!("refresh_shapes: {} targets from {} coords, {} changed", seen.len(), coords.len(), changed);
    changed
}
