use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::catalog::{Catalog, CatalogError, ResourceClass};
use crate::cost::ResourceCost;
use crate::state::EntityId;

/// Tunable world parameters.
///
/// Lives inside [`WorldState`](crate::state::WorldState) so operators may edit
/// it through godmode. Resource references are validated against the catalog
/// with [`GameConfig::validate`] before a game starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Number of distinct food kinds a team must provide for population growth.
    pub caste_count: u32,

    /// Generic resource produced by residents each turn.
    pub work_resource: EntityId,
    /// Population-like resource counting residents.
    pub population_resource: EntityId,
    /// Resource paid per unit of army equipment and refunded on retreat.
    pub equipment_resource: EntityId,

    pub work_per_resident: Decimal,
    pub residents_per_food: u32,
    /// Fractional population growth after a complete feeding.
    pub feed_growth: Decimal,
    /// Upper bound for each material held in storage.
    pub storage_limit: Decimal,
    /// Cost of withdrawing a single storage unit.
    pub withdraw_cost: ResourceCost,

    pub build_cost: ResourceCost,
    pub demolition_cost: ResourceCost,
    pub road_cost: ResourceCost,
    pub road_ticks: u64,

    /// Ticks to cross one edge of the tile graph.
    pub hop_ticks: u64,
    /// Ticks to cross an edge that carries a road.
    pub road_hop_ticks: u64,

    pub deploy_cost: ResourceCost,
    pub equipment_per_level: u32,
    pub level_strength: u32,
    pub defender_bonus: u32,
    /// Cost of one boost point.
    pub boost_cost: ResourceCost,
    pub max_army_level: u32,
    /// `upgrade_costs[n]` upgrades an army from level `n + 1`.
    pub upgrade_costs: Vec<ResourceCost>,

    pub plague: PlagueConfig,
}

/// Defaults attached to a team on plague onset, plus the remedy book.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlagueConfig {
    pub initial_sick: u32,
    pub recovery: Decimal,
    pub mortality: Decimal,
    pub infectiousness: Decimal,
    pub remedies: BTreeMap<String, RemedySpec>,
}

/// Rate adjustments applied once per team by a remedy.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemedySpec {
    pub cost: ResourceCost,
    pub recovery: Decimal,
    pub mortality: Decimal,
    pub infectiousness: Decimal,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CASTE_COUNT: u32 = 3;
    pub const DEFAULT_RESIDENTS_PER_FOOD: u32 = 5;
    pub const DEFAULT_HOP_TICKS: u64 = 6;
    pub const DEFAULT_ROAD_HOP_TICKS: u64 = 3;
    pub const DEFAULT_ROAD_TICKS: u64 = 4;
    pub const DEFAULT_EQUIPMENT_PER_LEVEL: u32 = 10;
    pub const DEFAULT_LEVEL_STRENGTH: u32 = 5;
    pub const DEFAULT_DEFENDER_BONUS: u32 = 2;
    pub const DEFAULT_MAX_ARMY_LEVEL: u32 = 3;

    pub fn new() -> Self {
        let work = || ResourceCost::new().with("res-work", Decimal::from(10));
        Self {
            caste_count: Self::DEFAULT_CASTE_COUNT,
            work_resource: EntityId::from("res-work"),
            population_resource: EntityId::from("pop-residents"),
            equipment_resource: EntityId::from("pro-equipment"),
            work_per_resident: Decimal::ONE,
            residents_per_food: Self::DEFAULT_RESIDENTS_PER_FOOD,
            feed_growth: Decimal::new(1, 1),
            storage_limit: Decimal::from(20),
            withdraw_cost: ResourceCost::new().with("res-work", Decimal::from(2)),
            build_cost: work(),
            demolition_cost: work(),
            road_cost: work(),
            road_ticks: Self::DEFAULT_ROAD_TICKS,
            hop_ticks: Self::DEFAULT_HOP_TICKS,
            road_hop_ticks: Self::DEFAULT_ROAD_HOP_TICKS,
            deploy_cost: ResourceCost::new(),
            equipment_per_level: Self::DEFAULT_EQUIPMENT_PER_LEVEL,
            level_strength: Self::DEFAULT_LEVEL_STRENGTH,
            defender_bonus: Self::DEFAULT_DEFENDER_BONUS,
            boost_cost: ResourceCost::new().with("res-work", Decimal::from(5)),
            max_army_level: Self::DEFAULT_MAX_ARMY_LEVEL,
            upgrade_costs: vec![
                ResourceCost::new().with("res-work", Decimal::from(20)),
                ResourceCost::new().with("res-work", Decimal::from(40)),
            ],
            plague: PlagueConfig::default(),
        }
    }

    /// Cost to upgrade an army currently at `level`, `None` at the top level.
    pub fn upgrade_cost(&self, level: u32) -> Option<&ResourceCost> {
        if level == 0 || level >= self.max_army_level {
            return None;
        }
        self.upgrade_costs.get(level as usize - 1)
    }

    /// Checks every resource this configuration names against the catalog.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let named = [
            ("work_resource", &self.work_resource),
            ("population_resource", &self.population_resource),
            ("equipment_resource", &self.equipment_resource),
        ];
        for (field, id) in named {
            if catalog.try_resource(id).is_none() {
                return Err(CatalogError::MissingConfigResource {
                    field,
                    id: id.clone(),
                });
            }
        }
        if catalog.resource(&self.population_resource).class() != ResourceClass::Population {
            return Err(CatalogError::InvalidConfig {
                field: "population_resource",
                reason: "must be a population resource",
            });
        }

        let costs = [
            ("withdraw_cost", &self.withdraw_cost),
            ("build_cost", &self.build_cost),
            ("demolition_cost", &self.demolition_cost),
            ("road_cost", &self.road_cost),
            ("deploy_cost", &self.deploy_cost),
            ("boost_cost", &self.boost_cost),
        ];
        let upgrades = self.upgrade_costs.iter().map(|cost| ("upgrade_costs", cost));
        let remedies = self
            .plague
            .remedies
            .values()
            .map(|remedy| ("plague.remedies", &remedy.cost));
        for (field, cost) in costs.into_iter().chain(upgrades).chain(remedies) {
            validate_cost(catalog, field, cost)?;
        }

        if self.residents_per_food == 0 {
            return Err(CatalogError::InvalidConfig {
                field: "residents_per_food",
                reason: "must be positive",
            });
        }
        if self.max_army_level == 0 || self.upgrade_costs.len() + 1 < self.max_army_level as usize
        {
            return Err(CatalogError::InvalidConfig {
                field: "upgrade_costs",
                reason: "one cost per level below max_army_level is required",
            });
        }
        Ok(())
    }
}

fn validate_cost(
    catalog: &Catalog,
    field: &'static str,
    cost: &ResourceCost,
) -> Result<(), CatalogError> {
    for (id, amount) in cost {
        if catalog.try_resource(id).is_none() {
            return Err(CatalogError::MissingConfigResource {
                field,
                id: id.clone(),
            });
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CatalogError::InvalidConfig {
                field,
                reason: "costs must not be negative",
            });
        }
    }
    Ok(())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlagueConfig {
    pub const DEFAULT_INITIAL_SICK: u32 = 5;
}

impl Default for PlagueConfig {
    fn default() -> Self {
        Self {
            initial_sick: Self::DEFAULT_INITIAL_SICK,
            recovery: Decimal::new(2, 1),
            mortality: Decimal::new(5, 2),
            infectiousness: Decimal::new(3, 1),
            remedies: BTreeMap::new(),
        }
    }
}
