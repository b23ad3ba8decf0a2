use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::cost::{DiceRequirement, ResourceCost};
use crate::state::{EntityId, TileIndex};

/// Resource class derived from the identifier prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceClass {
    /// `mat-*`: physical goods, held in storage.
    Material,
    /// `pro-*`: per-turn production, the only tradable class.
    Production,
    /// `pop-*`: population-like counts.
    Population,
    Generic,
}

impl ResourceClass {
    pub fn of(id: &EntityId) -> Self {
        let id = id.as_str();
        if id.starts_with("mat-") {
            Self::Material
        } else if id.starts_with("pro-") {
            Self::Production
        } else if id.starts_with("pop-") {
            Self::Population
        } else {
            Self::Generic
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceEntity {
    pub id: EntityId,
    pub name: String,
    /// Usable for feeding residents.
    #[cfg_attr(feature = "serde", serde(default))]
    pub food: bool,
}

impl ResourceEntity {
    pub fn class(&self) -> ResourceClass {
        ResourceClass::of(&self.id)
    }

    pub fn is_tradable(&self) -> bool {
        self.class() == ResourceClass::Production
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieEntity {
    pub id: EntityId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TechEntity {
    pub id: EntityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: BTreeSet<EntityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dots: u32,
    /// Entities that become available once this technology is researched.
    #[cfg_attr(feature = "serde", serde(default))]
    pub unlocks: Vec<EntityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub research_ticks: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingEntity {
    pub id: EntityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: BTreeSet<EntityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dots: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub build_ticks: u64,
}

/// Production recipe: converts `cost` into `amount` units of `reward`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VyrobaEntity {
    pub id: EntityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: BTreeSet<EntityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dots: u32,
    pub reward: EntityId,
    pub amount: Decimal,
    #[cfg_attr(feature = "serde", serde(default))]
    pub production_ticks: u64,
    /// Building that must stand on the tile where the recipe runs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub building: Option<EntityId>,
    /// Employees needed per automated batch each turn; zero disables automation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub workers: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeEntity {
    pub id: EntityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileTemplate {
    pub index: TileIndex,
    pub name: String,
    pub parcels: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neighbours: BTreeSet<TileIndex>,
}

/// Entities that carry a dice requirement.
pub(crate) trait Throwable {
    fn id(&self) -> &EntityId;
    fn dice(&self) -> &BTreeSet<EntityId>;
    fn dots(&self) -> u32;

    /// Pairing was checked by `Catalog::load`.
    fn dice_requirement(&self) -> DiceRequirement {
        DiceRequirement {
            allowed: self.dice().clone(),
            required_dots: self.dots(),
        }
    }
}

macro_rules! impl_throwable {
    ($($entity:ty),* $(,)?) => {
        $(
            impl Throwable for $entity {
                fn id(&self) -> &EntityId {
                    &self.id
                }
                fn dice(&self) -> &BTreeSet<EntityId> {
                    &self.dice
                }
                fn dots(&self) -> u32 {
                    self.dots
                }
            }
        )*
    };
}

impl_throwable!(TechEntity, BuildingEntity, VyrobaEntity);

impl TechEntity {
    pub fn dice_requirement(&self) -> DiceRequirement {
        Throwable::dice_requirement(self)
    }
}

impl BuildingEntity {
    pub fn dice_requirement(&self) -> DiceRequirement {
        Throwable::dice_requirement(self)
    }
}

impl VyrobaEntity {
    pub fn dice_requirement(&self) -> DiceRequirement {
        Throwable::dice_requirement(self)
    }
}

/// Raw, unvalidated catalog tables as read from content files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawTables {
    pub resources: Vec<ResourceEntity>,
    pub dice: Vec<DieEntity>,
    pub techs: Vec<TechEntity>,
    pub buildings: Vec<BuildingEntity>,
    pub vyrobas: Vec<VyrobaEntity>,
    pub attributes: Vec<AttributeEntity>,
    pub tiles: Vec<TileTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_follows_identifier_prefix() {
        assert_eq!(ResourceClass::of(&"mat-wood".into()), ResourceClass::Material);
        assert_eq!(ResourceClass::of(&"pro-wood".into()), ResourceClass::Production);
        assert_eq!(ResourceClass::of(&"pop-residents".into()), ResourceClass::Population);
        assert_eq!(ResourceClass::of(&"res-work".into()), ResourceClass::Generic);
        // the prefix must be complete
        assert_eq!(ResourceClass::of(&"matter".into()), ResourceClass::Generic);
    }
}
