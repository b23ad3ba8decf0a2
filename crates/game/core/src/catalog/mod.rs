//! Immutable reference data for a game instance.
//!
//! The [`Catalog`] is validated once by [`Catalog::load`] and then shared
//! read-only by every action. Lookups by id are total: asking for an id that
//! the catalog does not contain is a programming error and panics. Action
//! arguments coming from outside are checked with the `try_*` variants first.
mod entities;
mod error;
mod map;

pub use entities::{
    AttributeEntity, BuildingEntity, DieEntity, RawTables, ResourceClass, ResourceEntity,
    TechEntity, TileTemplate, VyrobaEntity,
};
pub use error::CatalogError;

use std::collections::{BTreeMap, BTreeSet};

use crate::cost::ResourceCost;
use crate::state::{EntityId, TileIndex};
use entities::Throwable;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    resources: BTreeMap<EntityId, ResourceEntity>,
    dice: BTreeMap<EntityId, DieEntity>,
    techs: BTreeMap<EntityId, TechEntity>,
    buildings: BTreeMap<EntityId, BuildingEntity>,
    vyrobas: BTreeMap<EntityId, VyrobaEntity>,
    attributes: BTreeMap<EntityId, AttributeEntity>,
    tiles: BTreeMap<TileIndex, TileTemplate>,
    /// Unlock target → technologies that unlock it.
    unlockers: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

/// Kind of entity an identifier resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    Die,
    Tech,
    Building,
    Vyroba,
    Attribute,
}

impl EntityKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Die => "die",
            Self::Tech => "tech",
            Self::Building => "building",
            Self::Vyroba => "vyroba",
            Self::Attribute => "attribute",
        }
    }
}

impl Catalog {
    /// Validates raw tables and builds the catalog.
    pub fn load(raw: RawTables) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        let mut seen = BTreeSet::new();
        let mut claim = |id: &EntityId| -> Result<(), CatalogError> {
            if seen.insert(id.clone()) {
                Ok(())
            } else {
                Err(CatalogError::DuplicateId { id: id.clone() })
            }
        };

        for entity in raw.resources {
            claim(&entity.id)?;
            catalog.resources.insert(entity.id.clone(), entity);
        }
        for entity in raw.dice {
            claim(&entity.id)?;
            catalog.dice.insert(entity.id.clone(), entity);
        }
        for entity in raw.techs {
            claim(&entity.id)?;
            catalog.techs.insert(entity.id.clone(), entity);
        }
        for entity in raw.buildings {
            claim(&entity.id)?;
            catalog.buildings.insert(entity.id.clone(), entity);
        }
        for entity in raw.vyrobas {
            claim(&entity.id)?;
            catalog.vyrobas.insert(entity.id.clone(), entity);
        }
        for entity in raw.attributes {
            claim(&entity.id)?;
            catalog.attributes.insert(entity.id.clone(), entity);
        }
        for tile in raw.tiles {
            if tile.parcels == 0 {
                return Err(CatalogError::EmptyTile { index: tile.index });
            }
            if catalog.tiles.insert(tile.index, tile.clone()).is_some() {
                return Err(CatalogError::DuplicateTile { index: tile.index });
            }
        }

        catalog.validate_tiles()?;
        catalog.validate_costs()?;
        catalog.validate_dice()?;
        catalog.validate_recipes()?;
        catalog.index_unlocks()?;
        Ok(catalog)
    }

    fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        if self.resources.contains_key(id) {
            Some(EntityKind::Resource)
        } else if self.dice.contains_key(id) {
            Some(EntityKind::Die)
        } else if self.techs.contains_key(id) {
            Some(EntityKind::Tech)
        } else if self.buildings.contains_key(id) {
            Some(EntityKind::Building)
        } else if self.vyrobas.contains_key(id) {
            Some(EntityKind::Vyroba)
        } else if self.attributes.contains_key(id) {
            Some(EntityKind::Attribute)
        } else {
            None
        }
    }

    fn expect_kind(
        &self,
        owner: &EntityId,
        target: &EntityId,
        expected: EntityKind,
    ) -> Result<(), CatalogError> {
        match self.kind_of(target) {
            Some(kind) if kind == expected => Ok(()),
            Some(_) => Err(CatalogError::WrongReferenceKind {
                owner: owner.clone(),
                target: target.clone(),
                expected: expected.as_str(),
            }),
            None => Err(CatalogError::MissingReference {
                owner: owner.clone(),
                target: target.clone(),
            }),
        }
    }

    fn validate_tiles(&self) -> Result<(), CatalogError> {
        for tile in self.tiles.values() {
            for &neighbour in &tile.neighbours {
                let other = self
                    .tiles
                    .get(&neighbour)
                    .ok_or(CatalogError::MissingNeighbour {
                        tile: tile.index,
                        neighbour,
                    })?;
                if !other.neighbours.contains(&tile.index) {
                    return Err(CatalogError::AsymmetricNeighbours {
                        a: tile.index,
                        b: neighbour,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_costs(&self) -> Result<(), CatalogError> {
        let priced = self
            .techs
            .values()
            .map(|e| (&e.id, &e.cost))
            .chain(self.buildings.values().map(|e| (&e.id, &e.cost)))
            .chain(self.vyrobas.values().map(|e| (&e.id, &e.cost)))
            .chain(self.attributes.values().map(|e| (&e.id, &e.cost)));

        for (owner, cost) in priced {
            self.validate_cost(owner, cost)?;
        }
        Ok(())
    }

    fn validate_cost(&self, owner: &EntityId, cost: &ResourceCost) -> Result<(), CatalogError> {
        for resource in cost.resources() {
            self.expect_kind(owner, resource, EntityKind::Resource)?;
        }
        if let Some((resource, _)) = cost.negative_entry() {
            return Err(CatalogError::NegativeCost {
                owner: owner.clone(),
                resource: resource.clone(),
            });
        }
        Ok(())
    }

    fn validate_dice(&self) -> Result<(), CatalogError> {
        let throwables = self
            .techs
            .values()
            .map(|e| e as &dyn Throwable)
            .chain(self.buildings.values().map(|e| e as &dyn Throwable))
            .chain(self.vyrobas.values().map(|e| e as &dyn Throwable));

        for entity in throwables {
            if entity.dice().is_empty() != (entity.dots() == 0) {
                return Err(CatalogError::DicePairing {
                    owner: entity.id().clone(),
                    dots: entity.dots(),
                    dice: entity.dice().len(),
                });
            }
            for die in entity.dice() {
                self.expect_kind(entity.id(), die, EntityKind::Die)?;
            }
        }
        Ok(())
    }

    fn validate_recipes(&self) -> Result<(), CatalogError> {
        for vyroba in self.vyrobas.values() {
            self.expect_kind(&vyroba.id, &vyroba.reward, EntityKind::Resource)?;
            if vyroba.amount.is_sign_negative() || vyroba.amount.is_zero() {
                return Err(CatalogError::InvalidReward {
                    vyroba: vyroba.id.clone(),
                });
            }
            if let Some(building) = &vyroba.building {
                self.expect_kind(&vyroba.id, building, EntityKind::Building)?;
            }
        }
        Ok(())
    }

    fn index_unlocks(&mut self) -> Result<(), CatalogError> {
        let mut unlockers: BTreeMap<EntityId, BTreeSet<EntityId>> = BTreeMap::new();
        for tech in self.techs.values() {
            for target in &tech.unlocks {
                match self.kind_of(target) {
                    None => {
                        return Err(CatalogError::MissingReference {
                            owner: tech.id.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(EntityKind::Resource) => {
                        return Err(CatalogError::WrongReferenceKind {
                            owner: tech.id.clone(),
                            target: target.clone(),
                            expected: "unlockable entity",
                        });
                    }
                    Some(_) => {
                        unlockers
                            .entry(target.clone())
                            .or_default()
                            .insert(tech.id.clone());
                    }
                }
            }
        }
        self.unlockers = unlockers;
        Ok(())
    }

    // ===== total accessors =====

    pub fn resource(&self, id: &EntityId) -> &ResourceEntity {
        self.try_resource(id)
            .unwrap_or_else(|| panic!("unknown resource {id}"))
    }

    pub fn tech(&self, id: &EntityId) -> &TechEntity {
        self.try_tech(id)
            .unwrap_or_else(|| panic!("unknown tech {id}"))
    }

    pub fn building(&self, id: &EntityId) -> &BuildingEntity {
        self.try_building(id)
            .unwrap_or_else(|| panic!("unknown building {id}"))
    }

    pub fn vyroba(&self, id: &EntityId) -> &VyrobaEntity {
        self.try_vyroba(id)
            .unwrap_or_else(|| panic!("unknown vyroba {id}"))
    }

    pub fn attribute(&self, id: &EntityId) -> &AttributeEntity {
        self.try_attribute(id)
            .unwrap_or_else(|| panic!("unknown attribute {id}"))
    }

    pub fn tile(&self, index: TileIndex) -> &TileTemplate {
        self.try_tile(index)
            .unwrap_or_else(|| panic!("unknown tile {index}"))
    }

    // ===== fallible accessors for untrusted ids =====

    pub fn try_resource(&self, id: &EntityId) -> Option<&ResourceEntity> {
        self.resources.get(id)
    }

    pub fn try_die(&self, id: &EntityId) -> Option<&DieEntity> {
        self.dice.get(id)
    }

    pub fn try_tech(&self, id: &EntityId) -> Option<&TechEntity> {
        self.techs.get(id)
    }

    pub fn try_building(&self, id: &EntityId) -> Option<&BuildingEntity> {
        self.buildings.get(id)
    }

    pub fn try_vyroba(&self, id: &EntityId) -> Option<&VyrobaEntity> {
        self.vyrobas.get(id)
    }

    pub fn try_attribute(&self, id: &EntityId) -> Option<&AttributeEntity> {
        self.attributes.get(id)
    }

    pub fn try_tile(&self, index: TileIndex) -> Option<&TileTemplate> {
        self.tiles.get(&index)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileTemplate> {
        self.tiles.values()
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceEntity> {
        self.resources.values()
    }

    pub fn vyrobas(&self) -> impl Iterator<Item = &VyrobaEntity> {
        self.vyrobas.values()
    }

    // ===== unlock graph =====

    /// Technologies whose research unlocks `id`.
    pub fn unlockers_of(&self, id: &EntityId) -> impl Iterator<Item = &EntityId> {
        self.unlockers.get(id).into_iter().flatten()
    }

    /// An entity is available when nothing unlocks it (a root) or when at
    /// least one of its unlockers has been researched.
    pub fn is_available(&self, researched: &BTreeSet<EntityId>, id: &EntityId) -> bool {
        match self.unlockers.get(id) {
            None => true,
            Some(techs) => techs.iter().any(|tech| researched.contains(tech)),
        }
    }

    /// Dice a team may throw given its researched technologies.
    pub fn available_dice(&self, researched: &BTreeSet<EntityId>) -> BTreeSet<EntityId> {
        self.dice
            .keys()
            .filter(|die| self.is_available(researched, die))
            .cloned()
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn loads_fixture_and_indexes_unlocks() {
        let catalog = catalog();
        let unlockers: Vec<_> = catalog.unlockers_of(&"tec-crafts".into()).collect();
        assert_eq!(unlockers, vec![&EntityId::from("tec-start")]);

        let researched = ids(["tec-start"]);
        assert!(catalog.is_available(&researched, &"tec-crafts".into()));
        assert!(!catalog.is_available(&researched, &"die-hory".into()));
        // roots are available to everyone
        assert!(catalog.is_available(&BTreeSet::new(), &"tec-start".into()));
        assert_eq!(catalog.available_dice(&researched), ids(["die-lesy"]));
    }

    #[test]
    fn rejects_duplicate_ids_across_kinds() {
        let mut raw = raw_tables();
        raw.attributes[0].id = "pro-wood".into();
        assert_eq!(
            Catalog::load(raw),
            Err(CatalogError::DuplicateId {
                id: "pro-wood".into()
            })
        );
    }

    #[test]
    fn rejects_missing_cross_reference() {
        let mut raw = raw_tables();
        raw.techs[1].unlocks.push("bui-castle".into());
        assert!(matches!(
            Catalog::load(raw),
            Err(CatalogError::MissingReference { target, .. }) if target.as_str() == "bui-castle"
        ));
    }

    #[test]
    fn rejects_dots_without_dice() {
        let mut raw = raw_tables();
        raw.techs[1].dice.clear();
        assert!(matches!(
            Catalog::load(raw),
            Err(CatalogError::DicePairing { dots: 4, dice: 0, .. })
        ));
    }

    #[test]
    fn rejects_dice_without_dots() {
        let mut raw = raw_tables();
        raw.vyrobas[1].dots = 0;
        assert!(matches!(
            Catalog::load(raw),
            Err(CatalogError::DicePairing { dots: 0, dice: 1, .. })
        ));
    }

    #[test]
    fn rejects_one_sided_neighbours() {
        let mut raw = raw_tables();
        raw.tiles[2].neighbours.clear();
        assert_eq!(
            Catalog::load(raw),
            Err(CatalogError::AsymmetricNeighbours { a: 2, b: 3 })
        );
    }

    #[test]
    fn rejects_resource_as_unlock_target() {
        let mut raw = raw_tables();
        raw.techs[0].unlocks.push("pro-wood".into());
        assert!(matches!(
            Catalog::load(raw),
            Err(CatalogError::WrongReferenceKind { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "unknown tech")]
    fn total_accessor_panics_on_unknown_id() {
        catalog().tech(&"tec-missing".into());
    }
}
