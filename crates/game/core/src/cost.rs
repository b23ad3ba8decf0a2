//! Resource prices and dice requirements.
//!
//! Every action attempt has a [`ResourceCost`] and a [`DiceRequirement`].
//! Both are computed from the action arguments and a read-only view of the
//! state, so evaluating them any number of times never changes anything.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::state::EntityId;

/// An amount left the representable decimal range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("amount of {resource} is out of range")]
pub struct AmountOverflow {
    pub resource: EntityId,
}

/// Ordered mapping resource → exact amount.
///
/// Zero-valued entries are kept: a cost lists every resource it names, and an
/// absent resource simply costs nothing. Arithmetic on request-supplied
/// amounts is checked and reports [`AmountOverflow`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourceCost(BTreeMap<EntityId, Decimal>);

impl ResourceCost {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion for fixed amounts. Amounts for the same
    /// resource accumulate, saturating at the decimal range.
    #[must_use]
    pub fn with(mut self, resource: impl Into<EntityId>, amount: Decimal) -> Self {
        let entry = self.0.entry(resource.into()).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(amount);
        self
    }

    pub fn add(&mut self, resource: EntityId, amount: Decimal) -> Result<(), AmountOverflow> {
        let current = self.get(&resource);
        let sum = current
            .checked_add(amount)
            .ok_or_else(|| AmountOverflow {
                resource: resource.clone(),
            })?;
        self.0.insert(resource, sum);
        Ok(())
    }

    pub fn get(&self, resource: &EntityId) -> Decimal {
        self.0.get(resource).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Decimal)> {
        self.0.iter()
    }

    pub fn resources(&self) -> impl Iterator<Item = &EntityId> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every listed amount is zero (or nothing is listed).
    pub fn is_free(&self) -> bool {
        self.0.values().all(|amount| amount.is_zero())
    }

    /// Returns the first resource with a negative amount, if any.
    pub fn negative_entry(&self) -> Option<(&EntityId, Decimal)> {
        self.0
            .iter()
            .find(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            .map(|(id, amount)| (id, *amount))
    }

    /// Sum of every listed amount, regardless of resource.
    pub fn total(&self) -> Result<Decimal, AmountOverflow> {
        self.0.iter().try_fold(Decimal::ZERO, |sum, (id, amount)| {
            sum.checked_add(*amount)
                .ok_or_else(|| AmountOverflow { resource: id.clone() })
        })
    }

    /// Multiplies every amount by `factor`.
    pub fn scaled(&self, factor: Decimal) -> Result<Self, AmountOverflow> {
        self.0
            .iter()
            .map(|(id, amount)| {
                amount
                    .checked_mul(factor)
                    .map(|scaled| (id.clone(), scaled))
                    .ok_or_else(|| AmountOverflow { resource: id.clone() })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    /// Sums two costs entry by entry.
    pub fn merged(&self, other: &ResourceCost) -> Result<Self, AmountOverflow> {
        let mut merged = self.clone();
        for (id, amount) in other.iter() {
            merged.add(id.clone(), *amount)?;
        }
        Ok(merged)
    }
}

impl<'a> IntoIterator for &'a ResourceCost {
    type Item = (&'a EntityId, &'a Decimal);
    type IntoIter = std::collections::btree_map::Iter<'a, EntityId, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Dice that may be thrown for an action together with the dots that must be
/// reached.
///
/// Invariant: `required_dots == 0` exactly when `allowed` is empty.
/// [`DiceRequirement::new`] refuses violating pairs; the fields stay public
/// for deserialization, so the engine re-checks every computed requirement
/// with [`DiceRequirement::is_consistent`] before committing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRequirement {
    pub allowed: BTreeSet<EntityId>,
    pub required_dots: u32,
}

impl DiceRequirement {
    /// No throw needed.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(allowed: BTreeSet<EntityId>, required_dots: u32) -> Result<Self, DicePairingError> {
        let requirement = Self {
            allowed,
            required_dots,
        };
        if requirement.is_consistent() {
            Ok(requirement)
        } else {
            Err(DicePairingError {
                dice: requirement.allowed.len(),
                dots: requirement.required_dots,
            })
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.allowed.is_empty() == (self.required_dots == 0)
    }

    pub fn requires_throw(&self) -> bool {
        self.required_dots > 0
    }
}

/// Dots were required without any die to throw, or dice without dots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{dice} allowed dice cannot pair with {dots} required dots")]
pub struct DicePairingError {
    pub dice: usize,
    pub dots: u32,
}

/// Outcome of a physical dice throw supplied by the organizer at commit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRoll {
    pub die: EntityId,
    pub dots: u32,
}

impl DiceRoll {
    pub fn new(die: impl Into<EntityId>, dots: u32) -> Self {
        Self {
            die: die.into(),
            dots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_accumulates_shared_resources() {
        let a = ResourceCost::new()
            .with("res-work", Decimal::new(10, 0))
            .with("pro-wood", Decimal::ZERO);
        let b = ResourceCost::new().with("res-work", Decimal::new(25, 1));

        let merged = a.merged(&b).unwrap();

        assert_eq!(merged.get(&"res-work".into()), Decimal::new(125, 1));
        // explicit zero survives the merge
        assert!(merged.resources().any(|id| id.as_str() == "pro-wood"));
        assert!(!merged.is_free());
    }

    #[test]
    fn dice_pairing_requires_both_or_neither() {
        assert!(DiceRequirement::none().is_consistent());
        assert_eq!(
            DiceRequirement::new(BTreeSet::new(), 3),
            Err(DicePairingError { dice: 0, dots: 3 })
        );

        let dice: BTreeSet<EntityId> = ["die-lesy".into()].into_iter().collect();
        assert!(DiceRequirement::new(dice.clone(), 0).is_err());
        assert!(DiceRequirement::new(dice, 3).unwrap().is_consistent());

        let forged = DiceRequirement {
            allowed: BTreeSet::new(),
            required_dots: 2,
        };
        assert!(!forged.is_consistent());
    }

    #[test]
    fn scaled_keeps_exact_decimals() {
        let cost = ResourceCost::new().with("pro-grain", Decimal::new(1, 1));
        let scaled = cost.scaled(Decimal::from(3)).unwrap();
        assert_eq!(scaled.get(&"pro-grain".into()), Decimal::new(3, 1));
    }

    #[test]
    fn arithmetic_past_the_decimal_range_is_an_error() {
        let huge = ResourceCost::new().with("mat-wood", Decimal::MAX);
        assert_eq!(
            huge.scaled(Decimal::from(2)),
            Err(AmountOverflow {
                resource: "mat-wood".into()
            })
        );
        assert!(huge.merged(&huge).is_err());

        let mut both = huge.clone().with("mat-stone", Decimal::ONE);
        assert!(both.total().is_err());
        assert!(both.add("mat-stone".into(), Decimal::ONE).is_ok());
        assert_eq!(both.get(&"mat-stone".into()), Decimal::from(2));

        // fixed amounts saturate instead
        let saturated = huge.with("mat-wood", Decimal::ONE);
        assert_eq!(saturated.get(&"mat-wood".into()), Decimal::MAX);
    }
}
