use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::cost::{AmountOverflow, ResourceCost};
use crate::state::EntityId;

/// Failure of a ledger mutation. The ledger is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedgerError {
    #[error("{resource}: required {required}, available {available}")]
    Insufficient {
        resource: EntityId,
        required: Decimal,
        available: Decimal,
    },

    #[error("{resource}: amount {amount} is negative")]
    NegativeAmount { resource: EntityId, amount: Decimal },

    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

/// Exact, never-negative resource balances.
///
/// Every mutation is checked; a failing multi-resource operation changes
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourceLedger(BTreeMap<EntityId, Decimal>);

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: &EntityId) -> Decimal {
        self.0.get(resource).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Decimal)> {
        self.0.iter()
    }

    /// First resource whose balance is negative. Only reachable through
    /// deserialized or operator-edited snapshots.
    pub fn negative_entry(&self) -> Option<(&EntityId, Decimal)> {
        self.0
            .iter()
            .find(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            .map(|(id, amount)| (id, *amount))
    }

    /// Checks that every entry of `cost` is covered.
    pub fn can_afford(&self, cost: &ResourceCost) -> Result<(), LedgerError> {
        for (resource, required) in cost {
            if required.is_sign_negative() && !required.is_zero() {
                return Err(LedgerError::NegativeAmount {
                    resource: resource.clone(),
                    amount: *required,
                });
            }
            let available = self.get(resource);
            if available < *required {
                return Err(LedgerError::Insufficient {
                    resource: resource.clone(),
                    required: *required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Deducts the whole cost or nothing.
    pub fn spend(&mut self, cost: &ResourceCost) -> Result<(), LedgerError> {
        self.can_afford(cost)?;
        for (resource, amount) in cost {
            if amount.is_zero() {
                continue;
            }
            *self.0.entry(resource.clone()).or_insert(Decimal::ZERO) -= *amount;
        }
        Ok(())
    }

    pub fn take(&mut self, resource: &EntityId, amount: Decimal) -> Result<(), LedgerError> {
        self.spend(&ResourceCost::new().with(resource.clone(), amount))
    }

    pub fn receive(&mut self, resource: &EntityId, amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(LedgerError::NegativeAmount {
                resource: resource.clone(),
                amount,
            });
        }
        let balance = self
            .get(resource)
            .checked_add(amount)
            .ok_or_else(|| AmountOverflow {
                resource: resource.clone(),
            })?;
        self.0.insert(resource.clone(), balance);
        Ok(())
    }

    /// Credits every amount or nothing.
    pub fn receive_all(&mut self, amounts: &ResourceCost) -> Result<(), LedgerError> {
        if let Some((resource, amount)) = amounts.negative_entry() {
            return Err(LedgerError::NegativeAmount {
                resource: resource.clone(),
                amount,
            });
        }
        let mut credited = self.clone();
        for (resource, amount) in amounts {
            credited.receive(resource, *amount)?;
        }
        *self = credited;
        Ok(())
    }

    /// Overwrites a balance.
    pub fn set(&mut self, resource: &EntityId, amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(LedgerError::NegativeAmount {
                resource: resource.clone(),
                amount,
            });
        }
        self.0.insert(resource.clone(), amount);
        Ok(())
    }
}

impl FromIterator<(EntityId, Decimal)> for ResourceLedger {
    fn from_iter<I: IntoIterator<Item = (EntityId, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
