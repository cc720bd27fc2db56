//! Token Ledger
//!
//! Owns the per-property issued-unit counter and per-(property, holder)
//! balances. Units are only ever created through the purchase path; there
//! is no burn or holder-to-holder transfer, so `issued` never decreases.
//!
//! # Invariants
//!
//! - For every property, `sum(balances) == issued_units <= total_supply`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use lib_types::{Address, PropertyId, Units};

use crate::errors::{EstateError, EstateResult};

/// Unit balances and issuance counters for all properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Units sold so far, per property
    issued: HashMap<PropertyId, Units>,

    /// Holder balances, keyed (property, holder)
    balances: HashMap<(PropertyId, Address), Units>,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of a holder in a property (0 if no record)
    pub fn balance_of(&self, property: PropertyId, holder: &Address) -> Units {
        self.balances
            .get(&(property, *holder))
            .copied()
            .unwrap_or(0)
    }

    /// Units issued so far for a property (0 if no record)
    pub fn issued_units(&self, property: PropertyId) -> Units {
        self.issued.get(&property).copied().unwrap_or(0)
    }

    /// Credit purchased units to a holder
    ///
    /// Capacity is validated by the caller against the property's supply
    /// cap before any value moves; both writes are staged and committed
    /// together so balance and issued counter never diverge.
    pub fn credit(
        &mut self,
        property: PropertyId,
        holder: &Address,
        amount: Units,
    ) -> EstateResult<Units> {
        let new_balance = self
            .balance_of(property, holder)
            .checked_add(amount)
            .ok_or(EstateError::Overflow)?;
        let new_issued = self
            .issued_units(property)
            .checked_add(amount)
            .ok_or(EstateError::Overflow)?;

        self.balances.insert((property, *holder), new_balance);
        self.issued.insert(property, new_issued);

        Ok(new_balance)
    }

    /// Number of holders with a non-zero balance in a property
    pub fn holder_count(&self, property: PropertyId) -> usize {
        self.balances
            .iter()
            .filter(|((p, _), balance)| *p == property && **balance > 0)
            .count()
    }

    /// Conservation audit: `sum(balances) == issued_units <= total_supply`
    pub fn audit_supply(&self, property: PropertyId, total_supply: Units) -> bool {
        let issued = self.issued_units(property);
        if issued > total_supply {
            return false;
        }

        let sum: Units = self
            .balances
            .iter()
            .filter(|((p, _), _)| *p == property)
            .map(|(_, balance)| *balance)
            .sum();
        sum == issued
    }
}
