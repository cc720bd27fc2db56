//! Property Registry
//!
//! Owns property metadata and the active flag. Every other component
//! re-checks `is_active` through this registry before mutating anything.
//!
//! # Invariants
//!
//! - Property ids are sequential, starting at 1
//! - `total_supply` is immutable after registration
//! - `is_active` flips to false at most once; there is no reactivation path

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use lib_types::{Address, Amount, PropertyId, Timestamp, Units};

use crate::errors::{EstateError, EstateResult};

/// A tokenized divisible asset record with a fixed unit supply cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Unique property id
    pub id: PropertyId,

    /// Human-readable property name
    pub name: String,

    /// Free-text location
    pub location: String,

    /// Fixed supply cap, set once at registration
    pub total_supply: Units,

    /// Purchase price per unit
    pub price_per_unit: Amount,

    /// Whether the property accepts operations
    pub is_active: bool,

    /// Principal that registered the property; authorizes deposits and
    /// deactivation
    pub admin: Address,

    /// Clock marker at registration
    pub created_at: Timestamp,
}

/// Registry of all properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRegistry {
    /// Process-wide admin allowed to register properties
    registrar: Address,

    /// Next property id to assign
    next_property_id: PropertyId,

    /// All properties
    properties: HashMap<PropertyId, Property>,
}

impl PropertyRegistry {
    /// Create an empty registry under the given registrar
    pub fn new(registrar: Address) -> Self {
        Self {
            registrar,
            next_property_id: 1,
            properties: HashMap::new(),
        }
    }

    /// The process-wide registrar address
    pub fn registrar(&self) -> &Address {
        &self.registrar
    }

    /// Register a new property
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` is the registrar
    /// - `InvalidInput` on zero supply, zero price, or empty name/location
    pub fn register(
        &mut self,
        name: String,
        location: String,
        total_supply: Units,
        price_per_unit: Amount,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<PropertyId> {
        if caller != self.registrar {
            return Err(EstateError::Unauthorized(
                "only the registrar can register properties".to_string(),
            ));
        }

        if name.is_empty() || location.is_empty() {
            return Err(EstateError::InvalidInput(
                "property name and location cannot be empty".to_string(),
            ));
        }

        if total_supply == 0 {
            return Err(EstateError::InvalidInput(
                "total supply must be greater than zero".to_string(),
            ));
        }

        if price_per_unit == 0 {
            return Err(EstateError::InvalidInput(
                "price per unit must be greater than zero".to_string(),
            ));
        }

        let id = self.next_property_id;
        let next = id.checked_add(1).ok_or(EstateError::Overflow)?;

        self.properties.insert(
            id,
            Property {
                id,
                name,
                location,
                total_supply,
                price_per_unit,
                is_active: true,
                admin: caller,
                created_at: now,
            },
        );
        self.next_property_id = next;

        info!(property = id, "property registered");
        Ok(id)
    }

    /// Deactivate a property (one-way)
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound`
    /// - `Unauthorized` unless `caller` is the property admin
    pub fn deactivate(&mut self, id: PropertyId, caller: Address) -> EstateResult<()> {
        let property = self
            .properties
            .get_mut(&id)
            .ok_or(EstateError::PropertyNotFound(id))?;

        if caller != property.admin {
            return Err(EstateError::Unauthorized(
                "only the property admin can deactivate".to_string(),
            ));
        }

        property.is_active = false;
        info!(property = id, "property deactivated");
        Ok(())
    }

    /// Get a property by id
    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    /// Number of registered properties
    pub fn count(&self) -> u64 {
        self.properties.len() as u64
    }

    /// Look up a property that must exist and be active
    pub fn require_active(&self, id: PropertyId) -> EstateResult<&Property> {
        let property = self
            .properties
            .get(&id)
            .ok_or(EstateError::PropertyNotFound(id))?;

        if !property.is_active {
            return Err(EstateError::InactiveProperty(id));
        }

        Ok(property)
    }
}
