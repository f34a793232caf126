//! Read-only service catalog reference data.
//!
//! The catalog is static configuration from the lifecycle core's point of
//! view: it is loaded at startup and consulted at submission time to
//! check that the requested service exists and is active, and to pick up
//! the published fee.

use crate::error::LifecycleError;
use crate::types::{Money, ServiceId};
use std::collections::HashMap;

/// One entry in the service catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Catalog identifier.
    pub id: ServiceId,
    /// Human-readable service name.
    pub name: String,
    /// Grouping shown in the portal ("certificates", "licences", ...).
    pub category: String,
    /// Published fee, if the service charges one.
    pub fee: Option<Money>,
    /// Advertised processing time in days.
    pub processing_days: u32,
    /// Inactive services cannot receive new applications.
    pub active: bool,
}

/// The set of services citizens can apply for.
#[derive(Clone, Debug, Default)]
pub struct ServiceCatalog {
    services: HashMap<ServiceId, ServiceDefinition>,
}

impl ServiceCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the standard service set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for (name, category, fee, days) in [
            ("Birth Certificate", "certificates", Some(Money::from_rupees(50)), 7),
            ("Death Certificate", "certificates", Some(Money::from_rupees(50)), 7),
            ("Income Certificate", "certificates", Some(Money::from_rupees(30)), 15),
            ("Trade Licence", "licences", Some(Money::from_rupees(500)), 30),
            ("Water Connection", "utilities", Some(Money::from_rupees(250)), 21),
            ("Grievance Redressal", "services", None, 10),
        ] {
            catalog.insert(ServiceDefinition {
                id: ServiceId::new(),
                name: name.to_string(),
                category: category.to_string(),
                fee,
                processing_days: days,
                active: true,
            });
        }
        catalog
    }

    /// Adds or replaces a service definition.
    pub fn insert(&mut self, service: ServiceDefinition) {
        self.services.insert(service.id, service);
    }

    /// Looks up a service by id.
    #[must_use]
    pub fn get(&self, id: ServiceId) -> Option<&ServiceDefinition> {
        self.services.get(&id)
    }

    /// Looks up a service by name (catalog names are unique).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.values().find(|s| s.name == name)
    }

    /// Looks up a service that must exist and be active.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the service is missing
    /// or inactive; callers cannot distinguish the two.
    pub fn require_active(&self, id: ServiceId) -> Result<&ServiceDefinition, LifecycleError> {
        self.services
            .get(&id)
            .filter(|s| s.active)
            .ok_or_else(|| LifecycleError::not_found("service", id))
    }

    /// Number of catalog entries (active or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
