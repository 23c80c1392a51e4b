//! Outreach enrichment records.
//!
//! One-to-one dependent of [`super::Property`]: a row exists only for
//! plotcodes present in the parent table, and every property has at most one.
//! A blank row is seeded when a property first enters the registry; the
//! enrichment fields fill in as outreach progresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enrichment data gathered by the outreach process for one plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outreach {
    /// Foreign key into the property table.
    pub plotcode: String,
    /// Whether the owner expressed interest in taking tenants.
    pub tenant_interested: Option<bool>,
    /// Free-text description of power and water availability.
    pub power_water_availability: Option<String>,
    pub zone: Option<String>,
    pub price_per_sqft: Option<f64>,
    /// Contact number confirmed during outreach (may differ from the allottee phone).
    pub contact_number: Option<String>,
    /// Free-text list of current tenants.
    pub tenants: Option<String>,
    pub lease_duration: Option<String>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Outreach {
    /// Blank enrichment row for a newly registered property.
    pub fn new(plotcode: String) -> Self {
        Self {
            plotcode,
            tenant_interested: None,
            power_water_availability: None,
            zone: None,
            price_per_sqft: None,
            contact_number: None,
            tenants: None,
            lease_duration: None,
            last_contacted: None,
            created_at: Utc::now(),
        }
    }

    /// Whether any enrichment field has been filled in yet.
    pub fn is_blank(&self) -> bool {
        self.tenant_interested.is_none()
            && self.power_water_availability.is_none()
            && self.zone.is_none()
            && self.price_per_sqft.is_none()
            && self.contact_number.is_none()
            && self.tenants.is_none()
            && self.lease_duration.is_none()
            && self.last_contacted.is_none()
    }
}
