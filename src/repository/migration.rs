//! Database migration traits and portable record types.
//!
//! Provides a trait-based abstraction for exporting and importing registry
//! contents, enabling migration between database backends (SQLite, Postgres).
//!
//! The portable record types use owned values and are serializable to
//! JSON/JSONL, making them suitable for cross-database migration and file
//! dumps.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pool::DbError;
use super::tags_from_json;

/// Progress callback for import operations.
/// Called with the current count of imported records.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Portable property record for migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableProperty {
    pub plotcode: String,
    #[serde(default)]
    pub district_names: Vec<String>,
    #[serde(default)]
    pub industrial_areas: Vec<String>,
    pub plot_number: Option<String>,
    pub area_acres: Option<f64>,
    pub allottee_name: Option<String>,
    pub allottee_phone: Option<String>,
    pub allottee_email: Option<String>,
    pub address: Option<String>,
    pub nature_of_industry: Option<String>,
    pub ulpin: Option<String>,
    pub plot_status: Option<String>,
    #[serde(default)]
    pub phone_valid: bool,
    #[serde(default)]
    pub email_valid: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Portable outreach record for migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableOutreach {
    pub plotcode: String,
    pub tenant_interested: Option<bool>,
    pub power_water_availability: Option<String>,
    pub zone: Option<String>,
    pub price_per_sqft: Option<f64>,
    pub contact_number: Option<String>,
    pub tenants: Option<String>,
    pub lease_duration: Option<String>,
    pub last_contacted: Option<String>,
    pub created_at: String,
}

/// Trait for exporting registry contents to portable format.
#[async_trait]
pub trait DatabaseExporter: Send + Sync {
    /// Export all property records.
    async fn export_properties(&self) -> Result<Vec<PortableProperty>, DbError>;

    /// Export all outreach records.
    async fn export_outreach(&self) -> Result<Vec<PortableOutreach>, DbError>;
}

/// Trait for importing registry contents from portable format.
///
/// Implementations upsert on plotcode so incremental transfers are safe to
/// re-run. Properties import before outreach rows; the foreign key demands it.
#[async_trait]
pub trait DatabaseImporter: Send + Sync {
    /// Clear all data before import. Removes outreach rows before property
    /// rows.
    async fn clear_all(&self) -> Result<(), DbError>;

    /// Import property records.
    async fn import_properties(
        &self,
        properties: &[PortableProperty],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError>;

    /// Import outreach records.
    async fn import_outreach(
        &self,
        outreach: &[PortableOutreach],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError>;

    /// Seed blank outreach rows for plotcodes that lack one.
    ///
    /// Plotcodes that already have a row are skipped; returns the number
    /// inserted.
    async fn seed_outreach(&self, plotcodes: &[String]) -> Result<usize, DbError>;
}

impl From<super::models::PropertyRecord> for PortableProperty {
    fn from(r: super::models::PropertyRecord) -> Self {
        PortableProperty {
            plotcode: r.plotcode,
            district_names: tags_from_json(&r.district_names),
            industrial_areas: tags_from_json(&r.industrial_areas),
            plot_number: r.plot_number,
            area_acres: r.area_acres,
            allottee_name: r.allottee_name,
            allottee_phone: r.allottee_phone,
            allottee_email: r.allottee_email,
            address: r.address,
            nature_of_industry: r.nature_of_industry,
            ulpin: r.ulpin,
            plot_status: r.plot_status,
            phone_valid: r.phone_valid != 0,
            email_valid: r.email_valid != 0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<super::models::OutreachRecord> for PortableOutreach {
    fn from(r: super::models::OutreachRecord) -> Self {
        PortableOutreach {
            plotcode: r.plotcode,
            tenant_interested: r.tenant_interested.map(|v| v != 0),
            power_water_availability: r.power_water_availability,
            zone: r.zone,
            price_per_sqft: r.price_per_sqft,
            contact_number: r.contact_number,
            tenants: r.tenants,
            lease_duration: r.lease_duration,
            last_contacted: r.last_contacted,
            created_at: r.created_at,
        }
    }
}

impl From<crate::models::Property> for PortableProperty {
    fn from(p: crate::models::Property) -> Self {
        PortableProperty {
            plotcode: p.plotcode,
            district_names: p.district_names,
            industrial_areas: p.industrial_areas,
            plot_number: p.plot_number,
            area_acres: p.area_acres,
            allottee_name: p.allottee_name,
            allottee_phone: p.allottee_phone,
            allottee_email: p.allottee_email,
            address: p.address,
            nature_of_industry: p.nature_of_industry,
            ulpin: p.ulpin,
            plot_status: p.plot_status,
            phone_valid: p.phone_valid,
            email_valid: p.email_valid,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

impl From<PortableProperty> for crate::models::Property {
    fn from(p: PortableProperty) -> Self {
        crate::models::Property {
            plotcode: p.plotcode,
            district_names: p.district_names,
            industrial_areas: p.industrial_areas,
            plot_number: p.plot_number,
            area_acres: p.area_acres,
            allottee_name: p.allottee_name,
            allottee_phone: p.allottee_phone,
            allottee_email: p.allottee_email,
            address: p.address,
            nature_of_industry: p.nature_of_industry,
            ulpin: p.ulpin,
            plot_status: p.plot_status,
            phone_valid: p.phone_valid,
            email_valid: p.email_valid,
            created_at: super::parse_datetime(&p.created_at),
            updated_at: super::parse_datetime(&p.updated_at),
        }
    }
}
