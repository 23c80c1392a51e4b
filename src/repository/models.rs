//! Diesel ORM models for the registry tables.
//!
//! These models provide compile-time type checking for database operations.
//! Operations run through diesel-async's SyncConnectionWrapper for SQLite.

use diesel::prelude::*;

use crate::schema;

/// Property record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::property_owners)]
#[diesel(primary_key(plotcode))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyRecord {
    pub plotcode: String,
    pub district_names: String,
    pub industrial_areas: String,
    pub plot_number: Option<String>,
    pub area_acres: Option<f64>,
    pub allottee_name: Option<String>,
    pub allottee_phone: Option<String>,
    pub allottee_email: Option<String>,
    pub address: Option<String>,
    pub nature_of_industry: Option<String>,
    pub ulpin: Option<String>,
    pub plot_status: Option<String>,
    pub phone_valid: i32,
    pub email_valid: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// New property for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::property_owners)]
pub struct NewProperty<'a> {
    pub plotcode: &'a str,
    pub district_names: &'a str,
    pub industrial_areas: &'a str,
    pub plot_number: Option<&'a str>,
    pub area_acres: Option<f64>,
    pub allottee_name: Option<&'a str>,
    pub allottee_phone: Option<&'a str>,
    pub allottee_email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub nature_of_industry: Option<&'a str>,
    pub ulpin: Option<&'a str>,
    pub plot_status: Option<&'a str>,
    pub phone_valid: i32,
    pub email_valid: i32,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Outreach record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::outreach_records)]
#[diesel(primary_key(plotcode))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutreachRecord {
    pub plotcode: String,
    pub tenant_interested: Option<i32>,
    pub power_water_availability: Option<String>,
    pub zone: Option<String>,
    pub price_per_sqft: Option<f64>,
    pub contact_number: Option<String>,
    pub tenants: Option<String>,
    pub lease_duration: Option<String>,
    pub last_contacted: Option<String>,
    pub created_at: String,
}

/// New outreach record for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::outreach_records)]
pub struct NewOutreach<'a> {
    pub plotcode: &'a str,
    pub tenant_interested: Option<i32>,
    pub power_water_availability: Option<&'a str>,
    pub zone: Option<&'a str>,
    pub price_per_sqft: Option<f64>,
    pub contact_number: Option<&'a str>,
    pub tenants: Option<&'a str>,
    pub lease_duration: Option<&'a str>,
    pub last_contacted: Option<&'a str>,
    pub created_at: &'a str,
}
