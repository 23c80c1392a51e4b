//! Property repository.
//!
//! Query surface mirrors the schema's indexes: exact lookup by plotcode,
//! filter by phone validity, and membership over the two tag columns. On
//! SQLite the tag columns are JSON text, so membership is a LIKE prefilter
//! followed by an exact check on the decoded array.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewProperty, PropertyRecord};
use super::pool::{DbError, SqlitePool};
use super::{parse_datetime, tags_from_json, tags_to_json};
use crate::models::Property;
use crate::schema::{outreach_records, property_owners};

impl From<PropertyRecord> for Property {
    fn from(record: PropertyRecord) -> Self {
        Property {
            plotcode: record.plotcode,
            district_names: tags_from_json(&record.district_names),
            industrial_areas: tags_from_json(&record.industrial_areas),
            plot_number: record.plot_number,
            area_acres: record.area_acres,
            allottee_name: record.allottee_name,
            allottee_phone: record.allottee_phone,
            allottee_email: record.allottee_email,
            address: record.address,
            nature_of_industry: record.nature_of_industry,
            ulpin: record.ulpin,
            plot_status: record.plot_status,
            phone_valid: record.phone_valid != 0,
            email_valid: record.email_valid != 0,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Diesel-based property repository with compile-time query checking.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

impl PropertyRepository {
    /// Create a new property repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a property by plotcode.
    pub async fn get(&self, plotcode: &str) -> Result<Option<Property>, DbError> {
        let mut conn = self.pool.get().await?;

        property_owners::table
            .find(plotcode)
            .first::<PropertyRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Property::from))
    }

    /// Get all properties.
    pub async fn get_all(&self) -> Result<Vec<Property>, DbError> {
        let mut conn = self.pool.get().await?;

        property_owners::table
            .order(property_owners::plotcode.asc())
            .load::<PropertyRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Property::from).collect())
    }

    /// Save a property (insert or update on plotcode).
    pub async fn save(&self, property: &Property) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        let districts = tags_to_json(&property.district_names);
        let areas = tags_to_json(&property.industrial_areas);
        let created_at = property.created_at.to_rfc3339();
        let updated_at = property.updated_at.to_rfc3339();

        let record = NewProperty {
            plotcode: &property.plotcode,
            district_names: &districts,
            industrial_areas: &areas,
            plot_number: property.plot_number.as_deref(),
            area_acres: property.area_acres,
            allottee_name: property.allottee_name.as_deref(),
            allottee_phone: property.allottee_phone.as_deref(),
            allottee_email: property.allottee_email.as_deref(),
            address: property.address.as_deref(),
            nature_of_industry: property.nature_of_industry.as_deref(),
            ulpin: property.ulpin.as_deref(),
            plot_status: property.plot_status.as_deref(),
            phone_valid: property.phone_valid as i32,
            email_valid: property.email_valid as i32,
            created_at: &created_at,
            updated_at: &updated_at,
        };

        diesel::insert_into(property_owners::table)
            .values(&record)
            .on_conflict(property_owners::plotcode)
            .do_update()
            .set((
                property_owners::district_names.eq(&districts),
                property_owners::industrial_areas.eq(&areas),
                property_owners::plot_number.eq(property.plot_number.as_deref()),
                property_owners::area_acres.eq(property.area_acres),
                property_owners::allottee_name.eq(property.allottee_name.as_deref()),
                property_owners::allottee_phone.eq(property.allottee_phone.as_deref()),
                property_owners::allottee_email.eq(property.allottee_email.as_deref()),
                property_owners::address.eq(property.address.as_deref()),
                property_owners::nature_of_industry.eq(property.nature_of_industry.as_deref()),
                property_owners::ulpin.eq(property.ulpin.as_deref()),
                property_owners::plot_status.eq(property.plot_status.as_deref()),
                property_owners::phone_valid.eq(property.phone_valid as i32),
                property_owners::email_valid.eq(property.email_valid as i32),
                property_owners::updated_at.eq(&updated_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Delete a property and its outreach row.
    ///
    /// The child row goes first; the foreign key would reject the reverse
    /// order.
    pub async fn delete(&self, plotcode: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        diesel::delete(outreach_records::table.find(plotcode))
            .execute(&mut conn)
            .await?;

        let rows = diesel::delete(property_owners::table.find(plotcode))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Check if a property exists.
    pub async fn exists(&self, plotcode: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = property_owners::table
            .filter(property_owners::plotcode.eq(plotcode))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Count all properties.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        property_owners::table.select(count_star()).first(&mut conn).await
    }

    /// Count properties whose phone passed validation.
    pub async fn count_phone_valid(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        property_owners::table
            .filter(property_owners::phone_valid.eq(1))
            .select(count_star())
            .first(&mut conn)
            .await
    }

    /// Properties whose phone passed validation.
    pub async fn find_with_valid_phone(&self, limit: i64) -> Result<Vec<Property>, DbError> {
        let mut conn = self.pool.get().await?;

        property_owners::table
            .filter(property_owners::phone_valid.eq(1))
            .order(property_owners::plotcode.asc())
            .limit(limit)
            .load::<PropertyRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Property::from).collect())
    }

    /// Properties listed under a district.
    pub async fn find_by_district(&self, district: &str) -> Result<Vec<Property>, DbError> {
        self.find_by_tag(TagColumn::District, district).await
    }

    /// Properties listed under an industrial area.
    pub async fn find_by_industrial_area(&self, area: &str) -> Result<Vec<Property>, DbError> {
        self.find_by_tag(TagColumn::IndustrialArea, area).await
    }

    async fn find_by_tag(&self, column: TagColumn, value: &str) -> Result<Vec<Property>, DbError> {
        let mut conn = self.pool.get().await?;

        // JSON-encode the needle so the LIKE pattern matches the stored
        // representation, escapes included.
        let fragment = serde_json::to_string(value).unwrap_or_default();
        let pattern = format!("%{fragment}%");

        let records = match column {
            TagColumn::District => {
                property_owners::table
                    .filter(property_owners::district_names.like(&pattern))
                    .order(property_owners::plotcode.asc())
                    .load::<PropertyRecord>(&mut conn)
                    .await?
            }
            TagColumn::IndustrialArea => {
                property_owners::table
                    .filter(property_owners::industrial_areas.like(&pattern))
                    .order(property_owners::plotcode.asc())
                    .load::<PropertyRecord>(&mut conn)
                    .await?
            }
        };

        // The LIKE pass is a prefilter; confirm membership on the decoded array.
        Ok(records
            .into_iter()
            .map(Property::from)
            .filter(|p| {
                let tags = match column {
                    TagColumn::District => &p.district_names,
                    TagColumn::IndustrialArea => &p.industrial_areas,
                };
                tags.iter().any(|t| t == value)
            })
            .collect())
    }
}

#[derive(Clone, Copy)]
enum TagColumn {
    District,
    IndustrialArea,
}
