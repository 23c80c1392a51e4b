//! Outreach repository.
//!
//! Rows here are one-to-one children of property records; the foreign key is
//! enforced, so saving outreach data for an unknown plotcode is an error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewOutreach, OutreachRecord};
use super::pool::{DbError, SqlitePool};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::Outreach;
use crate::schema::outreach_records;

impl From<OutreachRecord> for Outreach {
    fn from(record: OutreachRecord) -> Self {
        Outreach {
            plotcode: record.plotcode,
            tenant_interested: record.tenant_interested.map(|v| v != 0),
            power_water_availability: record.power_water_availability,
            zone: record.zone,
            price_per_sqft: record.price_per_sqft,
            contact_number: record.contact_number,
            tenants: record.tenants,
            lease_duration: record.lease_duration,
            last_contacted: parse_datetime_opt(record.last_contacted),
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based outreach repository.
#[derive(Clone)]
pub struct OutreachRepository {
    pool: SqlitePool,
}

impl OutreachRepository {
    /// Create a new outreach repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the outreach row for a plotcode.
    pub async fn get(&self, plotcode: &str) -> Result<Option<Outreach>, DbError> {
        let mut conn = self.pool.get().await?;

        outreach_records::table
            .find(plotcode)
            .first::<OutreachRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Outreach::from))
    }

    /// Get all outreach rows.
    pub async fn get_all(&self) -> Result<Vec<Outreach>, DbError> {
        let mut conn = self.pool.get().await?;

        outreach_records::table
            .order(outreach_records::plotcode.asc())
            .load::<OutreachRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Outreach::from).collect())
    }

    /// Save an outreach row (insert or update on plotcode).
    ///
    /// Fails with a foreign-key error if no property record exists for the
    /// plotcode.
    pub async fn save(&self, outreach: &Outreach) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        let last_contacted = outreach.last_contacted.map(|dt| dt.to_rfc3339());
        let created_at = outreach.created_at.to_rfc3339();

        let record = NewOutreach {
            plotcode: &outreach.plotcode,
            tenant_interested: outreach.tenant_interested.map(i32::from),
            power_water_availability: outreach.power_water_availability.as_deref(),
            zone: outreach.zone.as_deref(),
            price_per_sqft: outreach.price_per_sqft,
            contact_number: outreach.contact_number.as_deref(),
            tenants: outreach.tenants.as_deref(),
            lease_duration: outreach.lease_duration.as_deref(),
            last_contacted: last_contacted.as_deref(),
            created_at: &created_at,
        };

        diesel::insert_into(outreach_records::table)
            .values(&record)
            .on_conflict(outreach_records::plotcode)
            .do_update()
            .set((
                outreach_records::tenant_interested.eq(outreach.tenant_interested.map(i32::from)),
                outreach_records::power_water_availability
                    .eq(outreach.power_water_availability.as_deref()),
                outreach_records::zone.eq(outreach.zone.as_deref()),
                outreach_records::price_per_sqft.eq(outreach.price_per_sqft),
                outreach_records::contact_number.eq(outreach.contact_number.as_deref()),
                outreach_records::tenants.eq(outreach.tenants.as_deref()),
                outreach_records::lease_duration.eq(outreach.lease_duration.as_deref()),
                outreach_records::last_contacted.eq(last_contacted.as_deref()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Seed a blank outreach row for a plotcode if none exists yet.
    ///
    /// Returns true if a row was inserted.
    pub async fn seed(&self, plotcode: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let created_at = Utc::now().to_rfc3339();
        let record = NewOutreach {
            plotcode,
            tenant_interested: None,
            power_water_availability: None,
            zone: None,
            price_per_sqft: None,
            contact_number: None,
            tenants: None,
            lease_duration: None,
            last_contacted: None,
            created_at: &created_at,
        };

        let rows = diesel::insert_or_ignore_into(outreach_records::table)
            .values(&record)
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Record the time of the latest contact attempt.
    pub async fn record_contact(
        &self,
        plotcode: &str,
        when: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        diesel::update(outreach_records::table.find(plotcode))
            .set(outreach_records::last_contacted.eq(Some(when.to_rfc3339())))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Delete an outreach row.
    pub async fn delete(&self, plotcode: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(outreach_records::table.find(plotcode))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Count all outreach rows.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        outreach_records::table.select(count_star()).first(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Property;
    use crate::repository::property::PropertyRepository;
    use crate::repository::test_support::setup_test_db;

    #[tokio::test]
    async fn test_outreach_requires_property() {
        let (pool, _dir) = setup_test_db().await;
        let repo = OutreachRepository::new(pool);

        // No parent row yet: the foreign key rejects the insert.
        let orphan = Outreach::new("NOPE-1".to_string());
        assert!(repo.save(&orphan).await.is_err());
        assert!(repo.seed("NOPE-1").await.is_err());
    }

    #[tokio::test]
    async fn test_outreach_lifecycle() {
        let (pool, _dir) = setup_test_db().await;
        let properties = PropertyRepository::new(pool.clone());
        let repo = OutreachRepository::new(pool);

        properties.save(&Property::new("P-9".to_string())).await.unwrap();

        assert!(repo.seed("P-9").await.unwrap());
        // Second seed is a no-op: at most one outreach row per property.
        assert!(!repo.seed("P-9").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);

        let mut row = repo.get("P-9").await.unwrap().unwrap();
        assert!(row.is_blank());

        row.tenant_interested = Some(true);
        row.zone = Some("General Industrial".to_string());
        row.price_per_sqft = Some(850.0);
        repo.save(&row).await.unwrap();

        let when = Utc::now();
        repo.record_contact("P-9", when).await.unwrap();

        let fetched = repo.get("P-9").await.unwrap().unwrap();
        assert_eq!(fetched.tenant_interested, Some(true));
        assert_eq!(fetched.zone.as_deref(), Some("General Industrial"));
        assert_eq!(
            fetched.last_contacted.unwrap().timestamp(),
            when.timestamp()
        );

        assert!(repo.delete("P-9").await.unwrap());
        assert!(repo.get("P-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_property_removes_child_first() {
        let (pool, _dir) = setup_test_db().await;
        let properties = PropertyRepository::new(pool.clone());
        let repo = OutreachRepository::new(pool);

        properties.save(&Property::new("P-10".to_string())).await.unwrap();
        repo.seed("P-10").await.unwrap();

        assert!(properties.delete("P-10").await.unwrap());
        assert!(repo.get("P-10").await.unwrap().is_none());
        assert!(!properties.exists("P-10").await.unwrap());
    }
}
