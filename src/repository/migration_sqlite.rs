//! SQLite implementation of database migration traits.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::migration::{
    DatabaseExporter, DatabaseImporter, PortableOutreach, PortableProperty, ProgressCallback,
};
use super::models::{NewOutreach, NewProperty, OutreachRecord, PropertyRecord};
use super::pool::{DbError, SqlitePool};
use super::tags_to_json;
use crate::schema::{outreach_records, property_owners};

/// SQLite database migrator.
pub struct SqliteMigrator {
    pool: SqlitePool,
}

impl SqliteMigrator {
    /// Create a new SQLite migrator.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseExporter for SqliteMigrator {
    async fn export_properties(&self) -> Result<Vec<PortableProperty>, DbError> {
        let mut conn = self.pool.get().await?;
        let records: Vec<PropertyRecord> = property_owners::table
            .order(property_owners::plotcode.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(PortableProperty::from).collect())
    }

    async fn export_outreach(&self) -> Result<Vec<PortableOutreach>, DbError> {
        let mut conn = self.pool.get().await?;
        let records: Vec<OutreachRecord> = outreach_records::table
            .order(outreach_records::plotcode.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(PortableOutreach::from).collect())
    }
}

#[async_trait]
impl DatabaseImporter for SqliteMigrator {
    async fn clear_all(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        // Child table first to respect the foreign key.
        diesel::delete(outreach_records::table)
            .execute(&mut conn)
            .await?;
        diesel::delete(property_owners::table)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn import_properties(
        &self,
        properties: &[PortableProperty],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        let mut count = 0;

        for p in properties {
            let districts = tags_to_json(&p.district_names);
            let areas = tags_to_json(&p.industrial_areas);

            let record = NewProperty {
                plotcode: &p.plotcode,
                district_names: &districts,
                industrial_areas: &areas,
                plot_number: p.plot_number.as_deref(),
                area_acres: p.area_acres,
                allottee_name: p.allottee_name.as_deref(),
                allottee_phone: p.allottee_phone.as_deref(),
                allottee_email: p.allottee_email.as_deref(),
                address: p.address.as_deref(),
                nature_of_industry: p.nature_of_industry.as_deref(),
                ulpin: p.ulpin.as_deref(),
                plot_status: p.plot_status.as_deref(),
                phone_valid: p.phone_valid as i32,
                email_valid: p.email_valid as i32,
                created_at: &p.created_at,
                updated_at: &p.updated_at,
            };

            diesel::insert_into(property_owners::table)
                .values(&record)
                .on_conflict(property_owners::plotcode)
                .do_update()
                .set((
                    property_owners::district_names.eq(&districts),
                    property_owners::industrial_areas.eq(&areas),
                    property_owners::plot_number.eq(p.plot_number.as_deref()),
                    property_owners::area_acres.eq(p.area_acres),
                    property_owners::allottee_name.eq(p.allottee_name.as_deref()),
                    property_owners::allottee_phone.eq(p.allottee_phone.as_deref()),
                    property_owners::allottee_email.eq(p.allottee_email.as_deref()),
                    property_owners::address.eq(p.address.as_deref()),
                    property_owners::nature_of_industry.eq(p.nature_of_industry.as_deref()),
                    property_owners::ulpin.eq(p.ulpin.as_deref()),
                    property_owners::plot_status.eq(p.plot_status.as_deref()),
                    property_owners::phone_valid.eq(p.phone_valid as i32),
                    property_owners::email_valid.eq(p.email_valid as i32),
                    property_owners::updated_at.eq(&p.updated_at),
                ))
                .execute(&mut conn)
                .await?;

            count += 1;
            if let Some(ref cb) = progress {
                cb(count);
            }
        }

        Ok(count)
    }

    async fn import_outreach(
        &self,
        outreach: &[PortableOutreach],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        let mut count = 0;

        for o in outreach {
            let record = NewOutreach {
                plotcode: &o.plotcode,
                tenant_interested: o.tenant_interested.map(i32::from),
                power_water_availability: o.power_water_availability.as_deref(),
                zone: o.zone.as_deref(),
                price_per_sqft: o.price_per_sqft,
                contact_number: o.contact_number.as_deref(),
                tenants: o.tenants.as_deref(),
                lease_duration: o.lease_duration.as_deref(),
                last_contacted: o.last_contacted.as_deref(),
                created_at: &o.created_at,
            };

            diesel::insert_into(outreach_records::table)
                .values(&record)
                .on_conflict(outreach_records::plotcode)
                .do_update()
                .set((
                    outreach_records::tenant_interested.eq(o.tenant_interested.map(i32::from)),
                    outreach_records::power_water_availability
                        .eq(o.power_water_availability.as_deref()),
                    outreach_records::zone.eq(o.zone.as_deref()),
                    outreach_records::price_per_sqft.eq(o.price_per_sqft),
                    outreach_records::contact_number.eq(o.contact_number.as_deref()),
                    outreach_records::tenants.eq(o.tenants.as_deref()),
                    outreach_records::lease_duration.eq(o.lease_duration.as_deref()),
                    outreach_records::last_contacted.eq(o.last_contacted.as_deref()),
                ))
                .execute(&mut conn)
                .await?;

            count += 1;
            if let Some(ref cb) = progress {
                cb(count);
            }
        }

        Ok(count)
    }

    async fn seed_outreach(&self, plotcodes: &[String]) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        let created_at = chrono::Utc::now().to_rfc3339();
        let mut inserted = 0;

        for plotcode in plotcodes {
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

            inserted += diesel::insert_or_ignore_into(outreach_records::table)
                .values(&record)
                .execute(&mut conn)
                .await?;
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Outreach, Property};
    use crate::repository::outreach::OutreachRepository;
    use crate::repository::property::PropertyRepository;
    use crate::repository::test_support::setup_test_db;

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let (pool, _dir) = setup_test_db().await;
        let properties = PropertyRepository::new(pool.clone());
        let outreach = OutreachRepository::new(pool.clone());

        let mut p = Property::new("RT-1".to_string());
        p.add_district("Dharwad");
        p.set_email("owner@example.com");
        properties.save(&p).await.unwrap();
        outreach.seed("RT-1").await.unwrap();

        let mut o = Outreach::new("RT-1".to_string());
        o.tenant_interested = Some(false);
        outreach.save(&o).await.unwrap();

        let migrator = SqliteMigrator::new(pool.clone());
        let exported_props = migrator.export_properties().await.unwrap();
        let exported_outreach = migrator.export_outreach().await.unwrap();
        assert_eq!(exported_props.len(), 1);
        assert_eq!(exported_outreach.len(), 1);
        assert!(exported_props[0].email_valid);
        assert_eq!(exported_outreach[0].tenant_interested, Some(false));

        // Import into a fresh database.
        let (other_pool, _dir2) = setup_test_db().await;
        let migrator2 = SqliteMigrator::new(other_pool.clone());
        let n = migrator2
            .import_properties(&exported_props, None)
            .await
            .unwrap();
        assert_eq!(n, 1);
        let n = migrator2
            .import_outreach(&exported_outreach, None)
            .await
            .unwrap();
        assert_eq!(n, 1);

        let copied = PropertyRepository::new(other_pool.clone());
        let fetched = copied.get("RT-1").await.unwrap().unwrap();
        assert_eq!(fetched.district_names, vec!["Dharwad"]);

        // Seeding skips plotcodes that already have an outreach row.
        let seeded = migrator2
            .seed_outreach(&["RT-1".to_string()])
            .await
            .unwrap();
        assert_eq!(seeded, 0);

        // clear_all removes child rows before parents.
        migrator2.clear_all().await.unwrap();
        assert_eq!(copied.count().await.unwrap(), 0);
    }
}
