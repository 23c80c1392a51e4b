//! PostgreSQL implementation of database migration traits.
//!
//! Only compiled when the `postgres` feature is enabled. PostgreSQL stores
//! the tag columns as native TEXT[] (with GIN indexes), so this module talks
//! tokio-postgres directly instead of sharing the SQLite diesel schema.

#![cfg(feature = "postgres")]

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};

use super::migration::{
    DatabaseExporter, DatabaseImporter, PortableOutreach, PortableProperty, ProgressCallback,
};
use super::pool::DbError;
use super::util::to_diesel_error;

/// PostgreSQL database migrator.
pub struct PostgresMigrator {
    database_url: String,
    batch_size: usize,
}

impl PostgresMigrator {
    /// Create a new PostgreSQL migrator.
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            batch_size: 1000,
        }
    }

    /// Set the chunk size for COPY transfers.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(1);
    }

    /// Apply the registry schema to the target database.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        super::migrations::run_migrations(&self.database_url).await
    }

    async fn connect(&self) -> Result<Client, DbError> {
        let (client, connection) = tokio_postgres::connect(&self.database_url, NoTls)
            .await
            .map_err(to_diesel_error)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(client)
    }

    /// Escape a value for COPY text format.
    /// NULL -> \N, backslash -> \\, tab -> \t, newline -> \n
    fn escape_copy_value(value: Option<&str>) -> String {
        match value {
            None => "\\N".to_string(),
            Some(s) => s
                .replace('\\', "\\\\")
                .replace('\t', "\\t")
                .replace('\n', "\\n")
                .replace('\r', "\\r"),
        }
    }

    /// Format a Rust string slice list as a Postgres array literal.
    ///
    /// Elements are always double-quoted; quotes and backslashes inside
    /// elements are backslash-escaped per the array-literal grammar.
    fn format_pg_array(values: &[String]) -> String {
        let mut out = String::from("{");
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            for ch in v.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        }
        out.push('}');
        out
    }

    /// Import properties using the COPY protocol (much faster than INSERT).
    /// Requires the target table to be empty or free of conflicting
    /// plotcodes; COPY cannot upsert.
    pub async fn copy_properties(
        &self,
        properties: &[PortableProperty],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError> {
        use futures_util::{pin_mut, SinkExt};
        use tokio_postgres::CopyInSink;

        let client = self.connect().await?;

        let sink: CopyInSink<bytes::Bytes> = client
            .copy_in(
                "COPY property_owners (plotcode, district_names, industrial_areas, plot_number,
                    area_acres, allottee_name, allottee_phone, allottee_email, address,
                    nature_of_industry, ulpin, plot_status, phone_valid, email_valid,
                    created_at, updated_at)
                 FROM STDIN WITH (FORMAT text)",
            )
            .await
            .map_err(to_diesel_error)?;

        pin_mut!(sink);

        let mut count = 0;
        for chunk in properties.chunks(self.batch_size) {
            let mut data = String::with_capacity(chunk.len() * 256);

            for p in chunk {
                let districts = Self::format_pg_array(&p.district_names);
                let areas = Self::format_pg_array(&p.industrial_areas);
                let row = format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                    Self::escape_copy_value(Some(&p.plotcode)),
                    Self::escape_copy_value(Some(&districts)),
                    Self::escape_copy_value(Some(&areas)),
                    Self::escape_copy_value(p.plot_number.as_deref()),
                    p.area_acres
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "\\N".to_string()),
                    Self::escape_copy_value(p.allottee_name.as_deref()),
                    Self::escape_copy_value(p.allottee_phone.as_deref()),
                    Self::escape_copy_value(p.allottee_email.as_deref()),
                    Self::escape_copy_value(p.address.as_deref()),
                    Self::escape_copy_value(p.nature_of_industry.as_deref()),
                    Self::escape_copy_value(p.ulpin.as_deref()),
                    Self::escape_copy_value(p.plot_status.as_deref()),
                    p.phone_valid,
                    p.email_valid,
                    Self::escape_copy_value(Some(&p.created_at)),
                    Self::escape_copy_value(Some(&p.updated_at)),
                );
                data.push_str(&row);
            }

            sink.send(bytes::Bytes::from(data))
                .await
                .map_err(to_diesel_error)?;

            count += chunk.len();
            if let Some(ref cb) = progress {
                cb(count);
            }
        }

        sink.finish().await.map_err(to_diesel_error)?;

        Ok(count)
    }
}

#[async_trait]
impl DatabaseExporter for PostgresMigrator {
    async fn export_properties(&self) -> Result<Vec<PortableProperty>, DbError> {
        let client = self.connect().await?;

        let rows = client
            .query(
                "SELECT plotcode, district_names, industrial_areas, plot_number, area_acres,
                        allottee_name, allottee_phone, allottee_email, address,
                        nature_of_industry, ulpin, plot_status, phone_valid, email_valid,
                        created_at, updated_at
                 FROM property_owners ORDER BY plotcode",
                &[],
            )
            .await
            .map_err(to_diesel_error)?;

        Ok(rows
            .iter()
            .map(|row| PortableProperty {
                plotcode: row.get(0),
                district_names: row.get(1),
                industrial_areas: row.get(2),
                plot_number: row.get(3),
                area_acres: row.get(4),
                allottee_name: row.get(5),
                allottee_phone: row.get(6),
                allottee_email: row.get(7),
                address: row.get(8),
                nature_of_industry: row.get(9),
                ulpin: row.get(10),
                plot_status: row.get(11),
                phone_valid: row.get(12),
                email_valid: row.get(13),
                created_at: row.get(14),
                updated_at: row.get(15),
            })
            .collect())
    }

    async fn export_outreach(&self) -> Result<Vec<PortableOutreach>, DbError> {
        let client = self.connect().await?;

        let rows = client
            .query(
                "SELECT plotcode, tenant_interested, power_water_availability, zone,
                        price_per_sqft, contact_number, tenants, lease_duration,
                        last_contacted, created_at
                 FROM outreach_records ORDER BY plotcode",
                &[],
            )
            .await
            .map_err(to_diesel_error)?;

        Ok(rows
            .iter()
            .map(|row| PortableOutreach {
                plotcode: row.get(0),
                tenant_interested: row.get(1),
                power_water_availability: row.get(2),
                zone: row.get(3),
                price_per_sqft: row.get(4),
                contact_number: row.get(5),
                tenants: row.get(6),
                lease_duration: row.get(7),
                last_contacted: row.get(8),
                created_at: row.get(9),
            })
            .collect())
    }
}

#[async_trait]
impl DatabaseImporter for PostgresMigrator {
    async fn clear_all(&self) -> Result<(), DbError> {
        let client = self.connect().await?;

        // Child table first to respect the foreign key.
        client
            .execute("DELETE FROM outreach_records", &[])
            .await
            .map_err(to_diesel_error)?;
        client
            .execute("DELETE FROM property_owners", &[])
            .await
            .map_err(to_diesel_error)?;

        Ok(())
    }

    async fn import_properties(
        &self,
        properties: &[PortableProperty],
        progress: Option<ProgressCallback>,
    ) -> Result<usize, DbError> {
        let client = self.connect().await?;

        let stmt = client
            .prepare(
                "INSERT INTO property_owners (plotcode, district_names, industrial_areas,
                    plot_number, area_acres, allottee_name, allottee_phone, allottee_email,
                    address, nature_of_industry, ulpin, plot_status, phone_valid, email_valid,
                    created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                 ON CONFLICT (plotcode) DO UPDATE SET
                    district_names = EXCLUDED.district_names,
                    industrial_areas = EXCLUDED.industrial_areas,
                    plot_number = EXCLUDED.plot_number,
                    area_acres = EXCLUDED.area_acres,
                    allottee_name = EXCLUDED.allottee_name,
                    allottee_phone = EXCLUDED.allottee_phone,
                    allottee_email = EXCLUDED.allottee_email,
                    address = EXCLUDED.address,
                    nature_of_industry = EXCLUDED.nature_of_industry,
                    ulpin = EXCLUDED.ulpin,
                    plot_status = EXCLUDED.plot_status,
                    phone_valid = EXCLUDED.phone_valid,
                    email_valid = EXCLUDED.email_valid,
                    updated_at = EXCLUDED.updated_at",
            )
            .await
            .map_err(to_diesel_error)?;

        let mut count = 0;
        for p in properties {
            client
                .execute(
                    &stmt,
                    &[
                        &p.plotcode,
                        &p.district_names,
                        &p.industrial_areas,
                        &p.plot_number,
                        &p.area_acres,
                        &p.allottee_name,
                        &p.allottee_phone,
                        &p.allottee_email,
                        &p.address,
                        &p.nature_of_industry,
                        &p.ulpin,
                        &p.plot_status,
                        &p.phone_valid,
                        &p.email_valid,
                        &p.created_at,
                        &p.updated_at,
                    ],
                )
                .await
                .map_err(to_diesel_error)?;

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
        let client = self.connect().await?;

        let stmt = client
            .prepare(
                "INSERT INTO outreach_records (plotcode, tenant_interested,
                    power_water_availability, zone, price_per_sqft, contact_number,
                    tenants, lease_duration, last_contacted, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 ON CONFLICT (plotcode) DO UPDATE SET
                    tenant_interested = EXCLUDED.tenant_interested,
                    power_water_availability = EXCLUDED.power_water_availability,
                    zone = EXCLUDED.zone,
                    price_per_sqft = EXCLUDED.price_per_sqft,
                    contact_number = EXCLUDED.contact_number,
                    tenants = EXCLUDED.tenants,
                    lease_duration = EXCLUDED.lease_duration,
                    last_contacted = EXCLUDED.last_contacted",
            )
            .await
            .map_err(to_diesel_error)?;

        let mut count = 0;
        for o in outreach {
            client
                .execute(
                    &stmt,
                    &[
                        &o.plotcode,
                        &o.tenant_interested,
                        &o.power_water_availability,
                        &o.zone,
                        &o.price_per_sqft,
                        &o.contact_number,
                        &o.tenants,
                        &o.lease_duration,
                        &o.last_contacted,
                        &o.created_at,
                    ],
                )
                .await
                .map_err(to_diesel_error)?;

            count += 1;
            if let Some(ref cb) = progress {
                cb(count);
            }
        }

        Ok(count)
    }

    async fn seed_outreach(&self, plotcodes: &[String]) -> Result<usize, DbError> {
        let client = self.connect().await?;

        let stmt = client
            .prepare(
                "INSERT INTO outreach_records (plotcode, created_at)
                 VALUES ($1, $2)
                 ON CONFLICT (plotcode) DO NOTHING",
            )
            .await
            .map_err(to_diesel_error)?;

        let created_at = chrono::Utc::now().to_rfc3339();
        let mut inserted = 0usize;
        for plotcode in plotcodes {
            inserted += client
                .execute(&stmt, &[plotcode, &created_at])
                .await
                .map_err(to_diesel_error)? as usize;
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_copy_value() {
        assert_eq!(PostgresMigrator::escape_copy_value(None), "\\N");
        assert_eq!(
            PostgresMigrator::escape_copy_value(Some("a\tb\nc")),
            "a\\tb\\nc"
        );
        assert_eq!(
            PostgresMigrator::escape_copy_value(Some("back\\slash")),
            "back\\\\slash"
        );
    }

    #[test]
    fn test_format_pg_array() {
        assert_eq!(PostgresMigrator::format_pg_array(&[]), "{}");
        assert_eq!(
            PostgresMigrator::format_pg_array(&["Bengaluru Urban".to_string()]),
            r#"{"Bengaluru Urban"}"#
        );
        assert_eq!(
            PostgresMigrator::format_pg_array(&[
                "plain".to_string(),
                "with \"quotes\"".to_string(),
                "with \\ backslash".to_string(),
            ]),
            r#"{"plain","with \"quotes\"","with \\ backslash"}"#
        );
    }
}
