//! Read-side commands: status, show, ls.

use console::style;

use crate::config::Settings;
use crate::models::Property;
use crate::repository::util::redact_url_password;

pub async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    let ctx = settings.create_db_context()?;

    println!("{} Plot registry status", style("→").cyan());
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );

    if !ctx.is_sqlite() {
        println!(
            "  Backend: PostgreSQL (use 'plots db migrate' and 'plots db copy' to manage it)"
        );
        return Ok(());
    }
    println!("  Backend: SQLite");

    if !ctx.schema_ready().await.unwrap_or(false) {
        println!(
            "\n{} Database not initialized. Run 'plots init' first.",
            style("!").yellow()
        );
        return Ok(());
    }

    let stats = ctx
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("failed to read stats: {}", e))?;

    println!("\n  Properties: {}", stats.properties);
    println!("  Outreach records: {}", stats.outreach);
    println!(
        "  Validated phone numbers: {} ({} without)",
        stats.phone_valid,
        stats.properties - stats.phone_valid
    );

    Ok(())
}

pub async fn cmd_show(settings: &Settings, plotcode: &str) -> anyhow::Result<()> {
    let ctx = settings.create_db_context()?;
    let properties = ctx.properties().map_err(|e| anyhow::anyhow!("{}", e))?;
    let outreach = ctx.outreach().map_err(|e| anyhow::anyhow!("{}", e))?;

    let Some(property) = properties
        .get(plotcode)
        .await
        .map_err(|e| anyhow::anyhow!("lookup failed: {}", e))?
    else {
        println!("{} No property with plotcode {}", style("✗").red(), plotcode);
        std::process::exit(1);
    };

    println!("{} {}", style("Plot").cyan(), property.plotcode);
    println!("  Districts: {}", property.district_names.join(", "));
    println!("  Industrial areas: {}", property.industrial_areas.join(", "));
    if let Some(ref n) = property.plot_number {
        println!("  Plot number: {}", n);
    }
    if let Some(acres) = property.area_acres {
        println!("  Area: {} acres", acres);
    }
    if let Some(ref name) = property.allottee_name {
        println!("  Allottee: {}", name);
    }
    if let Some(ref phone) = property.allottee_phone {
        let mark = if property.phone_valid {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  Phone: {} {}", phone, mark);
    }
    if let Some(ref email) = property.allottee_email {
        let mark = if property.email_valid {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  Email: {} {}", email, mark);
    }
    if let Some(ref address) = property.address {
        println!("  Address: {}", address);
    }
    if let Some(ref industry) = property.nature_of_industry {
        println!("  Industry: {}", industry);
    }
    if let Some(ref ulpin) = property.ulpin {
        println!("  ULPIN: {}", ulpin);
    }
    if let Some(ref status) = property.plot_status {
        println!("  Status: {}", status);
    }

    match outreach
        .get(plotcode)
        .await
        .map_err(|e| anyhow::anyhow!("lookup failed: {}", e))?
    {
        Some(row) => {
            println!("{}", style("Outreach").cyan());
            if let Some(interested) = row.tenant_interested {
                println!("  Tenant interest: {}", if interested { "yes" } else { "no" });
            }
            if let Some(ref pw) = row.power_water_availability {
                println!("  Power/water: {}", pw);
            }
            if let Some(ref zone) = row.zone {
                println!("  Zone: {}", zone);
            }
            if let Some(price) = row.price_per_sqft {
                println!("  Price: {}/sqft", price);
            }
            if let Some(ref contact) = row.contact_number {
                println!("  Contact: {}", contact);
            }
            if let Some(ref tenants) = row.tenants {
                println!("  Tenants: {}", tenants);
            }
            if let Some(ref lease) = row.lease_duration {
                println!("  Lease duration: {}", lease);
            }
            match row.last_contacted {
                Some(ts) => println!("  Last contacted: {}", ts.to_rfc3339()),
                None => println!("  Last contacted: never"),
            }
        }
        None => println!("{} (no outreach record)", style("Outreach").cyan()),
    }

    Ok(())
}

pub async fn cmd_ls(
    settings: &Settings,
    district: Option<&str>,
    area: Option<&str>,
    valid_phone: bool,
    limit: usize,
    format: &str,
) -> anyhow::Result<()> {
    let ctx = settings.create_db_context()?;
    let repo = ctx.properties().map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut results: Vec<Property> = match (district, area) {
        (Some(d), _) => repo
            .find_by_district(d)
            .await
            .map_err(|e| anyhow::anyhow!("query failed: {}", e))?,
        (None, Some(a)) => repo
            .find_by_industrial_area(a)
            .await
            .map_err(|e| anyhow::anyhow!("query failed: {}", e))?,
        (None, None) if valid_phone => repo
            .find_with_valid_phone(limit as i64)
            .await
            .map_err(|e| anyhow::anyhow!("query failed: {}", e))?,
        (None, None) => repo
            .get_all()
            .await
            .map_err(|e| anyhow::anyhow!("query failed: {}", e))?,
    };

    // Tag filters combine with the validity filter.
    if valid_phone {
        results.retain(|p| p.phone_valid);
    }
    if let (Some(_), Some(a)) = (district, area) {
        results.retain(|p| p.industrial_areas.iter().any(|t| t == a));
    }
    results.truncate(limit);

    match format {
        "json" => {
            for property in &results {
                println!("{}", serde_json::to_string(property)?);
            }
        }
        "plotcodes" => {
            for property in &results {
                println!("{}", property.plotcode);
            }
        }
        _ => {
            if results.is_empty() {
                println!("No matching properties.");
                return Ok(());
            }
            for property in &results {
                let contact = match (&property.allottee_phone, property.phone_valid) {
                    (Some(phone), true) => format!("{} ✓", phone),
                    (Some(phone), false) => phone.clone(),
                    (None, _) => "-".to_string(),
                };
                println!(
                    "{:<16} {:<28} {:<24} {}",
                    property.plotcode,
                    property.district_names.join(","),
                    contact,
                    property.plot_status.as_deref().unwrap_or("-")
                );
            }
            println!("\n{} properties", results.len());
        }
    }

    Ok(())
}
