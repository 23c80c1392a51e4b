//! Property ownership records.
//!
//! A property is identified registry-wide by its plotcode. The same plot can
//! be observed more than once upstream (one row per data source or survey
//! pass), so the model knows how to merge a later observation into an
//! existing record: tag columns accumulate, contact fields keep the first
//! value that passed validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact::{clean_address, is_valid_email, is_valid_phone, truncate_industry};

/// An industrial plot ownership record. Referential parent of [`super::Outreach`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Unique textual plot identifier.
    pub plotcode: String,
    /// Districts this plot is listed under. Membership-queried, not equality-queried.
    pub district_names: Vec<String>,
    /// Industrial areas this plot is listed under.
    pub industrial_areas: Vec<String>,
    pub plot_number: Option<String>,
    pub area_acres: Option<f64>,
    pub allottee_name: Option<String>,
    pub allottee_phone: Option<String>,
    pub allottee_email: Option<String>,
    pub address: Option<String>,
    pub nature_of_industry: Option<String>,
    /// Unique Land Parcel Identification Number.
    pub ulpin: Option<String>,
    /// Status label from the source portal (free vocabulary).
    pub plot_status: Option<String>,
    /// Whether `allottee_phone` passed validation.
    pub phone_valid: bool,
    /// Whether `allottee_email` passed validation.
    pub email_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Create a record with just the key set.
    pub fn new(plotcode: String) -> Self {
        let now = Utc::now();
        Self {
            plotcode,
            district_names: Vec::new(),
            industrial_areas: Vec::new(),
            plot_number: None,
            area_acres: None,
            allottee_name: None,
            allottee_phone: None,
            allottee_email: None,
            address: None,
            nature_of_industry: None,
            ulpin: None,
            plot_status: None,
            phone_valid: false,
            email_valid: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a district tag if not already present.
    pub fn add_district(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.district_names.iter().any(|d| d == name) {
            self.district_names.push(name.to_string());
        }
    }

    /// Add an industrial-area tag if not already present.
    pub fn add_industrial_area(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.industrial_areas.iter().any(|a| a == name) {
            self.industrial_areas.push(name.to_string());
        }
    }

    /// Set the phone field, flipping `phone_valid` accordingly.
    ///
    /// An already-valid phone is never overwritten by a later observation.
    pub fn set_phone(&mut self, phone: &str) {
        if self.phone_valid {
            return;
        }
        if is_valid_phone(phone) {
            self.allottee_phone = Some(phone.trim().to_string());
            self.phone_valid = true;
        } else if self.allottee_phone.is_none() {
            let phone = phone.trim();
            if !phone.is_empty() && phone != "N/A" {
                self.allottee_phone = Some(phone.to_string());
            }
        }
    }

    /// Set the email field, flipping `email_valid` accordingly.
    pub fn set_email(&mut self, email: &str) {
        if self.email_valid {
            return;
        }
        if is_valid_email(email) {
            self.allottee_email = Some(email.trim().to_string());
            self.email_valid = true;
        } else if self.allottee_email.is_none() {
            let email = email.trim();
            if !email.is_empty() && email != "N/A" {
                self.allottee_email = Some(email.to_string());
            }
        }
    }

    /// Set the address after normalization, keeping an existing value.
    pub fn set_address(&mut self, address: &str) {
        if self.address.is_none() {
            self.address = clean_address(address);
        }
    }

    /// Set the industry description after truncation, keeping an existing value.
    pub fn set_industry(&mut self, industry: &str) {
        if self.nature_of_industry.is_none() {
            self.nature_of_industry = truncate_industry(industry);
        }
    }

    /// Merge a later observation of the same plot into this record.
    ///
    /// Tag columns take the union. Contact fields keep the first value that
    /// passed validation; other scalar fields keep the first non-empty value.
    /// `updated_at` is bumped. Panics in debug builds if the plotcodes differ.
    pub fn merge(&mut self, other: &Property) {
        debug_assert_eq!(self.plotcode, other.plotcode);

        for d in &other.district_names {
            self.add_district(d);
        }
        for a in &other.industrial_areas {
            self.add_industrial_area(a);
        }

        if !self.phone_valid && other.phone_valid {
            self.allottee_phone = other.allottee_phone.clone();
            self.phone_valid = true;
        }
        if !self.email_valid && other.email_valid {
            self.allottee_email = other.allottee_email.clone();
            self.email_valid = true;
        }

        fill_if_empty(&mut self.plot_number, &other.plot_number);
        fill_if_empty(&mut self.allottee_name, &other.allottee_name);
        fill_if_empty(&mut self.address, &other.address);
        fill_if_empty(&mut self.nature_of_industry, &other.nature_of_industry);
        fill_if_empty(&mut self.ulpin, &other.ulpin);
        fill_if_empty(&mut self.plot_status, &other.plot_status);
        if self.area_acres.is_none() {
            self.area_acres = other.area_acres;
        }

        self.updated_at = Utc::now();
    }
}

fn fill_if_empty(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_none() {
        if let Some(v) = value {
            if !v.is_empty() {
                *slot = Some(v.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(plotcode: &str) -> Property {
        let mut p = Property::new(plotcode.to_string());
        p.add_district("Bengaluru Urban");
        p.add_industrial_area("Peenya Phase I");
        p.set_phone("9845012345");
        p.set_email("not-an-email");
        p.set_address("No. 4,\nMain Road");
        p
    }

    #[test]
    fn test_tags_deduplicate() {
        let mut p = Property::new("P-001".to_string());
        p.add_district("Tumakuru");
        p.add_district("Tumakuru");
        p.add_district("  ");
        assert_eq!(p.district_names, vec!["Tumakuru"]);
    }

    #[test]
    fn test_set_phone_flips_flag_once() {
        let mut p = Property::new("P-001".to_string());
        p.set_phone("invalid");
        assert!(!p.phone_valid);
        assert_eq!(p.allottee_phone.as_deref(), Some("invalid"));

        p.set_phone("9845012345");
        assert!(p.phone_valid);

        // A later valid number does not replace the first one.
        p.set_phone("9900011122");
        assert_eq!(p.allottee_phone.as_deref(), Some("9845012345"));
    }

    #[test]
    fn test_merge_unions_tags_and_prefers_valid_contacts() {
        let mut first = observation("P-002");
        assert!(first.phone_valid);
        assert!(!first.email_valid);

        let mut second = Property::new("P-002".to_string());
        second.add_district("Bengaluru Urban");
        second.add_district("Bengaluru Rural");
        second.set_email("owner@example.com");
        second.set_phone("9900011122");

        first.merge(&second);

        assert_eq!(first.district_names, vec!["Bengaluru Urban", "Bengaluru Rural"]);
        // First valid phone wins over the later one.
        assert_eq!(first.allottee_phone.as_deref(), Some("9845012345"));
        // Email was never valid before, so the valid one is taken.
        assert!(first.email_valid);
        assert_eq!(first.allottee_email.as_deref(), Some("owner@example.com"));
        assert_eq!(first.address.as_deref(), Some("No. 4, Main Road"));
    }

    #[test]
    fn test_merge_fills_empty_scalars_only() {
        let mut a = Property::new("P-003".to_string());
        a.plot_status = Some("Allotted".to_string());

        let mut b = Property::new("P-003".to_string());
        b.plot_status = Some("Vacant".to_string());
        b.ulpin = Some("KA123456789012".to_string());
        b.area_acres = Some(2.5);

        a.merge(&b);
        assert_eq!(a.plot_status.as_deref(), Some("Allotted"));
        assert_eq!(a.ulpin.as_deref(), Some("KA123456789012"));
        assert_eq!(a.area_acres, Some(2.5));
    }
}
