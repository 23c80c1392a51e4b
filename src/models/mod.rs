//! Data models for the plot registry.

mod contact;
mod outreach;
mod property;

pub use contact::{clean_address, is_valid_email, is_valid_phone, truncate_industry};
pub use outreach::Outreach;
pub use property::Property;
