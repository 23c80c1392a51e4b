mod m0001_property_owners;
mod m0002_outreach_records;

use cetane::prelude::MigrationRegistry;

pub fn registry() -> MigrationRegistry {
    let mut reg = MigrationRegistry::new();
    reg.register(m0001_property_owners::migration());
    reg.register(m0002_outreach_records::migration());
    reg
}
