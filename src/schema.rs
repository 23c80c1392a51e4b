// Table definitions for the plot registry.
// Checked against the SQLite backend; tag columns hold JSON arrays there
// (TEXT[] on PostgreSQL, which is reached through the migration tooling).

diesel::table! {
    property_owners (plotcode) {
        plotcode -> Text,
        district_names -> Text,
        industrial_areas -> Text,
        plot_number -> Nullable<Text>,
        area_acres -> Nullable<Double>,
        allottee_name -> Nullable<Text>,
        allottee_phone -> Nullable<Text>,
        allottee_email -> Nullable<Text>,
        address -> Nullable<Text>,
        nature_of_industry -> Nullable<Text>,
        ulpin -> Nullable<Text>,
        plot_status -> Nullable<Text>,
        phone_valid -> Integer,
        email_valid -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    outreach_records (plotcode) {
        plotcode -> Text,
        tenant_interested -> Nullable<Integer>,
        power_water_availability -> Nullable<Text>,
        zone -> Nullable<Text>,
        price_per_sqft -> Nullable<Double>,
        contact_number -> Nullable<Text>,
        tenants -> Nullable<Text>,
        lease_duration -> Nullable<Text>,
        last_contacted -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::joinable!(outreach_records -> property_owners (plotcode));

diesel::allow_tables_to_appear_in_same_query!(property_owners, outreach_records);
