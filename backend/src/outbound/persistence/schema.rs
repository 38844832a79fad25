//! Diesel table definitions.
//!
//! These must match `backend/migrations`. Relation lists are stored as
//! `UUID[]` columns so pushes and pulls run as single in-place updates.

diesel::table! {
    /// Beer catalogue.
    beers (id) {
        id -> Uuid,
        name -> Text,
        brewer -> Text,
        style -> Text,
        alcohol -> Text,
        /// Serialised image descriptor.
        image -> Jsonb,
        author -> Uuid,
        /// Pubs serving the beer; mirrors `pubs.beers`.
        pubs -> Array<Uuid>,
        /// Users who tasted the beer; mirrors `users.tasted`.
        tasted_by -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    pubs (id) {
        id -> Uuid,
        name -> Text,
        logo -> Jsonb,
        address -> Text,
        owner -> Text,
        taps -> Int4,
        /// Tap list.
        beers -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        surname -> Text,
        age -> Int2,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        tasted -> Array<Uuid>,
        visited -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(beers, pubs, users);
