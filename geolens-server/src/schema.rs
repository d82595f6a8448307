//! Diesel schema definitions for GeoLens server.

diesel::table! {
    repo_country_stats (id) {
        id -> Text,
        owner -> Text,
        repo -> Text,
        country -> Nullable<Text>,
        commits_count -> Nullable<Int8>,
        contributors_count -> Nullable<Int8>,
        commits_perc -> Nullable<Float8>,
        contributors_perc -> Nullable<Float8>,
        position -> Int4,
        created_at -> Timestamp,
    }
}
