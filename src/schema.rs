diesel::table! {
    kv_entries (key) {
        key -> Text,
        value -> Text,
        expires_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}
