//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match `migrations/*/up.sql` exactly. SQLite
//! `DATETIME` columns map to [`diesel::sql_types::Timestamp`] and are read
//! as naive UTC instants.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Text,
        email -> Text,
        phone -> Text,
        password_hash -> Text,
        first_name -> Text,
        last_name -> Text,
        role -> Text,
        status -> Text,
        county -> Nullable<Text>,
        town -> Nullable<Text>,
        bio -> Nullable<Text>,
        rating -> Double,
        is_email_verified -> Bool,
        is_phone_verified -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Keyed digests of issued bearer tokens.
    auth_tokens (id) {
        id -> Text,
        user_id -> Text,
        token_hash -> Text,
        expires_at -> Timestamp,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Marketplace listings. `images` holds a JSON array of URLs.
    products (id) {
        id -> Text,
        seller_id -> Text,
        name -> Text,
        description -> Text,
        category -> Text,
        price -> Double,
        stock -> Integer,
        images -> Text,
        status -> Text,
        county -> Nullable<Text>,
        town -> Nullable<Text>,
        rating -> Double,
        review_count -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    cart_items (id) {
        id -> Text,
        user_id -> Text,
        product_id -> Text,
        quantity -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// One order per buyer and seller pair.
    orders (id) {
        id -> Text,
        buyer_id -> Text,
        seller_id -> Text,
        total_amount -> Double,
        status -> Text,
        payment_method -> Text,
        payment_status -> Text,
        delivery_county -> Nullable<Text>,
        delivery_town -> Nullable<Text>,
        delivery_phone -> Nullable<Text>,
        notes -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Product snapshots captured at checkout.
    order_items (id) {
        id -> Text,
        order_id -> Text,
        product_id -> Text,
        name -> Text,
        quantity -> Integer,
        price -> Double,
        created_at -> Timestamp,
    }
}

diesel::table! {
    reviews (id) {
        id -> Text,
        user_id -> Text,
        product_id -> Text,
        rating -> Integer,
        comment -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    notifications (id) {
        id -> Text,
        user_id -> Text,
        sender_id -> Nullable<Text>,
        title -> Text,
        message -> Text,
        notification_type -> Text,
        status -> Text,
        priority -> Integer,
        is_read -> Bool,
        read_at -> Nullable<Timestamp>,
        scheduled_at -> Nullable<Timestamp>,
        expires_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Exactly one row per user.
    notification_settings (id) {
        id -> Text,
        user_id -> Text,
        email_enabled -> Bool,
        sms_enabled -> Bool,
        push_enabled -> Bool,
        in_app_enabled -> Bool,
        quiet_hours_enabled -> Bool,
        quiet_hours_start -> Text,
        quiet_hours_end -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(cart_items -> products (product_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(reviews -> products (product_id));
diesel::joinable!(notification_settings -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    products,
    cart_items,
    orders,
    order_items,
    reviews,
    notifications,
    notification_settings,
);
