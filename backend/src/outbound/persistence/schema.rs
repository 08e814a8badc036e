//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Professional profiles, one per owning user.
    professionals (id) {
        id -> Uuid,
        /// Owning identity-provider user; unique.
        user_id -> Uuid,
        name -> Varchar,
        specialty -> Varchar,
        hourly_rate_cents -> Int8,
        service_zipcodes -> Array<Text>,
        phone -> Varchar,
        bio -> Nullable<Text>,
        verified -> Bool,
        is_sponsored -> Bool,
        sponsored_until -> Nullable<Timestamptz>,
        payout_account_id -> Nullable<Varchar>,
        payout_onboarding_complete -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer quote requests. Rows are immutable after insert.
    quote_requests (id) {
        id -> Uuid,
        customer_id -> Uuid,
        service_category -> Varchar,
        description -> Text,
        zipcode -> Varchar,
        timeline -> Nullable<Varchar>,
        budget -> Nullable<Varchar>,
        contact_name -> Nullable<Varchar>,
        contact_email -> Nullable<Varchar>,
        contact_phone -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Professional bids. `(quote_request_id, response_order)` is unique and
    /// `response_order` is constrained to 1..=3.
    quote_responses (id) {
        id -> Uuid,
        quote_request_id -> Uuid,
        professional_id -> Uuid,
        quote_amount_cents -> Int8,
        quote_details -> Nullable<Text>,
        response_order -> Int2,
        status -> Varchar,
        accepted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Direct bookings and their payment state.
    bookings (id) {
        id -> Uuid,
        professional_id -> Uuid,
        customer_id -> Uuid,
        service_description -> Text,
        preferred_date -> Nullable<Date>,
        preferred_time -> Nullable<Varchar>,
        customer_name -> Varchar,
        customer_email -> Varchar,
        customer_phone -> Varchar,
        customer_address -> Nullable<Text>,
        notes -> Nullable<Text>,
        status -> Varchar,
        payment_status -> Varchar,
        payment_intent_id -> Nullable<Varchar>,
        amount_cents -> Nullable<Int8>,
        platform_fee_cents -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// In-app notifications.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        message -> Text,
        link -> Nullable<Varchar>,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(quote_responses -> quote_requests (quote_request_id));
diesel::joinable!(quote_responses -> professionals (professional_id));
diesel::joinable!(bookings -> professionals (professional_id));

diesel::allow_tables_to_appear_in_same_query!(
    professionals,
    quote_requests,
    quote_responses,
    bookings,
    notifications,
);
