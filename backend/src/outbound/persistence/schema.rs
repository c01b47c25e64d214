//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema` after
//! a migration changes the schema.

diesel::table! {
    /// Registered users and their public profile fields.
    users (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Linked Google identity, when the account came from OAuth.
        google_id -> Nullable<Varchar>,
        /// Given name (max 100 characters).
        first_name -> Varchar,
        /// Family name (max 100 characters).
        last_name -> Varchar,
        /// Unique contact address.
        email -> Varchar,
        /// Free-text location.
        location -> Varchar,
        /// Free-text title.
        title -> Varchar,
        /// Free-text biography.
        bio -> Text,
        /// Personal website URL (max 500 characters).
        website -> Varchar,
        /// Social handles as a JSON object.
        socials -> Jsonb,
        /// Unique handle (max 50 characters).
        username -> Varchar,
        /// Profile picture URL (max 500 characters).
        profile_picture -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tracked pottery pieces.
    pieces (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Short title (max 255 characters).
        title -> Varchar,
        /// Kind of ware; the SQL column is named `type`.
        #[sql_name = "type"]
        kind -> Varchar,
        /// Free-text description.
        details -> Text,
        /// Optional free-text status note (max 255 characters).
        status -> Nullable<Varchar>,
        /// Priority name: high, medium, or low.
        priority -> Varchar,
        /// Current workflow stage name.
        stage -> Varchar,
        /// Hidden from active views when set.
        archived -> Bool,
        /// Pinned by the owner.
        starred -> Bool,
        /// Owning user; rows cascade when the user is deleted.
        owner_id -> Uuid,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Touched by every update.
        last_updated -> Timestamptz,
        /// Optional target date.
        due_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Per-stage metadata rows; one per `(piece, stage)` pair.
    stage_details (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Owning piece; rows cascade when the piece is deleted.
        piece_id -> Uuid,
        /// Stage name this row records.
        stage -> Varchar,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// Image reference (max 500 characters).
        image_url -> Nullable<Varchar>,
        /// Thrown weight in grams.
        weight -> Nullable<Int4>,
        /// Glaze descriptions.
        glazes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Touched by every update.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(pieces -> users (owner_id));
diesel::joinable!(stage_details -> pieces (piece_id));

diesel::allow_tables_to_appear_in_same_query!(users, pieces, stage_details);
