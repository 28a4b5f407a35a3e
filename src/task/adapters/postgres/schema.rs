//! Diesel schema for task and history persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user identifier.
        owner_id -> Uuid,
        /// Resolved category reference payload, if any.
        category -> Nullable<Jsonb>,
        /// Task title.
        #[max_length = 150]
        title -> Varchar,
        /// Task description.
        description -> Nullable<Text>,
        /// Start date.
        start_date -> Date,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Priority, stored canonical snake_case.
        #[max_length = 10]
        priority -> Varchar,
        /// Lifecycle status, stored canonical snake_case.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only history ledger entries.
    history_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Recorded task identifier. Deliberately not a foreign key:
        /// entries outlive task deletion.
        task_id -> Uuid,
        /// Acting user identifier.
        user_id -> Uuid,
        /// Action payload.
        action -> Jsonb,
        /// Denormalized completion marker for indexed filtering.
        is_completion -> Bool,
        /// Entry timestamp.
        recorded_at -> Timestamptz,
        /// Optional completion snapshot payload.
        snapshot -> Nullable<Jsonb>,
    }
}
