//! Diesel schema for notification persistence.

diesel::table! {
    /// Derived alert records.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Owning user identifier.
        owner_id -> Uuid,
        /// Optional referenced task.
        task_id -> Nullable<Uuid>,
        /// Optional referenced project.
        project_id -> Nullable<Uuid>,
        /// Alert kind, stored canonical snake_case.
        #[max_length = 50]
        kind -> Varchar,
        /// Message text.
        #[max_length = 255]
        message -> Varchar,
        /// Read flag.
        is_read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
