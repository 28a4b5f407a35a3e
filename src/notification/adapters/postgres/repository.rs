//! `PostgreSQL` implementation of the notification repository.

use super::{models::NotificationRow, schema::notifications};
use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind, PersistedNotificationData, ProjectId},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::adapters::postgres::PgPool;
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed notification repository.
#[derive(Debug, Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationRepositoryError::persistence)?
    }
}

fn to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: notification.id().into_inner(),
        owner_id: notification.owner().into_inner(),
        task_id: notification.task_id().map(TaskId::into_inner),
        project_id: notification.project_id().map(ProjectId::into_inner),
        kind: notification.kind().as_str().to_owned(),
        message: notification.message().to_owned(),
        is_read: notification.is_read(),
        created_at: notification.created_at(),
    }
}

fn row_to_notification(row: NotificationRow) -> NotificationRepositoryResult<Notification> {
    let NotificationRow {
        id,
        owner_id,
        task_id,
        project_id,
        kind: persisted_kind,
        message,
        is_read,
        created_at,
    } = row;

    let kind = NotificationKind::try_from(persisted_kind.as_str())
        .map_err(NotificationRepositoryError::persistence)?;

    let data = PersistedNotificationData {
        id: NotificationId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        task_id: task_id.map(TaskId::from_uuid),
        project_id: project_id.map(ProjectId::from_uuid),
        kind,
        message,
        read: is_read,
        created_at,
    };
    Ok(Notification::from_persisted(data))
}

fn rows_to_notifications(
    rows: Vec<NotificationRow>,
) -> NotificationRepositoryResult<Vec<Notification>> {
    rows.into_iter().map(row_to_notification).collect()
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let notification_id = notification.id();
        let row = to_row(notification);

        self.run_blocking(move |connection| {
            diesel::insert_into(notifications::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        NotificationRepositoryError::DuplicateNotification(notification_id)
                    }
                    _ => NotificationRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        self.run_blocking(move |connection| {
            let row = notifications::table
                .filter(notifications::id.eq(id.into_inner()))
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?;
            row.map(row_to_notification).transpose()
        })
        .await
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::owner_id.eq(owner.into_inner()))
                .order(notifications::created_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            rows_to_notifications(rows)
        })
        .await
    }

    async fn find_unread(&self, owner: UserId) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::owner_id.eq(owner.into_inner()))
                .filter(notifications::is_read.eq(false))
                .order(notifications::created_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            rows_to_notifications(rows)
        })
        .await
    }

    async fn count_unread(&self, owner: UserId) -> NotificationRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count = notifications::table
                .filter(notifications::owner_id.eq(owner.into_inner()))
                .filter(notifications::is_read.eq(false))
                .count()
                .get_result::<i64>(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                notifications::table.filter(notifications::id.eq(id.into_inner())),
            )
            .set(notifications::is_read.eq(true))
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)?;
            if affected == 0 {
                return Err(NotificationRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn mark_all_read(&self, owner: UserId) -> NotificationRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            diesel::update(
                notifications::table
                    .filter(notifications::owner_id.eq(owner.into_inner()))
                    .filter(notifications::is_read.eq(false)),
            )
            .set(notifications::is_read.eq(true))
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)
        })
        .await
    }

    async fn delete(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                notifications::table.filter(notifications::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)?;
            if affected == 0 {
                return Err(NotificationRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_read(&self, owner: UserId) -> NotificationRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            diesel::delete(
                notifications::table
                    .filter(notifications::owner_id.eq(owner.into_inner()))
                    .filter(notifications::is_read.eq(true)),
            )
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)
        })
        .await
    }
}
