//! `PostgreSQL` repository implementation for task storage.

use super::{models::TaskRow, schema::tasks};
use crate::task::{
    domain::{
        CategoryId, CategoryRef, PersistedTaskData, Priority, Task, TaskId, TaskStatus, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the bitacora adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

fn to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let category = task
        .category()
        .map(serde_json::to_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    Ok(TaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        category,
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        start_date: task.start_date(),
        due_date: task.due_date(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        category: persisted_category,
        title,
        description,
        start_date,
        due_date,
        priority: persisted_priority,
        status: persisted_status,
        created_at,
    } = row;

    let category = persisted_category
        .map(serde_json::from_value::<CategoryRef>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let priority = Priority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        category,
        title,
        description,
        start_date,
        due_date,
        priority,
        status,
        created_at,
    };
    Ok(Task::from_persisted(data))
}

fn rows_to_tasks(rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    rows.into_iter().map(row_to_task).collect()
}

const ACTIVE_EXCLUDED: [&str; 2] = ["completed", "incomplete"];

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.eq(status.as_str()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_by_owner_excluding_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.ne(status.as_str()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_by_category(&self, category: CategoryId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let query = diesel::sql_query(concat!(
                "SELECT id, owner_id, category, title, description, start_date, due_date, ",
                "priority, status, created_at FROM tasks ",
                "WHERE (category->>'id')::UUID = $1",
            ))
            .bind::<diesel::sql_types::Uuid, _>(category.into_inner());
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_by_priority(
        &self,
        owner: UserId,
        priority: Priority,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::priority.eq(priority.as_str()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_due_between(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.ne_all(ACTIVE_EXCLUDED))
                .filter(tasks::due_date.between(from, to))
                .order(tasks::due_date.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn find_incomplete(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.eq(TaskStatus::Incomplete.as_str()))
                .order(tasks::due_date.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows_to_tasks(rows)
        })
        .await
    }

    async fn count_active(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.ne_all(ACTIVE_EXCLUDED))
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn count_due_on(&self, owner: UserId, date: NaiveDate) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.ne(TaskStatus::Completed.as_str()))
                .filter(tasks::due_date.eq(date))
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn count_high_priority(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.ne(TaskStatus::Completed.as_str()))
                .filter(tasks::priority.eq(Priority::High.as_str()))
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }
}
