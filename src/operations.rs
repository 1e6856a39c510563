use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait, Value,
    sea_query::{Alias, Expr, Query, SimpleExpr},
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::core::{AttributeDef, Record, Registry, Resource, TypeDescriptor};
use crate::errors::ApiError;
use crate::filtering::{ROOT_ALIAS, plan_search, record_select};
use crate::models::{SearchRequest, SearchResponse};
use crate::records::{column_values, decode_row, record_id};
use crate::search::execute_search;

/// Persistence boundary used by the transport layer.
///
/// Every mutation runs in its own transaction and either commits completely or
/// leaves the store untouched.
#[async_trait]
pub trait CoreDao: Send + Sync {
    /// Insert a new record. Any identifier in `record` is ignored; the store
    /// assigns one and the stored record is returned.
    async fn create(&self, type_id: &str, record: Record) -> Result<Record, ApiError>;

    /// Upsert by identifier with merge semantics: only attributes present in
    /// `record` are written. Without an identifier, or with one that matches
    /// no row, the record is inserted.
    async fn update(&self, type_id: &str, record: Record) -> Result<Record, ApiError>;

    /// `Ok(None)` when no record has this identifier.
    async fn find_by_id(&self, type_id: &str, id: i64) -> Result<Option<Record>, ApiError>;

    /// Remove a record. Deleting an absent record succeeds.
    async fn delete(&self, type_id: &str, id: i64) -> Result<(), ApiError>;

    /// Remove every listed record in one statement. An empty set is a no-op.
    async fn mass_delete(&self, type_id: &str, ids: &BTreeSet<i64>) -> Result<(), ApiError>;

    async fn search_entities(
        &self,
        type_id: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError>;
}

/// [`CoreDao`] over a sea-orm connection.
#[derive(Clone)]
pub struct EntityStore {
    db: DatabaseConnection,
    registry: Arc<Registry>,
    config: SearchConfig,
}

impl EntityStore {
    #[must_use]
    pub fn new(db: DatabaseConnection, registry: Registry) -> Self {
        Self::with_config(db, registry, SearchConfig::default())
    }

    #[must_use]
    pub fn with_config(db: DatabaseConnection, registry: Registry, config: SearchConfig) -> Self {
        Self {
            db,
            registry: Arc::new(registry),
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Typed [`CoreDao::create`].
    ///
    /// # Errors
    ///
    /// Same as [`CoreDao::create`], plus `BadRequest` if the stored row does not fit `T`.
    pub async fn create_resource<T: Resource>(&self, item: T) -> Result<T, ApiError> {
        let created = self.create(T::TYPE_ID, item.into_record()?).await?;
        T::from_record(created)
    }

    /// Typed [`CoreDao::update`].
    ///
    /// # Errors
    ///
    /// Same as [`CoreDao::update`], plus `BadRequest` if the stored row does not fit `T`.
    pub async fn update_resource<T: Resource>(&self, item: T) -> Result<T, ApiError> {
        let updated = self.update(T::TYPE_ID, item.into_record()?).await?;
        T::from_record(updated)
    }

    /// Typed [`CoreDao::find_by_id`].
    ///
    /// # Errors
    ///
    /// Same as [`CoreDao::find_by_id`], plus `BadRequest` if the stored row does not fit `T`.
    pub async fn find_resource<T: Resource>(&self, id: i64) -> Result<Option<T>, ApiError> {
        self.find_by_id(T::TYPE_ID, id)
            .await?
            .map(T::from_record)
            .transpose()
    }

    /// Typed [`CoreDao::search_entities`].
    ///
    /// # Errors
    ///
    /// Same as [`CoreDao::search_entities`], plus `BadRequest` if a row does not fit `T`.
    pub async fn search_resources<T: Resource>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse<T>, ApiError> {
        self.search_entities(T::TYPE_ID, request)
            .await?
            .into_typed::<T>()
    }
}

fn root_id(descriptor: &TypeDescriptor) -> Expr {
    Expr::col((Alias::new(ROOT_ALIAS), Alias::new(descriptor.id().column)))
}

fn table_id(descriptor: &TypeDescriptor) -> Expr {
    Expr::col(Alias::new(descriptor.id().column))
}

async fn fetch_by_id<C: ConnectionTrait>(
    conn: &C,
    descriptor: &TypeDescriptor,
    id: i64,
) -> Result<Option<Record>, ApiError> {
    let mut select = record_select(descriptor);
    select.and_where(root_id(descriptor).eq(id));
    let statement = conn.get_database_backend().build(&select);
    match conn.query_one(statement).await? {
        Some(row) => Ok(Some(decode_row(descriptor, &row)?)),
        None => Ok(None),
    }
}

/// Insert one row and return its identifier. With `explicit_id` the row is
/// written under that identifier, otherwise the store assigns one.
async fn insert_row<C: ConnectionTrait>(
    conn: &C,
    descriptor: &TypeDescriptor,
    values: Vec<(&AttributeDef, Value)>,
    explicit_id: Option<i64>,
) -> Result<i64, ApiError> {
    let id_column = descriptor.id().column;
    let mut columns = Vec::with_capacity(values.len() + 1);
    let mut exprs: Vec<SimpleExpr> = Vec::with_capacity(values.len() + 1);
    if let Some(id) = explicit_id {
        columns.push(Alias::new(id_column));
        exprs.push(id.into());
    }
    for (attribute, value) in values {
        columns.push(Alias::new(attribute.column));
        exprs.push(value.into());
    }

    let mut insert = Query::insert();
    insert.into_table(Alias::new(descriptor.table));
    if columns.is_empty() {
        insert.or_default_values();
    } else {
        insert.columns(columns);
        insert
            .values(exprs)
            .map_err(|e| DbErr::Custom(e.to_string()))?;
    }

    let backend = conn.get_database_backend();
    if backend.support_returning() {
        insert.returning_col(Alias::new(id_column));
        let row = conn
            .query_one(backend.build(&insert))
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        return Ok(row.try_get::<i64>("", id_column)?);
    }

    let result = conn.execute(backend.build(&insert)).await?;
    match explicit_id {
        Some(id) => Ok(id),
        None => i64::try_from(result.last_insert_id())
            .map_err(|_| ApiError::database(DbErr::RecordNotInserted)),
    }
}

#[async_trait]
impl CoreDao for EntityStore {
    async fn create(&self, type_id: &str, record: Record) -> Result<Record, ApiError> {
        let descriptor = self.registry.get(type_id)?;
        let values = column_values(descriptor, &record)?;

        let txn = self.db.begin().await?;
        let id = insert_row(&txn, descriptor, values, None).await?;
        let created = fetch_by_id(&txn, descriptor, id)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        txn.commit().await?;

        tracing::debug!(entity = type_id, id, "Created record");
        Ok(created)
    }

    async fn update(&self, type_id: &str, record: Record) -> Result<Record, ApiError> {
        let descriptor = self.registry.get(type_id)?;
        let requested_id = record_id(descriptor, &record)?;
        let values = column_values(descriptor, &record)?;

        let txn = self.db.begin().await?;
        let (id, inserted) = match requested_id {
            None => (insert_row(&txn, descriptor, values, None).await?, true),
            Some(id) if fetch_by_id(&txn, descriptor, id).await?.is_none() => {
                (insert_row(&txn, descriptor, values, Some(id)).await?, true)
            }
            Some(id) => {
                if !values.is_empty() {
                    let mut update = Query::update();
                    update.table(Alias::new(descriptor.table));
                    for (attribute, value) in values {
                        update.value(Alias::new(attribute.column), value);
                    }
                    update.and_where(table_id(descriptor).eq(id));
                    txn.execute(txn.get_database_backend().build(&update))
                        .await?;
                }
                (id, false)
            }
        };
        let merged = fetch_by_id(&txn, descriptor, id)
            .await?
            .ok_or_else(|| ApiError::not_found(type_id, id))?;
        txn.commit().await?;

        tracing::debug!(entity = type_id, id, inserted, "Updated record");
        Ok(merged)
    }

    async fn find_by_id(&self, type_id: &str, id: i64) -> Result<Option<Record>, ApiError> {
        let descriptor = self.registry.get(type_id)?;
        fetch_by_id(&self.db, descriptor, id).await
    }

    async fn delete(&self, type_id: &str, id: i64) -> Result<(), ApiError> {
        let descriptor = self.registry.get(type_id)?;
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(descriptor.table))
            .and_where(table_id(descriptor).eq(id));

        let txn = self.db.begin().await?;
        let result = txn.execute(txn.get_database_backend().build(&delete)).await?;
        txn.commit().await?;

        tracing::debug!(
            entity = type_id,
            id,
            rows_affected = result.rows_affected(),
            "Deleted record"
        );
        Ok(())
    }

    async fn mass_delete(&self, type_id: &str, ids: &BTreeSet<i64>) -> Result<(), ApiError> {
        let descriptor = self.registry.get(type_id)?;
        if ids.is_empty() {
            tracing::debug!(entity = type_id, "Mass delete with no identifiers, nothing to do");
            return Ok(());
        }
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(descriptor.table))
            .and_where(table_id(descriptor).is_in(ids.iter().copied()));

        let txn = self.db.begin().await?;
        let result = txn.execute(txn.get_database_backend().build(&delete)).await?;
        txn.commit().await?;

        tracing::debug!(
            entity = type_id,
            requested = ids.len(),
            rows_affected = result.rows_affected(),
            "Mass deleted records"
        );
        Ok(())
    }

    async fn search_entities(
        &self,
        type_id: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError> {
        let descriptor = self.registry.get(type_id)?;
        let plans = plan_search(&self.registry, descriptor, request, &self.config)?;
        execute_search(&self.db, descriptor, &plans).await
    }
}
