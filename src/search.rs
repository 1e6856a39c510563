use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::core::TypeDescriptor;
use crate::errors::ApiError;
use crate::filtering::{COUNT_ALIAS, SearchPlans};
use crate::models::SearchResponse;
use crate::records::decode_row;

/// Run both plans of a search inside one read transaction.
///
/// The count runs against the same snapshot as the page, so `total` always
/// agrees with what the data plan would return unpaged. Either plan failing
/// fails the whole search.
///
/// # Errors
///
/// `ApiError::Database` for any store failure.
pub async fn execute_search(
    db: &DatabaseConnection,
    descriptor: &TypeDescriptor,
    plans: &SearchPlans,
) -> Result<SearchResponse, ApiError> {
    let backend = db.get_database_backend();
    let txn = db.begin().await?;

    let statement = backend.build(&plans.data);
    tracing::debug!(entity = descriptor.name, sql = %statement, "Executing data plan");
    let rows = txn.query_all(statement).await?;
    let data = rows
        .iter()
        .map(|row| decode_row(descriptor, row))
        .collect::<Result<Vec<_>, _>>()?;

    let total = match &plans.count {
        None => None,
        Some(count) => {
            let statement = backend.build(count);
            tracing::debug!(entity = descriptor.name, sql = %statement, "Executing count plan");
            let counted = match txn.query_one(statement).await? {
                Some(row) => row.try_get::<Option<i64>>("", COUNT_ALIAS)?,
                None => None,
            };
            Some(counted.map_or(0, |n| u64::try_from(n).unwrap_or(0)))
        }
    };

    txn.commit().await?;
    tracing::debug!(
        entity = descriptor.name,
        returned = data.len(),
        total = ?total,
        "Search complete"
    );
    Ok(SearchResponse { data, total })
}
