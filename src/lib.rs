//! # crudfacade
//!
//! A generic persistence facade: CRUD plus paginated, filtered search over any
//! registered record type, driven by a declarative AND/OR filter tree instead
//! of per-type query code.
//!
//! ```rust,ignore
//! let registry = Registry::new().register::<Customer>().register::<Order>();
//! let store = EntityStore::new(db, registry);
//!
//! let request = SearchRequest::new()
//!     .with_count()
//!     .page(2, 5)
//!     .order_by("createdAt", SortOrder::Desc)
//!     .add_filter(
//!         vec![FilterPredicate::new("customer.country", ComparisonOperator::Equals, "US")],
//!         BoolOperator::And,
//!     );
//! let page = store.search_entities("order", &request).await?;
//! ```
//!
//! Field paths are resolved through each type's [`TypeDescriptor`]; a dotted
//! path like `customer.country` becomes a LEFT JOIN. The paged data plan and
//! the count plan are compiled from the same filter tree, so `total` always
//! matches what the data plan returns unpaged.
//!
//! [`routes::router`] exposes the same operations over HTTP with `axum`.

pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod openapi;
pub mod operations;
pub mod records;
pub mod routes;
pub mod search;

pub use config::SearchConfig;
pub use crate::core::{
    AttributeDef, Cardinality, Record, Registry, RelationDef, Resource, TypeDescriptor,
    ValueDomain,
};
pub use errors::ApiError;
pub use filtering::FilterValue;
pub use models::{
    BoolOperator, ComparisonOperator, FilterCondition, FilterOptions, FilterPredicate,
    SearchRequest, SearchResponse, SortOrder,
};
pub use operations::{CoreDao, EntityStore};
