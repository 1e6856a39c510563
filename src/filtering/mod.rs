//! # Query Engine
//!
//! Turns a [`SearchRequest`](crate::SearchRequest) into executable plans:
//!
//! 1. [`joined`] resolves dotted field paths into aliased columns, adding one
//!    LEFT JOIN per distinct relation prefix.
//! 2. [`conditions`] compiles the AND/OR filter tree into a `sea_query`
//!    condition. Values are always bound, never spliced into SQL.
//! 3. [`planner`] assembles the paged data plan and the count plan from the
//!    same filter tree, each with its own join context.
//!
//! Nothing here touches the database; planning is pure, and every filter
//! error is raised before a statement is executed.

pub mod conditions;
pub mod joined;
pub mod pagination;
pub mod planner;
pub mod sort;
pub mod values;

pub use conditions::{compile_condition, compile_filter, compile_predicate};
pub use joined::{JoinContext, ROOT_ALIAS, ResolvedField};
pub use pagination::page_window;
pub use planner::{COUNT_ALIAS, SearchPlans, plan_search, record_select};
pub use values::FilterValue;
