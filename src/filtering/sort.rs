use sea_orm::sea_query::{Alias, Func, Order, SelectStatement};

use super::joined::{JoinContext, ROOT_ALIAS, ResolvedField};
use crate::errors::ApiError;
use crate::models::SortOrder;

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Resolve the `orderBy` path, adding any join it needs to `ctx`.
///
/// # Errors
///
/// Same as [`JoinContext::resolve`].
pub fn resolve_sort<'r>(
    order_by: Option<&str>,
    ctx: &mut JoinContext<'r>,
) -> Result<Option<ResolvedField<'r>>, ApiError> {
    order_by.map(|path| ctx.resolve(path)).transpose()
}

/// Order `select` by the resolved sort field, then by the root identifier.
///
/// The identifier is always the last key so that pages never overlap or skip
/// rows when the sort field has duplicates. In a grouped plan a joined sort
/// field is aggregated: each root row ranks by its smallest related value when
/// ascending and its largest when descending.
pub fn apply_sort(
    select: &mut SelectStatement,
    sort: Option<&ResolvedField<'_>>,
    order: SortOrder,
    ctx: &JoinContext<'_>,
) {
    let id = ctx.root().id();
    if let Some(field) = sort {
        if ctx.fans_out() && field.alias != ROOT_ALIAS {
            let key = match order {
                SortOrder::Asc => Func::min(field.expr()),
                SortOrder::Desc => Func::max(field.expr()),
            };
            select.order_by_expr(key.into(), order.into());
        } else {
            select.order_by(field.column_ref(), order.into());
            if field.alias == ROOT_ALIAS && field.attribute.name == id.name {
                return;
            }
        }
    }
    select.order_by((Alias::new(ROOT_ALIAS), Alias::new(id.column)), Order::Asc);
}
