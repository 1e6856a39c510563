use sea_orm::{
    Condition,
    sea_query::{Alias, Expr, Func, Query, SelectStatement},
};

use super::conditions::compile_filter;
use super::joined::{JoinContext, ROOT_ALIAS};
use super::pagination::page_window;
use super::sort::{apply_sort, resolve_sort};
use crate::config::SearchConfig;
use crate::core::{Registry, TypeDescriptor};
use crate::errors::ApiError;
use crate::models::SearchRequest;

/// Output alias of the count plan's single column
pub const COUNT_ALIAS: &str = "total";

/// The two executable variants of one search request.
#[derive(Debug, Clone)]
pub struct SearchPlans {
    /// Filtered, ordered, paginated record query
    pub data: SelectStatement,
    /// Scalar count of every match, `None` when the request skips counting
    pub count: Option<SelectStatement>,
}

/// `SELECT "t0"."col" AS "attr", ... FROM "table" AS "t0"`
///
/// Projects every attribute of `descriptor` under its attribute name, so rows
/// decode the same way no matter how columns are named in the store.
#[must_use]
pub fn record_select(descriptor: &TypeDescriptor) -> SelectStatement {
    let root = Alias::new(ROOT_ALIAS);
    let mut select = Query::select();
    select.from_as(Alias::new(descriptor.table), root.clone());
    for attribute in &descriptor.attributes {
        select.expr_as(
            Expr::col((root.clone(), Alias::new(attribute.column))),
            Alias::new(attribute.name),
        );
    }
    select
}

/// Compile the request's filter plus the active-flag restriction against `ctx`.
fn restriction(
    descriptor: &TypeDescriptor,
    request: &SearchRequest,
    ctx: &mut JoinContext<'_>,
) -> Result<Option<Condition>, ApiError> {
    let mut condition = compile_filter(&request.filter, ctx)?;
    if let (false, Some(flag)) = (request.show_deactivated, descriptor.active_flag) {
        let active = ctx.resolve(flag)?.expr().eq(true);
        condition = Some(condition.unwrap_or_else(Condition::all).add(active));
    }
    Ok(condition)
}

fn data_plan(
    registry: &Registry,
    descriptor: &TypeDescriptor,
    request: &SearchRequest,
    page_size: u64,
) -> Result<SelectStatement, ApiError> {
    let (offset, limit) = page_window(request.page, page_size)?;
    let mut ctx = JoinContext::new(registry, descriptor);
    let condition = restriction(descriptor, request, &mut ctx)?;
    let sort = resolve_sort(request.order_by.as_deref(), &mut ctx)?;

    let mut select = record_select(descriptor);
    ctx.apply(&mut select);
    if let Some(condition) = condition {
        select.cond_where(condition);
    }
    if ctx.fans_out() {
        let root = Alias::new(ROOT_ALIAS);
        for attribute in &descriptor.attributes {
            select.group_by_col((root.clone(), Alias::new(attribute.column)));
        }
    }
    apply_sort(&mut select, sort.as_ref(), request.order, &ctx);
    select.offset(offset).limit(limit);
    Ok(select)
}

fn count_plan(
    registry: &Registry,
    descriptor: &TypeDescriptor,
    request: &SearchRequest,
) -> Result<SelectStatement, ApiError> {
    let mut ctx = JoinContext::new(registry, descriptor);
    let condition = restriction(descriptor, request, &mut ctx)?;

    let id = Expr::col((Alias::new(ROOT_ALIAS), Alias::new(descriptor.id().column)));
    let counted = if ctx.fans_out() {
        Func::count_distinct(id)
    } else {
        Func::count(id)
    };

    let mut select = Query::select();
    select
        .expr_as(counted, Alias::new(COUNT_ALIAS))
        .from_as(Alias::new(descriptor.table), Alias::new(ROOT_ALIAS));
    ctx.apply(&mut select);
    if let Some(condition) = condition {
        select.cond_where(condition);
    }
    Ok(select)
}

/// Build the data plan and, unless `ignore_count` is set, the count plan.
///
/// The page size is resolved against `config` before the offset is computed,
/// so `page` counts pages of the clamped size.
///
/// Each plan compiles the filter with its own [`JoinContext`], so neither
/// shares join aliases or expressions with the other. Every validation error
/// surfaces here, before anything is executed.
///
/// # Errors
///
/// `BadRequest` for an invalid page window, plus every filter compilation error.
pub fn plan_search(
    registry: &Registry,
    descriptor: &TypeDescriptor,
    request: &SearchRequest,
    config: &SearchConfig,
) -> Result<SearchPlans, ApiError> {
    let page_size = config.effective_page_size(request.page_size);
    let data = data_plan(registry, descriptor, request, page_size)?;
    let count = if request.ignore_count {
        None
    } else {
        Some(count_plan(registry, descriptor, request)?)
    };
    Ok(SearchPlans { data, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RelationDef, Resource, ValueDomain};
    use crate::models::{
        BoolOperator, ComparisonOperator, FilterCondition, FilterPredicate, SortOrder,
    };
    use sea_orm::sea_query::{QueryStatementWriter, SqliteQueryBuilder};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Department;
    #[derive(Serialize, Deserialize)]
    struct Employee;

    impl Resource for Department {
        const TYPE_ID: &'static str = "department";
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "departments")
                .attribute("name", ValueDomain::Text)
                .relation(RelationDef::one_to_many("employees", "employee", "department_id"))
        }
    }

    impl Resource for Employee {
        const TYPE_ID: &'static str = "employee";
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "employees")
                .attribute("name", ValueDomain::Text)
                .attribute("age", ValueDomain::Integer)
                .attribute_column("hiredAt", "hired_at", ValueDomain::DateTime)
                .attribute("active", ValueDomain::Boolean)
                .active_flag("active")
                .relation(RelationDef::many_to_one("department", "department", "department_id"))
        }
    }

    fn registry() -> Registry {
        Registry::new().register::<Department>().register::<Employee>()
    }

    fn plan(type_id: &str, request: &SearchRequest) -> Result<(String, Option<String>), ApiError> {
        plan_with(type_id, request, &SearchConfig::default())
    }

    fn plan_with(
        type_id: &str,
        request: &SearchRequest,
        config: &SearchConfig,
    ) -> Result<(String, Option<String>), ApiError> {
        let registry = registry();
        let descriptor = registry.get(type_id)?;
        let plans = plan_search(&registry, descriptor, request, config)?;
        Ok((
            plans.data.to_string(SqliteQueryBuilder),
            plans.count.map(|c| c.to_string(SqliteQueryBuilder)),
        ))
    }

    #[test]
    fn test_projection_uses_attribute_names() {
        let registry = registry();
        let sql = record_select(registry.get("employee").unwrap()).to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""t0"."hired_at" AS "hiredAt""#), "{sql}");
        assert!(sql.contains(r#"FROM "employees" AS "t0""#), "{sql}");
    }

    #[test]
    fn test_page_window_and_tiebreak() {
        let request = SearchRequest::new()
            .page(2, 5)
            .order_by("hiredAt", SortOrder::Desc)
            .show_deactivated(true);
        let (data, count) = plan("employee", &request).unwrap();
        assert!(
            data.contains(r#"ORDER BY "t0"."hired_at" DESC, "t0"."id" ASC LIMIT 5 OFFSET 5"#),
            "{data}"
        );
        assert!(count.is_none());
    }

    #[test]
    fn test_default_order_is_identifier() {
        let request = SearchRequest::new().show_deactivated(true);
        let (data, _) = plan("employee", &request).unwrap();
        assert!(data.contains(r#"ORDER BY "t0"."id" ASC LIMIT"#), "{data}");
        assert!(!data.contains("WHERE"), "{data}");
    }

    #[test]
    fn test_count_plan_mirrors_filter_without_paging() {
        let request = SearchRequest::new()
            .with_count()
            .page(3, 10)
            .order_by("name", SortOrder::Asc)
            .show_deactivated(true)
            .add_filter(
                vec![FilterPredicate::new(
                    "department.name",
                    ComparisonOperator::Equals,
                    "Eng",
                )],
                BoolOperator::And,
            );
        let (data, count) = plan("employee", &request).unwrap();
        let count = count.unwrap();
        assert!(count.starts_with(r#"SELECT COUNT("t0"."id") AS "total""#), "{count}");
        assert!(count.contains(r#"LEFT JOIN "departments" AS "t1""#), "{count}");
        assert!(count.contains(r#""t1"."name" = 'Eng'"#), "{count}");
        assert!(!count.contains("ORDER BY") && !count.contains("LIMIT"), "{count}");
        assert!(data.contains(r#""t1"."name" = 'Eng'"#), "{data}");
    }

    #[test]
    fn test_repeated_relation_joins_once() {
        let request = SearchRequest::new().show_deactivated(true).with_condition(
            FilterCondition::or()
                .predicate(FilterPredicate::new(
                    "department.name",
                    ComparisonOperator::Equals,
                    "Eng",
                ))
                .predicate(FilterPredicate::new(
                    "department.name",
                    ComparisonOperator::Like,
                    "Ops%",
                )),
        );
        let (data, _) = plan("employee", &request).unwrap();
        assert_eq!(data.matches("LEFT JOIN").count(), 1, "{data}");
    }

    #[test]
    fn test_active_flag_unless_deactivated_shown() {
        let (data, count) = plan("employee", &SearchRequest::default()).unwrap();
        assert!(data.contains(r#"WHERE "t0"."active" = "#), "{data}");
        assert!(count.unwrap().contains(r#"WHERE "t0"."active" = "#));

        let (data, _) = plan("employee", &SearchRequest::new().show_deactivated(true)).unwrap();
        assert!(!data.contains("WHERE"), "{data}");
    }

    #[test]
    fn test_to_many_join_groups_roots() {
        let request = SearchRequest::new()
            .with_count()
            .order_by("employees.age", SortOrder::Desc)
            .add_filter(
                vec![FilterPredicate::new(
                    "employees.age",
                    ComparisonOperator::GreaterThanOrEqual,
                    30,
                )],
                BoolOperator::And,
            );
        let (data, count) = plan("department", &request).unwrap();
        assert!(data.contains(r#"GROUP BY "t0"."id", "t0"."name""#), "{data}");
        assert!(
            data.contains(r#"ORDER BY MAX("t1"."age") DESC, "t0"."id" ASC"#),
            "{data}"
        );
        assert!(
            count.unwrap().contains(r#"COUNT(DISTINCT "t0"."id")"#),
            "count must not include join fan-out"
        );
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = SearchConfig {
            max_page_size: Some(50),
            ..SearchConfig::default()
        };
        let (data, _) = plan_with("department", &SearchRequest::new(), &config).unwrap();
        assert!(data.contains("LIMIT 50 OFFSET 0"), "{data}");
    }

    #[test]
    fn test_clamped_pages_stay_contiguous() {
        let config = SearchConfig {
            max_page_size: Some(50),
            ..SearchConfig::default()
        };
        let request = SearchRequest::new().page(2, 100);
        let (data, _) = plan_with("department", &request, &config).unwrap();
        assert!(data.contains("LIMIT 50 OFFSET 50"), "{data}");
    }

    #[test]
    fn test_missing_page_size_uses_configured_default() {
        let config = SearchConfig {
            default_page_size: 7,
            ..SearchConfig::default()
        };
        let (data, _) = plan_with("department", &SearchRequest::new(), &config).unwrap();
        assert!(data.contains("LIMIT 7 OFFSET 0"), "{data}");
    }

    #[test]
    fn test_compile_errors_abort_planning() {
        let missing = SearchRequest::new().with_condition(FilterCondition {
            predicates: vec![FilterPredicate::new("age", ComparisonOperator::Equals, 3)],
            ..Default::default()
        });
        assert!(matches!(plan("employee", &missing), Err(ApiError::MissingOperator)));

        let unknown = SearchRequest::new().order_by("salary", SortOrder::Asc);
        assert!(matches!(
            plan("employee", &unknown),
            Err(ApiError::UnknownField { .. })
        ));

        let bad_page = SearchRequest::new().page(0, 10);
        assert!(matches!(
            plan("employee", &bad_page),
            Err(ApiError::BadRequest { .. })
        ));
    }
}
