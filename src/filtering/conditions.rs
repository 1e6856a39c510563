use sea_orm::{
    Condition,
    sea_query::{Expr, SimpleExpr},
};

use super::joined::JoinContext;
use super::values::FilterValue;
use crate::core::ValueDomain;
use crate::errors::ApiError;
use crate::models::{BoolOperator, ComparisonOperator, FilterCondition, FilterPredicate};

/// Always-true expression used for an empty condition (`1 = 1`)
fn match_all() -> SimpleExpr {
    Expr::val(1).eq(1)
}

fn mismatch(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::type_mismatch(field, message)
}

/// Compile one predicate into a leaf expression, resolving its field through `ctx`.
///
/// # Errors
///
/// `UnknownField` / `UnknownType` from resolution, `TypeMismatch` when the
/// value does not suit the operator or the field's domain.
pub fn compile_predicate(
    predicate: &FilterPredicate,
    ctx: &mut JoinContext<'_>,
) -> Result<SimpleExpr, ApiError> {
    let field = ctx.resolve(&predicate.field)?;
    let domain = field.attribute.domain;
    let column = field.expr();

    match predicate.operator {
        ComparisonOperator::Equals => {
            match predicate
                .value
                .coerce(domain)
                .map_err(|m| mismatch(&predicate.field, m))?
            {
                None => Ok(column.is_null()),
                Some(value) => Ok(column.eq(value)),
            }
        }
        ComparisonOperator::Like => {
            if domain != ValueDomain::Text {
                return Err(mismatch(
                    &predicate.field,
                    format!("LIKE needs a text field, this one is {}", domain.name()),
                ));
            }
            match &predicate.value {
                FilterValue::Text(pattern) => Ok(column.like(pattern.clone())),
                other => Err(mismatch(
                    &predicate.field,
                    format!("LIKE needs a text pattern, got {}", other.kind()),
                )),
            }
        }
        ComparisonOperator::GreaterThanOrEqual | ComparisonOperator::LessThanOrEqual => {
            if !domain.is_orderable() {
                return Err(mismatch(
                    &predicate.field,
                    format!("{} values cannot be ordered", domain.name()),
                ));
            }
            let value = predicate
                .value
                .coerce(domain)
                .map_err(|m| mismatch(&predicate.field, m))?
                .ok_or_else(|| mismatch(&predicate.field, "cannot order against null"))?;
            Ok(if predicate.operator == ComparisonOperator::GreaterThanOrEqual {
                column.gte(value)
            } else {
                column.lte(value)
            })
        }
    }
}

/// Compile a condition and everything nested in it into one composite condition.
///
/// Nested conditions are compiled against themselves with the same `ctx`, so a
/// relation used at several nesting levels is joined once.
///
/// # Errors
///
/// `MissingOperator` if this or any nested condition has no operator, plus
/// every error of [`compile_predicate`].
pub fn compile_condition(
    condition: &FilterCondition,
    ctx: &mut JoinContext<'_>,
) -> Result<Condition, ApiError> {
    let operator = condition.operator.ok_or(ApiError::MissingOperator)?;
    let mut compiled = match operator {
        BoolOperator::And => Condition::all(),
        BoolOperator::Or => Condition::any(),
    };

    if condition.is_empty() {
        return Ok(compiled.add(match_all()));
    }

    for predicate in &condition.predicates {
        compiled = compiled.add(compile_predicate(predicate, ctx)?);
    }
    for nested in &condition.conditions {
        compiled = compiled.add(compile_condition(nested, ctx)?);
    }
    Ok(compiled)
}

/// AND-combine the top-level conditions of a request.
///
/// Returns `None` for an empty list: no restriction at all.
///
/// # Errors
///
/// Every error of [`compile_condition`].
pub fn compile_filter(
    filter: &[FilterCondition],
    ctx: &mut JoinContext<'_>,
) -> Result<Option<Condition>, ApiError> {
    if filter.is_empty() {
        return Ok(None);
    }
    let mut combined = Condition::all();
    for condition in filter {
        combined = combined.add(compile_condition(condition, ctx)?);
    }
    Ok(Some(combined))
}
