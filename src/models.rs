use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::Record;
use crate::errors::ApiError;
use crate::filtering::FilterValue;

/// Comparison applied by a single [`FilterPredicate`]. Closed set: nothing else
/// can reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Equals,
    /// Pattern match; the value is the pattern, wildcards included
    Like,
    #[serde(alias = "GREATER_THAN_OR_EQUAL_TO")]
    GreaterThanOrEqual,
    #[serde(alias = "LESS_THAN_OR_EQUAL_TO")]
    LessThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// One `field operator value` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterPredicate {
    /// Dotted path, e.g. `customer.country`
    pub field: String,
    pub operator: ComparisonOperator,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: FilterValue,
}

impl FilterPredicate {
    pub fn new(
        field: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Predicates and nested conditions combined by one boolean operator.
///
/// `operator` is optional only so that a missing operator can be reported as
/// `ApiError::MissingOperator` instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct FilterCondition {
    #[serde(default)]
    pub predicates: Vec<FilterPredicate>,
    #[serde(default)]
    #[schema(no_recursion)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub operator: Option<BoolOperator>,
}

impl FilterCondition {
    #[must_use]
    pub fn new(operator: BoolOperator) -> Self {
        Self {
            operator: Some(operator),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn and() -> Self {
        Self::new(BoolOperator::And)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::new(BoolOperator::Or)
    }

    #[must_use]
    pub fn predicate(mut self, predicate: FilterPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// No predicates and no nested conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.conditions.is_empty()
    }
}

fn default_page() -> u64 {
    1
}

/// A paginated, filtered, optionally counted search over one record type.
///
/// The top-level `filter` conditions are combined with AND. An empty list
/// matches every record of the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Falls back to the store's `SearchConfig::default_page_size` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub filter: Vec<FilterCondition>,
    /// Skip the count plan; the response then has no `total`
    #[serde(default)]
    pub ignore_count: bool,
    #[serde(default)]
    pub show_deactivated: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
            order: SortOrder::Asc,
            order_by: None,
            filter: Vec::new(),
            ignore_count: false,
            show_deactivated: false,
        }
    }
}

impl SearchRequest {
    /// Request for internal callers: first page, default page size, no count.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_count: true,
            ..Self::default()
        }
    }

    /// Append a top-level condition made of `predicates` joined by `operator`.
    #[must_use]
    pub fn add_filter(mut self, predicates: Vec<FilterPredicate>, operator: BoolOperator) -> Self {
        self.filter.push(FilterCondition {
            predicates,
            conditions: Vec::new(),
            operator: Some(operator),
        });
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.filter.push(condition);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(field.into());
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.ignore_count = false;
        self
    }

    #[must_use]
    pub fn show_deactivated(mut self, show: bool) -> Self {
        self.show_deactivated = show;
        self
    }
}

/// One page of records plus, unless counting was skipped, the total match count.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<R = Record> {
    pub data: Vec<R>,
    pub total: Option<u64>,
}

impl SearchResponse {
    /// Decode every record into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if a row does not fit `T`.
    pub fn into_typed<T: crate::core::Resource>(self) -> Result<SearchResponse<T>, ApiError> {
        let data = self
            .data
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchResponse {
            data,
            total: self.total,
        })
    }
}

/// Query-string form of [`SearchRequest`] used by `GET /api/entity/{entity}`.
///
/// `filter` carries the condition list as JSON, for example
/// `[{"operator":"AND","predicates":[{"field":"name","operator":"LIKE","value":"A%"}]}]`.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct FilterOptions {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 25)]
    pub page_size: Option<u64>,
    #[param(example = "desc")]
    pub order: Option<SortOrder>,
    #[param(example = "createdAt")]
    pub order_by: Option<String>,
    /// JSON-encoded list of filter conditions
    pub filter: Option<String>,
    pub ignore_count: Option<bool>,
    pub show_deactivated: Option<bool>,
}

impl FilterOptions {
    /// Build the equivalent search request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` when `filter` is not a valid JSON condition list.
    pub fn into_search_request(self) -> Result<SearchRequest, ApiError> {
        let filter = match self.filter.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| ApiError::bad_request(format!("Invalid filter JSON: {e}")))?,
        };
        Ok(SearchRequest {
            page: self.page.unwrap_or_else(default_page),
            page_size: self.page_size,
            order: self.order.unwrap_or_default(),
            order_by: self.order_by.filter(|o| !o.is_empty()),
            filter,
            ignore_count: self.ignore_count.unwrap_or(false),
            show_deactivated: self.show_deactivated.unwrap_or(false),
        })
    }
}
