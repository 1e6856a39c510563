//! Field path resolution.
//!
//! A dotted path such as `customer.country` is resolved against the root
//! type's relation graph. Every segment but the last names a relation and
//! becomes a LEFT JOIN; the last segment names a leaf attribute on the entity
//! reached so far.
//!
//! Joins live in a [`JoinContext`] owned by one query plan. The same relation
//! prefix always maps to the same join alias, so ten predicates on
//! `customer.*` still produce a single join to `customers`.

use sea_orm::sea_query::{Alias, Expr, JoinType, SelectStatement};
use std::collections::HashMap;

use crate::core::{AttributeDef, Cardinality, Registry, RelationDef, TypeDescriptor};
use crate::errors::ApiError;

/// Alias of the queried type's table in every plan
pub const ROOT_ALIAS: &str = "t0";

#[derive(Debug, Clone, PartialEq, Eq)]
struct JoinNode {
    alias: String,
    table: &'static str,
    parent_alias: String,
    local_column: &'static str,
    remote_column: &'static str,
}

/// Leaf attribute reached by a field path, plus the alias of the table holding it.
#[derive(Debug, Clone)]
pub struct ResolvedField<'r> {
    pub alias: String,
    pub attribute: &'r AttributeDef,
}

impl ResolvedField<'_> {
    /// Qualified column expression, `"alias"."column"`
    #[must_use]
    pub fn expr(&self) -> Expr {
        Expr::col((Alias::new(&self.alias), Alias::new(self.attribute.column)))
    }

    #[must_use]
    pub fn column_ref(&self) -> (Alias, Alias) {
        (Alias::new(&self.alias), Alias::new(self.attribute.column))
    }
}

/// Join state of a single query plan.
pub struct JoinContext<'r> {
    registry: &'r Registry,
    root: &'r TypeDescriptor,
    joins: Vec<JoinNode>,
    by_prefix: HashMap<String, usize>,
    fans_out: bool,
}

impl<'r> JoinContext<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry, root: &'r TypeDescriptor) -> Self {
        Self {
            registry,
            root,
            joins: Vec::new(),
            by_prefix: HashMap::new(),
            fans_out: false,
        }
    }

    /// Resolve `path`, adding any joins it needs that are not already present.
    ///
    /// # Errors
    ///
    /// `UnknownField` when a segment is empty or does not exist on its entity,
    /// `UnknownType` when a relation points at an unregistered type.
    pub fn resolve(&mut self, path: &str) -> Result<ResolvedField<'r>, ApiError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ApiError::unknown_field(self.root.name, path));
        }
        let Some((leaf, relations)) = segments.split_last() else {
            return Err(ApiError::unknown_field(self.root.name, path));
        };

        let registry = self.registry;
        let mut entity = self.root;
        let mut alias = ROOT_ALIAS.to_string();
        let mut prefix = String::new();

        for segment in relations {
            let relation = entity
                .find_relation(segment)
                .ok_or_else(|| ApiError::unknown_field(entity.name, path))?;
            let target = registry.get(relation.target)?;
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            alias = self.join(&prefix, &alias, relation, target);
            entity = target;
        }

        let attribute = entity
            .find_attribute(leaf)
            .ok_or_else(|| ApiError::unknown_field(entity.name, path))?;
        Ok(ResolvedField { alias, attribute })
    }

    fn join(
        &mut self,
        prefix: &str,
        parent_alias: &str,
        relation: &RelationDef,
        target: &TypeDescriptor,
    ) -> String {
        if let Some(&index) = self.by_prefix.get(prefix) {
            return self.joins[index].alias.clone();
        }
        let alias = format!("t{}", self.joins.len() + 1);
        self.joins.push(JoinNode {
            alias: alias.clone(),
            table: target.table,
            parent_alias: parent_alias.to_string(),
            local_column: relation.local_column,
            remote_column: relation.remote_column,
        });
        self.by_prefix.insert(prefix.to_string(), self.joins.len() - 1);
        if relation.cardinality == Cardinality::OneToMany {
            self.fans_out = true;
        }
        alias
    }

    /// Add the collected LEFT JOINs to `select`, in creation order.
    pub fn apply(&self, select: &mut SelectStatement) {
        for join in &self.joins {
            select.join_as(
                JoinType::LeftJoin,
                Alias::new(join.table),
                Alias::new(&join.alias),
                Expr::col((Alias::new(&join.parent_alias), Alias::new(join.local_column)))
                    .equals((Alias::new(&join.alias), Alias::new(join.remote_column))),
            );
        }
    }

    /// Whether a joined relation can repeat root rows
    #[must_use]
    pub fn fans_out(&self) -> bool {
        self.fans_out
    }

    #[must_use]
    pub fn join_count(&self) -> usize {
        self.joins.len()
    }

    #[must_use]
    pub fn root(&self) -> &'r TypeDescriptor {
        self.root
    }
}
