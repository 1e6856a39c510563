//! Type metadata consumed by the query engine.
//!
//! A [`TypeDescriptor`] tells the engine everything it may assume about a record
//! type: the table, the identifier column, the comparable leaf attributes and
//! the relations that dotted field paths may traverse.

/// Value domain of a leaf attribute. Decides which filter values and operators
/// are accepted against it and how rows are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
}

impl ValueDomain {
    /// Whether `>=` / `<=` are meaningful for this domain
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        !matches!(self, Self::Boolean)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    /// Name used in field paths and record keys
    pub name: &'static str,
    /// Column in the backing table
    pub column: &'static str,
    pub domain: ValueDomain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// The local row holds the foreign key (`order.customer_id -> customer.id`)
    ManyToOne,
    /// The remote rows hold the foreign key (`customer.id <- order.customer_id`)
    OneToMany,
}

/// A relation that a field path segment can join through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Segment name used in field paths (`customer` in `customer.country`)
    pub name: &'static str,
    /// Registry identifier of the joined type
    pub target: &'static str,
    /// Column on this type's table used in the join condition
    pub local_column: &'static str,
    /// Column on the target's table used in the join condition
    pub remote_column: &'static str,
    pub cardinality: Cardinality,
}

impl RelationDef {
    /// `local_column` on this table references the target's `id`
    #[must_use]
    pub const fn many_to_one(
        name: &'static str,
        target: &'static str,
        local_column: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            local_column,
            remote_column: "id",
            cardinality: Cardinality::ManyToOne,
        }
    }

    /// `remote_column` on the target table references this type's `id`
    #[must_use]
    pub const fn one_to_many(
        name: &'static str,
        target: &'static str,
        remote_column: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            local_column: "id",
            remote_column,
            cardinality: Cardinality::OneToMany,
        }
    }
}

static DEFAULT_ID: AttributeDef = AttributeDef {
    name: "id",
    column: "id",
    domain: ValueDomain::Integer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Stable registry identifier
    pub name: &'static str,
    pub table: &'static str,
    /// Attribute name of the integer identifier
    pub id_attribute: &'static str,
    pub attributes: Vec<AttributeDef>,
    pub relations: Vec<RelationDef>,
    /// Boolean attribute marking active records, honoured by `show_deactivated`
    pub active_flag: Option<&'static str>,
}

impl TypeDescriptor {
    /// New descriptor with an integer `id` attribute and nothing else.
    #[must_use]
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            id_attribute: "id",
            attributes: vec![AttributeDef {
                name: "id",
                column: "id",
                domain: ValueDomain::Integer,
            }],
            relations: Vec::new(),
            active_flag: None,
        }
    }

    /// Add a leaf attribute stored in a column of the same name.
    #[must_use]
    pub fn attribute(self, name: &'static str, domain: ValueDomain) -> Self {
        self.attribute_column(name, name, domain)
    }

    /// Add a leaf attribute whose column name differs from its field name.
    #[must_use]
    pub fn attribute_column(
        mut self,
        name: &'static str,
        column: &'static str,
        domain: ValueDomain,
    ) -> Self {
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(AttributeDef {
            name,
            column,
            domain,
        });
        self
    }

    #[must_use]
    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.retain(|r| r.name != relation.name);
        self.relations.push(relation);
        self
    }

    /// Mark a boolean attribute as the active/deactivated switch.
    #[must_use]
    pub fn active_flag(mut self, attribute: &'static str) -> Self {
        self.active_flag = Some(attribute);
        self
    }

    #[must_use]
    pub fn find_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn find_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Declare `id_attribute` as an integer attribute of the same column name
    /// if the descriptor does not list it. The registry applies this on registration.
    #[must_use]
    pub fn with_identifier(self) -> Self {
        if self.find_attribute(self.id_attribute).is_some() {
            return self;
        }
        let id = self.id_attribute;
        self.attribute(id, ValueDomain::Integer)
    }

    /// The identifier attribute, or an integer `id` column for hand-built
    /// descriptors that never declared one.
    #[must_use]
    pub fn id(&self) -> &AttributeDef {
        self.find_attribute(self.id_attribute).unwrap_or(&DEFAULT_ID)
    }
}
