#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crudfacade::{
    EntityStore, Registry, RelationDef, Resource, SearchConfig, TypeDescriptor, ValueDomain,
    routes,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde::{Deserialize, Serialize};

pub mod resources {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Department {
        pub id: Option<i64>,
        pub name: String,
    }

    impl Resource for Department {
        const TYPE_ID: &'static str = "department";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "departments")
                .attribute("name", ValueDomain::Text)
                .relation(RelationDef::one_to_many(
                    "employees",
                    "employee",
                    "department_id",
                ))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Employee {
        pub id: Option<i64>,
        pub name: String,
        pub age: Option<i64>,
        pub active: bool,
        pub department_id: Option<i64>,
    }

    impl Resource for Employee {
        const TYPE_ID: &'static str = "employee";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "employees")
                .attribute("name", ValueDomain::Text)
                .attribute("age", ValueDomain::Integer)
                .attribute("active", ValueDomain::Boolean)
                .attribute_column("departmentId", "department_id", ValueDomain::Integer)
                .active_flag("active")
                .relation(RelationDef::many_to_one(
                    "department",
                    "department",
                    "department_id",
                ))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Customer {
        pub id: Option<i64>,
        pub name: String,
        pub country: String,
    }

    impl Resource for Customer {
        const TYPE_ID: &'static str = "customer";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "customers")
                .attribute("name", ValueDomain::Text)
                .attribute("country", ValueDomain::Text)
                .relation(RelationDef::one_to_many("orders", "order", "customer_id"))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Order {
        pub id: Option<i64>,
        pub reference: String,
        pub total: f64,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub customer_id: Option<i64>,
    }

    impl Resource for Order {
        const TYPE_ID: &'static str = "order";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::new(Self::TYPE_ID, "orders")
                .attribute("reference", ValueDomain::Text)
                .attribute("total", ValueDomain::Float)
                .attribute("status", ValueDomain::Text)
                .attribute_column("createdAt", "created_at", ValueDomain::DateTime)
                .attribute_column("customerId", "customer_id", ValueDomain::Integer)
                .relation(RelationDef::many_to_one("customer", "customer", "customer_id"))
        }
    }
}

use resources::{Customer, Department, Employee, Order};

/// Route library logs to the test output; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn registry() -> Registry {
    Registry::new()
        .register::<Department>()
        .register::<Employee>()
        .register::<Customer>()
        .register::<Order>()
}

pub async fn setup_store() -> EntityStore {
    setup_store_with(SearchConfig::default()).await
}

pub async fn setup_store_with(config: SearchConfig) -> EntityStore {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    EntityStore::with_config(db, registry(), config)
}

pub fn setup_test_app(store: EntityStore) -> Router {
    routes::router(store)
}

/// Midnight UTC on 2024-03-01 plus `hours`
pub fn at_hour(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

/// Two departments and five employees, one of them deactivated.
///
/// Engineering: Ada (36), Grace (45), Linus (28, inactive)
/// Operations: Ken (52), Barbara (19)
pub async fn seed_staff(store: &EntityStore) -> (Department, Department) {
    let engineering = store
        .create_resource(Department {
            id: None,
            name: "Engineering".to_string(),
        })
        .await
        .unwrap();
    let operations = store
        .create_resource(Department {
            id: None,
            name: "Operations".to_string(),
        })
        .await
        .unwrap();

    let staff = [
        ("Ada", 36, true, &engineering),
        ("Grace", 45, true, &engineering),
        ("Linus", 28, false, &engineering),
        ("Ken", 52, true, &operations),
        ("Barbara", 19, true, &operations),
    ];
    for (name, age, active, department) in staff {
        store
            .create_resource(Employee {
                id: None,
                name: name.to_string(),
                age: Some(age),
                active,
                department_id: department.id,
            })
            .await
            .unwrap();
    }
    (engineering, operations)
}

/// Customers in the US and in France. The US customers share twelve orders,
/// `US-01` oldest through `US-12` newest; the French customer has three.
pub async fn seed_orders(store: &EntityStore) {
    let mut customers = Vec::new();
    for (name, country) in [("Acme", "US"), ("Globex", "US"), ("Lumière", "FR")] {
        customers.push(
            store
                .create_resource(Customer {
                    id: None,
                    name: name.to_string(),
                    country: country.to_string(),
                })
                .await
                .unwrap(),
        );
    }

    for i in 1..=12_u8 {
        let customer = &customers[usize::from(i % 2 == 0)];
        store
            .create_resource(Order {
                id: None,
                reference: format!("US-{i:02}"),
                total: 10.0 * f64::from(i),
                status: if i % 3 == 0 { "shipped" } else { "open" }.to_string(),
                created_at: at_hour(i64::from(i)),
                customer_id: customer.id,
            })
            .await
            .unwrap();
    }
    for i in 1..=3_i64 {
        store
            .create_resource(Order {
                id: None,
                reference: format!("FR-{i:02}"),
                total: 99.5,
                status: "open".to_string(),
                created_at: at_hour(100 + i),
                customer_id: customers[2].id,
            })
            .await
            .unwrap();
    }
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateTables)]
    }
}

pub struct CreateTables;

#[async_trait::async_trait]
impl MigrationName for CreateTables {
    fn name(&self) -> &'static str {
        "m20240301_000001_create_tables"
    }
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(id_column(Departments::Id))
                    .col(ColumnDef::new(Departments::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(id_column(Employees::Id))
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::Age).integer().null())
                    .col(
                        ColumnDef::new(Employees::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::DepartmentId).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(id_column(Customers::Id))
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Country).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(id_column(Orders::Id))
                    .col(ColumnDef::new(Orders::Reference).string().not_null())
                    .col(ColumnDef::new(Orders::Total).double().not_null())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).integer().null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    Name,
    Age,
    Active,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Country,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    Reference,
    Total,
    Status,
    CreatedAt,
    CustomerId,
}
