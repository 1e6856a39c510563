use utoipa::OpenApi;

use crate::models::{
    BoolOperator, ComparisonOperator, FilterCondition, FilterOptions, FilterPredicate,
    SearchRequest, SortOrder,
};
use crate::routes::{self, MutationResponse};

/// OpenAPI document for [`routes::router`].
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::search_query,
        routes::search_body,
        routes::get_one,
        routes::create_one,
        routes::update_one,
        routes::delete_one,
        routes::mass_delete
    ),
    components(schemas(
        SearchRequest,
        FilterCondition,
        FilterPredicate,
        ComparisonOperator,
        BoolOperator,
        SortOrder,
        FilterOptions,
        MutationResponse
    )),
    tags((name = "entities", description = "Generic CRUD and search over registered types"))
)]
pub struct ApiDoc;
