//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the doc-harvester REST API
///
/// Served at `/api/v1/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "doc-harvester REST API",
        version = "0.1.0",
        description = "Harvest document links from a web page into object storage",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790/api/v1", description = "Local development server")
    ),
    paths(
        crate::api::routes::harvest,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::HarvestRequest,
            crate::types::BatchReport,
            crate::types::BatchSummary,
            crate::types::ItemResult,
            crate::types::ItemError,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "harvest", description = "Batch harvesting"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
