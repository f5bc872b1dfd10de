//! Index seeding with generated products.

use tracing::{info, instrument};

use crate::generator::ProductGenerator;
use crate::loader::{BulkLoader, LoadSummary};
use catalog_search_repository::{IndexManager, RequestContext, SearchError};

/// Recreate the managed index and load `count` generated products into it.
///
/// Index recreation failures are returned as errors; batch and refresh
/// failures are reported in the summary.
#[instrument(skip(ctx, manager, loader, generator), fields(index = %manager.index()))]
pub async fn seed_products(
    ctx: &RequestContext,
    manager: &IndexManager,
    loader: &BulkLoader,
    generator: &mut ProductGenerator,
    count: usize,
) -> Result<LoadSummary, SearchError> {
    if manager.index() != loader.index() {
        return Err(SearchError::configuration(format!(
            "index manager targets '{}' but loader targets '{}'",
            manager.index(),
            loader.index()
        )));
    }

    manager.recreate_index(ctx).await?;
    info!(count, "Seeding products");

    Ok(loader.load(ctx, generator.by_ref().take(count)).await)
}
