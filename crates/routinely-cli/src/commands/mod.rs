pub mod config;
pub mod context;
pub mod session;
pub mod template;

use routinely_core::{Catalog, CatalogStore, Config};

/// Load the catalog named by the config (or the default catalog file).
pub fn load_catalog(config: &Config) -> Result<Catalog, Box<dyn std::error::Error>> {
    let store = CatalogStore::with_path(config.catalog_file()?);
    Ok(store.load()?)
}
