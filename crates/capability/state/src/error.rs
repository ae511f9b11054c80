use hub_catalog::CatalogError;

/// 状态聚合错误。
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
