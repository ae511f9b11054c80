use hub_catalog::CatalogError;
use hub_state::StateError;

/// 编排错误。
///
/// 校验错误在意图创建之前被拒绝，绝不产生 PENDING 记录。
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    State(#[from] StateError),
}
