use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no layout named {0:?}")]
    UnknownLayout(String),
    #[error("layout {0:?} has no keys")]
    Empty(String),
    #[error("layout engine: {0}")]
    Taffy(#[from] taffy::TaffyError),
}
