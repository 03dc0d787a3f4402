use thiserror::Error;

/// Problems met while expanding. None of them stops the expansion; they are
/// collected on the expander instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("template {name:?} nested too deep (limit {limit})")]
    TooDeep { name: String, limit: usize },

    #[error("markup nested too deep (limit {limit})")]
    NestingTooDeep { limit: usize },

    #[error("no template {name:?}")]
    MissingTemplate { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("an expander needs a template source")]
    MissingSource,
}
