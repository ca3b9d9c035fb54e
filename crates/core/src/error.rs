use thiserror::Error;

/// Errors raised while interpreting domain input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Missing matchup ID")]
    MissingMatchupId,

    #[error("Malformed matchup ID: {0}")]
    MalformedMatchupId(String),

    #[error("A matchup needs two different emcees")]
    SelfMatchup,
}
