#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Unable to render connection setup: {0}")]
    Template(#[from] tera::Error),

    #[error("Documents must serialize to a JSON object")]
    NotAnObject,

    #[error("Document ids must be strings")]
    InvalidId,

    #[error("{0} is not a valid table name")]
    InvalidTableName(String),

    #[error("A fragment with {values} values needs one more segment than that, but got {segments}")]
    FragmentArity { segments: usize, values: usize },

    #[error("Fragment text may not contain parameter markers, but got {0:?}")]
    ParameterInText(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
