pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Unknown genres: requested {requested}, found {found}")]
    UnknownGenres { requested: usize, found: usize },

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Error::InvalidEntity(report.to_string())
    }
}

impl Error {
    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::DatabaseError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
