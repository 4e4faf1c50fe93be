use sqlx::FromRow;

/// Short code to destination mapping. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Link {
    pub source: String,
    pub destination: String,
}
