use sqlx::FromRow;

/// Account row. `passhash` and `salt` never leave the server.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub passhash: String,
    pub salt: String,
    pub phone_number: Option<String>,
}

/// Insert payload; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub passhash: String,
    pub salt: String,
    pub phone_number: Option<String>,
}
