#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub hash_pwd: String,
    pub jwt_id: Option<String>,
}
