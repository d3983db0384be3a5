#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TravelRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub comrades_count: i64,
    pub start_at: String,
    pub end_at: String,
}
