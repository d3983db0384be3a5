#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub travel_id: String,
    pub title: String,
    pub destination: String,
    pub description: String,
    pub created_at: String,
    /// Owner of the travel the post belongs to.
    pub user_id: String,
}

/// A post joined with its travel and the travel's author, as shown in a feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedPostRow {
    pub id: String,
    pub travel_id: String,
    pub title: String,
    pub destination: String,
    pub description: String,
    pub created_at: String,
    pub travel_title: String,
    pub travel_description: String,
    pub travel_destination: String,
    pub travel_comrades_count: i64,
    pub travel_start_at: String,
    pub travel_end_at: String,
    pub author_id: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_username: String,
}
