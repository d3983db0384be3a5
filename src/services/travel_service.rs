use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{travel_repo, user_repo};
use crate::error::{AppError, AppResult};
use crate::services::pagination::{PageRequest, PageView};
use crate::services::projection::{self, TravelView};
use crate::services::validation::{self, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravel {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub destination: String,
    #[serde(default)]
    pub comrades_count: i64,
    pub start_at: String,
    pub end_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTravel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub comrades_count: Option<i64>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
}

pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    input: CreateTravel,
) -> AppResult<TravelView> {
    let title = validation::text(&input.title, "title", 1, MAX_TITLE_LEN)?;
    let description = validation::text(&input.description, "description", 0, MAX_DESCRIPTION_LEN)?;
    let destination = validation::text(&input.destination, "destination", 1, MAX_TITLE_LEN)?;
    let comrades_count = validation::non_negative(input.comrades_count, "comradesCount")?;
    let start_at = validation::date(&input.start_at, "startAt")?;
    let end_at = validation::date(&input.end_at, "endAt")?;
    validation::date_range(&start_at, &end_at)?;

    if !user_repo::user_exists(pool, user_id).await? {
        return Err(AppError::NotFound);
    }

    let id = Uuid::new_v4().to_string();
    travel_repo::insert_travel(
        pool,
        travel_repo::NewTravel {
            id: &id,
            user_id,
            title: &title,
            description: &description,
            destination: &destination,
            comrades_count,
            start_at: &start_at,
            end_at: &end_at,
        },
    )
    .await?;

    info!(user_id, travel_id = %id, "travel created");
    get(pool, &id).await
}

pub async fn get(pool: &SqlitePool, travel_id: &str) -> AppResult<TravelView> {
    let travel = travel_repo::find_travel(pool, travel_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(projection::travel(&travel))
}

/// Travels of `user_id`, latest start first.
pub async fn list_by_user(
    pool: &SqlitePool,
    user_id: &str,
    page: PageRequest,
) -> AppResult<PageView<TravelView>> {
    let rows =
        travel_repo::list_travels_by_user(pool, user_id, page.limit(), page.offset()).await?;
    let total = travel_repo::count_travels_by_user(pool, user_id).await?;

    let travels = rows.iter().map(projection::travel).collect();
    Ok(PageView::new(travels, total, &page))
}

pub async fn update(
    pool: &SqlitePool,
    travel_id: &str,
    input: UpdateTravel,
) -> AppResult<TravelView> {
    let mut travel = travel_repo::find_travel(pool, travel_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(title) = input.title.as_deref() {
        travel.title = validation::text(title, "title", 1, MAX_TITLE_LEN)?;
    }
    if let Some(description) = input.description.as_deref() {
        travel.description =
            validation::text(description, "description", 0, MAX_DESCRIPTION_LEN)?;
    }
    if let Some(destination) = input.destination.as_deref() {
        travel.destination = validation::text(destination, "destination", 1, MAX_TITLE_LEN)?;
    }
    if let Some(count) = input.comrades_count {
        travel.comrades_count = validation::non_negative(count, "comradesCount")?;
    }
    if let Some(start_at) = input.start_at.as_deref() {
        travel.start_at = validation::date(start_at, "startAt")?;
    }
    if let Some(end_at) = input.end_at.as_deref() {
        travel.end_at = validation::date(end_at, "endAt")?;
    }
    // Checked on the merged record: a patch may move only one end.
    validation::date_range(&travel.start_at, &travel.end_at)?;

    if travel_repo::update_travel(pool, &travel).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(projection::travel(&travel))
}

/// Deletes the travel and, through the foreign key, its posts.
pub async fn delete(pool: &SqlitePool, travel_id: &str) -> AppResult<TravelView> {
    let travel = travel_repo::find_travel(pool, travel_id)
        .await?
        .ok_or(AppError::NotFound)?;
    travel_repo::delete_travel(pool, travel_id).await?;

    info!(travel_id, user_id = %travel.user_id, "travel deleted");
    Ok(projection::travel(&travel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{post_repo, test_pool};

    async fn seed_user(pool: &SqlitePool) -> String {
        let id = Uuid::new_v4().to_string();
        user_repo::insert_user(
            pool,
            user_repo::NewUser {
                id: &id,
                first_name: "Ibn",
                last_name: "Battuta",
                username: "battuta",
                email: "battuta@example.com",
                hash_pwd: "hash",
            },
        )
        .await
        .unwrap();
        id
    }

    fn trip(title: &str, start_at: &str, end_at: &str) -> CreateTravel {
        CreateTravel {
            title: title.to_string(),
            description: String::new(),
            destination: "Tangier".to_string(),
            comrades_count: 1,
            start_at: start_at.to_string(),
            end_at: end_at.to_string(),
        }
    }

    #[tokio::test]
    async fn create_validates_and_lists_newest_first() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;

        let older = create(&pool, &user_id, trip("First", "1325-06-14", "1325-12-01"))
            .await
            .unwrap();
        let newer = create(&pool, &user_id, trip("Second", "1330-01-01", "1332-01-01"))
            .await
            .unwrap();
        assert_eq!(older.author_id, user_id);

        let page = list_by_user(&pool, &user_id, PageRequest::new(None).unwrap())
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.total_pages, 1);

        assert!(matches!(
            create(&pool, &user_id, trip("Back", "1332-01-02", "1332-01-01")).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            create(&pool, &user_id, trip("", "1332-01-01", "1332-01-02")).await,
            Err(AppError::InvalidArgument(_))
        ));
        let mut negative = trip("Crowd", "1332-01-01", "1332-01-02");
        negative.comrades_count = -1;
        assert!(matches!(
            create(&pool, &user_id, negative).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            create(
                &pool,
                &Uuid::new_v4().to_string(),
                trip("Ghost", "1332-01-01", "1332-01-02")
            )
            .await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_checks_the_merged_range() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let travel = create(&pool, &user_id, trip("Hajj", "1325-06-14", "1326-01-01"))
            .await
            .unwrap();

        let moved = update(
            &pool,
            &travel.id,
            UpdateTravel {
                end_at: Some("1327-01-01".to_string()),
                comrades_count: Some(12),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.end_at, "1327-01-01");
        assert_eq!(moved.comrades_count, 12);
        assert_eq!(moved.title, "Hajj");

        assert!(matches!(
            update(
                &pool,
                &travel.id,
                UpdateTravel {
                    start_at: Some("1328-01-01".to_string()),
                    ..Default::default()
                },
            )
            .await,
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(get(&pool, &travel.id).await.unwrap().start_at, "1325-06-14");
    }

    #[tokio::test]
    async fn delete_removes_posts_too() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let travel = create(&pool, &user_id, trip("Delhi", "1334-01-01", "1341-01-01"))
            .await
            .unwrap();
        post_repo::insert_post(
            &pool,
            post_repo::NewPost {
                id: &Uuid::new_v4().to_string(),
                travel_id: &travel.id,
                title: "Court",
                destination: "Delhi",
                description: "",
            },
        )
        .await
        .unwrap();

        let deleted = delete(&pool, &travel.id).await.unwrap();
        assert_eq!(deleted.id, travel.id);
        assert!(matches!(get(&pool, &travel.id).await, Err(AppError::NotFound)));
        assert_eq!(
            post_repo::count_posts_by_user(&pool, &user_id).await.unwrap(),
            0
        );
        assert!(matches!(
            delete(&pool, &travel.id).await,
            Err(AppError::NotFound)
        ));
    }
}
