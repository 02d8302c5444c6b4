use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::rating::{self, Entity as RatingEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::domain::{ProductReview, Rating};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<Option<Rating>>;

    /// Ratings for a product with reviewer names, newest first
    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductReview>>;

    /// A user's ratings, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;
}

pub struct RatingStore {
    db: DatabaseConnection,
}

impl RatingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Reviewer shown when the account no longer exists
const UNKNOWN_REVIEWER: &str = "Former customer";

pub(crate) async fn find_rating<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    product_id: Uuid,
    order_id: Uuid,
) -> AppResult<Option<Rating>> {
    let result = RatingEntity::find()
        .filter(rating::Column::UserId.eq(user_id))
        .filter(rating::Column::ProductId.eq(product_id))
        .filter(rating::Column::OrderId.eq(order_id))
        .one(db)
        .await?;
    Ok(result.map(Rating::from))
}

/// Insert or update the rating for a (user, product, order) triple.
pub(crate) async fn upsert_rating<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    product_id: Uuid,
    order_id: Uuid,
    score: i32,
    review: Option<String>,
) -> AppResult<Rating> {
    let now = Utc::now();
    let existing = RatingEntity::find()
        .filter(rating::Column::UserId.eq(user_id))
        .filter(rating::Column::ProductId.eq(product_id))
        .filter(rating::Column::OrderId.eq(order_id))
        .one(db)
        .await?;

    let model = match existing {
        Some(model) => {
            let mut active: rating::ActiveModel = model.into();
            active.rating = Set(score);
            active.review = Set(review);
            active.updated_at = Set(now);
            active.update(db).await?
        }
        None => {
            rating::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(product_id),
                order_id: Set(order_id),
                rating: Set(score),
                review: Set(review),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    Ok(Rating::from(model))
}

pub(crate) async fn scores_for_product<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
) -> AppResult<Vec<i32>> {
    let scores = RatingEntity::find()
        .select_only()
        .column(rating::Column::Rating)
        .filter(rating::Column::ProductId.eq(product_id))
        .into_tuple::<i32>()
        .all(db)
        .await?;
    Ok(scores)
}

#[async_trait]
impl RatingRepository for RatingStore {
    async fn find(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<Option<Rating>> {
        find_rating(&self.db, user_id, product_id, order_id).await
    }

    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductReview>> {
        let ratings = RatingEntity::find()
            .filter(rating::Column::ProductId.eq(product_id))
            .order_by_desc(rating::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let user_ids: Vec<Uuid> = ratings.iter().map(|r| r.user_id).collect();
        let names: Vec<(Uuid, String)> = if user_ids.is_empty() {
            Vec::new()
        } else {
            UserEntity::find()
                .select_only()
                .column(user::Column::Id)
                .column(user::Column::Name)
                .filter(user::Column::Id.is_in(user_ids))
                .into_tuple()
                .all(&self.db)
                .await?
        };

        Ok(ratings
            .into_iter()
            .map(|model| {
                let user_name = names
                    .iter()
                    .find(|(id, _)| *id == model.user_id)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_else(|| UNKNOWN_REVIEWER.to_string());
                ProductReview {
                    rating: Rating::from(model),
                    user_name,
                }
            })
            .collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let models = RatingEntity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .order_by_desc(rating::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Rating::from).collect())
    }
}
