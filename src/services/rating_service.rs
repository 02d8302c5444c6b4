//! Rating service.
//!
//! A rating is tied to a delivered order containing the product. Submitting
//! again for the same (user, product, order) edits the earlier rating, and
//! every submission recomputes the product's average in the same transaction.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::rating::average_rating;
use crate::domain::{OrderStatus, ProductReview, Rating, RatingEligibility, SubmitRating};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait RatingService: Send + Sync {
    async fn submit(&self, user_id: Uuid, request: SubmitRating) -> AppResult<Rating>;

    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductReview>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;

    async fn can_rate(&self, user_id: Uuid, product_id: Uuid) -> AppResult<RatingEligibility>;
}

pub struct RatingManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RatingManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RatingService for RatingManager<U> {
    async fn submit(&self, user_id: Uuid, request: SubmitRating) -> AppResult<Rating> {
        let SubmitRating {
            product_id,
            order_id,
            rating,
            review,
        } = request;
        let review = review
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let saved = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let order = ctx
                        .orders()
                        .find_by_id(order_id)
                        .await?
                        .ok_or_not_found("Order")?;

                    if !order.belongs_to(user_id) {
                        return Err(AppError::forbidden(
                            "You can only rate products from your own orders",
                        ));
                    }
                    if order.status != OrderStatus::Delivered {
                        return Err(AppError::validation(
                            "You can only rate products from delivered orders",
                        ));
                    }
                    if !order.contains_product(product_id) {
                        return Err(AppError::validation("This product is not part of the order"));
                    }
                    ctx.products()
                        .find_by_id(product_id)
                        .await?
                        .ok_or_not_found("Product")?;

                    let saved = ctx
                        .ratings()
                        .upsert(user_id, product_id, order_id, rating, review)
                        .await?;

                    let scores = ctx.ratings().scores_for_product(product_id).await?;
                    ctx.products()
                        .set_avg_rating(product_id, average_rating(&scores))
                        .await?;

                    Ok(saved)
                })
            })
            .await?;

        tracing::debug!(product_id = %product_id, rating = saved.rating, "Rating saved");
        Ok(saved)
    }

    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductReview>> {
        self.uow.ratings().list_for_product(product_id).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        self.uow.ratings().list_for_user(user_id).await
    }

    /// Prefers the newest delivered order not rated yet; when every such
    /// order is rated, points at the newest one so its rating can be edited.
    async fn can_rate(&self, user_id: Uuid, product_id: Uuid) -> AppResult<RatingEligibility> {
        let order_ids = self
            .uow
            .orders()
            .delivered_with_product(user_id, product_id)
            .await?;

        let Some(newest) = order_ids.first().copied() else {
            return Ok(RatingEligibility {
                can_rate: false,
                order_id: None,
                existing_rating: None,
            });
        };

        let mut newest_rating = None;
        for order_id in &order_ids {
            match self.uow.ratings().find(user_id, product_id, *order_id).await? {
                None => {
                    return Ok(RatingEligibility {
                        can_rate: true,
                        order_id: Some(*order_id),
                        existing_rating: None,
                    })
                }
                Some(rating) if *order_id == newest => newest_rating = Some(rating),
                Some(_) => {}
            }
        }

        Ok(RatingEligibility {
            can_rate: true,
            order_id: Some(newest),
            existing_rating: newest_rating,
        })
    }
}
