//! Product ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating shown on a product page
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    #[serde(flatten)]
    pub rating: Rating,
    pub user_name: String,
}

/// Rating submission payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRating {
    pub product_id: Uuid,
    pub order_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 2000, message = "Review cannot exceed 2000 characters"))]
    pub review: Option<String>,
}

/// Whether the caller can rate a product, and through which order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingEligibility {
    pub can_rate: bool,
    pub order_id: Option<Uuid>,
    pub existing_rating: Option<Rating>,
}

/// Rounded mean of the given ratings, 0 when there are none.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    (sum as f64 / ratings.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average_rating(&[]), 0);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        assert_eq!(average_rating(&[5]), 5);
        assert_eq!(average_rating(&[4, 5]), 5); // 4.5 rounds up
        assert_eq!(average_rating(&[1, 2, 2]), 2); // 1.67
        assert_eq!(average_rating(&[1, 1, 2]), 1); // 1.33
    }
}
