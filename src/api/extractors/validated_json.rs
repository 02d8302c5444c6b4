//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed bodies and rule violations both become a 400 with the
/// unified error body.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Join field messages, falling back to "<field> is invalid".
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    use crate::domain::AddToCart;

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_error() {
        let body = r#"{"userId":"6a1f4f4e-59a5-4f3e-9a5a-1c2d3e4f5a6b","productId":"0f8fad5b-d9cb-469f-a165-70867728950e","quantity":0}"#;
        let err = ValidatedJson::<AddToCart>::from_request(json_request(body), &())
            .await
            .err()
            .unwrap();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("Quantity")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quantity_defaults_to_one() {
        let body = r#"{"userId":"6a1f4f4e-59a5-4f3e-9a5a-1c2d3e4f5a6b","productId":"0f8fad5b-d9cb-469f-a165-70867728950e"}"#;
        let ValidatedJson(payload) = ValidatedJson::<AddToCart>::from_request(json_request(body), &())
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.quantity, 1);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let err = ValidatedJson::<AddToCart>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
