//! Request extractors that fail with [`AppError`](crate::errors::AppError).

mod valid_path;
mod validated_json;

pub use valid_path::{ValidPath, ValidQuery};
pub use validated_json::ValidatedJson;
