//! JSON body extractor that runs `validator` rules.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// Like [`Json`], but rejects malformed bodies and failed validation with a 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Login {
        #[validate(email(message = "Please provide a valid email"))]
        email: String,
    }

    fn json_request(body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let ValidatedJson(login) =
            ValidatedJson::<Login>::from_request(json_request(r#"{"email":"a@shop.test"}"#), &())
                .await
                .unwrap();
        assert_eq!(login.email, "a@shop.test");
    }

    #[tokio::test]
    async fn rejects_failed_validation() {
        let err = ValidatedJson::<Login>::from_request(json_request(r#"{"email":"nope"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Please provide a valid email");
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let err = ValidatedJson::<Login>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
