use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::ApiResult, validation::ValidationResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub rating: i16,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_date: OffsetDateTime,
    pub author_id: Uuid,
    pub offer_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub rating: i16,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let mut v = ValidationResult::new();
        v.check_len("text", &self.text, 5..=1024);
        v.check_range("rating", self.rating, 1..=5);
        v.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let ok = CreateCommentRequest {
            text: "Lovely place".into(),
            rating: 5,
        };
        assert!(ok.validate().is_ok());

        for (text, rating) in [("meh", 3), ("Fine enough", 0), ("Fine enough", 6)] {
            let req = CreateCommentRequest {
                text: text.into(),
                rating,
            };
            assert!(req.validate().is_err(), "{text} / {rating}");
        }
    }
}
