use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::CommentStore,
    repo_types::{CommentRecord, NewComment},
};
use crate::error::ApiResult;

#[derive(Default)]
pub struct MemoryCommentStore {
    comments: RwLock<Vec<CommentRecord>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn list_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<CommentRecord>> {
        let mut rows: Vec<_> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.offer_id == offer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(rows)
    }

    async fn create(&self, comment: NewComment) -> ApiResult<CommentRecord> {
        let record = CommentRecord::from(comment);
        self.comments.write().await.push(record.clone());
        Ok(record)
    }

    async fn ratings_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<i16>> {
        Ok(self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.offer_id == offer_id)
            .map(|c| c.rating)
            .collect())
    }

    async fn ratings_by_offers(&self, offer_ids: &[Uuid]) -> ApiResult<HashMap<Uuid, Vec<i16>>> {
        let mut grouped: HashMap<Uuid, Vec<i16>> = HashMap::new();
        for c in self.comments.read().await.iter() {
            if offer_ids.contains(&c.offer_id) {
                grouped.entry(c.offer_id).or_default().push(c.rating);
            }
        }
        Ok(grouped)
    }

    async fn delete_by_offer(&self, offer_id: Uuid) -> ApiResult<u64> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.offer_id != offer_id);
        Ok((before - comments.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn comment(offer_id: Uuid, rating: i16, age_minutes: i64) -> NewComment {
        NewComment {
            id: Uuid::new_v4(),
            offer_id,
            author_id: Uuid::new_v4(),
            text: "Nice stay".into(),
            rating,
            publish_date: OffsetDateTime::now_utc() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn comments_are_scoped_to_their_offer() {
        let store = MemoryCommentStore::new();
        let offer = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.create(comment(offer, 5, 10)).await.unwrap();
        let newest = store.create(comment(offer, 3, 1)).await.unwrap();
        store.create(comment(other, 1, 0)).await.unwrap();

        let listed = store.list_by_offer(offer).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);

        let mut ratings = store.ratings_by_offer(offer).await.unwrap();
        ratings.sort();
        assert_eq!(ratings, vec![3, 5]);

        let grouped = store.ratings_by_offers(&[offer, other, Uuid::new_v4()]).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&other], vec![1]);
        assert_eq!(grouped[&offer].len(), 2);

        assert_eq!(store.delete_by_offer(offer).await.unwrap(), 2);
        assert!(store.list_by_offer(offer).await.unwrap().is_empty());
        assert_eq!(store.ratings_by_offer(other).await.unwrap(), vec![1]);
    }
}
