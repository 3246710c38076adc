//! In-memory offer store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::OfferStore,
    repo_types::{NewOffer, OfferPatch, OfferRecord},
};
use crate::error::ApiResult;

#[derive(Default)]
pub struct MemoryOfferStore {
    offers: RwLock<HashMap<Uuid, OfferRecord>>,
}

impl MemoryOfferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut rows: Vec<OfferRecord>) -> Vec<OfferRecord> {
    rows.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    rows
}

fn take(rows: Vec<OfferRecord>, limit: i64) -> Vec<OfferRecord> {
    rows.into_iter().take(limit.max(0) as usize).collect()
}

#[async_trait]
impl OfferStore for MemoryOfferStore {
    async fn list(&self, limit: i64) -> ApiResult<Vec<OfferRecord>> {
        let rows = self.offers.read().await.values().cloned().collect();
        Ok(take(newest_first(rows), limit))
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<OfferRecord>> {
        Ok(self.offers.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> ApiResult<Vec<OfferRecord>> {
        let offers = self.offers.read().await;
        let rows = ids.iter().filter_map(|id| offers.get(id).cloned()).collect();
        Ok(newest_first(rows))
    }

    async fn premium_by_city(&self, city: &str, limit: i64) -> ApiResult<Vec<OfferRecord>> {
        let rows = self
            .offers
            .read()
            .await
            .values()
            .filter(|o| o.is_premium && o.city == city)
            .cloned()
            .collect();
        Ok(take(newest_first(rows), limit))
    }

    async fn create(&self, offer: NewOffer) -> ApiResult<OfferRecord> {
        let record = offer.into_record();
        self.offers.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: OfferPatch) -> ApiResult<Option<OfferRecord>> {
        let mut offers = self.offers.write().await;
        Ok(offers.get_mut(&id).map(|record| {
            patch.apply(record);
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        Ok(self.offers.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::dto::{tests::valid_request, City};
    use time::{Duration, OffsetDateTime};

    fn new_offer(city: City, premium: bool, age_days: i64) -> NewOffer {
        let mut request = valid_request();
        request.city = city;
        request.is_premium = premium;
        NewOffer {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            publish_date: OffsetDateTime::now_utc() - Duration::days(age_days),
            request,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let store = MemoryOfferStore::new();
        let old = store.create(new_offer(City::Paris, false, 3)).await.unwrap();
        let new = store.create(new_offer(City::Paris, false, 1)).await.unwrap();
        store.create(new_offer(City::Paris, false, 2)).await.unwrap();

        let all = store.list(60).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, new.id);
        assert_eq!(all[2].id, old.id);
        assert_eq!(store.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn premium_filters_by_city() {
        let store = MemoryOfferStore::new();
        for age in 0..5 {
            store.create(new_offer(City::Hamburg, true, age)).await.unwrap();
        }
        store.create(new_offer(City::Hamburg, false, 0)).await.unwrap();
        store.create(new_offer(City::Paris, true, 0)).await.unwrap();

        let premium = store.premium_by_city("Hamburg", 3).await.unwrap();
        assert_eq!(premium.len(), 3);
        assert!(premium.iter().all(|o| o.is_premium && o.city == "Hamburg"));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let store = MemoryOfferStore::new();
        let offer = store.create(new_offer(City::Paris, false, 0)).await.unwrap();

        let patch = OfferPatch {
            price: Some(999),
            ..Default::default()
        };
        let updated = store.update(offer.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.price, 999);
        assert!(store
            .update(Uuid::new_v4(), OfferPatch::default())
            .await
            .unwrap()
            .is_none());

        assert!(store.delete(offer.id).await.unwrap());
        assert!(!store.delete(offer.id).await.unwrap());
        assert!(store.find_many(&[offer.id]).await.unwrap().is_empty());
    }
}
