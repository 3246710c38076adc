use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{City, CreateOfferRequest, FavoriteResponse, Offer, UpdateOfferRequest},
    rating::average_rating,
    repo_types::{NewOffer, OfferPatch, OfferRecord, OfferStats},
};
use crate::{
    auth::dto::User,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const PREMIUM_LIMIT: i64 = 3;
const MAX_LIST_LIMIT: i64 = 500;

fn stats_for(record: &OfferRecord, ratings: &[i16], favorites: &[Uuid]) -> OfferStats {
    OfferStats {
        rating: average_rating(ratings),
        comments_count: ratings.len(),
        is_favorite: favorites.contains(&record.id),
    }
}

/// Attaches rating, comment count and the viewer's favorite flag.
async fn with_stats(
    state: &AppState,
    record: OfferRecord,
    favorites: &[Uuid],
) -> ApiResult<Offer> {
    let ratings = state.comments.ratings_by_offer(record.id).await?;
    let stats = stats_for(&record, &ratings, favorites);
    Ok(record.into_offer(stats)?)
}

/// Same as [`with_stats`] with a single ratings query for the whole page.
async fn with_stats_all(
    state: &AppState,
    records: Vec<OfferRecord>,
    favorites: &[Uuid],
) -> ApiResult<Vec<Offer>> {
    let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
    let ratings = state.comments.ratings_by_offers(&ids).await?;

    let mut offers = Vec::with_capacity(records.len());
    for record in records {
        let stats = stats_for(
            &record,
            ratings.get(&record.id).map(Vec::as_slice).unwrap_or(&[]),
            favorites,
        );
        offers.push(record.into_offer(stats)?);
    }
    Ok(offers)
}

fn favorites_of(viewer: Option<&User>) -> &[Uuid] {
    viewer.map(|u| u.favorite_offer_ids.as_slice()).unwrap_or(&[])
}

async fn find_offer(state: &AppState, offer_id: Uuid) -> ApiResult<OfferRecord> {
    state
        .offers
        .find_by_id(offer_id)
        .await?
        .ok_or(ApiError::NotFound("offer not found"))
}

async fn find_owned_offer(
    state: &AppState,
    user: &User,
    offer_id: Uuid,
) -> ApiResult<OfferRecord> {
    let record = find_offer(state, offer_id).await?;
    if record.author_id != user.id {
        warn!(offer_id = %offer_id, user_id = %user.id, "offer change by non-author");
        return Err(ApiError::Forbidden("only the author can change this offer"));
    }
    Ok(record)
}

pub async fn list_offers(
    state: &AppState,
    viewer: Option<&User>,
    limit: i64,
) -> ApiResult<Vec<Offer>> {
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "limit: must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }
    let records = state.offers.list(limit).await?;
    with_stats_all(state, records, favorites_of(viewer)).await
}

pub async fn get_offer(
    state: &AppState,
    viewer: Option<&User>,
    offer_id: Uuid,
) -> ApiResult<Offer> {
    let record = find_offer(state, offer_id).await?;
    with_stats(state, record, favorites_of(viewer)).await
}

pub async fn premium_offers(
    state: &AppState,
    viewer: Option<&User>,
    city: City,
) -> ApiResult<Vec<Offer>> {
    let records = state.offers.premium_by_city(city.as_str(), PREMIUM_LIMIT).await?;
    with_stats_all(state, records, favorites_of(viewer)).await
}

pub async fn create_offer(
    state: &AppState,
    author: &User,
    req: CreateOfferRequest,
) -> ApiResult<Offer> {
    req.validate()?;
    let record = state
        .offers
        .create(NewOffer {
            id: Uuid::new_v4(),
            author_id: author.id,
            publish_date: OffsetDateTime::now_utc(),
            request: req,
        })
        .await?;
    info!(offer_id = %record.id, author_id = %author.id, city = %record.city, "offer created");
    with_stats(state, record, &author.favorite_offer_ids).await
}

pub async fn update_offer(
    state: &AppState,
    user: &User,
    offer_id: Uuid,
    req: UpdateOfferRequest,
) -> ApiResult<Offer> {
    req.validate()?;
    find_owned_offer(state, user, offer_id).await?;

    let record = state
        .offers
        .update(offer_id, OfferPatch::from(req))
        .await?
        .ok_or(ApiError::NotFound("offer not found"))?;
    info!(offer_id = %offer_id, "offer updated");
    with_stats(state, record, &user.favorite_offer_ids).await
}

/// Removes the offer together with its comments.
pub async fn delete_offer(state: &AppState, user: &User, offer_id: Uuid) -> ApiResult<()> {
    find_owned_offer(state, user, offer_id).await?;

    let comments = state.comments.delete_by_offer(offer_id).await?;
    if !state.offers.delete(offer_id).await? {
        return Err(ApiError::NotFound("offer not found"));
    }
    info!(offer_id = %offer_id, comments, "offer deleted");
    Ok(())
}

pub async fn favorite_offers(state: &AppState, user: &User) -> ApiResult<Vec<Offer>> {
    let records = state.offers.find_many(&user.favorite_offer_ids).await?;
    with_stats_all(state, records, &user.favorite_offer_ids).await
}

pub async fn add_favorite(
    state: &AppState,
    user: &User,
    offer_id: Uuid,
) -> ApiResult<FavoriteResponse> {
    find_offer(state, offer_id).await?;
    let record = state
        .users
        .add_favorite(user.id, offer_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    info!(user_id = %user.id, offer_id = %offer_id, "favorite added");
    Ok(FavoriteResponse {
        message: "Offer added to favorites",
        favorite_offer_ids: record.favorite_offer_ids,
    })
}

pub async fn remove_favorite(
    state: &AppState,
    user: &User,
    offer_id: Uuid,
) -> ApiResult<FavoriteResponse> {
    let record = state
        .users
        .remove_favorite(user.id, offer_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    info!(user_id = %user.id, offer_id = %offer_id, "favorite removed");
    Ok(FavoriteResponse {
        message: "Offer removed from favorites",
        favorite_offer_ids: record.favorite_offer_ids,
    })
}
