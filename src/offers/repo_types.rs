use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{CreateOfferRequest, Facility, Location, Offer, UpdateOfferRequest};

/// Offer row; enum-valued columns are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct OfferRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub publish_date: OffsetDateTime,
    pub city: String,
    pub preview_image: String,
    pub photos: Vec<String>,
    pub is_premium: bool,
    pub housing_type: String,
    pub rooms: i32,
    pub guests: i32,
    pub price: i32,
    pub facilities: Vec<String>,
    pub author_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub id: Uuid,
    pub author_id: Uuid,
    pub publish_date: OffsetDateTime,
    pub request: CreateOfferRequest,
}

impl NewOffer {
    pub fn into_record(self) -> OfferRecord {
        let r = self.request;
        OfferRecord {
            id: self.id,
            title: r.title.trim().to_string(),
            description: r.description.trim().to_string(),
            publish_date: self.publish_date,
            city: r.city.as_str().to_string(),
            preview_image: r.preview_image,
            photos: r.photos,
            is_premium: r.is_premium,
            housing_type: r.housing_type.as_str().to_string(),
            rooms: r.rooms,
            guests: r.guests,
            price: r.price,
            facilities: facility_names(&r.facilities),
            author_id: self.author_id,
            latitude: r.location.latitude,
            longitude: r.location.longitude,
        }
    }
}

/// Column-level view of an `UpdateOfferRequest`.
#[derive(Debug, Clone, Default)]
pub struct OfferPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub preview_image: Option<String>,
    pub photos: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub housing_type: Option<String>,
    pub rooms: Option<i32>,
    pub guests: Option<i32>,
    pub price: Option<i32>,
    pub facilities: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<UpdateOfferRequest> for OfferPatch {
    fn from(r: UpdateOfferRequest) -> Self {
        Self {
            title: r.title.map(|t| t.trim().to_string()),
            description: r.description.map(|d| d.trim().to_string()),
            city: r.city.map(|c| c.as_str().to_string()),
            preview_image: r.preview_image,
            photos: r.photos,
            is_premium: r.is_premium,
            housing_type: r.housing_type.map(|h| h.as_str().to_string()),
            rooms: r.rooms,
            guests: r.guests,
            price: r.price,
            facilities: r.facilities.as_deref().map(facility_names),
            latitude: r.location.map(|l| l.latitude),
            longitude: r.location.map(|l| l.longitude),
        }
    }
}

impl OfferPatch {
    pub fn apply(self, record: &mut OfferRecord) {
        if let Some(v) = self.title {
            record.title = v;
        }
        if let Some(v) = self.description {
            record.description = v;
        }
        if let Some(v) = self.city {
            record.city = v;
        }
        if let Some(v) = self.preview_image {
            record.preview_image = v;
        }
        if let Some(v) = self.photos {
            record.photos = v;
        }
        if let Some(v) = self.is_premium {
            record.is_premium = v;
        }
        if let Some(v) = self.housing_type {
            record.housing_type = v;
        }
        if let Some(v) = self.rooms {
            record.rooms = v;
        }
        if let Some(v) = self.guests {
            record.guests = v;
        }
        if let Some(v) = self.price {
            record.price = v;
        }
        if let Some(v) = self.facilities {
            record.facilities = v;
        }
        if let Some(v) = self.latitude {
            record.latitude = v;
        }
        if let Some(v) = self.longitude {
            record.longitude = v;
        }
    }
}

fn facility_names(facilities: &[Facility]) -> Vec<String> {
    facilities.iter().map(|f| f.as_str().to_string()).collect()
}

/// Read-time aggregates attached to an offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfferStats {
    pub rating: f64,
    pub comments_count: usize,
    pub is_favorite: bool,
}

impl OfferRecord {
    pub fn into_offer(self, stats: OfferStats) -> anyhow::Result<Offer> {
        Ok(Offer {
            id: self.id,
            title: self.title,
            description: self.description,
            publish_date: self.publish_date,
            city: self.city.parse()?,
            preview_image: self.preview_image,
            photos: self.photos,
            is_premium: self.is_premium,
            is_favorite: stats.is_favorite,
            rating: stats.rating,
            housing_type: self.housing_type.parse()?,
            rooms: self.rooms,
            guests: self.guests,
            price: self.price,
            facilities: self
                .facilities
                .iter()
                .map(|f| f.parse())
                .collect::<anyhow::Result<Vec<Facility>>>()?,
            author_id: self.author_id,
            comments_count: stats.comments_count,
            location: Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
        })
    }
}
