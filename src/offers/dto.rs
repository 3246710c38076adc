use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::ApiResult, validation::ValidationResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum City {
    Paris,
    Cologne,
    Brussels,
    Amsterdam,
    Hamburg,
    Dusseldorf,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Paris => "Paris",
            City::Cologne => "Cologne",
            City::Brussels => "Brussels",
            City::Amsterdam => "Amsterdam",
            City::Hamburg => "Hamburg",
            City::Dusseldorf => "Dusseldorf",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for City {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paris" => Ok(City::Paris),
            "Cologne" => Ok(City::Cologne),
            "Brussels" => Ok(City::Brussels),
            "Amsterdam" => Ok(City::Amsterdam),
            "Hamburg" => Ok(City::Hamburg),
            "Dusseldorf" => Ok(City::Dusseldorf),
            other => anyhow::bail!("unknown city {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HousingType {
    Apartment,
    House,
    Room,
    Hotel,
}

impl HousingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HousingType::Apartment => "apartment",
            HousingType::House => "house",
            HousingType::Room => "room",
            HousingType::Hotel => "hotel",
        }
    }
}

impl FromStr for HousingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" => Ok(HousingType::Apartment),
            "house" => Ok(HousingType::House),
            "room" => Ok(HousingType::Room),
            "hotel" => Ok(HousingType::Hotel),
            other => anyhow::bail!("unknown housing type {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Facility {
    Breakfast,
    #[serde(rename = "Air conditioning")]
    AirConditioning,
    #[serde(rename = "Laptop friendly workspace")]
    LaptopFriendlyWorkspace,
    #[serde(rename = "Baby seat")]
    BabySeat,
    Washer,
    Towels,
    Fridge,
}

impl Facility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facility::Breakfast => "Breakfast",
            Facility::AirConditioning => "Air conditioning",
            Facility::LaptopFriendlyWorkspace => "Laptop friendly workspace",
            Facility::BabySeat => "Baby seat",
            Facility::Washer => "Washer",
            Facility::Towels => "Towels",
            Facility::Fridge => "Fridge",
        }
    }
}

impl FromStr for Facility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Breakfast" => Ok(Facility::Breakfast),
            "Air conditioning" => Ok(Facility::AirConditioning),
            "Laptop friendly workspace" => Ok(Facility::LaptopFriendlyWorkspace),
            "Baby seat" => Ok(Facility::BabySeat),
            "Washer" => Ok(Facility::Washer),
            "Towels" => Ok(Facility::Towels),
            "Fridge" => Ok(Facility::Fridge),
            other => anyhow::bail!("unknown facility {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Offer as returned to clients; `rating`, `comments_count` and
/// `is_favorite` are computed per read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_date: OffsetDateTime,
    pub city: City,
    pub preview_image: String,
    pub photos: Vec<String>,
    pub is_premium: bool,
    pub is_favorite: bool,
    pub rating: f64,
    pub housing_type: HousingType,
    pub rooms: i32,
    pub guests: i32,
    pub price: i32,
    pub facilities: Vec<Facility>,
    pub author_id: Uuid,
    pub comments_count: usize,
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    pub title: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub housing_type: HousingType,
    pub rooms: i32,
    pub guests: i32,
    pub price: i32,
    pub facilities: Vec<Facility>,
    pub location: Location,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<City>,
    pub preview_image: Option<String>,
    pub photos: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub housing_type: Option<HousingType>,
    pub rooms: Option<i32>,
    pub guests: Option<i32>,
    pub price: Option<i32>,
    pub facilities: Option<Vec<Facility>>,
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct PremiumQuery {
    pub city: City,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub message: &'static str,
    pub favorite_offer_ids: Vec<Uuid>,
}

impl CreateOfferRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let mut v = ValidationResult::new();
        v.check_len("title", &self.title, 10..=100);
        v.check_len("description", &self.description, 20..=1024);
        if self.preview_image.trim().is_empty() {
            v.add_error("previewImage", "is required");
        }
        v.check_range("rooms", self.rooms, 1..=8);
        v.check_range("guests", self.guests, 1..=10);
        v.check_range("price", self.price, 100..=100_000);
        check_facilities(&mut v, &self.facilities);
        check_location(&mut v, &self.location);
        v.into_result()
    }
}

impl UpdateOfferRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let mut v = ValidationResult::new();
        if let Some(title) = &self.title {
            v.check_len("title", title, 10..=100);
        }
        if let Some(description) = &self.description {
            v.check_len("description", description, 20..=1024);
        }
        if matches!(&self.preview_image, Some(p) if p.trim().is_empty()) {
            v.add_error("previewImage", "must not be empty");
        }
        if let Some(rooms) = self.rooms {
            v.check_range("rooms", rooms, 1..=8);
        }
        if let Some(guests) = self.guests {
            v.check_range("guests", guests, 1..=10);
        }
        if let Some(price) = self.price {
            v.check_range("price", price, 100..=100_000);
        }
        if let Some(facilities) = &self.facilities {
            check_facilities(&mut v, facilities);
        }
        if let Some(location) = &self.location {
            check_location(&mut v, location);
        }
        v.into_result()
    }
}

fn check_facilities(v: &mut ValidationResult, facilities: &[Facility]) {
    if facilities.is_empty() {
        v.add_error("facilities", "at least one facility is required");
    }
}

fn check_location(v: &mut ValidationResult, location: &Location) {
    v.check_range("location.latitude", location.latitude, -90.0..=90.0);
    v.check_range("location.longitude", location.longitude, -180.0..=180.0);
}
