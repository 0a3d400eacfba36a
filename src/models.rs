// Data structures shared by the API, the store and the page controller.
// Field names on the wire follow the original document schema (camelCase, `_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    #[serde(rename = "Plug-in Hybrid")]
    PluginHybrid,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::PluginHybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::PluginHybrid => "Plug-in Hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
    Red,
    Silver,
    Blue,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::Black, Color::White, Color::Red, Color::Silver, Color::Blue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
            Color::Red => "Red",
            Color::Silver => "Silver",
            Color::Blue => "Blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Available,
    Sold,
    Reserved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Sold => "Sold",
            Status::Reserved => "Reserved",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(FuelType, Transmission, Color, Status);

// --- Listing sub-records ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineDetails {
    #[serde(rename = "type")] // Match JSON key
    pub engine_type: Option<String>,
    pub displacement: Option<String>,
    pub horsepower: Option<String>,
    pub torque: Option<String>,
    pub cylinders: Option<u32>,
    pub engine_layout: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Seller {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
}

// --- Listing ---

// A car listing as stored and served. Most fields default when absent so that a
// malformed document still decodes; the renderer drops what it cannot show.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub price: i64, // Currency-less whole units
    #[serde(default)]
    pub mileage: String, // Display string, e.g. "1,200 Miles"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_details: Option<EngineDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    pub fn is_available(&self) -> bool {
        self.status == Status::Available
    }

    // A listing can only be shown with a title and at least one image.
    pub fn is_renderable(&self) -> bool {
        !self.title.trim().is_empty() && self.images.iter().any(|i| !i.trim().is_empty())
    }

    // Schema checks applied on create and after every patch.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("title", &self.title),
            ("make", &self.make),
            ("model", &self.model),
            ("mileage", &self.mileage),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Path `{}` is required.", field));
            }
        }
        if self.year <= 0 {
            return Err("Path `year` must be a positive number.".to_string());
        }
        if self.price < 0 {
            return Err("Path `price` must not be negative.".to_string());
        }
        if self.fuel_type.is_none() {
            return Err("Path `fuelType` is required.".to_string());
        }
        if self.transmission.is_none() {
            return Err("Path `transmission` is required.".to_string());
        }
        if self.color.is_none() {
            return Err("Path `color` is required.".to_string());
        }
        if !matches!(self.seats, Some(s) if s >= 1) {
            return Err("Path `seats` must be at least 1.".to_string());
        }
        if self.images.is_empty() || self.images.iter().any(|i| i.trim().is_empty()) {
            return Err("Path `images` requires at least one non-empty image reference.".to_string());
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err("Path `description` must not be blank.".to_string());
            }
        }
        if let Some(seller) = &self.seller {
            let seller_fields = [
                ("seller.name", &seller.name),
                ("seller.phone", &seller.phone),
                ("seller.email", &seller.email),
                ("seller.location", &seller.location),
            ];
            for (field, value) in seller_fields {
                if value.trim().is_empty() {
                    return Err(format!("Path `{}` is required.", field));
                }
            }
        }
        Ok(())
    }
}

// --- Write payloads ---

// Body of POST /api/cars. Required fields mirror the document schema.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: String,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: Color,
    pub seats: u32,
    pub images: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub engine_details: Option<EngineDetails>,
    pub seller: Seller,
    #[serde(default)]
    pub status: Option<Status>,
}

impl NewListing {
    pub fn into_listing(self, id: String, now: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            make: self.make,
            model: self.model,
            year: self.year,
            price: self.price,
            mileage: self.mileage,
            fuel_type: Some(self.fuel_type),
            transmission: Some(self.transmission),
            color: Some(self.color),
            seats: Some(self.seats),
            images: self.images,
            status: self.status.unwrap_or_default(),
            description: Some(self.description),
            features: self.features,
            engine_details: self.engine_details,
            seller: Some(self.seller),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

// Body of PATCH /api/cars/:id. Null or missing fields are left untouched.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<i64>,
    pub mileage: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub color: Option<Color>,
    pub seats: Option<u32>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub engine_details: Option<EngineDetails>,
    pub seller: Option<Seller>,
    pub status: Option<Status>,
}

impl ListingPatch {
    pub fn apply(self, listing: &mut Listing) {
        if let Some(v) = self.title {
            listing.title = v;
        }
        if let Some(v) = self.make {
            listing.make = v;
        }
        if let Some(v) = self.model {
            listing.model = v;
        }
        if let Some(v) = self.year {
            listing.year = v;
        }
        if let Some(v) = self.price {
            listing.price = v;
        }
        if let Some(v) = self.mileage {
            listing.mileage = v;
        }
        if let Some(v) = self.fuel_type {
            listing.fuel_type = Some(v);
        }
        if let Some(v) = self.transmission {
            listing.transmission = Some(v);
        }
        if let Some(v) = self.color {
            listing.color = Some(v);
        }
        if let Some(v) = self.seats {
            listing.seats = Some(v);
        }
        if let Some(v) = self.images {
            listing.images = v;
        }
        if let Some(v) = self.description {
            listing.description = Some(v);
        }
        if let Some(v) = self.features {
            listing.features = v;
        }
        if let Some(v) = self.engine_details {
            listing.engine_details = Some(v);
        }
        if let Some(v) = self.seller {
            listing.seller = Some(v);
        }
        if let Some(v) = self.status {
            listing.status = v;
        }
    }
}

// --- Facets & API envelopes ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

// Per-field facet counts over the currently filtered result set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    #[serde(default)]
    pub makes: Vec<FacetCount>,
    #[serde(default)]
    pub models: Vec<FacetCount>,
    #[serde(default)]
    pub fuel_types: Vec<FacetCount>,
    #[serde(default)]
    pub colors: Vec<FacetCount>,
    #[serde(default)]
    pub seats: Vec<FacetCount>,
}

// Response of GET /api/cars
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CarsResponse {
    #[serde(default)]
    pub cars: Vec<Listing>,
    #[serde(default)]
    pub filters: Facets,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_uses_original_wire_names() {
        let listing: Listing = serde_json::from_value(serde_json::json!({
            "_id": "3",
            "title": "Tesla Model S 2023",
            "make": "Tesla",
            "model": "Model S",
            "year": 2023,
            "price": 89900,
            "mileage": "0 Miles",
            "fuelType": "Electric",
            "transmission": "Automatic",
            "color": "Red",
            "images": ["assets/images/portfolio/05.webp"],
            "seats": 5,
            "status": "Available",
            "engineDetails": { "type": "Dual Motor", "horsepower": "670 hp" }
        }))
        .unwrap();

        assert_eq!(listing.id, "3");
        assert_eq!(listing.fuel_type, Some(FuelType::Electric));
        assert_eq!(listing.engine_details.as_ref().unwrap().engine_type.as_deref(), Some("Dual Motor"));
        assert_eq!(listing.full_name(), "Tesla Model S");

        let back = serde_json::to_value(&listing).unwrap();
        assert_eq!(back["_id"], "3");
        assert_eq!(back["fuelType"], "Electric");
        assert!(back.get("description").is_none());
    }

    #[test]
    fn plug_in_hybrid_keeps_its_label() {
        let fuel: FuelType = serde_json::from_str("\"Plug-in Hybrid\"").unwrap();
        assert_eq!(fuel, FuelType::PluginHybrid);
        assert_eq!(fuel.to_string(), "Plug-in Hybrid");
    }

    #[test]
    fn listing_without_images_is_not_renderable() {
        let listing = Listing { title: "Bare".into(), ..Default::default() };
        assert!(!listing.is_renderable());
        let listing = Listing { title: "  ".into(), images: vec!["a.webp".into()], ..Default::default() };
        assert!(!listing.is_renderable());
    }

    #[test]
    fn patch_skips_absent_fields_and_validation_catches_blanks() {
        let mut listing = crate::sample::sample_listings()[0].clone();
        let patch: ListingPatch = serde_json::from_value(serde_json::json!({
            "price": 61000,
            "title": null,
            "status": "Reserved"
        }))
        .unwrap();
        patch.apply(&mut listing);
        assert_eq!(listing.price, 61000);
        assert_eq!(listing.title, "Mercedes-Benz E-Class 2023");
        assert_eq!(listing.status, Status::Reserved);
        assert!(listing.validate().is_ok());

        listing.images.clear();
        assert!(listing.validate().unwrap_err().contains("images"));
    }
}
