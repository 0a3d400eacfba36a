//! Pure view-model builders for the catalog and detail pages.
//!
//! Nothing here touches templates or I/O: `render_catalog` and `render_detail`
//! turn listings, pagination and facets into plain structs that a thin adapter
//! (the askama templates in `routes::pages`) writes out.

use crate::{
    error::RenderError,
    facets::{self, FacetField},
    filters::{FilterKey, FilterState},
    models::{CarsResponse, Color, FacetCount, Facets, FuelType, Listing},
};
use chrono::{DateTime, Utc};

pub const NO_CARS_MESSAGE: &str = "No cars found. Please try adjusting your search criteria.";
pub const NO_VALID_CARS_MESSAGE: &str = "No valid car data available. Please try again later.";

// --- Formatting helpers ---

// URL-friendly slug: lowercase, runs of whitespace become '-', other
// non-word characters are dropped, no leading/trailing/double dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }
    slug.trim_end_matches('-').to_string()
}

// "$65,000"
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if price < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

// "March 1, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() { "N/A".to_string() } else { value.to_string() }
}

// --- Pagination ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: usize,
    pub total_items: usize,
}

impl Pagination {
    // Out-of-range pages are clamped into [1, total_pages].
    pub fn new(page: u32, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let mut pagination = Self { page: page.max(1), page_size, total_items };
        pagination.page = pagination.page.min(pagination.total_pages().max(1));
        pagination
    }

    pub fn total_pages(&self) -> u32 {
        self.total_items.div_ceil(self.page_size) as u32
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page as usize - 1) * self.page_size;
        let start = start.min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub label: String,
    pub href: String,
    pub active: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub previous: PageLink,
    pub pages: Vec<PageLink>,
    pub next: PageLink,
}

// Query string for `page` of the current filters; page 1 is left implicit.
pub fn page_query(state: &FilterState, page: u32) -> String {
    let filters = state.encode();
    match (filters.is_empty(), page > 1) {
        (true, false) => String::new(),
        (true, true) => format!("page={}", page),
        (false, false) => filters,
        (false, true) => format!("{}&page={}", filters, page),
    }
}

fn page_href(state: &FilterState, page: u32) -> String {
    format!("?{}", page_query(state, page))
}

pub fn render_pagination(pagination: &Pagination, state: &FilterState) -> PaginationView {
    let current = pagination.page;
    let total = pagination.total_pages();
    let link = |page: u32, label: String, active: bool, disabled: bool| PageLink {
        page,
        label,
        href: page_href(state, page),
        active,
        disabled,
    };

    PaginationView {
        current,
        total_pages: total,
        previous: link(current.saturating_sub(1).max(1), "«".to_string(), false, current <= 1),
        pages: (1..=total).map(|p| link(p, p.to_string(), p == current, false)).collect(),
        next: link((current + 1).min(total.max(1)), "»".to_string(), false, current >= total),
    }
}

// --- Facet controls ---

// Option lists of the filter controls. Fuel types and colors are fixed by their
// enums; makes, models and seats come from the unfiltered catalog so the controls
// stay put while their counts follow the active filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetControls {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub seats: Vec<String>,
    pub colors: Vec<String>,
    pub fuel_types: Vec<String>,
}

impl FacetControls {
    pub fn from_catalog(listings: &[Listing]) -> Self {
        let values = |field| -> Vec<String> {
            facets::count(listings, field).into_iter().map(|c| c.value).collect()
        };
        let mut seats = values(FacetField::Seats);
        seats.sort_by_key(|s| s.parse::<u32>().unwrap_or(u32::MAX));
        Self {
            makes: values(FacetField::Make),
            models: values(FacetField::Model),
            seats,
            colors: Color::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            fuel_types: FuelType::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    pub count: usize,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetGroupView {
    pub key: &'static str,
    pub title: &'static str,
    pub options: Vec<FacetOption>,
}

// "name (count)" for every control value, (0) when the facet lacks it.
pub fn render_facet_labels(controls: &FacetControls, facets: &Facets, state: &FilterState) -> Vec<FacetGroupView> {
    let group = |key: FilterKey, title: &'static str, values: &[String], counts: &[FacetCount]| FacetGroupView {
        key: key.as_str(),
        title,
        options: values
            .iter()
            .map(|value| {
                let count = facets::count_for(counts, value);
                FacetOption {
                    value: value.clone(),
                    label: format!("{} ({})", value, count),
                    count,
                    checked: state.is_selected(key, value),
                }
            })
            .collect(),
    };

    vec![
        group(FilterKey::Make, "Make", &controls.makes, &facets.makes),
        group(FilterKey::Model, "Model", &controls.models, &facets.models),
        group(FilterKey::FuelType, "Fuel Type", &controls.fuel_types, &facets.fuel_types),
        group(FilterKey::Seats, "Seats", &controls.seats, &facets.seats),
        group(FilterKey::Color, "Color", &controls.colors, &facets.colors),
    ]
}

// --- Catalog page ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "alert-info",
            NoticeLevel::Warning => "alert-warning",
            NoticeLevel::Danger => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCard {
    pub id: String,
    pub href: String,
    pub image: String,
    pub title: String,
    pub heading: String,
    pub mileage: String,
    pub fuel_type: String,
    pub transmission: String,
    pub price_label: String,
}

impl ListingCard {
    // Callers only pass renderable listings, so the first image exists.
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            href: format!("/cars/{}/{}", listing.id, slugify(&listing.title)),
            image: listing.images.first().cloned().unwrap_or_default(),
            title: listing.title.clone(),
            heading: format!("{} {}", listing.full_name(), listing.year),
            mileage: or_na(&listing.mileage),
            fuel_type: listing.fuel_type.map_or("N/A".to_string(), |f| f.to_string()),
            transmission: listing.transmission.map_or("N/A".to_string(), |t| t.to_string()),
            price_label: format_price(listing.price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView {
    pub notice: Option<Notice>,
    pub cards: Vec<ListingCard>,
    pub pagination: Option<PaginationView>,
    pub facet_groups: Vec<FacetGroupView>,
    pub total_valid: usize,
}

pub fn render_catalog(
    response: &CarsResponse,
    page: u32,
    page_size: usize,
    controls: &FacetControls,
    state: &FilterState,
) -> CatalogView {
    let facet_groups = render_facet_labels(controls, &response.filters, state);

    if response.cars.is_empty() {
        tracing::debug!("No cars to display");
        return CatalogView {
            notice: Some(Notice { level: NoticeLevel::Info, message: NO_CARS_MESSAGE.to_string() }),
            cards: Vec::new(),
            pagination: None,
            facet_groups,
            total_valid: 0,
        };
    }

    // Invalid listings are dropped before any pagination math
    let valid: Vec<&Listing> = response
        .cars
        .iter()
        .filter(|car| {
            let ok = car.is_renderable();
            if !ok {
                tracing::debug!("Invalid car data: {:?}", car.id);
            }
            ok
        })
        .collect();

    if valid.is_empty() {
        return CatalogView {
            notice: Some(Notice { level: NoticeLevel::Warning, message: NO_VALID_CARS_MESSAGE.to_string() }),
            cards: Vec::new(),
            pagination: None,
            facet_groups,
            total_valid: 0,
        };
    }

    let pagination = Pagination::new(page, page_size, valid.len());
    let cards: Vec<ListingCard> = pagination.slice(&valid).iter().map(|l| ListingCard::from_listing(l)).collect();
    tracing::debug!("Rendering {} cars (page {} of {})", cards.len(), pagination.page, pagination.total_pages());

    CatalogView {
        notice: None,
        cards,
        pagination: Some(render_pagination(&pagination, state)),
        facet_groups,
        total_valid: valid.len(),
    }
}

// --- Detail page ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerView {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub page_title: String,
    pub title: String,
    pub price_label: String,
    pub listed_on: String,
    pub status: String,
    pub available: bool,
    pub images: Vec<String>,
    pub quick_facts: Vec<String>,
    pub description: String,
    pub features: Vec<String>,
    pub engine: Vec<SpecRow>,
    pub overview: Vec<SpecRow>,
    pub seller: Option<SellerView>,
    pub similar: Vec<ListingCard>,
}

pub fn render_detail(listing: &Listing, similar: &[Listing]) -> Result<DetailView, RenderError> {
    if listing.title.trim().is_empty() {
        return Err(RenderError::MalformedListing { id: listing.id.clone(), reason: "missing title" });
    }
    if !listing.is_renderable() {
        return Err(RenderError::MalformedListing { id: listing.id.clone(), reason: "no images" });
    }

    let fuel = listing.fuel_type.map_or("N/A".to_string(), |f| f.to_string());
    let transmission = listing.transmission.map_or("N/A".to_string(), |t| t.to_string());
    let seats = listing.seats.map_or("N/A".to_string(), |s| format!("{} Person", s));

    let engine: Vec<SpecRow> = listing
        .engine_details
        .as_ref()
        .map(|e| {
            [
                ("Displacement", &e.displacement),
                ("Torque", &e.torque),
                ("Horsepower", &e.horsepower),
                ("Engine Type", &e.engine_type),
            ]
            .into_iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| SpecRow { label, value: v.clone() }))
            .collect()
        })
        .unwrap_or_default();

    Ok(DetailView {
        page_title: format!("{} - AutoVault", listing.title),
        title: listing.title.clone(),
        price_label: format_price(listing.price),
        listed_on: listing.created_at.as_ref().map_or("-".to_string(), format_date),
        status: listing.status.to_string(),
        available: listing.is_available(),
        images: listing.images.clone(),
        quick_facts: vec![or_na(&listing.mileage), fuel.clone(), transmission.clone(), seats],
        description: listing.description.clone().unwrap_or_default(),
        features: listing.features.clone(),
        engine,
        overview: vec![
            SpecRow { label: "Car Type", value: format!("{} - {}", listing.make, listing.model) },
            SpecRow { label: "Mileage", value: or_na(&listing.mileage) },
            SpecRow { label: "Fuel Type", value: fuel },
            SpecRow { label: "Transmission", value: transmission },
            SpecRow { label: "Year", value: listing.year.to_string() },
        ],
        seller: listing.seller.as_ref().map(|s| SellerView {
            name: s.name.clone(),
            phone: s.phone.clone(),
            email: s.email.clone(),
            location: s.location.clone(),
        }),
        similar: similar.iter().filter(|l| l.is_renderable()).map(ListingCard::from_listing).collect(),
    })
}
