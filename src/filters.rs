// Filter state held by the catalog page and its query-string encoding.
//
// The state maps a filter key to either a scalar (search, minprice, maxprice) or an
// ordered set of selected values (make, model, seats, color, fuelType). An empty
// selection is never stored: the key is removed instead.

use crate::models::Listing;
use std::collections::BTreeMap;
use url::form_urlencoded;

// Declaration order is the canonical encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Search,
    Make,
    Model,
    Seats,
    Color,
    FuelType,
    MinPrice,
    MaxPrice,
}

impl FilterKey {
    pub const ALL: [FilterKey; 8] = [
        FilterKey::Search,
        FilterKey::Make,
        FilterKey::Model,
        FilterKey::Seats,
        FilterKey::Color,
        FilterKey::FuelType,
        FilterKey::MinPrice,
        FilterKey::MaxPrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::Make => "make",
            FilterKey::Model => "model",
            FilterKey::Seats => "seats",
            FilterKey::Color => "color",
            FilterKey::FuelType => "fuelType",
            FilterKey::MinPrice => "minprice",
            FilterKey::MaxPrice => "maxprice",
        }
    }

    // `minPrice`/`maxPrice` are what the widget slider and the API route used.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "search" => Some(FilterKey::Search),
            "make" => Some(FilterKey::Make),
            "model" => Some(FilterKey::Model),
            "seats" => Some(FilterKey::Seats),
            "color" => Some(FilterKey::Color),
            "fuelType" => Some(FilterKey::FuelType),
            "minprice" | "minPrice" => Some(FilterKey::MinPrice),
            "maxprice" | "maxPrice" => Some(FilterKey::MaxPrice),
            _ => None,
        }
    }

    // Array-valued keys are comma-joined when encoded.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            FilterKey::Make | FilterKey::Model | FilterKey::Seats | FilterKey::Color | FilterKey::FuelType
        )
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FilterKey::Seats | FilterKey::MinPrice | FilterKey::MaxPrice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    Set(Vec<String>),
}

impl FilterValue {
    // Encoded form: sets are comma-joined, scalars pass through.
    pub fn joined(&self) -> String {
        match self {
            FilterValue::Scalar(s) => s.clone(),
            FilterValue::Set(values) => values.join(","),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Set(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Set(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    entries: BTreeMap<FilterKey, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    // Overwrites the key. Values are normalised to the key's kind; anything that
    // normalises to nothing (blank text, empty set, unparsable number) removes the key.
    pub fn set(&mut self, key: FilterKey, value: impl Into<FilterValue>) {
        match normalize(key, value.into()) {
            Some(value) => {
                self.entries.insert(key, value);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    pub fn clear(&mut self, key: FilterKey) {
        self.entries.remove(&key);
    }

    // Adds or removes one option of an array-valued key (checkbox / tag semantics).
    pub fn toggle(&mut self, key: FilterKey, value: &str, selected: bool) {
        let mut values: Vec<String> = self.values(key).to_vec();
        if selected {
            if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                values.push(value.to_string());
            }
        } else {
            values.retain(|v| !v.eq_ignore_ascii_case(value));
        }
        self.set(key, FilterValue::Set(values));
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.entries.get(&key)
    }

    pub fn scalar(&self, key: FilterKey) -> Option<&str> {
        match self.entries.get(&key)? {
            FilterValue::Scalar(s) => Some(s.as_str()),
            FilterValue::Set(_) => None,
        }
    }

    pub fn values(&self, key: FilterKey) -> &[String] {
        match self.entries.get(&key) {
            Some(FilterValue::Set(values)) => values,
            Some(FilterValue::Scalar(s)) => std::slice::from_ref(s),
            None => &[],
        }
    }

    pub fn is_selected(&self, key: FilterKey, value: &str) -> bool {
        self.values(key).iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    // Canonical query string (without the leading '?'): only present keys, in key order.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.iter() {
            serializer.append_pair(key.as_str(), &value.joined());
        }
        serializer.finish()
    }

    // Parses recognised keys; unknown keys are ignored and malformed numbers dropped.
    // Repeated array keys (`make=A&make=B`, as an HTML form submits them) are merged.
    pub fn decode(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut multi: BTreeMap<FilterKey, Vec<String>> = BTreeMap::new();
        let mut state = FilterState::new();

        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            let Some(key) = FilterKey::parse(&name) else {
                continue;
            };
            if key.is_multi() {
                multi.entry(key).or_default().push(value.into_owned());
            } else {
                state.set(key, value.into_owned());
            }
        }
        for (key, values) in multi {
            state.set(key, FilterValue::Set(values));
        }
        state
    }

    pub fn to_query(&self) -> ListingQuery {
        let lowered = |key: FilterKey| -> Vec<String> {
            self.values(key).iter().map(|v| v.to_lowercase()).collect()
        };
        ListingQuery {
            search: self.scalar(FilterKey::Search).map(|s| s.to_lowercase()),
            makes: lowered(FilterKey::Make),
            models: lowered(FilterKey::Model),
            seats: self
                .values(FilterKey::Seats)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            colors: lowered(FilterKey::Color),
            fuel_types: lowered(FilterKey::FuelType),
            min_price: self.scalar(FilterKey::MinPrice).and_then(|s| s.parse().ok()),
            max_price: self.scalar(FilterKey::MaxPrice).and_then(|s| s.parse().ok()),
        }
    }
}

fn normalize(key: FilterKey, value: FilterValue) -> Option<FilterValue> {
    if key.is_multi() {
        let raw = match value {
            FilterValue::Scalar(s) => vec![s],
            FilterValue::Set(values) => values,
        };
        let mut values: Vec<String> = Vec::new();
        for item in raw.iter().flat_map(|s| s.split(',')) {
            let item = item.trim();
            if item.is_empty() || (key.is_numeric() && item.parse::<u32>().is_err()) {
                continue;
            }
            if !values.iter().any(|v| v == item) {
                values.push(item.to_string());
            }
        }
        (!values.is_empty()).then_some(FilterValue::Set(values))
    } else {
        let text = value.joined();
        let text = text.trim();
        if text.is_empty() || (key.is_numeric() && text.parse::<i64>().is_err()) {
            return None;
        }
        Some(FilterValue::Scalar(text.to_string()))
    }
}

// 1-based page number from the URL; anything missing or malformed is page 1.
pub fn page_from_query(query: &str) -> u32 {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .filter(|(name, _)| name == "page")
        .filter_map(|(_, value)| value.trim().parse::<u32>().ok())
        .last()
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

// Typed constraints derived from a filter state. Text comparisons are
// case-insensitive; within one key any selected value matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub seats: Vec<u32>,
    pub colors: Vec<String>,
    pub fuel_types: Vec<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl ListingQuery {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(term) = &self.search {
            let hit = [&listing.title, &listing.make, &listing.model]
                .iter()
                .any(|field| field.to_lowercase().contains(term.as_str()));
            if !hit {
                return false;
            }
        }
        if !one_of(&self.makes, Some(listing.make.as_str())) {
            return false;
        }
        if !one_of(&self.models, Some(listing.model.as_str())) {
            return false;
        }
        if !self.seats.is_empty() && !listing.seats.is_some_and(|s| self.seats.contains(&s)) {
            return false;
        }
        if !one_of(&self.colors, listing.color.as_ref().map(|c| c.as_str())) {
            return false;
        }
        if !one_of(&self.fuel_types, listing.fuel_type.as_ref().map(|f| f.as_str())) {
            return false;
        }
        if self.min_price.is_some_and(|min| listing.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| listing.price > max) {
            return false;
        }
        true
    }
}

// An empty selection accepts everything; otherwise the field must be present and selected.
fn one_of(selected: &[String], field: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match field {
        Some(value) if !value.is_empty() => selected.iter().any(|s| *s == value.to_lowercase()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_canonical_and_skips_empty_keys() {
        let mut state = FilterState::new();
        state.set(FilterKey::MaxPrice, 70000);
        state.set(FilterKey::FuelType, vec!["Electric", "Hybrid"]);
        state.set(FilterKey::Search, "  model s ");
        state.set(FilterKey::Color, Vec::<String>::new());
        state.set(FilterKey::Make, "");

        assert_eq!(
            state.encode(),
            "search=model+s&fuelType=Electric%2CHybrid&maxprice=70000"
        );
        assert!(state.get(FilterKey::Color).is_none());
        assert!(state.get(FilterKey::Make).is_none());
    }

    #[test]
    fn last_write_wins_and_clear_removes() {
        let mut state = FilterState::new();
        state.set(FilterKey::Make, vec!["BMW"]);
        state.set(FilterKey::Make, vec!["Tesla", "Toyota"]);
        assert_eq!(state.values(FilterKey::Make), ["Tesla", "Toyota"]);

        state.clear(FilterKey::Make);
        assert!(state.is_empty());
    }

    #[test]
    fn toggling_the_last_option_off_removes_the_key() {
        let mut state = FilterState::new();
        state.toggle(FilterKey::Seats, "5", true);
        state.toggle(FilterKey::Seats, "2", true);
        state.toggle(FilterKey::Seats, "5", true);
        assert_eq!(state.values(FilterKey::Seats), ["5", "2"]);

        state.toggle(FilterKey::Seats, "5", false);
        state.toggle(FilterKey::Seats, "2", false);
        assert!(state.get(FilterKey::Seats).is_none());
    }

    #[test]
    fn toggle_matches_options_ignoring_case() {
        let mut state = FilterState::decode("make=bmw");
        assert!(state.is_selected(FilterKey::Make, "BMW"));

        state.toggle(FilterKey::Make, "BMW", true);
        assert_eq!(state.values(FilterKey::Make), ["bmw"]);

        state.toggle(FilterKey::Make, "BMW", false);
        assert!(state.get(FilterKey::Make).is_none());
        assert_eq!(state.encode(), "");
    }

    #[test]
    fn decode_ignores_unknown_keys_and_malformed_numbers() {
        let state = FilterState::decode("?utm_source=ad&minprice=abc&maxprice=70000&seats=5,x,4&page=2");
        assert!(state.get(FilterKey::MinPrice).is_none());
        assert_eq!(state.scalar(FilterKey::MaxPrice), Some("70000"));
        assert_eq!(state.values(FilterKey::Seats), ["5", "4"]);
        assert_eq!(state.iter().count(), 2);
    }

    #[test]
    fn decode_merges_repeated_keys_and_accepts_camel_case_prices() {
        let state = FilterState::decode("make=BMW&make=Tesla%2CBMW&minPrice=60000");
        assert_eq!(state.values(FilterKey::Make), ["BMW", "Tesla"]);
        assert_eq!(state.scalar(FilterKey::MinPrice), Some("60000"));
    }

    #[test]
    fn decode_of_encode_reproduces_the_state() {
        let mut state = FilterState::new();
        state.set(FilterKey::Search, "golf & co");
        state.set(FilterKey::Make, vec!["Mercedes-Benz", "Volkswagen"]);
        state.set(FilterKey::Model, "E-Class");
        state.set(FilterKey::Seats, vec!["5", "6"]);
        state.set(FilterKey::Color, vec!["Blue"]);
        state.set(FilterKey::FuelType, vec!["Plug-in Hybrid"]);
        state.set(FilterKey::MinPrice, 35000);
        state.set(FilterKey::MaxPrice, "95000");

        let decoded = FilterState::decode(&state.encode());
        assert_eq!(decoded, state);
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(page_from_query(""), 1);
        assert_eq!(page_from_query("page=0"), 1);
        assert_eq!(page_from_query("page=two"), 1);
        assert_eq!(page_from_query("?make=BMW&page=3"), 3);
    }

    #[test]
    fn query_matches_case_insensitively() {
        let listings = crate::sample::sample_listings();
        let query = FilterState::decode("make=tesla,BMW&search=SERIES").to_query();
        let hits: Vec<&str> = listings
            .iter()
            .filter(|l| query.matches(l))
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(hits, ["2"]);
    }

    #[test]
    fn listing_missing_a_filtered_field_never_matches() {
        let listing = Listing { title: "Mystery".into(), ..Default::default() };
        let query = FilterState::decode("color=Red").to_query();
        assert!(!query.matches(&listing));
        assert!(FilterState::new().to_query().matches(&listing));
    }
}
