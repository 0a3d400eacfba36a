// Query evaluation over a set of listings. Shared by the REST API and by the
// local (mock) listing source so both apply identical filter semantics.

use crate::{
    facets,
    filters::{FilterState, ListingQuery},
    models::{CarsResponse, Listing},
};

const SIMILAR_LIMIT: usize = 3;

pub fn filter(listings: Vec<Listing>, query: &ListingQuery) -> Vec<Listing> {
    listings.into_iter().filter(|l| query.matches(l)).collect()
}

// Matching listings plus facet counts over the matching set (not the whole catalog).
pub fn search(listings: Vec<Listing>, state: &FilterState) -> CarsResponse {
    let cars = filter(listings, &state.to_query());
    let filters = facets::facets_for(&cars);
    tracing::debug!(matched = cars.len(), query = %state.encode(), "Evaluated listing query");
    CarsResponse { cars, filters }
}

// Same make, priced within 20% either side, excluding the listing itself.
pub fn similar(listing: &Listing, candidates: &[Listing]) -> Vec<Listing> {
    let low = listing.price as f64 * 0.8;
    let high = listing.price as f64 * 1.2;
    candidates
        .iter()
        .filter(|c| c.id != listing.id)
        .filter(|c| c.make.eq_ignore_ascii_case(&listing.make))
        .filter(|c| (low..=high).contains(&(c.price as f64)))
        .take(SIMILAR_LIMIT)
        .cloned()
        .collect()
}

pub fn featured(listings: &[Listing], limit: usize) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| l.is_available() && l.is_renderable())
        .take(limit)
        .cloned()
        .collect()
}
