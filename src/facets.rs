// Facet counting: occurrences of each distinct field value within a result set.

use crate::models::{FacetCount, Facets, Listing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetField {
    Make,
    Model,
    FuelType,
    Color,
    Seats,
}

impl FacetField {
    // String form of the field, or None when the listing does not carry it.
    fn value_of(&self, listing: &Listing) -> Option<String> {
        match self {
            FacetField::Make => non_empty(&listing.make),
            FacetField::Model => non_empty(&listing.model),
            FacetField::FuelType => listing.fuel_type.map(|f| f.as_str().to_string()),
            FacetField::Color => listing.color.map(|c| c.as_str().to_string()),
            FacetField::Seats => listing.seats.map(|s| s.to_string()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Counts per distinct value, in order of first occurrence. Listings missing the
// field are skipped rather than counted under an "unknown" bucket.
pub fn count(items: &[Listing], field: FacetField) -> Vec<FacetCount> {
    let mut counts: Vec<FacetCount> = Vec::new();
    for value in items.iter().filter_map(|item| field.value_of(item)) {
        match counts.iter_mut().find(|c| c.value == value) {
            Some(existing) => existing.count += 1,
            None => counts.push(FacetCount { value, count: 1 }),
        }
    }
    counts
}

pub fn facets_for(items: &[Listing]) -> Facets {
    Facets {
        makes: count(items, FacetField::Make),
        models: count(items, FacetField::Model),
        fuel_types: count(items, FacetField::FuelType),
        colors: count(items, FacetField::Color),
        seats: count(items, FacetField::Seats),
    }
}

// Case-insensitive lookup used when annotating filter controls; absent means zero.
pub fn count_for(counts: &[FacetCount], value: &str) -> usize {
    counts
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(value))
        .map_or(0, |c| c.count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;
    use crate::sample::sample_listings;

    #[test]
    fn counts_sum_to_items_carrying_the_field() {
        let mut items = sample_listings();
        items.push(Listing { title: "No fuel".into(), make: "Tesla".into(), ..Default::default() });
        items.push(Listing { title: "Also Tesla".into(), make: "tesla ".into(), fuel_type: Some(FuelType::Electric), ..Default::default() });

        let fuel = count(&items, FacetField::FuelType);
        let with_fuel = items.iter().filter(|l| l.fuel_type.is_some()).count();
        assert_eq!(fuel.iter().map(|c| c.count).sum::<usize>(), with_fuel);
        assert_eq!(count_for(&fuel, "electric"), 2);

        let makes = count(&items, FacetField::Make);
        assert_eq!(makes.iter().map(|c| c.count).sum::<usize>(), items.len());
    }

    #[test]
    fn missing_fields_are_excluded_not_bucketed() {
        let items = vec![
            Listing { title: "a".into(), seats: Some(5), ..Default::default() },
            Listing { title: "b".into(), ..Default::default() },
            Listing { title: "c".into(), seats: Some(5), ..Default::default() },
        ];
        assert_eq!(count(&items, FacetField::Seats), vec![FacetCount { value: "5".into(), count: 2 }]);
        assert!(count(&items, FacetField::Make).is_empty());
    }

    #[test]
    fn order_follows_first_occurrence() {
        let facets = facets_for(&sample_listings());
        let seats: Vec<&str> = facets.seats.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(seats, ["2", "4", "5", "6"]);
        assert_eq!(count_for(&facets.seats, "5"), 2);
        assert_eq!(count_for(&facets.colors, "Green"), 0);
    }
}
