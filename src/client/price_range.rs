// Dual-handle price slider. Handles live in percent space [0, 100] and are
// mapped linearly onto [floor, ceiling]; they stay at least `gap` percent apart.
// Dragging only moves the handles, the selection is committed on release.

use crate::{
    client::view::format_price,
    config::Settings,
    filters::{FilterKey, FilterState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Handle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSelection {
    pub min_price: i64,
    pub max_price: i64,
}

impl PriceSelection {
    pub fn apply(&self, state: &mut FilterState) {
        state.set(FilterKey::MinPrice, self.min_price);
        state.set(FilterKey::MaxPrice, self.max_price);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSliderView {
    pub min_percent: f64,
    pub max_percent: f64,
    pub min_label: String,
    pub max_label: String,
    pub bars: Vec<bool>,
}

impl PriceSliderView {
    // CSS `right` offset of the highlighted range
    pub fn right_offset(&self) -> f64 {
        100.0 - self.max_percent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRange {
    floor: i64,
    ceiling: i64,
    gap: f64,
    min_pct: f64,
    max_pct: f64,
    drag: DragState,
}

impl PriceRange {
    pub fn new(floor: i64, ceiling: i64, gap: f64) -> Self {
        Self { floor, ceiling, gap: gap.clamp(0.0, 100.0), min_pct: 0.0, max_pct: 100.0, drag: DragState::Idle }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.price_floor, settings.price_ceiling, settings.price_gap_percent)
    }

    // Positions the handles from `minprice`/`maxprice` of the URL; both must be
    // present, otherwise the full range is selected.
    pub fn with_prices(mut self, min_price: Option<i64>, max_price: Option<i64>) -> Self {
        if let (Some(min), Some(max)) = (min_price, max_price) {
            self.max_pct = self.price_to_percent(max).clamp(self.gap, 100.0);
            self.min_pct = self.price_to_percent(min).clamp(0.0, self.max_pct - self.gap);
        }
        self
    }

    pub fn reset(&mut self) {
        self.min_pct = 0.0;
        self.max_pct = 100.0;
        self.drag = DragState::Idle;
    }

    pub fn from_filters(settings: &Settings, state: &FilterState) -> Self {
        let price = |key| state.scalar(key).and_then(|s| s.parse::<i64>().ok());
        Self::from_settings(settings).with_prices(price(FilterKey::MinPrice), price(FilterKey::MaxPrice))
    }

    pub fn percent_to_price(&self, percent: f64) -> i64 {
        ((percent / 100.0) * (self.ceiling - self.floor) as f64 + self.floor as f64).round() as i64
    }

    // Prices outside the slider domain pin to its ends.
    pub fn price_to_percent(&self, price: i64) -> f64 {
        let span = self.ceiling.saturating_sub(self.floor);
        if span <= 0 {
            return 0.0;
        }
        let offset = price.clamp(self.floor, self.ceiling) - self.floor;
        offset as f64 / span as f64 * 100.0
    }

    pub fn min_percent(&self) -> f64 {
        self.min_pct
    }

    pub fn max_percent(&self) -> f64 {
        self.max_pct
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn selection(&self) -> PriceSelection {
        PriceSelection { min_price: self.percent_to_price(self.min_pct), max_price: self.percent_to_price(self.max_pct) }
    }

    // --- State machine ---

    pub fn begin_drag(&mut self, handle: Handle) {
        self.drag = DragState::Dragging(handle);
    }

    // Moves the grabbed handle; ignored while idle. Never commits.
    pub fn drag_to(&mut self, percent: f64) {
        if let DragState::Dragging(handle) = self.drag {
            self.place(handle, percent);
        }
    }

    // Releases the handle and yields the selection to commit, if a drag was active.
    pub fn end_drag(&mut self) -> Option<PriceSelection> {
        match std::mem::take(&mut self.drag) {
            DragState::Dragging(_) => Some(self.selection()),
            DragState::Idle => None,
        }
    }

    // Discrete change (keyboard or range input); commits immediately.
    pub fn set_handle(&mut self, handle: Handle, percent: f64) -> PriceSelection {
        self.place(handle, percent);
        self.selection()
    }

    // The moving handle is clamped so it stops `gap` short of the other one.
    fn place(&mut self, handle: Handle, percent: f64) {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { return };
        match handle {
            Handle::Min => self.min_pct = percent.min(self.max_pct - self.gap).max(0.0),
            Handle::Max => self.max_pct = percent.max(self.min_pct + self.gap).min(100.0),
        }
    }

    // --- Display ---

    // Bars evenly spread over [0, 100]; a bar is active inside the selection.
    pub fn histogram(&self, bars: usize) -> Vec<bool> {
        match bars {
            0 => Vec::new(),
            1 => vec![true],
            n => (0..n)
                .map(|i| {
                    let position = i as f64 / (n - 1) as f64 * 100.0;
                    position >= self.min_pct && position <= self.max_pct
                })
                .collect(),
        }
    }

    pub fn view(&self, bars: usize) -> PriceSliderView {
        let selection = self.selection();
        PriceSliderView {
            min_percent: self.min_pct,
            max_percent: self.max_pct,
            min_label: format_price(selection.min_price),
            max_label: format_price(selection.max_price),
            bars: self.histogram(bars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider() -> PriceRange {
        PriceRange::new(35_000, 95_000, 10.0)
    }

    #[test]
    fn min_handle_stops_a_gap_short_of_max() {
        let mut range = slider();
        assert_eq!(range.set_handle(Handle::Min, 95.0).min_price, 89_000);
        assert_eq!(range.min_percent(), 90.0);
        assert_eq!(range.max_percent(), 100.0);

        range.set_handle(Handle::Max, 10.0);
        assert_eq!(range.max_percent(), 100.0);
    }

    #[test]
    fn handles_never_cross_while_dragging() {
        let mut range = slider();
        range.begin_drag(Handle::Max);
        for percent in [80.0, 40.0, -20.0, 5.0] {
            range.drag_to(percent);
            assert!(range.min_percent() <= range.max_percent() - 10.0);
        }
        assert_eq!(range.max_percent(), 10.0);
        assert_eq!(range.min_percent(), 0.0);
    }

    #[test]
    fn drag_commits_only_on_release() {
        let mut range = slider();
        range.drag_to(50.0);
        assert_eq!(range.max_percent(), 100.0); // idle, nothing moves

        range.begin_drag(Handle::Min);
        range.drag_to(50.0);
        assert_eq!(range.drag_state(), DragState::Dragging(Handle::Min));
        let selection = range.end_drag().unwrap();
        assert_eq!(selection, PriceSelection { min_price: 65_000, max_price: 95_000 });
        assert_eq!(range.end_drag(), None);
    }

    #[test]
    fn url_prices_position_the_handles() {
        let mut state = FilterState::decode("minprice=65000&maxprice=80000");
        let range = PriceRange::from_filters(&Settings::default(), &state);
        assert_eq!(range.min_percent(), 50.0);
        assert_eq!(range.max_percent(), 75.0);

        state.clear(FilterKey::MaxPrice);
        let range = PriceRange::from_filters(&Settings::default(), &state);
        assert_eq!((range.min_percent(), range.max_percent()), (0.0, 100.0));
    }

    #[test]
    fn extreme_url_prices_pin_to_the_slider_ends() {
        let state = FilterState::decode("minprice=-9223372036854775800&maxprice=9223372036854775800");
        let range = PriceRange::from_filters(&Settings::default(), &state);
        assert_eq!((range.min_percent(), range.max_percent()), (0.0, 100.0));

        let range = slider().with_prices(Some(i64::MIN), Some(70_000));
        assert_eq!(range.min_percent(), 0.0);
        assert_eq!(range.selection().max_price, 70_000);
    }

    #[test]
    fn selection_is_written_to_filter_state() {
        let mut state = FilterState::decode("make=BMW");
        PriceSelection { min_price: 40_000, max_price: 70_000 }.apply(&mut state);
        assert_eq!(state.encode(), "make=BMW&minprice=40000&maxprice=70000");
    }

    #[test]
    fn histogram_and_labels_follow_the_handles() {
        let range = slider().with_prices(Some(35_000), Some(65_000));
        let view = range.view(5);
        assert_eq!(view.bars, [true, true, true, false, false]);
        assert_eq!(view.min_label, "$35,000");
        assert_eq!(view.max_label, "$65,000");
    }
}
