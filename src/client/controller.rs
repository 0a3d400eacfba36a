//! Catalog page controller.
//!
//! Owns everything the catalog page mutates: filter selections, the current page,
//! the loading/error status, the price slider and the last response. UI events
//! arrive one at a time; text search and price commits go through debounce
//! timers, everything else applies immediately. Each refetch carries a ticket
//! from a [`RequestSequence`] and only the latest ticket's response is applied,
//! so a slow superseded request can never overwrite newer results.

use crate::{
    client::{
        debounce::Debounce,
        fetcher::{ListingFetcher, PageStatus},
        price_range::{Handle, PriceRange, PriceSelection, PriceSliderView},
        view::{self, CatalogView, FacetControls},
    },
    config::Settings,
    error::FetchError,
    filters::{self, FilterKey, FilterState},
    models::CarsResponse,
};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;

pub const HISTOGRAM_BARS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SearchInput(String),
    ToggleOption { key: FilterKey, value: String, checked: bool },
    PriceDragStart(Handle),
    PriceDragMove(f64),
    PriceDragEnd,
    PriceInput { handle: Handle, percent: f64 },
    GoToPage(u32),
    ClearFilters,
}

// What an event asks of the loop once it has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Nothing,
    Rerendered,
    Debounced,
    Refetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: u64,
}

impl RequestSequence {
    pub fn next(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub ticket: RequestTicket,
    pub query: String,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: RequestTicket,
    pub status: PageStatus,
    pub result: Result<CarsResponse, FetchError>,
}

pub struct CatalogController {
    fetcher: ListingFetcher,
    controls: FacetControls,
    page_size: usize,
    filters: FilterState,
    page: u32,
    status: PageStatus,
    price: PriceRange,
    sequence: RequestSequence,
    last_response: Option<CarsResponse>,
    view: Option<CatalogView>,
    search_debounce: Debounce<String>,
    price_debounce: Debounce<PriceSelection>,
}

impl CatalogController {
    // `initial_query` is the page URL's query string (filters plus `page`).
    pub fn new(fetcher: ListingFetcher, settings: &Settings, controls: FacetControls, initial_query: &str) -> Self {
        let filters = FilterState::decode(initial_query);
        let price = PriceRange::from_filters(settings, &filters);
        Self {
            fetcher,
            controls,
            page_size: settings.page_size,
            page: filters::page_from_query(initial_query),
            filters,
            status: PageStatus::default(),
            price,
            sequence: RequestSequence::default(),
            last_response: None,
            view: None,
            search_debounce: Debounce::new(settings.search_debounce()),
            price_debounce: Debounce::new(settings.price_debounce()),
        }
    }

    // --- Accessors ---

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn view(&self) -> Option<&CatalogView> {
        self.view.as_ref()
    }

    pub fn price_view(&self) -> PriceSliderView {
        self.price.view(HISTOGRAM_BARS)
    }

    pub fn fetcher(&self) -> ListingFetcher {
        self.fetcher.clone()
    }

    // URL mirror of the current state: filters, plus `page` past the first.
    pub fn query_string(&self) -> String {
        view::page_query(&self.filters, self.page)
    }

    // --- Fetching ---

    pub fn begin_request(&mut self) -> FetchRequest {
        self.status.loading = true;
        self.status.error_message = None;
        FetchRequest { ticket: self.sequence.next(), query: self.filters.encode() }
    }

    pub async fn perform(fetcher: ListingFetcher, request: FetchRequest) -> FetchOutcome {
        let mut status = PageStatus::default();
        let result = fetcher.fetch(&request.query, &mut status).await;
        FetchOutcome { ticket: request.ticket, status, result }
    }

    // Applies an outcome if it answers the latest request. Returns whether it did.
    pub fn finish_request(&mut self, outcome: FetchOutcome) -> bool {
        if !self.sequence.is_latest(outcome.ticket) {
            tracing::debug!("Discarding stale response {:?}", outcome.ticket);
            return false;
        }
        self.status = outcome.status;
        if let Ok(response) = outcome.result {
            self.last_response = Some(response);
            self.rerender();
        }
        true
    }

    pub async fn refresh(&mut self) -> bool {
        let request = self.begin_request();
        let outcome = Self::perform(self.fetcher.clone(), request).await;
        self.finish_request(outcome)
    }

    // --- Events ---

    pub fn handle(&mut self, event: UiEvent) -> Reaction {
        tracing::debug!("UI event: {:?}", event);
        match event {
            UiEvent::SearchInput(term) => {
                self.search_debounce.push(term);
                Reaction::Debounced
            }
            UiEvent::ToggleOption { key, value, checked } => {
                self.filters.toggle(key, &value, checked);
                self.page = 1;
                Reaction::Refetch
            }
            UiEvent::PriceDragStart(handle) => {
                self.price.begin_drag(handle);
                Reaction::Nothing
            }
            UiEvent::PriceDragMove(percent) => {
                self.price.drag_to(percent);
                Reaction::Rerendered
            }
            UiEvent::PriceDragEnd => match self.price.end_drag() {
                Some(selection) => {
                    self.price_debounce.push(selection);
                    Reaction::Debounced
                }
                None => Reaction::Nothing,
            },
            UiEvent::PriceInput { handle, percent } => {
                let selection = self.price.set_handle(handle, percent);
                self.price_debounce.push(selection);
                Reaction::Debounced
            }
            UiEvent::GoToPage(page) => {
                self.go_to_page(page);
                Reaction::Rerendered
            }
            UiEvent::ClearFilters => {
                self.search_debounce.cancel();
                self.price_debounce.cancel();
                self.filters = FilterState::new();
                self.price.reset();
                self.page = 1;
                Reaction::Refetch
            }
        }
    }

    pub fn apply_search(&mut self, term: String) -> Reaction {
        self.filters.set(FilterKey::Search, term);
        self.page = 1;
        Reaction::Refetch
    }

    pub fn apply_price(&mut self, selection: PriceSelection) -> Reaction {
        selection.apply(&mut self.filters);
        self.page = 1;
        Reaction::Refetch
    }

    // Client-side paging over the last response; filters are left untouched.
    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.max(1);
        self.rerender();
    }

    fn rerender(&mut self) {
        let Some(response) = &self.last_response else {
            return;
        };
        let view = view::render_catalog(response, self.page, self.page_size, &self.controls, &self.filters);
        if let Some(pagination) = &view.pagination {
            self.page = pagination.current;
        }
        self.view = Some(view);
    }

    // Drives the controller until the event channel closes and all pending
    // input and requests have settled. The initial load is issued first.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> Self {
        let mut in_flight = FuturesUnordered::new();
        in_flight.push(Self::perform(self.fetcher.clone(), self.begin_request()));
        let mut closed = false;

        loop {
            if closed && in_flight.is_empty() && !self.search_debounce.is_pending() && !self.price_debounce.is_pending() {
                break;
            }

            let reaction = tokio::select! {
                event = events.recv(), if !closed => match event {
                    Some(event) => self.handle(event),
                    None => {
                        tracing::debug!("UI event channel closed");
                        closed = true;
                        Reaction::Nothing
                    }
                },
                term = self.search_debounce.fire(), if self.search_debounce.is_pending() => self.apply_search(term),
                selection = self.price_debounce.fire(), if self.price_debounce.is_pending() => self.apply_price(selection),
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    self.finish_request(outcome);
                    Reaction::Nothing
                }
            };

            if reaction == Reaction::Refetch {
                in_flight.push(Self::perform(self.fetcher.clone(), self.begin_request()));
            }
        }
        self
    }
}
