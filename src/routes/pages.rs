// Server-rendered pages. Handlers gather data through the listing source, build
// view models with `client::view`, and write them into askama templates.

use askama::Template;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    catalog,
    client::{
        controller::CatalogController,
        fetcher::{ListingFetcher, PageStatus},
        price_range::PriceSliderView,
        view::{self, CatalogView, DetailView, FacetControls, ListingCard},
    },
    error::{AppError, FetchError, RenderError},
    filters::{FilterKey, FilterState},
    AppState,
};

const FEATURED_COUNT: usize = 3;

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    featured: Vec<ListingCard>,
}

#[derive(Template)]
#[template(path = "catalog.html")]
struct CatalogTemplate {
    view: CatalogView,
    status: PageStatus,
    price: PriceSliderView,
    search: String,
    min_price: String,
    max_price: String,
}

#[derive(Template)]
#[template(path = "detail.html")]
struct DetailTemplate {
    detail: Option<DetailView>,
    warning: Option<String>,
    error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    message: String,
}

// Renders a template; a failure is logged and replaced by an inline warning.
fn render_page<T: Template>(template: &T, name: &str) -> Html<String> {
    match template.render() {
        Ok(html) => Html(html),
        Err(e) => {
            let err = RenderError::Template(e.to_string());
            tracing::error!("Failed to render {} template: {}", name, err);
            Html(format!(
                "<div class=\"alert alert-warning\" role=\"alert\">{}</div>",
                err.user_message()
            ))
        }
    }
}

// Option lists for the filter controls, taken from the unfiltered catalog.
async fn facet_controls(fetcher: &ListingFetcher) -> FacetControls {
    let mut status = PageStatus::default();
    match fetcher.fetch("", &mut status).await {
        Ok(all) => FacetControls::from_catalog(&all.cars),
        Err(e) => {
            tracing::warn!("Falling back to fixed filter options: {}", e);
            FacetControls::from_catalog(&[])
        }
    }
}

// GET /
pub async fn landing_page(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[PAGE] / - Request received.");
    let listings = app_state.store.list().await?;
    let featured = catalog::featured(&listings, FEATURED_COUNT)
        .iter()
        .map(ListingCard::from_listing)
        .collect();
    Ok(render_page(&LandingTemplate { featured }, "landing"))
}

// GET /cars?<filters>&page=N
pub async fn catalog_page(
    State(app_state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let query = query.unwrap_or_default();
    tracing::info!("[PAGE] /cars - query: {:?}", query);

    let fetcher = ListingFetcher::new(app_state.source.clone());
    let controls = facet_controls(&fetcher).await;
    let mut controller = CatalogController::new(fetcher, &app_state.settings, controls, &query);
    controller.refresh().await;

    // A failed fetch still renders the page shell with the error message
    let view = match controller.view() {
        Some(view) => view.clone(),
        None => view::render_catalog(
            &Default::default(),
            1,
            app_state.settings.page_size,
            &FacetControls::default(),
            controller.filters(),
        ),
    };
    let filters: &FilterState = controller.filters();
    let scalar = |key| filters.scalar(key).unwrap_or_default().to_string();

    let template = CatalogTemplate {
        status: controller.status().clone(),
        price: controller.price_view(),
        search: scalar(FilterKey::Search),
        min_price: scalar(FilterKey::MinPrice),
        max_price: scalar(FilterKey::MaxPrice),
        view,
    };
    Ok(render_page(&template, "catalog"))
}

// GET /cars/:id
pub async fn detail_page(State(app_state): State<AppState>, Path(id): Path<String>) -> Response {
    render_detail(app_state, id).await
}

// GET /cars/:id/:slug
pub async fn detail_page_with_slug(
    State(app_state): State<AppState>,
    Path((id, _slug)): Path<(String, String)>,
) -> Response {
    render_detail(app_state, id).await
}

async fn render_detail(app_state: AppState, id: String) -> Response {
    tracing::info!("[PAGE] /cars/{} - Request received.", id);
    let fetcher = ListingFetcher::new(app_state.source.clone());
    let mut status = PageStatus::default();

    let listing = match fetcher.fetch_by_id(&id, &mut status).await {
        Ok(listing) => listing,
        Err(FetchError::NotFound) => {
            let page = render_page(&NotFoundTemplate { message: "Car not found".to_string() }, "not_found");
            return (StatusCode::NOT_FOUND, page).into_response();
        }
        Err(_) => {
            let template = DetailTemplate { detail: None, warning: None, error_message: status.error_message };
            return render_page(&template, "detail").into_response();
        }
    };

    // Similar listings are best effort
    let mut same_make = FilterState::new();
    same_make.set(FilterKey::Make, listing.make.as_str());
    let similar = match fetcher.fetch(&same_make.encode(), &mut PageStatus::default()).await {
        Ok(response) => catalog::similar(&listing, &response.cars),
        Err(e) => {
            tracing::warn!("Could not load similar listings for {}: {}", id, e);
            Vec::new()
        }
    };

    let template = match view::render_detail(&listing, &similar) {
        Ok(detail) => DetailTemplate { detail: Some(detail), warning: None, error_message: None },
        Err(e) => {
            tracing::warn!("{}", e);
            DetailTemplate { detail: None, warning: Some(e.user_message().to_string()), error_message: None }
        }
    };
    render_page(&template, "detail").into_response()
}
