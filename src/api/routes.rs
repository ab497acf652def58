use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::config::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    // `{id}` is the board id for POST and the card id everywhere else.
    let card_routes = Router::new()
        .route(
            "/{id}",
            post(handlers::cards::create_card)
                .get(handlers::cards::get_card)
                .delete(handlers::cards::delete_card),
        )
        .route("/board/{board_id}", get(handlers::cards::list_board_cards))
        .route(
            "/updateContent/{id}",
            patch(handlers::cards::update_content),
        )
        .route("/reorder/{id}", patch(handlers::cards::reorder_card))
        .route("/changeColumn/{id}", patch(handlers::cards::change_column));

    let board_routes = Router::new()
        .route("/", post(handlers::boards::create_board))
        .route(
            "/{id}",
            get(handlers::boards::get_board)
                .patch(handlers::boards::update_board)
                .delete(handlers::boards::delete_board),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .nest("/cards", card_routes)
        .nest("/boards", board_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
