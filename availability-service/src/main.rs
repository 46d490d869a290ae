use availability_service::{
    api::{handler::calendar, state::AvailabilityAppState},
    domain::service::{AvailabilityConfig, AvailabilityService},
    infrastructure::{
        cache::{calendar::CachedCalendarStore, client::RedisCache},
        calendar::PgCalendarStore,
    },
};
use axum::{
    Router,
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        calendar::provision,
        calendar::destroy,
        calendar::query,
        calendar::assign_range,
        calendar::assign_dates,
        calendar::delete_range,
        calendar::check_conflicts,
        calendar::reserve,
    ),
    tags(
        (name = "Calendar", description = "Worker availability calendar"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let _guard = shared::telemetry::init_telemetry("availability-service");

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8080".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to establish connection into Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let redis_url = env::var("REDIS_URL").expect("REDIS_URL must be set");
    let cache = RedisCache::new(&redis_url)
        .await
        .expect("Failed to connect to Redis");

    let config_path =
        env::var("AVAILABILITY_CONFIG_PATH").unwrap_or_else(|_| "availability.toml".to_string());
    let config = AvailabilityConfig::load(&config_path).expect("Failed to load availability config");

    let store = Arc::new(CachedCalendarStore::new(
        Arc::new(PgCalendarStore::new(pool.clone())),
        cache,
    ));

    let state = Arc::new(AvailabilityAppState {
        availability_service: Arc::new(AvailabilityService::new(store, config)),
    });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("Failed to build governor config");

    let app = Router::new()
        .route(
            "/headpat",
            get(|| async {
                axum::Json(shared::responses::HeadpatResponse {
                    message: "nyaa~! calendar engine purring along happily! (=^-w-^=)",
                })
            }),
        )
        // Calendar lifecycle + query
        .route(
            "/api/v1/workers/{id}/calendar",
            post(calendar::provision)
                .get(calendar::query)
                .delete(calendar::destroy),
        )
        // Range + batch assignment
        .route(
            "/api/v1/workers/{id}/calendar/range",
            put(calendar::assign_range).delete(calendar::delete_range),
        )
        .route(
            "/api/v1/workers/{id}/calendar/dates",
            put(calendar::assign_dates),
        )
        // Booking pre-check and atomic reserve
        .route(
            "/api/v1/workers/{id}/calendar/conflicts",
            get(calendar::check_conflicts),
        )
        .route(
            "/api/v1/workers/{id}/calendar/reservations",
            post(calendar::reserve),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Rate limiting (per-IP, 2 req/s with burst of 10)
        .layer(GovernorLayer::new(governor_conf))
        // tracing log (turn request into info level)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .with_state(state);

    tracing::info!("availability-service listening on 0.0.0.0:{port}");

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shared::shutdown::shutdown_signal())
    .await
    .expect("Oppsie! Server crashed!");

    tracing::info!("availability-service shut down");
}
