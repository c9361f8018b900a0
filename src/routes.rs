// routes.rs - route table for the three handler tiers

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Multipart framing on top of the largest accepted image.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let body_limit = state.images.max_bytes() + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(state.images.root());
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(elevated_routes(state.clone()))
        .nest_service("/uploads", uploads)
        .fallback(public::meta::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{animals, auth, contact, meta};

    Router::new()
        .route("/", get(meta::root))
        .route("/health", get(meta::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/animales", get(animals::list))
        .route("/api/animales/stats", get(animals::stats))
        .route("/api/animales/:id", get(animals::show))
        .route("/api/contacto", post(contact::create))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{account, adoptions, donations, requests, users};

    Router::new()
        .route("/api/auth/profile", get(account::profile_get).put(account::profile_put))
        .route("/api/auth/change-password", put(account::change_password))
        .route("/api/usuarios/:id", get(users::show))
        .route("/api/solicitudes", post(requests::create))
        .route("/api/solicitudes/mis-solicitudes", get(requests::mine))
        .route("/api/solicitudes/:id", get(requests::show).delete(requests::cancel))
        .route("/api/adopciones/mis-adopciones", get(adoptions::mine))
        .route("/api/donaciones", post(donations::create))
        .route("/api/donaciones/mis-donaciones", get(donations::mine))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::{adoptions, animals, contact, donations, requests, users};

    Router::new()
        .route("/api/animales", post(animals::create))
        .route("/api/animales/:id", put(animals::update).delete(animals::delete))
        .route("/api/animales/:id/status", patch(animals::set_status))
        .route("/api/animales/:id/fotos", post(animals::add_photo))
        .route("/api/animales/fotos/:id_foto", delete(animals::delete_photo))
        .route("/api/usuarios", get(users::list))
        .route("/api/usuarios/:id", delete(users::delete))
        .route("/api/usuarios/:id/status", patch(users::set_status))
        .route("/api/solicitudes", get(requests::list))
        .route("/api/solicitudes/:id/status", patch(requests::review))
        .route("/api/adopciones", get(adoptions::list).post(adoptions::create))
        .route("/api/donaciones", get(donations::list))
        .route("/api/contacto", get(contact::list))
        .route("/api/contacto/:id/leido", patch(contact::mark_read))
        // Outermost layer runs first: authenticate, then check the role
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth))
}

/// `*` allows any origin; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
