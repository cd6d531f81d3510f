/// Middleware modules for the API server
///
/// Session authentication lives in `app` because it needs `AppState`.

pub mod security;
