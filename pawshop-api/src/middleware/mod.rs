/// Middleware modules for the API server
///
/// - `session`: resolves the session cookie into a request-scoped
///   identity

pub mod session;
