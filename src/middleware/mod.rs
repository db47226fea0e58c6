/// Middleware module
///
/// Bearer-token guard for routes that require an authenticated caller.
mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;
