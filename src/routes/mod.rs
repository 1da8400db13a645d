// # Routes Module
//
// - HTTP route handlers, grouped by API area.
// - Each module exposes its handlers; `server.rs` assembles the Router.
//
//  ## Available Route Modules
// - `health`: root banner, health check and the JSON 404 fallback
// - `auth`: registration, login, profile and password endpoints

/// Root, health check and fallback endpoints
pub mod health;

/// Account and session endpoints
pub mod auth;
