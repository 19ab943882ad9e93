/*
 * Responsibility
 * - middleware entry points
 * - auth: access token + ownership route layers
 * - cors / http / security_headers: Router-wide layers applied in app.rs
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
