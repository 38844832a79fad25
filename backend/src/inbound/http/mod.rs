//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod auth;
pub mod beers;
pub mod consistency;
pub mod error;
pub mod health;
pub mod pubs;
pub mod responses;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config());
    users::configure(cfg);
    beers::configure(cfg);
    pubs::configure(cfg);
}
