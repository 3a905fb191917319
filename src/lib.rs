use axum::extract::{FromRef, State};
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routes;
pub mod routing_utils;

/// State shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub token_keys: auth::TokenKeys,
}

pub type AppState = State<Arc<SharedData>>;

impl FromRef<Arc<SharedData>> for auth::TokenKeys {
    fn from_ref(input: &Arc<SharedData>) -> Self {
        input.token_keys.clone()
    }
}
