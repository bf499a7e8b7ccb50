use std::sync::Arc;
use sqlx::{Pool, Sqlite};
use crate::auth::TokenIssuer;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub tokens: TokenIssuer,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Arc<Config>) -> Self {
        let tokens = TokenIssuer::new(db.clone(), config.token_expiry_hours);
        Self { db, tokens, config }
    }
}
