use std::{sync::Arc, time::Duration};

use crate::{
    clients::{build_http_client, chat_relay::ChatRelay, upload::UploadClient},
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub uploads: UploadClient,
    pub chat: ChatRelay,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> anyhow::Result<Self> {
        let http = build_http_client(Duration::from_secs(config.http_timeout_secs))?;
        let uploads = UploadClient::new(http.clone(), config.upload_service_url.clone());
        let chat = ChatRelay::new(http, config.functions_url.clone());
        let orm = orm_from_pool(&pool);

        Ok(Self {
            pool,
            orm,
            config: Arc::new(config),
            uploads,
            chat,
        })
    }
}
