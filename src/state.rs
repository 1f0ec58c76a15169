use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config, database::init_pool, llm::LlmClient, sentiment::SentimentAnalyzer,
};

pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    pub llm: LlmClient,
    pub analyzer: SentimentAnalyzer,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let pool = init_pool(&config.database_path)
            .await
            .expect("Database misconfigured!");
        let llm = LlmClient::new(&config);

        Arc::new(Self {
            config,
            pool,
            llm,
            analyzer: SentimentAnalyzer::new(),
        })
    }
}
