use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Base URL of the object-storage upload service, e.g. `https://uploads.example.com`.
    pub upload_service_url: String,
    /// Base URL hosting `/functions/v1/*` serverless functions.
    pub functions_url: String,
    pub http_timeout_secs: u64,
    pub max_body_bytes: usize,
    /// Browser origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(24);
        let upload_service_url = env::var("UPLOAD_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:4000".to_string());
        let functions_url =
            env::var("FUNCTIONS_URL").unwrap_or_else(|_| "http://127.0.0.1:54321".to_string());
        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10 * 1024 * 1024);

        let cors_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            upload_service_url: upload_service_url.trim_end_matches('/').to_string(),
            functions_url: functions_url.trim_end_matches('/').to_string(),
            http_timeout_secs,
            max_body_bytes,
            cors_origins,
        })
    }
}
