use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Remote open-food catalog endpoint and locale.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub country: String,
    pub language: String,
}

/// Multimodal LLM endpoint. A missing API key switches the vision
/// estimator to its deterministic stub.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
    /// Comma-separated allow-list; `None` means permissive (development).
    pub cors_origins: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ketotrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ketotrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let catalog = CatalogConfig {
            base_url: std::env::var("OFF_BASE_URL")
                .unwrap_or_else(|_| "https://world.openfoodfacts.org".into()),
            country: std::env::var("OFF_COUNTRY").unwrap_or_else(|_| "fr".into()),
            language: std::env::var("OFF_LANGUAGE").unwrap_or_else(|_| "fr".into()),
        };
        let llm = LlmConfig {
            api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".into()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.0-flash-001".into()),
        };
        let cors_origins = std::env::var("CORS_ORIGINS").ok().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        });
        Ok(Self {
            database_url,
            jwt,
            catalog,
            llm,
            cors_origins,
        })
    }
}
