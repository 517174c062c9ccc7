use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub viacep_base_url: String,
    pub fonts_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            viacep_base_url: std::env::var("VIACEP_BASE_URL")
                .unwrap_or_else(|_| "https://viacep.com.br".to_string())
                .trim_end_matches('/')
                .to_string(),
            fonts_dir: std::env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
        };

        if !config.viacep_base_url.starts_with("http://")
            && !config.viacep_base_url.starts_with("https://")
        {
            anyhow::bail!("VIACEP_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("ViaCEP Base URL: {}", config.viacep_base_url);
        tracing::debug!("Fonts dir: {}", config.fonts_dir);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
