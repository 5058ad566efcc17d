use dotenvy;

use crate::geo::{MAX_GEO_CELL_DEGREES, MIN_GEO_CELL_DEGREES};
use crate::services::points_ledger::Tariff;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub db_retry_attempts: u8,
    pub jwt_secret: String,
    pub jwt_duration_hours: i64,
    pub port: u16,
    pub is_development: bool,
    pub uploads_dir: String,
    pub uploads_base_url: String,
    pub upload_file_size_max_mb: u64,
    pub tariff: Tariff,
    pub leaderboard_default_limit: u16,
    pub leaderboard_max_limit: u16,
    pub nearby_default_radius_m: f64,
    pub nearby_max_radius_m: f64,
    pub nearby_default_limit: u16,
    pub nearby_max_limit: u16,
    pub geo_cell_degrees: f64,
    pub geo_resync_secs: u64,
    pub sentry_project_link: Option<String>,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .unwrap_or_else(|_| panic!("{name} must be a valid number")),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());
        let db_retry_attempts = env_or("STORAGE_RETRY_ATTEMPTS", 5u8);

        let jwt_secret = std::env::var("JWT_SECRET").expect("Missing JWT_SECRET in env");
        let jwt_duration_hours = env_or("JWT_DURATION_HOURS", 24i64);

        let port = env_or("PORT", 8080u16);
        let is_development = std::env::var("DEVELOPMENT")
            .map(|v| v.eq("true"))
            .unwrap_or(false);

        let uploads_dir = std::env::var("UPLOADS_DIRECTORY").unwrap_or("uploads".to_string());
        let uploads_base_url = std::env::var("UPLOADS_BASE_URL").unwrap_or("/uploads".to_string());
        let upload_file_size_max_mb = env_or("UPLOAD_MAX_SIZE_MB", 15u64);

        let tariff = Tariff {
            small: env_or("TARIFF_SMALL", Tariff::default().small),
            medium: env_or("TARIFF_MEDIUM", Tariff::default().medium),
            large: env_or("TARIFF_LARGE", Tariff::default().large),
        };

        let leaderboard_default_limit = env_or("LEADERBOARD_DEFAULT_LIMIT", 50u16);
        let leaderboard_max_limit = env_or("LEADERBOARD_MAX_LIMIT", 200u16);

        let nearby_default_radius_m = env_or("NEARBY_DEFAULT_RADIUS_M", 5_000f64);
        let nearby_max_radius_m = env_or("NEARBY_MAX_RADIUS_M", 50_000f64);
        let nearby_default_limit = env_or("NEARBY_DEFAULT_LIMIT", 20u16);
        let nearby_max_limit = env_or("NEARBY_MAX_LIMIT", 100u16);
        let geo_cell_degrees = env_or("GEO_CELL_DEGREES", 0.05f64);
        let geo_resync_secs = env_or("GEO_RESYNC_SECS", 30u64);

        let sentry_project_link = std::env::var("SENTRY_PROJECT_LINK").ok();

        let config = Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            db_retry_attempts,
            jwt_secret,
            jwt_duration_hours,
            port,
            is_development,
            uploads_dir,
            uploads_base_url,
            upload_file_size_max_mb,
            tariff,
            leaderboard_default_limit,
            leaderboard_max_limit,
            nearby_default_radius_m,
            nearby_max_radius_m,
            nearby_default_limit,
            nearby_max_limit,
            geo_cell_degrees,
            geo_resync_secs,
            sentry_project_link,
        };
        if let Err(description) = config.validate() {
            panic!("invalid configuration: {description}");
        }
        config
    }

    /// Cross-checks values that are individually well formed.
    pub fn validate(&self) -> Result<(), String> {
        for (name, points) in [
            ("TARIFF_SMALL", self.tariff.small),
            ("TARIFF_MEDIUM", self.tariff.medium),
            ("TARIFF_LARGE", self.tariff.large),
        ] {
            if points == 0 {
                return Err(format!("{name} must be > 0"));
            }
        }
        for (name, default, max) in [
            ("NEARBY_DEFAULT_LIMIT", self.nearby_default_limit, self.nearby_max_limit),
            (
                "LEADERBOARD_DEFAULT_LIMIT",
                self.leaderboard_default_limit,
                self.leaderboard_max_limit,
            ),
        ] {
            if default == 0 || default > max {
                return Err(format!("{name} must be within [1, {max}]"));
            }
        }
        if !(self.nearby_max_radius_m.is_finite() && self.nearby_max_radius_m > 0.0) {
            return Err("NEARBY_MAX_RADIUS_M must be > 0".to_string());
        }
        if !(self.nearby_default_radius_m > 0.0
            && self.nearby_default_radius_m <= self.nearby_max_radius_m)
        {
            return Err(format!(
                "NEARBY_DEFAULT_RADIUS_M must be within (0, {}]",
                self.nearby_max_radius_m
            ));
        }
        if !(MIN_GEO_CELL_DEGREES..=MAX_GEO_CELL_DEGREES).contains(&self.geo_cell_degrees) {
            return Err(format!(
                "GEO_CELL_DEGREES must be within [{MIN_GEO_CELL_DEGREES}, {MAX_GEO_CELL_DEGREES}]"
            ));
        }
        Ok(())
    }
}
