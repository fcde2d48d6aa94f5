#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub schedule_api_url: String,
    pub default_year: i32,
}

impl Config {
    pub fn init() -> Self {
        Config {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            schedule_api_url: std::env::var("SCHEDULE_API_URL").unwrap_or_else(|_| {
                "https://raw.githubusercontent.com/theOehrly/f1schedule/master".to_string()
            }),
            default_year: std::env::var("DEFAULT_YEAR")
                .ok()
                .and_then(|year| year.parse().ok())
                .unwrap_or(2025),
        }
    }
}
