use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Root directory holding the category folders of barcode images.
    pub barcode_root: String,
    /// Catalog CSV; may be absent, which yields empty indexes.
    pub catalog_path: String,
    /// Directory names the index scan never descends into.
    pub excluded_dirs: HashSet<String>,
    /// Barcode image extension, without the dot.
    pub image_extension: String,
    pub web_port: u16,
    pub log_level: String,
    /// TrueType font used when drawing label text.
    pub font_path: String,
    /// Where the sheet tool writes its PDFs.
    pub sheet_output_dir: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .build()?;

        s.try_deserialize()
    }
}
