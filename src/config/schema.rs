use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Override for the record data file path.
    pub data: Option<PathBuf>,
    pub cloudinary: Option<CloudinaryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}
