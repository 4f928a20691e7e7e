use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "ripple";
static RIPPLE_DB_NAME: &str = "ripple_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// For now this directory structure should be like
// data_dir_path
// |- ripple
//    |- ripple_db.sqlite
//    |- config.json

#[derive(Serialize, Deserialize, Debug)]
pub struct RippleConfig {
    pub(crate) database_path: PathBuf,
}

impl RippleConfig {
    /// Creates a new RippleConfig rooted at the specified data directory
    fn new(data_dir: PathBuf) -> Self {
        let database_path = data_dir.join(RIPPLE_DB_NAME);

        RippleConfig { database_path }
    }
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<RippleConfig, Box<dyn std::error::Error>> {
    let data_dir = dirs::data_dir().expect("failed to find a data directory on this platform");

    let ripple_dir = data_dir.join(DATA_DIR_NAME);
    let config_path = ripple_dir.join(CONFIG_FILE_NAME);

    // Create the ripple directory if it doesn't exist
    fs::create_dir_all(&ripple_dir).await?;

    // Check if config file exists
    if config_path.exists() {
        // Read and deserialize existing config
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: RippleConfig = serde_json::from_str(&contents)?;
        Ok(config)
    } else {
        // Create new config
        let config = RippleConfig::new(ripple_dir.clone());

        // Serialize and write to file
        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        Ok(config)
    }
}
