use sf_entity_spawn::{
    CatalogError, ConfigError, FillSnapshot, SpawnCatalog, SpawnConfig, SpawnDefinition,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory for spawn config and catalog files.
pub const SPAWN_DIR: &str = "assets/spawn";

/// Default directory for fill-state saves.
pub const SAVES_DIR: &str = "assets/saves";

/// Error type for spawn data I/O.
#[derive(Debug)]
pub enum SpawnIoError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    Catalog(CatalogError),
    Config(ConfigError),
}

impl From<std::io::Error> for SpawnIoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for SpawnIoError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for SpawnIoError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl From<CatalogError> for SpawnIoError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<ConfigError> for SpawnIoError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl std::fmt::Display for SpawnIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::Catalog(e) => write!(f, "invalid spawn catalog: {}", e),
            Self::Config(e) => write!(f, "invalid spawn config: {}", e),
        }
    }
}

impl std::error::Error for SpawnIoError {}

/// Save the set of filled chunks to a RON file, creating parent directories.
pub fn save_fill_state(path: &Path, snapshot: &FillSnapshot) -> Result<(), SpawnIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .separate_tuple_members(false);

    let ron_string = ron::ser::to_string_pretty(snapshot, pretty_config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load a fill-state snapshot from a RON file.
pub fn load_fill_state(path: &Path) -> Result<FillSnapshot, SpawnIoError> {
    let contents = fs::read_to_string(path)?;
    let snapshot: FillSnapshot = ron::from_str(&contents)?;
    Ok(snapshot)
}

/// Load and validate a spawn config. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<SpawnConfig, SpawnIoError> {
    let contents = fs::read_to_string(path)?;
    let config: SpawnConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load a spawn catalog written as a RON list of definitions.
pub fn load_catalog(path: &Path) -> Result<SpawnCatalog, SpawnIoError> {
    let contents = fs::read_to_string(path)?;
    let definitions: Vec<SpawnDefinition> = ron::from_str(&contents)?;
    Ok(SpawnCatalog::new(definitions)?)
}

/// Path of the fill-state save for a named session.
pub fn save_path(name: &str) -> PathBuf {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    Path::new(SAVES_DIR).join(format!("{}.ron", sanitized.to_lowercase()))
}
