//! Application constants for the data store engine
//!
//! Field names, default values, file layout names and registry names used
//! throughout the crate.

// =============================================================================
// File Layout
// =============================================================================

/// Directory created under the user data directory
pub const APP_DIR_NAME: &str = "lca-datastore";

/// Environment variable overriding the data directory
pub const ENV_DATA_DIR: &str = "LCA_DATASTORE_DIR";

/// Environment variable silencing registration warnings
pub const ENV_DONT_WARN: &str = "LCA_DATASTORE_DONT_WARN";

pub const INTERMEDIATE_EXTENSION: &str = "json";
pub const PROCESSED_EXTENSION: &str = "parquet";

pub const MAPPING_FILE: &str = "mapping.json";
pub const GEOMAPPING_FILE: &str = "geomapping.json";
pub const PREFERENCES_FILE: &str = "preferences.json";

// =============================================================================
// Registries
// =============================================================================

pub mod registries {
    pub const DATABASES: &str = "databases";
    pub const METHODS: &str = "methods";
    pub const WEIGHTINGS: &str = "weightings";
    pub const NORMALIZATIONS: &str = "normalizations";

    /// All registries, in the order the reprocessing update walks them
    pub const ALL: &[&str] = &[METHODS, WEIGHTINGS, NORMALIZATIONS, DATABASES];
}

// =============================================================================
// Uncertainty Fields
// =============================================================================

/// Keys read from a normalized uncertainty record
pub mod uncertainty_keys {
    pub const UNCERTAINTY_TYPE: &str = "uncertainty type";
    /// Underscored spelling accepted as a fallback
    pub const UNCERTAINTY_TYPE_ALT: &str = "uncertainty_type";
    pub const AMOUNT: &str = "amount";
    pub const LOC: &str = "loc";
    pub const SCALE: &str = "scale";
    pub const SHAPE: &str = "shape";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
}

/// Column names of the uncertainty suffix shared by every processed array
pub mod uncertainty_columns {
    pub const UNCERTAINTY_TYPE: &str = "uncertainty_type";
    pub const AMOUNT: &str = "amount";
    pub const LOC: &str = "loc";
    pub const SCALE: &str = "scale";
    pub const SHAPE: &str = "shape";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const NEGATIVE: &str = "negative";
}

// =============================================================================
// Store Kind Defaults
// =============================================================================

/// Placeholder for matrix indices assigned after processing
pub const MAX_INDEX: u32 = u32::MAX;

/// Location used when a characterization factor has none
pub const GLOBAL_LOCATION: &str = "GLO";

/// Exchange type codes written to the `type` column of inventory arrays
pub mod exchange_types {
    pub const PRODUCTION: u8 = 0;
    pub const TECHNOSPHERE: u8 = 1;
    pub const BIOSPHERE: u8 = 2;
    pub const SUBSTITUTION: u8 = 3;

    /// Map an exchange type name to its code
    pub fn code(name: &str) -> Option<u8> {
        match name {
            "production" => Some(PRODUCTION),
            "technosphere" => Some(TECHNOSPHERE),
            "biosphere" => Some(BIOSPHERE),
            "substitution" => Some(SUBSTITUTION),
            _ => None,
        }
    }
}

// =============================================================================
// Updates
// =============================================================================

/// Preferences key holding the map of applied updates
pub const UPDATES_PREFERENCE_KEY: &str = "updates";

pub const UPTODATE_WARNING: &str = "Your data needs to be updated. Please run `lca-datastore update --all`.";
