use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Identity of the vendor the bulk batch is created for. Every payload sent
/// to the bulk-create endpoint carries `vendor_id` and `id_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorProfile {
    pub vendor_id: String,
    /// Vendor registration number issued by the storefront.
    pub id_number: String,
    pub display_name: Option<String>,
}

/// Load and validate the vendor profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendor_profile(path: &Path) -> Result<VendorProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VendorFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_vendor_profile(&content)
}

fn parse_vendor_profile(content: &str) -> Result<VendorProfile, ConfigError> {
    let profile: VendorProfile = serde_yaml::from_str(content)?;
    validate_vendor_profile(&profile)?;
    Ok(profile)
}

fn validate_vendor_profile(profile: &VendorProfile) -> Result<(), ConfigError> {
    if profile.vendor_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "vendor_id must be non-empty".to_string(),
        ));
    }

    if profile.id_number.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "vendor '{}' has an empty id_number",
            profile.vendor_id
        )));
    }

    Ok(())
}
