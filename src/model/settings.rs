use serde::{Deserialize, Serialize};

/// Storage keys of the settings and profile scalars.
pub const PROFILE_DATA_KEY: &str = "profileData";
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";
pub const TWO_FACTOR_KEY: &str = "twoFactorEnabled";
pub const DEVICES_KEY: &str = "devices";
pub const PASSWORD_SET_KEY: &str = "passwordSet";

/// Public profile shown on the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl ProfileData {
    /// First letter of the name, upper-cased, for the avatar badge.
    pub fn initials(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

/// A device authorized to access the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub name: String,
    /// Epoch milliseconds of the last sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<i64>,
}

/// Account security settings, assembled from their individual keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub wallet_address: Option<String>,
    pub two_factor_enabled: bool,
    pub password_set: bool,
    pub devices: Vec<Device>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        SecuritySettings {
            wallet_address: None,
            two_factor_enabled: true,
            password_set: false,
            devices: Vec::new(),
        }
    }
}
