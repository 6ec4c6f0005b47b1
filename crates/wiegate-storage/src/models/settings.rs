use crate::adapter::PersistenceAdapter;
use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use wiegate_core::constants::NS_SETTINGS;

const KEY_WIFI_SSID: &str = "wifi_ssid";
const KEY_WIFI_PASS: &str = "wifi_pass";
const KEY_MESH_CHANNEL: &str = "zb_chan";
const KEY_MESH_PAN_ID: &str = "zb_panid";

/// Maximum SSID length (IEEE 802.11).
const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length.
const MAX_PASS_LEN: usize = 64;

/// Wi-Fi station credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub pass: String,
}

impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("pass", &"<redacted>")
            .finish()
    }
}

impl WifiCredentials {
    /// Create credentials, checking length limits.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for an empty or over-long SSID or
    /// an over-long passphrase.
    pub fn new(ssid: impl Into<String>, pass: impl Into<String>) -> StorageResult<Self> {
        let creds = Self {
            ssid: ssid.into(),
            pass: pass.into(),
        };
        if creds.ssid.is_empty() || creds.ssid.len() > MAX_SSID_LEN {
            return Err(StorageError::Validation(format!(
                "SSID must be 1-{MAX_SSID_LEN} bytes"
            )));
        }
        if creds.pass.len() > MAX_PASS_LEN {
            return Err(StorageError::Validation(format!(
                "Passphrase exceeds {MAX_PASS_LEN} bytes"
            )));
        }
        Ok(creds)
    }
}

/// IEEE 802.15.4 mesh parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Radio channel (11-26).
    pub channel: u8,

    /// Personal area network identifier.
    pub pan_id: u16,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            channel: 11,
            pan_id: 0x1A62,
        }
    }
}

impl MeshSettings {
    /// Create mesh settings, checking the channel range.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for a channel outside 11-26.
    pub fn new(channel: u8, pan_id: u16) -> StorageResult<Self> {
        if !(11..=26).contains(&channel) {
            return Err(StorageError::Validation(format!(
                "Mesh channel must be 11-26, got {channel}"
            )));
        }
        Ok(Self { channel, pan_id })
    }
}

/// Device network settings persisted in the settings namespace.
///
/// Only storage is handled here; bringing the interfaces up is someone
/// else's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Wi-Fi credentials, if provisioned.
    pub wifi: Option<WifiCredentials>,

    /// Mesh parameters.
    pub mesh: MeshSettings,
}

impl NetworkSettings {
    /// Load settings from `store`; missing values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a stored value is out of range.
    pub async fn load<S: PersistenceAdapter>(store: &S) -> StorageResult<Self> {
        let ssid = store.get_str(NS_SETTINGS, KEY_WIFI_SSID).await?;
        let pass = store.get_str(NS_SETTINGS, KEY_WIFI_PASS).await?;
        let wifi = match ssid {
            Some(ssid) => Some(WifiCredentials::new(ssid, pass.unwrap_or_default())?),
            None => None,
        };

        let defaults = MeshSettings::default();
        let channel = match store.get_u32(NS_SETTINGS, KEY_MESH_CHANNEL).await? {
            Some(raw) => u8::try_from(raw).map_err(|_| {
                StorageError::Validation(format!("Stored mesh channel {raw} out of range"))
            })?,
            None => defaults.channel,
        };
        let pan_id = match store.get_u32(NS_SETTINGS, KEY_MESH_PAN_ID).await? {
            Some(raw) => u16::try_from(raw).map_err(|_| {
                StorageError::Validation(format!("Stored PAN id {raw} out of range"))
            })?,
            None => defaults.pan_id,
        };

        Ok(Self {
            wifi,
            mesh: MeshSettings::new(channel, pan_id)?,
        })
    }

    /// Persist Wi-Fi credentials and commit.
    pub async fn save_wifi<S: PersistenceAdapter>(
        store: &S,
        wifi: &WifiCredentials,
    ) -> StorageResult<()> {
        store.put_str(NS_SETTINGS, KEY_WIFI_SSID, &wifi.ssid).await?;
        store.put_str(NS_SETTINGS, KEY_WIFI_PASS, &wifi.pass).await?;
        store.commit(NS_SETTINGS).await
    }

    /// Persist mesh parameters and commit.
    pub async fn save_mesh<S: PersistenceAdapter>(
        store: &S,
        mesh: &MeshSettings,
    ) -> StorageResult<()> {
        store
            .put_u32(NS_SETTINGS, KEY_MESH_CHANNEL, u32::from(mesh.channel))
            .await?;
        store
            .put_u32(NS_SETTINGS, KEY_MESH_PAN_ID, u32::from(mesh.pan_id))
            .await?;
        store.commit(NS_SETTINGS).await
    }
}
