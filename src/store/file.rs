//! File-backed key-value store with optional encryption at rest.
//!
//! The whole map is written to one file on every commit:
//! `~/.config/cookiejar/cookies.json` (or `$XDG_CONFIG_HOME/cookiejar/cookies.json`)
//! unless the caller picks a path. Plain stores hold a JSON object; encrypted
//! stores hold `MAGIC || nonce || XChaCha20-Poly1305(JSON)`.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::{KeyValueStore, StoreEdit, StoreError, apply_edits};

const STORE_DIR_NAME: &str = "cookiejar";
const STORE_FILE_NAME: &str = "cookies.json";
const MAGIC: &[u8; 4] = b"CJK1";
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;

/// Durable store persisted to a single file.
pub struct FileStore {
    path: PathBuf,
    key: Option<[u8; KEY_LEN]>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens a plaintext store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_key(path.into(), None)
    }

    /// Opens a store encrypted with a key derived from `key_material`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPayload`] for a file that is not an
    /// encrypted store and [`StoreError::DecryptionFailed`] for a wrong key.
    pub fn open_encrypted(path: impl Into<PathBuf>, key_material: &str) -> Result<Self, StoreError> {
        Self::open_with_key(path.into(), Some(derive_key_bytes(key_material)))
    }

    #[instrument(level = "debug", skip(key), fields(encrypted = key.is_some()))]
    fn open_with_key(path: PathBuf, key: Option<[u8; KEY_LEN]>) -> Result<Self, StoreError> {
        let entries = if path.exists() {
            let payload = fs::read(&path)?;
            let plaintext = match &key {
                Some(key) => decrypt_bytes(&payload, key)?,
                None => payload,
            };
            serde_json::from_slice::<BTreeMap<String, String>>(&plaintext)?
        } else {
            BTreeMap::new()
        };
        debug!(entries = entries.len(), "opened cookie store");

        Ok(Self {
            path,
            key,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is encrypted at rest.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let plaintext = serde_json::to_vec(entries)?;
        let payload = match &self.key {
            Some(key) => encrypt_bytes(&plaintext, key)?,
            None => plaintext,
        };
        write_atomically(&self.path, &payload)
    }
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("encrypted", &self.is_encrypted())
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn commit(&self, edits: &[StoreEdit]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        apply_edits(&mut next, edits);
        self.write(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Returns the default store path (`~/.config/cookiejar/cookies.json`).
///
/// # Errors
///
/// Returns [`StoreError::ConfigDirUnavailable`] if no usable config dir is found.
pub fn persisted_store_path() -> Result<PathBuf, StoreError> {
    Ok(default_config_dir()?.join(STORE_FILE_NAME))
}

fn default_config_dir() -> Result<PathBuf, StoreError> {
    resolve_store_dir(
        sanitize_env_path(env::var_os("XDG_CONFIG_HOME")),
        sanitize_env_path(env::var_os("HOME")),
        sanitize_env_path(env::var_os("APPDATA")),
    )
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }

    Some(PathBuf::from(value))
}

/// Picks the store directory from XDG config home, then `HOME/.config`,
/// then `APPDATA`.
///
/// # Errors
///
/// Returns [`StoreError::ConfigDirUnavailable`] when every source is missing.
pub fn resolve_store_dir(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    app_data: Option<PathBuf>,
) -> Result<PathBuf, StoreError> {
    if let Some(xdg) = xdg_config_home {
        return Ok(xdg.join(STORE_DIR_NAME));
    }
    if let Some(home) = home {
        return Ok(home.join(".config").join(STORE_DIR_NAME));
    }
    if let Some(app_data) = app_data {
        return Ok(app_data.join(STORE_DIR_NAME));
    }

    Err(StoreError::ConfigDirUnavailable)
}

fn write_atomically(path: &Path, payload: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, payload)?;
    set_owner_only_permissions(&temp_path)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn derive_key_bytes(key_material: &str) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(key_material.as_bytes());
    let mut key = [0_u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

fn encrypt_bytes(plaintext: &[u8], key: &[u8; KEY_LEN]) -> Result<Vec<u8>, StoreError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));

    let mut nonce = [0_u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let nonce_ref = XNonce::from_slice(&nonce);

    let ciphertext = cipher
        .encrypt(nonce_ref, plaintext)
        .map_err(|_| StoreError::EncryptionFailed)?;

    let mut output = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn decrypt_bytes(payload: &[u8], key: &[u8; KEY_LEN]) -> Result<Vec<u8>, StoreError> {
    if payload.len() < MAGIC.len() + NONCE_LEN || &payload[..MAGIC.len()] != MAGIC {
        return Err(StoreError::InvalidPayload);
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let nonce_start = MAGIC.len();
    let nonce_end = nonce_start + NONCE_LEN;
    let nonce = XNonce::from_slice(&payload[nonce_start..nonce_end]);
    let ciphertext = &payload[nonce_end..];

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| StoreError::DecryptionFailed)
}
