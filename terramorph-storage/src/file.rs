//! Default on-disk [`StateStore`]: one pretty-printed JSON file per logical
//! ID under a base directory (`$HOME/.terramorph` by default).

use crate::error::Error;
use crate::store::StateStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use terramorph_core::{HandlerState, LogicalId};

#[derive(Debug, Clone)]
pub struct FileStateStore {
    base_dir: PathBuf,
}

impl FileStateStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `$HOME/.terramorph`, the layout spec §6 describes.
    pub fn default_location() -> Result<Self, Error> {
        let home = home::home_dir().ok_or(Error::NoHomeDirectory)?;
        Ok(Self::new(home.join(".terramorph")))
    }

    fn path_for(&self, logical_id: &LogicalId) -> PathBuf {
        self.base_dir.join(format!("{}.json", logical_id.as_str()))
    }

    async fn ensure_base_dir(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|source| Error::CreateDir {
                path: self.base_dir.clone(),
                source,
            })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read(&self, logical_id: &LogicalId) -> Result<Option<HandlerState>, Error> {
        let path = self.path_for(logical_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::Read { path, source }),
        };
        let state = serde_json::from_slice(&bytes).map_err(|source| Error::Deserialize { path, source })?;
        Ok(Some(state))
    }

    async fn write(&self, logical_id: &LogicalId, state: &HandlerState) -> Result<(), Error> {
        self.ensure_base_dir().await?;
        let path = self.path_for(logical_id);
        let tmp_path = tmp_path_for(&path);
        let body = serde_json::to_vec_pretty(state).map_err(|source| Error::Serialize {
            logical_id: logical_id.to_string(),
            source,
        })?;
        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|source| Error::Write { path: tmp_path.clone(), source })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| Error::Rename {
                from: tmp_path,
                to: path,
                source,
            })?;
        tracing::debug!(logical_id = %logical_id, "wrote state");
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
