use async_trait::async_trait;
use rocket::serde::json::{serde_json, Value};
use rocket::tokio::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::UpstreamError;
use crate::shadow::{ShadowDocument, ThingShadow};

/// Shadow documents kept as `<directory>/<thing_name>.json`.
pub struct FileThingShadow {
    directory: PathBuf,
}

impl FileThingShadow {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        FileThingShadow {
            directory: directory.into(),
        }
    }

    fn path(&self, thing_name: &str) -> PathBuf {
        self.directory.join(format!("{thing_name}.json"))
    }

    async fn read_value(path: &Path, thing_name: &str) -> Result<Value, UpstreamError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(UpstreamError::ShadowNotFound {
                thing_name: thing_name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Object keys from `update` replace or extend those in `target`.
fn merge(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, update) => *target = update,
    }
}

#[async_trait]
impl ThingShadow for FileThingShadow {
    async fn update_thing_shadow(
        &self,
        thing_name: &str,
        payload: &ShadowDocument,
    ) -> Result<(), UpstreamError> {
        let path = self.path(thing_name);
        let mut document = match Self::read_value(&path, thing_name).await {
            Ok(existing) => existing,
            Err(UpstreamError::ShadowNotFound { .. }) => Value::Object(Default::default()),
            Err(e) => return Err(e),
        };
        merge(&mut document, serde_json::to_value(payload)?);

        fs::create_dir_all(&self.directory).await?;
        fs::write(&path, serde_json::to_vec_pretty(&document)?).await?;
        debug!(path = %path.display(), "Shadow updated");
        Ok(())
    }

    async fn get_thing_shadow(&self, thing_name: &str) -> Result<ShadowDocument, UpstreamError> {
        let value = Self::read_value(&self.path(thing_name), thing_name).await?;
        Ok(serde_json::from_value(value)?)
    }
}
