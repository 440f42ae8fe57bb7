//! Durable storage backends
//!
//! - `LocalStorage`: browser `window.localStorage` (wasm32)
//! - `FileStorage`: one file per key in a data directory (native)

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use crate::persistence::{StorageBackend, StorageError};
    use std::fs;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    /// Directory-backed storage
    ///
    /// Values are written to a temporary file and renamed into place, so a
    /// crash mid-write leaves the previous value intact.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// File holding `key`; characters outside `[A-Za-z0-9_.-]` become `_`
        pub fn path_for(&self, key: &str) -> PathBuf {
            let name: String = key
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            self.dir.join(format!("{name}.json"))
        }
    }

    fn write_and_rename(tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
        let mut file = fs::File::create(tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(tmp, path)
    }

    impl StorageBackend for FileStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            fs::create_dir_all(&self.dir)?;
            let path = self.path_for(key);
            let tmp = path.with_extension("json.tmp");
            if let Err(e) = write_and_rename(&tmp, &path, value) {
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            match fs::remove_file(self.path_for(key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::persistence::{StorageBackend, StorageError};
    use wasm_bindgen::JsValue;

    /// `window.localStorage`, scoped per origin
    #[derive(Debug, Clone)]
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        /// Open the origin's LocalStorage
        ///
        /// Fails when there is no window (workers) or storage is disabled
        /// (private mode, blocked cookies).
        pub fn open() -> Result<Self, StorageError> {
            let window = web_sys::window()
                .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
            let storage = window
                .local_storage()
                .map_err(|e| StorageError::Unavailable(js_error(&e)))?
                .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
            Ok(Self { storage })
        }
    }

    impl StorageBackend for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(key)
                .map_err(|e| StorageError::Read(js_error(&e)))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            // QuotaExceededError lands here
            self.storage
                .set_item(key, value)
                .map_err(|e| StorageError::Write(js_error(&e)))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage
                .remove_item(key)
                .map_err(|e| StorageError::Write(js_error(&e)))
        }
    }

    fn js_error(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{value:?}"))
    }
}
