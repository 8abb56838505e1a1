use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::{DirectoryEntry, FileType, Metadata, Result, System};

/// A system implementation that uses the OS file system.
#[derive(Debug, Clone)]
pub struct OsSystem {
    inner: Arc<OsSystemInner>,
}

#[derive(Default, Debug)]
struct OsSystemInner {
    cwd: Utf8PathBuf,
}

impl OsSystem {
    pub fn new(cwd: impl AsRef<Utf8Path>) -> Self {
        let cwd = cwd.as_ref();
        assert!(cwd.is_absolute());

        tracing::debug!(
            "Architecture: {}, OS: {}",
            std::env::consts::ARCH,
            std::env::consts::OS,
        );

        Self {
            inner: Arc::new(OsSystemInner {
                cwd: cwd.to_path_buf(),
            }),
        }
    }
}

impl System for OsSystem {
    fn path_metadata(&self, path: &Utf8Path) -> Result<Metadata> {
        let metadata = path.as_std_path().metadata()?;

        Ok(Metadata::new(metadata.file_type().into()))
    }

    fn read_to_string(&self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path())
    }

    fn current_directory(&self) -> &Utf8Path {
        &self.inner.cwd
    }

    fn user_config_directory(&self) -> Option<Utf8PathBuf> {
        use etcetera::BaseStrategy as _;

        let strategy = etcetera::base_strategy::choose_base_strategy().ok()?;
        Utf8PathBuf::from_path_buf(strategy.config_dir()).ok()
    }

    fn read_directory<'a>(
        &'a self,
        path: &Utf8Path,
    ) -> Result<Box<dyn Iterator<Item = Result<DirectoryEntry>> + 'a>> {
        Ok(Box::new(path.read_dir_utf8()?.map(|res| {
            let res = res?;

            let mut file_type: FileType = res.file_type()?.into();

            // Follow links the way `stat` would; a dangling link stays a symlink.
            if file_type.is_symlink() {
                if let Ok(target) = res.path().as_std_path().metadata() {
                    file_type = target.file_type().into();
                }
            }

            Ok(DirectoryEntry::new(res.into_path(), file_type))
        })))
    }
}
