use std::fmt::Debug;

use camino::{Utf8Path, Utf8PathBuf};

mod memory;
mod os;
pub mod path;

pub use memory::TestSystem;
pub use os::OsSystem;

pub type Result<T> = std::io::Result<T>;

/// The system on which modwalk runs.
///
/// Abstracting the system lets the walker and resolver run against an in-memory
/// file system in tests.
pub trait System: Debug + Sync + Send {
    /// Reads the metadata of the file or directory at `path`.
    ///
    /// This function will traverse symbolic links to query information about the destination file.
    fn path_metadata(&self, path: &Utf8Path) -> Result<Metadata>;

    /// Reads the content of the file at `path` into a [`String`].
    fn read_to_string(&self, path: &Utf8Path) -> Result<String>;

    /// Returns the current working directory
    fn current_directory(&self) -> &Utf8Path;

    /// Returns the directory path where user configurations are stored.
    ///
    /// Returns `None` if no such convention exists for the system.
    fn user_config_directory(&self) -> Option<Utf8PathBuf>;

    /// Iterate over the contents of the directory at `path`.
    ///
    /// The returned iterator must have the following properties:
    /// - It only iterates over the top level of the directory,
    ///   i.e., it does not recurse into subdirectories.
    /// - It skips the current and parent directories (`.` and `..`
    ///   respectively).
    /// - Symbolic links are followed. A link whose target cannot be read is
    ///   reported with [`FileType::Symlink`].
    /// - The iterator yields `std::io::Result<DirectoryEntry>` instances.
    ///   An `Err` variant may signify that the path of the entry was not valid UTF8,
    ///   in which case the error kind is [`std::io::ErrorKind::InvalidData`].
    ///
    /// # Errors
    /// Returns an error:
    /// - if `path` does not exist in the system,
    /// - if `path` does not point to a directory,
    /// - if the process does not have sufficient permissions to
    ///   view the contents of the directory at `path`
    fn read_directory<'a>(
        &'a self,
        path: &Utf8Path,
    ) -> Result<Box<dyn Iterator<Item = Result<DirectoryEntry>> + 'a>>;

    /// Returns `true` if `path` exists and is a directory.
    fn is_directory(&self, path: &Utf8Path) -> bool {
        self.path_metadata(path)
            .is_ok_and(|metadata| metadata.file_type().is_directory())
    }

    /// Returns `true` if `path` exists and is a file.
    fn is_file(&self, path: &Utf8Path) -> bool {
        self.path_metadata(path)
            .is_ok_and(|metadata| metadata.file_type().is_file())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Metadata {
    file_type: FileType,
}

impl Metadata {
    pub const fn new(file_type: FileType) -> Self {
        Self { file_type }
    }

    pub const fn file_type(&self) -> FileType {
        self.file_type
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum FileType {
    File,
    Directory,
    /// A link whose target could not be resolved.
    Symlink,
    /// Sockets, FIFOs, devices.
    Other,
}

impl FileType {
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    pub const fn is_symlink(self) -> bool {
        matches!(self, Self::Symlink)
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    path: Utf8PathBuf,
    file_type: FileType,
}

impl DirectoryEntry {
    pub const fn new(path: Utf8PathBuf, file_type: FileType) -> Self {
        Self { path, file_type }
    }

    pub fn into_path(self) -> Utf8PathBuf {
        self.path
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The final component of the entry's path.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

    pub const fn file_type(&self) -> FileType {
        self.file_type
    }
}
