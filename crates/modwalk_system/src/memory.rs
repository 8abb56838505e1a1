use std::collections::{BTreeMap, BTreeSet};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use crate::{DirectoryEntry, FileType, Metadata, Result, System};

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Directory,
    /// An entry that is neither a file nor a directory, e.g. a dangling link.
    Special(FileType),
}

/// An in-memory file system.
///
/// Parent directories are created implicitly. Directories can be marked unreadable
/// to exercise listing failures.
#[derive(Debug, Clone)]
pub struct TestSystem {
    cwd: Utf8PathBuf,
    nodes: BTreeMap<Utf8PathBuf, Node>,
    unreadable: BTreeSet<Utf8PathBuf>,
    user_config_directory: Option<Utf8PathBuf>,
}

impl TestSystem {
    pub fn new(cwd: impl Into<Utf8PathBuf>) -> Self {
        let cwd = cwd.into();
        let mut system = Self {
            cwd: cwd.clone(),
            nodes: BTreeMap::new(),
            unreadable: BTreeSet::new(),
            user_config_directory: None,
        };
        system.create_directory_all(&cwd);
        system
    }

    fn absolute(&self, path: &Utf8Path) -> Utf8PathBuf {
        crate::path::absolute(path, &self.cwd)
    }

    pub fn create_directory_all(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        let path = self.absolute(path.as_ref());
        for ancestor in path.ancestors() {
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Directory);
        }
        self
    }

    pub fn write_file(&mut self, path: impl AsRef<Utf8Path>, content: &str) -> &mut Self {
        let path = self.absolute(path.as_ref());
        if let Some(parent) = path.parent() {
            self.create_directory_all(parent.to_path_buf());
        }
        self.nodes.insert(path, Node::File(content.to_string()));
        self
    }

    pub fn write_files<'a>(
        &mut self,
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        for (path, content) in files {
            self.write_file(path, content);
        }
        self
    }

    /// Adds an entry that is neither a file nor a directory.
    pub fn create_special(&mut self, path: impl AsRef<Utf8Path>, file_type: FileType) -> &mut Self {
        let path = self.absolute(path.as_ref());
        if let Some(parent) = path.parent() {
            self.create_directory_all(parent.to_path_buf());
        }
        self.nodes.insert(path, Node::Special(file_type));
        self
    }

    /// Makes listing `path` fail with a permission error.
    pub fn deny_listing(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        let path = self.absolute(path.as_ref());
        self.unreadable.insert(path);
        self
    }

    pub fn set_user_config_directory(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.user_config_directory = Some(path.into());
        self
    }

    fn node(&self, path: &Utf8Path) -> Result<&Node> {
        self.nodes
            .get(&self.absolute(path))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("`{path}` not found")))
    }
}

impl System for TestSystem {
    fn path_metadata(&self, path: &Utf8Path) -> Result<Metadata> {
        let file_type = match self.node(path)? {
            Node::File(_) => FileType::File,
            Node::Directory => FileType::Directory,
            Node::Special(file_type) => *file_type,
        };
        Ok(Metadata::new(file_type))
    }

    fn read_to_string(&self, path: &Utf8Path) -> Result<String> {
        match self.node(path)? {
            Node::File(content) => Ok(content.clone()),
            Node::Directory => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("`{path}` is a directory"),
            )),
            Node::Special(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{path}` is not a regular file"),
            )),
        }
    }

    fn current_directory(&self) -> &Utf8Path {
        &self.cwd
    }

    fn user_config_directory(&self) -> Option<Utf8PathBuf> {
        self.user_config_directory.clone()
    }

    fn read_directory<'a>(
        &'a self,
        path: &Utf8Path,
    ) -> Result<Box<dyn Iterator<Item = Result<DirectoryEntry>> + 'a>> {
        let directory = self.absolute(path);

        if !matches!(self.node(&directory)?, Node::Directory) {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("`{path}` is not a directory"),
            ));
        }

        if self.unreadable.contains(&directory) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("`{path}` cannot be read"),
            ));
        }

        Ok(Box::new(
            self.nodes
                .iter()
                .filter(move |(entry, _)| entry.parent() == Some(directory.as_path()))
                .map(|(entry, node)| {
                    let file_type = match node {
                        Node::File(_) => FileType::File,
                        Node::Directory => FileType::Directory,
                        Node::Special(file_type) => *file_type,
                    };
                    Ok(DirectoryEntry::new(entry.clone(), file_type))
                }),
        ))
    }
}
