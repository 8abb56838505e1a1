use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Makes `path` absolute by joining it onto `cwd`, then normalizes `.` and `..`
/// components lexically.
///
/// Symbolic links are not resolved.
pub fn absolute(path: impl AsRef<Utf8Path>, cwd: impl AsRef<Utf8Path>) -> Utf8PathBuf {
    let path = cwd.as_ref().join(path.as_ref());

    let mut components = path.components().peekable();
    let mut normalized = if let Some(c @ Utf8Component::Prefix(..)) = components.peek().copied() {
        components.next();
        Utf8PathBuf::from(c.as_str())
    } else {
        Utf8PathBuf::new()
    };

    for component in components {
        match component {
            Utf8Component::Prefix(..) => unreachable!(),
            Utf8Component::RootDir => normalized.push(component.as_str()),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                normalized.pop();
            }
            Utf8Component::Normal(name) => normalized.push(name),
        }
    }

    normalized
}
