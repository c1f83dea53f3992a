//! Filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Resolve an ambient directory for the given path and return the directory
/// with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether a path exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}
