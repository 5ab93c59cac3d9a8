//! Small filesystem helpers used by storage and plugin loading code.
pub mod fs;

use std::io;
use std::path::{Path, PathBuf};

pub fn path_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

pub fn is_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

pub fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_dir()
}

pub fn file_name<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref().file_name().map(|n| n.to_string_lossy().into_owned())
}

pub fn file_stem<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref().file_stem().map(|n| n.to_string_lossy().into_owned())
}

pub fn file_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref().extension().map(|n| n.to_string_lossy().into_owned())
}

pub fn create_dir_all<P: AsRef<Path>>(path: P) -> io::Result<()> {
    std::fs::create_dir_all(path)
}

pub fn write_string<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<()> {
    std::fs::write(path, contents)
}

pub fn remove_file<P: AsRef<Path>>(path: P) -> io::Result<()> {
    std::fs::remove_file(path)
}

pub fn remove_dir_all<P: AsRef<Path>>(path: P) -> io::Result<()> {
    std::fs::remove_dir_all(path)
}

pub fn canonicalize<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    std::fs::canonicalize(path)
}

#[cfg(test)]
mod tests;
