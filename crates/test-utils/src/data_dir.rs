//! Temporary data directories laid out like the data server's folder.

use std::fs;

use tempfile::TempDir;

/// Creates a temporary directory holding `files` as `(name, body)` pairs.
///
/// The directory is deleted when the returned [`TempDir`] is dropped.
pub fn write_data_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp data dir");
    for (name, body) in files {
        fs::write(dir.path().join(name), body).expect("write data file");
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_data_dir() {
        let dir = write_data_dir(&[("a.tiff", &b"abc"[..]), ("readme.txt", &b"hi"[..])]);
        assert_eq!(fs::read(dir.path().join("a.tiff")).unwrap(), b"abc");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
