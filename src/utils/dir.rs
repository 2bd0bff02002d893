use std::{io, path::Path};

use anyhow::Result;

/// Creates every missing parent directory of `path`. A bare file name has no parent to create.
pub fn create_parent_dirs(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    match std::fs::create_dir_all(parent) {
        Ok(_) => Ok(()),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(v) => Err(v.into()),
    }
}
