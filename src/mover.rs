use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("source file does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("source is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("destination folder does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),
    #[error("destination already contains {}", .0.display())]
    DestinationOccupied(PathBuf),
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Moves `source` into `dest_dir` under its own file name and returns the new
/// path. An existing file of the same name at the destination is never
/// replaced, even one that appears while the move is under way.
pub fn move_into(source: &Path, dest_dir: &Path) -> Result<PathBuf, MoveError> {
    let metadata = match fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(MoveError::SourceMissing(source.to_path_buf()))
        }
        Err(err) => {
            return Err(MoveError::Io {
                from: source.to_path_buf(),
                to: dest_dir.to_path_buf(),
                source: err,
            })
        }
    };
    if !metadata.is_file() {
        return Err(MoveError::NotAFile(source.to_path_buf()));
    }
    if !dest_dir.is_dir() {
        return Err(MoveError::DestinationMissing(dest_dir.to_path_buf()));
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| MoveError::NotAFile(source.to_path_buf()))?;
    let dest_path = dest_dir.join(file_name);

    if dest_path.exists() {
        return Err(MoveError::DestinationOccupied(dest_path));
    }

    relocate(source, &dest_path)?;
    info!("moved {} to {}", source.display(), dest_path.display());
    Ok(dest_path)
}

/// Puts `source` at `dest_path` without ever overwriting: a hard link (or a
/// `create_new` copy when linking is not possible) claims the name first and
/// only then is the source removed.
fn relocate(source: &Path, dest_path: &Path) -> Result<(), MoveError> {
    let classify = |err: io::Error| match err.kind() {
        io::ErrorKind::AlreadyExists => MoveError::DestinationOccupied(dest_path.to_path_buf()),
        io::ErrorKind::NotFound if !source.exists() => {
            MoveError::SourceMissing(source.to_path_buf())
        }
        _ => MoveError::Io {
            from: source.to_path_buf(),
            to: dest_path.to_path_buf(),
            source: err,
        },
    };

    match fs::hard_link(source, dest_path) {
        Ok(()) => {
            if let Err(err) = fs::remove_file(source) {
                let _ = fs::remove_file(dest_path);
                return Err(classify(err));
            }
            Ok(())
        }
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::AlreadyExists | io::ErrorKind::NotFound
            ) =>
        {
            Err(classify(err))
        }
        Err(err) => {
            if err.kind() == io::ErrorKind::CrossesDevices {
                warn!(
                    "{} and {} are on different filesystems, copying instead",
                    source.display(),
                    dest_path.display()
                );
            } else {
                warn!("cannot link {} ({err}), copying instead", dest_path.display());
            }
            copy_then_remove(source, dest_path).map_err(classify)
        }
    }
}

fn copy_then_remove(source: &Path, dest_path: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    // Fails with AlreadyExists instead of truncating someone else's file.
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest_path)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
    if let Err(err) = copied {
        drop(writer);
        let _ = fs::remove_file(dest_path);
        return Err(err);
    }
    if let Ok(metadata) = reader.metadata() {
        let _ = fs::set_permissions(dest_path, metadata.permissions());
    }
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn moves_file_keeping_its_name() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let src = src_dir.path().join("report.pdf");
        fs::write(&src, b"quarterly numbers").unwrap();

        let moved = move_into(&src, dest_dir.path()).unwrap();

        assert_eq!(moved, dest_dir.path().join("report.pdf"));
        assert!(!src.exists());
        assert_eq!(fs::read(&moved).unwrap(), b"quarterly numbers");
    }

    #[test]
    fn missing_source_is_reported_distinctly() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("gone.txt");
        let err = move_into(&src, dir.path()).unwrap_err();
        assert!(matches!(err, MoveError::SourceMissing(ref p) if p == &src));
        assert!(err.to_string().starts_with("source file does not exist"));
    }

    #[test]
    fn directory_source_is_rejected() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let err = move_into(src_dir.path(), dest_dir.path()).unwrap_err();
        assert!(matches!(err, MoveError::NotAFile(_)));
    }

    #[test]
    fn missing_destination_is_rejected() {
        let src_dir = tempdir().unwrap();
        let src = src_dir.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        let dest = src_dir.path().join("nowhere");

        let err = move_into(&src, &dest).unwrap_err();
        assert!(matches!(err, MoveError::DestinationMissing(_)));
        assert!(src.exists());
    }

    #[test]
    fn existing_file_at_destination_is_left_alone() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let src = src_dir.path().join("dup.txt");
        fs::write(&src, "new").unwrap();
        fs::write(dest_dir.path().join("dup.txt"), "old").unwrap();

        let err = move_into(&src, dest_dir.path()).unwrap_err();

        assert!(matches!(err, MoveError::DestinationOccupied(_)));
        assert!(src.exists());
        assert_eq!(
            fs::read_to_string(dest_dir.path().join("dup.txt")).unwrap(),
            "old"
        );
    }

    #[test]
    fn file_appearing_after_the_check_is_not_overwritten() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let src = src_dir.path().join("late.txt");
        let dest = dest_dir.path().join("late.txt");
        fs::write(&src, "mine").unwrap();
        // lands between the exists() check and the move
        fs::write(&dest, "theirs").unwrap();

        let err = relocate(&src, &dest).unwrap_err();

        assert!(matches!(err, MoveError::DestinationOccupied(ref p) if p == &dest));
        assert_eq!(fs::read_to_string(&src).unwrap(), "mine");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "theirs");
    }

    #[test]
    fn copy_fallback_refuses_existing_target() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.bin");
        let dest = dir.path().join("b.bin");
        fs::write(&src, "fresh").unwrap();
        fs::write(&dest, "kept").unwrap();

        let err = copy_then_remove(&src, &dest).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(src.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "kept");
    }

    #[test]
    fn copy_fallback_moves_contents() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.bin");
        let dest = dir.path().join("b.bin");
        fs::write(&src, b"\x00\x01payload").unwrap();

        copy_then_remove(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"\x00\x01payload");
    }
}
