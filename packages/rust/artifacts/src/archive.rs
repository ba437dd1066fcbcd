//! `.tar.gz` packaging of a built binary and its auxiliary files.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use tracing::{debug, info, instrument};

use xk6bundler_shared::{BundlerError, Result};

/// Whether an archive member must exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Missing file is an error.
    Required,
    /// Missing file is skipped. Other I/O errors still fail.
    Optional,
}

/// Create a gzip-compressed tar at `archive_path` holding `primary` followed
/// by every existing file of `aux`, each under its base name.
#[instrument(skip_all, fields(archive = %archive_path.display(), primary = %primary.display()))]
pub fn package<P: AsRef<Path>>(archive_path: &Path, primary: &Path, aux: &[P]) -> Result<()> {
    let file = File::create(archive_path).map_err(|e| BundlerError::io(archive_path, e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    add_file(&mut builder, primary, Presence::Required)?;
    for path in aux {
        add_file(&mut builder, path.as_ref(), Presence::Optional)?;
    }

    // Finish tar, then gzip, then flush the file handle.
    let encoder = builder
        .into_inner()
        .map_err(|e| BundlerError::io(archive_path, e))?;
    let mut file = encoder
        .finish()
        .map_err(|e| BundlerError::io(archive_path, e))?;
    file.flush().map_err(|e| BundlerError::io(archive_path, e))?;

    info!("archive written");
    Ok(())
}

/// Append one file to the archive, preserving size, mode and mtime.
///
/// Returns `false` when an optional file does not exist.
pub fn add_file<W: Write>(builder: &mut Builder<W>, path: &Path, presence: Presence) -> Result<bool> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if presence == Presence::Optional && e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "optional file not found, skipping");
            return Ok(false);
        }
        Err(e) => return Err(BundlerError::io(path, e)),
    };

    let metadata = file.metadata().map_err(|e| BundlerError::io(path, e))?;
    let name = path
        .file_name()
        .ok_or_else(|| {
            BundlerError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(metadata.len());
    header.set_mode(file_mode(&metadata));
    header.set_mtime(mtime);

    builder
        .append_data(&mut header, name, file)
        .map_err(|e| BundlerError::io(path, e))?;

    debug!(path = %path.display(), size = metadata.len(), "added archive member");
    Ok(true)
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o555 } else { 0o755 }
}
