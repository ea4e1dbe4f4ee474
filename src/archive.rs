// ABOUTME: Bundles the generated SQL files into a deflate-compressed zip archive
// ABOUTME: Archive entries are named by base filename, never by full source path

use crate::error::ExportError;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Create `destination` containing each of `paths` as a top-level entry.
///
/// Each source file becomes one Deflated entry named by its base file name.
///
/// # Arguments
///
/// * `paths` - Files to add, in archive order
/// * `destination` - Path of the zip file to create (overwritten if present)
///
/// # Errors
///
/// Returns [`ExportError::Archive`] if the archive cannot be created, a
/// source file cannot be opened or copied, or the archive cannot be
/// finished. A failed run leaves no archive behind at `destination`.
///
/// # Examples
///
/// ```no_run
/// # use mysql_exporter::archive::bundle;
/// # use std::path::Path;
/// # fn example() -> Result<(), mysql_exporter::error::ExportError> {
/// bundle(
///     &["output/schema.sql", "output/data.sql"],
///     Path::new("output/export.zip"),
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn bundle<P: AsRef<Path>>(paths: &[P], destination: &Path) -> Result<(), ExportError> {
    let result = write_archive(paths, destination);
    if result.is_err() {
        // The writer finalizes on drop, so a half-built archive would still open
        if let Err(e) = fs::remove_file(destination) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Could not remove incomplete {}: {}", destination.display(), e);
            }
        }
    }
    result
}

fn write_archive<P: AsRef<Path>>(paths: &[P], destination: &Path) -> Result<(), ExportError> {
    let file = File::create(destination)
        .map_err(|e| ExportError::archive(destination, "create", e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ExportError::archive(
                    destination,
                    "name entry for",
                    format!("{} has no file name", path.display()),
                )
            })?;

        let source = File::open(path).map_err(|e| {
            ExportError::archive(
                destination,
                "read source file into",
                format!("{}: {}", path.display(), e),
            )
        })?;

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ExportError::archive(destination, "add header to", e))?;

        io::copy(&mut BufReader::new(source), &mut writer)
            .map_err(|e| ExportError::archive(destination, "write content to", e))?;

        tracing::debug!("Added {} to {}", name, destination.display());
    }

    writer
        .finish()
        .map_err(|e| ExportError::archive(destination, "finish", e))?;

    Ok(())
}
