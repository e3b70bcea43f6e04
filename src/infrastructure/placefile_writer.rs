// Placefile writer - Atomic replacement of the artifact on disk
use crate::application::formatter::render_placefile;
use crate::domain::placefile::{PlacefileHeader, RenderedBlock};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PlacefileWriter {
    path: PathBuf,
}

impl PlacefileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Create the output directory and its parents if missing
    pub fn ensure_directory(&self) -> Result<()> {
        let dir = self.directory();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))
    }

    /// Replace the placefile with the header followed by `blocks`.
    ///
    /// The text goes to a temp file in the same directory which is then renamed
    /// over the destination, so readers see either the old or the new file.
    pub fn write(&self, header: &PlacefileHeader, blocks: &[RenderedBlock]) -> Result<()> {
        let text = render_placefile(header, blocks);

        let mut file = tempfile::NamedTempFile::new_in(self.directory())
            .context("Failed to create temporary placefile")?;
        file.write_all(text.as_bytes())
            .context("Failed to write temporary placefile")?;
        self.apply_permissions(file.as_file())?;
        file.as_file()
            .sync_all()
            .context("Failed to flush temporary placefile")?;

        // dropping an unpersisted temp file removes it, the old placefile stays
        file.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace placefile {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), blocks = blocks.len(), bytes = text.len(), "Placefile written");
        Ok(())
    }

    /// Temp files are created owner-only. The placefile keeps the mode of the
    /// file it replaces, or gets `PLACEFILE_MODE` on the first write.
    fn apply_permissions(&self, file: &std::fs::File) -> Result<()> {
        let permissions = match std::fs::metadata(&self.path) {
            Ok(existing) => existing.permissions(),
            Err(_) => default_permissions(file)?,
        };
        file.set_permissions(permissions)
            .context("Failed to set placefile permissions")
    }
}

#[cfg(unix)]
const PLACEFILE_MODE: u32 = 0o644;

#[cfg(unix)]
fn default_permissions(_file: &std::fs::File) -> Result<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::Permissions::from_mode(PLACEFILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions(file: &std::fs::File) -> Result<std::fs::Permissions> {
    Ok(file.metadata()?.permissions())
}
