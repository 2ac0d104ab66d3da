//! Region loader: places the boot image and the program at machine start.
//!
//! Runs before there is a processor to trap into, so every failure comes
//! back as a `LoadError` and nothing is written unless the whole image fits.

use std::path::Path;

use crate::{AddressSpace, LoadError};

/// Write the fixed boot image at address 0.
///
/// `limit` is the first address the boot image may not reach (the program
/// entry point).
pub fn load_boot_image(space: &mut AddressSpace, image: &[u8], limit: u16) -> Result<(), LoadError> {
    let limit = (limit as usize).min(space.size());
    if image.len() > limit {
        return Err(LoadError::BootImageTooLarge {
            len: image.len(),
            limit,
        });
    }
    space.place(0, image);
    Ok(())
}

/// Load a program image at `entry`.
///
/// The image must be strictly smaller than the space between `entry` and
/// the top of memory. Returns the number of bytes placed.
pub fn load_program(space: &mut AddressSpace, entry: u16, image: &[u8]) -> Result<usize, LoadError> {
    let available = space.size().saturating_sub(entry as usize);
    if image.len() >= available {
        tracing::warn!(
            entry,
            len = image.len(),
            available,
            "program image rejected"
        );
        return Err(LoadError::ImageTooLarge {
            len: image.len(),
            available,
        });
    }
    space.place(entry as usize, image);
    tracing::debug!(entry, len = image.len(), "program image loaded");
    Ok(image.len())
}

/// Read a program image from disk and load it at `entry`.
///
/// An unreadable file is reported as `LoadError::Io`; memory is untouched.
pub fn load_program_file(
    space: &mut AddressSpace,
    entry: u16,
    path: impl AsRef<Path>,
) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let image = std::fs::read(path).map_err(|source| {
        tracing::warn!(path = %path.display(), "cannot read program image: {source}");
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    load_program(space, entry, &image)
}
