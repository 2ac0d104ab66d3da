//! CHIP-8 model configuration.

use crate::LoadError;
use crate::font::{LARGE_FONT, SMALL_FONT};

/// Supported interpreter variants.
///
/// Each model fixes the address space size, the program entry point and the
/// call stack depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chip8Model {
    /// COSMAC VIP CHIP-8: 4K, programs at $200.
    #[default]
    Chip8,
    /// ETI-660 CHIP-8: 4K, programs at $600.
    Eti660,
    /// SUPER-CHIP 1.1: 4K, programs at $200, large font.
    SuperChip,
    /// XO-CHIP: full 64K address range.
    XoChip,
}

impl Chip8Model {
    #[must_use]
    pub const fn memory_size(self) -> usize {
        match self {
            Self::Chip8 | Self::Eti660 | Self::SuperChip => 0x1000,
            Self::XoChip => 0x1_0000,
        }
    }

    /// Address the program image is loaded at and execution starts from.
    #[must_use]
    pub const fn entry_point(self) -> u16 {
        match self {
            Self::Eti660 => 0x0600,
            Self::Chip8 | Self::SuperChip | Self::XoChip => 0x0200,
        }
    }

    #[must_use]
    pub const fn stack_capacity(self) -> usize {
        16
    }

    #[must_use]
    pub const fn has_large_font(self) -> bool {
        matches!(self, Self::SuperChip | Self::XoChip)
    }

    /// Look a model up by its command-line name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chip8" | "chip-8" => Some(Self::Chip8),
            "eti660" | "eti-660" => Some(Self::Eti660),
            "schip" | "superchip" | "super-chip" => Some(Self::SuperChip),
            "xochip" | "xo-chip" => Some(Self::XoChip),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chip8 => "chip8",
            Self::Eti660 => "eti660",
            Self::SuperChip => "superchip",
            Self::XoChip => "xochip",
        }
    }
}

/// Fixed image written at address 0 before the program is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootImage {
    /// Nothing below the entry point; memory stays zeroed.
    None,
    /// The built-in hex font (plus the large font on models that have one).
    Font,
    /// Caller-supplied bytes, e.g. a resident interpreter ROM.
    Custom(Vec<u8>),
}

/// Configuration for creating a CHIP-8 memory subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    pub model: Chip8Model,
    pub boot_image: BootImage,
}

impl MemoryConfig {
    /// Configuration for `model` with the built-in font as boot image.
    #[must_use]
    pub fn new(model: Chip8Model) -> Self {
        Self {
            model,
            boot_image: BootImage::Font,
        }
    }

    #[must_use]
    pub fn with_boot_image(mut self, boot_image: BootImage) -> Self {
        self.boot_image = boot_image;
        self
    }

    /// Resolve the boot image to the bytes written at address 0.
    #[must_use]
    pub fn boot_bytes(&self) -> Vec<u8> {
        match &self.boot_image {
            BootImage::None => Vec::new(),
            BootImage::Font => {
                let mut bytes = SMALL_FONT.to_vec();
                if self.model.has_large_font() {
                    bytes.extend_from_slice(&LARGE_FONT);
                }
                bytes
            }
            BootImage::Custom(bytes) => bytes.clone(),
        }
    }

    /// Check that the boot image fits below the entry point.
    pub fn validate(&self) -> Result<(), LoadError> {
        let len = self.boot_bytes().len();
        let limit = self.model.entry_point() as usize;
        if len > limit {
            return Err(LoadError::BootImageTooLarge { len, limit });
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new(Chip8Model::default())
    }
}
