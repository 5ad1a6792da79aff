//! Frame catalog.
//!
//! Lists the frame files available in the stream directory. The catalog is
//! built once at startup, sorted lexicographically for a deterministic send
//! order, and never mutated afterwards. Per-frame run status lives in the
//! state aggregate, not here.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// File extension accepted as a stream frame.
const FRAME_EXTENSION: &str = "jpg";

// ============================================================================
// Frame
// ============================================================================

/// One unit of work: an identified input frame.
///
/// Both fields are fixed at catalog-load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Path of the frame file, used verbatim as the lookup identifier.
    pub identifier: String,
    /// 0-based position in the catalog.
    pub index: usize,
}

// ============================================================================
// Catalog
// ============================================================================

/// Ordered, immutable sequence of frames.
#[derive(Debug, Default)]
pub struct Catalog {
    frames: Vec<Frame>,
}

impl Catalog {
    /// Builds a catalog from the `.jpg` files in `dir`, sorted by path.
    ///
    /// An empty directory yields an empty catalog, which is a valid empty
    /// run, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the directory cannot be read.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| Error::catalog(dir, e))?;

        let mut identifiers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::catalog(dir, e))?;
            let path = entry.path();
            let is_frame = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION));
            if is_frame {
                identifiers.push(path.to_string_lossy().into_owned());
            } else {
                debug!(path = %path.display(), "Skipping non-frame file");
            }
        }
        identifiers.sort();

        let frames = identifiers
            .into_iter()
            .enumerate()
            .map(|(index, identifier)| Frame { identifier, index })
            .collect::<Vec<_>>();

        info!(dir = %dir.display(), count = frames.len(), "Loaded stream catalog");
        Ok(Self { frames })
    }

    /// Builds a catalog directly from identifiers, preserving their order.
    ///
    /// Intended for tests and embedding; `load` is the production path.
    #[must_use]
    pub fn from_identifiers(identifiers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let frames = identifiers
            .into_iter()
            .enumerate()
            .map(|(index, identifier)| Frame {
                identifier: identifier.into(),
                index,
            })
            .collect();
        Self { frames }
    }

    /// Returns the number of frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the catalog holds no frames.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frame at `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Iterates over the frames in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
