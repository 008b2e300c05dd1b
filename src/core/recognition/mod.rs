//! # Recognition Module
//!
//! The seam between images and the grouping engine. A recognizer turns a
//! photo session into an ordered list of [`RecognitionRecord`]s.
//!
//! Order matters: the grouping engine assigns no-QR photos to whichever
//! participant was seen last, and never re-sorts. Recognizers are therefore
//! responsible for handing records over in a meaningful order; the folder
//! recognizer uses natural filename order.
//!
//! ## Implementations
//! - [`FolderRecognizer`] - runs a [`StrategyCascade`] over a folder of JPEGs
//! - [`DetectionsFileRecognizer`] - replays a previously written detections file

mod folder;
mod natural;
mod replay;
mod strategy;
mod types;

pub use folder::FolderRecognizer;
pub use natural::natural_cmp;
pub use replay::DetectionsFileRecognizer;
pub use strategy::{DetectionStrategy, StrategyCascade};
pub use types::{Detection, DetectionSnapshot, DetectionsFile, RecognitionRecord};

use crate::error::RecognitionError;
use crate::events::EventSender;

/// Produces recognition records in processing order
pub trait Recognizer {
    fn recognize(&mut self, events: &EventSender) -> Result<Vec<RecognitionRecord>, RecognitionError>;

    /// Number of memoized per-image results, for recognizers that keep any
    fn cache_size(&self) -> usize {
        0
    }
}
