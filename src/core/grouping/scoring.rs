//! Confidence scoring for a finished group.
//!
//! `score = detection_ratio × size_factor × time_factor`
//!
//! | Factor          | Value                                       |
//! |-----------------|---------------------------------------------|
//! | detection ratio | photos with a read payload / all photos     |
//! | size factor     | `min(1, n / 10)`                            |
//! | time factor     | 0.8 when the run spans over an hour, else 1 |

use super::types::PhotoGroup;

/// Group size at which the size factor saturates
pub const SIZE_SATURATION: f64 = 10.0;
/// Time span (seconds) beyond which a run is considered suspiciously long
pub const LONG_RUN_SECONDS: f64 = 3600.0;
pub const LONG_RUN_FACTOR: f64 = 0.8;

/// Score in [0, 1]; 0.0 for an empty group
pub fn confidence_score(group: &PhotoGroup) -> f64 {
    let n = group.photo_count();
    if n == 0 {
        return 0.0;
    }

    let detection_ratio = group.detected_count() as f64 / n as f64;
    let size_factor = (n as f64 / SIZE_SATURATION).min(1.0);
    let time_factor = if group.time_span() > LONG_RUN_SECONDS {
        LONG_RUN_FACTOR
    } else {
        1.0
    };

    detection_ratio * size_factor * time_factor
}
