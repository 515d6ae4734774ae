// src/sweep/classify.rs

//! Size-based classification of working-directory files.

use crate::types::Disposition;

/// Bytes per decimal megabyte factor.
const MB_PER_BYTE: f64 = 1e-6;

/// Size in decimal megabytes (`bytes * 1e-6`, not MiB).
pub fn size_in_megabytes(bytes: u64) -> f64 {
    bytes as f64 * MB_PER_BYTE
}

/// Files strictly larger than `threshold_mb` are archived, everything else
/// is deleted. A file of exactly the threshold is deleted.
pub fn classify(bytes: u64, threshold_mb: f64) -> Disposition {
    if size_in_megabytes(bytes) > threshold_mb {
        Disposition::Archive
    } else {
        Disposition::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_decimal_megabytes() {
        assert_eq!(size_in_megabytes(1_000_000), 1.0);
        // 1 MiB is slightly more than 1 MB.
        assert!(size_in_megabytes(1 << 20) > 1.0);
    }

    #[test]
    fn boundary_is_deleted() {
        assert_eq!(classify(150_000_000, 150.0), Disposition::Delete);
        assert_eq!(classify(150_000_001, 150.0), Disposition::Archive);
        assert_eq!(classify(149_999_999, 150.0), Disposition::Delete);
    }

    #[test]
    fn zero_threshold_archives_any_non_empty_file() {
        assert_eq!(classify(0, 0.0), Disposition::Delete);
        assert_eq!(classify(1, 0.0), Disposition::Archive);
    }
}
