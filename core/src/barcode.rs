//! Barcode canonicalization.

/// The sentinel used in place of a missing barcode.
///
/// Observations with the sentinel barcode are counted like any other barcode, but never contribute
/// to the number of distinct barcodes at a site.
pub const MISSING: &str = "NA";

/// Resolves an optional barcode to its canonical form, replacing a missing barcode with [`MISSING`].
pub fn resolve(barcode: Option<String>) -> String {
    barcode.unwrap_or_else(|| String::from(MISSING))
}

/// Returns `true` if the barcode is the [`MISSING`] sentinel.
pub fn is_missing(barcode: &str) -> bool {
    barcode == MISSING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_missing() {
        assert_eq!(resolve(None), MISSING);
        assert!(is_missing(&resolve(None)));
    }

    #[test]
    fn test_resolve_present() {
        assert_eq!(resolve(Some(String::from("ACGT-1"))), "ACGT-1");
    }

    #[test]
    fn test_empty_barcode_is_not_missing() {
        let barcode = resolve(Some(String::new()));

        assert_eq!(barcode, "");
        assert!(!is_missing(&barcode));
    }
}
