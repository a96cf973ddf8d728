//! Standalone unit-normalization helper.
//!
//! Unit normalization lives outside the core: `optimize` and
//! `suggest_fleet` require pre-normalized centimeters/kilograms and reject
//! anything else via [`crate::manifest::Item::validate`]. This module
//! auto-detects millimeter- or meter-scaled input before an external
//! ingestion layer ever calls the core; it is an independently testable
//! helper for that layer to use, not wired into `optimize`/`suggest_fleet`
//! themselves.

/// Guesses the unit an item dimension was authored in and converts to cm.
///
/// - `v >= 1000` is assumed to be millimeters (`v * 0.1`).
/// - `0 < v <= 10` is assumed to be meters (`v * 100`).
/// - Otherwise the value is trusted as already being centimeters.
///
/// Truck dimensions are never run through this heuristic: truck specs are
/// trusted as authored in cm. This helper only applies to item dimensions.
pub fn normalize_item_dimension(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    if v >= 1000.0 {
        v * 0.1
    } else if v > 0.0 && v <= 10.0 {
        v * 100.0
    } else {
        v
    }
}
