/// Source of the random jitter added to the packet-loss estimate.
///
/// Every simulator owns exactly one source, so a run is reproducible
/// whenever its source is (a seeded RNG or a constant stub).
pub trait NoiseSource {
    /// Draw the next noise term, in percentage points within `[-1, 1]`.
    fn sample(&mut self) -> f64;
}
