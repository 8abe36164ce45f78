use rand::Rng;

/// Source of uniform integers used by hand selection and perturbation.
///
/// Every [`rand::Rng`] is a `RandomSource`, so sessions simply hand over their
/// seeded `StdRng`. Tests can script exact draws by implementing the trait on
/// their own type.
pub trait RandomSource {
    /// Uniform integer in the half-open range `low..high`. Requires `low < high`.
    fn int_in(&mut self, low: i64, high: i64) -> i64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn int_in(&mut self, low: i64, high: i64) -> i64 {
        self.gen_range(low..high)
    }
}

/// Uniform index into a collection of `len` elements. Requires `len > 0`.
pub(crate) fn index_below<S: RandomSource + ?Sized>(rng: &mut S, len: usize) -> usize {
    rng.int_in(0, len as i64) as usize
}
