use crate::space::SearchSpace;

/// A broad Gaussian prior over the search space.
///
/// Each dimension gets a normal density centered on the midpoint of its range
/// with a standard deviation equal to the full range width. The joint density
/// is the product over dimensions, scaled by `weight`.
#[derive(Clone, Debug)]
pub struct NonInformativePrior {
    centers: Vec<f64>,
    sigmas: Vec<f64>,
    weight: f64,
}

impl NonInformativePrior {
    /// Builds the prior for `space`, scaled by `weight`.
    #[must_use]
    pub fn new(space: &SearchSpace, weight: f64) -> Self {
        let dims = 0..space.dims();
        Self {
            centers: dims.clone().map(|i| space.midpoint(i)).collect(),
            sigmas: dims.map(|i| space.width(i)).collect(),
            weight,
        }
    }

    /// Returns the scale factor applied to the joint density.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the weighted prior density at `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not have one coordinate per dimension.
    #[must_use]
    pub fn density(&self, x: &[f64]) -> f64 {
        assert_eq!(
            x.len(),
            self.centers.len(),
            "Point dimension {} doesn't match prior dimension {}",
            x.len(),
            self.centers.len()
        );

        let inv_sqrt_2pi = 1.0 / (2.0 * core::f64::consts::PI).sqrt();
        let joint: f64 = x
            .iter()
            .zip(self.centers.iter().zip(&self.sigmas))
            .map(|(&xi, (&mu, &sigma))| {
                let z = (xi - mu) / sigma;
                inv_sqrt_2pi / sigma * (-0.5 * z * z).exp()
            })
            .product();
        joint * self.weight
    }
}
