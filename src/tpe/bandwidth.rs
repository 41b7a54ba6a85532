use crate::space::SearchSpace;

/// Per-dimension kernel widths for the density estimators.
///
/// A fixed bandwidth is supplied by the caller and never changes. A dynamic
/// bandwidth follows a Scott's-rule-style schedule,
/// `width_i / 5 * n^(-1/(D+4))`, and shrinks as the dataset grows.
#[derive(Clone, Debug, PartialEq)]
pub struct Bandwidth {
    widths: Vec<f64>,
    dynamic: bool,
}

impl Bandwidth {
    /// Uses the given widths for the whole run.
    #[must_use]
    pub fn fixed(widths: Vec<f64>) -> Self {
        Self {
            widths,
            dynamic: false,
        }
    }

    /// Derives widths from the space and a dataset of size `n`, and keeps
    /// deriving them on every [`refresh`](Self::refresh).
    #[must_use]
    pub fn dynamic(space: &SearchSpace, n: usize) -> Self {
        Self {
            widths: scott_widths(space, n),
            dynamic: true,
        }
    }

    /// Returns `true` if the widths follow the dataset size.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Returns the current widths.
    #[must_use]
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Recomputes dynamic widths for a dataset of size `n`. Fixed widths are
    /// left untouched.
    pub fn refresh(&mut self, space: &SearchSpace, n: usize) {
        if self.dynamic {
            self.widths = scott_widths(space, n);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn scott_widths(space: &SearchSpace, n: usize) -> Vec<f64> {
    let d = space.dims() as f64;
    let scale = (n.max(1) as f64).powf(-1.0 / (d + 4.0));
    (0..space.dims())
        .map(|i| space.width(i) / 5.0 * scale)
        .collect()
}
