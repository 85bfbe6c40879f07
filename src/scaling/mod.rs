//! Per-feature standardization to zero mean and unit variance.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Rescales each feature column to zero mean and unit population variance.
///
/// The fitted model (per-column mean and population standard deviation,
/// ddof = 0) is held on the scaler; within one pipeline run it is fit fresh
/// for every dataset.
#[derive(Debug, Default)]
pub struct StandardScaler {
    means_: Option<Array1<f64>>,
    stds_: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits column means and population standard deviations on `x`.
    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<&mut Self> {
        let means = x.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?;
        let stds = x.std_axis(Axis(0), 0.0);

        self.means_ = Some(means);
        self.stds_ = Some(stds);
        Ok(self)
    }

    /// Transforms `x` with the fitted model.
    ///
    /// A constant column (zero standard deviation) maps to 0.0 for every
    /// row rather than dividing by zero.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let means = self.means_.as_ref().ok_or(Error::NotFitted {
            model: "StandardScaler",
        })?;
        let stds = self.stds_.as_ref().ok_or(Error::NotFitted {
            model: "StandardScaler",
        })?;

        let mut scaled = x.to_owned();
        scaled
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                for (j, value) in row.iter_mut().enumerate() {
                    *value = if stds[j] > 0.0 {
                        (*value - means[j]) / stds[j]
                    } else {
                        0.0
                    };
                }
            });

        Ok(scaled)
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn means(&self) -> Option<&Array1<f64>> {
        self.means_.as_ref()
    }

    pub fn stds(&self) -> Option<&Array1<f64>> {
        self.stds_.as_ref()
    }
}
