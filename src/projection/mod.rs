//! Principal component projection of standardized feature matrices.
//!
//! Finds the orthogonal directions of maximal variance via SVD and projects
//! rows onto the leading components. The SVD kernel is nalgebra's; matrices
//! cross the module boundary as ndarray arrays and are converted with
//! nshare.

use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use nshare::{IntoNalgebra, IntoNdarray2};
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Principal Component Analysis over dense row-major data.
///
/// Components are ordered by descending explained variance. The sign of
/// each axis is whatever the SVD yields; callers must not rely on a fixed
/// sign convention.
#[derive(Debug)]
pub struct Pca {
    n_components: usize,
    center: bool,
    mean_: Option<Array1<f64>>,
    components_: Option<Array2<f64>>,
    explained_variance_ratio_: Option<Array1<f64>>,
}

impl Pca {
    /// Fits the projection on `x` (samples x features).
    ///
    /// Requires at least `n_components` rows and columns; fewer usable
    /// dimensions than requested components is an
    /// [`Error::InsufficientDimensionality`].
    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<&mut Self> {
        let (n_samples, n_features) = x.dim();

        if self.n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if n_samples < self.n_components || n_features < self.n_components {
            return Err(Error::InsufficientDimensionality {
                n_samples,
                n_features,
                n_components: self.n_components,
            });
        }

        let mean = if self.center {
            Some(x.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?)
        } else {
            None
        };
        let preprocessed = preprocess(x, &mean);

        let mut svd = preprocessed.into_nalgebra().svd(false, true);
        svd.sort_by_singular_values();

        let vt = svd
            .v_t
            .expect("V^T requested from SVD")
            .into_ndarray2()
            .into_owned();
        let components = vt.slice(s![..self.n_components, ..]).to_owned();

        let total_variance: f64 = svd.singular_values.iter().map(|s| s * s).sum();
        let ratio = Array1::from_iter(svd.singular_values.iter().take(self.n_components).map(
            |s| {
                if total_variance > 0.0 {
                    s * s / total_variance
                } else {
                    0.0
                }
            },
        ));

        self.mean_ = mean;
        self.components_ = Some(components);
        self.explained_variance_ratio_ = Some(ratio);

        Ok(self)
    }

    /// Projects `x` onto the fitted components (samples x n_components).
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let components = self
            .components_
            .as_ref()
            .ok_or(Error::NotFitted { model: "Pca" })?;
        let preprocessed = preprocess(x, &self.mean_);
        Ok(preprocessed.dot(&components.t()))
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Component matrix (n_components x n_features).
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components_.as_ref()
    }

    /// Fraction of total variance captured per component, descending.
    pub fn explained_variance_ratio(&self) -> Option<&Array1<f64>> {
        self.explained_variance_ratio_.as_ref()
    }

    /// Loadings table (n_features x n_components): each input feature's
    /// coefficient in the linear combination defining each component.
    pub fn loadings(&self) -> Option<Array2<f64>> {
        self.components_.as_ref().map(|c| c.t().to_owned())
    }
}

fn preprocess(x: ArrayView2<f64>, mean: &Option<Array1<f64>>) -> Array2<f64> {
    let mut preprocessed = x.to_owned();
    if let Some(m) = mean {
        preprocessed
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                row -= m;
            });
    }
    preprocessed
}

pub struct PcaBuilder {
    n_components: usize,
    center: bool,
}

impl Default for PcaBuilder {
    fn default() -> Self {
        Self {
            n_components: 3,
            center: true,
        }
    }
}

impl PcaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Whether to subtract column means before the decomposition. Leave on
    /// unless the input is already centered.
    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn build(self) -> Pca {
        Pca {
            n_components: self.n_components,
            center: self.center,
            mean_: None,
            components_: None,
            explained_variance_ratio_: None,
        }
    }
}
