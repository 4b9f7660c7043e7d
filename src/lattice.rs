use crate::errors::{IsingError, Result};
use itertools::Itertools;
use rand::prelude::*;
use std::fmt::{self, Debug, Formatter};

/// Number of nearest neighbors of a site on the square lattice.
pub const COORDINATION: usize = 4;

/// A periodic `n x n` square lattice of continuous spins in `[-1, 1]`.
///
/// Spins are stored row-major in a flat buffer; site `(i, j)` lives at `i * n + j`.
/// Every site's four neighbors are precomputed on construction in the fixed order
/// up, down, left, right, so energy sums always visit them in the same order.
#[derive(Clone)]
pub struct Lattice {
    n: usize,
    spins: Vec<f64>,
    neighbors: Vec<[usize; COORDINATION]>,
}

impl Debug for Lattice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rows = self
            .spins
            .chunks(self.n)
            .map(|row| row.iter().map(|s| format!("{:+.3}", s)).join(" "))
            .join("\n");
        f.write_str(&format!("Lattice {}x{}\n{}", self.n, self.n, rows))
    }
}

impl Lattice {
    /// Make a new lattice with every spin drawn independently and uniformly from `[-1, 1]`.
    pub fn new<R: Rng>(n: usize, rng: &mut R) -> Result<Self> {
        let n_sites = site_count(n)?;
        let spins = make_random_spin_state(n_sites, rng);
        Ok(Self::with_spins(n, spins))
    }

    /// Make a lattice with every spin set to `value`.
    pub fn uniform(n: usize, value: f64) -> Result<Self> {
        let n_sites = site_count(n)?;
        check_spin(0, 0, value)?;
        Ok(Self::with_spins(n, vec![value; n_sites]))
    }

    /// Make a lattice from explicit rows, as returned by [`Lattice::snapshot`].
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        site_count(n)?;
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(IsingError::ShapeMismatch {
                row,
                found: r.len(),
                expected: n,
            });
        }
        let spins = rows.into_iter().flatten().collect::<Vec<_>>();
        for (site, s) in spins.iter().enumerate() {
            check_spin(site / n, site % n, *s)?;
        }
        Ok(Self::with_spins(n, spins))
    }

    fn with_spins(n: usize, spins: Vec<f64>) -> Self {
        debug_assert_eq!(Ok(spins.len()), site_count(n));
        Self {
            n,
            spins,
            neighbors: make_neighbor_table(n),
        }
    }

    /// Side length of the lattice.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Total number of sites, `n * n`.
    pub fn n_sites(&self) -> usize {
        self.spins.len()
    }

    /// Get the spin at `(i, j)`. Indices are not wrapped.
    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        self.site_index(i, j).map(|site| self.spins[site])
    }

    /// Overwrite the spin at `(i, j)`. Indices are not wrapped.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        let site = self.site_index(i, j)?;
        check_spin(i, j, value)?;
        self.spins[site] = value;
        Ok(())
    }

    /// The four periodic neighbors of `(i, j)`: up, down, left, right.
    pub fn neighbors(&self, i: usize, j: usize) -> Result<[(usize, usize); COORDINATION]> {
        let site = self.site_index(i, j)?;
        Ok(self.neighbors[site].map(|nb| self.coords(nb)))
    }

    /// Flat index of `(i, j)`, or `IndexOutOfRange`.
    pub fn site_index(&self, i: usize, j: usize) -> Result<usize> {
        if i < self.n && j < self.n {
            Ok(i * self.n + j)
        } else {
            Err(IsingError::IndexOutOfRange { i, j, n: self.n })
        }
    }

    /// `(row, col)` of a flat site index.
    pub fn coords(&self, site: usize) -> (usize, usize) {
        (site / self.n, site % self.n)
    }

    /// Flat neighbor indices of a flat site, in the same order as [`Lattice::neighbors`].
    #[inline]
    pub fn site_neighbors(&self, site: usize) -> &[usize; COORDINATION] {
        &self.neighbors[site]
    }

    /// Sum of the four neighbor spins of a flat site.
    #[inline]
    pub fn neighbor_sum(&self, site: usize) -> f64 {
        self.neighbors[site]
            .iter()
            .fold(0.0, |acc, nb| acc + self.spins[*nb])
    }

    /// Spin of a flat site.
    #[inline]
    pub fn spin(&self, site: usize) -> f64 {
        self.spins[site]
    }

    /// Negate the spin of a flat site.
    #[inline]
    pub(crate) fn flip(&mut self, site: usize) {
        self.spins[site] = -self.spins[site];
    }

    /// Get a ref of the flat spin buffer.
    pub fn spins(&self) -> &[f64] {
        &self.spins
    }

    /// Iterate over all `(row, col)` coordinates in storage order.
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.n).cartesian_product(0..self.n)
    }

    /// Copy the spins out as `n` rows of `n` values, for heatmap rendering.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        self.spins.chunks(self.n).map(|row| row.to_vec()).collect()
    }
}

/// Randomly build a continuous spin state, uniform on `[-1, 1]`.
pub fn make_random_spin_state<R: Rng>(n_sites: usize, rng: &mut R) -> Vec<f64> {
    (0..n_sites).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

/// Build the up, down, left, right neighbor table under periodic wraparound.
fn make_neighbor_table(n: usize) -> Vec<[usize; COORDINATION]> {
    let wrap = |x: usize, dx: isize| -> usize { (x as isize + dx).rem_euclid(n as isize) as usize };
    (0..n)
        .cartesian_product(0..n)
        .map(|(i, j)| {
            [
                wrap(i, -1) * n + j,
                wrap(i, 1) * n + j,
                i * n + wrap(j, -1),
                i * n + wrap(j, 1),
            ]
        })
        .collect()
}

/// `n * n`, or `InvalidSize` if `n` is zero or the product overflows.
pub(crate) fn site_count(n: usize) -> Result<usize> {
    match n.checked_mul(n) {
        Some(sites) if sites > 0 && sites <= isize::MAX as usize => Ok(sites),
        _ => Err(IsingError::InvalidSize { n }),
    }
}

fn check_spin(i: usize, j: usize, value: f64) -> Result<()> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(IsingError::InvalidSpin { i, j, value })
    }
}
