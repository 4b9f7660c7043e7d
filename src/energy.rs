use crate::errors::{check_field, Result};
use crate::lattice::Lattice;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Coupling constant `J` and external field `H` of the hamiltonian
/// `E = -(J/2) sum_i S_i sum_<ij> S_j - H sum_i S_i`.
///
/// The bond sum visits both endpoints of every bond, hence the `J/2`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Couplings {
    /// Ferromagnetic coupling `J`.
    pub coupling: f64,
    /// External field `H`.
    pub field: f64,
}

impl Default for Couplings {
    fn default() -> Self {
        Self {
            coupling: 1.0,
            field: 0.01,
        }
    }
}

impl Couplings {
    /// Make a new set of couplings.
    pub fn new(coupling: f64, field: f64) -> Self {
        Self { coupling, field }
    }

    /// Energy of a single site: `-(J/2) S_i sum_nbr S_j - H S_i`.
    #[inline]
    pub fn site_energy(&self, lattice: &Lattice, site: usize) -> f64 {
        let s = lattice.spin(site);
        -(self.coupling / 2.0) * s * lattice.neighbor_sum(site) - self.field * s
    }

    /// Energy of the whole lattice, visiting every site and all four of its neighbors.
    pub fn total_energy(&self, lattice: &Lattice) -> f64 {
        (0..lattice.n_sites()).fold(0.0, |acc, site| acc + self.site_energy(lattice, site))
    }

    /// Energy change of setting `site` to `new_spin`, from the site's local field alone.
    ///
    /// With `dS = new - old`: `dE = -H dS - J dS sum_nbr S_j`. The bond counted at each
    /// endpoint contributes `J/2` twice, which is why the local coupling here is the full `J`.
    /// A neighbor that is the site itself (the 1x1 lattice) is a self-bond worth
    /// `-(J/2) S_i^2` each, so it enters through `new^2 - old^2` instead.
    #[inline]
    pub fn delta_energy(&self, lattice: &Lattice, site: usize, new_spin: f64) -> f64 {
        let old_spin = lattice.spin(site);
        let delta_s = new_spin - old_spin;
        let (self_bonds, local_field) = lattice.site_neighbors(site).iter().fold(
            (0usize, 0.0),
            |(k, acc), nb| {
                if *nb == site {
                    (k + 1, acc)
                } else {
                    (k, acc + lattice.spin(*nb))
                }
            },
        );
        let self_term = if self_bonds > 0 {
            -(self.coupling / 2.0)
                * self_bonds as f64
                * (new_spin * new_spin - old_spin * old_spin)
        } else {
            0.0
        };
        -self.field * delta_s - self.coupling * delta_s * local_field + self_term
    }

    /// Energy change of negating the spin at `site`.
    #[inline]
    pub fn flip_delta(&self, lattice: &Lattice, site: usize) -> f64 {
        self.delta_energy(lattice, site, -lattice.spin(site))
    }

    /// Susceptibility as the direct ratio `mu / H`. Fails if `H` is zero.
    pub fn susceptibility(&self, lattice: &Lattice) -> Result<f64> {
        let field = check_field(self.field)?;
        Ok(magnetization(lattice) / field)
    }
}

/// Total magnetization `sum_i S_i`, not normalized by the site count.
pub fn magnetization(lattice: &Lattice) -> f64 {
    lattice.spins().iter().sum()
}
