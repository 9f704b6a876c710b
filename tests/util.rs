#![allow(dead_code)]
use grid_halo::prelude::*;

/// Sentinel stored in ghost cells before an exchange.
pub const UNSET: f64 = -1.0;

/// Value that identifies global cell `(gi, gj)` unambiguously.
pub fn coded(gi: usize, gj: usize) -> f64 {
    (gi * 1000 + gj) as f64
}

/// Run one halo exchange on every rank of `cfg`'s process grid, in-process.
///
/// Each rank fills its interior with `fill(decomp, i, j)` and its ghosts with
/// [`UNSET`]; returns each rank's decomposition and padded buffer after the
/// exchange, in rank order.
pub fn exchange_once<F>(cfg: DecompositionConfig, fill: F) -> Vec<(GridDecomposition, Vec<f64>)>
where
    F: Fn(&GridDecomposition, usize, usize) -> f64 + Sync,
{
    let size = cfg.px * cfg.py;
    LocalComm::run(size, |comm| {
        let decomp = GridDecomposition::new(&comm, cfg).expect("decomposition");
        let mut halo = HaloExchange::new(&decomp, &comm).expect("halo exchange");
        let layout = decomp.padded_layout();
        let mut buf = layout.allocate(UNSET);
        layout.fill_interior(&mut buf, |i, j| fill(&decomp, i, j));
        halo.exchange(&mut buf).expect("exchange");
        (decomp, buf)
    })
}

/// Fill by global coordinate.
pub fn by_global(d: &GridDecomposition, i: usize, j: usize) -> f64 {
    let (gi, gj) = d.global_index(i, j);
    coded(gi, gj)
}

/// Fill by owning rank.
pub fn by_rank(d: &GridDecomposition, _i: usize, _j: usize) -> f64 {
    d.rank() as f64
}

/// Global coordinate of padded cell `(i, j)`, if it lies inside the global grid.
pub fn global_of_padded(d: &GridDecomposition, i: usize, j: usize) -> Option<(usize, usize)> {
    let g = d.nghost();
    let gi = (d.i0() + i).checked_sub(g)?;
    let gj = (d.j0() + j).checked_sub(g)?;
    (gi < d.global_nx() && gj < d.global_ny()).then_some((gi, gj))
}
