//! cargo run --example jacobi_poisson
//! cargo mpirun -n 4 --features mpi-support --example jacobi_poisson
//!
//! Jacobi relaxation for -Δu = 2π² sin(πx) sin(πy) on the unit square with
//! u = 0 on the boundary. The exact solution is sin(πx) sin(πy).

use std::f64::consts::PI;

use grid_halo::prelude::*;

const N: usize = 64;
const MAX_ITERS: usize = 20_000;
const TOL: f64 = 1e-7;

struct Report {
    iters: usize,
    residual: f64,
    error: f64,
}

fn solve<C: Communicator>(comm: &C, cfg: DecompositionConfig) -> Result<Report, HaloError> {
    let decomp = GridDecomposition::new(comm, cfg)?;
    let mut halo = HaloExchange::new(&decomp, comm)?;
    let layout = decomp.padded_layout();
    let h = 1.0 / (N - 1) as f64;

    let coord = |i: usize, j: usize| {
        let (gi, gj) = decomp.global_index(i, j);
        (gi as f64 * h, gj as f64 * h)
    };
    let on_boundary = |i: usize, j: usize| {
        let (gi, gj) = decomp.global_index(i, j);
        gi == 0 || gj == 0 || gi == N - 1 || gj == N - 1
    };

    let mut f = layout.allocate(0.0);
    layout.fill_interior(&mut f, |i, j| {
        let (x, y) = coord(i, j);
        2.0 * PI * PI * (PI * x).sin() * (PI * y).sin()
    });
    let mut u = layout.allocate(0.0);
    let mut u_new = u.clone();

    let mut residual = f64::INFINITY;
    let mut iters = 0;
    while iters < MAX_ITERS && residual > TOL {
        halo.exchange(&mut u)?;
        let mut local = 0.0f64;
        for (i, j) in layout.interior_cells() {
            let c = layout.interior_index(i, j);
            if on_boundary(i, j) {
                u_new[c] = 0.0;
                continue;
            }
            let (pi, pj) = (i + layout.nghost, j + layout.nghost);
            let sum = u[layout.index(pi - 1, pj)]
                + u[layout.index(pi + 1, pj)]
                + u[layout.index(pi, pj - 1)]
                + u[layout.index(pi, pj + 1)];
            u_new[c] = 0.25 * (sum + h * h * f[c]);
            local = local.max((u_new[c] - u[c]).abs());
        }
        std::mem::swap(&mut u, &mut u_new);
        residual = comm.all_reduce(local, ReduceOp::Max)?;
        iters += 1;
    }

    let local_err = layout
        .interior_cells()
        .map(|(i, j)| {
            let (x, y) = coord(i, j);
            let exact = (PI * x).sin() * (PI * y).sin();
            (u[layout.interior_index(i, j)] - exact).abs()
        })
        .fold(0.0, f64::max);
    let error = comm.all_reduce(local_err, ReduceOp::Max)?;
    Ok(Report {
        iters,
        residual,
        error,
    })
}

fn report<C: Communicator>(comm: &C, r: Report) {
    if comm.rank() == 0 {
        println!(
            "{N}x{N} grid on {} ranks: {} iterations, residual {:.3e}, max error {:.3e}",
            comm.size(),
            r.iters,
            r.residual,
            r.error
        );
    }
}

#[cfg(feature = "mpi-support")]
fn main() {
    env_logger::init();
    let comm = MpiComm::new().expect("MPI initialization failed");
    let cfg = DecompositionConfig::balanced(N, N, comm.size()).with_ghost(1);
    let r = solve(&comm, cfg).or_abort(&comm);
    report(&comm, r);
}

#[cfg(not(feature = "mpi-support"))]
fn main() {
    env_logger::init();
    let ranks = 4;
    let cfg = DecompositionConfig::balanced(N, N, ranks).with_ghost(1);
    LocalComm::run(ranks, |comm| {
        let r = solve(&comm, cfg).or_abort(&comm);
        report(&comm, r);
    });
}
