mod util;
use util::*;

use grid_halo::prelude::*;

/// Every ghost cell either mirrors the owning neighbor's interior value or,
/// on a physical edge or corner, still holds the sentinel.
fn assert_ghosts_mirror(d: &GridDecomposition, buf: &[f64]) {
    let layout = d.padded_layout();
    let g = layout.nghost;
    let x_inner = |i: usize| (g..g + layout.nx).contains(&i);
    let y_inner = |j: usize| (g..g + layout.ny).contains(&j);

    for (i, j) in layout.ghost_cells() {
        let face = match (x_inner(i), y_inner(j)) {
            (false, true) if i < g => Some(Direction::Left),
            (false, true) => Some(Direction::Right),
            (true, false) if j < g => Some(Direction::Down),
            (true, false) => Some(Direction::Up),
            _ => None,
        };
        let got = buf[layout.index(i, j)];
        match face.and_then(|f| d.neighbors().get(f)) {
            Some(nbr) => {
                let (gi, gj) = global_of_padded(d, i, j).expect("neighbor ghost inside grid");
                assert_eq!(d.owner_of(gi, gj), Some(nbr));
                assert_eq!(
                    got,
                    coded(gi, gj),
                    "rank {} ghost ({i}, {j}) should mirror ({gi}, {gj})",
                    d.rank()
                );
            }
            None => assert_eq!(got, UNSET, "rank {} ghost ({i}, {j}) touched", d.rank()),
        }
    }
}

fn assert_interior_untouched(d: &GridDecomposition, buf: &[f64]) {
    let layout = d.padded_layout();
    for (i, j) in layout.interior_cells() {
        assert_eq!(buf[layout.interior_index(i, j)], by_global(d, i, j));
    }
}

#[test]
fn two_by_two_rank_tags() {
    let cfg = DecompositionConfig::new(8, 8, 2, 2).with_ghost(1);
    let out = exchange_once(cfg, by_rank);

    for (d, buf) in &out {
        assert_eq!((d.nx(), d.ny()), (4, 4));
        let layout = d.padded_layout();
        for k in 1..=4 {
            let left = buf[layout.index(0, k)];
            let right = buf[layout.index(5, k)];
            let down = buf[layout.index(k, 0)];
            let up = buf[layout.index(k, 5)];
            let expect = |n: Option<usize>| n.map_or(UNSET, |r| r as f64);
            assert_eq!(left, expect(d.left()));
            assert_eq!(right, expect(d.right()));
            assert_eq!(down, expect(d.down()));
            assert_eq!(up, expect(d.up()));
        }
        for (i, j) in [(0, 0), (0, 5), (5, 0), (5, 5)] {
            assert_eq!(buf[layout.index(i, j)], UNSET, "corner ({i}, {j})");
        }
    }

    // rank 0 sits at (0, 0): right is rank 1, up is rank 2
    let (d0, b0) = &out[0];
    let l = d0.padded_layout();
    assert_eq!(b0[l.index(5, 2)], 1.0);
    assert_eq!(b0[l.index(2, 5)], 2.0);
    assert_eq!(b0[l.index(0, 2)], UNSET);
    assert_eq!(b0[l.index(2, 0)], UNSET);
}

#[test]
fn single_ghost_layer_mirrors_neighbors() {
    for cfg in [
        DecompositionConfig::new(8, 8, 2, 2),
        DecompositionConfig::new(10, 7, 3, 2),
        DecompositionConfig::new(5, 9, 1, 3),
        DecompositionConfig::new(11, 4, 4, 1),
    ] {
        for (d, buf) in exchange_once(cfg.with_ghost(1), by_global) {
            assert_ghosts_mirror(&d, &buf);
            assert_interior_untouched(&d, &buf);
        }
    }
}

#[test]
fn multi_layer_ghosts_mirror_neighbors() {
    for cfg in [
        DecompositionConfig::new(13, 11, 3, 3).with_ghost(2),
        DecompositionConfig::new(20, 9, 2, 3).with_ghost(3),
        DecompositionConfig::new(10, 10, 4, 1).with_ghost(2),
        DecompositionConfig::new(9, 12, 1, 4).with_ghost(3),
    ] {
        for (d, buf) in exchange_once(cfg, by_global) {
            assert_ghosts_mirror(&d, &buf);
            assert_interior_untouched(&d, &buf);
        }
    }
}

#[test]
fn single_process_leaves_ghosts_alone() {
    let cfg = DecompositionConfig::new(6, 5, 1, 1).with_ghost(2);
    let out = exchange_once(cfg, by_global);
    let (d, buf) = &out[0];
    let layout = d.padded_layout();
    for (i, j) in layout.ghost_cells() {
        assert_eq!(buf[layout.index(i, j)], UNSET);
    }
    assert_interior_untouched(d, buf);
}

#[test]
fn lone_block_narrower_than_ghost_is_inert() {
    let cfg = DecompositionConfig::new(2, 2, 1, 1).with_ghost(3);
    let out = exchange_once(cfg, by_global);
    let (d, buf) = &out[0];
    let layout = d.padded_layout();
    assert_eq!(buf.len(), 8 * 8);
    for (i, j) in layout.ghost_cells() {
        assert_eq!(buf[layout.index(i, j)], UNSET);
    }
    assert_interior_untouched(d, buf);
}

#[test]
fn single_process_column_exchanges_along_y_only() {
    // nx = 1 is narrower than the ghost width, but there are no x neighbors
    let cfg = DecompositionConfig::new(1, 8, 1, 2).with_ghost(2);
    let out = exchange_once(cfg, by_global);
    for (d, buf) in &out {
        assert_eq!((d.nx(), d.ny()), (1, 4));
        assert_eq!((d.left(), d.right()), (None, None));
        assert_ghosts_mirror(d, buf);
        assert_interior_untouched(d, buf);
    }

    // rank 0's up ghosts hold rank 1's first two rows
    let (d0, b0) = &out[0];
    let l = d0.padded_layout();
    assert_eq!(b0[l.index(2, 6)], coded(0, 4));
    assert_eq!(b0[l.index(2, 7)], coded(0, 5));
}

#[test]
fn zero_ghost_width_is_a_no_op() {
    let cfg = DecompositionConfig::new(8, 6, 2, 2);
    let out = exchange_once(cfg, by_global);
    for (d, buf) in &out {
        assert_eq!(buf.len(), d.nx() * d.ny());
        assert_interior_untouched(d, buf);
    }
}

#[test]
fn repeated_exchanges_see_fresh_interiors() {
    let cfg = DecompositionConfig::new(6, 6, 3, 1).with_ghost(1);
    let out = LocalComm::run(3, |comm| {
        let d = GridDecomposition::new(&comm, cfg).unwrap();
        let mut halo = HaloExchange::new(&d, &comm).unwrap();
        let layout = d.padded_layout();
        let mut u = layout.allocate(UNSET);
        let mut seen = Vec::new();
        for step in 0..3 {
            layout.fill_interior(&mut u, |_, _| (10 * step + comm.rank()) as f64);
            halo.exchange(&mut u).unwrap();
            seen.push(d.right().map(|_| u[layout.index(layout.nghost + layout.nx, 1)]));
        }
        seen
    });
    assert_eq!(out[0], vec![Some(1.0), Some(11.0), Some(21.0)]);
    assert_eq!(out[1], vec![Some(2.0), Some(12.0), Some(22.0)]);
    assert_eq!(out[2], vec![None, None, None]);
}

#[test]
fn single_precision_buffers() {
    let cfg = DecompositionConfig::new(4, 4, 1, 2).with_ghost(1);
    let out = LocalComm::run(2, |comm| {
        let d = GridDecomposition::new(&comm, cfg).unwrap();
        let mut halo = HaloExchange::<_, f32>::new(&d, &comm).unwrap();
        let layout = d.padded_layout();
        let mut u = layout.allocate(-1.0f32);
        layout.fill_interior(&mut u, |i, _| comm.rank() as f32 + 0.25 * i as f32);
        halo.exchange(&mut u).unwrap();
        u
    });
    let l = PaddedLayout::new(4, 2, 1);
    // rank 0's up ghost holds rank 1's bottom row
    assert_eq!(out[0][l.index(1, 3)], 1.0);
    assert_eq!(out[0][l.index(4, 3)], 1.75);
    // rank 1's down ghost holds rank 0's top row
    assert_eq!(out[1][l.index(2, 0)], 0.25);
}

#[test]
fn custom_tags_still_pair_up() {
    let cfg = DecompositionConfig::new(6, 6, 2, 1).with_ghost(1);
    let out = LocalComm::run(2, |comm| {
        let d = GridDecomposition::new(&comm, cfg).unwrap();
        let tags = HaloCommTags::from_base(CommTag::new(0x4000));
        let mut halo = HaloExchange::with_tags(&d, &comm, tags).unwrap();
        let mut u = d.padded_layout().allocate(UNSET);
        d.padded_layout()
            .fill_interior(&mut u, |i, j| by_global(&d, i, j));
        halo.exchange(&mut u).unwrap();
        (d, u)
    });
    for (d, u) in &out {
        assert_ghosts_mirror(d, u);
    }
}

#[test]
fn size_mismatch_is_caught_before_any_message() {
    let cfg = DecompositionConfig::new(8, 8, 2, 2).with_ghost(1);
    let out = LocalComm::run(4, |comm| {
        let d = GridDecomposition::new(&comm, cfg).unwrap();
        let mut halo = HaloExchange::new(&d, &comm).unwrap();
        let mut short = vec![0.0f64; d.nx() * d.ny()];
        halo.exchange(&mut short)
    });
    for res in out {
        assert_eq!(
            res,
            Err(HaloError::BufferSizeMismatch {
                expected: 36,
                actual: 16
            })
        );
    }
}

#[test]
#[should_panic(expected = "aborted with code 2")]
fn size_mismatch_aborts_the_group() {
    let cfg = DecompositionConfig::new(8, 8, 2, 1).with_ghost(1);
    LocalComm::run(2, |comm| {
        let d = GridDecomposition::new(&comm, cfg).or_abort(&comm);
        let mut halo = HaloExchange::new(&d, &comm).or_abort(&comm);
        let mut short = vec![0.0f64; 3];
        halo.exchange(&mut short).or_abort(&comm);
    });
}
