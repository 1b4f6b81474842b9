use log::debug;

use crate::structs::seed::Seed;
use crate::utils::errors::SelectError;
use crate::utils::keystream::Keystream;

/// Derives `count` distinct endpoint positions in `[0, pool)` from `seed`.
///
/// The positions are a partial Fisher–Yates shuffle of `0..pool` driven by
/// a fresh [`Keystream`]: for `i` in `0..count`, swap `pool[i]` with
/// `pool[i + below(pool - i)]` and emit `pool[i]`. Draw order is bit order,
/// so entry `i` carries message bit `i`.
///
/// ```
/// use substeg::process::select::select;
/// use substeg::structs::seed::Seed;
///
/// let seed = Seed::from_password("tests");
/// let positions = select(&seed, 16, 16)?;
/// assert_eq!(positions, select(&seed, 16, 16)?);
///
/// let mut sorted = positions.clone();
/// sorted.sort_unstable();
/// assert_eq!(sorted, (0..16).collect::<Vec<_>>());
/// # Ok::<(), substeg::utils::errors::SelectError>(())
/// ```
pub fn select(seed: &Seed, pool: usize, count: usize) -> Result<Vec<usize>, SelectError> {
    if count > pool {
        return Err(SelectError::TooManyPositions {
            requested: count,
            available: pool,
        });
    }

    let mut stream = Keystream::new(seed);
    let mut indices: Vec<usize> = (0..pool).collect();

    for i in 0..count {
        let j = i + stream.below((pool - i) as u64) as usize;
        indices.swap(i, j);
    }
    indices.truncate(count);

    debug!("Selected {count} of {pool} timestamp positions");

    Ok(indices)
}

#[test]
fn deterministic() -> anyhow::Result<()> {
    let seed = Seed::from_password("tests");
    assert_eq!(select(&seed, 100, 40)?, select(&seed, 100, 40)?);

    let other = Seed::from_password("tests ");
    assert_ne!(select(&seed, 100, 40)?, select(&other, 100, 40)?);
    Ok(())
}

#[test]
fn distinct_and_in_bounds() -> anyhow::Result<()> {
    let seed = Seed::from_password("bounds");

    for pool in 0..40 {
        for count in 0..=pool {
            let positions = select(&seed, pool, count)?;
            assert_eq!(positions.len(), count);
            assert!(positions.iter().all(|&p| p < pool));

            let mut sorted = positions.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), count);
        }
    }
    Ok(())
}

#[test]
fn prefix_is_stable() -> anyhow::Result<()> {
    // A shorter draw is a prefix of a longer one from the same pool.
    let seed = Seed::from_password("prefix");
    let long = select(&seed, 64, 48)?;
    let short = select(&seed, 64, 16)?;
    assert_eq!(&long[..16], &short[..]);
    Ok(())
}

#[test]
fn full_permutation() -> anyhow::Result<()> {
    let positions = select(&Seed::from_password("tests"), 16, 16)?;
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn too_many_positions() {
    assert_eq!(
        select(&Seed::from_password("x"), 4, 8),
        Err(SelectError::TooManyPositions {
            requested: 8,
            available: 4
        })
    );
}
