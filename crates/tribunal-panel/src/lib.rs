//! # tribunal-panel — Juror Panel Selection
//!
//! Pure selection logic for seating a juror panel from a reputation-ranked
//! candidate pool. Deterministic given the caller's RNG, so tests can drive
//! it with a seeded generator.
//!
//! ## Algorithm
//!
//! 1. Panel size scales with the pool: one seat per three eligible jurors,
//!    clamped to `[3, 5]`.
//! 2. The candidate window is the top `2 × panel_size` of the ranked input,
//!    or the whole pool when smaller. Ranking quality gates entry; chance
//!    decides among the qualified.
//! 3. The panel is a uniform without-replacement sample from the window
//!    ([`rand::seq::index::sample`], a partial Fisher-Yates). Every window
//!    member has equal probability of selection.

use rand::Rng;
use thiserror::Error;

use tribunal_core::UserId;

/// Smallest panel that can be seated.
pub const MIN_PANEL_SIZE: usize = 3;

/// Largest panel that will be seated regardless of pool size.
pub const MAX_PANEL_SIZE: usize = 5;

/// Candidate window size as a multiple of the panel size.
pub const CANDIDATE_WINDOW_FACTOR: usize = 2;

/// Errors arising from panel selection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// The eligible pool is too small to seat a minimum panel.
    #[error("insufficient jurors: {available} available, {required} required")]
    InsufficientJurors {
        /// Jurors available in the pool.
        available: usize,
        /// Minimum pool size to seat a panel.
        required: usize,
    },
}

/// The panel size for a pool of `pool_size` eligible jurors.
///
/// One seat per three jurors, clamped to `[MIN_PANEL_SIZE, MAX_PANEL_SIZE]`.
pub fn panel_size(pool_size: usize) -> usize {
    (pool_size / 3).clamp(MIN_PANEL_SIZE, MAX_PANEL_SIZE)
}

/// Select a juror panel from a pool ranked best-first by reputation.
///
/// Returns the seated panel, in no particular order. Pure given the RNG:
/// the same ranked input and the same generator state always produce the
/// same panel.
///
/// # Errors
///
/// Returns [`SelectionError::InsufficientJurors`] when fewer than
/// [`MIN_PANEL_SIZE`] jurors are available.
pub fn select_panel<R: Rng + ?Sized>(
    ranked: &[UserId],
    rng: &mut R,
) -> Result<Vec<UserId>, SelectionError> {
    if ranked.len() < MIN_PANEL_SIZE {
        return Err(SelectionError::InsufficientJurors {
            available: ranked.len(),
            required: MIN_PANEL_SIZE,
        });
    }

    let size = panel_size(ranked.len());
    let window = &ranked[..(CANDIDATE_WINDOW_FACTOR * size).min(ranked.len())];

    let picked = rand::seq::index::sample(rng, window.len(), size);
    Ok(picked.iter().map(|i| window[i]).collect())
}
