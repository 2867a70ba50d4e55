//! Gate/squelch tracking
//!
//! An optional digital gate waveform marks time regions where clock
//! recovery should run ("pass") or be suppressed ("squelch"). The tracker
//! walks gate regions with a monotonic cursor, since the loop visits NCO
//! edge positions in increasing time order, and reports the
//! squelched-to-passing transitions that require the PLL to re-acquire
//! its period and phase.
//!
//! Re-acquisition looks at up to the next 512 inter-edge intervals: the
//! median of those intervals is likely one unit interval (or an integer
//! multiple), so all intervals within 25% of the median are averaged and
//! the result becomes the new period estimate.

use tracing::debug;

use crate::waveform::GateWaveform;

/// Number of inter-edge intervals examined when re-acquiring.
pub const REACQUIRE_WINDOW: usize = 512;

/// Result of a gate check at one NCO edge position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateCheck {
    /// `true` while the clock output is squelched.
    pub gating: bool,
    /// `true` exactly when this check crossed from squelched to passing.
    pub reacquire: bool,
}

/// Tracks squelch state against a gate waveform.
///
/// The cursor only ever moves forward; callers must present edge
/// positions in non-decreasing order.
#[derive(Debug, Clone)]
pub struct GateTracker<'a> {
    gate: &'a GateWaveform,
    cursor: usize,
    gating: bool,
}

impl<'a> GateTracker<'a> {
    /// Create a tracker over a gate waveform.
    ///
    /// If the gate starts inactive at T=0, output starts squelched. An
    /// empty gate waveform never squelches.
    pub fn new(gate: &'a GateWaveform) -> Self {
        let gating = if gate.is_empty() {
            false
        } else {
            !gate.value(0)
        };
        Self {
            gate,
            cursor: 0,
            gating,
        }
    }

    /// Current squelch state.
    pub fn is_gating(&self) -> bool {
        self.gating
    }

    /// Current region cursor (for diagnostics).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance to the gate region containing `edgepos` and report the
    /// squelch state there.
    ///
    /// Regions are half-open `[start, start + duration)`. Positions before
    /// the cursor's region keep the previous state; the cursor never moves
    /// backward.
    pub fn check(&mut self, edgepos: i64) -> GateCheck {
        let was_gating = self.gating;
        while self.cursor + 1 < self.gate.len() {
            let start = self.gate.region_start(self.cursor);
            let end = start + self.gate.region_duration(self.cursor);
            if edgepos < start {
                // Not there yet
                break;
            } else if edgepos >= end {
                self.cursor += 1;
            } else {
                self.gating = !self.gate.value(self.cursor);
                break;
            }
        }
        GateCheck {
            gating: self.gating,
            reacquire: was_gating && !self.gating,
        }
    }
}

/// Estimate the unit interval from the edges following `nedge`.
///
/// Takes the median of up to [`REACQUIRE_WINDOW`] pairwise inter-edge
/// intervals, then averages every interval within 25% of that median.
/// Falls back to `current_period` when no interval is available (ungating
/// at the very end of the record).
pub fn reacquire_period(edges: &[i64], nedge: usize, current_period: i64) -> i64 {
    let mut lengths = Vec::with_capacity(REACQUIRE_WINDOW);
    for i in 1..=REACQUIRE_WINDOW {
        if i + nedge >= edges.len() {
            break;
        }
        lengths.push(edges[nedge + i] - edges[nedge + i - 1]);
    }
    if lengths.is_empty() {
        return current_period;
    }

    lengths.sort_unstable();
    let median = lengths[lengths.len() / 2];

    // The median itself always qualifies, so the average is well-defined
    let mut sum: i64 = 0;
    let mut navg: i64 = 0;
    for &w in &lengths {
        if w as f64 >= 0.75 * median as f64 && w as f64 <= 1.25 * median as f64 {
            sum += w;
            navg += 1;
        }
    }
    let avg = sum / navg;
    debug!(
        intervals = lengths.len(),
        median, near_median = navg, period = avg,
        "re-acquired period estimate"
    );
    avg
}
