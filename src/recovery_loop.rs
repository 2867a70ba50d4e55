//! Clock recovery loop
//!
//! An NCO-based software PLL that walks the detected edge timestamps and
//! emits recovered clock-edge positions. Each outer step advances the NCO
//! by one period; every input edge that falls inside the current cycle
//! feeds a proportional frequency/phase correction plus a fixed-magnitude
//! bang-bang phase nudge. The loop is first order by design: no integral
//! term, trading lock range for simplicity.
//!
//! Two variants exist:
//!
//! - [`run_gated`] tracks an external gate/squelch signal. While
//!   squelched, corrections and output are suppressed but the NCO keeps
//!   free-running, and the squelched-to-passing transition re-acquires
//!   period and phase from the upcoming edges.
//! - [`run_ungated`] runs continuously with a fractional (f64) period
//!   state for smoother convergence.
//!
//! Both stop consuming edges the moment a frequency correction would push
//! the period below the Nyquist floor of the input; output produced up to
//! that point is kept.
//!
//! ## Loop constants
//!
//! | Constant | Value | Role |
//! |----------|-------|------|
//! | frequency gain | 0.006 | proportional period correction |
//! | phase gain | 0.002 | proportional period correction from phase error |
//! | bang-bang step | period/400 (gated), period*0.0025 (ungated) | immediate phase nudge |
//! | glitch cutoff | 10% of nominal period | intervals below this produce no frequency correction |

use tracing::warn;

use crate::gate_tracker::{reacquire_period, GateTracker};
use crate::waveform::GateWaveform;

/// Proportional gain applied to the instantaneous frequency error.
const FREQ_GAIN: f64 = 0.006;

/// Proportional gain applied to the phase error.
const PHASE_GAIN: f64 = 0.002;

/// Mutable PLL state threaded through one loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllState {
    /// Current NCO edge timestamp in fs.
    pub edgepos: i64,
    /// Current NCO period estimate in fs.
    pub period: i64,
    /// Timestamp of the last consumed input edge (0 = none yet).
    pub tlast: i64,
    /// Index of the next unconsumed input edge.
    pub nedge: usize,
}

impl PllState {
    /// Initial state: NCO phase-aligned to the first edge, nominal period.
    pub fn new(first_edge: i64, initial_period: i64) -> Self {
        Self {
            edgepos: first_edge,
            period: initial_period,
            tlast: 0,
            nedge: 1,
        }
    }
}

/// Summary statistics for one loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStats {
    /// Input edges consumed by the correction loop.
    pub edges_consumed: usize,
    /// Mean absolute wrapped phase error across the record, in fs.
    pub mean_phase_error: i64,
    /// The loop stopped early on a Nyquist violation.
    pub aborted: bool,
}

/// One correction-step record for loop diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEntry {
    /// Phase-centered timestamp of the step, in fs.
    pub time: i64,
    /// Period estimate after the correction, in fs.
    pub period: i64,
    /// Wrapped phase error that drove the correction, in fs.
    pub dphase: i64,
    /// Frequency (period) error that drove the correction, in fs.
    pub dperiod: i64,
}

/// Per-correction diagnostic trace of a loop run.
#[derive(Debug, Clone, Default)]
pub struct PllTrace {
    /// Correction records in time order.
    pub entries: Vec<TraceEntry>,
}

impl PllTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Wrap a raw phase error into one unit interval.
///
/// Errors beyond the half-period bound belong to the neighboring cycle,
/// so one `period` is added or subtracted to disambiguate.
#[inline]
pub fn wrap_phase_error(mut dphase: i64, period: i64, half_bound: i64) -> i64 {
    if dphase > half_bound {
        dphase -= period;
    }
    if dphase < -half_bound {
        dphase += period;
    }
    dphase
}

/// Run the PLL with an external gate/squelch signal.
///
/// `edges` must hold at least two non-decreasing timestamps; `tend` is the
/// end of the input record; `fnyquist` is the minimum legal period (twice
/// the input sample interval). Returns the recovered, phase-centered
/// clock-edge timestamps and run statistics.
pub fn run_gated(
    edges: &[i64],
    tend: i64,
    initial_period: i64,
    fnyquist: i64,
    gate: &GateWaveform,
    mut trace: Option<&mut PllTrace>,
) -> (Vec<i64>, LockStats) {
    let mut out = Vec::with_capacity(edges.len());
    let mut tracker = GateTracker::new(gate);
    let mut stats = LockStats::default();
    let mut total_error: i64 = 0;

    // Nominal period; rebased when the gate re-opens
    let mut nominal = initial_period;
    let mut half_bound = nominal / 2;

    let mut st = PllState::new(edges[0], initial_period);

    while st.edgepos < tend && st.nedge < edges.len() - 1 {
        let center = st.period / 2;

        let check = tracker.check(st.edgepos);
        if check.reacquire {
            // Clock just got ungated: re-estimate the period from the
            // upcoming edges and snap the NCO to the next one
            st.period = reacquire_period(edges, st.nedge, st.period);
            nominal = st.period;
            half_bound = nominal / 2;
            st.edgepos = edges[st.nedge] + st.period;
        }
        let gating = check.gating;

        // Consume every edge that occurred in this cycle; multiple edges
        // land here when the frequency is far off target
        let mut tnext = edges[st.nedge];
        while tnext + center < st.edgepos && st.nedge + 1 < edges.len() {
            if !gating {
                let dphase =
                    wrap_phase_error((st.edgepos - tnext) - st.period, st.period, half_bound);
                total_error += dphase.abs();
                stats.edges_consumed += 1;

                // Frequency error from the raw inter-edge interval and the
                // nearest integer count of unit intervals it spans
                let mut ui_len = tnext - st.tlast;
                let num_uis = (ui_len as f64 / nominal as f64).round();
                if num_uis < 0.1 {
                    // Glitch: no frequency correction
                    ui_len = st.period;
                } else {
                    ui_len = (ui_len as f64 / num_uis) as i64;
                }
                let dperiod = st.period - ui_len;

                if st.tlast != 0 {
                    st.period = (st.period as f64 - dperiod as f64 * FREQ_GAIN) as i64;
                    st.period = (st.period as f64 - dphase as f64 * PHASE_GAIN) as i64;

                    // Immediate bang-bang phase shift
                    if dphase > 0 {
                        st.edgepos -= st.period / 400;
                    } else {
                        st.edgepos += st.period / 400;
                    }

                    if let Some(t) = trace.as_deref_mut() {
                        t.entries.push(TraceEntry {
                            time: st.edgepos + st.period / 2,
                            period: st.period,
                            dphase,
                            dperiod,
                        });
                    }

                    if st.period < fnyquist {
                        warn!("PLL attempted to lock to frequency near or above Nyquist");
                        st.nedge = edges.len();
                        stats.aborted = true;
                        break;
                    }
                }
            }

            st.tlast = tnext;
            st.nedge += 1;
            tnext = edges[st.nedge];
        }

        // Sample point sits 90 degrees after the internal NCO edge
        if !gating {
            out.push(st.edgepos + st.period / 2);
        }
        st.edgepos += st.period;
    }

    stats.mean_phase_error = total_error / edges.len() as i64;
    (out, stats)
}

/// Run the PLL with no gate signal.
///
/// Same contract as [`run_gated`] minus the gate; the period state is
/// fractional for smoother frequency tracking.
pub fn run_ungated(
    edges: &[i64],
    tend: i64,
    initial_period: i64,
    fnyquist: i64,
    mut trace: Option<&mut PllTrace>,
) -> (Vec<i64>, LockStats) {
    let mut out = Vec::with_capacity(edges.len());
    let mut stats = LockStats::default();
    let mut total_error: i64 = 0;

    let initial_frequency = 1.0 / initial_period as f64;
    let glitch_cutoff = initial_period / 10;
    let edgemax = edges.len() - 1;
    let f_half_bound = (initial_period / 2) as f64;

    let mut st = PllState::new(edges[0], initial_period);
    let mut fperiod = initial_period as f64;

    while st.edgepos < tend && st.nedge < edgemax {
        let center = st.period / 2;

        let mut tnext = edges[st.nedge];
        while tnext + center < st.edgepos && st.nedge < edgemax {
            let dphase = (st.edgepos - tnext) - st.period;
            let mut fdphase = dphase as f64;
            if fdphase > f_half_bound {
                fdphase -= fperiod;
            }
            if fdphase < -f_half_bound {
                fdphase += fperiod;
            }
            total_error += fdphase.abs() as i64;
            stats.edges_consumed += 1;

            let ui_len = (tnext - st.tlast) as f64;
            let mut fdperiod = 0.0;
            if ui_len > glitch_cutoff as f64 {
                let num_uis = (ui_len * initial_frequency).round();
                if num_uis != 0.0 {
                    fdperiod = fperiod - ui_len / num_uis;
                }
            }

            if st.tlast != 0 {
                fperiod -= fdperiod * FREQ_GAIN + fdphase * PHASE_GAIN;
                st.period = fperiod as i64;

                // Immediate bang-bang phase shift; keyed off the raw phase
                // error sign, unlike the gated variant
                let bangbang = (fperiod * 0.0025) as i64;
                if dphase > 0 {
                    st.edgepos -= bangbang;
                } else {
                    st.edgepos += bangbang;
                }

                if let Some(t) = trace.as_deref_mut() {
                    t.entries.push(TraceEntry {
                        time: st.edgepos + st.period / 2,
                        period: st.period,
                        dphase: fdphase as i64,
                        dperiod: fdperiod as i64,
                    });
                }

                if st.period < fnyquist {
                    warn!("PLL attempted to lock to frequency near or above Nyquist");
                    st.nedge = edges.len();
                    stats.aborted = true;
                    break;
                }
            }

            st.tlast = tnext;
            st.nedge += 1;
            tnext = edges[st.nedge];
        }

        // Sample point sits 90 degrees after the internal NCO edge; the
        // half-period here is the one latched at the top of the cycle
        out.push(st.edgepos + center);
        st.edgepos += st.period;
    }

    stats.mean_phase_error = total_error / edges.len() as i64;
    (out, stats)
}
