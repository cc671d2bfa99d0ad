// ionblade — Gesture Classifier
//
// Maps one magnitude pair onto the gesture bands. The swing family reads the
// angular-rate magnitude, the strike family the acceleration magnitude, and
// the two are evaluated independently: a single cycle can propose both. The
// caller owns the lockout gate and the arbitration between the proposals.

use crate::config::*;
use crate::events::Gesture;
use crate::motion::Magnitudes;

/// One band match, with the variant already drawn for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub gesture: Gesture,
    pub variant: u32,
}

/// Per-family outcome of one classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleEvents {
    pub swing: Option<Proposal>,
    pub strike: Option<Proposal>,
}

/// Evaluate both gesture families against a magnitude pair.
///
/// `rng(lo, hi)` must return a uniform draw from the inclusive range; the
/// swing draw happens before the strike draw when both bands trip.
pub fn classify(mags: Magnitudes, rng: &mut impl FnMut(u32, u32) -> u32) -> CycleEvents {
    CycleEvents {
        swing: classify_swing(mags.gyr, rng),
        strike: classify_strike(mags.acc, rng),
    }
}

fn classify_swing(gyr: u16, rng: &mut impl FnMut(u32, u32) -> u32) -> Option<Proposal> {
    // Two bands, one event: slow and fast swings share the variant pool and
    // the duration table. A reading exactly on the fast boundary sits between
    // the bands and stays quiet.
    let slow = gyr > SWING_GYR_MIN && gyr < SWING_GYR_FAST;
    let fast = gyr > SWING_GYR_FAST;
    if !(slow || fast) {
        return None;
    }
    let (lo, hi) = Gesture::Swing.variant_range();
    Some(Proposal {
        gesture: Gesture::Swing,
        variant: rng(lo, hi),
    })
}

fn classify_strike(acc: u16, rng: &mut impl FnMut(u32, u32) -> u32) -> Option<Proposal> {
    let gesture = if acc >= STRIKE_ACC_HARD {
        Gesture::StrikeHard
    } else if acc > STRIKE_ACC_MIN {
        Gesture::StrikeSoft
    } else {
        return None;
    };
    let (lo, hi) = gesture.variant_range();
    Some(Proposal {
        gesture,
        variant: rng(lo, hi),
    })
}
