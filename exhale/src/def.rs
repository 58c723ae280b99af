/*
Names declared on the solver side use %-separated counter suffixes,
which cannot collide with program-level identifiers.
*/

/// fresh summary snapshots synthesized by the summarizer
pub const PREFIX_SUMMARY_SNAP: &str = "ss%";
/// per-chunk amount-taken macros introduced by the exact split
pub const PREFIX_TAKEN_MACRO: &str = "taken%";
/// per-chunk bounded unknowns introduced by the constrainable split
pub const PREFIX_CONSTRAINED_TAKE: &str = "take%";
/// result snapshots of constrainable consumption
pub const PREFIX_CONSTRAINED_SNAP: &str = "sn%";

/// placeholder for the unified value while summary implications are built;
/// always substituted away before any term escapes the summarizer
pub const SUMMARY_PLACEHOLDER: &str = "%summary";
/// placeholder receiver in field permission sums; always substituted away
pub const WF_RECEIVER: &str = "%rcv";
