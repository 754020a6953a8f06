// Session diagnostics — conversion counters exposed to consumers.

pub mod stats;
