pub mod benchmark;
pub mod protective_put;
pub mod schedule;
pub mod selection;

pub use benchmark::{BenchmarkPoint, BenchmarkTracker, BENCHMARK_CHART};
pub use protective_put::{
    FallbackReason, ProtectivePutStrategy, RebalanceOutcome, RollDecision, Selection, SkipReason,
};
pub use schedule::{nth_friday, CycleCounter};
pub use selection::{candidate_puts, select_protective_put, target_allocations, PutCriteria};
