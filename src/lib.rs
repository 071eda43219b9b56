mod broker;
mod config;
mod constants;
mod deque;
mod errors;
mod messaging;
mod metrics;
mod sink;

pub use broker::*;
pub use config::*;
pub use deque::*;
pub use errors::*;
pub use messaging::*;
pub use metrics::*;
pub use sink::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms100, ObjectivePercentile::P99);
