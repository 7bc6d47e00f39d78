//! The scenario catalogue: every case, named, in the order it runs.

mod patient;
mod visit;

pub use patient::PatientCase;
pub use visit::VisitCase;

use crate::context::Context;
use crate::outcome::{Outcome, Summary};

#[derive(Debug, Clone)]
pub enum Scenario {
    Patient(PatientCase),
    Visit(VisitCase),
}

impl Scenario {
    pub fn name(&self) -> String {
        match self {
            Scenario::Patient(case) => format!("patient: {}", case.name()),
            Scenario::Visit(case) => format!("visit: {}", case.name()),
        }
    }

    pub async fn run(&self, ctx: &Context) -> Outcome {
        let result = match self {
            Scenario::Patient(case) => case.run(ctx).await,
            Scenario::Visit(case) => case.run(ctx).await,
        };
        Outcome::from_result(result)
    }
}

pub fn all() -> Vec<Scenario> {
    patient::cases()
        .into_iter()
        .map(Scenario::Patient)
        .chain(visit::cases().into_iter().map(Scenario::Visit))
        .collect()
}

/// Scenarios whose name contains `filter`, case-insensitively.
pub fn select(filter: Option<&str>) -> Vec<Scenario> {
    let filter = filter.map(str::to_lowercase);
    all()
        .into_iter()
        .filter(|s| {
            filter
                .as_deref()
                .is_none_or(|f| s.name().to_lowercase().contains(f))
        })
        .collect()
}

/// Run `scenarios` in order, one at a time, printing a line per outcome.
pub async fn run_all(ctx: &Context, scenarios: &[Scenario], fail_fast: bool) -> Summary {
    let mut summary = Summary::default();
    for scenario in scenarios {
        let name = scenario.name();
        tracing::debug!("running {name}");
        let outcome = scenario.run(ctx).await;
        match outcome.reason() {
            Some(reason) => println!("{} {name}: {reason}", outcome.label()),
            None => println!("{} {name}", outcome.label()),
        }
        summary.record(&name, &outcome);
        if fail_fast && outcome.is_failure() {
            tracing::warn!("stopping after first failure");
            break;
        }
    }
    summary
}
