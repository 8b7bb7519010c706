//! Scenario execution
//!
//! Each step runs against one registry. A failing step is recorded, not
//! fatal: later steps still run, and the report says which outcomes matched
//! their expectations.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use certchain_core::{CertRegistry, Clock, FixedClock, RegistryConfig, RegistryEvent, SystemClock};
use certchain_error::{ErrorMessage, RegistryError};

use crate::scenario::{Scenario, Step, StepSpec};

/// Result of one scenario step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    pub caller: Option<String>,
    /// Short description of what the call returned
    pub detail: Option<String>,
    pub error: Option<ErrorMessage>,
    pub expected: Option<String>,
    pub events: Vec<RegistryEvent>,
}

impl StepOutcome {
    /// Whether the step behaved as the scenario says it should
    pub fn as_expected(&self) -> bool {
        match (&self.expected, &self.error) {
            (None, None) => true,
            (Some(expected), Some(error)) => expected == &error.error_code,
            _ => false,
        }
    }
}

/// Outcome of a whole scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepOutcome>,
    pub total_supply: usize,
    /// Violation found by the final consistency check
    pub invariant_violation: Option<String>,
}

impl ScenarioReport {
    /// Steps whose outcome did not match their expectation
    pub fn unexpected(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|outcome| !outcome.as_expected())
    }

    /// Whether every step matched and the registry is consistent
    pub fn is_clean(&self) -> bool {
        self.invariant_violation.is_none() && self.unexpected().next().is_none()
    }
}

/// Run `scenario` against a fresh registry built from `config`.
///
/// Returns the final registry alongside the report so callers can inspect it.
pub fn run_scenario(scenario: &Scenario, config: RegistryConfig) -> Result<(CertRegistry, ScenarioReport)> {
    let clock = FixedClock::new(scenario.start_time.unwrap_or_else(|| SystemClock.now()));
    let mut registry = CertRegistry::new(config, Arc::new(clock.clone()))?;

    for receiver in &scenario.receivers {
        registry.register_receiver(receiver.address.clone(), receiver.build()?);
    }

    info!(name = %scenario.name, steps = scenario.steps.len(), "running scenario");

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, spec) in scenario.steps.iter().enumerate() {
        let outcome = run_step(&mut registry, &clock, index, spec);
        if !outcome.as_expected() {
            warn!(index, action = outcome.action, "step did not behave as expected");
        }
        outcomes.push(outcome);
    }

    let report = ScenarioReport {
        name: scenario.name.clone(),
        steps: outcomes,
        total_supply: registry.total_supply(),
        invariant_violation: registry.check_invariants().err().map(|e| e.to_string()),
    };
    Ok((registry, report))
}

fn run_step(registry: &mut CertRegistry, clock: &FixedClock, index: usize, spec: &StepSpec) -> StepOutcome {
    let result = execute(registry, clock, &spec.step);
    let (detail, error) = match result {
        Ok(detail) => (detail, None),
        Err(err) => (None, Some(ErrorMessage::from_error(&err))),
    };

    StepOutcome {
        index,
        action: spec.step.action(),
        caller: spec.step.caller().map(ToString::to_string),
        detail,
        error,
        expected: spec.expect.clone(),
        events: registry.take_events(),
    }
}

fn execute(registry: &mut CertRegistry, clock: &FixedClock, step: &Step) -> Result<Option<String>, RegistryError> {
    let detail = match step {
        Step::Mint { to } => Some(format!("token {}", registry.mint(to)?)),
        Step::Apply {
            caller,
            standard,
            agency,
            cost,
            auditor,
        } => {
            let id = registry.apply(caller, standard, agency, *cost, auditor)?;
            Some(format!("token {}", id))
        }
        Step::UploadQms {
            caller,
            token,
            document,
        } => {
            registry.upload_qms(caller, *token, document.as_bytes())?;
            Some(format!("stage {}", registry.cert_stage(*token)?))
        }
        Step::Audit {
            caller,
            token,
            report,
        } => {
            let round = registry.audit(caller, *token, report.as_bytes())?;
            Some(format!("{:?} audit", round).to_lowercase())
        }
        Step::Approve {
            caller,
            spender,
            token,
        } => {
            registry.approve(caller, spender, *token)?;
            None
        }
        Step::ClearApproval { caller, token } => {
            let cleared = registry.clear_approval(caller, *token)?;
            (!cleared).then(|| "nothing to clear".to_string())
        }
        Step::SetApprovalForAll {
            caller,
            operator,
            approved,
        } => {
            registry.set_approval_for_all(caller, operator, *approved)?;
            None
        }
        Step::Transfer {
            caller,
            from,
            to,
            token,
        } => {
            registry.transfer_from(caller, from, to, *token)?;
            None
        }
        Step::SafeTransfer {
            caller,
            from,
            to,
            token,
            data,
        } => {
            registry.safe_transfer_from_with_data(caller, from, to, *token, data.as_bytes())?;
            None
        }
        Step::Burn { caller, token } => {
            registry.burn(caller, *token)?;
            None
        }
        Step::BurnFrom {
            caller,
            owner,
            token,
        } => {
            registry.burn_from(caller, owner, *token)?;
            None
        }
        Step::Advance { seconds } => {
            clock.advance(*seconds);
            Some(format!("now {}", clock.now()))
        }
    };
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_failed_step_does_not_stop_the_run() {
        let scenario = Scenario::from_toml_str(
            r#"
            start_time = 10

            [[steps]]
            action = "burn"
            caller = "alice"
            token = 1

            [[steps]]
            action = "mint"
            to = "alice"
            "#,
        )
        .unwrap();

        let (registry, report) = run_scenario(&scenario, RegistryConfig::default()).unwrap();
        assert_eq!(report.steps.len(), 2);
        assert_eq!(
            report.steps[0].error.as_ref().map(|e| e.error_code.as_str()),
            Some("REGISTRY_NOT_FOUND")
        );
        assert!(!report.is_clean());
        assert_eq!(report.steps[1].detail.as_deref(), Some("token 1"));
        assert_eq!(registry.total_supply(), 1);
    }
}
