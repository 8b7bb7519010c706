//! Scenario file format
//!
//! ```toml
//! name = "single certification"
//! start_time = 1700000000
//!
//! [[receivers]]
//! address = "vault"
//!
//! [[steps]]
//! action = "apply"
//! caller = "company"
//! standard = "ISO 9001"
//! agency = "agency"
//! cost = 10
//! auditor = "auditor"
//!
//! [[steps]]
//! action = "audit"
//! caller = "auditor"
//! token = 1
//! report = "too early"
//! expect = "WORKFLOW_PRECONDITION_FAILED"
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use certchain_core::{FixedReceiver, TokenReceiver};
use certchain_types::{Address, Timestamp, TokenId};

/// A scripted run against a fresh registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name
    #[serde(default)]
    pub name: String,

    /// Initial clock reading; the current time when absent
    #[serde(default)]
    pub start_time: Option<Timestamp>,

    /// Identities given the receiver capability before the first step
    #[serde(default)]
    pub receivers: Vec<ReceiverSpec>,

    /// Steps, executed in order
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl Scenario {
    /// Parse a scenario from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid scenario")
    }

    /// Load a scenario file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/// Receiver capability attached to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSpec {
    pub address: Address,

    /// Refuse every record with this reason
    #[serde(default)]
    pub reject: Option<String>,

    /// Answer with this 4-byte acknowledgment (hex) instead of the accepted value
    #[serde(default)]
    pub answer: Option<String>,
}

impl ReceiverSpec {
    /// Build the receiver this spec describes
    pub fn build(&self) -> Result<Arc<dyn TokenReceiver>> {
        let receiver = match (&self.reject, &self.answer) {
            (Some(_), Some(_)) => {
                return Err(anyhow!(
                    "receiver {} sets both `reject` and `answer`",
                    self.address
                ))
            }
            (Some(reason), None) => FixedReceiver::Reject(reason.clone()),
            (None, Some(answer)) => FixedReceiver::Answer(parse_ack(answer)?),
            (None, None) => FixedReceiver::Accept,
        };
        Ok(Arc::new(receiver))
    }
}

fn parse_ack(answer: &str) -> Result<[u8; 4]> {
    let digits = answer.strip_prefix("0x").unwrap_or(answer);
    let value = u32::from_str_radix(digits, 16)
        .with_context(|| format!("`{}` is not a 4-byte hex acknowledgment", answer))?;
    Ok(value.to_be_bytes())
}

/// One step plus the error it is expected to raise, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(flatten)]
    pub step: Step,

    /// Error code the step must fail with, e.g. `WORKFLOW_SLOTS_EXHAUSTED`
    #[serde(default)]
    pub expect: Option<String>,
}

/// A registry call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Mint {
        to: Address,
    },
    Apply {
        caller: Address,
        standard: String,
        agency: String,
        cost: u64,
        auditor: Address,
    },
    UploadQms {
        caller: Address,
        token: TokenId,
        document: String,
    },
    Audit {
        caller: Address,
        token: TokenId,
        report: String,
    },
    Approve {
        caller: Address,
        spender: Address,
        token: TokenId,
    },
    ClearApproval {
        caller: Address,
        token: TokenId,
    },
    SetApprovalForAll {
        caller: Address,
        operator: Address,
        approved: bool,
    },
    Transfer {
        caller: Address,
        from: Address,
        to: Address,
        token: TokenId,
    },
    SafeTransfer {
        caller: Address,
        from: Address,
        to: Address,
        token: TokenId,
        #[serde(default)]
        data: String,
    },
    Burn {
        caller: Address,
        token: TokenId,
    },
    BurnFrom {
        caller: Address,
        owner: Address,
        token: TokenId,
    },
    /// Move the scenario clock forward
    Advance {
        seconds: u64,
    },
}

impl Step {
    /// Action name as written in scenario files
    pub fn action(&self) -> &'static str {
        match self {
            Step::Mint { .. } => "mint",
            Step::Apply { .. } => "apply",
            Step::UploadQms { .. } => "upload_qms",
            Step::Audit { .. } => "audit",
            Step::Approve { .. } => "approve",
            Step::ClearApproval { .. } => "clear_approval",
            Step::SetApprovalForAll { .. } => "set_approval_for_all",
            Step::Transfer { .. } => "transfer",
            Step::SafeTransfer { .. } => "safe_transfer",
            Step::Burn { .. } => "burn",
            Step::BurnFrom { .. } => "burn_from",
            Step::Advance { .. } => "advance",
        }
    }

    /// Identity performing the call, if the action has one
    pub fn caller(&self) -> Option<&Address> {
        match self {
            Step::Apply { caller, .. }
            | Step::UploadQms { caller, .. }
            | Step::Audit { caller, .. }
            | Step::Approve { caller, .. }
            | Step::ClearApproval { caller, .. }
            | Step::SetApprovalForAll { caller, .. }
            | Step::Transfer { caller, .. }
            | Step::SafeTransfer { caller, .. }
            | Step::Burn { caller, .. }
            | Step::BurnFrom { caller, .. } => Some(caller),
            Step::Mint { .. } | Step::Advance { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_toml_str(
            r#"
            name = "demo"
            start_time = 100

            [[receivers]]
            address = "vault"
            answer = "0xdeadbeef"

            [[steps]]
            action = "apply"
            caller = "company"
            standard = "std"
            agency = "agency"
            cost = 10
            auditor = "auditor"

            [[steps]]
            action = "burn"
            caller = "company"
            token = 1
            expect = "REGISTRY_UNAUTHORIZED"
            "#,
        )
        .unwrap();

        assert_eq!(scenario.start_time, Some(100));
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].step.action(), "apply");
        assert_eq!(
            scenario.steps[1],
            StepSpec {
                step: Step::Burn {
                    caller: Address::from("company"),
                    token: TokenId::new(1),
                },
                expect: Some("REGISTRY_UNAUTHORIZED".into()),
            }
        );
        assert!(scenario.receivers[0].build().is_ok());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = Scenario::from_toml_str("[[steps]]\naction = \"mutate\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_ack() {
        assert_eq!(parse_ack("0x150b7a02").unwrap(), [0x15, 0x0b, 0x7a, 0x02]);
        assert!(parse_ack("nope").is_err());
    }
}
