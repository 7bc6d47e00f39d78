//! Scenario outcomes, the run summary and the response assertions scenarios share.

use omrs_client::ApiResponse;
use std::fmt;

const SNIPPET_LEN: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    /// The server failed in a way it is known to fail (HTTP 500 instead of a rejection).
    ExpectedFailure(String),
    Skipped(String),
}

impl Outcome {
    /// Collapse a scenario body's result: an error is a failure with its full context chain.
    pub fn from_result(result: anyhow::Result<Outcome>) -> Self {
        result.unwrap_or_else(|e| Outcome::Failed(format!("{e:#}")))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed(_) => "FAIL",
            Outcome::ExpectedFailure(_) => "XFAIL",
            Outcome::Skipped(_) => "SKIP",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(r) | Outcome::ExpectedFailure(r) | Outcome::Skipped(r) => Some(r),
        }
    }
}

/// Tally of a suite run.
#[derive(Debug, Default)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
    pub skipped: usize,
    pub failures: Vec<(String, String)>,
}

impl Summary {
    pub fn record(&mut self, name: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push((name.to_owned(), reason.clone()));
            }
            Outcome::ExpectedFailure(_) => self.expected_failures += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.expected_failures + self.skipped
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scenarios: {} passed, {} failed, {} expected failures, {} skipped",
            self.total(),
            self.passed,
            self.failed,
            self.expected_failures,
            self.skipped
        )?;
        for (name, reason) in &self.failures {
            write!(f, "\n  FAIL {name}: {reason}")?;
        }
        Ok(())
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        text.to_owned()
    } else {
        let cut: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{cut}…")
    }
}

pub fn expect_status(response: &ApiResponse, allowed: &[u16]) -> anyhow::Result<()> {
    anyhow::ensure!(
        allowed.contains(&response.status_code()),
        "expected status {allowed:?}, got {}: {}",
        response.status_code(),
        snippet(&response.body)
    );
    Ok(())
}

/// The lowercased error text must contain at least one of `keys`.
pub fn expect_mentions(response: &ApiResponse, keys: &[&str]) -> anyhow::Result<()> {
    let text = response.error_text();
    anyhow::ensure!(
        keys.iter().any(|k| text.contains(k)),
        "response mentions none of {keys:?}: {}",
        snippet(&text)
    );
    Ok(())
}

/// `Some(ExpectedFailure)` when the server answered 500.
pub fn server_error(response: &ApiResponse) -> Option<Outcome> {
    (response.status_code() == 500).then(|| {
        Outcome::ExpectedFailure(format!("server error: {}", snippet(&response.body)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use omrs_client::StatusCode;

    fn response(code: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(code).unwrap(),
            body: body.to_owned(),
        }
    }

    #[test]
    fn test_summary_counts_and_success() {
        let mut summary = Summary::default();
        summary.record("a", &Outcome::Passed);
        summary.record("b", &Outcome::Skipped("no user".into()));
        summary.record("c", &Outcome::ExpectedFailure("500".into()));
        assert!(summary.is_success());
        summary.record("d", &Outcome::Failed("boom".into()));
        assert!(!summary.is_success());
        assert_eq!(summary.total(), 4);
        let text = summary.to_string();
        assert!(text.starts_with("4 scenarios: 1 passed, 1 failed"));
        assert!(text.contains("FAIL d: boom"));
    }

    #[test]
    fn test_error_becomes_failure() {
        let outcome = Outcome::from_result(Err(anyhow::anyhow!("no patient")));
        assert_eq!(outcome, Outcome::Failed("no patient".into()));
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_response_assertions() {
        let rejected = response(400, r#"{"error":{"message":"[Visit overlaps]","code":400}}"#);
        assert!(expect_status(&rejected, &[400, 500]).is_ok());
        assert!(expect_status(&rejected, &[201]).is_err());
        assert!(expect_mentions(&rejected, &["overlap"]).is_ok());
        assert!(expect_mentions(&rejected, &["privilege"]).is_err());
        assert!(server_error(&rejected).is_none());
        assert!(matches!(
            server_error(&response(500, "oops")),
            Some(Outcome::ExpectedFailure(_))
        ));
    }
}
