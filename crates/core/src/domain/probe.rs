// Health Probe Outcome Classification

use std::fmt;
use std::time::Duration;

/// Raw result of one health-check request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResponse {
    /// Connection refused, DNS failure, timeout, TLS error...
    Transport(String),
    /// Any HTTP response, redirects included (they are never followed)
    Status { code: u16, elapsed: Duration },
}

/// Why a probe counts as failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Connection(String),
    ClientError(u16),
    ServerError(u16),
    SlowResponse(Duration),
    UnexpectedStatus(u16),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Connection(reason) => write!(f, "connection error: {reason}"),
            FailureReason::ClientError(code) => write!(f, "client error: {code}"),
            FailureReason::ServerError(code) => write!(f, "server error: {code}"),
            FailureReason::SlowResponse(elapsed) => write!(f, "slow response: {elapsed:?}"),
            FailureReason::UnexpectedStatus(code) => write!(f, "unexpected status: {code}"),
        }
    }
}

/// Classified probe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure(FailureReason),
}

impl ProbeOutcome {
    /// Classify a response
    ///
    /// Order matters: status classes are checked before elapsed time, so a
    /// slow 2xx is still a success and a slow 5xx is still a server error.
    /// Only an otherwise inconclusive status (1xx/3xx) can be "slow".
    pub fn classify(response: &ProbeResponse, slow_threshold: Duration) -> Self {
        match response {
            ProbeResponse::Transport(reason) => {
                ProbeOutcome::Failure(FailureReason::Connection(reason.clone()))
            }
            ProbeResponse::Status { code, elapsed } => match *code {
                200..=299 => ProbeOutcome::Success,
                400..=499 => ProbeOutcome::Failure(FailureReason::ClientError(*code)),
                500..=u16::MAX => ProbeOutcome::Failure(FailureReason::ServerError(*code)),
                _ if *elapsed > slow_threshold => {
                    ProbeOutcome::Failure(FailureReason::SlowResponse(*elapsed))
                }
                _ => ProbeOutcome::Failure(FailureReason::UnexpectedStatus(*code)),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOW: Duration = Duration::from_secs(5);

    fn status(code: u16, millis: u64) -> ProbeResponse {
        ProbeResponse::Status {
            code,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_classify_status_classes() {
        assert_eq!(ProbeOutcome::classify(&status(200, 10), SLOW), ProbeOutcome::Success);
        assert_eq!(ProbeOutcome::classify(&status(204, 10), SLOW), ProbeOutcome::Success);
        assert_eq!(
            ProbeOutcome::classify(&status(404, 10), SLOW),
            ProbeOutcome::Failure(FailureReason::ClientError(404))
        );
        assert_eq!(
            ProbeOutcome::classify(&status(503, 10), SLOW),
            ProbeOutcome::Failure(FailureReason::ServerError(503))
        );
    }

    #[test]
    fn test_classify_transport_error() {
        let outcome =
            ProbeOutcome::classify(&ProbeResponse::Transport("refused".to_string()), SLOW);
        assert_eq!(
            outcome,
            ProbeOutcome::Failure(FailureReason::Connection("refused".to_string()))
        );
    }

    #[test]
    fn test_redirect_is_a_failure() {
        assert_eq!(
            ProbeOutcome::classify(&status(301, 10), SLOW),
            ProbeOutcome::Failure(FailureReason::UnexpectedStatus(301))
        );
    }

    #[test]
    fn test_slow_only_applies_to_inconclusive_status() {
        assert_eq!(
            ProbeOutcome::classify(&status(302, 6_000), SLOW),
            ProbeOutcome::Failure(FailureReason::SlowResponse(Duration::from_millis(6_000)))
        );
        assert_eq!(ProbeOutcome::classify(&status(200, 6_000), SLOW), ProbeOutcome::Success);
        assert_eq!(
            ProbeOutcome::classify(&status(500, 6_000), SLOW),
            ProbeOutcome::Failure(FailureReason::ServerError(500))
        );
    }

    #[test]
    fn test_failure_reason_messages() {
        assert_eq!(FailureReason::ServerError(503).to_string(), "server error: 503");
        assert_eq!(
            FailureReason::Connection("dns".to_string()).to_string(),
            "connection error: dns"
        );
    }
}
