use crate::CompleteError;
use std::thread;
use std::time::Duration;
use ureq::{Agent, Error as UreqError};

const TIMEOUT_GLOBAL: Duration = Duration::from_secs(120);
const TIMEOUT_PER_CALL: Duration = Duration::from_secs(90);
const TIMEOUT_RESOLVE: Duration = Duration::from_secs(5);
const TIMEOUT_CONNECT: Duration = Duration::from_secs(5);
const TIMEOUT_SEND_REQUEST: Duration = Duration::from_secs(5);
const TIMEOUT_SEND_BODY: Duration = Duration::from_secs(15);
const TIMEOUT_RECV_RESPONSE: Duration = Duration::from_secs(60);
const TIMEOUT_RECV_BODY: Duration = Duration::from_secs(60);

const RETRY_BASE_MS: u64 = 200;
const MAX_RETRIES: usize = 2;

pub fn default_agent() -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(TIMEOUT_GLOBAL))
        .timeout_per_call(Some(TIMEOUT_PER_CALL))
        .timeout_resolve(Some(TIMEOUT_RESOLVE))
        .timeout_connect(Some(TIMEOUT_CONNECT))
        .timeout_send_request(Some(TIMEOUT_SEND_REQUEST))
        .timeout_send_body(Some(TIMEOUT_SEND_BODY))
        .timeout_recv_response(Some(TIMEOUT_RECV_RESPONSE))
        .timeout_recv_body(Some(TIMEOUT_RECV_BODY))
        .build();
    config.into()
}

pub fn should_retry(err: &UreqError) -> bool {
    match err {
        UreqError::StatusCode(code) => *code == 429 || (500..=599).contains(code),
        UreqError::Timeout(_)
        | UreqError::Io(_)
        | UreqError::HostNotFound
        | UreqError::ConnectionFailed => true,
        _ => false,
    }
}

pub fn retry_delay(attempt: usize) -> Duration {
    let shift = attempt.min(6) as u32;
    let delay = RETRY_BASE_MS.saturating_mul(1_u64 << shift);
    Duration::from_millis(delay)
}

/// POST a JSON body and return the raw response text, retrying transient
/// failures up to `MAX_RETRIES` times.
pub fn post_json(
    agent: &Agent,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
) -> Result<String, CompleteError> {
    let mut attempt = 0;
    loop {
        let mut request = agent.post(url);
        if let Some(token) = bearer {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        match request.send_json(body) {
            Ok(response) => {
                return response
                    .into_body()
                    .read_to_string()
                    .map_err(|e| CompleteError::Network(format!("{e}")));
            }
            Err(err) => {
                if should_retry(&err) && attempt < MAX_RETRIES {
                    let delay = retry_delay(attempt);
                    tracing::debug!(%url, attempt, ?delay, error = %err, "retrying request");
                    thread::sleep(delay);
                    attempt += 1;
                    continue;
                }
                return Err(CompleteError::Network(format!("{err}")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_rate_limits_and_server_errors() {
        assert!(should_retry(&UreqError::StatusCode(429)));
        assert!(should_retry(&UreqError::StatusCode(503)));
        assert!(should_retry(&UreqError::ConnectionFailed));
        assert!(!should_retry(&UreqError::StatusCode(401)));
        assert!(!should_retry(&UreqError::StatusCode(400)));
    }

    #[test]
    fn retry_delay_backs_off_and_caps() {
        assert_eq!(retry_delay(0), Duration::from_millis(200));
        assert_eq!(retry_delay(1), Duration::from_millis(400));
        assert_eq!(retry_delay(6), retry_delay(20));
    }
}
