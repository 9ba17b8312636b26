// Health Probe Port (Interface)

use crate::domain::ProbeResponse;
use crate::error::Result;
use async_trait::async_trait;

/// Issues one health-check request
///
/// Transport failures are a normal `ProbeResponse::Transport`, not an `Err`.
/// `Err` is reserved for requests that could not be attempted at all.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeResponse>;
}

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Probe that replays scripted responses, then repeats a fallback
    pub struct ScriptedHealthProbe {
        script: Mutex<VecDeque<ProbeResponse>>,
        fallback: Mutex<ProbeResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedHealthProbe {
        pub fn new(fallback: ProbeResponse) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Mutex::new(fallback),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Always answers `code` quickly
        pub fn always(code: u16) -> Self {
            Self::new(Self::status(code))
        }

        pub fn status(code: u16) -> ProbeResponse {
            ProbeResponse::Status {
                code,
                elapsed: Duration::from_millis(5),
            }
        }

        pub fn push(&self, response: ProbeResponse) {
            self.script.lock().unwrap().push_back(response);
        }

        pub fn set_fallback(&self, response: ProbeResponse) {
            *self.fallback.lock().unwrap() = response;
        }

        /// URLs probed so far, in order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HealthProbe for ScriptedHealthProbe {
        async fn probe(&self, url: &str) -> Result<ProbeResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| self.fallback.lock().unwrap().clone()))
        }
    }
}
