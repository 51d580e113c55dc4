//! Validator doubles for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::validator::{CredentialValidator, ValidationError, ValidationOptions};

/// Records every call and answers with a fixed outcome.
pub struct RecordingValidator {
    outcome: Result<(), ValidationError>,
    calls: Mutex<Vec<(String, ValidationOptions)>>,
}

impl RecordingValidator {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(error: ValidationError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, ValidationOptions)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CredentialValidator for RecordingValidator {
    async fn validate(
        &self,
        token: &str,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        self.calls.lock().push((token.to_string(), options.clone()));
        self.outcome.clone()
    }
}

/// Never completes; used to exercise the gate's timeout.
pub struct HangingValidator;

#[async_trait]
impl CredentialValidator for HangingValidator {
    async fn validate(
        &self,
        _token: &str,
        _options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        std::future::pending().await
    }
}
