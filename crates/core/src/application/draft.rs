// Draft Service - model id to finished text

use crate::application::BinaryLocator;
use crate::domain::{InvocationRequest, Model};
use crate::error::{AppError, Result};
use crate::port::ProcessRunner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// What to draft, and with which model
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub model_id: String,
    /// Fully built prompt text
    pub prompt: String,
}

/// Dispatches a prompt to the CLI that serves the chosen model
pub struct DraftService {
    runner: Arc<dyn ProcessRunner>,
    locator: BinaryLocator,
    timeout: Duration,
}

impl DraftService {
    pub fn new(runner: Arc<dyn ProcessRunner>, locator: BinaryLocator, timeout: Duration) -> Self {
        Self {
            runner,
            locator,
            timeout,
        }
    }

    /// Build the invocation for a request without running it
    pub fn plan(&self, req: &DraftRequest) -> Result<InvocationRequest> {
        if req.prompt.trim().is_empty() {
            return Err(AppError::Validation("Prompt is empty".to_string()));
        }
        let model = Model::find(&req.model_id)
            .ok_or_else(|| AppError::UnknownModel(req.model_id.clone()))?;
        let spec = model.spec();

        let executable = self.locator.resolve(spec);
        let (args, input) = spec.build_invocation(model.id, &req.prompt);

        let mut request = InvocationRequest::new(executable, args).with_timeout(self.timeout);
        if let Some(input) = input {
            request = request.with_input(input);
        }
        Ok(request)
    }

    /// Run the model and return its trimmed output
    pub async fn draft(&self, req: DraftRequest) -> Result<String> {
        let request = self.plan(&req)?;

        info!(
            model = %req.model_id,
            executable = %request.executable_path.display(),
            uses_stdin = request.input.is_some(),
            "Drafting"
        );

        match self.runner.execute(request).await {
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(model = %req.model_id, kind = %e.kind(), "Draft failed");
                Err(e.into())
            }
        }
    }
}
