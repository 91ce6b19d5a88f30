//! A validated credential bound to one model gateway.

use crate::config::ModelSettings;
use crate::error::{ClipwiseError, Result};
use crate::gateway::{ModelGateway, OpenAiGateway};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One validated credential and the gateway built from it.
///
/// A session only exists once its credential has been checked against the
/// backend. The gateway is never swapped out; a new credential means a new
/// session.
pub struct Session {
    credential: String,
    gateway: Arc<dyn ModelGateway>,
}

impl Session {
    /// Validate an API key against the OpenAI backend.
    #[instrument(skip_all)]
    pub async fn validate(credential: &str, settings: &ModelSettings) -> Result<Self> {
        let credential = non_empty(credential)?;
        let gateway = OpenAiGateway::new(credential, settings)?;
        Self::validate_with(credential, Arc::new(gateway), &settings.validation_prompt).await
    }

    /// Validate a credential using an already constructed gateway.
    ///
    /// Issues `probe` once; any failure means no session is created.
    pub async fn validate_with(
        credential: &str,
        gateway: Arc<dyn ModelGateway>,
        probe: &str,
    ) -> Result<Self> {
        let credential = non_empty(credential)?;

        if let Err(e) = gateway.generate(probe).await {
            warn!("Credential validation failed: {}", e);
            return Err(ClipwiseError::Session(format!("Invalid API key: {}", e)));
        }

        info!("Session established for {}", mask(credential));
        Ok(Self {
            credential: credential.to_string(),
            gateway,
        })
    }

    /// Shared handle to this session's gateway.
    pub fn gateway(&self) -> Arc<dyn ModelGateway> {
        self.gateway.clone()
    }

    /// Credential with all but its edges hidden, for display.
    pub fn masked_credential(&self) -> String {
        mask(&self.credential)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.masked_credential())
            .finish_non_exhaustive()
    }
}

fn non_empty(credential: &str) -> Result<&str> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(ClipwiseError::Validation(
            "Please enter an API key".to_string(),
        ));
    }
    Ok(credential)
}

/// Mask a credential as `sk-abcd...wxyz`.
pub fn mask(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
