//! Provider Registry
//!
//! Capability → provider lookup. Built once at startup and handed to whoever
//! needs to generate content.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::providers::{
    GeneratedArtifact, GenerationOptions, GenerativeProvider, GenerativeProviderConfig,
    ProviderCapability,
};
use crate::settings::AppSettings;
use crate::{CoreError, CoreResult};

/// Wait budget for long-running jobs when none is configured
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Registered providers plus per-capability defaults
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn GenerativeProvider>>,
    defaults: HashMap<ProviderCapability, String>,
    timeout: Duration,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            defaults: HashMap::new(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from persisted settings.
    ///
    /// `build` turns each configured provider entry into an adapter; entries
    /// it returns `None` for are skipped. Default providers and the wait
    /// timeout come from the generation section.
    pub fn from_settings<F>(settings: &AppSettings, build: F) -> Self
    where
        F: Fn(&str, &GenerativeProviderConfig) -> Option<Arc<dyn GenerativeProvider>>,
    {
        let mut registry = Self::new().with_timeout(settings.generation.timeout());

        let mut entries: Vec<_> = settings.providers.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (name, config) in entries {
            match build(name, config) {
                Some(provider) => registry.register(provider),
                None => warn!("No adapter for configured provider {}", name),
            }
        }

        registry.apply_defaults(&settings.generation.default_providers);
        registry
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long `generate` waits for long-running jobs
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers a provider, replacing any provider with the same name
    pub fn register(&mut self, provider: Arc<dyn GenerativeProvider>) {
        let name = provider.name().to_string();
        match self.providers.iter().position(|p| p.name() == name) {
            Some(index) => {
                debug!("Replacing provider {}", name);
                self.providers[index] = provider;
            }
            None => {
                debug!("Registering provider {}", name);
                self.providers.push(provider);
            }
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Makes `name` the preferred provider for `capability`
    pub fn set_default(&mut self, capability: ProviderCapability, name: &str) -> CoreResult<()> {
        let provider = self
            .get(name)
            .ok_or_else(|| CoreError::NoProvider(name.to_string()))?;
        if !provider.supports(capability) {
            return Err(CoreError::NotSupported(format!(
                "{} does not support {}",
                name, capability
            )));
        }
        self.defaults.insert(capability, name.to_string());
        Ok(())
    }

    /// Applies configured defaults, skipping entries that do not resolve
    pub fn apply_defaults(&mut self, defaults: &HashMap<ProviderCapability, String>) {
        for (capability, name) in defaults {
            if let Err(e) = self.set_default(*capability, name) {
                warn!("Ignoring default provider for {}: {}", capability, e);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn GenerativeProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// Resolves the provider for a capability: the configured default if it
    /// is available, else the first available provider that supports it
    pub fn provider_for(
        &self,
        capability: ProviderCapability,
    ) -> CoreResult<Arc<dyn GenerativeProvider>> {
        if let Some(provider) = self.defaults.get(&capability).and_then(|n| self.get(n)) {
            if provider.is_available() {
                return Ok(provider);
            }
            warn!(
                "Default {} provider {} is unavailable, falling back",
                capability,
                provider.name()
            );
        }

        self.providers
            .iter()
            .find(|p| p.is_available() && p.supports(capability))
            .cloned()
            .ok_or_else(|| CoreError::NoProvider(capability.to_string()))
    }

    /// Names of all registered providers, in registration order
    pub fn list_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Capabilities covered by at least one available provider
    pub fn capabilities(&self) -> Vec<ProviderCapability> {
        ProviderCapability::ALL
            .into_iter()
            .filter(|c| self.provider_for(*c).is_ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Runs a generation to a terminal artifact within the registry timeout
    pub async fn generate(
        &self,
        capability: ProviderCapability,
        prompt: &str,
        options: &GenerationOptions,
    ) -> CoreResult<GeneratedArtifact> {
        self.generate_with_timeout(capability, prompt, options, self.timeout)
            .await
    }

    /// Runs a generation to a terminal artifact.
    ///
    /// Long-running jobs are polled until done; if `timeout` elapses the task
    /// is cancelled on a best-effort basis and `Timeout` is returned.
    pub async fn generate_with_timeout(
        &self,
        capability: ProviderCapability,
        prompt: &str,
        options: &GenerationOptions,
        timeout: Duration,
    ) -> CoreResult<GeneratedArtifact> {
        let provider = self.provider_for(capability)?;
        info!("Generating {} with {}", capability, provider.name());

        let outcome = provider.generate(capability, prompt, options).await?;
        let task_id = match outcome.task_id.clone() {
            Some(task_id) if outcome.is_pending() => task_id,
            _ => return outcome.into_artifact(),
        };

        match provider.wait_for_completion(&task_id, None, timeout).await {
            Err(CoreError::Timeout(msg)) => {
                if let Err(e) = provider.cancel(&task_id).await {
                    warn!("Failed to cancel timed out task {}: {}", task_id, e);
                }
                Err(CoreError::Timeout(msg))
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list_providers())
            .field("defaults", &self.defaults)
            .field("timeout", &self.timeout)
            .finish()
    }
}
