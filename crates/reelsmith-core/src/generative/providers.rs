//! Generative Provider Trait
//!
//! Defines the interface every generation backend implements. Short jobs
//! (images, speech, sound effects) return their artifact directly; long jobs
//! (video, transcription) hand back a task id that is polled to completion.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CoreError, CoreResult, MediaType, TimeSec};

/// Default interval between `get_status` polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// =============================================================================
// Capabilities
// =============================================================================

/// Kind of content a provider can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCapability {
    Image,
    Tts,
    Sfx,
    Video,
    Transcription,
}

impl ProviderCapability {
    pub const ALL: [ProviderCapability; 5] = [
        ProviderCapability::Image,
        ProviderCapability::Tts,
        ProviderCapability::Sfx,
        ProviderCapability::Video,
        ProviderCapability::Transcription,
    ];

    /// Media type of the artifact, if the output is importable media
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            ProviderCapability::Image => Some(MediaType::Image),
            ProviderCapability::Tts | ProviderCapability::Sfx => Some(MediaType::Audio),
            ProviderCapability::Video => Some(MediaType::Video),
            ProviderCapability::Transcription => None,
        }
    }

    /// Whether jobs of this kind are polled by task id
    pub fn is_long_running(&self) -> bool {
        matches!(
            self,
            ProviderCapability::Video | ProviderCapability::Transcription
        )
    }
}

impl fmt::Display for ProviderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCapability::Image => write!(f, "image"),
            ProviderCapability::Tts => write!(f, "tts"),
            ProviderCapability::Sfx => write!(f, "sfx"),
            ProviderCapability::Video => write!(f, "video"),
            ProviderCapability::Transcription => write!(f, "transcription"),
        }
    }
}

impl FromStr for ProviderCapability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(ProviderCapability::Image),
            "tts" | "speech" => Ok(ProviderCapability::Tts),
            "sfx" => Ok(ProviderCapability::Sfx),
            "video" => Ok(ProviderCapability::Video),
            "transcription" => Ok(ProviderCapability::Transcription),
            other => Err(format!("Unknown capability: {}", other)),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a generative provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerativeProviderConfig {
    /// API key (if required)
    pub api_key: Option<String>,
    /// Base URL for API
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_sec: u64,
    /// Maximum retries
    pub max_retries: u32,
    /// Model ID to use
    pub model_id: Option<String>,
    /// Additional provider-specific settings
    pub settings: HashMap<String, serde_json::Value>,
}

impl Default for GenerativeProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_sec: 60,
            max_retries: 3,
            model_id: None,
            settings: HashMap::new(),
        }
    }
}

impl GenerativeProviderConfig {
    /// Creates a new config with API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Sets the model ID
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Sets a custom setting
    pub fn with_setting<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.settings.insert(key.into(), v);
        }
        self
    }

    /// Gets a setting value
    pub fn get_setting<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.settings
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

// =============================================================================
// Requests and Results
// =============================================================================

/// Optional knobs for a generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Requested output length (audio/video)
    pub duration: Option<TimeSec>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Overrides the provider's configured model
    pub model_id: Option<String>,
    /// Provider-specific extras (voice id, seed, style, ...)
    pub extra: HashMap<String, serde_json::Value>,
}

impl GenerationOptions {
    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_extra<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.extra.insert(key.into(), v);
        }
        self
    }
}

/// A finished piece of generated content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    /// Where the content can be fetched (URL or local path)
    pub url: String,
    /// Media type, `None` for text-only output such as transcripts
    pub media_type: Option<MediaType>,
    /// Suggested display name
    pub name: String,
    #[serde(default)]
    pub duration: Option<TimeSec>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Text output (transcription)
    #[serde(default)]
    pub text: Option<String>,
}

impl GeneratedArtifact {
    pub fn media(name: &str, media_type: MediaType, url: &str) -> Self {
        Self {
            url: url.to_string(),
            media_type: Some(media_type),
            name: name.to_string(),
            duration: None,
            width: None,
            height: None,
            text: None,
        }
    }

    pub fn transcript(name: &str, url: &str, text: &str) -> Self {
        Self {
            url: url.to_string(),
            media_type: None,
            name: name.to_string(),
            duration: None,
            width: None,
            height: None,
            text: Some(text.to_string()),
        }
    }

    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Immediate answer to a `generate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub success: bool,
    /// Present when the content is ready now
    pub artifact: Option<GeneratedArtifact>,
    /// Present for jobs that must be polled
    pub task_id: Option<String>,
    pub error: Option<String>,
}

impl GenerationOutcome {
    pub fn completed(artifact: GeneratedArtifact) -> Self {
        Self {
            success: true,
            artifact: Some(artifact),
            task_id: None,
            error: None,
        }
    }

    pub fn pending(task_id: impl Into<String>) -> Self {
        Self {
            success: true,
            artifact: None,
            task_id: Some(task_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            artifact: None,
            task_id: None,
            error: Some(error.into()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.success && self.artifact.is_none() && self.task_id.is_some()
    }

    /// Converts into the artifact, turning failures into errors
    pub fn into_artifact(self) -> CoreResult<GeneratedArtifact> {
        match (self.success, self.artifact, self.task_id) {
            (true, Some(artifact), _) => Ok(artifact),
            (true, None, Some(task_id)) => Err(CoreError::ProviderFailed(format!(
                "task {} has not finished",
                task_id
            ))),
            (_, _, _) => Err(CoreError::ProviderFailed(
                self.error
                    .unwrap_or_else(|| "generation returned no artifact".to_string()),
            )),
        }
    }
}

/// Status of a long-running task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Processing { progress: f32 },
    Completed { artifact: GeneratedArtifact },
    Failed { error: String },
    Cancelled,
}

impl TaskStatus {
    /// Whether the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed { .. } | TaskStatus::Failed { .. } | TaskStatus::Cancelled
        )
    }
}

/// Progress callback for `wait_for_completion`, called with 0.0..=1.0
pub type ProgressFn<'a> = &'a (dyn Fn(f32) + Send + Sync);

// =============================================================================
// Provider Trait
// =============================================================================

/// Trait for generative AI providers
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Returns supported capabilities
    fn capabilities(&self) -> Vec<ProviderCapability>;

    /// Checks if provider supports a capability
    fn supports(&self, capability: ProviderCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Checks if the provider is available (configured correctly)
    fn is_available(&self) -> bool;

    /// Interval used by the default `wait_for_completion`
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Starts a generation job
    async fn generate(
        &self,
        kind: ProviderCapability,
        prompt: &str,
        options: &GenerationOptions,
    ) -> CoreResult<GenerationOutcome>;

    /// Reports the status of a long-running task
    async fn get_status(&self, task_id: &str) -> CoreResult<TaskStatus> {
        Err(CoreError::NotSupported(format!(
            "{} does not track task {}",
            self.name(),
            task_id
        )))
    }

    /// Cancels a long-running task
    async fn cancel(&self, task_id: &str) -> CoreResult<()> {
        Err(CoreError::NotSupported(format!(
            "{} cannot cancel task {}",
            self.name(),
            task_id
        )))
    }

    /// Polls `get_status` until the task is terminal or `timeout` elapses
    async fn wait_for_completion(
        &self,
        task_id: &str,
        on_progress: Option<ProgressFn<'_>>,
        timeout: Duration,
    ) -> CoreResult<GeneratedArtifact> {
        let period = self.poll_interval().max(Duration::from_millis(1));
        let poll = async {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let status = self.get_status(task_id).await;
                debug!("Task {} on {}: {:?}", task_id, self.name(), status);
                match status {
                    Err(e) => return Err(e),
                    Ok(TaskStatus::Queued) => {}
                    Ok(TaskStatus::Processing { progress }) => {
                        if let Some(callback) = on_progress {
                            callback(progress.clamp(0.0, 1.0));
                        }
                    }
                    Ok(TaskStatus::Completed { artifact }) => {
                        if let Some(callback) = on_progress {
                            callback(1.0);
                        }
                        return Ok(artifact);
                    }
                    Ok(TaskStatus::Failed { error }) => {
                        return Err(CoreError::ProviderFailed(error))
                    }
                    Ok(TaskStatus::Cancelled) => {
                        return Err(CoreError::Cancelled(format!("task {}", task_id)))
                    }
                }
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout(format!(
                "task {} on {} did not finish within {:?}",
                task_id,
                self.name(),
                timeout
            ))),
        }
    }
}

// =============================================================================
// Mock Provider for Testing
// =============================================================================

#[derive(Debug)]
struct MockTask {
    kind: ProviderCapability,
    prompt: String,
    polls: u32,
    cancelled: bool,
}

/// Mock provider for testing
///
/// Image, TTS and SFX complete immediately. Video and transcription return a
/// task that reports `Processing` for `steps` polls before completing.
#[derive(Debug)]
pub struct MockGenerativeProvider {
    name: String,
    capabilities: Vec<ProviderCapability>,
    available: bool,
    steps: u32,
    fail_with: Option<String>,
    poll_interval: Duration,
    tasks: Mutex<HashMap<String, MockTask>>,
}

impl MockGenerativeProvider {
    /// Creates a new mock provider
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: ProviderCapability::ALL.to_vec(),
            available: true,
            steps: 2,
            fail_with: None,
            poll_interval: Duration::from_millis(5),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Sets capabilities
    pub fn with_capabilities(mut self, caps: Vec<ProviderCapability>) -> Self {
        self.capabilities = caps;
        self
    }

    /// Number of `Processing` polls before a task completes
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Makes every request fail with the given message
    pub fn failing(mut self, error: impl Into<String>) -> Self {
        self.fail_with = Some(error.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn artifact(
        kind: ProviderCapability,
        prompt: &str,
        options: &GenerationOptions,
    ) -> GeneratedArtifact {
        let slug: String = prompt
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .take(24)
            .collect::<String>()
            .trim()
            .replace(' ', "-")
            .to_ascii_lowercase();
        let id = crate::new_id();

        match kind.media_type() {
            Some(MediaType::Image) => GeneratedArtifact::media(
                prompt,
                MediaType::Image,
                &format!("mock://image/{}-{}.png", slug, id),
            )
            .with_size(options.width.unwrap_or(1024), options.height.unwrap_or(1024)),
            Some(MediaType::Audio) => {
                let duration = options
                    .duration
                    .unwrap_or_else(|| (prompt.len() as f64 * 0.05).max(1.0));
                GeneratedArtifact::media(
                    prompt,
                    MediaType::Audio,
                    &format!("mock://{}/{}-{}.mp3", kind, slug, id),
                )
                .with_duration(duration)
            }
            Some(MediaType::Video) => GeneratedArtifact::media(
                prompt,
                MediaType::Video,
                &format!("mock://video/{}-{}.mp4", slug, id),
            )
            .with_duration(options.duration.unwrap_or(5.0))
            .with_size(options.width.unwrap_or(1920), options.height.unwrap_or(1080)),
            None => GeneratedArtifact::transcript(
                "Transcript",
                &format!("mock://transcription/{}.txt", id),
                prompt,
            ),
        }
    }

    fn lock_tasks(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, MockTask>>> {
        self.tasks
            .lock()
            .map_err(|_| CoreError::ProviderFailed("mock task table poisoned".to_string()))
    }
}

#[async_trait]
impl GenerativeProvider for MockGenerativeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Vec<ProviderCapability> {
        self.capabilities.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn generate(
        &self,
        kind: ProviderCapability,
        prompt: &str,
        options: &GenerationOptions,
    ) -> CoreResult<GenerationOutcome> {
        if !self.supports(kind) {
            return Err(CoreError::NotSupported(format!(
                "{} does not support {}",
                self.name, kind
            )));
        }
        if let Some(error) = &self.fail_with {
            return Ok(GenerationOutcome::failed(error.clone()));
        }
        if !kind.is_long_running() {
            return Ok(GenerationOutcome::completed(Self::artifact(
                kind, prompt, options,
            )));
        }

        let task_id = crate::new_id();
        self.lock_tasks()?.insert(
            task_id.clone(),
            MockTask {
                kind,
                prompt: prompt.to_string(),
                polls: 0,
                cancelled: false,
            },
        );
        Ok(GenerationOutcome::pending(task_id))
    }

    async fn get_status(&self, task_id: &str) -> CoreResult<TaskStatus> {
        let mut tasks = self.lock_tasks()?;
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| CoreError::ProviderFailed(format!("unknown task {}", task_id)))?;

        if task.cancelled {
            return Ok(TaskStatus::Cancelled);
        }
        task.polls += 1;
        if task.polls <= self.steps {
            return Ok(TaskStatus::Processing {
                progress: task.polls as f32 / (self.steps as f32 + 1.0),
            });
        }
        Ok(TaskStatus::Completed {
            artifact: Self::artifact(task.kind, &task.prompt, &GenerationOptions::default()),
        })
    }

    async fn cancel(&self, task_id: &str) -> CoreResult<()> {
        let mut tasks = self.lock_tasks()?;
        match tasks.get_mut(task_id) {
            Some(task) => {
                task.cancelled = true;
                Ok(())
            }
            None => Err(CoreError::ProviderFailed(format!("unknown task {}", task_id))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_capability_display_and_parse() {
        assert_eq!(ProviderCapability::Tts.to_string(), "tts");
        assert_eq!(
            "Transcription".parse::<ProviderCapability>().unwrap(),
            ProviderCapability::Transcription
        );
        assert!("hologram".parse::<ProviderCapability>().is_err());

        let json = serde_json::to_string(&ProviderCapability::Sfx).unwrap();
        assert_eq!(json, "\"sfx\"");
    }

    #[test]
    fn test_capability_media_types() {
        assert_eq!(ProviderCapability::Image.media_type(), Some(MediaType::Image));
        assert_eq!(ProviderCapability::Sfx.media_type(), Some(MediaType::Audio));
        assert_eq!(ProviderCapability::Transcription.media_type(), None);
        assert!(ProviderCapability::Video.is_long_running());
        assert!(!ProviderCapability::Tts.is_long_running());
    }

    #[test]
    fn test_provider_config() {
        let config = GenerativeProviderConfig::with_api_key("sk-test")
            .with_model("model-x")
            .with_setting("voice", "narrator");

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model_id.as_deref(), Some("model-x"));
        assert_eq!(config.get_setting::<String>("voice").as_deref(), Some("narrator"));
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_outcome_into_artifact() {
        let artifact = GeneratedArtifact::media("x", MediaType::Image, "mock://x.png");
        assert_eq!(
            GenerationOutcome::completed(artifact.clone())
                .into_artifact()
                .unwrap(),
            artifact
        );

        let err = GenerationOutcome::failed("quota").into_artifact().unwrap_err();
        assert_eq!(err.to_string(), "Provider request failed: quota");
        assert!(GenerationOutcome::pending("t1").is_pending());
        assert!(GenerationOutcome::pending("t1").into_artifact().is_err());
    }

    #[test]
    fn test_task_status_terminal() {
        assert!(!TaskStatus::Queued.is_terminal());
        assert!(!TaskStatus::Processing { progress: 0.5 }.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(TaskStatus::Failed {
            error: "x".into()
        }
        .is_terminal());
    }

    #[tokio::test]
    async fn test_mock_immediate_generation() {
        let provider = MockGenerativeProvider::new("mock");
        let outcome = provider
            .generate(
                ProviderCapability::Tts,
                "Welcome to the show",
                &GenerationOptions::default().with_duration(3.0),
            )
            .await
            .unwrap();

        assert!(outcome.success);
        let artifact = outcome.artifact.unwrap();
        assert_eq!(artifact.media_type, Some(MediaType::Audio));
        assert_eq!(artifact.duration, Some(3.0));
    }

    #[tokio::test]
    async fn test_mock_unsupported_capability() {
        let provider = MockGenerativeProvider::new("images-only")
            .with_capabilities(vec![ProviderCapability::Image]);

        let err = provider
            .generate(ProviderCapability::Video, "a cat", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotSupported(_)));
    }

    #[tokio::test]
    async fn test_mock_failure_is_soft() {
        let provider = MockGenerativeProvider::new("mock").failing("rate limited");
        let outcome = provider
            .generate(ProviderCapability::Image, "sunset", &GenerationOptions::default())
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn test_wait_for_completion_reports_progress() {
        let provider = MockGenerativeProvider::new("mock").with_steps(3);
        let outcome = provider
            .generate(ProviderCapability::Video, "drone shot", &GenerationOptions::default())
            .await
            .unwrap();
        let task_id = outcome.task_id.unwrap();

        let calls = AtomicUsize::new(0);
        let on_progress = |p: f32| {
            assert!((0.0..=1.0).contains(&p));
            calls.fetch_add(1, Ordering::SeqCst);
        };
        let artifact = provider
            .wait_for_completion(&task_id, Some(&on_progress), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(artifact.media_type, Some(MediaType::Video));
        // three processing polls plus the final 1.0
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_wait_for_completion_times_out() {
        let provider = MockGenerativeProvider::new("slow")
            .with_steps(u32::MAX)
            .with_poll_interval(Duration::from_millis(5));
        let task_id = provider
            .generate(ProviderCapability::Video, "long take", &GenerationOptions::default())
            .await
            .unwrap()
            .task_id
            .unwrap();

        let err = provider
            .wait_for_completion(&task_id, None, Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancelled_task_stops_waiting() {
        let provider = MockGenerativeProvider::new("mock").with_steps(10);
        let task_id = provider
            .generate(ProviderCapability::Transcription, "hello", &GenerationOptions::default())
            .await
            .unwrap()
            .task_id
            .unwrap();

        provider.cancel(&task_id).await.unwrap();
        let err = provider
            .wait_for_completion(&task_id, None, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled(_)));
        assert!(provider.cancel("nope").await.is_err());
    }

    struct ImmediateOnly;

    #[async_trait]
    impl GenerativeProvider for ImmediateOnly {
        fn name(&self) -> &str {
            "immediate"
        }

        fn capabilities(&self) -> Vec<ProviderCapability> {
            vec![ProviderCapability::Image]
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _kind: ProviderCapability,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> CoreResult<GenerationOutcome> {
            Ok(GenerationOutcome::failed("offline"))
        }
    }

    #[tokio::test]
    async fn test_default_task_methods_not_supported() {
        let provider = ImmediateOnly;
        assert!(matches!(
            provider.get_status("t").await,
            Err(CoreError::NotSupported(_))
        ));
        assert!(matches!(
            provider.cancel("t").await,
            Err(CoreError::NotSupported(_))
        ));
        assert!(matches!(
            provider
                .wait_for_completion("t", None, Duration::from_secs(1))
                .await,
            Err(CoreError::NotSupported(_))
        ));
    }
}
