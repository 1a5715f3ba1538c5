use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::application::ports::{
    LlmClient, LlmClientError, TranscriptionEngine, TranscriptionError,
};
use crate::domain::Tag;

/// Transcripts at or under this length are embedded as-is; longer ones are
/// condensed by the generator with minimal semantic loss.
pub const CONDENSE_THRESHOLD: usize = 300;

const MAX_GENERATION_ATTEMPTS: usize = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);
const MAX_TAGS: usize = 3;

/// Turns audio into a transcript, a condensed embedding text, and tags.
///
/// The tagging step consumes a text-generation collaborator whose output is
/// not guaranteed well-formed; each failed parse re-invokes generation (a
/// fresh completion can parse, re-reading the same one cannot) up to a fixed
/// bound with a short backoff.
pub struct TranscriptService<T, L>
where
    T: TranscriptionEngine,
    L: LlmClient,
{
    transcriber: Arc<T>,
    generator: Arc<L>,
}

#[derive(Debug, Clone)]
pub struct TranscriptBundle {
    pub transcript: String,
    /// The generator's condensed text, or the transcript unchanged when it
    /// was already short.
    pub condensed: String,
    pub tags: Vec<Tag>,
}

#[derive(Deserialize)]
struct AnnotationResponse {
    tags: Vec<String>,
    prompt: String,
}

impl<T, L> TranscriptService<T, L>
where
    T: TranscriptionEngine,
    L: LlmClient,
{
    pub fn new(transcriber: Arc<T>, generator: Arc<L>) -> Self {
        Self {
            transcriber,
            generator,
        }
    }

    /// Process one audio stream. `vocabulary` is the distinct set of tags
    /// already present, supplied to bias generation toward reuse.
    pub async fn process(
        &self,
        audio_wav: &[u8],
        vocabulary: &[String],
    ) -> Result<TranscriptBundle, TranscriptError> {
        let transcript = self.transcriber.transcribe(audio_wav).await?;

        tracing::debug!(chars = transcript.len(), "Transcript received");

        let prompt = build_annotation_prompt(&transcript, vocabulary);
        let annotation = self.generate_annotation(&prompt).await?;

        let tags: Vec<Tag> = annotation
            .tags
            .iter()
            .filter_map(|t| Tag::new(t))
            .take(MAX_TAGS)
            .collect();

        Ok(TranscriptBundle {
            transcript,
            condensed: annotation.prompt,
            tags,
        })
    }

    async fn generate_annotation(
        &self,
        prompt: &str,
    ) -> Result<AnnotationResponse, TranscriptError> {
        let mut last_error = TranscriptError::MalformedAnnotation {
            attempts: MAX_GENERATION_ATTEMPTS,
            last_error: "no attempt made".to_string(),
        };

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            match self.generator.generate(prompt).await {
                Ok(raw) => match parse_annotation(&raw) {
                    Ok(annotation) => return Ok(annotation),
                    Err(e) => {
                        tracing::warn!(
                            attempt,
                            error = %e,
                            "Generator returned malformed annotation"
                        );
                        last_error = TranscriptError::MalformedAnnotation {
                            attempts: attempt,
                            last_error: e.to_string(),
                        };
                    }
                },
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Generation call failed");
                    last_error = TranscriptError::Generation(e);
                }
            }

            if attempt < MAX_GENERATION_ATTEMPTS {
                tokio::time::sleep(RETRY_BACKOFF * attempt as u32).await;
            }
        }

        Err(last_error)
    }
}

fn build_annotation_prompt(transcript: &str, vocabulary: &[String]) -> String {
    let known_tags = vocabulary.join(", ");
    format!(
        "Given the following InputPrompt, generate at most {MAX_TAGS} lowercase tags that \
         describe the transcript. Prefer descriptive, situational tags over generic ones; \
         fall back to one of the existing tags when no specific tag fits: {known_tags}. \
         If the InputPrompt is over {CONDENSE_THRESHOLD} characters, condense it with \
         minimal loss of context; otherwise keep it unchanged. Return a JSON object where \
         'tags' is a list of strings and 'prompt' is a string (condensed or original), \
         with no surrounding formatting such as ```json```. InputPrompt: {transcript}"
    )
}

/// Parse the generator's reply as the expected JSON object. Wrapping code
/// fences are stripped first; the model is told not to emit them but does
/// anyway on occasion.
fn parse_annotation(raw: &str) -> Result<AnnotationResponse, serde_json::Error> {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```") {
        text = stripped
            .strip_prefix("json")
            .unwrap_or(stripped)
            .trim_start();
        text = text.strip_suffix("```").unwrap_or(text).trim_end();
    }
    serde_json::from_str(text)
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
    #[error("annotation parsing failed after {attempts} attempts: {last_error}")]
    MalformedAnnotation { attempts: usize, last_error: String },
}
