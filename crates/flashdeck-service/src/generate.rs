//! Flashcard generation behind `/generate_flashcards`.
//!
//! A [`CompletionBackend`] turns a prompt into raw model text; [`extract_cards`]
//! recovers question/answer pairs from that text. Without an API key the
//! [`OfflineBackend`] serves canned decks so the rest of the system keeps working.

use std::time::Duration;

use async_trait::async_trait;
use flashdeck_core::flashcard::{GenerateRequest, GeneratedCard};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";

const JSON_INSTRUCTIONS: &str = "You are a flashcard generator. \
Return ONLY valid JSON: a list of objects with keys 'question' and 'answer'. \
No markdown, no commentary, no extra keys. Example: \
[{\"question\":\"Q1\",\"answer\":\"A1\"},{\"question\":\"Q2\",\"answer\":\"A2\"}]";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("model response was not a card list: {0}")]
    Parse(String),

    #[error("model returned no usable flashcards")]
    Empty,
}

/// Produces raw model output for a generation prompt.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(
        &self,
        request: &GenerateRequest,
        prompt: &str,
    ) -> Result<String, GenerateError>;
}

/// Deterministic decks, picked by topic keyword.
pub struct OfflineBackend;

impl OfflineBackend {
    pub fn deck_for(topic: &str) -> Vec<GeneratedCard> {
        let lower = topic.to_lowercase();
        let is_js = lower.contains("javascript")
            || lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == "js");

        let pairs: Vec<(String, String)> = if lower.contains("python") {
            vec![
                ("What is Python?".into(), "A high-level programming language.".into()),
                ("How to print in Python?".into(), "Use print('text')".into()),
                ("Python file extension?".into(), ".py".into()),
            ]
        } else if is_js {
            vec![
                (
                    "What is JavaScript?".into(),
                    "A programming language for web development.".into(),
                ),
                ("How to print in JavaScript?".into(), "console.log('text')".into()),
                ("JavaScript file extension?".into(), ".js".into()),
            ]
        } else {
            let topic = topic.trim();
            vec![
                (format!("{topic}: What is it?"), "A brief introduction topic.".into()),
                (format!("{topic}: Basic usage?"), "A simple, beginner-level example.".into()),
                (format!("{topic}: Key concept?"), "One important idea to remember.".into()),
            ]
        };

        pairs
            .into_iter()
            .map(|(question, answer)| GeneratedCard { question, answer })
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(
        &self,
        request: &GenerateRequest,
        _prompt: &str,
    ) -> Result<String, GenerateError> {
        serde_json::to_string(&Self::deck_for(&request.topic))
            .map_err(|e| GenerateError::Parse(e.to_string()))
    }
}

/// OpenAI-compatible chat-completions client.
///
/// Transport, status, and decode failures fall back to the offline deck
/// for the requested topic.
pub struct ChatCompletionsBackend {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsBackend {
    pub fn new(
        url: &str,
        api_key: String,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Upstream(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    async fn request_completion(&self, prompt: &str) -> Result<String, GenerateError> {
        let payload = json!({
            "model": self.model,
            "temperature": 0.1,
            "max_tokens": 800,
            "messages": [
                { "role": "system", "content": JSON_INSTRUCTIONS },
                { "role": "user", "content": prompt },
            ],
        });

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerateError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| GenerateError::Upstream(e.to_string()))?;

        let body: Value = resp
            .json()
            .await
            .map_err(|e| GenerateError::Upstream(format!("json decode: {e}")))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GenerateError::Upstream("missing message content".into()))
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(
        &self,
        request: &GenerateRequest,
        prompt: &str,
    ) -> Result<String, GenerateError> {
        match self.request_completion(prompt).await {
            Ok(content) => Ok(content),
            Err(e) => {
                warn!("completion API unavailable, using offline deck: {e}");
                OfflineBackend.complete(request, prompt).await
            }
        }
    }
}

pub fn build_prompt(topic: &str, n: u32) -> String {
    format!(
        "{JSON_INSTRUCTIONS}\n\
         Topic: \"{topic}\"\n\
         Count: {n}\n\
         Constraints:\n\
         - Each question must be short and beginner-friendly.\n\
         - Each answer must be concise (<= 120 chars).\n\
         - DO NOT include anything except the JSON array.\n"
    )
}

/// Recover question/answer pairs from raw model output.
///
/// Tries the slice between the first `[` and the last `]` as a JSON array
/// (tolerating reasoning preambles), then `Q:` / `A:` line pairs.
/// Array entries without string `question` and `answer` are dropped.
pub fn extract_cards(raw: &str) -> Result<Vec<GeneratedCard>, GenerateError> {
    let (start, end) = match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            let pairs = parse_qa_lines(raw);
            if pairs.is_empty() {
                return Err(GenerateError::Parse(
                    "no JSON array or Q/A pairs found".into(),
                ));
            }
            return Ok(pairs);
        }
    };

    let items: Vec<Value> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| GenerateError::Parse(e.to_string()))?;

    let cards = items
        .into_iter()
        .filter_map(|item| {
            let question = item["question"].as_str().map(str::trim).unwrap_or_default();
            let answer = item["answer"].as_str().map(str::trim).unwrap_or_default();
            if question.is_empty() || answer.is_empty() {
                warn!("skipping malformed generated card: {item}");
                return None;
            }
            Some(GeneratedCard {
                question: question.to_string(),
                answer: answer.to_string(),
            })
        })
        .collect();
    Ok(cards)
}

fn parse_qa_lines(raw: &str) -> Vec<GeneratedCard> {
    let mut cards = Vec::new();
    let mut question: Option<String> = None;
    let mut answer: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Q:") {
            if let (Some(q), Some(a)) = (question.take(), answer.take()) {
                push_pair(&mut cards, q, a);
            }
            question = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("A:") {
            answer = Some(rest.trim().to_string());
        }
    }
    if let (Some(q), Some(a)) = (question, answer) {
        push_pair(&mut cards, q, a);
    }
    cards
}

fn push_pair(cards: &mut Vec<GeneratedCard>, question: String, answer: String) {
    if !question.is_empty() && !answer.is_empty() {
        cards.push(GeneratedCard { question, answer });
    }
}

/// Run one generation: prompt, complete, parse, cap at `request.n`.
pub async fn generate_cards(
    backend: &dyn CompletionBackend,
    request: &GenerateRequest,
) -> Result<Vec<GeneratedCard>, GenerateError> {
    let prompt = build_prompt(&request.topic, request.n);
    let raw = backend.complete(request, &prompt).await?;
    let preview: String = raw.chars().take(500).collect();
    info!(backend = backend.name(), "raw model response (truncated): {preview}");

    let mut cards = extract_cards(&raw)?;
    cards.truncate(request.n as usize);
    if cards.is_empty() {
        return Err(GenerateError::Empty);
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedBackend(&'static str);

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            _request: &GenerateRequest,
            _prompt: &str,
        ) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn extract_plain_array() {
        let cards = extract_cards(r#"[{"question":"Q1","answer":"A1"},{"question":"Q2","answer":"A2"}]"#)
            .unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].question, "Q2");
    }

    #[test]
    fn extract_array_after_reasoning_preamble() {
        let raw = "<think>the user wants [two] cards</think>\n\
                   [{\"question\":\"Q1\",\"answer\":\"A1\"}]";
        // The first '[' is inside the preamble, so the slice is not valid JSON.
        assert!(matches!(extract_cards(raw), Err(GenerateError::Parse(_))));

        let raw = "<think>thinking...</think>\n[{\"question\":\"Q1\",\"answer\":\"A1\"}] done";
        let cards = extract_cards(raw).unwrap();
        assert_eq!(cards, vec![GeneratedCard { question: "Q1".into(), answer: "A1".into() }]);
    }

    #[test]
    fn extract_skips_malformed_items() {
        let raw = r#"[{"question":"Q1"},{"question":"Q2","answer":"A2","extra":1},{"question":" ","answer":"x"},42]"#;
        let cards = extract_cards(raw).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].answer, "A2");
    }

    #[test]
    fn extract_qa_lines() {
        let raw = "Here you go:\nQ: What is 2+2?\nA: 4\n\n  Q: Capital of France?\n  A: Paris\nQ: dangling";
        let cards = extract_cards(raw).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is 2+2?");
        assert_eq!(cards[1].answer, "Paris");
    }

    #[test]
    fn extract_gives_up_on_prose() {
        assert!(matches!(
            extract_cards("I cannot help with that."),
            Err(GenerateError::Parse(_))
        ));
    }

    #[test]
    fn offline_deck_matches_topic_keywords() {
        assert_eq!(OfflineBackend::deck_for("Python basics")[2].answer, ".py");
        assert_eq!(OfflineBackend::deck_for("Intro to JS")[2].answer, ".js");
        assert_eq!(OfflineBackend::deck_for("javascript")[1].answer, "console.log('text')");
        // "json" must not be mistaken for JavaScript.
        let generic = OfflineBackend::deck_for("JSON");
        assert_eq!(generic[0].question, "JSON: What is it?");
        assert_eq!(generic.len(), 3);
    }

    #[test]
    fn prompt_mentions_topic_and_count() {
        let prompt = build_prompt("Rust", 5);
        assert!(prompt.contains("Topic: \"Rust\""));
        assert!(prompt.contains("Count: 5"));
    }

    #[tokio::test]
    async fn generate_truncates_to_n() {
        let request = GenerateRequest::new("Python", 2);
        let cards = generate_cards(&OfflineBackend, &request).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is Python?");
    }

    #[tokio::test]
    async fn generate_empty_array_is_error() {
        let request = GenerateRequest::new("Rust", 3);
        let err = generate_cards(&CannedBackend("[]"), &request).await.unwrap_err();
        assert!(matches!(err, GenerateError::Empty));
    }

    #[tokio::test]
    async fn chat_backend_falls_back_when_unreachable() {
        let backend = ChatCompletionsBackend::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "test-key".into(),
            DEFAULT_MODEL,
            Duration::from_secs(2),
        )
        .unwrap();
        let request = GenerateRequest::new("Python", 3);
        let cards = generate_cards(&backend, &request).await.unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].question, "What is Python?");
    }
}
