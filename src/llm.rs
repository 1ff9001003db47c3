use serde::{Deserialize, Serialize};

use crate::error::{PennyError, Result};
use crate::settings::LlmSettings;

const CATEGORIZE_SYSTEM: &str = "You are a helpful bookkeeper that assigns categories to \
business expenses. Respond ONLY with the best-fitting category name.";

const NORMALIZE_SYSTEM: &str = "You are a bookkeeping assistant. The user sends a list of \
payee names extracted from bank statements, one per line. Collapse near-duplicate names \
that refer to the same real-world vendor. Respond ONLY with a JSON object mapping every \
input name to its canonical name; names without duplicates map to themselves.";

/// Illustrative note→category pairs prepended to every categorization call.
/// Static configuration, injected as few-shot user/assistant turns.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "Description: Starbuchs LTD 0817. Amount: 6.18. Note: Coffee with client at Starbucks.",
        "Meals & Entertainment",
    ),
    (
        "Description: Regis Congressional Blvd. Amount: 679.00. Note: Office rent for March.",
        "Office Expenses",
    ),
    (
        "Description: Meta Corporation Marketplace. Amount: 21.55. Note: Facebook ad campaign",
        "Advertising",
    ),
    (
        "Description: AT&T Business. Amount: 70.00. Note: Monthly office internet bill.",
        "Utilities",
    ),
    (
        "Description: Uber LTD. Amount: 50.00. Note: Ridde to airport for TikTok training.",
        "Travel",
    ),
];

/// The two operations the core needs from a language model. Kept narrow so
/// the session and resolver run against deterministic test doubles.
pub trait LlmClient {
    /// Suggest a short category label for one vendor cluster. Errors are a
    /// hard stop for the run; the suggestion is always subject to operator
    /// override before being trusted.
    fn categorize(&self, description: &str, amount: f64, note: &str) -> Result<String>;

    /// Ask for a JSON mapping that collapses near-duplicate payee keys.
    /// Returns the raw reply text; the resolver owns parsing and fallback.
    fn normalize_payees(&self, names: &[String]) -> Result<String>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat-completions client
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Build a client from settings plus the `OPENAI_API_KEY` environment
    /// variable. The key never lives in the settings file.
    pub fn from_settings(llm: &LlmSettings) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            return Err(PennyError::Settings(
                "OPENAI_API_KEY is not set; categorization needs an API key".to_string(),
            ));
        }
        Ok(Self::new(&llm.base_url, &api_key, &llm.model))
    }

    fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(PennyError::Categorizer(format!("API error {status}: {body}")));
        }

        let reply: ChatResponse = response.json()?;
        reply
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| PennyError::Categorizer("empty completion".to_string()))
    }
}

fn categorize_messages(description: &str, amount: f64, note: &str) -> Vec<Message> {
    let mut messages = vec![Message {
        role: "system",
        content: CATEGORIZE_SYSTEM.to_string(),
    }];
    for (example_note, example_category) in EXAMPLES {
        messages.push(Message {
            role: "user",
            content: (*example_note).to_string(),
        });
        messages.push(Message {
            role: "assistant",
            content: (*example_category).to_string(),
        });
    }
    messages.push(Message {
        role: "user",
        content: format!("Description: {description}. Amount: {amount:.2}. Note: {note}"),
    });
    messages
}

fn normalize_messages(names: &[String]) -> Vec<Message> {
    vec![
        Message {
            role: "system",
            content: NORMALIZE_SYSTEM.to_string(),
        },
        Message {
            role: "user",
            content: names.join("\n"),
        },
    ]
}

impl LlmClient for OpenAiClient {
    fn categorize(&self, description: &str, amount: f64, note: &str) -> Result<String> {
        self.complete(categorize_messages(description, amount, note))
    }

    fn normalize_payees(&self, names: &[String]) -> Result<String> {
        self.complete(normalize_messages(names))
    }
}
