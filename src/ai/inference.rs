use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ApiFlavor, ParseStrategy};

const JSON_SYSTEM_PROMPT: &str = r#"You are a security analyst that reviews a single message (email, SMS or chat) and judges how likely it is to be a phishing attempt.
Consider impersonation of banks, couriers, government agencies or well-known brands, urgency or threats, requests for credentials, OTPs, payment or personal data, and links whose domain does not belong to the claimed sender.
Respond with a single JSON object and nothing else:
{"risk_score": <integer 0-100>, "risk_level": "Low" | "Moderate" | "High", "is_phishing": <true|false>, "reason": "<one short sentence>"}"#;

const FREEFORM_SYSTEM_PROMPT: &str = r#"You are a security analyst. Read the message and say in one or two sentences whether it looks legitimate or whether it is a phishing attempt, a scam, or otherwise malicious. If it looks legitimate, say so plainly."#;

const TEMPERATURE: f32 = 0.0;
const TOP_P: f32 = 1.0;
const REASONING_EFFORT: &str = "low";

pub fn system_prompt(strategy: ParseStrategy) -> &'static str {
    match strategy {
        ParseStrategy::StrictJson => JSON_SYSTEM_PROMPT,
        ParseStrategy::KeywordHeuristic => FREEFORM_SYSTEM_PROMPT,
    }
}

pub fn user_prompt(text: &str, domain: Option<&str>) -> String {
    format!(
        "Linked domain: {}\n\nMessage:\n{}",
        domain.unwrap_or("none found"),
        text
    )
}

pub fn build_request(
    flavor: ApiFlavor,
    model: String,
    max_tokens: u32,
    system: &str,
    user: String,
) -> ClassifierRequest {
    match flavor {
        ApiFlavor::ChatCompletions => ClassifierRequest::Chat(ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_completion_tokens: max_tokens,
            reasoning_effort: REASONING_EFFORT.into(),
        }),
        ApiFlavor::Responses => ClassifierRequest::Responses(ResponsesRequest {
            model,
            instructions: system.into(),
            input: vec![ChatMessage {
                role: "user".into(),
                content: user,
            }],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: max_tokens,
            reasoning: ReasoningOptions {
                effort: REASONING_EFFORT.into(),
            },
        }),
    }
}

/// Concatenated assistant text from any of the reply shapes providers use.
///
/// Looks at, in order: the responses-style `output[] -> content[]` list, the
/// chat-style `choices[0].message.content` (plain string or list of parts),
/// and the top-level `output_text` convenience field.
pub fn extract_reply_text(raw: &Value) -> Option<String> {
    let reply = match ClassifierReply::deserialize(raw) {
        Ok(reply) => reply,
        Err(err) => {
            tracing::debug!(target: "classifier", error = %err, "unrecognized reply shape");
            return None;
        }
    };

    let mut parts: Vec<&str> = Vec::new();
    for item in &reply.output {
        if item.kind.as_deref().map_or(true, |kind| kind == "message") {
            if let Some(content) = &item.content {
                content.collect_text(&mut parts);
            }
        }
    }

    if parts.is_empty() {
        if let Some(content) = reply
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_ref())
        {
            content.collect_text(&mut parts);
        }
    }

    if parts.is_empty() {
        if let Some(text) = reply.output_text.as_deref() {
            parts.push(text);
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClassifierRequest {
    Chat(ChatCompletionRequest),
    Responses(ResponsesRequest),
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_completion_tokens: u32,
    pub reasoning_effort: String,
}

#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub instructions: String,
    pub input: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub reasoning: ReasoningOptions,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReasoningOptions {
    pub effort: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassifierReply {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub output_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Typed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
}

impl MessageContent {
    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        match self {
            MessageContent::Text(text) => parts.push(text),
            MessageContent::Parts(items) => {
                for item in items {
                    match item {
                        ContentPart::Text(text) => parts.push(text),
                        ContentPart::Typed { kind, text } => {
                            if matches!(kind.as_deref(), Some("refusal") | Some("reasoning")) {
                                continue;
                            }
                            if let Some(text) = text {
                                parts.push(text);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_request_carries_generation_parameters() {
        let request = build_request(
            ApiFlavor::ChatCompletions,
            "test-model".into(),
            256,
            system_prompt(ParseStrategy::StrictJson),
            user_prompt("hello", None),
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["max_completion_tokens"], 256);
        assert_eq!(body["reasoning_effort"], "low");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Linked domain: none found"));
    }

    #[test]
    fn responses_request_uses_instructions_and_input() {
        let request = build_request(
            ApiFlavor::Responses,
            "test-model".into(),
            128,
            "sys",
            user_prompt("hello", Some("amazon.in")),
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["instructions"], "sys");
        assert_eq!(body["input"][0]["role"], "user");
        assert_eq!(body["max_output_tokens"], 128);
        assert_eq!(body["reasoning"]["effort"], "low");
        assert!(body.get("messages").is_none());
    }

    #[test]
    fn extracts_chat_completion_content() {
        let raw = json!({"choices": [{"message": {"role": "assistant", "content": "{\"a\":1}"}}]});
        assert_eq!(extract_reply_text(&raw).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn concatenates_responses_output_parts() {
        let raw = json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "reasoning_text", "text": "thinking"}]},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "{\"risk_score\": "},
                    {"type": "output_text", "text": "10}"}
                ]}
            ]
        });
        assert_eq!(extract_reply_text(&raw).as_deref(), Some("{\"risk_score\": 10}"));
    }

    #[test]
    fn accepts_chat_content_given_as_parts() {
        let raw = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "part one, "},
            {"type": "refusal", "refusal": "nope"},
            {"type": "text", "text": "part two"}
        ]}}]});
        assert_eq!(extract_reply_text(&raw).as_deref(), Some("part one, part two"));
    }

    #[test]
    fn falls_back_to_output_text() {
        let raw = json!({"output_text": "plain"});
        assert_eq!(extract_reply_text(&raw).as_deref(), Some("plain"));
    }

    #[test]
    fn missing_text_yields_none() {
        assert_eq!(extract_reply_text(&json!({"choices": []})), None);
        assert_eq!(extract_reply_text(&json!({"raw": "<html>"})), None);
        assert_eq!(extract_reply_text(&json!("bare string")), None);
    }
}
