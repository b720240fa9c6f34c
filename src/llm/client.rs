//! HTTP client for hosted and local LLM providers

use crate::config::{LLMProvider, LlmConfig};
use crate::llm::{LlmError, LlmResult, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a Cypher expert.";

pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_base_url: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        let api_base_url = config.api_base_url.clone().unwrap_or_else(|| {
            match config.provider {
                LLMProvider::OpenAI => "https://api.openai.com/v1".to_string(),
                LLMProvider::Ollama => "http://localhost:11434".to_string(),
                LLMProvider::Gemini => {
                    "https://generativelanguage.googleapis.com/v1beta".to_string()
                }
            }
        });

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn system_prompt(&self) -> String {
        self.config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
    }

    async fn openai_chat(&self, prompt: &str) -> LlmResult<String> {
        #[derive(Serialize)]
        struct Message {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| LlmError::ConfigError("OpenAI requires API key".to_string()))?;

        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message {
                        role: "system".to_string(),
                        content: self.system_prompt(),
                    },
                    Message {
                        role: "user".to_string(),
                        content: prompt.to_string(),
                    },
                ],
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            })
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::ApiError(format!("OpenAI error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::SerializationError(e.to_string()))?;
        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn ollama_chat(&self, prompt: &str) -> LlmResult<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
            num_predict: u32,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
            system: String,
            stream: bool,
            options: Options,
        }

        #[derive(Deserialize)]
        struct Response {
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: &self.config.model,
                prompt,
                system: self.system_prompt(),
                stream: false,
                options: Options {
                    temperature: self.config.temperature,
                    num_predict: self.config.max_tokens,
                },
            })
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::SerializationError(e.to_string()))?;
        Ok(result.response)
    }

    async fn gemini_chat(&self, prompt: &str) -> LlmResult<String> {
        #[derive(Serialize)]
        struct Request {
            contents: Vec<Content>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize, Deserialize)]
        struct Content {
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize, Deserialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
            #[serde(rename = "maxOutputTokens")]
            max_output_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| LlmError::ConfigError("Gemini requires API key".to_string()))?;

        // v1beta has no dedicated system turn on every endpoint
        let full_prompt = format!("{}\n\n{}", self.system_prompt(), prompt);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.config.model, api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: full_prompt }],
                }],
                generation_config: GenerationConfig {
                    temperature: self.config.temperature,
                    max_output_tokens: self.config.max_tokens,
                },
            })
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::SerializationError(e.to_string()))?;

        Ok(result
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        debug!(
            "Completing prompt ({} chars) with {:?}/{}",
            prompt.len(),
            self.config.provider,
            self.config.model
        );
        match self.config.provider {
            LLMProvider::OpenAI => self.openai_chat(prompt).await,
            LLMProvider::Ollama => self.ollama_chat(prompt).await,
            LLMProvider::Gemini => self.gemini_chat(prompt).await,
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
