use std::sync::Arc;

use crate::config::DeploymentProfile;
use crate::error::{CounterpointError, Result};
use crate::models::{ChatMessage, ChatRequest, ProviderPayload, Turn};
use crate::styles::{DebateStyle, OPPOSITION_DIRECTIVE};
use crate::transport::Transport;

/// Fixed randomness weight for debate replies
const TEMPERATURE: f32 = 0.7;

/// Translation/execution layer between internal turn state and the remote
/// chat-completion provider: builds the provider request from a turn
/// sequence and a style, executes it, and normalizes the heterogeneous
/// success shapes into a single assistant turn.
pub struct CompletionGateway {
    tx: Arc<dyn Transport>,
    model: String,
    profile: DeploymentProfile,
}

impl CompletionGateway {
    pub fn new(tx: Arc<dyn Transport>, model: String, profile: DeploymentProfile) -> Self {
        Self { tx, model, profile }
    }

    /// Build the provider request. The system text is the style's behavioral
    /// fragment followed by the fixed opposition directive; every turn role
    /// maps into exactly {user, assistant} (`Role` is total, so coercion of
    /// anything else happened at the deserialization edge).
    pub fn build_request(&self, turns: &[Turn], style: DebateStyle) -> ChatRequest {
        let system = format!("{}\n\n{}", style.system_prompt(), OPPOSITION_DIRECTIVE);
        let messages = turns
            .iter()
            .map(|t| ChatMessage {
                role: t.role.as_str().to_string(),
                content: t.content.clone(),
            })
            .collect();
        ChatRequest {
            model: self.model.clone(),
            system,
            messages,
            temperature: TEMPERATURE,
            max_tokens: self.profile.max_tokens(),
        }
    }

    /// Build, execute, normalize. The await on the transport is the only
    /// suspension point; exactly one result comes back, success or failure.
    pub async fn complete(&self, turns: &[Turn], style: DebateStyle) -> Result<Turn> {
        let request = self.build_request(turns, style);
        tracing::info!(
            style = %style,
            turns = turns.len(),
            model = %request.model,
            "requesting completion"
        );
        let raw = self.tx.chat(&request).await?;
        normalize(raw)
    }
}

/// Total mapping from a raw provider payload to an assistant turn. Detects
/// which of the two documented success shapes is present (`content[0].text`
/// or `choices[0].message.content`); anything else, including an empty
/// block/choice list, is a malformed-payload error carrying the raw JSON
/// for diagnostics.
pub fn normalize(raw: serde_json::Value) -> Result<Turn> {
    let payload: ProviderPayload =
        serde_json::from_value(raw.clone()).map_err(|_| CounterpointError::Malformed {
            reason: "payload matches neither content[] nor choices[] shape".to_string(),
            raw: raw.clone(),
        })?;

    let text = match payload {
        ProviderPayload::Blocks { content } => content.into_iter().next().map(|b| b.text),
        ProviderPayload::Choices { choices } => {
            choices.into_iter().next().map(|c| c.message.content)
        }
    };

    text.map(Turn::assistant)
        .ok_or(CounterpointError::Malformed {
            reason: "payload contained no generated text".to_string(),
            raw,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn gateway(tx: MockTransport) -> CompletionGateway {
        CompletionGateway::new(
            Arc::new(tx),
            "test-model".to_string(),
            DeploymentProfile::Standard,
        )
    }

    #[test]
    fn build_request_combines_style_and_opposition_directive() {
        let gw = gateway(MockTransport::new());
        let turns = vec![Turn::user("Tabs beat spaces")];
        let req = gw.build_request(&turns, DebateStyle::Blunt);

        assert!(req.system.starts_with(DebateStyle::Blunt.system_prompt()));
        assert!(req.system.contains("OPPOSITE side"));
        assert!(req.system.contains("2-4 paragraphs"));
        assert_eq!(req.model, "test-model");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_tokens, 1000);
    }

    #[test]
    fn build_request_honors_lite_profile() {
        let gw = CompletionGateway::new(
            Arc::new(MockTransport::new()),
            "test-model".to_string(),
            DeploymentProfile::Lite,
        );
        let req = gw.build_request(&[Turn::user("t")], DebateStyle::Neutral);
        assert_eq!(req.max_tokens, 800);
    }

    #[test]
    fn build_request_roles_are_always_user_or_assistant() {
        // A turn arriving over the wire with an unknown role is coerced at
        // the deserialization edge, so the request stays well-formed
        let coerced: Turn =
            serde_json::from_str(r#"{"role":"system","content":"x"}"#).unwrap();
        let turns = vec![coerced, Turn::assistant("y"), Turn::user("z")];

        let gw = gateway(MockTransport::new());
        let req = gw.build_request(&turns, DebateStyle::Neutral);
        assert_eq!(req.messages.len(), 3);
        for msg in &req.messages {
            assert!(msg.role == "user" || msg.role == "assistant");
        }
        assert_eq!(req.messages[0].role, "user");
    }

    #[test]
    fn normalize_extracts_content_block_text() {
        let turn = normalize(json!({"content": [{"text": "X"}]})).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "X");
    }

    #[test]
    fn normalize_extracts_choice_message_content() {
        let turn =
            normalize(json!({"choices": [{"message": {"role": "assistant", "content": "Y"}}]}))
                .unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Y");
    }

    #[test]
    fn normalize_accepts_choice_message_without_role_field() {
        // Some providers omit the role on response messages
        let turn = normalize(json!({"choices": [{"message": {"content": "Y"}}]})).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Y");
    }

    #[test]
    fn normalize_rejects_empty_choice_list_with_raw_payload() {
        let raw = json!({"choices": []});
        let err = normalize(raw.clone()).unwrap_err();
        match err {
            CounterpointError::Malformed { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn normalize_rejects_unrecognized_shape() {
        let err = normalize(json!({"output": "nope"})).unwrap_err();
        assert!(matches!(err, CounterpointError::Malformed { .. }));
        let err = normalize(json!(null)).unwrap_err();
        assert!(matches!(err, CounterpointError::Malformed { .. }));
    }

    #[tokio::test]
    async fn complete_returns_normalized_assistant_turn() {
        let mut tx = MockTransport::new();
        tx.expect_chat()
            .withf(|req| req.messages.len() == 1 && req.messages[0].role == "user")
            .returning(|_| Ok(json!({"content": [{"text": "Pizza purists disagree..."}]})));

        let gw = gateway(tx);
        let turn = gw
            .complete(&[Turn::user("Pineapple belongs on pizza")], DebateStyle::Blunt)
            .await
            .unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Pizza purists disagree...");
    }

    #[tokio::test]
    async fn complete_surfaces_transport_errors_unchanged() {
        let mut tx = MockTransport::new();
        tx.expect_chat().returning(|_| {
            Err(CounterpointError::Api {
                status: 500,
                body: r#"{"error":"rate limited"}"#.to_string(),
            })
        });

        let gw = gateway(tx);
        let err = gw
            .complete(&[Turn::user("t")], DebateStyle::Neutral)
            .await
            .unwrap_err();
        assert!(matches!(err, CounterpointError::Api { status: 500, .. }));
    }
}
