use crate::agent::{ContextBuilder, ToolRegistry, tagged};
use crate::catalog::{MockCheckout, MockRecipeIndex};
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::providers::create_provider;
use crate::session::SessionState;
use crate::tools::{ExecutePurchaseTool, SearchRecipesTool};
use crate::traits::{ChatMessage, ChatRequest, Provider, ToolCall, ToolResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MAX_HISTORY: usize = 40;

/// One conversation with a remote model.
///
/// Each [`send`](Self::send) composes the turn prompt from the cart, lets the
/// model call tools for up to `max_iterations` round-trips and returns the
/// final reply. Concurrent calls on one instance run one after another.
pub struct Orchestrator {
    id: Uuid,
    provider: Arc<dyn Provider>,
    context_builder: ContextBuilder,
    tool_registry: Arc<ToolRegistry>,
    session: Arc<SessionState>,
    history: Mutex<Vec<ChatMessage>>,
    max_iterations: usize,
    max_history: usize,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        context_builder: ContextBuilder,
        tool_registry: Arc<ToolRegistry>,
        session: Arc<SessionState>,
    ) -> Self {
        let context_builder = context_builder.with_tool_specs(tool_registry.get_specs());

        Self {
            id: Uuid::new_v4(),
            provider,
            context_builder,
            tool_registry,
            session,
            history: Mutex::new(Vec::new()),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Arc<dyn Provider> = Arc::from(create_provider(config)?);
        Self::with_provider(provider, config)
    }

    pub fn with_provider(provider: Arc<dyn Provider>, config: &Config) -> Result<Self> {
        let session = Arc::new(SessionState::new());
        let registry = Arc::new(ToolRegistry::new());

        registry.register(Box::new(SearchRecipesTool::new(Arc::new(
            MockRecipeIndex::new(),
        ))))?;
        registry.register(Box::new(ExecutePurchaseTool::new(
            Arc::new(MockCheckout::new()),
            session.clone(),
        )))?;

        let context_builder =
            ContextBuilder::new().with_tagged_tool_calls(config.tagged_tool_calls);

        Ok(Self::new(provider, context_builder, registry, session)
            .with_max_iterations(config.max_iterations)
            .with_max_history(config.max_history))
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_registry.names()
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn send(&self, user_text: &str) -> String {
        match self.try_send(user_text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(conversation = %self.id, error = %e, "Turn failed");
                format!("Error communicating with {}: {}", self.provider.name(), e)
            }
        }
    }

    /// Like [`send`](Self::send), but surfaces the error. Tool exchanges that
    /// completed before a failure stay in the history.
    pub async fn try_send(&self, user_text: &str) -> Result<String> {
        let mut history = self.history.lock().await;

        let mut messages =
            self.context_builder
                .build_messages(&history, &self.session, user_text);
        let turn_start = messages.len() - 1;

        let outcome = self.run_turn(&mut messages).await;

        match outcome {
            Ok(reply) => {
                history.extend(messages.drain(turn_start..));
                self.trim_history(&mut history);
                Ok(reply)
            }
            Err(e) => {
                if messages.len() > turn_start + 1 {
                    history.extend(messages.drain(turn_start..));
                    history.push(ChatMessage::assistant(format!("(turn ended early: {e})")));
                    self.trim_history(&mut history);
                }
                Err(e)
            }
        }
    }

    async fn run_turn(&self, messages: &mut Vec<ChatMessage>) -> Result<String> {
        let tools = self.tool_registry.get_specs();
        let native_tools = !self.context_builder.tagged_tool_calls && !tools.is_empty();

        for iteration in 1..=self.max_iterations {
            let request = ChatRequest {
                messages: &messages[..],
                tools: if native_tools { Some(tools.as_slice()) } else { None },
            };

            info!(
                conversation = %self.id,
                provider = self.provider.name(),
                iteration,
                messages = messages.len(),
                "Requesting model reply"
            );

            let response = self
                .provider
                .chat(request)
                .await
                .map_err(|e| BotError::transport(&e))?;

            let (assistant_text, tool_calls) = if response.has_tool_calls() {
                (response.text.unwrap_or_default(), response.tool_calls)
            } else if let Some(text) = response.text {
                if self.context_builder.tagged_tool_calls {
                    tagged::parse_tool_calls(&text)
                } else {
                    (text, vec![])
                }
            } else {
                return Err(BotError::Transport(
                    "model returned neither text nor tool calls".to_string(),
                ));
            };

            if tool_calls.is_empty() {
                messages.push(ChatMessage::assistant(assistant_text.clone()));
                return Ok(assistant_text);
            }

            debug!(
                conversation = %self.id,
                calls = ?tool_calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Model requested tools"
            );

            // No round-trip is left to report results back, so nothing runs.
            if iteration == self.max_iterations {
                warn!(
                    conversation = %self.id,
                    max_iterations = self.max_iterations,
                    skipped = tool_calls.len(),
                    "Tool-call limit reached"
                );
                return Err(BotError::ToolLoopLimit(self.max_iterations));
            }

            messages.push(ChatMessage::assistant_with_tool_calls(
                assistant_text,
                tool_calls.clone(),
            ));

            for tool_call in tool_calls {
                let result = self.run_tool_call(&tool_call).await;
                messages.push(ChatMessage::tool_result(
                    tool_call.id,
                    serde_json::to_string(&result).unwrap_or_default(),
                ));
            }
        }

        Err(BotError::ToolLoopLimit(self.max_iterations))
    }

    async fn run_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        let arguments = if tool_call.arguments.trim().is_empty() {
            "{}"
        } else {
            tool_call.arguments.as_str()
        };

        match serde_json::from_str(arguments) {
            Ok(args) => self.tool_registry.execute(&tool_call.name, args).await,
            Err(e) => ToolResult::error(format!(
                "Failed to parse tool arguments for {}: {}",
                tool_call.name, e
            )),
        }
    }

    fn trim_history(&self, history: &mut Vec<ChatMessage>) {
        while history.len() > self.max_history {
            let next_turn = history
                .iter()
                .skip(1)
                .position(|m| m.role == "user")
                .map(|i| i + 1);

            match next_turn {
                Some(idx) => {
                    history.drain(..idx);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChatResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedProvider {
        script: std::sync::Mutex<VecDeque<anyhow::Result<ChatResponse>>>,
        requests: std::sync::Mutex<Vec<(Vec<ChatMessage>, bool)>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<anyhow::Result<ChatResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: std::sync::Mutex::new(script.into()),
                requests: Default::default(),
            })
        }

        fn requests(&self) -> Vec<(Vec<ChatMessage>, bool)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((request.messages.to_vec(), request.tools.is_some()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
        }
    }

    fn text(reply: &str) -> anyhow::Result<ChatResponse> {
        Ok(ChatResponse {
            text: Some(reply.to_string()),
            tool_calls: vec![],
        })
    }

    fn call(id: &str, name: &str, arguments: &str) -> anyhow::Result<ChatResponse> {
        Ok(ChatResponse {
            text: None,
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
                signature: None,
            }],
        })
    }

    fn bot(provider: Arc<ScriptedProvider>) -> Orchestrator {
        Orchestrator::with_provider(provider, &Config::default()).unwrap()
    }

    fn tool_payload(message: &ChatMessage) -> serde_json::Value {
        assert_eq!(message.role, "tool");
        serde_json::from_str(&message.content).unwrap()
    }

    #[tokio::test]
    async fn plain_reply_is_returned_verbatim() {
        let provider = ScriptedProvider::new(vec![text("  Hi! Hungry for anything?\n")]);
        let bot = bot(provider.clone());

        assert_eq!(bot.send("hi").await, "  Hi! Hungry for anything?\n");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let (messages, sent_tools) = &requests[0];
        assert!(sent_tools);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, crate::agent::SYSTEM_PREAMBLE);
        assert_eq!(
            messages[1].content,
            "[System Info: Current Cart: Empty]\nUser says: hi"
        );
        assert_eq!(bot.history_len().await, 2);
    }

    #[tokio::test]
    async fn search_tool_result_is_fed_back() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "search_recipes", r#"{"query":"tacos"}"#),
            text("I found Street Style Tacos and Vegetarian Tacos."),
        ]);
        let bot = bot(provider.clone());

        let reply = bot.send("I want tacos").await;
        assert_eq!(reply, "I found Street Style Tacos and Vegetarian Tacos.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let followup = &requests[1].0;
        let last = followup.last().unwrap();
        assert_eq!(last.tool_call_id.as_deref(), Some("c1"));
        let payload = tool_payload(last);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["output"][0]["id"], "rec_01");
        assert_eq!(payload["output"][1]["id"], "rec_02");

        let assistant = &followup[followup.len() - 2];
        assert_eq!(assistant.tool_calls.as_ref().unwrap()[0].name, "search_recipes");
    }

    #[tokio::test]
    async fn purchase_shows_up_in_next_prompt() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "execute_purchase", r#"{"items":["Onion","Cilantro"]}"#),
            text("Done! Transaction TX-UCP-77821."),
            text("You bought onion and cilantro."),
        ]);
        let bot = bot(provider.clone());

        bot.send("yes, buy them").await;
        assert_eq!(bot.session().current(), vec!["Onion", "Cilantro"]);

        bot.send("what's in my cart?").await;
        let requests = provider.requests();
        let last_user = requests[2]
            .0
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .unwrap();
        assert_eq!(
            last_user.content,
            "[System Info: Current Cart: Onion, Cilantro]\nUser says: what's in my cart?"
        );
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_text() {
        let provider = ScriptedProvider::new(vec![Err(anyhow::anyhow!("connection reset"))]);
        let bot = bot(provider);

        let reply = bot.send("hi").await;
        assert_eq!(reply, "Error communicating with scripted: connection reset");
        assert_eq!(bot.history_len().await, 0);
    }

    #[tokio::test]
    async fn failure_mid_turn_keeps_finished_tool_calls() {
        let provider = ScriptedProvider::new(vec![
            text("Hello!"),
            call("c1", "search_recipes", r#"{"query":"soup"}"#),
            Err(anyhow::anyhow!("timeout")),
        ]);
        let bot = bot(provider);

        bot.send("hi").await;
        let reply = bot.send("soup?").await;
        assert!(reply.contains("timeout"));
        // user, tool call, tool result, closing note
        assert_eq!(bot.history_len().await, 6);
    }

    #[tokio::test]
    async fn purchase_before_transport_error_is_remembered() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "execute_purchase", r#"{"items":["Lime"]}"#),
            Err(anyhow::anyhow!("connection reset")),
            text("You already bought a lime."),
        ]);
        let bot = bot(provider.clone());

        assert!(bot.send("buy a lime").await.contains("connection reset"));
        assert_eq!(bot.session().current(), vec!["Lime"]);

        bot.send("did that work?").await;
        let followup = &provider.requests()[2].0;
        let receipt = followup
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("c1"))
            .unwrap();
        assert_eq!(tool_payload(receipt)["output"]["transaction_id"], "TX-UCP-77821");
        let note = &followup[followup.len() - 2];
        assert_eq!(note.role, "assistant");
        assert!(note.content.starts_with("(turn ended early:"));
    }

    #[tokio::test]
    async fn tool_loop_is_bounded() {
        let script = (0..5)
            .map(|i| call(&format!("c{i}"), "search_recipes", r#"{"query":"x"}"#))
            .collect();
        let provider = ScriptedProvider::new(script);
        let bot = bot(provider.clone()).with_max_iterations(3);

        let err = bot.try_send("loop forever").await.unwrap_err();
        assert!(matches!(err, BotError::ToolLoopLimit(3)));
        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        let results = requests[2].0.iter().filter(|m| m.role == "tool").count();
        assert_eq!(results, 2);
    }

    #[tokio::test]
    async fn calls_on_the_last_round_trip_are_not_run() {
        let buy = || call("c1", "execute_purchase", r#"{"items":["Salsa"]}"#);
        let provider = ScriptedProvider::new(vec![buy(), buy(), text("Your salsa is on its way.")]);
        let bot = bot(provider.clone()).with_max_iterations(2);

        let reply = bot.send("buy salsa").await;
        assert!(reply.contains("gave up after 2"));
        assert_eq!(bot.session().current(), vec!["Salsa"]);
        // user, one completed purchase, closing note
        assert_eq!(bot.history_len().await, 4);

        bot.send("and now?").await;
        let last_user = provider.requests()[2]
            .0
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .unwrap()
            .content
            .clone();
        assert!(last_user.starts_with("[System Info: Current Cart: Salsa]"));
    }

    #[derive(Default)]
    struct YieldingProvider {
        events: std::sync::Mutex<Vec<String>>,
        requests: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl Provider for YieldingProvider {
        fn name(&self) -> &str {
            "yielding"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            let said = request
                .messages
                .last()
                .and_then(|m| m.content.rsplit("User says: ").next())
                .unwrap_or_default()
                .to_string();

            self.events.lock().unwrap().push(format!("start:{said}"));
            self.requests.lock().unwrap().push(request.messages.to_vec());
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            self.events.lock().unwrap().push(format!("end:{said}"));

            text(&format!("reply to {said}"))
        }
    }

    #[tokio::test]
    async fn concurrent_sends_run_one_after_another() {
        let provider = Arc::new(YieldingProvider::default());
        let bot = Orchestrator::with_provider(provider.clone(), &Config::default()).unwrap();

        let (first, second) = tokio::join!(bot.send("a"), bot.send("b"));
        assert_eq!(first, "reply to a");
        assert_eq!(second, "reply to b");

        assert_eq!(
            *provider.events.lock().unwrap(),
            vec!["start:a", "end:a", "start:b", "end:b"]
        );
        assert_eq!(bot.history_len().await, 4);

        let requests = provider.requests.lock().unwrap();
        let second_request = &requests[1];
        let roles: Vec<_> = second_request.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert!(second_request[1].content.ends_with("User says: a"));
        assert_eq!(second_request[2].content, "reply to a");
    }

    #[tokio::test]
    async fn bad_arguments_and_unknown_tools_are_reported_to_the_model() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "search_recipes", "{not json"),
            call("c2", "order_pizza", "{}"),
            text("Sorry about that."),
        ]);
        let bot = bot(provider.clone());

        assert_eq!(bot.send("hi").await, "Sorry about that.");

        let requests = provider.requests();
        let bad_args = tool_payload(requests[1].0.last().unwrap());
        assert_eq!(bad_args["success"], false);
        assert!(
            bad_args["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to parse tool arguments for search_recipes")
        );

        let unknown = tool_payload(requests[2].0.last().unwrap());
        assert_eq!(unknown["error"], "tool 'order_pizza' not found");
    }

    #[tokio::test]
    async fn empty_response_is_an_error() {
        let provider = ScriptedProvider::new(vec![Ok(ChatResponse::default())]);
        let bot = bot(provider);
        let reply = bot.send("hi").await;
        assert!(reply.starts_with("Error communicating with scripted:"));
    }

    #[tokio::test]
    async fn tagged_calls_are_parsed_from_text() {
        let provider = ScriptedProvider::new(vec![
            text(
                "Searching.\n<tool_call>{\"name\":\"search_recipes\",\"arguments\":{\"query\":\"chili\"}}</tool_call>",
            ),
            text("Try the Generic chili Dish."),
        ]);
        let config = Config {
            tagged_tool_calls: true,
            ..Config::default()
        };
        let bot = Orchestrator::with_provider(provider.clone(), &config).unwrap();

        assert_eq!(bot.send("chili").await, "Try the Generic chili Dish.");

        let requests = provider.requests();
        assert!(!requests[0].1);
        assert!(requests[0].0[0].content.contains("<tool_call>"));
        let payload = tool_payload(requests[1].0.last().unwrap());
        assert_eq!(payload["output"][0]["title"], "Generic chili Dish");
    }

    #[tokio::test]
    async fn old_turns_are_dropped_whole() {
        let provider = ScriptedProvider::new(vec![
            text("one"),
            call("c1", "search_recipes", r#"{"query":"x"}"#),
            text("two"),
            text("three"),
        ]);
        let bot = bot(provider.clone()).with_max_history(4);

        bot.send("first").await;
        bot.send("second").await;
        assert_eq!(bot.history_len().await, 4);

        bot.send("third").await;
        assert_eq!(bot.history_len().await, 2);

        let last_request = &provider.requests()[3].0;
        assert_eq!(last_request[1].role, "user");
        assert!(last_request[1].content.ends_with("second"));
    }

    #[test]
    fn from_config_registers_both_tools() {
        let config = Config {
            api_key: "test-key".into(),
            ..Config::default()
        };
        let bot = Orchestrator::from_config(&config).unwrap();
        assert_eq!(bot.tool_names(), vec!["search_recipes", "execute_purchase"]);
        assert!(bot.session().is_empty());
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let config = Config {
            provider: Some("carrier-pigeon".into()),
            api_key: "test-key".into(),
            ..Config::default()
        };
        let err = Orchestrator::from_config(&config).err().unwrap();
        assert!(matches!(err, BotError::Configuration(_)));
    }
}
