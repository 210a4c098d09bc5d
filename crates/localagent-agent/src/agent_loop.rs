//! Agent loop — the model ↔ tool state machine for one user request.
//!
//! Each run starts from `[system prompt, user input]` and alternates between
//! asking the model for the next reply and running the tool it asked for.
//! Tool failures are written back into the conversation so the model can
//! correct itself; model failures end the run.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use localagent_core::types::Message;
use localagent_providers::{ChatModel, GenerationOptions, ProviderError};

use crate::action::{parse_action, Action};
use crate::tools::{ToolArgs, ToolRegistry, FINAL_ANSWER};

/// Default bound on model replies per run.
pub const DEFAULT_MAX_STEPS: usize = 6;

/// Why a run ended without an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("reached the step limit ({max_steps}) without a final answer")]
    StepLimitExceeded { max_steps: usize },
}

/// Where a run currently is.
#[derive(Debug)]
enum AgentState {
    AwaitingModel,
    ToolCallPending { name: String, arguments: ToolArgs },
    Done(String),
    Failed(AgentError),
}

/// The outcome of one run together with what led to it.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Result<String, AgentError>,
    /// Model replies consumed.
    pub steps: usize,
    /// Full conversation, system prompt first.
    pub conversation: Vec<Message>,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: String,
    options: GenerationOptions,
    max_steps: usize,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt: system_prompt.into(),
            options: GenerationOptions::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer one user request.
    pub async fn run(&self, user_input: &str) -> Result<String, AgentError> {
        self.run_detailed(user_input).await.outcome
    }

    /// Like [`Agent::run`], but also returns the step count and transcript.
    pub async fn run_detailed(&self, user_input: &str) -> RunReport {
        let mut conversation = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(user_input),
        ];
        let mut steps = 0usize;
        let mut state = AgentState::AwaitingModel;

        info!(model = %self.model.model_id(), max_steps = self.max_steps, "agent run started");

        loop {
            state = match state {
                AgentState::AwaitingModel => {
                    if steps >= self.max_steps {
                        AgentState::Failed(AgentError::StepLimitExceeded {
                            max_steps: self.max_steps,
                        })
                    } else {
                        steps += 1;
                        self.next_reply(&mut conversation, steps).await
                    }
                }
                AgentState::ToolCallPending { name, arguments } => {
                    self.run_tool(&mut conversation, &name, &arguments).await
                }
                AgentState::Done(answer) => {
                    info!(steps, "agent run finished");
                    return RunReport {
                        outcome: Ok(answer),
                        steps,
                        conversation,
                    };
                }
                AgentState::Failed(err) => {
                    error!(steps, error = %err, "agent run failed");
                    return RunReport {
                        outcome: Err(err),
                        steps,
                        conversation,
                    };
                }
            };
        }
    }

    /// AwaitingModel: ask for one reply and decide what it means.
    async fn next_reply(&self, conversation: &mut Vec<Message>, step: usize) -> AgentState {
        debug!(step, messages = conversation.len(), "requesting model reply");

        let reply = match self.model.generate(conversation, &self.options).await {
            Ok(reply) => reply,
            Err(e) => return AgentState::Failed(AgentError::Provider(e)),
        };
        let content = reply.content;
        conversation.push(Message::assistant(content.clone()));

        match parse_action(&content) {
            Ok(Action::Answer(text)) => {
                debug!(step, "reply has no tool call; treating as final answer");
                AgentState::Done(text)
            }
            Ok(Action::Call { name, arguments }) => {
                info!(step, tool = %name, "model requested tool");
                AgentState::ToolCallPending { name, arguments }
            }
            Err(e) => {
                warn!(step, error = %e, "malformed action");
                conversation.push(Message::tool(format!(
                    "Error: {e}. Reply with a single JSON object like \
                     {{\"name\": \"<tool>\", \"arguments\": {{...}}}}."
                )));
                AgentState::AwaitingModel
            }
        }
    }

    /// ToolCallPending: run the tool and feed the outcome back.
    async fn run_tool(
        &self,
        conversation: &mut Vec<Message>,
        name: &str,
        arguments: &ToolArgs,
    ) -> AgentState {
        match self.tools.invoke(name, arguments).await {
            Ok(answer) if name == FINAL_ANSWER => AgentState::Done(answer),
            Ok(result) => {
                debug!(tool = %name, result_len = result.len(), "tool succeeded");
                conversation.push(Message::tool(result));
                AgentState::AwaitingModel
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                conversation.push(Message::tool(format!("Error: {e}")));
                AgentState::AwaitingModel
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use localagent_core::config::WebSearchConfig;
    use localagent_core::types::Role;

    use crate::tools::{builtin_registry, Inventory, ParamSpec, Tool};

    /// A chat model that replays scripted replies and counts calls.
    struct ScriptedModel {
        replies: Mutex<Vec<Result<String, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            })
        }

        fn texts(replies: &[&str]) -> Arc<Self> {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(
            &self,
            _conversation: &[Message],
            _options: &GenerationOptions,
        ) -> Result<Message, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(ProviderError::protocol("script exhausted"));
            }
            replies.remove(0).map(Message::assistant)
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    /// A tool that counts its executions.
    struct CountingTool {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "count"
        }

        fn description(&self) -> &str {
            "Counts calls."
        }

        fn inputs(&self) -> &[ParamSpec] {
            &[]
        }

        async fn execute(&self, _args: &ToolArgs) -> anyhow::Result<String> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("called {n} times"))
        }
    }

    fn builtin_agent(model: Arc<ScriptedModel>) -> (Agent, Inventory) {
        let inventory = Inventory::starter();
        let registry = builtin_registry(inventory.clone(), &WebSearchConfig::default()).unwrap();
        (Agent::new(model, registry, "system"), inventory)
    }

    #[tokio::test]
    async fn test_plain_reply_is_done_verbatim() {
        let model = ScriptedModel::texts(&["Hello there!\n"]);
        let (agent, _) = builtin_agent(model.clone());

        let report = agent.run_detailed("Hi").await;
        assert_eq!(report.outcome.unwrap(), "Hello there!\n");
        assert_eq!(report.steps, 1);
        assert_eq!(model.calls(), 1);
        assert_eq!(report.conversation[0], Message::system("system"));
        assert_eq!(report.conversation[1], Message::user("Hi"));
    }

    #[tokio::test]
    async fn test_json_answer_after_fetch_is_done_verbatim() {
        let answer = "Here is your inventory:\n```json\n{\"apple\": 3, \"orange\": 1}\n```";
        let model = ScriptedModel::texts(&[r#"{"name": "fetch_inventory"}"#, answer]);
        let (agent, _) = builtin_agent(model.clone());

        let report = agent.run_detailed("What do I have?").await;
        assert_eq!(report.outcome.unwrap(), answer);
        assert_eq!(report.steps, 2);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_bare_json_answer_is_done_verbatim() {
        let answer = r#"{"apple": 3, "orange": 1}"#;
        let model = ScriptedModel::texts(&[answer]);
        let (agent, _) = builtin_agent(model);

        assert_eq!(agent.run("Inventory as JSON please").await.unwrap(), answer);
    }

    #[tokio::test]
    async fn test_action_word_in_prose_answer_is_done() {
        let answer = "Next Action: none needed. You have 3 apples.";
        let model = ScriptedModel::texts(&[answer]);
        let (agent, _) = builtin_agent(model.clone());

        let report = agent.run_detailed("How many apples?").await;
        assert_eq!(report.outcome.unwrap(), answer);
        assert_eq!(report.steps, 1);
    }

    #[tokio::test]
    async fn test_tool_then_final_answer() {
        let model = ScriptedModel::texts(&[
            r#"Action: {"name": "inventory_updater", "arguments": {"objectName": "apple", "quantityModifier": 2}}"#,
            r#"{"name": "final_answer", "arguments": {"answer": "You now have 5 apples."}}"#,
        ]);
        let (agent, inventory) = builtin_agent(model.clone());

        let report = agent.run_detailed("Add two apples").await;
        assert_eq!(report.outcome.unwrap(), "You now have 5 apples.");
        assert_eq!(report.steps, 2);
        assert_eq!(inventory.quantity("apple"), Some(5));

        let observation = &report.conversation[3];
        assert_eq!(observation.role, Role::Tool);
        assert_eq!(observation.content, "Success - you now have 5 of apple");
    }

    #[tokio::test]
    async fn test_step_limit_runs_exactly_max_tools() {
        let call = r#"{"name": "count"}"#;
        let model = ScriptedModel::texts(&[call; 10]);
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CountingTool { runs: runs.clone() }))
            .unwrap();
        let agent = Agent::new(model.clone(), registry, "system").with_max_steps(3);

        let report = agent.run_detailed("loop forever").await;
        assert!(matches!(
            report.outcome,
            Err(AgentError::StepLimitExceeded { max_steps: 3 })
        ));
        assert_eq!(report.steps, 3);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_default_step_limit() {
        let model = ScriptedModel::texts(&[r#"{"name": "fetch_inventory"}"#; 8]);
        let (agent, _) = builtin_agent(model.clone());

        let err = agent.run("?").await.unwrap_err();
        assert!(matches!(err, AgentError::StepLimitExceeded { max_steps: 6 }));
        assert_eq!(model.calls(), 6);
    }

    #[tokio::test]
    async fn test_handler_error_is_fed_back() {
        let model = ScriptedModel::texts(&[
            r#"{"name": "inventory_updater", "arguments": {"objectName": "apple", "quantityModifier": -5}}"#,
            "You cannot remove 5 apples; you only have 3.",
        ]);
        let (agent, inventory) = builtin_agent(model);

        let report = agent.run_detailed("Remove five apples").await;
        assert_eq!(
            report.outcome.unwrap(),
            "You cannot remove 5 apples; you only have 3."
        );
        assert_eq!(inventory.quantity("apple"), Some(3));
        let feedback = &report.conversation[3];
        assert_eq!(feedback.role, Role::Tool);
        assert!(feedback.content.starts_with("Error: "));
        assert!(feedback.content.contains("cannot be done"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back() {
        let model = ScriptedModel::texts(&[r#"{"name": "teleport"}"#, "Sorry."]);
        let (agent, _) = builtin_agent(model);

        let report = agent.run_detailed("Beam me up").await;
        assert_eq!(report.outcome.unwrap(), "Sorry.");
        assert_eq!(report.conversation[3].content, "Error: unknown tool 'teleport'");
    }

    #[tokio::test]
    async fn test_invalid_final_answer_arguments_are_fed_back() {
        let model = ScriptedModel::texts(&[
            r#"{"name": "final_answer", "arguments": {}}"#,
            r#"{"name": "final_answer", "arguments": {"answer": "ok"}}"#,
        ]);
        let (agent, _) = builtin_agent(model);

        let report = agent.run_detailed("?").await;
        assert_eq!(report.outcome.unwrap(), "ok");
        assert!(report.conversation[3].content.contains("invalid arguments"));
    }

    #[tokio::test]
    async fn test_malformed_action_counts_as_step() {
        let model = ScriptedModel::texts(&[
            r#"Action: {"name": "multiply_two_numbers", "arguments": "#,
            r#"Action: {"name": "multiply_two_numbers", "arguments": {"num1": 6, "num2": 7}}"#,
            "42",
        ]);
        let (agent, _) = builtin_agent(model);

        let report = agent.run_detailed("6 times 7?").await;
        assert_eq!(report.outcome.unwrap(), "42");
        assert_eq!(report.steps, 3);
        assert!(report.conversation[3]
            .content
            .starts_with("Error: could not parse tool call"));
        assert_eq!(report.conversation[5].content, "42");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let model = ScriptedModel::new(vec![Err(ProviderError::transport("connection refused"))]);
        let (agent, _) = builtin_agent(model.clone());

        let err = agent.run("Hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(ProviderError::Transport(_))));
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn test_max_steps_floor() {
        let agent = Agent::new(ScriptedModel::texts(&[]), ToolRegistry::new(), "s").with_max_steps(0);
        assert_eq!(agent.max_steps(), 1);
    }
}
