use crate::domain::model::{Priority, Task};
use crate::domain::ports::{ChatMessage, ChatModel};
use crate::utils::error::{AppError, Result};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful real estate assistant. Answer questions about \
buying, selling and renting homes, mortgages, refinancing and home maintenance. \
Keep answers short and practical.";

const TASK_SYSTEM_PROMPT: &str = "You are a home-ownership planner. Produce a personalized list of \
5 to 8 concrete tasks for the user. Respond ONLY with a JSON array; each element must be an \
object with the keys \"title\", \"category\", \"due_date\" (YYYY-MM-DD) and \"priority\" \
(one of \"high\", \"medium\", \"low\"). Do not add any commentary.";

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    pub user_id: String,
    #[serde(default)]
    pub credit_score: Option<serde_json::Value>,
    #[serde(default)]
    pub refinancing_info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedTask {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

pub struct Assistant {
    model: Arc<dyn ChatModel>,
}

impl Assistant {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn reply(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::validation("Message cannot be empty"));
        }

        let messages = [
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(message),
        ];
        let reply = self.model.complete(&messages).await?;
        Ok(reply.trim().to_string())
    }

    /// Asks the model for a task list and converts it into unsaved tasks
    /// owned by `request.user_id`.
    pub async fn generate_tasks(&self, request: &TaskRequest) -> Result<Vec<Task>> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::validation("Missing user_id"));
        }

        let messages = [
            ChatMessage::system(TASK_SYSTEM_PROMPT),
            ChatMessage::user(task_prompt(request)),
        ];
        let reply = self.model.complete(&messages).await?;
        let tasks = parse_tasks(&reply, &request.user_id)?;

        tracing::info!(
            "🗒️ Generated {} tasks for user {}",
            tasks.len(),
            request.user_id
        );
        Ok(tasks)
    }
}

fn task_prompt(request: &TaskRequest) -> String {
    let credit_score = match &request.credit_score {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => "unknown".to_string(),
    };
    let refinancing = request
        .refinancing_info
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("not refinancing");

    format!(
        "Today is {}. My credit score is {}. Situation: {}",
        Utc::now().format("%Y-%m-%d"),
        credit_score,
        refinancing
    )
}

/// Extracts the JSON task array from a model reply. Tolerates markdown code
/// fences and prose around the array.
pub fn parse_tasks(reply: &str, user_id: &str) -> Result<Vec<Task>> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(AppError::upstream(
                "language model reply did not contain a task list",
            ))
        }
    };

    let generated: Vec<GeneratedTask> = serde_json::from_str(json).map_err(|e| {
        AppError::upstream(format!("language model returned malformed tasks: {}", e))
    })?;

    let now = Utc::now();
    Ok(generated
        .into_iter()
        .filter_map(|g| {
            let title = g.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(Task {
                id: String::new(),
                user_id: user_id.to_string(),
                title,
                category: g.category.unwrap_or_else(|| "general".to_string()),
                due_date: g.due_date.unwrap_or_default(),
                priority: g
                    .priority
                    .as_deref()
                    .map(Priority::parse_lenient)
                    .unwrap_or_default(),
                completed: false,
                created_at: now,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct ScriptedModel {
        reply: String,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().await.push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn scripted(reply: &str) -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_parse_tasks_with_code_fence() {
        let reply = "Here you go:\n```json\n[\
            {\"title\": \"Pull credit report\", \"category\": \"finance\", \"due_date\": \"2025-07-01\", \"priority\": \"High\"},\
            {\"title\": \"  \", \"category\": \"noise\"},\
            {\"title\": \"Compare lenders\", \"priority\": \"someday\"}\
        ]\n```";

        let tasks = parse_tasks(reply, "u1").unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Pull credit report");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[1].category, "general");
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert!(tasks.iter().all(|t| t.user_id == "u1" && !t.completed));
    }

    #[test]
    fn test_parse_tasks_rejects_prose() {
        let err = parse_tasks("I cannot help with that.", "u1").unwrap_err();
        assert!(matches!(err, AppError::UpstreamError { .. }));
        assert!(parse_tasks("[not json]", "u1").is_err());
    }

    #[tokio::test]
    async fn test_reply_sends_system_prompt_and_trims() {
        let model = scripted("  Get pre-approved first.  ");
        let assistant = Assistant::new(model.clone());

        let reply = assistant.reply("How do I get a mortgage?").await.unwrap();
        assert_eq!(reply, "Get pre-approved first.");

        let seen = model.seen.lock().await;
        assert_eq!(seen[0][0].content, CHAT_SYSTEM_PROMPT);
        assert_eq!(seen[0][1].content, "How do I get a mortgage?");
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_model() {
        let model = scripted("unused");
        let assistant = Assistant::new(model.clone());

        assert!(assistant.reply("   ").await.is_err());
        assert!(model.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_generate_tasks_prompt_includes_profile() {
        let model = scripted(r#"[{"title": "Lock rate", "priority": "low"}]"#);
        let assistant = Assistant::new(model.clone());
        let request = TaskRequest {
            user_id: "u9".to_string(),
            credit_score: Some(serde_json::json!(720)),
            refinancing_info: Some("first-time buyer".to_string()),
        };

        let tasks = assistant.generate_tasks(&request).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Low);

        let seen = model.seen.lock().await;
        let prompt = &seen[0][1].content;
        assert!(prompt.contains("720"));
        assert!(prompt.contains("first-time buyer"));
    }
}
