//! Task comments and notes through the Asana REST API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{build_client, check_status, trim_base_url};
use crate::sync::tracker::Tracker;

/// Asana API client authenticated with a personal access token.
pub struct AsanaClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

/// Asana wraps every request and response body in `{"data": ...}`
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Serialize)]
struct StoryBody<'a> {
    text: &'a str,
}

#[derive(Serialize, Deserialize)]
struct TaskNotes {
    #[serde(default)]
    html_notes: Option<String>,
}

impl AsanaClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            token: token.to_string(),
            http: build_client()?,
        })
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, task_id)
    }
}

impl Tracker for AsanaClient {
    async fn post_comment(&self, task_id: &str, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/stories", self.task_url(task_id)))
            .bearer_auth(&self.token)
            .json(&Envelope {
                data: StoryBody { text },
            })
            .send()
            .await
            .context("Failed to connect to Asana")?;
        check_status(resp, "Creating story").await?;
        Ok(())
    }

    async fn fetch_notes(&self, task_id: &str) -> Result<Option<String>> {
        let resp = self
            .http
            .get(self.task_url(task_id))
            .query(&[("opt_fields", "html_notes")])
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to connect to Asana")?;
        let task: Envelope<TaskNotes> = check_status(resp, "Fetching task")
            .await?
            .json()
            .await
            .context("Failed to parse task response")?;
        Ok(task.data.html_notes)
    }

    async fn update_notes(&self, task_id: &str, html_notes: &str) -> Result<()> {
        let resp = self
            .http
            .put(self.task_url(task_id))
            .bearer_auth(&self.token)
            .json(&Envelope {
                data: TaskNotes {
                    html_notes: Some(html_notes.to_string()),
                },
            })
            .send()
            .await
            .context("Failed to connect to Asana")?;
        check_status(resp, "Updating task").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeAsana {
        notes: Mutex<HashMap<String, String>>,
        stories: Mutex<Vec<(String, String)>>,
    }

    type Shared = Arc<FakeAsana>;

    async fn create_story(
        State(state): State<Shared>,
        Path(gid): Path<String>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let text = body["data"]["text"].as_str().unwrap_or_default().to_string();
        state.stories.lock().unwrap().push((gid, text));
        (StatusCode::CREATED, Json(json!({"data": {"gid": "1"}})))
    }

    async fn get_task(State(state): State<Shared>, Path(gid): Path<String>) -> (StatusCode, Json<Value>) {
        match state.notes.lock().unwrap().get(&gid) {
            Some(notes) => (
                StatusCode::OK,
                Json(json!({"data": {"gid": gid, "html_notes": notes}})),
            ),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"errors": [{"message": "task: Not a recognized ID"}]})),
            ),
        }
    }

    async fn update_task(
        State(state): State<Shared>,
        Path(gid): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let notes = body["data"]["html_notes"].as_str().unwrap_or_default().to_string();
        state.notes.lock().unwrap().insert(gid.clone(), notes);
        Json(json!({"data": {"gid": gid}}))
    }

    async fn fake_asana() -> (Shared, AsanaClient) {
        let state: Shared = Arc::default();
        state
            .notes
            .lock()
            .unwrap()
            .insert("456".into(), "<body>Original</body>".into());
        let app = Router::new()
            .route("/tasks/{gid}/stories", post(create_story))
            .route("/tasks/{gid}", get(get_task).put(update_task))
            .with_state(state.clone());
        let base = mock::serve(app).await;
        (state, AsanaClient::new(&base, "asana-token").unwrap())
    }

    #[tokio::test]
    async fn test_post_comment() {
        let (state, client) = fake_asana().await;
        client.post_comment("456", "Pull Request merged").await.unwrap();
        assert_eq!(
            state.stories.lock().unwrap().as_slice(),
            &[("456".to_string(), "Pull Request merged".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_and_update_notes() {
        let (state, client) = fake_asana().await;
        assert_eq!(
            client.fetch_notes("456").await.unwrap().as_deref(),
            Some("<body>Original</body>")
        );

        client.update_notes("456", "<body>Updated</body>").await.unwrap();
        assert_eq!(
            state.notes.lock().unwrap().get("456").map(String::as_str),
            Some("<body>Updated</body>")
        );
    }

    #[tokio::test]
    async fn test_fetch_unknown_task_reports_api_message() {
        let (_state, client) = fake_asana().await;
        let err = client.fetch_notes("999").await.unwrap_err().to_string();
        assert!(err.contains("404"), "Unexpected error: {err}");
        assert!(err.contains("Not a recognized ID"), "Unexpected error: {err}");
    }

    #[test]
    fn test_task_notes_missing_field() {
        let task: Envelope<TaskNotes> = serde_json::from_str(r#"{"data": {"gid": "1"}}"#).unwrap();
        assert!(task.data.html_notes.is_none());
    }

    #[test]
    fn test_story_body_shape() {
        let body = serde_json::to_value(Envelope {
            data: StoryBody { text: "hi" },
        })
        .unwrap();
        assert_eq!(body, json!({"data": {"text": "hi"}}));
    }
}
