//! Server-rendered HTML board.
//!
//! Plain forms drive every action; each POST answers with a 303 back to the
//! board so a browser refresh never resubmits.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use super::dto::{CreateTaskForm, CreateTaskRequest};
use super::handlers::task_id;
use super::{ApiErrorResponse, AppState};
use crate::tasks::TaskView;
use crate::views::render_board;

type BoardResult<T> = Result<T, ApiErrorResponse>;

/// Query string carrying the selected view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardQuery {
    /// View name; `active` when absent.
    pub filter: Option<String>,
}

impl BoardQuery {
    fn view(&self) -> BoardResult<TaskView> {
        match self.filter.as_deref() {
            None | Some("") => Ok(TaskView::default()),
            Some(name) => Ok(name.parse::<TaskView>()?),
        }
    }
}

/// `GET /`
pub async fn index() -> Redirect {
    Redirect::to("/board")
}

/// `GET /board?filter=`
pub async fn show_board(
    State(state): State<AppState>,
    query: Result<Query<BoardQuery>, QueryRejection>,
) -> BoardResult<Html<String>> {
    let Query(query) = query?;
    let view = query.view()?;
    let html = state
        .run(move |service| {
            let tasks = service.find(view)?;
            render_board(view, &tasks, service.now())
        })
        .await?;
    Ok(Html(html))
}

/// `POST /board/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    form: Result<Form<CreateTaskForm>, FormRejection>,
) -> BoardResult<Redirect> {
    let Form(form) = form?;
    let new = CreateTaskRequest::from(form).into_new_task()?;
    state.run(move |service| service.create(new)).await?;
    Ok(Redirect::to("/board"))
}

/// `POST /board/tasks/{id}/{action}?filter=`
///
/// `action` is one of `complete`, `archive`, `unarchive` or `delete`.
pub async fn task_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    query: Result<Query<BoardQuery>, QueryRejection>,
) -> BoardResult<Redirect> {
    let Query(query) = query?;
    let view = query.view()?;
    let id = task_id(&id)?;

    match action.as_str() {
        "complete" => state.run(move |service| service.toggle_complete(id).map(drop)).await?,
        "archive" => state.run(move |service| service.archive(id).map(drop)).await?,
        "unarchive" => state.run(move |service| service.unarchive(id).map(drop)).await?,
        "delete" => state.run(move |service| service.delete(id)).await?,
        other => return Err(ApiErrorResponse::not_found(format!("unknown action: '{other}'"))),
    }

    Ok(Redirect::to(&format!("/board?filter={view}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{InMemoryTaskStore, NewTask, TaskService};
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(TaskService::new(Arc::new(InMemoryTaskStore::new())))
    }

    fn query(filter: Option<&str>) -> Result<Query<BoardQuery>, QueryRejection> {
        Ok(Query(BoardQuery { filter: filter.map(str::to_string) }))
    }

    fn location(redirect: Redirect) -> (StatusCode, String) {
        let response = redirect.into_response();
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        (response.status(), location)
    }

    #[test]
    fn test_board_query_view() {
        assert_eq!(BoardQuery::default().view().unwrap(), TaskView::Active);
        let q = BoardQuery { filter: Some("overdue".into()) };
        assert_eq!(q.view().unwrap(), TaskView::Overdue);
        let q = BoardQuery { filter: Some("someday".into()) };
        assert_eq!(q.view().unwrap_err().status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_index_redirects_to_board() {
        let (status, location) = location(index().await);
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/board");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_form_create_then_show() {
        let state = state();
        let form = CreateTaskForm { title: "Water plants".into(), due_date: Some(String::new()) };
        let (status, location) =
            location(create_task(State(state.clone()), Ok(Form(form))).await.unwrap());
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/board");

        let Html(html) = show_board(State(state), query(None)).await.unwrap();
        assert!(html.contains("Water plants"));
    }

    #[tokio::test]
    async fn test_form_create_rejects_empty_title() {
        let form = CreateTaskForm { title: String::new(), due_date: None };
        let err = create_task(State(state()), Ok(Form(form))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_actions_redirect_back_to_filter() {
        let state = state();
        let task = state.service.create(NewTask::new("act", None).unwrap()).unwrap();
        let id = task.id.to_string();

        for action in ["complete", "archive", "unarchive"] {
            let redirect = task_action(
                State(state.clone()),
                Path((id.clone(), action.to_string())),
                query(Some("completed")),
            )
            .await
            .unwrap();
            assert_eq!(location(redirect).1, "/board?filter=completed");
        }
        let stored = state.service.find_by_id(task.id).unwrap();
        assert!(stored.is_completed);
        assert!(!stored.is_archived);

        task_action(State(state.clone()), Path((id, "delete".into())), query(None)).await.unwrap();
        assert!(state.service.find_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_is_404() {
        let state = state();
        let task = state.service.create(NewTask::new("x", None).unwrap()).unwrap();
        let err = task_action(State(state), Path((task.id.to_string(), "explode".into())), query(None))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_unknown_filter_is_400() {
        let err = show_board(State(state()), query(Some("someday"))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
