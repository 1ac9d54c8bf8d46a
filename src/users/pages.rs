use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{error, instrument, warn};

use crate::state::AppState;

use super::dto::{Pagination, UserForm};
use super::error::UserError;
use super::views::{self, FormValues};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/users") }))
        .route("/users", get(users_page))
        .route("/create", get(create_form).post(create_submit))
        .route("/edit/:id", get(edit_form).post(edit_submit))
        .route("/delete/:id", get(delete_submit))
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(views::message_page("Not found", "User not found")),
    )
        .into_response()
}

/// Anything the operator cannot fix from the form.
fn failure(e: UserError) -> Response {
    if let UserError::NotFound = e {
        return not_found();
    }
    error!(error = ?e, "page request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::message_page("Error", "Something went wrong")),
    )
        .into_response()
}

fn values(form: &UserForm) -> FormValues<'_> {
    FormValues {
        username: &form.username,
        email: &form.email,
        full_name: form.full_name.as_deref().unwrap_or(""),
    }
}

#[instrument(skip(state))]
pub async fn users_page(State(state): State<AppState>, Query(p): Query<Pagination>) -> Response {
    match state.users.list(p.offset, p.limit).await {
        Ok(users) => Html(views::users_page(&users)).into_response(),
        Err(e) => failure(e),
    }
}

pub async fn create_form() -> Html<String> {
    Html(views::create_form(FormValues::default(), None))
}

#[instrument(skip(state, form))]
pub async fn create_submit(State(state): State<AppState>, Form(form): Form<UserForm>) -> Response {
    let sticky = UserForm {
        username: form.username.clone(),
        email: form.email.clone(),
        full_name: form.full_name.clone(),
        password: None,
    };
    match state.users.create(form.into_candidate()).await {
        Ok(_) => Redirect::to("/users").into_response(),
        Err(e) if e.is_user_facing() => {
            warn!(error = %e, "create form rejected");
            Html(views::create_form(values(&sticky), Some(&e.to_string()))).into_response()
        }
        Err(e) => failure(e),
    }
}

#[instrument(skip(state))]
pub async fn edit_form(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.users.get_by_id(id).await {
        Ok(Some(user)) => Html(views::edit_form(id, FormValues::from(&user), None)).into_response(),
        Ok(None) => not_found(),
        Err(e) => failure(e),
    }
}

#[instrument(skip(state, form))]
pub async fn edit_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UserForm>,
) -> Response {
    let sticky = UserForm {
        username: form.username.clone(),
        email: form.email.clone(),
        full_name: form.full_name.clone(),
        password: None,
    };
    match state.users.update(id, form.into_patch()).await {
        Ok(Some(_)) => Redirect::to("/users").into_response(),
        Ok(None) => not_found(),
        Err(e) if e.is_user_facing() => {
            warn!(user_id = id, error = %e, "edit form rejected");
            Html(views::edit_form(id, values(&sticky), Some(&e.to_string()))).into_response()
        }
        Err(e) => failure(e),
    }
}

#[instrument(skip(state))]
pub async fn delete_submit(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.users.delete(id).await {
        Ok(Some(_)) => Redirect::to("/users").into_response(),
        Ok(None) => not_found(),
        Err(e) => failure(e),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn send(app: Router, method: Method, uri: &str, form: Option<&str>) -> (u16, String, String) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match form {
            Some(f) => {
                req = req.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(f.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, location, String::from_utf8_lossy(&bytes).into_owned())
    }

    const ALICE: &str = "username=alice&email=alice%40example.com&full_name=Alice+A&password=secret1";

    #[tokio::test]
    async fn root_redirects_to_listing() {
        let app = build_app(AppState::fake());
        let (status, location, _) = send(app, Method::GET, "/", None).await;
        assert_eq!(status, 303);
        assert_eq!(location, "/users");
    }

    #[tokio::test]
    async fn create_redirects_and_lists() {
        let app = build_app(AppState::fake());
        let (status, location, _) = send(app.clone(), Method::POST, "/create", Some(ALICE)).await;
        assert_eq!(status, 303);
        assert_eq!(location, "/users");

        let (status, _, html) = send(app, Method::GET, "/users", None).await;
        assert_eq!(status, 200);
        assert!(html.contains("alice@example.com"));
        assert!(html.contains("Alice A"));
    }

    #[tokio::test]
    async fn duplicate_rerenders_form_with_values() {
        let app = build_app(AppState::fake());
        send(app.clone(), Method::POST, "/create", Some(ALICE)).await;

        let form = "username=alice&email=other%40example.com&full_name=&password=secret1";
        let (status, _, html) = send(app, Method::POST, "/create", Some(form)).await;
        assert_eq!(status, 200);
        assert!(html.contains("Username already exists"));
        assert!(html.contains(r#"value="other@example.com""#));
        assert!(!html.contains("secret1"));
    }

    #[tokio::test]
    async fn edit_keeps_password_when_blank() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        send(app.clone(), Method::POST, "/create", Some(ALICE)).await;

        let (status, _, html) = send(app.clone(), Method::GET, "/edit/1", None).await;
        assert_eq!(status, 200);
        assert!(html.contains(r#"value="alice@example.com""#));

        let form = "username=alice&email=alice2%40example.com&full_name=&password=";
        let (status, location, _) = send(app, Method::POST, "/edit/1", Some(form)).await;
        assert_eq!(status, 303);
        assert_eq!(location, "/users");

        let user = state.users.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.email, "alice2@example.com");
        assert_eq!(user.full_name, None);
        assert!(state.users.hasher().verify_password("secret1", &user.password_hash));
    }

    #[tokio::test]
    async fn edit_validation_error_rerenders() {
        let app = build_app(AppState::fake());
        send(app.clone(), Method::POST, "/create", Some(ALICE)).await;

        let form = "username=al&email=alice%40example.com&full_name=&password=";
        let (status, _, html) = send(app, Method::POST, "/edit/1", Some(form)).await;
        assert_eq!(status, 200);
        assert!(html.contains("between 3 and 50"));
        assert!(html.contains(r#"action="/edit/1""#));
    }

    #[tokio::test]
    async fn missing_user_is_404() {
        let app = build_app(AppState::fake());
        let form = "username=alice&email=alice%40example.com&full_name=&password=";
        for (method, uri, body) in [
            (Method::GET, "/edit/9", None),
            (Method::POST, "/edit/9", Some(form)),
            (Method::GET, "/delete/9", None),
        ] {
            let (status, _, _) = send(app.clone(), method, uri, body).await;
            assert_eq!(status, 404, "{uri}");
        }
    }

    #[tokio::test]
    async fn delete_redirects() {
        let app = build_app(AppState::fake());
        send(app.clone(), Method::POST, "/create", Some(ALICE)).await;
        let (status, location, _) = send(app.clone(), Method::GET, "/delete/1", None).await;
        assert_eq!(status, 303);
        assert_eq!(location, "/users");
        let (_, _, html) = send(app, Method::GET, "/users", None).await;
        assert!(html.contains("No users yet."));
    }
}
