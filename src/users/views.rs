//! Server-rendered HTML for the user pages.

use std::fmt::Write;

use time::macros::format_description;

use super::repo_types::User;

/// Values echoed back into a form after a failed submit.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub full_name: &'a str,
}

impl<'a> From<&'a User> for FormValues<'a> {
    fn from(u: &'a User) -> Self {
        Self {
            username: &u.username,
            email: &u.email,
            full_name: u.full_name.as_deref().unwrap_or(""),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

fn error_block(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!(r#"<p class="error" role="alert">{}</p>"#, escape(msg)),
        None => String::new(),
    }
}

pub fn users_page(users: &[User]) -> String {
    let created_fmt = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let mut rows = String::new();
    for u in users {
        let created = u
            .created_at
            .format(&created_fmt)
            .unwrap_or_else(|_| u.created_at.to_string());
        // writing into a String cannot fail
        let _ = write!(
            rows,
            r#"<tr><td>{id}</td><td>{username}</td><td>{email}</td><td>{full_name}</td><td>{created}</td><td><a href="/edit/{id}">Edit</a> <a href="/delete/{id}" onclick="return confirm('Delete this user?')">Delete</a></td></tr>
"#,
            id = u.id,
            username = escape(&u.username),
            email = escape(&u.email),
            full_name = escape(u.full_name.as_deref().unwrap_or("")),
            created = created,
        );
    }
    let table = if users.is_empty() {
        "<p>No users yet.</p>".to_string()
    } else {
        format!(
            "<table>\n<thead><tr><th>ID</th><th>Username</th><th>Email</th><th>Full name</th><th>Created</th><th></th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>"
        )
    };
    layout(
        "Users",
        &format!(r#"<p><a href="/create">Create user</a></p>{table}"#),
    )
}

pub fn message_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(r#"<p>{}</p><p><a href="/users">Back to users</a></p>"#, escape(message)),
    )
}

fn user_fields(values: FormValues<'_>, password_required: bool) -> String {
    let (password_label, required) = if password_required {
        ("Password", " required")
    } else {
        ("New password (leave blank to keep)", "")
    };
    format!(
        r#"<label>Username <input name="username" value="{username}" required></label>
<label>Email <input name="email" type="email" value="{email}" required></label>
<label>Full name <input name="full_name" value="{full_name}"></label>
<label>{password_label} <input name="password" type="password"{required}></label>
"#,
        username = escape(values.username),
        email = escape(values.email),
        full_name = escape(values.full_name),
    )
}

pub fn create_form(values: FormValues<'_>, error: Option<&str>) -> String {
    let body = format!(
        r#"{error}<form method="post" action="/create">
{fields}<button type="submit">Create</button>
</form>
<p><a href="/users">Back</a></p>"#,
        error = error_block(error),
        fields = user_fields(values, true),
    );
    layout("Create user", &body)
}

pub fn edit_form(id: i64, values: FormValues<'_>, error: Option<&str>) -> String {
    let body = format!(
        r#"{error}<form method="post" action="/edit/{id}">
{fields}<button type="submit">Save</button>
</form>
<p><a href="/users">Back</a></p>"#,
        error = error_block(error),
        fields = user_fields(values, false),
    );
    layout("Edit user", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: Some("<script>alert(1)</script>".into()),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn escape_html_specials() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn listing_escapes_and_hides_hash() {
        let html = users_page(&[user()]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("argon2"));
        assert!(html.contains(r#"href="/edit/7""#));
        assert!(html.contains("1970-01-01 00:00"));
    }

    #[test]
    fn empty_listing() {
        assert!(users_page(&[]).contains("No users yet."));
    }

    #[test]
    fn create_form_is_sticky_and_shows_error() {
        let values = FormValues {
            username: "bob\"",
            email: "bob@example.com",
            full_name: "",
        };
        let html = create_form(values, Some("Username already exists"));
        assert!(html.contains(r#"value="bob&quot;""#));
        assert!(html.contains("Username already exists"));
        assert!(html.contains(r#"type="password" required"#));
    }

    #[test]
    fn edit_form_prefills_user() {
        let u = user();
        let html = edit_form(u.id, FormValues::from(&u), None);
        assert!(html.contains(r#"action="/edit/7""#));
        assert!(html.contains(r#"value="alice@example.com""#));
        assert!(!html.contains("role=\"alert\""));
    }
}
