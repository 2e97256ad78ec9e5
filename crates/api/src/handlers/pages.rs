//! Server-rendered pages. Markup is intentionally minimal; the pages talk
//! to the JSON API from the browser.

use axum::response::{Html, Redirect};

use crate::middleware::dual_auth::DualAuthPage;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>NIK Confirmation - Login</title></head>
<body>
<h1>NIK Confirmation</h1>
<form id="login">
  <label>Username <input name="username" autocomplete="username" required></label>
  <label>Password <input name="password_laravel" type="password" required></label>
  <label>SAP password <input name="password_sap" type="password" required></label>
  <button type="submit">Login</button>
</form>
<p id="status"></p>
<script>
document.getElementById('login').addEventListener('submit', async (e) => {
  e.preventDefault();
  const body = Object.fromEntries(new FormData(e.target));
  const res = await fetch('/api/auth/login', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify(body),
  });
  const json = await res.json();
  if (json.success) { window.location = '/dashboard'; }
  else { document.getElementById('status').textContent = json.error; }
});
</script>
</body>
</html>
"#;

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/login")
}

/// GET /login
pub async fn login() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// GET /dashboard
pub async fn dashboard(DualAuthPage(auth): DualAuthPage) -> Html<String> {
    Html(shell(
        "Dashboard",
        &format!(
            "<p>Signed in as {}.</p><p><a href=\"/nik-confirmation\">NIK confirmations</a></p>",
            escape_html(&auth.user.name)
        ),
    ))
}

/// GET /nik-confirmation
pub async fn nik_confirmation(DualAuthPage(_auth): DualAuthPage) -> Html<String> {
    Html(shell(
        "NIK Confirmation",
        "<p>Data is served by <code>/api/nik/display</code>.</p>",
    ))
}

fn shell(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n\
         <form method=\"post\" action=\"/api/auth/logout\" onsubmit=\"fetch(this.action,{{method:'POST'}}).then(()=>location='/login');return false;\">\
         <button type=\"submit\">Logout</button></form>\n</body>\n</html>\n"
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
