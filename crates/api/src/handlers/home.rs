use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Firewatch</title></head>
<body>
<h1>Firewatch fire-alert relay</h1>
<p>Status: <strong style="color: green;">ACTIVE</strong></p>
<p>Endpoints:</p>
<ul>
  <li>POST /alert - sensor alerts</li>
  <li>POST /api/test-alert - synthetic alert</li>
  <li>POST /upload/{photo|video|audio} - evidence upload</li>
  <li>POST /analyze - classify uploaded evidence</li>
  <li>POST /send-result - operator feedback</li>
  <li>GET /status - server status</li>
  <li>GET /alertas - alert history</li>
  <li>GET /api/dashboard-data - dashboard aggregates</li>
</ul>
</body>
</html>
"#;

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
