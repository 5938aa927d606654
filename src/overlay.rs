//! Countdown document written into a freshly opened popup

use crate::validation::JobRequest;

/// Element id of the countdown number inside the overlay
pub const COUNTDOWN_ELEMENT_ID: &str = "countdown";

const STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            text-align: center;
            padding: 50px;
            margin: 0;
            height: 100vh;
            display: flex;
            flex-direction: column;
            justify-content: center;
            align-items: center;
        }
        .countdown { font-size: 4rem; font-weight: bold; margin: 30px; font-family: 'Courier New', monospace; }
        .countdown.low { color: #ff6b6b; animation: pulse 1s infinite; }
        .message { font-size: 1.3rem; margin-bottom: 20px; opacity: 0.9; }
        .url { background: rgba(255,255,255,0.2); padding: 15px 25px; border-radius: 10px; margin: 20px; word-break: break-all; font-size: 1.1rem; }
        @keyframes pulse { 0%, 100% { transform: scale(1); } 50% { transform: scale(1.05); } }
"#;

/// Render the countdown page shown before navigation
pub fn render(job: &JobRequest) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Web App Opener - Countdown</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>🚀 Web App Opener</h1>
    <div class="message">Opening in:</div>
    <div class="countdown" id="{COUNTDOWN_ELEMENT_ID}">{delay}</div>
    <div class="url">{url}</div>
    <div class="message">Will auto-close after {duration} seconds</div>
    <div class="message">⚠️ Manual login required due to browser security</div>
</body>
</html>
"#,
        delay = job.delay_seconds(),
        url = escape_html(job.target_url().as_str()),
        duration = job.duration_seconds(),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
