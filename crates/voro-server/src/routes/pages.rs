//! Server-rendered pages.
//!
//! - `/` — rotating pitch and the inquiry email form
//! - `/i` — intake brief form, prefilled from the `email` and `t` query values
//! - `/privacy` — what is collected and how to request deletion
//!
//! Pages are static templates with `{{PLACEHOLDER}}` slots. Markup slots are
//! rendered through `maud` first, so substituted values arrive HTML-escaped;
//! the typewriter phrases go in as a JSON literal. Query values are only read
//! by the page script, which assigns them to form fields and never writes
//! them as markup.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use chrono::{Datelike, Utc};
use maud::html;

use crate::state::AppState;

/// Phrases cycled by the landing page typewriter.
pub const ROTATION_LINES: [&str; 5] = [
    "better my brand.",
    "launch a site that converts.",
    "redesign my product.",
    "stand out from competitors.",
    "turn visitors into clients.",
];

pub const PROJECT_TYPES: [&str; 6] = [
    "Website Redesign",
    "UX Audit",
    "CRO",
    "New Build",
    "Design System",
    "Research",
];

pub const BUDGETS: [&str; 5] = ["<$2.5k", "$2.5–5k", "$5–10k", "$10–25k", "$25k+"];

pub const TIMELINES: [&str; 4] = ["ASAP (<2w)", "2–4w", "1–3m", "3m+"];

/// Build the pages router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/i", get(intake_page))
        .route("/privacy", get(privacy_page))
}

async fn landing_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let lines = serde_json::to_string(&ROTATION_LINES).unwrap_or_else(|_| "[]".to_owned());

    let body = LANDING_BODY.replace("{{LINES}}", &lines);
    Html(render(&state, "Design that converts", &body))
}

async fn intake_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let body = INTAKE_BODY
        .replace("{{PROJECT_TYPES}}", &options(&PROJECT_TYPES))
        .replace("{{BUDGETS}}", &options(&BUDGETS))
        .replace("{{TIMELINES}}", &options(&TIMELINES));
    Html(render(&state, "Quick intake", &body))
}

async fn privacy_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let contact = match &state.contact {
        Some(address) => html! {
            "email " a href={ "mailto:" (address) } { (address) } "."
        },
        None => html! { "reply to any message you received from us." },
    };

    let body = PRIVACY_BODY.replace("{{CONTACT}}", &contact.into_string());
    Html(render(&state, "Privacy", &body))
}

/// Wrap `body` in the shared document shell.
fn render(state: &AppState, title: &str, body: &str) -> String {
    let brand = html! { (state.brand) }.into_string();
    let title = html! { (title) }.into_string();

    let mut page = String::with_capacity(PAGE_HEAD.len() + body.len() + PAGE_FOOT.len());
    page.push_str(&PAGE_HEAD.replace("{{TITLE}}", &title));
    page.push_str(body);
    page.push_str(&PAGE_FOOT.replace("{{YEAR}}", &Utc::now().year().to_string()));
    page.replace("{{BRAND}}", &brand)
}

fn options(values: &[&str]) -> String {
    html! {
        option value="" { "Select…" }
        @for value in values {
            option value=(value) { (value) }
        }
    }
    .into_string()
}

const PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{{BRAND}} &mdash; {{TITLE}}</title>
<meta name="description" content="{{BRAND}} &mdash; design that converts."/>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
:root{--brand:13 148 136;--ink:#111;--muted:#6b7280;--line:#d4d4d4;--font:Inter,system-ui,'Segoe UI',Arial,sans-serif}
body{font-family:var(--font);color:var(--ink);background:#fff;line-height:1.5;-webkit-font-smoothing:antialiased}
main{min-height:100vh;display:grid;place-items:center;padding:48px 20px}
a{color:inherit}
.stack{width:100%;max-width:36rem;margin:0 auto}
.center{text-align:center}
.eyebrow{font-size:.875rem;color:var(--muted);margin-bottom:.5rem}
.hero-title{font-size:clamp(2.25rem,6vw,3rem);font-weight:900;font-style:italic;letter-spacing:-.02em;min-height:1.3em}
.underline-brand{text-decoration:underline;text-underline-offset:6px;text-decoration-thickness:3px;text-decoration-color:rgb(var(--brand))}
.caret{display:inline-block;width:3px;height:1em;margin-left:4px;background:var(--ink);vertical-align:-.1em;animation:blink 1s steps(1) infinite}
@keyframes blink{50%{opacity:0}}
@media (prefers-reduced-motion:reduce){.caret{animation:none}}
.row{display:flex;gap:8px;align-items:center;margin-top:24px}
.pill{height:48px;flex:1;border-radius:999px;border:1px solid var(--line);padding:0 20px;font:inherit;background:rgba(255,255,255,.8)}
.round{height:40px;width:40px;border-radius:999px;border:0;background:var(--ink);color:#fff;display:grid;place-items:center;cursor:pointer}
.round:disabled{opacity:.7}
.hp{position:absolute;left:-10000px;width:1px;height:1px;overflow:hidden}
.fine{font-size:11px;color:#9ca3af;margin-top:12px}
.alert{color:#dc2626;font-size:.875rem;margin-top:8px}
.ok{color:#059669}
form.brief{display:grid;gap:12px;text-align:left}
.grid2{display:grid;grid-template-columns:1fr;gap:12px}
@media (min-width:640px){.grid2{grid-template-columns:1fr 1fr}}
label span{display:block;margin-bottom:4px;font-size:.875rem;color:#525252}
.field{width:100%;height:44px;border-radius:12px;border:1px solid var(--line);padding:0 16px;font:inherit;background:#fff;color:var(--ink)}
textarea.field{height:auto;min-height:110px;padding:12px 16px}
.submit{height:44px;border-radius:999px;border:0;background:var(--ink);color:#fff;font:inherit;font-weight:600;cursor:pointer}
.submit:disabled{opacity:.7}
footer{position:fixed;bottom:24px;left:0;right:0;text-align:center;font-size:11px;color:#9ca3af}
.prose{max-width:40rem}
.prose h1{font-size:2rem;margin-bottom:1rem}
.prose p{margin-bottom:1rem;color:#374151}
</style></head><body>
"##;

const PAGE_FOOT: &str = r##"<footer>&copy; {{YEAR}} {{BRAND}}. All rights reserved. &middot; <a href="/privacy">Privacy</a></footer>
</body></html>"##;

const LANDING_BODY: &str = r##"<main>
<section class="stack center" id="pitch">
  <p class="eyebrow">I want to</p>
  <h1 class="hero-title"><span class="underline-brand" id="typed"></span><span class="caret" aria-hidden="true"></span></h1>
  <form id="inquiry" aria-label="Inquiry form" novalidate>
    <div class="row">
      <input class="pill" type="email" name="email" inputmode="email" autocomplete="email" placeholder="work@email.com" required/>
      <button class="round" type="submit" aria-label="Send inquiry">
        <svg width="18" height="18" viewBox="0 0 24 24" fill="none" aria-hidden="true"><path d="M5 12h12M13 6l6 6-6 6" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"/></svg>
      </button>
    </div>
    <div class="hp" aria-hidden="true"><label>Leave this empty <input type="text" name="hp" tabindex="-1" autocomplete="off"/></label></div>
    <p class="alert" role="alert" id="inquiry-error" hidden></p>
    <p class="fine">No spam. We&rsquo;ll reply quickly.</p>
  </form>
</section>
<section class="stack center" id="thanks" hidden>
  <h2>Thank you for reaching out</h2>
  <p class="eyebrow">We have received your inquiry and will reach out shortly</p>
</section>
</main>
<script>
(function () {
  var LINES = {{LINES}};
  var TYPE_MS = 34, HOLD_MS = 1400, REDUCED_HOLD_MS = 2200;
  var reduce = window.matchMedia && window.matchMedia("(prefers-reduced-motion: reduce)").matches;
  var typed = document.getElementById("typed");
  var index = 0;

  function next() {
    var chars = Array.from(LINES[index]);
    index = (index + 1) % LINES.length;
    if (reduce) {
      typed.textContent = chars.join("");
      setTimeout(next, REDUCED_HOLD_MS);
      return;
    }
    var i = 0;
    typed.textContent = "";
    var timer = setInterval(function () {
      i++;
      typed.textContent = chars.slice(0, i).join("");
      if (i >= chars.length) {
        clearInterval(timer);
        setTimeout(next, HOLD_MS);
      }
    }, TYPE_MS);
  }
  next();

  var form = document.getElementById("inquiry");
  var error = document.getElementById("inquiry-error");
  var button = form.querySelector("button");
  var t0 = Date.now();

  function fail(message) {
    error.textContent = message;
    error.hidden = false;
  }

  form.addEventListener("submit", function (e) {
    e.preventDefault();
    error.hidden = true;
    var email = form.email.value.trim();
    if (!/^[^\s@]+@[^\s@]+\.[^\s@]+$/.test(email)) return fail("Please enter a valid email.");
    if (Date.now() - t0 < 1200) return fail("Please try again.");

    button.disabled = true;
    fetch("/api/inquiry", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ email: email, hp: form.hp.value })
    })
      .then(function (r) { return r.json(); })
      .then(function (j) {
        if (j.ok) {
          document.getElementById("pitch").hidden = true;
          document.getElementById("thanks").hidden = false;
        } else {
          fail("Something went wrong. Try again.");
        }
      })
      .catch(function () { fail("Network error. Try again."); })
      .finally(function () { button.disabled = false; });
  });
})();
</script>
"##;

const INTAKE_BODY: &str = r##"<main>
<section class="stack" id="brief-section">
  <h1 style="font-size:1.75rem;margin-bottom:.5rem">Quick intake</h1>
  <p class="eyebrow" style="margin-bottom:2rem">2&ndash;3 minutes. This helps us reply with the right plan and estimate.</p>
  <p class="alert" id="brief-notice" hidden>Invalid or missing link. Please open the link from your email, or enter your email below.</p>
  <form class="brief" id="brief" novalidate>
    <label><span>Email</span><input class="field" type="email" name="email" inputmode="email" autocomplete="email" placeholder="you@company.com"/></label>
    <div class="grid2">
      <label><span>Full name</span><input class="field" name="fullName" placeholder="Jane Doe" maxlength="500"/></label>
      <label><span>Company</span><input class="field" name="company" placeholder="Acme Inc." maxlength="500"/></label>
    </div>
    <label><span>Website</span><input class="field" name="website" placeholder="https://" maxlength="500"/></label>
    <div class="grid2">
      <label><span>Project type</span><select class="field" name="projectType">{{PROJECT_TYPES}}</select></label>
      <label><span>Budget</span><select class="field" name="budget">{{BUDGETS}}</select></label>
    </div>
    <label><span>Timeline</span><select class="field" name="timeline">{{TIMELINES}}</select></label>
    <label><span>Goals</span><textarea class="field" name="goals" placeholder="What should this project achieve?" maxlength="5000"></textarea></label>
    <label><span>Details</span><textarea class="field" name="details" placeholder="Anything else we should know" maxlength="5000"></textarea></label>
    <button class="submit" type="submit">Send brief</button>
    <p class="alert" role="alert" id="brief-error" hidden></p>
  </form>
</section>
<section class="stack center" id="brief-done" hidden>
  <h2>Thanks &mdash; your brief is in</h2>
  <p class="eyebrow">We&rsquo;ll review and reach out as soon as possible.</p>
</section>
</main>
<script>
(function () {
  var params = new URLSearchParams(window.location.search);
  var token = params.get("t") || params.get("token") || "";
  var form = document.getElementById("brief");
  var error = document.getElementById("brief-error");
  var button = form.querySelector("button");
  var FIELDS = ["fullName", "company", "website", "projectType", "budget", "timeline", "goals", "details"];

  form.email.value = params.get("email") || "";
  if (!token && !form.email.value) document.getElementById("brief-notice").hidden = false;
  if (token && form.email.value) form.email.readOnly = true;

  function fail(message) {
    error.textContent = message;
    error.hidden = false;
  }

  form.addEventListener("submit", function (e) {
    e.preventDefault();
    error.hidden = true;
    var body = {};
    if (token) body.token = token;
    else body.email = form.email.value.trim();
    FIELDS.forEach(function (name) { body[name] = form[name].value.trim(); });

    if ((!token && !body.email) || !body.company || !body.goals) {
      return fail("Please complete at least email, company, and goals.");
    }

    button.disabled = true;
    fetch("/api/intake", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body)
    })
      .then(function (r) { return r.json(); })
      .then(function (j) {
        if (j.ok) {
          document.getElementById("brief-section").hidden = true;
          document.getElementById("brief-done").hidden = false;
        } else if (j.code === "invalid_token") {
          fail("This link is invalid or has expired. Please use the latest link from your email.");
        } else {
          fail("Something went wrong. Reply to the email and we’ll take it from there.");
        }
      })
      .catch(function () { fail("Network error. Try again."); })
      .finally(function () { button.disabled = false; });
  });
})();
</script>
"##;

const PRIVACY_BODY: &str = r##"<main>
<article class="prose">
  <h1>Privacy</h1>
  <p>We collect your email address and the answers you submit in the intake form.
  We use this information only to respond to your inquiry and evaluate fit.</p>
  <p>Data is stored in our email and internal tools. To request deletion, {{CONTACT}}</p>
</article>
</main>
"##;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use voro_core::mail::MemoryTransport;

    use crate::config::ServerConfig;
    use crate::routes::test_support::{app, app_with, config};

    async fn get_page(router: axum::Router, uri: &str) -> (u16, String, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn landing_page_has_form_and_honeypot() {
        let (status, content_type, html) = get_page(app(&MemoryTransport::new()), "/").await;

        assert_eq!(status, 200);
        assert!(content_type.starts_with("text/html"));
        assert!(html.contains(r#"id="inquiry""#));
        assert!(html.contains(r#"name="hp""#));
        assert!(html.contains("\"better my brand.\""));
        assert!(html.contains("Voro. All rights reserved."));
        assert!(!html.contains("{{"));
    }

    #[tokio::test]
    async fn intake_page_lists_choices() {
        let (status, _, html) = get_page(app(&MemoryTransport::new()), "/i").await;

        assert_eq!(status, 200);
        assert!(html.contains(r#"<option value="Website Redesign">Website Redesign</option>"#));
        assert!(html.contains(r#"<option value="&lt;$2.5k">&lt;$2.5k</option>"#));
        assert!(html.contains("ASAP (&lt;2w)"));
        assert!(!html.contains("{{"));
    }

    #[tokio::test]
    async fn intake_page_does_not_reflect_query() {
        let (_, _, html) = get_page(
            app(&MemoryTransport::new()),
            "/i?email=%3Cscript%3Ealert(1)%3C%2Fscript%3E",
        )
        .await;
        assert!(!html.contains("<script>alert(1)"));
    }

    #[tokio::test]
    async fn privacy_page_links_contact() {
        let (status, _, html) = get_page(app(&MemoryTransport::new()), "/privacy").await;

        assert_eq!(status, 200);
        assert!(html.contains(r#"href="mailto:owner@voro.ink""#));
    }

    #[tokio::test]
    async fn brand_is_escaped() {
        let config = ServerConfig {
            brand: "<b>Voro</b>".to_owned(),
            ..config()
        };
        let (router, _) = app_with(&config, &MemoryTransport::new());
        let (_, _, html) = get_page(router, "/").await;

        assert!(html.contains("&lt;b&gt;Voro&lt;/b&gt;"));
        assert!(!html.contains("<b>Voro</b>"));
    }
}
