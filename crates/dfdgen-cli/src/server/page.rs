//! HTML rendering of a session snapshot.
//!
//! [`render`] is a pure function of a [`SessionSnapshot`]: it decides
//! nothing beyond which widgets the current state calls for.

use std::fmt::Write;

use dfdgen::{
    OutputFormat,
    session::{NoticeLevel, OutcomeView, SessionSnapshot},
};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #262730; }
main { max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin: 1rem 0 .25rem; font-weight: 600; }
textarea { width: 100%; font-family: ui-monospace, monospace; }
button { margin-top: 1rem; padding: .4rem 1rem; }
.notice { padding: .6rem 1rem; border-radius: .4rem; margin: .5rem 0; }
.notice-info { background: #e7f1fb; }
.notice-success { background: #e6f4ea; }
.notice-warning { background: #fff4d6; }
.error { background: #fde8e8; padding: .6rem 1rem; border-radius: .4rem; }
.error pre, .share pre { white-space: pre-wrap; }
.share input { width: 100%; }
.result img { max-width: 100%; background: #fff; }
.download { display: inline-block; margin: .5rem 0; }
"#;

const SCRIPT: &str = r#"
const form = document.getElementById("dfd-form");
let generating = false;
document.getElementById("generate").addEventListener("pointerdown", () => {
  generating = true;
});
form.addEventListener("submit", () => {
  generating = true;
});
document.getElementById("text").addEventListener("change", () => {
  if (generating) return;
  form.action = "/edit";
  form.submit();
});
document.getElementById("format").addEventListener("change", () => {
  form.action = "/format";
  form.submit();
});
"#;

/// Renders the full page for `snapshot`.
pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>DFD Generator</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n<h1>DFD Generator</h1>\n");

    for notice in &snapshot.notices {
        let class = match notice.level() {
            NoticeLevel::Info => "notice-info",
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Warning => "notice-warning",
        };
        let _ = writeln!(
            html,
            "<div class=\"notice {class}\">{}</div>",
            escape(notice.message())
        );
    }

    render_form(&mut html, snapshot);

    match &snapshot.outcome {
        Some(OutcomeView::Success {
            format, share_url, ..
        }) => render_success(&mut html, *format, share_url, snapshot.generation),
        Some(OutcomeView::Failure(failure)) => {
            let heading = if failure.kind().is_operational() {
                "Renderer unavailable:"
            } else {
                "Error generating DFD:"
            };
            let _ = writeln!(
                html,
                "<section class=\"error\">\n<h2>{heading}</h2>\n<pre>{}</pre>\n</section>",
                escape(failure.diagnostic())
            );
        }
        None => {}
    }

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</main>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, snapshot: &SessionSnapshot) {
    html.push_str("<form id=\"dfd-form\" method=\"post\" action=\"/generate\">\n");
    html.push_str("<label for=\"text\">Enter DFD text:</label>\n");
    // A newline right after the opening tag is dropped by the HTML parser,
    // so one is added to keep a leading newline of the source.
    let _ = writeln!(
        html,
        "<textarea id=\"text\" name=\"text\" rows=\"14\">\n{}</textarea>",
        escape(&snapshot.source)
    );

    html.push_str("<label for=\"format\">Select output format:</label>\n");
    html.push_str("<select id=\"format\" name=\"format\">\n");
    for format in OutputFormat::DISPLAY_CHOICES {
        let selected = if format == snapshot.format {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(html, "<option value=\"{format}\"{selected}>{format}</option>");
    }
    html.push_str("</select>\n<br>\n");
    html.push_str(
        "<button id=\"generate\" type=\"submit\" formaction=\"/generate\">Generate DFD</button>\n",
    );
    html.push_str("</form>\n");
}

fn render_success(html: &mut String, format: OutputFormat, share_url: &str, generation: u64) {
    html.push_str("<section class=\"result\">\n");
    if format.is_image() {
        let _ = writeln!(
            html,
            "<img src=\"/artifact/primary?v={generation}\" alt=\"Generated DFD ({format})\">"
        );
        html.push_str("<br>\n");
        let _ = writeln!(
            html,
            "<a class=\"download\" href=\"/artifact/pdf?v={generation}\">Download PDF</a>"
        );
    } else {
        let _ = writeln!(
            html,
            "<a class=\"download\" href=\"/artifact/primary?v={generation}\">Download PDF</a>"
        );
    }
    html.push_str("</section>\n");

    let url = escape(share_url);
    let _ = writeln!(
        html,
        "<section class=\"share\">\n<label for=\"share-url\">Share link:</label>\n\
         <input id=\"share-url\" type=\"text\" readonly value=\"{url}\" onclick=\"this.select()\">\n\
         <pre><code>{url}</code></pre>\n</section>"
    );
}

/// Escapes text for use in HTML content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use dfdgen::session::{Failure, FailureKind, Notice};

    use super::*;

    fn snapshot(outcome: Option<OutcomeView>) -> SessionSnapshot {
        SessionSnapshot {
            source: "A -> B".to_string(),
            format: OutputFormat::Svg,
            outcome,
            notices: Vec::new(),
            generation: 3,
        }
    }

    fn success(format: OutputFormat) -> Option<OutcomeView> {
        Some(OutcomeView::Success {
            source: "A -> B".to_string(),
            format,
            share_url: "http://localhost:8501/?text=A%20-%3E%20B".to_string(),
        })
    }

    #[test]
    fn test_empty_session_shows_form_only() {
        let html = render(&snapshot(None));

        assert!(html.contains("<h1>DFD Generator</h1>"));
        assert!(html.contains("Enter DFD text:"));
        assert!(html.contains("A -&gt; B</textarea>"));
        assert!(html.contains("<option value=\"svg\" selected>svg</option>"));
        assert!(html.contains("Generate DFD</button>"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_generate_button_targets_generate_route() {
        let html = render(&snapshot(None));

        assert!(html.contains(
            "<button id=\"generate\" type=\"submit\" formaction=\"/generate\">Generate DFD</button>"
        ));
        // A text edit committed by pressing the button must not divert the
        // submission to the edit route.
        let guard = html.find("if (generating) return;").unwrap();
        let edit = html.find("form.action = \"/edit\"").unwrap();
        assert!(guard < edit);
    }

    #[test]
    fn test_image_success_shows_image_pdf_link_and_share_url() {
        let html = render(&snapshot(success(OutputFormat::Svg)));

        assert!(html.contains("<img src=\"/artifact/primary?v=3\""));
        assert!(html.contains("href=\"/artifact/pdf?v=3\">Download PDF</a>"));
        assert!(html.contains("value=\"http://localhost:8501/?text=A%20-%3E%20B\""));
        assert!(html.contains("<pre><code>http://localhost:8501/?text=A%20-%3E%20B</code></pre>"));
    }

    #[test]
    fn test_pdf_success_offers_download_instead_of_image() {
        let html = render(&snapshot(success(OutputFormat::Pdf)));

        assert!(!html.contains("<img"));
        assert_eq!(html.matches("Download PDF").count(), 1);
    }

    #[test]
    fn test_failure_shows_escaped_diagnostic_and_no_artifact() {
        let failure = Failure::new(FailureKind::Render, "syntax error on line 2: <unexpected>");
        let html = render(&snapshot(Some(OutcomeView::Failure(failure))));

        assert!(html.contains("<h2>Error generating DFD:</h2>"));
        assert!(html.contains("<pre>syntax error on line 2: &lt;unexpected&gt;</pre>"));
        assert!(!html.contains("/artifact/"));
    }

    #[test]
    fn test_operational_failure_has_distinct_heading() {
        let failure = Failure::new(FailureKind::ToolUnavailable, "not found");
        let html = render(&snapshot(Some(OutcomeView::Failure(failure))));

        assert!(html.contains("<h2>Renderer unavailable:</h2>"));
    }

    #[test]
    fn test_notices_rendered_in_order() {
        let mut snap = snapshot(None);
        snap.notices = vec![
            Notice::new(NoticeLevel::Info, "Loaded DFD text from URL."),
            Notice::new(NoticeLevel::Success, "DFD generated successfully!"),
        ];
        let html = render(&snap);

        let info = html.find("class=\"notice notice-info\"").unwrap();
        let success = html.find("class=\"notice notice-success\"").unwrap();
        assert!(info < success);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
