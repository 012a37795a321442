//! Server-rendered HTML for the single form page.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::ui::UiElement;

pub const PAGE_TITLE: &str = "Milton";

/// Notice shown above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoMemo,
    Failed,
}

impl Notice {
    fn text(self) -> &'static str {
        match self {
            Notice::NoMemo => "No memo was produced. Try again.",
            Notice::Failed => "Something went wrong while writing the memo. Try again.",
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `data:` URL carrying the bytes inline.
pub fn data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>&#129416;</text></svg>">
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = PAGE_TITLE,
        body = body
    )
}

fn form(subject: &str) -> String {
    format!(
        r#"<form method="post" action="/" onsubmit="document.getElementById('standby').hidden = false;">
<label for="subject">Subject</label>
<input type="text" id="subject" name="subject" value="{subject}">
<button type="submit">Submit</button>
</form>
<p id="standby" hidden>Standby...</p>"#,
        subject = escape_html(subject)
    )
}

/// The empty form.
pub fn render_form() -> String {
    layout(&form(""))
}

/// The form again, with a notice and the subject kept.
pub fn render_notice(notice: Notice, subject: &str) -> String {
    layout(&format!(
        "<p class=\"notice\">{}</p>\n{}",
        escape_html(notice.text()),
        form(subject)
    ))
}

/// The page after a memo was made: the elements in emission order, then the form.
pub fn render_elements(elements: &[UiElement], subject: &str) -> String {
    let mut body = String::new();
    for element in elements {
        match element {
            UiElement::Success(text) => {
                body.push_str(&format!("<p class=\"success\">{}</p>\n", escape_html(text)));
            }
            UiElement::DownloadButton {
                label,
                data,
                file_name,
                mime,
            } => {
                body.push_str(&format!(
                    "<a class=\"download\" href=\"{}\" download=\"{}\">{}</a>\n",
                    data_url(mime, data),
                    escape_html(file_name),
                    escape_html(label)
                ));
            }
        }
    }
    body.push_str(&form(subject));
    layout(&body)
}
