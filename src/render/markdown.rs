//! Lightweight Markdown to HTML rendering for README files and descriptions.
//!
//! Supports a small subset: ATX headers up to level three, bold, italic,
//! links, bare URL and email auto-linking, unordered lists, paragraphs, fenced
//! code blocks and inline code. Input is HTML-escaped before any rule runs, so
//! the output never contains markup the author wrote by hand.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const LINK_CLASS: &str =
  "text-blue-600 dark:text-blue-400 underline hover:text-blue-800 dark:hover:text-blue-300";
const PARAGRAPH_OPEN: &str = r#"<p class="mb-4">"#;

// Private-use sentinels; they cannot appear in escaped input by accident and
// are excluded from URL and email matching.
const SENTINEL_OPEN: char = '\u{E000}';
const SENTINEL_CLOSE: char = '\u{E001}';

static CODE_BLOCK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid code block regex"));
static INLINE_CODE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid inline code regex"));
static FENCE_INFO: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_+-]+)\n").expect("valid fence info regex"));

static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").expect("valid h3 regex"));
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").expect("valid h2 regex"));
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").expect("valid h1 regex"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*\n]*?)\*").expect("valid italic regex"));
static LINK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"https?://[^\s<"\x{E000}\x{E001}]+"#).expect("valid url regex")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});
static LIST_ITEM: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[ \t]*[-*] (.*)$").expect("valid list item regex"));
static BLOCK_START: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^<(h\d|ul|ol|pre|blockquote)").expect("valid block regex"));
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\x{E000}(CODEBLOCK|INLINECODE)(\d+)\x{E001}").expect("valid placeholder regex")
});

/// Characters trimmed from the end of an auto-linked URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']'];

/// Render Markdown to HTML.
///
/// Never fails: anything that does not match a rule is emitted as escaped
/// text, and unmatched markers stay literal.
pub fn render_markdown(markdown: &str) -> String {
  if markdown.is_empty() {
    return String::new();
  }

  let normalized = markdown.replace("\r\n", "\n");
  let escaped = escape_html(&normalized);

  // Code is lifted out first so no other rule can touch its contents
  let mut code_blocks: Vec<String> = Vec::new();
  let html = CODE_BLOCK
    .replace_all(&escaped, |caps: &Captures| {
      code_blocks.push(caps[1].to_string());
      placeholder("CODEBLOCK", code_blocks.len() - 1)
    })
    .into_owned();

  let mut inline_codes: Vec<String> = Vec::new();
  let html = INLINE_CODE
    .replace_all(&html, |caps: &Captures| {
      inline_codes.push(caps[1].to_string());
      placeholder("INLINECODE", inline_codes.len() - 1)
    })
    .into_owned();

  let html = render_inline(&html);
  let html = render_lists(&html);
  let html = render_paragraphs(&html);

  restore_code(&html, &code_blocks, &inline_codes)
}

/// Escape the three characters that could open markup.
pub fn escape_html(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}

fn placeholder(kind: &str, index: usize) -> String {
  format!("{SENTINEL_OPEN}{kind}{index}{SENTINEL_CLOSE}")
}

/// Headers, emphasis, explicit links, then auto-links.
fn render_inline(text: &str) -> String {
  // Longest marker first so "###" is not read as "#"
  let html = H3.replace_all(text, r#"<h3 class="text-xl font-bold mt-4 mb-2">${1}</h3>"#);
  let html = H2.replace_all(&html, r#"<h2 class="text-2xl font-bold mt-6 mb-3">${1}</h2>"#);
  let html = H1.replace_all(&html, r#"<h1 class="text-3xl font-bold mt-0 mb-4">${1}</h1>"#);

  let html = BOLD.replace_all(&html, r#"<strong class="font-semibold">${1}</strong>"#);
  let html = ITALIC.replace_all(&html, r#"<em class="italic">${1}</em>"#);

  let html = LINK.replace_all(&html, |caps: &Captures| {
    format!(
      r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="{LINK_CLASS}">{}</a>"#,
      safe_href(&caps[2]),
      &caps[1]
    )
  });

  let html = autolink_urls(&html);
  autolink_emails(&html)
}

/// Neutralise link targets that would run script or break out of the attribute.
fn safe_href(url: &str) -> String {
  // Browsers drop tabs and newlines inside a URL, so `java\tscript:` still runs
  let cleaned: String = url.chars().filter(|c| !c.is_control()).collect();
  let cleaned = cleaned.trim();
  let scheme = cleaned
    .split_once(':')
    .map(|(s, _)| {
      s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
    })
    .unwrap_or_default();

  if matches!(scheme.as_str(), "javascript" | "vbscript" | "data") {
    return "#".to_string();
  }

  cleaned.replace('"', "&quot;")
}

/// Whether a match starting right after `prefix` already sits inside link
/// markup: within a tag, within an `<a>` element, or after `mailto:`.
fn inside_link_markup(prefix: &str) -> bool {
  if prefix.ends_with("mailto:") {
    return true;
  }

  let inside_tag = match (prefix.rfind('<'), prefix.rfind('>')) {
    (Some(open), Some(close)) => open > close,
    (Some(_), None) => true,
    _ => false,
  };
  if inside_tag {
    return true;
  }

  match (prefix.rfind("<a "), prefix.rfind("</a>")) {
    (Some(open), Some(close)) => open > close,
    (Some(_), None) => true,
    _ => false,
  }
}

fn autolink_urls(html: &str) -> String {
  BARE_URL
    .replace_all(html, |caps: &Captures| {
      let (start, matched) = caps.get(0).map(|m| (m.start(), m.as_str())).unwrap_or((0, ""));

      if inside_link_markup(&html[..start]) {
        return matched.to_string();
      }

      let url = matched.trim_end_matches(URL_TRAILING_PUNCTUATION);
      let scheme_len = if url.starts_with("https://") { 8 } else { 7 };
      if url.len() <= scheme_len {
        return matched.to_string();
      }

      format!(
        r#"<a href="{url}" target="_blank" rel="noopener noreferrer" class="{LINK_CLASS}">{url}</a>{}"#,
        &matched[url.len()..]
      )
    })
    .into_owned()
}

fn autolink_emails(html: &str) -> String {
  EMAIL
    .replace_all(html, |caps: &Captures| {
      let (start, email) = caps.get(0).map(|m| (m.start(), m.as_str())).unwrap_or((0, ""));

      if inside_link_markup(&html[..start]) {
        return email.to_string();
      }

      format!(r#"<a href="mailto:{email}" class="{LINK_CLASS}">{email}</a>"#)
    })
    .into_owned()
}

/// Group list-item lines into `<ul>` blocks.
///
/// Blank lines between two items keep them in the same list but make both
/// items "loose", which wraps their content in a paragraph.
fn render_lists(text: &str) -> String {
  let lines: Vec<&str> = text.split('\n').collect();
  let mut out: Vec<String> = Vec::with_capacity(lines.len());
  let mut i = 0;

  while i < lines.len() {
    let Some(first) = list_item(lines[i]) else {
      out.push(lines[i].to_string());
      i += 1;
      continue;
    };

    // (content, separated from the previous item by a blank line)
    let mut items: Vec<(&str, bool)> = vec![(first, false)];
    let mut end = i + 1;
    loop {
      let mut next = end;
      while next < lines.len() && lines[next].trim().is_empty() {
        next += 1;
      }
      match lines.get(next).and_then(|line| list_item(line)) {
        Some(content) => {
          items.push((content, next > end));
          end = next + 1;
        }
        None => break,
      }
    }

    let rendered: Vec<String> = items
      .iter()
      .enumerate()
      .map(|(idx, (content, blank_before))| {
        let blank_after = items.get(idx + 1).is_some_and(|(_, b)| *b);
        if *blank_before || blank_after {
          format!("<li>{PARAGRAPH_OPEN}{content}</p></li>")
        } else {
          format!("<li>{content}</li>")
        }
      })
      .collect();

    out.push(format!(
      "\n<ul class=\"list-disc ml-6 mb-4\">{}</ul>\n",
      rendered.join("\n")
    ));
    i = end;
  }

  out.join("\n")
}

fn list_item(line: &str) -> Option<&str> {
  LIST_ITEM
    .captures(line)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// Wrap blank-line separated chunks in `<p>` unless they are already blocks.
fn render_paragraphs(text: &str) -> String {
  text
    .split("\n\n")
    .map(str::trim)
    .filter(|chunk| !chunk.is_empty())
    .map(|chunk| {
      if BLOCK_START.is_match(chunk) || is_code_block_placeholder(chunk) {
        chunk.to_string()
      } else {
        let joined: Vec<&str> = chunk.lines().map(str::trim).collect();
        format!("{PARAGRAPH_OPEN}{}</p>", joined.join(" "))
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn is_code_block_placeholder(chunk: &str) -> bool {
  PLACEHOLDER
    .captures(chunk)
    .is_some_and(|caps| &caps[1] == "CODEBLOCK" && caps[0].len() == chunk.len())
}

fn restore_code(html: &str, code_blocks: &[String], inline_codes: &[String]) -> String {
  PLACEHOLDER
    .replace_all(html, |caps: &Captures| {
      let index: usize = caps[2].parse().unwrap_or(usize::MAX);
      match &caps[1] {
        "CODEBLOCK" => {
          let code = code_blocks.get(index).map(String::as_str).unwrap_or_default();
          let (language, body) = split_fence_info(code);
          let class = match language {
            Some(lang) => format!("text-sm font-mono language-{lang}"),
            None => "text-sm font-mono".to_string(),
          };
          format!(
            r#"<pre class="bg-gray-100 dark:bg-gray-800 p-4 rounded overflow-x-auto mb-4"><code class="{class}">{body}</code></pre>"#
          )
        }
        _ => {
          let code = inline_codes.get(index).map(String::as_str).unwrap_or_default();
          format!(
            r#"<code class="bg-gray-100 dark:bg-gray-800 px-2 py-0.5 rounded text-sm font-mono">{code}</code>"#
          )
        }
      }
    })
    .into_owned()
}

/// Split an optional language tag off a fenced block and drop the newlines
/// hugging the fences.
fn split_fence_info(code: &str) -> (Option<&str>, &str) {
  let (language, body) = match FENCE_INFO.captures(code) {
    Some(caps) => {
      let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
      (caps.get(1).map(|m| m.as_str()), &code[whole..])
    }
    None => (None, code),
  };

  let body = body.strip_prefix('\n').unwrap_or(body);
  let body = body.strip_suffix('\n').unwrap_or(body);
  (language, body)
}
