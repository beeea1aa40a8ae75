//! Reply extraction: splits a message body into fragments (new text,
//! quoted text, signatures) and picks the author's own words.
//!
//! Mail clients pile quoted history, attribution headers and signatures
//! below the actual reply. The scanner walks the body bottom-up, grouping
//! lines into fragments and flagging each as quoted, signature or hidden;
//! [`visible_content`] then returns the first fragment a reader would
//! consider the message itself.

use std::sync::OnceLock;

use regex::Regex;

/// A run of consecutive lines sharing one role within the body.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// The fragment's lines, joined in original order.
    pub content: String,
    /// Lines prefixed with `>`.
    pub quoted: bool,
    /// Signature block (`--`, `__` or "Sent from my ..." openers).
    pub signature: bool,
    /// Not part of the visible reply (quoted history, headers, trailing
    /// signatures and everything below an attribution header).
    pub hidden: bool,
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^>+").expect("valid regex"))
}

fn quote_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^On.*wrote:$").expect("valid regex"))
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*?(From|Sent|To|Subject):\*? .+").expect("valid regex"))
}

fn signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:--|__|-\w|Sent from my (?:\w+\s*){1,3})").expect("valid regex")
    })
}

fn multi_quote_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)On\s.+?wrote:").expect("valid regex"))
}

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^\n])(\n ?[_-]{7,})").expect("valid regex"))
}

/// Split `body` into fragments, top to bottom.
///
/// Always yields at least one fragment; an empty body becomes a single
/// hidden empty fragment.
pub fn segment(body: &str) -> Vec<Fragment> {
    let text = body.replace("\r\n", "\n");
    let text = fold_multiline_quote_header(&text);
    // Outlook puts the reply flush against its underscore boundary line;
    // insert a blank line so the boundary starts its own fragment.
    let text = boundary_re().replace_all(&text, "${1}\n${2}");

    let mut scanner = Scanner::default();
    for line in text.split('\n').rev() {
        scanner.scan_line(line);
    }
    scanner.finish();
    scanner.fragments.reverse();
    scanner.fragments
}

/// Return the first fragment that is neither quoted, a signature, nor
/// hidden. When no fragment qualifies (a message that is all quoted
/// history, say) the first fragment wins; with no fragments at all the
/// raw body is returned unchanged.
pub fn visible_content(body: &str) -> String {
    let fragments = segment(body);
    if let Some(visible) = fragments
        .iter()
        .find(|f| !f.hidden && !f.quoted && !f.signature)
    {
        return visible.content.clone();
    }
    match fragments.first() {
        Some(first) => first.content.clone(),
        None => body.to_string(),
    }
}

/// Clients wrap long attribution headers ("On Tue, Mar 2 ... Maria\n
/// wrote:") across lines, which defeats the line-based header match.
/// Fold the first such span onto one line. The innermost span is chosen
/// so a header that itself quotes a header is not swallowed whole.
fn fold_multiline_quote_header(text: &str) -> String {
    let re = multi_quote_header_re();
    let mut start = 0usize;
    while let Some(m) = re.find_at(text, start) {
        let span = m.as_str();
        if let Some(inner) = span[2..].find("On ") {
            start = m.start() + 2 + inner;
            continue;
        }
        if span.contains('\n') {
            let mut folded = String::with_capacity(text.len());
            folded.push_str(&text[..m.start()]);
            folded.push_str(&span.replace('\n', ""));
            folded.push_str(&text[m.end()..]);
            return folded;
        }
        break;
    }
    text.to_string()
}

/// Fragment under construction. Lines accumulate in reverse (the scan
/// runs bottom-up) and are flipped when the fragment is finished.
struct PartialFragment {
    lines: Vec<String>,
    quoted: bool,
    headers: bool,
    signature: bool,
}

impl PartialFragment {
    fn new(line: &str, quoted: bool, headers: bool) -> Self {
        Self {
            lines: vec![line.to_string()],
            quoted,
            headers,
            signature: false,
        }
    }
}

#[derive(Default)]
struct Scanner {
    fragments: Vec<Fragment>,
    current: Option<PartialFragment>,
    found_visible: bool,
}

impl Scanner {
    fn scan_line(&mut self, line: &str) {
        let is_quote_header = quote_header_re().is_match(line);
        let is_quoted = quoted_re().is_match(line);
        let is_header = is_quote_header || header_re().is_match(line);
        let blank = line.trim().is_empty();

        // A blank line right above a signature opener closes the fragment
        // as a signature. "Above" in scan order means the opener was the
        // last line appended.
        if blank {
            let ends_signature = self
                .current
                .as_ref()
                .and_then(|frag| frag.lines.last())
                .is_some_and(|last| signature_re().is_match(last.trim()));
            if ends_signature {
                if let Some(frag) = self.current.as_mut() {
                    frag.signature = true;
                }
                self.finish();
            }
        }

        let extends = self.current.as_ref().is_some_and(|frag| {
            (frag.headers == is_header && frag.quoted == is_quoted)
                || (frag.quoted && (is_quote_header || blank))
        });
        if extends {
            if let Some(frag) = self.current.as_mut() {
                frag.lines.push(line.to_string());
            }
        } else {
            self.finish();
            self.current = Some(PartialFragment::new(line, is_quoted, is_header));
        }
    }

    fn finish(&mut self) {
        let Some(frag) = self.current.take() else {
            return;
        };
        let mut lines = frag.lines;
        lines.reverse();
        let content = lines.join("\n");

        if frag.headers {
            // An attribution header hides everything already scanned, which
            // bottom-up means everything below it in the message.
            self.found_visible = false;
            for f in &mut self.fragments {
                f.hidden = true;
            }
        }

        let mut hidden = true;
        if !self.found_visible {
            if !(frag.quoted || frag.headers || frag.signature || content.trim().is_empty()) {
                self.found_visible = true;
                hidden = false;
            }
        } else {
            hidden = false;
        }

        self.fragments.push(Fragment {
            content,
            quoted: frag.quoted,
            signature: frag.signature,
            hidden,
        });
    }
}
