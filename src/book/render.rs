//! HTML templates for the rendered book.
//!
//! Pure string substitution with no decision logic. The page structure is
//! a facsimile title page, a colophon, a client-side table of contents
//! built by the embedded script, then one `div.chapter` per chapter with
//! one `div.email` per message.

const BOOK_TEMPLATE: &str = r##"<!DOCTYPE html>
<html><head>
<meta http-equiv="content-type" content="text/html; charset=UTF-8">
    <meta charset="UTF-8">
    <title>{title}</title>
    <script>
    function getText(e) {
      var text = "";
      for (var x = e.firstChild; x != null; x = x.nextSibling) {
        if (x.nodeType == x.TEXT_NODE) {
          text += x.data;
        } else if (x.nodeType == x.ELEMENT_NODE) {
          text += getText(x);
        }
      }
      return text;
    }

    function maketoc() {
      var hs = document.getElementsByClassName("chapter");
      var toc = document.getElementById('toc');
      for(var i = 0; i < hs.length; i++) {
        var h = hs[i].getElementsByTagName("h1")[0];
        var text = document.createTextNode(getText(h));
        var span = document.createElement("span");
        span.appendChild(text);
        h.setAttribute("id", "ch"+i);
        var link = document.createElement("a");
        link.setAttribute("href", "#ch"+i);
        link.appendChild(span);
        toc.appendChild(link);
      }
    }
    </script>
  </head>
  <body onload="maketoc();">
    <!-- PAGE: facsimile -->
    <div class="facsimile">
        <h1>{title}</h1>
        <h3>{author}</h3>
    </div>
    <!-- ENDPAGE: facsimile -->

    <!-- PAGE: colophon -->
    <div class="colophon">
      <p id="copyright">
        {title} &copy; {author}
      </p>
    </div>
    <!-- ENDPAGE: colophon -->

    <div id="toc"></div>

{chapters}
  </body></html>
"##;

const CHAPTER_TEMPLATE: &str = r#"    <div class="chapter">
    <h1>{name}</h1>
{messages}
    </div>
"#;

const MESSAGE_TEMPLATE: &str = r#"    <div class="email">
      <div class="titles">
        <h2 class="title">
            {subject}
        </h2>
        <h3 class="date">
            {date}
        </h3>
        <h4 class="author">
            {sender}
        </h4>
      </div>
      <div class="message">
        {body}
      </div>
    </div>
"#;

/// Single-pass placeholder substitution. Field values are emitted verbatim
/// and never rescanned, so message text that happens to contain a
/// placeholder token stays literal. `{…}` spans matching no field name
/// (the embedded script braces) pass through untouched.
fn fill(template: &str, fields: &[(&str, &str)]) -> String {
    let extra: usize = fields.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let matched = rest[open..].find('}').and_then(|off| {
            let close = open + off;
            let key = &rest[open + 1..close];
            fields
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match matched {
            Some((close, value)) => {
                out.push_str(&rest[..open]);
                out.push_str(value);
                rest = &rest[close + 1..];
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the whole document around the concatenated chapter HTML.
pub fn render_book(title: &str, author: &str, chapters: &str) -> String {
    fill(
        BOOK_TEMPLATE,
        &[("title", title), ("author", author), ("chapters", chapters)],
    )
}

/// Render one chapter around its concatenated message HTML.
pub fn render_chapter(name: &str, messages: &str) -> String {
    fill(CHAPTER_TEMPLATE, &[("name", name), ("messages", messages)])
}

/// Render one message block.
pub fn render_message(subject: &str, sender: &str, date: &str, body: &str) -> String {
    fill(
        MESSAGE_TEMPLATE,
        &[
            ("subject", subject),
            ("sender", sender),
            ("date", date),
            ("body", body),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message_substitutes_all_fields() {
        let html = render_message("Snow", "Maria", "05 Jan 2023", "It snowed.<br>");
        assert!(html.contains("Snow"));
        assert!(html.contains("Maria"));
        assert!(html.contains("05 Jan 2023"));
        assert!(html.contains("It snowed.<br>"));
        assert!(!html.contains('{'));
    }

    #[test]
    fn test_render_chapter_wraps_heading() {
        let html = render_chapter("Winter '22 - '23", "<div>msg</div>");
        assert!(html.contains("<h1>Winter '22 - '23</h1>"));
        assert!(html.contains("<div>msg</div>"));
    }

    #[test]
    fn test_render_book_has_title_page_and_toc() {
        let html = render_book("Letters", "Ana", "<div class=\"chapter\"></div>");
        assert!(html.contains("<title>Letters</title>"));
        assert!(html.contains("<h1>Letters</h1>"));
        assert!(html.contains("<h3>Ana</h3>"));
        assert!(html.contains("id=\"toc\""));
        assert!(html.contains("maketoc"));
    }

    #[test]
    fn test_render_book_keeps_toc_hrefs_and_document_tail() {
        // The TOC script links to in-page fragment ids ("#ch0", "#ch1", …);
        // everything after that href line must still be emitted.
        let html = render_book("Letters", "Ana", "");
        assert!(html.contains(r##"link.setAttribute("href", "#ch"+i);"##));
        assert!(html.contains("<!-- ENDPAGE: colophon -->"));
        assert!(html.trim_end().ends_with("</body></html>"));
    }

    #[test]
    fn test_field_text_with_placeholder_token_stays_literal() {
        let html = render_message("Re: {date}", "Maria", "05 Jan 2023", "Hello.<br>");
        assert!(html.contains("Re: {date}"));
        assert_eq!(html.matches("05 Jan 2023").count(), 1);

        let book = render_book("Letters", "{chapters}", "<div>c</div>");
        assert!(book.contains("<h3>{chapters}</h3>"));
        assert_eq!(book.matches("<div>c</div>").count(), 1);
    }
}
