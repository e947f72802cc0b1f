//! Event-trace driver: walk an input document and record one line per
//! observed event.
//!
//! Line grammar:
//! - `open <name> depth=<n> [class=a|b] [key="value"...] [self-closing]`
//! - `text "<escaped>"`
//! - `close <name>`
//! - `eof`
//!
//! Within one step the order is text, then closes (innermost first, the
//! order reconciliation actually closes them), then the opened tag.

use std::rc::Rc;

use scan::Tag;

use crate::{describe_open, escape_text, new_navigator};

/// Walk `input` to exhaustion and return the event trace.
pub fn trace_events(input: &str) -> Vec<String> {
    let mut nav = new_navigator(input);
    let mut lines = Vec::new();
    // Tags still awaiting a close line, in open order (outermost first).
    let mut pending_close: Vec<(Rc<Tag>, bool)> = Vec::new();
    loop {
        let produced = nav.descend().expect("fixture scans never fail");
        if !nav.last_content().is_empty() {
            lines.push(format!("text \"{}\"", escape_text(nav.last_content())));
        }
        for (tag, reported) in pending_close.iter_mut().rev() {
            if tag.is_closed() && !*reported {
                *reported = true;
                lines.push(format!("close {}", tag.name()));
            }
        }
        if let Some(tag) = produced {
            lines.push(describe_open(&tag));
            if !tag.is_closed() {
                pending_close.push((tag, false));
            }
        }
        if nav.is_done() {
            lines.push("eof".to_string());
            return lines;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_orders_text_before_the_close_it_precedes() {
        let lines = trace_events("<b>x</b>");
        assert_eq!(lines, ["open b depth=1", "text \"x\"", "close b", "eof"]);
    }

    #[test]
    fn trace_marks_self_closing_tags_inline() {
        let lines = trace_events("<br>");
        assert_eq!(lines, ["open br depth=1 self-closing", "eof"]);
    }

    #[test]
    fn trace_reports_force_closes_innermost_first() {
        let lines = trace_events("<a><b></a>");
        assert_eq!(
            lines,
            ["open a depth=1", "open b depth=2", "close b", "close a", "eof"]
        );
    }

    #[test]
    fn trace_renders_classes_and_attributes() {
        let lines = trace_events(r#"<p class="x y" id="k">"#);
        assert_eq!(lines, ["open p depth=1 class=x|y id=\"k\"", "eof"]);
    }
}
