//! The tag stack navigator: a forward-only, tolerant walk over markup.
//!
//! One `descend` step consumes characters up to the next tag boundary and
//! produces either a newly opened [`Tag`], a close event (`None`, after
//! stack reconciliation), or end of input (`None`, with `done` set).
//!
//! Invariants:
//! - `top` and its parent chain are exactly the currently open ancestors,
//!   innermost first.
//! - A closed tag is never reachable from `top`.
//! - Once the source is exhausted no further tag is produced and every
//!   remaining open tag stays unclosed; there is no implicit close at EOF.
//!
//! Malformed markup is absorbed by policy, never reported: unterminated or
//! unquoted attributes are dropped silently, unbalanced close tags
//! force-close intermediate tags, and unknown tags default to non-void. The
//! only failure a scan call can return is a source read error.

use std::rc::Rc;

use crate::source::{CharSource, SourceError};
use crate::tag::Tag;

/// Fatal scan failure. Scans only fail when the character source does.
pub type ScanError = SourceError;

/// Tags that never contain children and are closed on sight.
fn is_void_tag(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_attr_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.'
}

/// Outcome of one attribute-scanner call.
enum AttrScan {
    /// A complete pair is waiting in the scratch buffers.
    Pair,
    /// A bare `/` marked the enclosing tag self-closing.
    SelfClose,
    /// Malformed attribute dropped; scanning resumes.
    Dropped,
    /// `>` (or end of input) reached.
    End,
}

/// Close `top` and walk up the parent chain, closing every visited tag,
/// until one named `close_name` (ASCII case-insensitive) is closed too, or
/// the chain is exhausted.
///
/// A close tag that does not match the innermost open tag force-closes
/// everything between the top and the match; when nothing matches, the
/// whole stack ends up closed and `top` becomes `None`. Unbalanced markup
/// is policy here, not a fault.
fn ascend(top: &mut Option<Rc<Tag>>, close_name: &str) {
    let mut cursor = top.take();
    while let Some(tag) = cursor {
        tag.mark_closed();
        if tag.is_named(close_name) {
            *top = tag.parent().cloned();
            return;
        }
        log::trace!(
            target: "scan.navigator",
            "force-closed <{}> while reconciling </{}>",
            tag.name(),
            close_name
        );
        cursor = tag.parent().cloned();
    }
}

/// Forward-only scanner over a character source.
///
/// Strictly sequential and single-owner: each traversal call consumes a
/// prefix of the source before returning, and two traversal calls must
/// never be interleaved on the same navigator. Returned [`Tag`] values are
/// safe to keep and read anywhere; only their closed flag changes, and only
/// this navigator changes it.
pub struct Navigator<S: CharSource> {
    source: S,
    /// Single buffered look-ahead character.
    pending: Option<char>,
    top: Option<Rc<Tag>>,
    done: bool,
    /// Text accumulated since the previous tag boundary. Pooled.
    content: String,
    // Scratch buffers, pooled across steps.
    name_buf: String,
    attr_name_buf: String,
    attr_value_buf: String,
}

impl<S: CharSource> Navigator<S> {
    pub fn new(source: S) -> Self {
        Navigator {
            source,
            pending: None,
            top: None,
            done: false,
            content: String::new(),
            name_buf: String::new(),
            attr_name_buf: String::new(),
            attr_value_buf: String::new(),
        }
    }

    /// The innermost currently open tag.
    pub fn top(&self) -> Option<&Rc<Tag>> {
        self.top.as_ref()
    }

    /// True once the source is exhausted. No further tag will be produced.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Text accumulated by the most recent descend step.
    pub fn last_content(&self) -> &str {
        &self.content
    }

    fn read(&mut self) -> Result<Option<char>, ScanError> {
        if let Some(ch) = self.pending.take() {
            return Ok(Some(ch));
        }
        self.source.next_char()
    }

    fn peek(&mut self) -> Result<Option<char>, ScanError> {
        if self.pending.is_none() {
            self.pending = self.source.next_char()?;
        }
        Ok(self.pending)
    }

    fn consume_peeked(&mut self) {
        debug_assert!(self.pending.is_some(), "nothing buffered to consume");
        self.pending = None;
    }

    /// Script bodies are never tokenized: a `<` that does not begin `</` is
    /// ordinary content while a script tag is innermost.
    fn in_raw_text(&self) -> bool {
        self.top.as_ref().is_some_and(|tag| tag.is_named("script"))
    }

    /// One scan step: the next opened tag, or `None` after a close event or
    /// at end of input (`is_done` distinguishes the two).
    pub fn descend(&mut self) -> Result<Option<Rc<Tag>>, ScanError> {
        self.content.clear();
        if self.done {
            return Ok(None);
        }
        loop {
            let Some(ch) = self.read()? else {
                self.done = true;
                return Ok(None);
            };
            if ch != '<' {
                self.content.push(ch);
                continue;
            }
            match self.peek()? {
                Some('/') => {
                    self.consume_peeked();
                    self.scan_close_tag()?;
                    return Ok(None);
                }
                _ if self.in_raw_text() => {
                    // Literal '<' inside a script body; the peeked character
                    // stays buffered for the text loop.
                    self.content.push('<');
                }
                Some(next) if next.is_ascii_alphabetic() || next == '!' => {
                    let tag = self.scan_open_tag()?;
                    return Ok(Some(tag));
                }
                _ => {
                    // Recovery: '<' not followed by a name is plain text.
                    self.content.push('<');
                }
            }
        }
    }

    // '</' already consumed: read the alphabetic name, skip to '>', then
    // reconcile the stack.
    fn scan_close_tag(&mut self) -> Result<(), ScanError> {
        self.name_buf.clear();
        while let Some(ch) = self.peek()? {
            if !ch.is_ascii_alphabetic() {
                break;
            }
            self.name_buf.push(ch.to_ascii_lowercase());
            self.consume_peeked();
        }
        // Tolerant of junk between the name and '>'.
        while let Some(ch) = self.read()? {
            if ch == '>' {
                break;
            }
        }
        ascend(&mut self.top, &self.name_buf);
        Ok(())
    }

    // '<' consumed, name start buffered: read the name, scan attributes,
    // and construct the tag.
    fn scan_open_tag(&mut self) -> Result<Rc<Tag>, ScanError> {
        self.name_buf.clear();
        if self.peek()? == Some('!') {
            self.name_buf.push('!');
            self.consume_peeked();
        }
        while let Some(ch) = self.peek()? {
            if !ch.is_ascii_alphabetic() {
                break;
            }
            self.name_buf.push(ch.to_ascii_lowercase());
            self.consume_peeked();
        }

        let mut classes: Vec<String> = Vec::new();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut explicit_self_close = false;
        loop {
            match self.scan_attribute()? {
                AttrScan::Pair => {
                    if self.attr_name_buf.eq_ignore_ascii_case("class") {
                        classes.extend(
                            self.attr_value_buf
                                .split_whitespace()
                                .map(str::to_string),
                        );
                    } else if attributes
                        .iter()
                        .any(|(key, _)| key == &self.attr_name_buf)
                    {
                        // Ordered mapping: the first occurrence wins.
                        log::trace!(
                            target: "scan.navigator",
                            "dropped duplicate attribute {:?}",
                            self.attr_name_buf
                        );
                    } else {
                        attributes
                            .push((self.attr_name_buf.clone(), self.attr_value_buf.clone()));
                    }
                }
                AttrScan::SelfClose => explicit_self_close = true,
                AttrScan::Dropped => {}
                AttrScan::End => break,
            }
        }

        let name = self.name_buf.clone();
        // Declarations (leading '!') cannot contain children either.
        let self_closing =
            explicit_self_close || is_void_tag(&name) || name.starts_with('!');
        let tag = Rc::new(Tag::new(
            name,
            classes,
            attributes,
            self.top.clone(),
            self_closing,
        ));
        log::trace!(
            target: "scan.navigator",
            "opened <{}> depth={} self_closing={}",
            tag.name(),
            tag.depth(),
            tag.is_self_closing()
        );
        if !tag.is_closed() {
            self.top = Some(Rc::clone(&tag));
        }
        Ok(tag)
    }

    // One attribute-scanner call: skip whitespace, then classify what
    // follows. Malformed input never fails; it is dropped and the scanner
    // resynchronizes on the next call.
    fn scan_attribute(&mut self) -> Result<AttrScan, ScanError> {
        loop {
            match self.peek()? {
                Some(ch) if ch.is_whitespace() => self.consume_peeked(),
                _ => break,
            }
        }
        match self.peek()? {
            // Unterminated tag at EOF: finish with what was scanned.
            None => Ok(AttrScan::End),
            Some('>') => {
                self.consume_peeked();
                Ok(AttrScan::End)
            }
            Some('/') => {
                self.consume_peeked();
                Ok(AttrScan::SelfClose)
            }
            Some(ch) if is_attr_name_char(ch) => self.scan_attribute_pair(),
            Some(_) => {
                // Junk byte inside the tag: consume it and resynchronize.
                self.consume_peeked();
                Ok(AttrScan::Dropped)
            }
        }
    }

    fn scan_attribute_pair(&mut self) -> Result<AttrScan, ScanError> {
        self.attr_name_buf.clear();
        self.attr_value_buf.clear();
        while let Some(ch) = self.peek()? {
            if !is_attr_name_char(ch) {
                break;
            }
            self.attr_name_buf.push(ch.to_ascii_lowercase());
            self.consume_peeked();
        }
        loop {
            match self.peek()? {
                Some(ch) if ch.is_whitespace() => self.consume_peeked(),
                _ => break,
            }
        }
        if self.peek()? != Some('=') {
            // Missing '=': drop the name. The current character is left for
            // the next scanner call.
            log::trace!(
                target: "scan.navigator",
                "dropped valueless attribute {:?}",
                self.attr_name_buf
            );
            return Ok(AttrScan::Dropped);
        }
        self.consume_peeked();
        loop {
            match self.peek()? {
                Some(ch) if ch.is_whitespace() => self.consume_peeked(),
                _ => break,
            }
        }
        let quote = match self.peek()? {
            Some(ch @ ('"' | '\'')) => {
                self.consume_peeked();
                ch
            }
            _ => {
                // Missing opening quote: drop the attribute; the bare value
                // is left to be consumed as junk.
                log::trace!(
                    target: "scan.navigator",
                    "dropped unquoted attribute {:?}",
                    self.attr_name_buf
                );
                return Ok(AttrScan::Dropped);
            }
        };
        loop {
            match self.read()? {
                // Unterminated value at EOF: the pair is dropped.
                None => return Ok(AttrScan::End),
                Some(ch) if ch == quote => break,
                Some(ch) => self.attr_value_buf.push(ch),
            }
        }
        Ok(AttrScan::Pair)
    }

    /// Repeated descend until a produced tag satisfies `predicate`.
    ///
    /// Returns `Ok(None)` at end of input, or as soon as the tag that was
    /// `top` when the call started has been closed without a match: called
    /// from inside an open tag the search is bounded to that subtree, called
    /// at the root it covers the whole remaining stream.
    pub fn find<P>(&mut self, mut predicate: P) -> Result<Option<Rc<Tag>>, ScanError>
    where
        P: FnMut(&Tag) -> bool,
    {
        let boundary = self.top.clone();
        while !self.done {
            if let Some(tag) = self.descend()? {
                if predicate(&tag) {
                    return Ok(Some(tag));
                }
            }
            if let Some(limit) = &boundary {
                if limit.is_closed() {
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    /// Descend until `tag` is closed; used to skip an uninteresting subtree.
    ///
    /// Already-closed tags cause no scanning at all. At end of input the tag
    /// may remain open; this is not an error.
    pub fn close(&mut self, tag: &Tag) -> Result<(), ScanError> {
        while !tag.is_closed() && !self.done {
            let _ = self.descend()?;
        }
        Ok(())
    }

    /// Leading text at the current position: one descend captures the text
    /// up to the first nested boundary, further nesting is drained and
    /// discarded, and `tag` is closed if still open.
    pub fn inner_text(&mut self, tag: &Tag) -> Result<String, ScanError> {
        let mut reached_boundary = self.descend()?.is_none();
        let text = self.content.clone();
        while !reached_boundary && !self.done {
            reached_boundary = self.descend()?.is_none();
        }
        if !tag.is_closed() {
            self.close(tag)?;
        }
        Ok(text)
    }

    /// Plain text inside the next element, ignoring nested markup.
    ///
    /// Descends once for an initial tag and returns its leading text via
    /// [`inner_text`]. When no tag is produced (close event or end of
    /// input), the text accumulated by that single step is returned.
    ///
    /// [`inner_text`]: Navigator::inner_text
    pub fn element_text(&mut self) -> Result<String, ScanError> {
        match self.descend()? {
            Some(tag) => self.inner_text(&tag),
            None => Ok(self.content.clone()),
        }
    }
}
