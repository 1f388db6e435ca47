/// Announcement text with embedded readings.
///
/// An `Utterance` is a run of plain text and player references. It renders
/// two ways: `display()` wraps each name in ruby markup for the screen,
/// `speech()` swaps every name for its kana reading for the voice engine.

use serde::{Deserialize, Serialize};

/// One written name component and how it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePart {
    pub text: String,
    pub reading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Player { parts: Vec<NamePart>, honorific: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Utterance {
    segments: Vec<Segment>,
}

impl Utterance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let mut u = Self::new();
        u.push_text(text);
        u
    }

    /// Append plain text, merging with a trailing text segment.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text { text: last }) = self.segments.last_mut() {
            last.push_str(&text);
            return;
        }
        self.segments.push(Segment::Text { text });
    }

    pub fn push_player(&mut self, parts: Vec<NamePart>, honorific: impl Into<String>) {
        self.segments.push(Segment::Player {
            parts,
            honorific: honorific.into(),
        });
    }

    pub fn append(&mut self, other: Utterance) {
        for segment in other.segments {
            match segment {
                Segment::Text { text } => self.push_text(text),
                player => self.segments.push(player),
            }
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `<ruby>山田<rt>やまだ</rt></ruby>くん`
    pub fn display(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { text } => out.push_str(text),
                Segment::Player { parts, honorific } => {
                    for part in parts {
                        if part.reading.is_empty() {
                            out.push_str(&part.text);
                        } else {
                            out.push_str("<ruby>");
                            out.push_str(&part.text);
                            out.push_str("<rt>");
                            out.push_str(&part.reading);
                            out.push_str("</rt></ruby>");
                        }
                    }
                    out.push_str(honorific);
                }
            }
        }
        out
    }

    /// Plain reading text; names are replaced by their kana.
    pub fn speech(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { text } => out.push_str(text),
                Segment::Player { parts, honorific } => {
                    for part in parts {
                        if part.reading.is_empty() {
                            out.push_str(&part.text);
                        } else {
                            out.push_str(&part.reading);
                        }
                    }
                    out.push_str(honorific);
                }
            }
        }
        out
    }
}

/// Convert display text with ruby markup into speech text: every
/// `<ruby>base<rt>reading</rt></ruby>` becomes `reading`. Stray or
/// unterminated markup is kept as literal text.
pub fn strip_ruby(text: &str) -> String {
    const OPEN: &str = "<ruby>";
    const RT_OPEN: &str = "<rt>";
    const RT_CLOSE: &str = "</rt>";
    const CLOSE: &str = "</ruby>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let inner_start = start + OPEN.len();
        let Some(close) = rest[inner_start..].find(CLOSE) else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let inner = &rest[inner_start..inner_start + close];
        match (inner.find(RT_OPEN), inner.find(RT_CLOSE)) {
            (Some(a), Some(b)) if a < b => out.push_str(&inner[a + RT_OPEN.len()..b]),
            _ => out.push_str(inner),
        }
        rest = &rest[inner_start + close + CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yamada() -> Vec<NamePart> {
        vec![NamePart {
            text: "山田".into(),
            reading: "やまだ".into(),
        }]
    }

    #[test]
    fn display_and_speech_forms() {
        let mut u = Utterance::from_text("サードの");
        u.push_player(yamada(), "くん");
        u.push_text("。");
        assert_eq!(u.display(), "サードの<ruby>山田<rt>やまだ</rt></ruby>くん。");
        assert_eq!(u.speech(), "サードのやまだくん。");
    }

    #[test]
    fn adjacent_text_merges() {
        let mut u = Utterance::new();
        u.push_text("a");
        u.push_text("b");
        u.push_text("");
        assert_eq!(u.segments().len(), 1);
    }

    #[test]
    fn strip_ruby_matches_speech_form() {
        let mut u = Utterance::from_text("4番、");
        u.push_player(yamada(), "くん");
        u.push_text("に代わりまして");
        assert_eq!(strip_ruby(&u.display()), u.speech());
    }

    #[test]
    fn strip_ruby_keeps_unterminated_markup() {
        assert_eq!(strip_ruby("abc<ruby>山田"), "abc<ruby>山田");
        assert_eq!(strip_ruby("<ruby>山田</ruby>"), "山田");
        assert_eq!(strip_ruby("plain"), "plain");
    }
}
