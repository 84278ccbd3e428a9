use std::fmt;
use std::str::{FromStr, SplitWhitespace};

/// How a document body is cut into model-sized chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentMode {
    /// Pack whole words until the next one would overflow.
    #[default]
    WordBoundary,
    /// Cut at exact character offsets.
    FixedWidth,
}

impl FromStr for SegmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" | "words" | "word-boundary" => Ok(SegmentMode::WordBoundary),
            "fixed" | "char" | "fixed-width" => Ok(SegmentMode::FixedWidth),
            other => Err(format!("unknown segment mode '{}' (expected word or fixed)", other)),
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMode::WordBoundary => write!(f, "word"),
            SegmentMode::FixedWidth => write!(f, "fixed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    max_chars: usize,
    mode: SegmentMode,
}

impl Segmenter {
    pub fn new(max_chars: usize, mode: SegmentMode) -> Self {
        Self {
            max_chars: max_chars.max(1),
            mode,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Lazily split `text`. Calling this again restarts from the beginning.
    pub fn segments<'a>(&self, text: &'a str) -> Segments<'a> {
        match self.mode {
            SegmentMode::WordBoundary => Segments::Words(WordChunks {
                words: text.split_whitespace(),
                pending: None,
                max_chars: self.max_chars,
            }),
            SegmentMode::FixedWidth => Segments::Fixed(FixedChunks {
                rest: text,
                max_chars: self.max_chars,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Segments<'a> {
    Words(WordChunks<'a>),
    Fixed(FixedChunks<'a>),
}

impl<'a> Iterator for Segments<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Segments::Words(chunks) => chunks.next(),
            Segments::Fixed(chunks) => chunks.next().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    words: SplitWhitespace<'a>,
    pending: Option<&'a str>,
    max_chars: usize,
}

impl<'a> Iterator for WordChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;

        // An oversized word still becomes a chunk of its own.
        let mut chunk = first.to_string();
        let mut len = first.chars().count();

        for word in self.words.by_ref() {
            let word_len = word.chars().count();
            if len + 1 + word_len > self.max_chars {
                self.pending = Some(word);
                break;
            }
            chunk.push(' ');
            chunk.push_str(word);
            len += 1 + word_len;
        }

        Some(chunk)
    }
}

#[derive(Debug, Clone)]
pub struct FixedChunks<'a> {
    rest: &'a str,
    max_chars: usize,
}

impl<'a> Iterator for FixedChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let split_at = self
            .rest
            .char_indices()
            .nth(self.max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(split_at);
        self.rest = rest;
        Some(chunk)
    }
}
