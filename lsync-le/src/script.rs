//! Lyric scripts
//!
//! A script is the ordered list of non-empty lyric lines a sync session walks
//! through. It is computed once when a song is selected and never changes for
//! the rest of the session.

use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Immutable, cheaply clonable lyric line sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricScript {
    lines: Arc<[String]>,
}

impl LyricScript {
    /// Split lyrics on line breaks and drop blank lines
    ///
    /// `\r\n` and `\n` are both accepted. Lines keep their text as written
    /// apart from the line terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use lsync_le::script::LyricScript;
    ///
    /// let script = LyricScript::from_lyrics("first\n\n  \r\nsecond\r\n");
    /// assert_eq!(script.len(), 2);
    /// assert_eq!(script.line(1), Some("second"));
    /// ```
    pub fn from_lyrics(lyrics: &str) -> Self {
        let lines: Vec<String> = lyrics
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { lines: lines.into() }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Serialize for LyricScript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lines.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lyrics_give_empty_script() {
        assert!(LyricScript::from_lyrics("").is_empty());
        assert!(LyricScript::from_lyrics("\n\n   \n").is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let script = LyricScript::from_lyrics("a\nb\n\nc");
        assert_eq!(script.lines(), &["a", "b", "c"]);
    }

    #[test]
    fn test_inner_whitespace_kept() {
        let script = LyricScript::from_lyrics("  indented line  \n");
        assert_eq!(script.line(0), Some("  indented line  "));
    }

    #[test]
    fn test_clone_shares_lines() {
        let script = LyricScript::from_lyrics("x\ny");
        let copy = script.clone();
        assert_eq!(script, copy);
        assert!(Arc::ptr_eq(&script.lines, &copy.lines));
    }
}
