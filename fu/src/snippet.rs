use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::{Error, SnippetSource};

/// Whole-word substitution applied to snippet text.
#[derive(Debug, Clone)]
pub struct Replace {
    pub token: String,
    pub with: String,
    pattern: Option<Regex>,
}

impl Replace {
    pub fn new(token: impl Into<String>, with: impl Into<String>) -> Self {
        let token = token.into();
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&token))).ok();
        Replace { token, with: with.into(), pattern }
    }

    pub fn apply(&self, line: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(line, regex::NoExpand(&self.with)).into_owned(),
            None => line.to_owned(),
        }
    }
}

impl PartialEq for Replace {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && self.with == other.with
    }
}

impl Eq for Replace {}

pub fn has_token(line: &str, token: &str) -> bool {
    Replace::new(token, "").pattern.is_some_and(|pattern| pattern.is_match(line))
}

/// Applies `replaces` in order to a lower-cased copy of `line`.
pub fn replace_tokens(line: &str, replaces: &[Replace]) -> String {
    replaces.iter().fold(line.to_lowercase(), |line, replace| replace.apply(&line))
}

pub fn find_file(path: &Path, search_paths: &[PathBuf]) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        return if path.exists() { Ok(path.to_owned()) } else { Err(Error::SnippetNotFound(path.to_owned())) };
    }
    search_paths
        .iter()
        .map(|directory| directory.join(path))
        .chain(std::iter::once(path.to_owned()))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| Error::SnippetNotFound(path.to_owned()))
}

/// Reads the lines of a snippet. A missing source has no lines.
pub fn read_snippet(source: Option<&SnippetSource>, search_paths: &[PathBuf]) -> Result<Vec<String>, Error> {
    match source {
        None => Ok(Vec::new()),
        Some(SnippetSource::Inline(text)) => Ok(text.lines().map(str::to_owned).collect()),
        Some(SnippetSource::File(path)) => {
            let path = find_file(path, search_paths)?;
            let text = fs::read_to_string(&path).map_err(|error| Error::io(&path, error))?;
            Ok(text.lines().map(str::to_owned).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word() {
        let replaces = [Replace::new("op1", "add_op1"), Replace::new("op2", "add_op2"), Replace::new("op3", "add_op3")];
        assert_eq!(replace_tokens("op3 <= OP1 + op2;", &replaces), "add_op3 <= add_op1 + add_op2;");
        assert_eq!(replace_tokens("op10 <= op1x;", &replaces), "op10 <= op1x;");
    }

    #[test]
    fn test_sequential() {
        let replaces = [Replace::new("op1", "mul_op1"), Replace::new("mul_op1", "wrong")];
        assert_eq!(replace_tokens("op1", &replaces), "wrong");
        let replaces = [Replace::new("glock", "glock_in"), Replace::new("glock_in", "wrong")];
        assert_eq!(replace_tokens("if glockreq = glock", &replaces), "if glockreq = wrong");
    }

    #[test]
    fn test_reused_replace() {
        let replace = Replace::new("op1", "add_op1");
        assert_eq!(replace.apply("op1 + op1"), "add_op1 + add_op1");
        assert_eq!(replace.apply("op10"), "op10");
        assert_eq!(replace, Replace::new("op1", "add_op1"));
        assert_ne!(replace, Replace::new("op1", "mul_op1"));
    }

    #[test]
    fn test_has_token() {
        assert!(has_token("glockreq <= '1';", "glockreq"));
        assert!(!has_token("glockreq <= '1';", "glock"));
        assert!(has_token("if glock = '0' then", "glock"));
    }

    #[test]
    fn test_inline_snippet() {
        let source = SnippetSource::Inline("a\nb\n".into());
        assert_eq!(read_snippet(Some(&source), &[]).unwrap(), vec!["a", "b"]);
        assert!(read_snippet(None, &[]).unwrap().is_empty());
        let missing = SnippetSource::File("does/not/exist.vhdl".into());
        assert!(matches!(read_snippet(Some(&missing), &[]), Err(Error::SnippetNotFound(_))));
    }
}
