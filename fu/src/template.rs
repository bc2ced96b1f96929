use std::collections::BTreeMap;

use yap::{IntoTokens, Tokens};

/// Text with `<<placeholder,KEY>>` or `<<placeholder,KEY,DEFAULT>>` markers.
#[derive(Debug, Clone, Default)]
pub struct Template {
    values: BTreeMap<String, String>,
}

impl Template {
    pub fn new() -> Self {
        Template::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Appends to the value of `key`, creating it if needed.
    pub fn append(&mut self, key: impl Into<String>, value: &str) -> &mut Self {
        self.values.entry(key.into()).or_default().push_str(value);
        self
    }

    fn placeholder(&self, tokens: &mut impl Tokens<Item = char>) -> Option<String> {
        if !tokens.tokens("<<placeholder,".chars()) {
            return None;
        }
        let key: String = tokens.take_while(|&c| c != ',' && c != '>').collect();
        let default: Option<String> = tokens.token(',').then(|| tokens.take_while(|&c| c != '>').collect());
        if !tokens.tokens(">>".chars()) {
            return None;
        }
        Some(match self.values.get(key.trim()) {
            Some(value) => value.clone(),
            None => default.unwrap_or_default(),
        })
    }

    /// Replaces every placeholder in `text`; text that only looks like a placeholder is kept.
    pub fn substitute(&self, text: &str) -> String {
        let mut tokens = text.into_tokens();
        let mut result = String::with_capacity(text.len());
        while !tokens.eof() {
            if let Some(value) = tokens.optional(|tokens| self.placeholder(tokens)) {
                result.push_str(&value);
            } else if let Some(c) = tokens.next() {
                result.push(c);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let mut template = Template::new();
        template.set("FUNAME", "alu");
        assert_eq!(template.substitute("module <<placeholder,FUNAME>>_top;"), "module alu_top;");
        assert_eq!(template.substitute("x = <<placeholder,WIDTH,32>>;"), "x = 32;");
        assert_eq!(template.substitute("x = <<placeholder,WIDTH>>;"), "x = ;");
        assert_eq!(template.substitute("a << b >> c"), "a << b >> c");
        assert_eq!(template.substitute("<<placeholder,FUNAME"), "<<placeholder,FUNAME");
    }

    #[test]
    fn test_append() {
        let mut template = Template::new();
        template.append("INPUT", ".a(x),\n").append("INPUT", ".b(y),\n");
        assert_eq!(template.substitute("<<placeholder,INPUT>>"), ".a(x),\n.b(y),\n");
    }
}
