//! Structural syntax check for script text.
//!
//! This is not a full parser. It walks the token structure of the script
//! (strings, template literals, comments, regular-expression literals and
//! bracket nesting) and reports the first structural fault with its line.
//! That catches the failures that break a page at load time: unbalanced
//! brackets and unterminated literals or comments.

use std::fmt;

/// A structural fault in script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line of the fault.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// Marker pushed for an open `${` inside a template literal.
const TEMPLATE_EXPR: char = '$';

#[derive(Debug, Clone, PartialEq)]
enum Prev {
    Start,
    Punct(char),
    Word(String),
    Value,
}

impl Prev {
    fn allows_regex(&self) -> bool {
        match self {
            Prev::Start => true,
            Prev::Punct(c) => !matches!(c, ')' | ']'),
            Prev::Word(w) => REGEX_KEYWORDS.contains(&w.as_str()),
            Prev::Value => false,
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    stack: Vec<(char, usize)>,
    prev: Prev,
}

/// Check `source` for structural faults.
pub fn check(source: &str) -> Result<(), SyntaxError> {
    Scanner {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        stack: Vec::new(),
        prev: Prev::Start,
    }
    .run()
}

impl Scanner {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn fail<T>(&self, line: usize, message: impl Into<String>) -> Result<T, SyntaxError> {
        Err(SyntaxError {
            line,
            message: message.into(),
        })
    }

    fn run(mut self) -> Result<(), SyntaxError> {
        while let Some(c) = self.peek(0) {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.block_comment()?,
                '/' if self.prev.allows_regex() => {
                    self.regex()?;
                    self.prev = Prev::Value;
                }
                '\'' | '"' => {
                    self.string(c)?;
                    self.prev = Prev::Value;
                }
                '`' => {
                    self.bump();
                    self.template()?;
                }
                '(' | '[' | '{' => {
                    let line = self.line;
                    self.bump();
                    self.stack.push((c, line));
                    self.prev = Prev::Punct(c);
                }
                ')' | ']' | '}' => self.close(c)?,
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let mut word = String::new();
                    while let Some(c) = self
                        .peek(0)
                        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                    {
                        word.push(c);
                        self.bump();
                    }
                    self.prev = Prev::Word(word);
                }
                c if c.is_ascii_digit() => {
                    while self
                        .peek(0)
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
                    {
                        self.bump();
                    }
                    self.prev = Prev::Value;
                }
                _ => {
                    self.bump();
                    self.prev = Prev::Punct(c);
                }
            }
        }

        match self.stack.last() {
            None => Ok(()),
            Some(&(TEMPLATE_EXPR, line)) => self.fail(line, "Unterminated template expression"),
            Some(&(open, line)) => self.fail(line, format!("Unclosed '{open}'")),
        }
    }

    fn close(&mut self, c: char) -> Result<(), SyntaxError> {
        let line = self.line;
        self.bump();
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.stack.pop() {
            Some((TEMPLATE_EXPR, _)) if c == '}' => self.template(),
            Some((open, _)) if open == expected => {
                self.prev = Prev::Punct(c);
                Ok(())
            }
            Some((TEMPLATE_EXPR, opened)) => self.fail(
                line,
                format!("Unexpected '{c}' inside template expression opened on line {opened}"),
            ),
            Some((open, opened)) => self.fail(
                line,
                format!("Unexpected '{c}', '{open}' opened on line {opened} is still open"),
            ),
            None => self.fail(line, format!("Unexpected '{c}'")),
        }
    }

    fn line_comment(&mut self) {
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.bump();
        }
    }

    fn block_comment(&mut self) -> Result<(), SyntaxError> {
        let line = self.line;
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek(0) == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return self.fail(line, "Unterminated block comment"),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<(), SyntaxError> {
        let line = self.line;
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some('\n') | None => return self.fail(line, "Unterminated string literal"),
                Some(_) => {}
            }
        }
    }

    /// Scan template text up to the closing backtick or the next `${`.
    /// The opening backtick has already been consumed.
    fn template(&mut self) -> Result<(), SyntaxError> {
        let line = self.line;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('`') => {
                    self.prev = Prev::Value;
                    return Ok(());
                }
                Some('$') if self.peek(0) == Some('{') => {
                    self.bump();
                    self.stack.push((TEMPLATE_EXPR, self.line));
                    self.prev = Prev::Start;
                    return Ok(());
                }
                Some(_) => {}
                None => return self.fail(line, "Unterminated template literal"),
            }
        }
    }

    fn regex(&mut self) -> Result<(), SyntaxError> {
        let line = self.line;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some('\n') | None => {
                    return self.fail(line, "Unterminated regular expression literal");
                }
                Some(_) => {}
            }
        }
        while self.peek(0).is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        Ok(())
    }
}
