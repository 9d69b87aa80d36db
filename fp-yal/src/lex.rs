use crate::ParseError;

/// YAL lexemes: bare words (keywords, names, terminal/layer codes), numbers,
/// and the statement terminator.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Word(String),
    Int(i64),
    Float(f64),
    Semi,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("{w:?}"),
            Token::Int(v) => format!("number {v}"),
            Token::Float(v) => format!("number {v}"),
            Token::Semi => "\";\"".to_string(),
        }
    }
}

pub struct Lexer<'a> {
    rest: &'a str,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Lexer { rest: text, line: 1 }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn skip_blank(&mut self) {
        loop {
            let mut chars = self.rest.char_indices();
            let mut consumed = 0;
            for (pos, c) in &mut chars {
                if c == '\n' {
                    self.line += 1;
                    consumed = pos + 1;
                } else if c.is_whitespace() {
                    consumed = pos + c.len_utf8();
                } else {
                    break;
                }
            }
            self.rest = &self.rest[consumed..];
            if let Some(stripped) = self.rest.strip_prefix("/*") {
                match stripped.find("*/") {
                    Some(end) => {
                        self.line += stripped[..end].matches('\n').count() as u32;
                        self.rest = &stripped[end + 2..];
                    }
                    None => {
                        self.line += stripped.matches('\n').count() as u32;
                        self.rest = "";
                    }
                }
            } else {
                return;
            }
        }
    }

    /// The next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_blank();
        let mut chars = self.rest.chars();
        let Some(first) = chars.next() else {
            return Ok(None);
        };

        if first == ';' {
            self.rest = &self.rest[1..];
            return Ok(Some(Token::Semi));
        }

        let numeric_start = first.is_ascii_digit()
            || ((first == '-' || first == '+')
                && chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'));
        if numeric_start {
            let end = self.rest[1..]
                .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E'))
                .map_or(self.rest.len(), |k| k + 1);
            let text = &self.rest[..end];
            self.rest = &self.rest[end..];
            let token = if text.contains(['.', 'e', 'E']) {
                Token::Float(text.parse().map_err(|_| ParseError::Unexpected {
                    line: self.line,
                    found: format!("{text:?}"),
                    expected: "a number",
                })?)
            } else {
                Token::Int(text.parse().map_err(|_| ParseError::Unexpected {
                    line: self.line,
                    found: format!("{text:?}"),
                    expected: "a number",
                })?)
            };
            return Ok(Some(token));
        }

        if first.is_alphanumeric() || first == '_' {
            let end = self
                .rest
                .find(|c: char| {
                    !(c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '-' | '<' | '>'))
                })
                .unwrap_or(self.rest.len());
            let word = self.rest[..end].to_string();
            self.rest = &self.rest[end..];
            return Ok(Some(Token::Word(word)));
        }

        Err(ParseError::Unexpected {
            line: self.line,
            found: format!("{first:?}"),
            expected: "a name, a number, or \";\"",
        })
    }
}
