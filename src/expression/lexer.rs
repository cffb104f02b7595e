//! Equation tokenizer

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset into the equation text
    pub offset: usize,
}

/// Splits equation text into tokens, always ending with `Eof`
pub fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let kind = match c {
            b'0'..=b'9' | b'.' => {
                pos = scan_number(bytes, pos);
                let text = &source[start..pos];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{text}' at offset {start}"))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    offset: start,
                });
                continue;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                let word = &source[start..pos];
                let kind = match word.to_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "mod" => TokenKind::Percent,
                    _ => TokenKind::Ident(word.to_string()),
                };
                tokens.push(Token {
                    kind,
                    offset: start,
                });
                continue;
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'<' if next == Some(b'=') => {
                pos += 1;
                TokenKind::Le
            }
            b'<' if next == Some(b'>') => {
                pos += 1;
                TokenKind::Ne
            }
            b'<' => TokenKind::Lt,
            b'>' if next == Some(b'=') => {
                pos += 1;
                TokenKind::Ge
            }
            b'>' => TokenKind::Gt,
            b'=' => {
                if next == Some(b'=') {
                    pos += 1;
                }
                TokenKind::Eq
            }
            b'!' if next == Some(b'=') => {
                pos += 1;
                TokenKind::Ne
            }
            b'!' => TokenKind::Not,
            b'&' => {
                if next == Some(b'&') {
                    pos += 1;
                }
                TokenKind::And
            }
            b'|' => {
                if next == Some(b'|') {
                    pos += 1;
                }
                TokenKind::Or
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(format!("unexpected character '{ch}' at offset {start}"));
            }
        };
        pos += 1;
        tokens.push(Token {
            kind,
            offset: start,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: source.len(),
    });
    Ok(tokens)
}

/// Digits, an optional fraction and an optional exponent
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut look = pos + 1;
        if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
            look += 1;
        }
        if look < bytes.len() && bytes[look].is_ascii_digit() {
            pos = look;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

/// Cursor over a token vector
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &Token {
        // tokenize always terminates with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }
}
