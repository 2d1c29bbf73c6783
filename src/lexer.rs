use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i32),
    Float(f32),
    Char(u16),
    Str(String),
    Bool(bool),
    Null,
    // Identifiers
    Ident(String),
    // Type keywords
    IntType,
    FloatType,
    CharType,
    BoolType,
    VoidType,
    StringType,
    // Keywords
    If,
    Else,
    For,
    While,
    Return,
    New,
    Struct,
    Class,
    Import,
    Export,
    As,
    From,
    // Operators
    PlusPlus,   // ++
    MinusMinus, // --
    Eq,         // ==
    Neq,        // !=
    Lte,        // <=
    Gte,        // >=
    AndAnd,     // &&
    OrOr,       // ||
    Assign,     // =
    Lt,         // <
    Gt,         // >
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Dot,        // .
    Comma,      // ,
    Semicolon,  // ;
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]
    Eof,
}

/// A scanned token. `offset` is the character index of its first character.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Lexer error [{line}:{col}]: {msg}")]
    Error {
        msg: String,
        line: usize,
        col: usize,
    },
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "int" => Some(TokenKind::IntType),
        "float" => Some(TokenKind::FloatType),
        "char" => Some(TokenKind::CharType),
        "bool" => Some(TokenKind::BoolType),
        "void" => Some(TokenKind::VoidType),
        "string" => Some(TokenKind::StringType),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "return" => Some(TokenKind::Return),
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        "null" => Some(TokenKind::Null),
        "new" => Some(TokenKind::New),
        "struct" => Some(TokenKind::Struct),
        "class" => Some(TokenKind::Class),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "as" => Some(TokenKind::As),
        "from" => Some(TokenKind::From),
        _ => None,
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    // position of the token being scanned
    start: usize,
    start_line: usize,
    start_col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            start: 0,
            start_line: 1,
            start_col: 1,
        }
    }

    fn error(&self, msg: impl Into<String>) -> LexerError {
        LexerError::Error {
            msg: msg.into(),
            line: self.start_line,
            col: self.start_col,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: self.chars[self.start..self.pos].iter().collect(),
            offset: self.start,
            line: self.start_line,
            col: self.start_col,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        while self.pos < self.chars.len() {
            self.start = self.pos;
            self.start_line = self.line;
            self.start_col = self.col;
            if let Some(tok) = self.scan_token()? {
                tokens.push(tok);
            }
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            offset: self.pos,
            line: self.line,
            col: self.col,
        });

        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Option<Token>, LexerError> {
        let ch = match self.current() {
            Some(c) => c,
            None => return Ok(None),
        };

        if ch.is_whitespace() {
            self.advance();
            return Ok(None);
        }

        // Comments
        if ch == '/' && self.peek(1) == Some('/') {
            self.skip_comment();
            return Ok(None);
        }

        if ch == '"' {
            return self.scan_string().map(Some);
        }

        if ch == '\'' {
            return self.scan_char().map(Some);
        }

        if ch.is_ascii_digit() {
            return self.scan_number().map(Some);
        }

        if ch.is_alphabetic() || ch == '_' {
            return Ok(Some(self.scan_identifier()));
        }

        self.scan_operator().map(Some)
    }

    fn skip_comment(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
            self.advance();
        }
    }

    fn scan_escape(&mut self, quote: char) -> Result<char, LexerError> {
        match self.advance() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some(c) if c == quote => Ok(c),
            Some(c) => Err(self.error(format!("Invalid escape sequence '\\{}'", c))),
            None => Err(self.error("Unterminated literal")),
        }
    }

    fn scan_string(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume opening "
        let mut value = String::new();

        loop {
            match self.current() {
                None => return Err(self.error("Unterminated string literal")),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let c = self.scan_escape('"')?;
                    value.push(c);
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Ok(self.make(TokenKind::Str(value)))
    }

    fn scan_char(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume opening '
        let c = match self.advance() {
            None | Some('\'') => return Err(self.error("Unterminated character literal")),
            Some('\\') => self.scan_escape('\'')?,
            Some(c) => c,
        };
        if !self.match_char('\'') {
            return Err(self.error("Unterminated character literal"));
        }
        let mut units = [0u16; 2];
        let encoded = c.encode_utf16(&mut units);
        if encoded.len() != 1 {
            return Err(self.error("Character literal does not fit in one UTF-16 unit"));
        }
        Ok(self.make(TokenKind::Char(encoded[0])))
    }

    fn scan_number(&mut self) -> Result<Token, LexerError> {
        let mut num_str = String::new();
        let mut is_float = false;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('.') && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            num_str.push('.');
            self.advance(); // consume '.'
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    num_str.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.current(), Some('f' | 'F')) {
            is_float = true;
            self.advance();
        }

        if is_float {
            let f: f32 = num_str
                .parse()
                .map_err(|_| self.error("Invalid floating-point number"))?;
            Ok(self.make(TokenKind::Float(f)))
        } else {
            let i: i32 = num_str
                .parse()
                .map_err(|_| self.error(format!("Integer literal out of range: {}", num_str)))?;
            Ok(self.make(TokenKind::Int(i)))
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword(&ident).unwrap_or(TokenKind::Ident(ident));
        self.make(kind)
    }

    fn scan_operator(&mut self) -> Result<Token, LexerError> {
        let ch = match self.advance() {
            Some(c) => c,
            None => return Err(self.error("Unexpected end of input")),
        };

        let kind = match ch {
            '+' if self.match_char('+') => TokenKind::PlusPlus,
            '-' if self.match_char('-') => TokenKind::MinusMinus,
            '=' if self.match_char('=') => TokenKind::Eq,
            '!' if self.match_char('=') => TokenKind::Neq,
            '<' if self.match_char('=') => TokenKind::Lte,
            '>' if self.match_char('=') => TokenKind::Gte,
            '&' if self.match_char('&') => TokenKind::AndAnd,
            '|' if self.match_char('|') => TokenKind::OrOr,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => return Err(self.error(format!("Unexpected character: {:?}", other))),
        };

        Ok(self.make(kind))
    }
}
