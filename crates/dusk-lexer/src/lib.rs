// dusk lexer -- context-sensitive tokenizer for the dusk compiler.
//
// The scanner is parser-driven: every token is produced on demand through
// `next_token(ScanContext)`, because the grammar is not context-free at the
// token level. A `/` is a regular-expression literal except where the parser
// knows division is permitted, a `}` restarts a template literal when the
// parser is inside a substitution, and reserved-word classification loosens
// for property names and import/export specifiers.

mod cursor;

use cursor::Cursor;
use dusk_common::token::{keyword_from_str, strict_keyword_from_str, Token, TokenKind};

/// The scan context requested by the parser for the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanContext {
    /// Normal tokenization; `/` starts a regular-expression literal.
    Default,
    /// The preceding grammar permits division; `/` is an operator.
    Div,
    /// Reserved words are classified as identifiers (property names,
    /// import/export specifiers).
    Name,
    /// A `}` starts a template continuation rather than a punctuator.
    Template,
}

/// The dusk scanner. Converts source text into tokens on demand.
///
/// The scanner never fails: malformed input produces an `Illegal` token
/// whose `error` field carries the message, and the parser turns that into
/// a structured syntax error.
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    strict: bool,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner for the given source text.
    pub fn new(source: &'src str) -> Self {
        let mut cursor = Cursor::new(source);
        // A leading byte-order mark is trivia.
        if cursor.peek() == Some('\u{FEFF}') {
            cursor.advance();
        }
        Self {
            cursor,
            source,
            strict: false,
        }
    }

    /// Whether the scanner is currently in strict mode.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Toggle strict mode. Affects legacy octal literals, octal escapes,
    /// and the strict-reserved word set.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Current byte position.
    pub fn pos(&self) -> u32 {
        self.cursor.pos()
    }

    /// Reposition the scanner at the given byte offset. The parser uses
    /// this to re-scan a lookahead token under a different context.
    pub fn rewind(&mut self, offset: u32) {
        self.cursor.rewind(offset);
    }

    /// The source slice a token covers.
    pub fn raw(&self, token: &Token) -> &'src str {
        self.cursor.slice(token.span.start, token.span.end)
    }

    /// Produce the next token under the given scan context.
    pub fn next_token(&mut self, ctx: ScanContext) -> Token {
        // Template continuation: the parser rewinds onto the `}` that closed
        // a substitution and asks for the rest of the template from there.
        if ctx == ScanContext::Template && self.cursor.peek() == Some('}') {
            let start = self.cursor.pos();
            self.cursor.advance();
            return self.scan_template(start, false);
        }

        // A shebang line is trivia when it opens the input.
        if self.cursor.pos() == 0
            && self.cursor.peek() == Some('#')
            && self.cursor.peek_next() == Some('!')
        {
            self.cursor.eat_while(|c| !is_line_terminator(c));
        }

        let (newline_before, trivia_error) = self.skip_trivia();
        if let Some(mut illegal) = trivia_error {
            illegal.newline_before = newline_before;
            return illegal;
        }

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            let mut tok = Token::new(TokenKind::Eof, start, start);
            tok.newline_before = newline_before;
            return tok;
        };

        let mut tok = match c {
            '`' => {
                self.cursor.advance();
                self.scan_template(start, true)
            }
            '"' | '\'' => self.scan_string(start, c),
            '0'..='9' => self.scan_number(start),
            '.' if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            '/' => {
                if ctx == ScanContext::Div {
                    self.scan_slash_operator(start)
                } else {
                    self.scan_regex(start)
                }
            }
            c if is_ident_start(c) || c == '\\' => self.scan_identifier(start, ctx),
            _ => self.scan_punctuator(start),
        };
        tok.newline_before = newline_before;
        tok
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// Skip whitespace and comments. Returns whether a line terminator was
    /// crossed, plus an `Illegal` token for an unterminated block comment.
    fn skip_trivia(&mut self) -> (bool, Option<Token>) {
        let mut newline = false;
        loop {
            match self.cursor.peek() {
                Some(c) if is_line_terminator(c) => {
                    newline = true;
                    self.cursor.advance();
                }
                Some(c) if is_whitespace(c) => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    let comment = self.scan_line_comment();
                    debug_assert_eq!(comment.kind, TokenKind::Comment);
                }
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    let comment = self.scan_block_comment();
                    if comment.kind == TokenKind::Illegal {
                        return (newline, Some(comment));
                    }
                    if comment.value.chars().any(is_line_terminator) {
                        newline = true;
                    }
                }
                _ => break,
            }
        }
        (newline, None)
    }

    /// `// ...` to end of line. Consumed by the parser's trivia skip and
    /// never surfaced.
    fn scan_line_comment(&mut self) -> Token {
        let start = self.cursor.pos();
        self.cursor.advance(); // /
        self.cursor.advance(); // /
        let text_start = self.cursor.pos();
        self.cursor.eat_while(|c| !is_line_terminator(c));
        let mut tok = Token::new(TokenKind::Comment, start, self.cursor.pos());
        tok.value = self.cursor.slice(text_start, self.cursor.pos()).to_string();
        tok
    }

    /// `/* ... */`, possibly spanning lines. Unterminated -> `Illegal`.
    fn scan_block_comment(&mut self) -> Token {
        let start = self.cursor.pos();
        self.cursor.advance(); // /
        self.cursor.advance(); // *
        let text_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    let mut tok = Token::new(TokenKind::Illegal, start, self.cursor.pos());
                    tok.error = Some("unterminated block comment".into());
                    return tok;
                }
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    let text_end = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    let mut tok = Token::new(TokenKind::Comment, start, self.cursor.pos());
                    tok.value = self.cursor.slice(text_start, text_end).to_string();
                    return tok;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Identifiers and reserved words ─────────────────────────────────

    /// Scan an identifier, decoding `\uXXXX` / `\u{...}` escapes into the
    /// token value while the span covers the escape text. A bare sequence
    /// matching a reserved word (or strict-reserved word in strict mode)
    /// returns the reserved-word kind, except under `Name` context.
    fn scan_identifier(&mut self, start: u32, ctx: ScanContext) -> Token {
        let mut value = String::new();
        let mut has_escape = false;

        // First character.
        match self.cursor.peek() {
            Some('\\') => {
                has_escape = true;
                match self.scan_unicode_escape_char() {
                    Some(c) if is_ident_start(c) => value.push(c),
                    _ => return self.illegal(start, "invalid Unicode escape in identifier"),
                }
            }
            Some(c) => {
                self.cursor.advance();
                value.push(c);
            }
            None => return self.illegal(start, "unexpected end of input"),
        }

        loop {
            match self.cursor.peek() {
                Some('\\') => {
                    has_escape = true;
                    match self.scan_unicode_escape_char() {
                        Some(c) if is_ident_part(c) => value.push(c),
                        _ => return self.illegal(start, "invalid Unicode escape in identifier"),
                    }
                }
                Some(c) if is_ident_part(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
                _ => break,
            }
        }

        let mut kind = TokenKind::Ident;
        if !has_escape && ctx != ScanContext::Name {
            if let Some(k) = keyword_from_str(&value) {
                kind = k;
            } else if self.strict {
                if let Some(k) = strict_keyword_from_str(&value) {
                    kind = k;
                }
            }
        }

        let mut tok = Token::new(kind, start, self.cursor.pos());
        tok.value = value;
        tok
    }

    /// Decode a `\uXXXX` or `\u{...}` escape, consuming it. Returns the
    /// decoded character, or `None` when malformed.
    fn scan_unicode_escape_char(&mut self) -> Option<char> {
        self.cursor.advance(); // backslash
        if self.cursor.peek() != Some('u') {
            return None;
        }
        self.cursor.advance();
        let code = if self.cursor.peek() == Some('{') {
            self.cursor.advance();
            let mut v: u32 = 0;
            let mut digits = 0;
            while let Some(c) = self.cursor.peek() {
                if let Some(d) = c.to_digit(16) {
                    v = v.checked_mul(16)?.checked_add(d)?;
                    digits += 1;
                    self.cursor.advance();
                } else {
                    break;
                }
            }
            if digits == 0 || self.cursor.peek() != Some('}') {
                return None;
            }
            self.cursor.advance();
            v
        } else {
            let mut v: u32 = 0;
            for _ in 0..4 {
                let d = self.cursor.peek()?.to_digit(16)?;
                v = v * 16 + d;
                self.cursor.advance();
            }
            v
        };
        char::from_u32(code)
    }

    // ── Numbers ────────────────────────────────────────────────────────

    /// Scan a numeric literal, decoding its value into `Token::number`.
    ///
    /// Decimal with optional fraction and exponent; `0x`/`0b`/`0o` radix
    /// prefixes; legacy octal when a leading `0` is followed by octal
    /// digits (rejected in strict mode). The character after any numeric
    /// literal must not start an identifier.
    fn scan_number(&mut self, start: u32) -> Token {
        let first = self.cursor.peek();
        let number;

        if first == Some('0')
            && matches!(self.cursor.peek_next(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O'))
        {
            self.cursor.advance(); // 0
            let radix = match self.cursor.advance() {
                Some('x' | 'X') => 16,
                Some('b' | 'B') => 2,
                _ => 8,
            };
            let mut value = 0f64;
            let mut digits = 0;
            while let Some(d) = self.cursor.peek().and_then(|c| c.to_digit(radix)) {
                value = value * radix as f64 + d as f64;
                digits += 1;
                self.cursor.advance();
            }
            if digits == 0 {
                return self.illegal(start, "missing digits after radix prefix");
            }
            number = value;
        } else if first == Some('0')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            // Legacy octal, or a decimal with a useless leading zero when a
            // non-octal digit appears.
            self.cursor.eat_while(|c| c.is_ascii_digit());
            let text = self.cursor.slice(start, self.cursor.pos());
            if text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
                if self.strict {
                    return self.illegal(start, "octal literals are not allowed in strict mode");
                }
                let mut value = 0f64;
                for b in text.bytes() {
                    value = value * 8.0 + (b - b'0') as f64;
                }
                number = value;
            } else {
                number = text.parse().unwrap_or(0.0);
            }
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit());
            if self.cursor.peek() == Some('.') {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                let has_exp = match self.cursor.peek_next() {
                    Some('+' | '-') => {
                        // Need a digit after the sign.
                        let mut probe = self.cursor.pos() as usize + 2;
                        while !self.source.is_char_boundary(probe) {
                            probe += 1;
                        }
                        self.source[probe..]
                            .chars()
                            .next()
                            .is_some_and(|c| c.is_ascii_digit())
                    }
                    Some(c) => c.is_ascii_digit(),
                    None => false,
                };
                if !has_exp {
                    return self.illegal(start, "malformed exponent in numeric literal");
                }
                self.cursor.advance(); // e/E
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
            let text = self.cursor.slice(start, self.cursor.pos());
            number = text.parse().unwrap_or(0.0);
        }

        if self.cursor.peek().is_some_and(|c| is_ident_start(c) || c.is_ascii_digit()) {
            return self.illegal(start, "identifier starts immediately after numeric literal");
        }

        let mut tok = Token::new(TokenKind::Number, start, self.cursor.pos());
        tok.number = number;
        tok
    }

    // ── Strings and templates ──────────────────────────────────────────

    /// Scan a string literal delimited by `'` or `"`, decoding escapes.
    fn scan_string(&mut self, start: u32, quote: char) -> Token {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => return self.illegal(start, "unterminated string literal"),
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    if let Some(msg) = self.scan_escape(&mut value) {
                        return self.illegal(start, &msg);
                    }
                }
                Some(c) if is_line_terminator(c) && c != '\u{2028}' && c != '\u{2029}' => {
                    return self.illegal(start, "unterminated string literal");
                }
                Some(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
            }
        }
        let mut tok = Token::new(TokenKind::String, start, self.cursor.pos());
        tok.value = value;
        tok
    }

    /// Scan one template piece. `head` is true when entered from a backtick
    /// (as opposed to a `}` continuation). The piece ends at a backtick
    /// (`template_end = true`) or at `${` (`template_end = false`).
    fn scan_template(&mut self, start: u32, head: bool) -> Token {
        let _ = head;
        let content_start = self.cursor.pos();
        let mut value = String::new();
        let template_end;
        let content_end;
        loop {
            match self.cursor.peek() {
                None => return self.illegal(start, "unterminated template literal"),
                Some('`') => {
                    content_end = self.cursor.pos();
                    self.cursor.advance();
                    template_end = true;
                    break;
                }
                Some('$') if self.cursor.peek_next() == Some('{') => {
                    content_end = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    template_end = false;
                    break;
                }
                Some('\\') => {
                    if let Some(msg) = self.scan_escape(&mut value) {
                        return self.illegal(start, &msg);
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
            }
        }
        let mut tok = Token::new(TokenKind::Template, start, self.cursor.pos());
        tok.value = value;
        tok.raw_value = self.cursor.slice(content_start, content_end).to_string();
        tok.template_end = template_end;
        tok
    }

    /// Decode one escape sequence (the `\` has not been consumed yet) into
    /// `out`. Returns an error message for malformed escapes.
    fn scan_escape(&mut self, out: &mut String) -> Option<String> {
        self.cursor.advance(); // backslash
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return Some("unterminated string literal".into()),
        };
        match c {
            't' => {
                self.cursor.advance();
                out.push('\t');
            }
            'b' => {
                self.cursor.advance();
                out.push('\u{8}');
            }
            'v' => {
                self.cursor.advance();
                out.push('\u{B}');
            }
            'f' => {
                self.cursor.advance();
                out.push('\u{C}');
            }
            'r' => {
                self.cursor.advance();
                out.push('\r');
            }
            'n' => {
                self.cursor.advance();
                out.push('\n');
            }
            'x' => {
                self.cursor.advance();
                let hi = self.cursor.peek().and_then(|c| c.to_digit(16));
                self.cursor.advance();
                let lo = self.cursor.peek().and_then(|c| c.to_digit(16));
                self.cursor.advance();
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push(char::from_u32(hi * 16 + lo).unwrap_or('\u{FFFD}'))
                    }
                    _ => return Some("invalid hexadecimal escape sequence".into()),
                }
            }
            'u' => {
                self.cursor.rewind(self.cursor.pos() - 1);
                match self.scan_unicode_escape_char() {
                    Some(c) => out.push(c),
                    None => return Some("invalid Unicode escape sequence".into()),
                }
            }
            '0'..='7' => {
                let mut digits = String::new();
                let mut value: u32 = 0;
                while let Some(d) = self.cursor.peek().and_then(|c| c.to_digit(8)) {
                    if digits.len() == 3 || value * 8 + d > 0xFF {
                        break;
                    }
                    value = value * 8 + d;
                    digits.push(char::from_digit(d, 8).unwrap());
                    self.cursor.advance();
                }
                let next_is_digit = self.cursor.peek().is_some_and(|c| c.is_ascii_digit());
                if self.strict && (digits != "0" || next_is_digit) {
                    return Some("octal escape sequences are not allowed in strict mode".into());
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            '8' | '9' => {
                if self.strict {
                    return Some("octal escape sequences are not allowed in strict mode".into());
                }
                self.cursor.advance();
                out.push(c);
            }
            '\r' => {
                // Line continuation; \r\n counts as one terminator.
                self.cursor.advance();
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.cursor.advance();
            }
            _ => {
                self.cursor.advance();
                out.push(c);
            }
        }
        None
    }

    // ── Regular expressions and slashes ────────────────────────────────

    /// Scan `/` or `/=` under division context.
    fn scan_slash_operator(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(TokenKind::SlashEq, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Slash, start, self.cursor.pos())
        }
    }

    /// Scan a regular-expression literal: body until an unescaped `/`
    /// outside a character class, then identifier-part flag characters.
    fn scan_regex(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening /
        let body_start = self.cursor.pos();
        let mut in_class = false;
        let body_end;
        loop {
            match self.cursor.peek() {
                None => return self.illegal(start, "unterminated regular expression"),
                Some(c) if is_line_terminator(c) => {
                    return self.illegal(start, "unterminated regular expression");
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        None => return self.illegal(start, "unterminated regular expression"),
                        Some(c) if is_line_terminator(c) => {
                            return self.illegal(start, "unterminated regular expression");
                        }
                        Some(_) => {
                            self.cursor.advance();
                        }
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.advance();
                }
                Some('/') if !in_class => {
                    body_end = self.cursor.pos();
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let flags_start = self.cursor.pos();
        self.cursor.eat_while(is_ident_part);
        let mut tok = Token::new(TokenKind::Regex, start, self.cursor.pos());
        tok.value = self.cursor.slice(body_start, body_end).to_string();
        tok.regex_flags = Some(
            self.cursor
                .slice(flags_start, self.cursor.pos())
                .to_string(),
        );
        tok
    }

    // ── Punctuators ────────────────────────────────────────────────────

    /// Scan a punctuator with longest-match on multi-character operators.
    fn scan_punctuator(&mut self, start: u32) -> Token {
        use TokenKind::*;
        let c = self.cursor.advance().expect("caller checked peek");
        let kind = match c {
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            ';' => Semicolon,
            ',' => Comma,
            '~' => Tilde,
            '?' => Question,
            ':' => Colon,
            '.' => {
                if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
                    self.cursor.advance();
                    self.cursor.advance();
                    Ellipsis
                } else {
                    Dot
                }
            }
            '<' => match self.cursor.peek() {
                Some('=') => {
                    self.cursor.advance();
                    LtEq
                }
                Some('<') => {
                    self.cursor.advance();
                    if self.cursor.peek() == Some('=') {
                        self.cursor.advance();
                        ShlEq
                    } else {
                        Shl
                    }
                }
                _ => Lt,
            },
            '>' => match self.cursor.peek() {
                Some('=') => {
                    self.cursor.advance();
                    GtEq
                }
                Some('>') => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some('>') => {
                            self.cursor.advance();
                            if self.cursor.peek() == Some('=') {
                                self.cursor.advance();
                                UShrEq
                            } else {
                                UShr
                            }
                        }
                        Some('=') => {
                            self.cursor.advance();
                            ShrEq
                        }
                        _ => Shr,
                    }
                }
                _ => Gt,
            },
            '=' => match self.cursor.peek() {
                Some('=') => {
                    self.cursor.advance();
                    if self.cursor.peek() == Some('=') {
                        self.cursor.advance();
                        EqEqEq
                    } else {
                        EqEq
                    }
                }
                Some('>') => {
                    self.cursor.advance();
                    Arrow
                }
                _ => Eq,
            },
            '!' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    if self.cursor.peek() == Some('=') {
                        self.cursor.advance();
                        NotEqEq
                    } else {
                        NotEq
                    }
                } else {
                    Bang
                }
            }
            '+' => match self.cursor.peek() {
                Some('+') => {
                    self.cursor.advance();
                    PlusPlus
                }
                Some('=') => {
                    self.cursor.advance();
                    PlusEq
                }
                _ => Plus,
            },
            '-' => match self.cursor.peek() {
                Some('-') => {
                    self.cursor.advance();
                    MinusMinus
                }
                Some('=') => {
                    self.cursor.advance();
                    MinusEq
                }
                _ => Minus,
            },
            '*' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    StarEq
                } else {
                    Star
                }
            }
            '%' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    PercentEq
                } else {
                    Percent
                }
            }
            '&' => match self.cursor.peek() {
                Some('&') => {
                    self.cursor.advance();
                    AmpAmp
                }
                Some('=') => {
                    self.cursor.advance();
                    AmpEq
                }
                _ => Amp,
            },
            '|' => match self.cursor.peek() {
                Some('|') => {
                    self.cursor.advance();
                    BarBar
                }
                Some('=') => {
                    self.cursor.advance();
                    BarEq
                }
                _ => Bar,
            },
            '^' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    CaretEq
                } else {
                    Caret
                }
            }
            _ => {
                let mut tok = Token::new(Illegal, start, self.cursor.pos());
                tok.error = Some(format!("unexpected character: {c:?}"));
                return tok;
            }
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// Build an `Illegal` token from `start` to the current position.
    fn illegal(&self, start: u32, message: &str) -> Token {
        let mut tok = Token::new(TokenKind::Illegal, start, self.cursor.pos());
        tok.error = Some(message.to_string());
        tok
    }
}

// ── Character classes ──────────────────────────────────────────────────

/// Identifier-start: Unicode ID_Start plus `$` and `_`.
fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || unicode_ident::is_xid_start(c)
}

/// Identifier-part: Unicode ID_Continue plus `$`, ZWNJ, and ZWJ.
fn is_ident_part(c: char) -> bool {
    c == '$' || c == '\u{200C}' || c == '\u{200D}' || unicode_ident::is_xid_continue(c)
}

/// The four line terminators of the dialect.
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Non-terminator whitespace.
fn is_whitespace(c: char) -> bool {
    !is_line_terminator(c) && (c == '\u{FEFF}' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(src: &str, ctx: ScanContext) -> Token {
        Scanner::new(src).next_token(ctx)
    }

    #[test]
    fn scans_identifier_and_keyword() {
        let tok = one("hello", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.value, "hello");
        assert_eq!(one("var", ScanContext::Default).kind, TokenKind::Var);
    }

    #[test]
    fn name_context_relaxes_reserved_words() {
        let tok = one("class", ScanContext::Name);
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.value, "class");
    }

    #[test]
    fn strict_reserved_only_in_strict() {
        assert_eq!(one("yield", ScanContext::Default).kind, TokenKind::Ident);
        let mut s = Scanner::new("yield");
        s.set_strict(true);
        assert_eq!(s.next_token(ScanContext::Default).kind, TokenKind::Yield);
    }

    #[test]
    fn identifier_escape_decodes_but_span_covers_escape() {
        let tok = one("\\u0061bc", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.value, "abc");
        assert_eq!(tok.span.start, 0);
        assert_eq!(tok.span.end, 8);
    }

    #[test]
    fn escaped_reserved_word_is_identifier() {
        let tok = one("v\\u0061r", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.value, "var");
    }

    #[test]
    fn slash_is_regex_by_default_and_division_in_div_context() {
        let tok = one("/ab+c/gi", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Regex);
        assert_eq!(tok.value, "ab+c");
        assert_eq!(tok.regex_flags.as_deref(), Some("gi"));

        assert_eq!(one("/x/", ScanContext::Div).kind, TokenKind::Slash);
        assert_eq!(one("/=", ScanContext::Div).kind, TokenKind::SlashEq);
    }

    #[test]
    fn regex_slash_inside_class_does_not_terminate() {
        let tok = one("/[/]/", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Regex);
        assert_eq!(tok.value, "[/]");
    }

    #[test]
    fn template_head_and_continuation() {
        let tok = one("`plain`", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Template);
        assert_eq!(tok.value, "plain");
        assert!(tok.template_end);

        let tok = one("`a${", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Template);
        assert_eq!(tok.value, "a");
        assert!(!tok.template_end);

        let tok = one("}b`", ScanContext::Template);
        assert_eq!(tok.kind, TokenKind::Template);
        assert_eq!(tok.value, "b");
        assert!(tok.template_end);
    }

    #[test]
    fn template_raw_keeps_escapes() {
        let tok = one("`a\\n`", ScanContext::Default);
        assert_eq!(tok.value, "a\n");
        assert_eq!(tok.raw_value, "a\\n");
    }

    #[test]
    fn string_escapes_decode() {
        let tok = one(r#""a\tb\x41B\u{43}""#, ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.value, "a\tbABC");
    }

    #[test]
    fn string_line_continuation_has_no_value() {
        let tok = one("\"a\\\nb\"", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.value, "ab");
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let tok = one("\"abc", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Illegal);
        assert!(tok.error.is_some());
    }

    #[test]
    fn number_forms_decode() {
        assert_eq!(one("42", ScanContext::Default).number, 42.0);
        assert_eq!(one("1.5e2", ScanContext::Default).number, 150.0);
        assert_eq!(one(".5", ScanContext::Default).number, 0.5);
        assert_eq!(one("0xFF", ScanContext::Default).number, 255.0);
        assert_eq!(one("0b101", ScanContext::Default).number, 5.0);
        assert_eq!(one("0o17", ScanContext::Default).number, 15.0);
        assert_eq!(one("017", ScanContext::Default).number, 15.0);
    }

    #[test]
    fn octal_number_rejected_in_strict() {
        let mut s = Scanner::new("017");
        s.set_strict(true);
        let tok = s.next_token(ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Illegal);
        assert!(tok.error.unwrap().contains("octal"));
    }

    #[test]
    fn identifier_after_number_is_illegal() {
        let tok = one("3in", ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Illegal);
    }

    #[test]
    fn newline_before_tracks_comments_and_whitespace() {
        let mut s = Scanner::new("a // c\nb");
        let a = s.next_token(ScanContext::Default);
        assert!(!a.newline_before);
        let b = s.next_token(ScanContext::Div);
        assert_eq!(b.kind, TokenKind::Ident);
        assert_eq!(b.value, "b");
        assert!(b.newline_before);
    }

    #[test]
    fn block_comment_with_newline_sets_flag() {
        let mut s = Scanner::new("a /* x\ny */ b");
        s.next_token(ScanContext::Default);
        let b = s.next_token(ScanContext::Div);
        assert!(b.newline_before);
    }

    #[test]
    fn unterminated_block_comment_is_illegal() {
        let mut s = Scanner::new("a /* x");
        s.next_token(ScanContext::Default);
        let tok = s.next_token(ScanContext::Div);
        assert_eq!(tok.kind, TokenKind::Illegal);
    }

    #[test]
    fn shebang_and_bom_are_trivia() {
        let mut s = Scanner::new("\u{FEFF}#!/usr/bin/env node\nvar");
        let tok = s.next_token(ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Var);
    }

    #[test]
    fn multi_char_punctuators_longest_match() {
        assert_eq!(one(">>>=", ScanContext::Default).kind, TokenKind::UShrEq);
        assert_eq!(one("...", ScanContext::Default).kind, TokenKind::Ellipsis);
        assert_eq!(one("=>", ScanContext::Default).kind, TokenKind::Arrow);
        assert_eq!(one("===", ScanContext::Default).kind, TokenKind::EqEqEq);
    }

    #[test]
    fn eof_token_at_end() {
        let mut s = Scanner::new("  ");
        let tok = s.next_token(ScanContext::Default);
        assert_eq!(tok.kind, TokenKind::Eof);
        assert_eq!(tok.span.start, 2);
    }

    #[test]
    fn rewind_allows_rescan() {
        let mut s = Scanner::new("a / b");
        s.next_token(ScanContext::Default); // a
        let div = s.next_token(ScanContext::Div);
        assert_eq!(div.kind, TokenKind::Slash);
        s.rewind(div.span.start);
        let regex = s.next_token(ScanContext::Default);
        assert_eq!(regex.kind, TokenKind::Regex);
    }
}
