//! Scanner integration tests: whole-stream tokenization with a small
//! driver that approximates the parser's context choices, plus targeted
//! checks for context-sensitive behavior.

use dusk_common::token::{Token, TokenKind as T};
use dusk_lexer::{ScanContext, Scanner};

/// Tokenize a whole input, choosing `Div` context after tokens that end a
/// value (the way the parser does at division-permitting positions).
fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut out = Vec::new();
    let mut ctx = ScanContext::Default;
    loop {
        let token = scanner.next_token(ctx);
        let kind = token.kind;
        out.push(token);
        if kind == T::Eof || kind == T::Illegal {
            break;
        }
        ctx = match kind {
            T::Ident | T::Number | T::String | T::Regex | T::RParen | T::RBracket | T::This
            | T::True | T::False | T::Null => ScanContext::Div,
            _ => ScanContext::Default,
        };
    }
    out
}

fn kinds(source: &str) -> Vec<T> {
    tokenize(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn tokenizes_a_mixed_statement() {
    assert_eq!(
        kinds("var answer = add(1, 2) * 3;"),
        vec![
            T::Var,
            T::Ident,
            T::Eq,
            T::Ident,
            T::LParen,
            T::Number,
            T::Comma,
            T::Number,
            T::RParen,
            T::Star,
            T::Number,
            T::Semicolon,
            T::Eof,
        ]
    );
}

#[test]
fn spans_cover_tokens_without_leading_whitespace() {
    let tokens = tokenize("let x = 42");
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 3);
    assert_eq!(tokens[1].span.start, 4);
    assert_eq!(tokens[1].span.end, 5);
    assert_eq!(tokens[3].span.start, 8);
    assert_eq!(tokens[3].span.end, 10);
    // Every span is well-ordered and inside the input.
    for token in &tokens {
        assert!(token.span.start <= token.span.end);
        assert!(token.span.end as usize <= "let x = 42".len());
    }
}

#[test]
fn division_after_value_regex_after_operator() {
    // `a / b / c` under the driver: both slashes are division.
    assert_eq!(
        kinds("a / b / c"),
        vec![T::Ident, T::Slash, T::Ident, T::Slash, T::Ident, T::Eof]
    );
    // `x = /b/g` after `=`: a regex literal.
    let tokens = tokenize("x = /b/g");
    assert_eq!(tokens[2].kind, T::Regex);
    assert_eq!(tokens[2].value, "b");
    assert_eq!(tokens[2].regex_flags.as_deref(), Some("g"));
}

#[test]
fn template_pieces_over_a_substitution() {
    // Drive the scanner the way the parser does: head piece, expression,
    // then rewind the `}` and re-scan it under Template context.
    let source = "`a${b}c`";
    let mut scanner = Scanner::new(source);
    let head = scanner.next_token(ScanContext::Default);
    assert_eq!(head.kind, T::Template);
    assert_eq!(head.value, "a");
    assert!(!head.template_end);

    let b = scanner.next_token(ScanContext::Default);
    assert_eq!(b.kind, T::Ident);

    let brace = scanner.next_token(ScanContext::Div);
    assert_eq!(brace.kind, T::RBrace);
    scanner.rewind(brace.span.start);
    let tail = scanner.next_token(ScanContext::Template);
    assert_eq!(tail.kind, T::Template);
    assert_eq!(tail.value, "c");
    assert!(tail.template_end);
    assert_eq!(tail.span.end as usize, source.len());
}

#[test]
fn name_context_for_member_names() {
    let mut scanner = Scanner::new("o.default");
    scanner.next_token(ScanContext::Default); // o
    scanner.next_token(ScanContext::Div); // .
    let name = scanner.next_token(ScanContext::Name);
    assert_eq!(name.kind, T::Ident);
    assert_eq!(name.value, "default");
}

#[test]
fn newline_before_is_set_across_trivia() {
    let tokens = tokenize("a\nb /* c */ d // e\nf");
    let by_value: Vec<(String, bool)> = tokens
        .iter()
        .filter(|t| t.kind == T::Ident)
        .map(|t| (t.value.clone(), t.newline_before))
        .collect();
    assert_eq!(
        by_value,
        vec![
            ("a".to_string(), false),
            ("b".to_string(), true),
            ("d".to_string(), false),
            ("f".to_string(), true),
        ]
    );
}

#[test]
fn number_values_decode() {
    let tokens = tokenize("1 2.5 .25 1e2 0xFF 0b11 0o7 010");
    let numbers: Vec<f64> = tokens
        .iter()
        .filter(|t| t.kind == T::Number)
        .map(|t| t.number)
        .collect();
    assert_eq!(numbers, vec![1.0, 2.5, 0.25, 100.0, 255.0, 3.0, 7.0, 8.0]);
}

#[test]
fn string_value_decodes_escapes() {
    let tokens = tokenize(r#"'ab\x63'"#);
    assert_eq!(tokens[0].kind, T::String);
    assert_eq!(tokens[0].value, "abc");
}

#[test]
fn illegal_tokens_carry_messages() {
    let tokens = tokenize("'open");
    let last = tokens.last().unwrap();
    assert_eq!(last.kind, T::Illegal);
    assert!(last.error.as_deref().unwrap().contains("unterminated"));

    let tokens = tokenize("var x = 3foo;");
    assert!(tokens.iter().any(|t| t.kind == T::Illegal));
}

#[test]
fn strict_mode_flips_octal_and_reserved_words() {
    let mut scanner = Scanner::new("static 010");
    let word = scanner.next_token(ScanContext::Default);
    assert_eq!(word.kind, T::Ident);
    let octal = scanner.next_token(ScanContext::Default);
    assert_eq!(octal.kind, T::Number);
    assert_eq!(octal.number, 8.0);

    let mut scanner = Scanner::new("static 010");
    scanner.set_strict(true);
    let word = scanner.next_token(ScanContext::Default);
    assert_eq!(word.kind, T::Static);
    let octal = scanner.next_token(ScanContext::Default);
    assert_eq!(octal.kind, T::Illegal);
}

#[test]
fn ellipsis_and_arrow_scan_as_units() {
    assert_eq!(
        kinds("(a, ...r) => a"),
        vec![
            T::LParen,
            T::Ident,
            T::Comma,
            T::Ellipsis,
            T::Ident,
            T::RParen,
            T::Arrow,
            T::Ident,
            T::Eof,
        ]
    );
}

#[test]
fn regex_with_class_and_escape() {
    let tokens = tokenize("x = /a[/]\\/b/i");
    assert_eq!(tokens[2].kind, T::Regex);
    assert_eq!(tokens[2].value, "a[/]\\/b");
    assert_eq!(tokens[2].regex_flags.as_deref(), Some("i"));
}

#[test]
fn token_stream_snapshot() {
    let rendered: Vec<String> = tokenize("x = y / 2;")
        .iter()
        .map(|t| format!("{:?}@{}..{}", t.kind, t.span.start, t.span.end))
        .collect();
    insta::assert_snapshot!(
        rendered.join(" "),
        @"Ident@0..1 Eq@2..3 Ident@4..5 Slash@6..7 Number@8..9 Semicolon@9..10 Eof@10..10"
    );
}

#[test]
fn unicode_escape_in_identifier_keeps_span() {
    let tokens = tokenize("\\u0061b = 1");
    assert_eq!(tokens[0].kind, T::Ident);
    assert_eq!(tokens[0].value, "ab");
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 7);
}
