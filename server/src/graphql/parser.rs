//! Lexer and recursive-descent parser for executable GraphQL documents.
//!
//! Covers the slice of the language the task API serves: query and
//! mutation operations (shorthand included), variable definitions with
//! defaults, aliases, and the full input literal grammar. Fragments,
//! directives and block strings are rejected with descriptive errors,
//! and every syntax error carries the 1-based line and column where the
//! offending token starts.

use std::iter::Peekable;
use std::str::Chars;

use super::Error;
use super::ast::{
    Argument, Document, Field, Operation, OperationKind, Pos, TypeRef, Value, VariableDefinition,
};

/// Upper bound on selection set, input value and type nesting. Parsing is
/// recursive, so the cap keeps hostile documents off the call stack.
const MAX_DEPTH: usize = 64;

/// Parses an executable document: one or more query/mutation operations.
pub fn parse_document(source: &str) -> Result<Document, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        tokens,
        index: 0,
        depth: 0,
    };

    let mut operations = Vec::new();
    while !parser.at_end() {
        operations.push(parser.parse_operation()?);
    }
    if operations.is_empty() {
        return Err(syntax_error(
            "document contains no operations",
            Pos { line: 1, column: 1 },
        ));
    }
    Ok(Document { operations })
}

fn syntax_error(message: impl Into<String>, pos: Pos) -> Error {
    Error::Syntax {
        message: message.into(),
        line: pos.line,
        column: pos.column,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    Punct(char),
    Spread,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: Pos,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Pos,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            pos: Pos { line: 1, column: 1 },
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ignored();
            let pos = self.pos;
            let Some(ch) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    pos,
                });
                return Ok(tokens);
            };
            let kind = match ch {
                '!' | '$' | '(' | ')' | ':' | '=' | '@' | '[' | ']' | '{' | '}' => {
                    TokenKind::Punct(ch)
                }
                '.' => {
                    if self.chars.peek() == Some(&'.') {
                        self.bump();
                        if self.chars.peek() == Some(&'.') {
                            self.bump();
                            TokenKind::Spread
                        } else {
                            return Err(syntax_error("unexpected character '.'", pos));
                        }
                    } else {
                        return Err(syntax_error("unexpected character '.'", pos));
                    }
                }
                '"' => self.lex_string(pos)?,
                c if c == '-' || c.is_ascii_digit() => self.lex_number(c, pos)?,
                c if c == '_' || c.is_ascii_alphabetic() => self.lex_name(c),
                other => {
                    return Err(syntax_error(format!("unexpected character {other:?}"), pos));
                }
            };
            tokens.push(Token { kind, pos });
        }
    }

    /// GraphQL treats commas like whitespace, and comments run to end of line.
    fn skip_ignored(&mut self) {
        loop {
            match self.chars.peek() {
                Some(&(' ' | '\t' | '\r' | '\n' | ',' | '\u{feff}')) => {
                    self.bump();
                }
                Some(&'#') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_name(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c == '_' || c.is_ascii_alphanumeric() {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Name(name)
    }

    fn lex_number(&mut self, first: char, pos: Pos) -> Result<TokenKind, Error> {
        let mut text = String::from(first);
        if first == '-' {
            match self.chars.peek() {
                Some(c) if c.is_ascii_digit() => {}
                _ => return Err(syntax_error("expected a digit after '-'", pos)),
            }
        }
        self.take_digits(&mut text);
        let digits = text.strip_prefix('-').unwrap_or(&text);
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(syntax_error("unexpected digit after a leading 0", pos));
        }

        let mut is_float = false;
        if self.chars.peek() == Some(&'.') {
            is_float = true;
            text.push('.');
            self.bump();
            match self.chars.peek() {
                Some(c) if c.is_ascii_digit() => {}
                _ => return Err(syntax_error("expected a digit after '.'", pos)),
            }
            self.take_digits(&mut text);
        }
        if let Some(&('e' | 'E')) = self.chars.peek() {
            is_float = true;
            text.push('e');
            self.bump();
            if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                text.push(sign);
                self.bump();
            }
            match self.chars.peek() {
                Some(c) if c.is_ascii_digit() => {}
                _ => return Err(syntax_error("expected a digit in the exponent", pos)),
            }
            self.take_digits(&mut text);
        }

        if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|_| syntax_error(format!("malformed float {text:?}"), pos))?;
            Ok(TokenKind::Float(value))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| syntax_error(format!("integer {text} is out of range"), pos))?;
            Ok(TokenKind::Int(value))
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, pos: Pos) -> Result<TokenKind, Error> {
        if self.chars.peek() == Some(&'"') {
            self.bump();
            if self.chars.peek() == Some(&'"') {
                return Err(syntax_error("block strings are not supported", pos));
            }
            return Ok(TokenKind::Str(String::new()));
        }

        let mut value = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(syntax_error("unterminated string", pos));
            };
            match ch {
                '"' => return Ok(TokenKind::Str(value)),
                '\n' => return Err(syntax_error("unterminated string", pos)),
                '\\' => {
                    let Some(escape) = self.bump() else {
                        return Err(syntax_error("unterminated string", pos));
                    };
                    match escape {
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        '/' => value.push('/'),
                        'b' => value.push('\u{0008}'),
                        'f' => value.push('\u{000C}'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'u' => {
                            let mut code = self.lex_escape_unit(pos)?;
                            // A high surrogate is only legal as half of a
                            // \uXXXX\uXXXX pair naming one code point.
                            if (0xD800..=0xDBFF).contains(&code) {
                                if self.bump() != Some('\\') || self.bump() != Some('u') {
                                    return Err(syntax_error(
                                        "unpaired surrogate in unicode escape",
                                        pos,
                                    ));
                                }
                                let low = self.lex_escape_unit(pos)?;
                                if !(0xDC00..=0xDFFF).contains(&low) {
                                    return Err(syntax_error(
                                        "unpaired surrogate in unicode escape",
                                        pos,
                                    ));
                                }
                                code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            }
                            let Some(ch) = char::from_u32(code) else {
                                return Err(syntax_error("invalid unicode escape", pos));
                            };
                            value.push(ch);
                        }
                        other => {
                            return Err(syntax_error(
                                format!("unsupported escape sequence \\{other}"),
                                pos,
                            ));
                        }
                    }
                }
                other => value.push(other),
            }
        }
    }

    /// Reads the four hex digits of a `\u` escape.
    fn lex_escape_unit(&mut self, pos: Pos) -> Result<u32, Error> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(digit) = self.bump().and_then(|c| c.to_digit(16)) else {
                return Err(syntax_error("invalid unicode escape", pos));
            };
            code = code * 16 + digit;
        }
        Ok(code)
    }
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn descend(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(syntax_error(
                format!("nesting exceeds the maximum depth of {MAX_DEPTH}"),
                self.peek().pos,
            ));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn is_punct(&self, c: char) -> bool {
        matches!(self.peek().kind, TokenKind::Punct(p) if p == c)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.is_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), Error> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{c}'")))
        }
    }

    fn expect_name(&mut self, expected: &str) -> Result<(String, Pos), Error> {
        let token = self.peek().clone();
        if let TokenKind::Name(name) = token.kind {
            self.advance();
            Ok((name, token.pos))
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        syntax_error(
            format!("{expected}, found {}", describe(&token.kind)),
            token.pos,
        )
    }

    fn parse_operation(&mut self) -> Result<Operation, Error> {
        if self.is_punct('{') {
            let selection_set = self.parse_selection_set()?;
            return Ok(Operation {
                kind: OperationKind::Query,
                name: None,
                variable_definitions: Vec::new(),
                selection_set,
            });
        }

        let token = self.peek().clone();
        let TokenKind::Name(keyword) = token.kind else {
            return Err(self.unexpected("expected an operation"));
        };
        self.advance();
        let kind = match keyword.as_str() {
            "query" => OperationKind::Query,
            "mutation" => OperationKind::Mutation,
            "subscription" => OperationKind::Subscription,
            "fragment" => return Err(syntax_error("fragments are not supported", token.pos)),
            other => {
                return Err(syntax_error(
                    format!("expected an operation, found \"{other}\""),
                    token.pos,
                ));
            }
        };

        let name = if matches!(self.peek().kind, TokenKind::Name(_)) {
            Some(self.expect_name("expected an operation name")?.0)
        } else {
            None
        };
        let variable_definitions = if self.is_punct('(') {
            self.parse_variable_definitions()?
        } else {
            Vec::new()
        };
        if self.is_punct('@') {
            return Err(syntax_error("directives are not supported", self.peek().pos));
        }
        let selection_set = self.parse_selection_set()?;

        Ok(Operation {
            kind,
            name,
            variable_definitions,
            selection_set,
        })
    }

    fn parse_variable_definitions(&mut self) -> Result<Vec<VariableDefinition>, Error> {
        self.expect_punct('(')?;
        if self.is_punct(')') {
            return Err(self.unexpected("expected a variable definition"));
        }

        let mut definitions: Vec<VariableDefinition> = Vec::new();
        while !self.eat_punct(')') {
            let pos = self.peek().pos;
            if !self.eat_punct('$') {
                return Err(self.unexpected("expected a variable beginning with '$'"));
            }
            let (name, _) = self.expect_name("expected a variable name")?;
            if definitions.iter().any(|existing| existing.name == name) {
                return Err(syntax_error(format!("duplicate variable \"${name}\""), pos));
            }
            self.expect_punct(':')?;
            let ty = self.parse_type()?;
            let default_value = if self.eat_punct('=') {
                Some(self.parse_value(false)?)
            } else {
                None
            };
            definitions.push(VariableDefinition {
                name,
                ty,
                default_value,
                pos,
            });
        }
        Ok(definitions)
    }

    fn parse_type(&mut self) -> Result<TypeRef, Error> {
        let base = if self.is_punct('[') {
            self.descend()?;
            self.advance();
            let inner = self.parse_type()?;
            self.expect_punct(']')?;
            self.ascend();
            TypeRef::List(Box::new(inner))
        } else {
            TypeRef::Named(self.expect_name("expected a type name")?.0)
        };
        if self.eat_punct('!') {
            Ok(TypeRef::NonNull(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    fn parse_selection_set(&mut self) -> Result<Vec<Field>, Error> {
        self.descend()?;
        self.expect_punct('{')?;
        if self.is_punct('}') {
            return Err(self.unexpected("expected a field selection"));
        }

        let mut fields = Vec::new();
        while !self.eat_punct('}') {
            fields.push(self.parse_field()?);
        }
        self.ascend();
        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<Field, Error> {
        if matches!(self.peek().kind, TokenKind::Spread) {
            return Err(syntax_error("fragments are not supported", self.peek().pos));
        }

        let (mut name, pos) = self.expect_name("expected a field name")?;
        let mut alias = None;
        if self.eat_punct(':') {
            let (actual, _) = self.expect_name("expected a field name after the alias")?;
            alias = Some(name);
            name = actual;
        }
        let arguments = if self.is_punct('(') {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        if self.is_punct('@') {
            return Err(syntax_error("directives are not supported", self.peek().pos));
        }
        let selection_set = if self.is_punct('{') {
            self.parse_selection_set()?
        } else {
            Vec::new()
        };

        Ok(Field {
            alias,
            name,
            arguments,
            selection_set,
            pos,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, Error> {
        self.expect_punct('(')?;
        if self.is_punct(')') {
            return Err(self.unexpected("expected an argument"));
        }

        let mut arguments: Vec<Argument> = Vec::new();
        while !self.eat_punct(')') {
            let (name, pos) = self.expect_name("expected an argument name")?;
            self.expect_punct(':')?;
            let value = self.parse_value(true)?;
            if arguments.iter().any(|argument| argument.name == name) {
                return Err(syntax_error(format!("duplicate argument \"{name}\""), pos));
            }
            arguments.push(Argument { name, value });
        }
        Ok(arguments)
    }

    fn parse_value(&mut self, allow_variables: bool) -> Result<Value, Error> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Punct('$') => {
                self.advance();
                if !allow_variables {
                    return Err(syntax_error(
                        "variables are not allowed in default values",
                        token.pos,
                    ));
                }
                let (name, _) = self.expect_name("expected a variable name")?;
                Ok(Value::Variable(name))
            }
            TokenKind::Int(value) => {
                self.advance();
                Ok(Value::Int(value))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Value::Float(value))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Value::String(value))
            }
            TokenKind::Name(name) => {
                self.advance();
                match name.as_str() {
                    "true" => Ok(Value::Boolean(true)),
                    "false" => Ok(Value::Boolean(false)),
                    "null" => Ok(Value::Null),
                    _ => Ok(Value::Enum(name)),
                }
            }
            TokenKind::Punct('[') => {
                self.descend()?;
                self.advance();
                let mut items = Vec::new();
                while !self.eat_punct(']') {
                    items.push(self.parse_value(allow_variables)?);
                }
                self.ascend();
                Ok(Value::List(items))
            }
            TokenKind::Punct('{') => {
                self.descend()?;
                self.advance();
                let mut fields: Vec<(String, Value)> = Vec::new();
                while !self.eat_punct('}') {
                    let (name, pos) = self.expect_name("expected an input field name")?;
                    self.expect_punct(':')?;
                    let value = self.parse_value(allow_variables)?;
                    if fields.iter().any(|(existing, _)| *existing == name) {
                        return Err(syntax_error(
                            format!("duplicate input field \"{name}\""),
                            pos,
                        ));
                    }
                    fields.push((name, value));
                }
                self.ascend();
                Ok(Value::Object(fields))
            }
            _ => Err(self.unexpected("expected a value")),
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Name(name) => format!("\"{name}\""),
        TokenKind::Int(value) => value.to_string(),
        TokenKind::Float(value) => value.to_string(),
        TokenKind::Str(_) => "a string".to_string(),
        TokenKind::Punct(c) => format!("'{c}'"),
        TokenKind::Spread => "'...'".to_string(),
        TokenKind::Eof => "end of document".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        parse_document(source).expect("Failed to parse document")
    }

    fn parse_err(source: &str) -> (String, usize, usize) {
        match parse_document(source) {
            Err(Error::Syntax {
                message,
                line,
                column,
            }) => (message, line, column),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_named_query_with_variables() {
        let document = parse(
            "query GetTaskById($id: Int!) {
              getTaskById(id: $id) {
                id
                title
                status
              }
            }",
        );

        assert_eq!(document.operations.len(), 1);
        let operation = &document.operations[0];
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.name.as_deref(), Some("GetTaskById"));
        assert_eq!(operation.variable_definitions.len(), 1);
        let definition = &operation.variable_definitions[0];
        assert_eq!(definition.name, "id");
        assert_eq!(
            definition.ty,
            TypeRef::NonNull(Box::new(TypeRef::Named("Int".to_string())))
        );

        let field = &operation.selection_set[0];
        assert_eq!(field.name, "getTaskById");
        assert_eq!(field.arguments[0].name, "id");
        assert_eq!(field.arguments[0].value, Value::Variable("id".to_string()));
        let selected: Vec<_> = field
            .selection_set
            .iter()
            .map(|sub| sub.name.as_str())
            .collect();
        assert_eq!(selected, ["id", "title", "status"]);
    }

    #[test]
    fn parses_shorthand_queries() {
        let document = parse("{ getAllTasks { id } }");

        let operation = &document.operations[0];
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.name, None);
        assert_eq!(operation.selection_set[0].name, "getAllTasks");
    }

    #[test]
    fn parses_aliases() {
        let document = parse("{ first: getTaskById(id: 1) { id } }");

        let field = &document.operations[0].selection_set[0];
        assert_eq!(field.alias.as_deref(), Some("first"));
        assert_eq!(field.name, "getTaskById");
        assert_eq!(field.response_key(), "first");
        assert_eq!(field.arguments[0].value, Value::Int(1));
    }

    #[test]
    fn parses_inline_input_objects() {
        let document = parse(
            r#"mutation {
              createTask(input: { title: "Buy milk", description: "Two liters" }) {
                id
              }
            }"#,
        );

        let operation = &document.operations[0];
        assert_eq!(operation.kind, OperationKind::Mutation);
        let argument = &operation.selection_set[0].arguments[0];
        assert_eq!(
            argument.value,
            Value::Object(vec![
                ("title".to_string(), Value::String("Buy milk".to_string())),
                (
                    "description".to_string(),
                    Value::String("Two liters".to_string())
                ),
            ])
        );
    }

    #[test]
    fn parses_enum_list_and_null_literals_in_defaults() {
        let document = parse(
            "query Q($status: TaskStatus = COMPLETED, $ids: [Int] = [1, 2], $note: String = null) {
              getAllTasks { id }
            }",
        );

        let definitions = &document.operations[0].variable_definitions;
        assert_eq!(
            definitions[0].default_value,
            Some(Value::Enum("COMPLETED".to_string()))
        );
        assert_eq!(
            definitions[1].default_value,
            Some(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(definitions[2].default_value, Some(Value::Null));
    }

    #[test]
    fn parses_multiple_operations() {
        let document = parse(
            "query A { getAllTasks { id } }
             mutation B { deleteTask(id: 1) }",
        );

        assert_eq!(document.operations.len(), 2);
        assert_eq!(document.operations[0].name.as_deref(), Some("A"));
        assert_eq!(document.operations[1].kind, OperationKind::Mutation);
    }

    #[test]
    fn parses_subscription_operations() {
        let document = parse("subscription S { getAllTasks { id } }");

        assert_eq!(document.operations[0].kind, OperationKind::Subscription);
    }

    #[test]
    fn parses_escaped_strings() {
        let document = parse(r#"{ f(a: "a\"b\nA\t\/x") }"#);

        let argument = &document.operations[0].selection_set[0].arguments[0];
        assert_eq!(argument.value, Value::String("a\"b\nA\t/x".to_string()));
    }

    #[test]
    fn decodes_unicode_escapes_including_surrogate_pairs() {
        let document = parse(r#"{ f(a: "café 😀") }"#);

        let argument = &document.operations[0].selection_set[0].arguments[0];
        assert_eq!(argument.value, Value::String("café 😀".to_string()));
    }

    #[test]
    fn rejects_unpaired_surrogate_escapes() {
        let (message, _, _) = parse_err(r#"{ f(a: "\uD83D oops") }"#);
        assert_eq!(message, "unpaired surrogate in unicode escape");

        let (message, _, _) = parse_err(r#"{ f(a: "\uD83DA") }"#);
        assert_eq!(message, "unpaired surrogate in unicode escape");

        let (message, _, _) = parse_err(r#"{ f(a: "\uDE00") }"#);
        assert_eq!(message, "invalid unicode escape");
    }

    #[test]
    fn parses_numbers() {
        let document = parse("{ f(a: 42, b: -7, c: 3.25, d: 2e3, e: 25e-2, g: 5E+1) }");

        let arguments = &document.operations[0].selection_set[0].arguments;
        assert_eq!(arguments[0].value, Value::Int(42));
        assert_eq!(arguments[1].value, Value::Int(-7));
        assert_eq!(arguments[2].value, Value::Float(3.25));
        assert_eq!(arguments[3].value, Value::Float(2000.0));
        assert_eq!(arguments[4].value, Value::Float(0.25));
        assert_eq!(arguments[5].value, Value::Float(50.0));
    }

    #[test]
    fn rejects_numbers_with_leading_zeros() {
        let (message, _, _) = parse_err("{ getTaskById(id: 007) { id } }");
        assert_eq!(message, "unexpected digit after a leading 0");

        let document = parse("{ f(a: 0, b: -0, c: 0.5) }");
        let arguments = &document.operations[0].selection_set[0].arguments;
        assert_eq!(arguments[0].value, Value::Int(0));
        assert_eq!(arguments[1].value, Value::Int(0));
        assert_eq!(arguments[2].value, Value::Float(0.5));
    }

    #[test]
    fn skips_comments_and_commas() {
        let document = parse(
            "# fetch everything
            {
              getAllTasks, {
                id, title # trailing note
              }
            }",
        );

        let field = &document.operations[0].selection_set[0];
        assert_eq!(field.name, "getAllTasks");
        assert_eq!(field.selection_set.len(), 2);
    }

    #[test]
    fn reports_token_positions() {
        let document = parse("{\n  getAllTasks {\n    id\n  }\n}");

        let field = &document.operations[0].selection_set[0];
        assert_eq!(field.pos, Pos { line: 2, column: 3 });
        assert_eq!(field.selection_set[0].pos, Pos { line: 3, column: 5 });
    }

    #[test]
    fn rejects_fragment_definitions() {
        let (message, _, _) = parse_err("fragment F on Task { id }");
        assert_eq!(message, "fragments are not supported");
    }

    #[test]
    fn rejects_fragment_spreads() {
        let (message, _, _) = parse_err("{ getAllTasks { ...TaskFields } }");
        assert_eq!(message, "fragments are not supported");
    }

    #[test]
    fn rejects_directives() {
        let (message, _, _) = parse_err("{ getAllTasks { id @skip(if: true) } }");
        assert_eq!(message, "directives are not supported");
    }

    #[test]
    fn rejects_block_strings() {
        let (message, _, _) = parse_err(r#"{ f(a: """multi line""") }"#);
        assert_eq!(message, "block strings are not supported");
    }

    #[test]
    fn rejects_empty_selection_sets() {
        let (message, _, _) = parse_err("{ }");
        assert!(message.starts_with("expected a field selection"));
    }

    #[test]
    fn rejects_empty_documents() {
        let (message, _, _) = parse_err("   ");
        assert_eq!(message, "document contains no operations");
    }

    #[test]
    fn rejects_unterminated_strings() {
        let (message, line, column) = parse_err("{ f(a: \"oops) }");
        assert_eq!(message, "unterminated string");
        assert_eq!((line, column), (1, 8));
    }

    #[test]
    fn rejects_unknown_escapes() {
        let (message, _, _) = parse_err(r#"{ f(a: "\q") }"#);
        assert_eq!(message, "unsupported escape sequence \\q");
    }

    #[test]
    fn rejects_variables_in_default_values() {
        let (message, _, _) = parse_err("query Q($a: Int = $b) { getAllTasks { id } }");
        assert_eq!(message, "variables are not allowed in default values");
    }

    #[test]
    fn rejects_duplicate_arguments() {
        let (message, _, _) = parse_err("{ getTaskById(id: 1, id: 2) { id } }");
        assert_eq!(message, "duplicate argument \"id\"");
    }

    #[test]
    fn rejects_duplicate_input_object_fields() {
        let (message, _, _) =
            parse_err(r#"mutation { createTask(input: { title: "a", title: "b" }) { id } }"#);
        assert_eq!(message, "duplicate input field \"title\"");
    }

    #[test]
    fn rejects_duplicate_variable_definitions() {
        let (message, _, _) =
            parse_err("query Q($id: Int, $id: Int!) { getTaskById(id: $id) { id } }");
        assert_eq!(message, "duplicate variable \"$id\"");
    }

    #[test]
    fn rejects_deeply_nested_selection_sets() {
        let depth = 200_000;
        let mut source = "{ a ".repeat(depth);
        source.push_str("{ id }");
        source.push_str(&"}".repeat(depth));

        let (message, _, _) = parse_err(&source);
        assert_eq!(message, "nesting exceeds the maximum depth of 64");
    }

    #[test]
    fn rejects_deeply_nested_input_values() {
        let mut source = String::from("{ f(a: ");
        source.push_str(&"[".repeat(100));
        source.push('1');
        source.push_str(&"]".repeat(100));
        source.push_str(") }");

        let (message, _, _) = parse_err(&source);
        assert_eq!(message, "nesting exceeds the maximum depth of 64");
    }

    #[test]
    fn rejects_deeply_nested_variable_types() {
        let mut source = String::from("query Q($v: ");
        source.push_str(&"[".repeat(100));
        source.push_str("Int");
        source.push_str(&"]".repeat(100));
        source.push_str(") { getAllTasks { id } }");

        let (message, _, _) = parse_err(&source);
        assert_eq!(message, "nesting exceeds the maximum depth of 64");
    }

    #[test]
    fn reports_truncated_documents_with_position() {
        let (message, line, column) = parse_err("query {\n  getAllTasks {");
        assert!(message.contains("end of document"), "{message}");
        assert_eq!((line, column), (2, 16));
    }
}
