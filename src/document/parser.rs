//! Parser for the rule document language.
//!
//! Parsing runs in two passes. A recursive-descent pass turns the token
//! stream into a generic statement/expression tree in which every
//! expression keeps its byte span. A lowering pass then walks that tree
//! and classifies each binding into the strict value grammar: literals,
//! identifier chains, nested objects and lists. Anything outside the
//! grammar is captured verbatim as a [`RawExpr`] so the document can be
//! rewritten without interpreting it.
//!
//! Grammar violations are collected as diagnostics; the parser recovers
//! at member boundaries so a single pass can report several errors.

use crate::document::lexer::{lex, Token, TokenKind};
use crate::document::value::{Document, Import, Node, PropertyRef, RawExpr, Value};
use crate::error::{ParseDiagnostic, RulebotError, StructuralError};

/// Parse a rule document.
///
/// # Errors
///
/// Returns [`RulebotError::Parse`] with every collected diagnostic for
/// malformed text, or [`RulebotError::Structural`] when the document is
/// well-formed but its root is not a `Rule`.
pub fn parse(source: &str) -> Result<Document, RulebotError> {
    let (tokens, mut diagnostics) = lex(source);
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        diagnostics: Vec::new(),
    };
    let (imports, root_def) = parser.parse_document();
    diagnostics.extend(parser.diagnostics);

    let Some(root_def) = root_def else {
        if diagnostics.is_empty() {
            diagnostics.push(ParseDiagnostic::new(1, 1, "expected an object definition"));
        }
        return Err(RulebotError::Parse(diagnostics));
    };
    if !diagnostics.is_empty() {
        return Err(RulebotError::Parse(diagnostics));
    }

    let mut lowering = Lowering {
        source,
        diagnostics: Vec::new(),
    };
    let root = lowering.lower_object(&root_def);
    if !lowering.diagnostics.is_empty() {
        return Err(RulebotError::Parse(lowering.diagnostics));
    }

    if root.type_name != "Rule" {
        return Err(StructuralError::NotARule {
            found: root.type_name,
        }
        .into());
    }

    Ok(Document::new(imports, root))
}

// ── Statement/expression tree ───────────────────────────────────────

#[derive(Debug)]
struct ObjectDef {
    type_name: String,
    line: usize,
    column: usize,
    members: Vec<Member>,
}

#[derive(Debug)]
enum Member {
    /// Anonymous nested object.
    Child(ObjectDef),
    /// `a.b.c: <expression>` binding.
    Binding {
        name: Vec<String>,
        line: usize,
        column: usize,
        value: ExprNode,
    },
}

#[derive(Debug)]
struct ExprNode {
    kind: ExprKind,
    start: usize,
    end: usize,
}

#[derive(Debug)]
enum ExprKind {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    /// `a.b.c`
    Chain(Vec<String>),
    /// Nested object literal.
    Object(ObjectDef),
    /// `[ ... ]`
    List(Vec<ExprNode>),
    /// Outside the strict value grammar; only the span matters.
    Opaque,
}

// ── Recursive descent ───────────────────────────────────────────────

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn bump(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn position(&self) -> (usize, usize) {
        self.peek().or_else(|| self.tokens.last()).map_or((1, 1), |token| {
            (token.line, token.column)
        })
    }

    fn diagnostic_here(&mut self, message: impl Into<String>) {
        let (line, column) = self.position();
        self.diagnostics
            .push(ParseDiagnostic::new(line, column, message));
    }

    fn is_ident(&self, keyword: &str) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Ident(text)) if text == keyword)
    }

    fn parse_document(&mut self) -> (Vec<Import>, Option<ObjectDef>) {
        let mut imports = Vec::new();
        while self.eat(&TokenKind::Semi) {}
        while self.is_ident("import") {
            if let Some(import) = self.parse_import() {
                imports.push(import);
            }
            while self.eat(&TokenKind::Semi) {}
        }

        let root = match self.peek_kind() {
            Some(TokenKind::Ident(_)) => self.parse_object_at_cursor(),
            _ => None,
        };

        while self.eat(&TokenKind::Semi) {}
        if root.is_some() && self.peek().is_some() {
            self.diagnostic_here("unexpected content after root object");
        }
        (imports, root)
    }

    fn parse_import(&mut self) -> Option<Import> {
        self.bump();
        let mut import = match self.peek_kind().cloned() {
            Some(TokenKind::Str(file)) => {
                self.bump();
                Import::file(file)
            }
            Some(TokenKind::Ident(_)) => {
                let chain = self.parse_ident_chain()?;
                Import {
                    uri: Some(chain.join(".")),
                    file: None,
                    version: None,
                    alias: None,
                }
            }
            _ => {
                self.diagnostic_here("expected module name or file string after `import`");
                self.recover_member();
                return None;
            }
        };

        if let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::Int(_) | TokenKind::Double(_)) {
                import.version = Some(self.source[token.start..token.end].to_string());
                self.bump();
            }
        }

        if self.is_ident("as") {
            self.bump();
            match self.peek_kind().cloned() {
                Some(TokenKind::Ident(alias)) => {
                    self.bump();
                    import.alias = Some(alias);
                }
                _ => self.diagnostic_here("expected identifier after `as`"),
            }
        }
        Some(import)
    }

    /// Parse `Type.Chain { members }` with the cursor on the first
    /// identifier.
    fn parse_object_at_cursor(&mut self) -> Option<ObjectDef> {
        let (line, column) = self.position();
        let chain = self.parse_ident_chain()?;
        if !self.eat(&TokenKind::LBrace) {
            self.diagnostic_here("expected `{` after type name");
            return None;
        }
        Some(self.parse_object_body(chain.join("."), line, column))
    }

    /// Parse members after the opening `{` has been consumed.
    fn parse_object_body(&mut self, type_name: String, line: usize, column: usize) -> ObjectDef {
        let mut members = Vec::new();
        loop {
            while self.eat(&TokenKind::Semi) {}
            match self.peek_kind() {
                None => {
                    self.diagnostics.push(ParseDiagnostic::new(
                        line,
                        column,
                        format!("unclosed `{{` for `{type_name}`"),
                    ));
                    break;
                }
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Ident(_)) => {
                    if let Some(member) = self.parse_member() {
                        members.push(member);
                    }
                }
                Some(_) => {
                    self.diagnostic_here("expected a property binding or nested object");
                    self.recover_member();
                }
            }
        }
        ObjectDef {
            type_name,
            line,
            column,
            members,
        }
    }

    fn parse_member(&mut self) -> Option<Member> {
        let (line, column) = self.position();
        let name = self.parse_ident_chain()?;
        match self.peek_kind() {
            Some(TokenKind::Colon) => {
                self.bump();
                let value = self.parse_value_expr().or_else(|| {
                    self.recover_member();
                    None
                })?;
                Some(Member::Binding {
                    name,
                    line,
                    column,
                    value,
                })
            }
            Some(TokenKind::LBrace) => {
                self.bump();
                Some(Member::Child(self.parse_object_body(
                    name.join("."),
                    line,
                    column,
                )))
            }
            _ => {
                self.diagnostic_here("expected `:` or `{` after identifier");
                self.recover_member();
                None
            }
        }
    }

    fn parse_ident_chain(&mut self) -> Option<Vec<String>> {
        let mut chain = Vec::new();
        match self.peek_kind().cloned() {
            Some(TokenKind::Ident(first)) => {
                self.bump();
                chain.push(first);
            }
            _ => {
                self.diagnostic_here("expected an identifier");
                return None;
            }
        }
        while self.peek_kind() == Some(&TokenKind::Dot) {
            match self.tokens.get(self.pos + 1).map(|token| &token.kind) {
                Some(TokenKind::Ident(next)) => {
                    let next = next.clone();
                    self.pos += 2;
                    chain.push(next);
                }
                _ => break,
            }
        }
        Some(chain)
    }

    // ── Value expressions ───────────────────────────────────────────

    fn parse_value_expr(&mut self) -> Option<ExprNode> {
        let start_index = self.pos;
        let primary = self.parse_primary(start_index)?;
        if !matches!(primary.kind, ExprKind::Opaque) && self.continues_expression() {
            return Some(self.scan_opaque(start_index));
        }
        Some(primary)
    }

    fn parse_primary(&mut self, start_index: usize) -> Option<ExprNode> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => {
                self.diagnostic_here("expected a value");
                return None;
            }
        };
        let span = |kind| ExprNode {
            kind,
            start: token.start,
            end: token.end,
        };
        match &token.kind {
            TokenKind::Str(text) => {
                self.bump();
                Some(span(ExprKind::Str(text.clone())))
            }
            TokenKind::Int(value) => {
                self.bump();
                Some(span(ExprKind::Int(*value)))
            }
            TokenKind::Double(value) => {
                self.bump();
                Some(span(ExprKind::Double(*value)))
            }
            TokenKind::Ident(text) if text == "true" || text == "false" => {
                self.bump();
                Some(span(ExprKind::Bool(text == "true")))
            }
            TokenKind::Ident(text) if text == "null" => {
                self.bump();
                Some(span(ExprKind::Null))
            }
            TokenKind::Ident(text) if is_expression_keyword(text) => {
                Some(self.scan_opaque(start_index))
            }
            TokenKind::Ident(_) => {
                let (line, column) = self.position();
                let chain = self.parse_ident_chain()?;
                if self.peek_kind() == Some(&TokenKind::LBrace) {
                    self.bump();
                    let def = self.parse_object_body(chain.join("."), line, column);
                    let end = self
                        .tokens
                        .get(self.pos.saturating_sub(1))
                        .map_or(token.end, |last| last.end);
                    Some(ExprNode {
                        kind: ExprKind::Object(def),
                        start: token.start,
                        end,
                    })
                } else {
                    let end = self
                        .tokens
                        .get(self.pos.saturating_sub(1))
                        .map_or(token.end, |last| last.end);
                    Some(ExprNode {
                        kind: ExprKind::Chain(chain),
                        start: token.start,
                        end,
                    })
                }
            }
            TokenKind::LBracket => self.parse_list(token.start),
            TokenKind::Op('-') => {
                // A negative number literal; any other use of `-` falls
                // through to the opaque scan.
                match self.tokens.get(self.pos + 1).map(|t| (t.kind.clone(), t.end)) {
                    Some((TokenKind::Int(value), end)) => {
                        self.pos += 2;
                        Some(ExprNode {
                            kind: ExprKind::Int(-value),
                            start: token.start,
                            end,
                        })
                    }
                    Some((TokenKind::Double(value), end)) => {
                        self.pos += 2;
                        Some(ExprNode {
                            kind: ExprKind::Double(-value),
                            start: token.start,
                            end,
                        })
                    }
                    _ => Some(self.scan_opaque(start_index)),
                }
            }
            TokenKind::Op(_) | TokenKind::LParen | TokenKind::LBrace => {
                Some(self.scan_opaque(start_index))
            }
            _ => {
                self.diagnostic_here("expected a value");
                None
            }
        }
    }

    fn parse_list(&mut self, start: usize) -> Option<ExprNode> {
        self.bump();
        let mut items = Vec::new();
        loop {
            if self.peek_kind() == Some(&TokenKind::RBracket) {
                break;
            }
            if self.peek().is_none() {
                self.diagnostic_here("unclosed `[`");
                return Some(ExprNode {
                    kind: ExprKind::List(items),
                    start,
                    end: self.source.len(),
                });
            }
            match self.parse_value_expr() {
                Some(item) => items.push(item),
                None => {
                    self.skip_to_list_end();
                    break;
                }
            }
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if self.peek_kind() == Some(&TokenKind::RBracket) {
                break;
            }
            self.diagnostic_here("expected `,` or `]` in list");
            self.skip_to_list_end();
            break;
        }
        let end = self.peek().map_or(self.source.len(), |token| token.end);
        self.eat(&TokenKind::RBracket);
        Some(ExprNode {
            kind: ExprKind::List(items),
            start,
            end,
        })
    }

    fn skip_to_list_end(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBracket if depth == 0 => return,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Whether the next token extends the expression beyond the strict
    /// value grammar.
    fn continues_expression(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Op(_) | TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot)
        )
    }

    /// Consume an arbitrary expression starting at `start_index` and
    /// return an opaque node spanning its exact source text.
    ///
    /// The scan alternates between expecting an operand and expecting an
    /// operator; any token that fits neither state ends the expression.
    /// Balanced `()`/`[]`/`{}` groups are consumed wholesale.
    fn scan_opaque(&mut self, start_index: usize) -> ExprNode {
        self.pos = start_index;
        let start_token = self.tokens[start_index].clone();
        let mut end = start_token.start;
        let mut expect_operand = true;
        let mut ternary_depth = 0usize;

        while let Some(token) = self.peek() {
            let token_end = token.end;
            match &token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    end = self.consume_balanced();
                    expect_operand = false;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => break,
                TokenKind::Comma | TokenKind::Semi => break,
                TokenKind::Colon => {
                    if ternary_depth == 0 {
                        break;
                    }
                    ternary_depth -= 1;
                    expect_operand = true;
                    end = token_end;
                    self.pos += 1;
                }
                TokenKind::Op('?') => {
                    ternary_depth += 1;
                    expect_operand = true;
                    end = token_end;
                    self.pos += 1;
                }
                TokenKind::Op(_) | TokenKind::Dot => {
                    expect_operand = true;
                    end = token_end;
                    self.pos += 1;
                }
                TokenKind::Ident(text) if is_expression_keyword(text) => {
                    expect_operand = true;
                    end = token_end;
                    self.pos += 1;
                }
                TokenKind::Ident(_)
                | TokenKind::Str(_)
                | TokenKind::Int(_)
                | TokenKind::Double(_) => {
                    if !expect_operand {
                        break;
                    }
                    expect_operand = false;
                    end = token_end;
                    self.pos += 1;
                }
            }
        }

        ExprNode {
            kind: ExprKind::Opaque,
            start: start_token.start,
            end,
        }
    }

    /// Consume a balanced bracket group and return the end offset of its
    /// closing token.
    fn consume_balanced(&mut self) -> usize {
        let mut depth = 0usize;
        let mut end = self.peek().map_or(0, |token| token.end);
        while let Some(token) = self.peek() {
            end = token.end;
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return end;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        self.diagnostic_here("unclosed delimiter in expression");
        end
    }

    /// Skip to the next member boundary: past a `;`, or up to (not past)
    /// the `}` that closes the current object.
    fn recover_member(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Semi if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

/// Script keywords that keep an expression scan in operand position.
fn is_expression_keyword(text: &str) -> bool {
    matches!(
        text,
        "new" | "function" | "typeof" | "delete" | "void" | "in" | "instanceof" | "return"
    )
}

// ── Lowering ────────────────────────────────────────────────────────

/// Lowers the statement tree into [`Node`]s. Parent tracking lives in
/// the recursion; the finished tree holds no back-references.
struct Lowering<'a> {
    source: &'a str,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Lowering<'_> {
    fn lower_object(&mut self, def: &ObjectDef) -> Node {
        let mut node = Node::new(&def.type_name);
        for member in &def.members {
            match member {
                Member::Child(child) => {
                    let lowered = self.lower_object(child);
                    node.add_child(lowered);
                }
                Member::Binding {
                    name,
                    line,
                    column,
                    value,
                } => {
                    let classified = self.classify(value);
                    if name.len() == 1 && name[0] == "id" {
                        match &classified {
                            Value::Reference(reference) if reference.path.is_empty() => {
                                node.id = Some(reference.identifier.clone());
                            }
                            _ => self.diagnostics.push(ParseDiagnostic::new(
                                *line,
                                *column,
                                "id must be a simple identifier",
                            )),
                        }
                    } else {
                        node.set_property(name.join("."), classified);
                    }
                }
            }
        }
        node
    }

    fn classify(&mut self, expr: &ExprNode) -> Value {
        match &expr.kind {
            ExprKind::Null => Value::Null,
            ExprKind::Bool(value) => Value::Bool(*value),
            ExprKind::Int(value) => Value::Int(*value),
            ExprKind::Double(value) => Value::Double(*value),
            ExprKind::Str(value) => Value::String(value.clone()),
            ExprKind::Chain(segments) => Value::Reference(PropertyRef::new(
                segments[0].clone(),
                segments[1..].to_vec(),
            )),
            ExprKind::Object(def) => Value::Object(self.lower_object(def)),
            ExprKind::List(items) => {
                Value::List(items.iter().map(|item| self.classify(item)).collect())
            }
            ExprKind::Opaque => {
                Value::Expr(RawExpr::new(&self.source[expr.start..expr.end]))
            }
        }
    }
}
