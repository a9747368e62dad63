// Hand-written, line-oriented parser for the Tinker mini-language.
// Indentation delimits blocks; comments start with '#' outside of strings.

use thiserror::Error;

use crate::ast::{BinOp, Expr, Function, Stmt};

#[cfg(test)]
mod tests;

/// Parser error with the 1-based source line it occurred on
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A source line that carries code (blank and comment-only lines are dropped
/// before block structure is analyzed).
#[derive(Debug)]
struct SrcLine {
    number: usize,
    indent: usize,
    text: String,
}

/// Parse a complete function definition from source text.
///
/// The header must be a `def name(params):` line; the body is either inline
/// after the colon (`def f(): return 1`) or an indented suite on the
/// following lines.
pub fn parse_function(source: &str) -> Result<Function, ParseError> {
    let lines = effective_lines(source);
    if lines.is_empty() {
        return Err(ParseError::new(1, "empty function source"));
    }

    let header = &lines[0];
    let text = header.text.trim_start();
    let rest = text
        .strip_prefix("def ")
        .ok_or_else(|| ParseError::new(header.number, "expected 'def'"))?;

    let paren = rest
        .find('(')
        .ok_or_else(|| ParseError::new(header.number, "expected '(' in function header"))?;
    let name = rest[..paren].trim().to_string();
    if !is_valid_identifier(&name) {
        return Err(ParseError::new(
            header.number,
            format!("invalid function name '{name}'"),
        ));
    }

    let close = rest
        .find(')')
        .ok_or_else(|| ParseError::new(header.number, "expected ')' in function header"))?;
    if close < paren {
        return Err(ParseError::new(header.number, "mismatched parentheses"));
    }
    let params = parse_params(&rest[paren + 1..close], header.number)?;

    let tail = rest[close + 1..].trim_start();
    let tail = tail
        .strip_prefix(':')
        .ok_or_else(|| ParseError::new(header.number, "expected ':' after function header"))?;

    let mut parser = BlockParser {
        lines: &lines,
        pos: 1,
    };
    let body = if tail.trim().is_empty() {
        parser.parse_suite(header.indent, header.number)?
    } else {
        // inline single-statement body: def f(): return 1
        vec![parse_simple_stmt(tail.trim(), header.number)?]
    };

    if let Some(extra) = parser.lines.get(parser.pos) {
        return Err(ParseError::new(
            extra.number,
            "unexpected statement after function body",
        ));
    }

    Ok(Function { name, params, body })
}

fn parse_params(text: &str, line: usize) -> Result<Vec<String>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }
    text.split(',')
        .map(|p| {
            let p = p.trim();
            if is_valid_identifier(p) {
                Ok(p.to_string())
            } else {
                Err(ParseError::new(line, format!("invalid parameter '{p}'")))
            }
        })
        .collect()
}

/// Drop blank and comment-only lines, strip trailing comments, and record
/// the indentation of what remains.
fn effective_lines(source: &str) -> Vec<SrcLine> {
    let mut out = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let code = strip_comment(raw);
        if code.trim().is_empty() {
            continue;
        }
        let indent = code.len() - code.trim_start().len();
        out.push(SrcLine {
            number: i + 1,
            indent,
            text: code.trim_end().to_string(),
        });
    }
    out
}

/// Cut a line at the first '#' that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '#' => return &line[..i],
                _ => {}
            },
        }
    }
    line
}

struct BlockParser<'a> {
    lines: &'a [SrcLine],
    pos: usize,
}

impl BlockParser<'_> {
    /// Parse an indented suite: all following lines deeper than
    /// `parent_indent`, at a consistent indentation level.
    fn parse_suite(&mut self, parent_indent: usize, header_line: usize) -> Result<Vec<Stmt>, ParseError> {
        let indent = match self.lines.get(self.pos) {
            Some(l) if l.indent > parent_indent => l.indent,
            _ => return Err(ParseError::new(header_line, "expected an indented block")),
        };

        let mut stmts = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::new(line.number, "unexpected indent"));
            }
            stmts.push(self.parse_stmt(indent)?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self, indent: usize) -> Result<Stmt, ParseError> {
        let line = &self.lines[self.pos];
        let number = line.number;
        let text = line.text.trim_start();

        if first_word(text) == "if" {
            self.pos += 1;
            let (cond_src, inline) = split_header(&text[2..], number)?;
            let cond = parse_expr_str(cond_src, number)?;
            let body = self.parse_arm_body(indent, inline, number)?;
            let mut arms = vec![(cond, body)];
            let mut otherwise = Vec::new();

            while let Some(next) = self.lines.get(self.pos) {
                if next.indent != indent {
                    break;
                }
                let t = next.text.trim_start();
                if first_word(t) == "elif" {
                    let n = next.number;
                    self.pos += 1;
                    let (cond_src, inline) = split_header(&t[4..], n)?;
                    let cond = parse_expr_str(cond_src, n)?;
                    let body = self.parse_arm_body(indent, inline, n)?;
                    arms.push((cond, body));
                } else if first_word(t) == "else" {
                    let n = next.number;
                    self.pos += 1;
                    let (head, inline) = split_header(&t[4..], n)?;
                    if !head.trim().is_empty() {
                        return Err(ParseError::new(n, "unexpected text after 'else'"));
                    }
                    otherwise = self.parse_arm_body(indent, inline, n)?;
                    break;
                } else {
                    break;
                }
            }
            return Ok(Stmt::If { arms, otherwise });
        }

        if first_word(text) == "while" {
            self.pos += 1;
            let (cond_src, inline) = split_header(&text[5..], number)?;
            let condition = parse_expr_str(cond_src, number)?;
            let body = self.parse_arm_body(indent, inline, number)?;
            return Ok(Stmt::While { condition, body });
        }

        self.pos += 1;
        parse_simple_stmt(text, number)
    }

    fn parse_arm_body(
        &mut self,
        indent: usize,
        inline: Option<&str>,
        line: usize,
    ) -> Result<Vec<Stmt>, ParseError> {
        match inline {
            Some(stmt) => Ok(vec![parse_simple_stmt(stmt, line)?]),
            None => self.parse_suite(indent, line),
        }
    }
}

/// Split a block header at its terminating top-level colon, returning the
/// head and the inline statement after the colon (if any).
fn split_header(text: &str, line: usize) -> Result<(&str, Option<&str>), ParseError> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => {
                    let tail = text[i + 1..].trim();
                    return Ok((&text[..i], (!tail.is_empty()).then_some(tail)));
                }
                _ => {}
            },
        }
    }
    Err(ParseError::new(line, "expected ':' after block header"))
}

fn first_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(text.len());
    &text[..end]
}

/// Parse a non-block statement: return, pass, assignment, or expression.
fn parse_simple_stmt(text: &str, line: usize) -> Result<Stmt, ParseError> {
    let text = text.trim();
    if text == "pass" {
        return Ok(Stmt::Pass);
    }
    if text == "return" {
        return Ok(Stmt::Return { value: None });
    }
    if let Some(rest) = text.strip_prefix("return ") {
        let value = parse_expr_str(rest, line)?;
        return Ok(Stmt::Return { value: Some(value) });
    }

    let tokens = tokenize(text, line)?;
    if tokens.len() >= 2 && tokens[1] == Tok::Assign {
        if let Tok::Ident(name) = &tokens[0] {
            let mut p = ExprParser {
                tokens: &tokens[2..],
                pos: 0,
                line,
            };
            let value = p.parse_expr()?;
            p.expect_end()?;
            return Ok(Stmt::Assign {
                name: name.clone(),
                value,
            });
        }
        return Err(ParseError::new(line, "invalid assignment target"));
    }

    let mut p = ExprParser {
        tokens: &tokens,
        pos: 0,
        line,
    };
    let expr = p.parse_expr()?;
    p.expect_end()?;
    Ok(Stmt::Expr(expr))
}

fn parse_expr_str(text: &str, line: usize) -> Result<Expr, ParseError> {
    let tokens = tokenize(text, line)?;
    let mut p = ExprParser {
        tokens: &tokens,
        pos: 0,
        line,
    };
    let expr = p.parse_expr()?;
    p.expect_end()?;
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    NoneLit,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    DoubleStar,
    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    LParen,
    RParen,
    Comma,
}

fn tokenize(text: &str, line: usize) -> Result<Vec<Tok>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '(' => {
                toks.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                toks.push(Tok::RParen);
                i += 1;
            }
            ',' => {
                toks.push(Tok::Comma);
                i += 1;
            }
            '+' => {
                toks.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                toks.push(Tok::Minus);
                i += 1;
            }
            '%' => {
                toks.push(Tok::Percent);
                i += 1;
            }
            '/' => {
                toks.push(Tok::Slash);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    toks.push(Tok::DoubleStar);
                    i += 2;
                } else {
                    toks.push(Tok::Star);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::EqEq);
                    i += 2;
                } else {
                    toks.push(Tok::Assign);
                    i += 1;
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Ne);
                    i += 2;
                } else {
                    return Err(ParseError::new(line, "unexpected character '!'"));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Le);
                    i += 2;
                } else {
                    toks.push(Tok::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Ge);
                    i += 2;
                } else {
                    toks.push(Tok::Gt);
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(ParseError::new(line, "unterminated string literal")),
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars
                                .get(i + 1)
                                .ok_or_else(|| ParseError::new(line, "unterminated escape"))?;
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => *other,
                            });
                            i += 2;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                toks.push(Tok::Str(s));
            }
            '0'..='9' => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        if is_float {
                            break;
                        }
                        is_float = true;
                    }
                    i += 1;
                }
                let lit: String = chars[start..i].iter().collect();
                if is_float {
                    let v = lit
                        .parse::<f64>()
                        .map_err(|_| ParseError::new(line, format!("bad number '{lit}'")))?;
                    toks.push(Tok::Float(v));
                } else {
                    let v = lit
                        .parse::<i64>()
                        .map_err(|_| ParseError::new(line, format!("bad number '{lit}'")))?;
                    toks.push(Tok::Int(v));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                toks.push(match word.as_str() {
                    "True" => Tok::True,
                    "False" => Tok::False,
                    "None" => Tok::NoneLit,
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    _ => Tok::Ident(word),
                });
            }
            other => {
                return Err(ParseError::new(
                    line,
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }
    Ok(toks)
}

struct ExprParser<'a> {
    tokens: &'a [Tok],
    pos: usize,
    line: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Tok> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(ParseError::new(self.line, "unexpected trailing tokens"))
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, message)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(&Tok::Or) {
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.eat(&Tok::And) {
            let right = self.parse_not()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Tok::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Some(Tok::EqEq) => BinOp::Eq,
            Some(Tok::Ne) => BinOp::Ne,
            Some(Tok::Lt) => BinOp::Lt,
            Some(Tok::Le) => BinOp::Le,
            Some(Tok::Gt) => BinOp::Gt,
            Some(Tok::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_additive()?;
        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Tok::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if self.eat(&Tok::DoubleStar) {
            // right-associative, binds tighter than unary on the right
            let exp = self.parse_unary()?;
            return Ok(binary(BinOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let line = self.line;
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::new(line, "unexpected end of expression"))?
            .clone();
        match tok {
            Tok::Int(v) => Ok(Expr::Int(v)),
            Tok::Float(v) => Ok(Expr::Float(v)),
            Tok::Str(s) => Ok(Expr::Str(s)),
            Tok::True => Ok(Expr::Bool(true)),
            Tok::False => Ok(Expr::Bool(false)),
            Tok::NoneLit => Ok(Expr::None),
            Tok::LParen => {
                let inner = self.parse_expr()?;
                if !self.eat(&Tok::RParen) {
                    return Err(self.err("expected ')'"));
                }
                Ok(inner)
            }
            Tok::Ident(name) => {
                if self.eat(&Tok::LParen) {
                    let mut args = Vec::new();
                    if !self.eat(&Tok::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.eat(&Tok::RParen) {
                                break;
                            }
                            if !self.eat(&Tok::Comma) {
                                return Err(self.err("expected ',' or ')' in call"));
                            }
                        }
                    }
                    return Ok(Expr::Call { name, args });
                }
                Ok(Expr::Identifier(name))
            }
            other => Err(self.err(format!("unexpected token {other:?}"))),
        }
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
