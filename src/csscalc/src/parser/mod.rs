// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Builds a `Root` from the token stream.
//!
//! Significant tokens are pushed onto the innermost open container as
//! they arrive.  Whenever an operator or punctuator shows up, the tail
//! of the container is checked for an `expr op expr` run that binds at
//! least as tightly as the incoming operator, and any such run is folded
//! into a `MathExpression`.  At a `)`, a `,` or the end of input
//! everything foldable in the container is folded.  Nothing here fails:
//! problems are collected as `ParseError`s and the tree is built as far
//! as the input allows.

use std::collections::{HashSet, VecDeque};

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::ast::{Container, Function, Node, Parentheses, Root};
use crate::calc_notation::is_math_function;
use crate::common::{ErrorCode, Loc, ParseError};
use crate::factory;
use crate::token::{Token, TokenKind, Tokenizer};


lazy_static! {
    // a word that can't be a (signed) number might be a function name
    static ref MAYBE_FUNCTION: Regex = Regex::new(r"^([^-+0-9.]|-[^+0-9.])").unwrap();
    static ref MAYBE_MINUS: Regex = Regex::new(r"^-[0-9.]").unwrap();
}

/// A significant token plus the trivia that preceded it.
#[derive(Debug)]
struct TokenSet {
    token: Token,
    before: String,
}

enum Open {
    Root(Root),
    Function(Function),
    Parentheses(Parentheses),
}

/// A container still accepting children.
struct Frame {
    open: Open,
    // name of the innermost enclosing function; parentheses inherit it
    fn_name: String,
}

impl Frame {
    fn new(open: Open, fn_name: String) -> Self {
        Frame { open, fn_name }
    }

    fn nodes(&self) -> &[Node] {
        match &self.open {
            Open::Root(root) => root.nodes(),
            Open::Function(func) => func.nodes(),
            Open::Parentheses(parens) => parens.nodes(),
        }
    }

    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        match &mut self.open {
            Open::Root(root) => root.nodes_mut(),
            Open::Function(func) => func.nodes_mut(),
            Open::Parentheses(parens) => parens.nodes_mut(),
        }
    }

    fn push(&mut self, node: Node) {
        match &mut self.open {
            Open::Root(root) => {
                root.push(node);
            }
            Open::Function(func) => {
                func.push(node);
            }
            Open::Parentheses(parens) => {
                parens.push(node);
            }
        }
    }

    fn is_strict(&self) -> bool {
        is_math_function(&self.fn_name)
    }

    /// Finishes a nested container at its closing parenthesis.
    fn close(self, close: &Token, before_close: String) -> Option<Node> {
        let before_close = if before_close.is_empty() {
            None
        } else {
            Some(before_close)
        };
        match self.open {
            Open::Root(_) => None,
            Open::Function(mut func) => {
                func.raws.before_close = before_close;
                func.source.end = close.loc.end;
                Some(Node::Function(func))
            }
            Open::Parentheses(mut parens) => {
                parens.raws.before_close = before_close;
                parens.source.end = close.loc.end;
                Some(Node::Parentheses(parens))
            }
        }
    }

    /// Finishes a nested container the input ended inside of.
    fn close_at_eof(self) -> Option<Node> {
        let end = self.nodes().last().map(|n| n.loc().end);
        match self.open {
            Open::Root(_) => None,
            Open::Function(mut func) => {
                func.unclosed = true;
                if let Some(end) = end {
                    func.source.end = end;
                }
                Some(Node::Function(func))
            }
            Open::Parentheses(mut parens) => {
                parens.unclosed = true;
                if let Some(end) = end {
                    parens.source.end = end;
                }
                Some(Node::Parentheses(parens))
            }
        }
    }
}

/// What the main loop should do with the container stack after a token.
enum Step {
    Stay,
    Open(Frame),
    Close(Token, String),
}

pub struct Parser<'input> {
    tokenizer: Tokenizer<'input>,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
    rescans: VecDeque<TokenSet>,
    after: String,
}

impl<'input> Parser<'input> {
    pub fn new(tokenizer: Tokenizer<'input>) -> Self {
        Parser {
            tokenizer,
            tokens: vec![],
            errors: vec![],
            rescans: VecDeque::new(),
            after: String::new(),
        }
    }

    /// Consumes the whole token stream.
    pub fn parse(mut self) -> Root {
        let mut root = Frame::new(Open::Root(Root::new()), String::new());
        let mut open: Vec<Frame> = vec![];

        while let Some(set) = self.scan() {
            let nested = !open.is_empty();
            let frame = open.last_mut().unwrap_or(&mut root);
            match self.step(frame, nested, set) {
                Step::Stay => {}
                Step::Open(child) => open.push(child),
                Step::Close(close, before_close) => {
                    if let Some(node) = open.pop().and_then(|f| f.close(&close, before_close)) {
                        open.last_mut().unwrap_or(&mut root).push(node);
                    }
                }
            }
        }

        let last_end = self.tokens.last().map_or(0, |t| t.loc.end);
        while let Some(mut frame) = open.pop() {
            self.merge_all(&mut frame);
            self.report(ErrorCode::EofInBracket, last_end);
            if let Some(node) = frame.close_at_eof() {
                open.last_mut().unwrap_or(&mut root).push(node);
            }
        }
        self.merge_all(&mut root);

        let mut root = match root.open {
            Open::Root(root) => root,
            // the bottom frame is always the root
            _ => Root::new(),
        };
        root.source = Loc::new(0, last_end);
        root.raws.after = std::mem::take(&mut self.after);
        root.tokens = std::mem::take(&mut self.tokens);
        root.errors = self.collect_errors();
        root
    }

    fn collect_errors(&mut self) -> Vec<ParseError> {
        let mut errors = self.tokenizer.take_errors();
        errors.append(&mut self.errors);
        // stable, so lexical errors stay ahead of parse errors at the
        // same offset
        errors.sort_by_key(|e| e.index);
        let mut seen = HashSet::new();
        errors.retain(|e| seen.insert((e.code, e.index)));
        errors
    }

    fn report(&mut self, code: ErrorCode, index: usize) {
        if self.errors.iter().any(|e| e.code == code && e.index == index) {
            return;
        }
        debug!("parser: {} at {}", code, index);
        self.errors.push(ParseError::new(code, index));
    }

    /// The next significant token, with any trivia before it.  Every
    /// token read is recorded in order.
    fn scan(&mut self) -> Option<TokenSet> {
        if let Some(set) = self.rescans.pop_front() {
            return Some(set);
        }

        let mut before = String::new();
        while let Some(token) = self.tokenizer.next_token() {
            self.tokens.push(token.clone());
            if token.is_trivia() {
                before.push_str(&token.value);
            } else {
                return Some(TokenSet { token, before });
            }
        }
        if !before.is_empty() {
            self.after = before;
        }
        None
    }

    fn back(&mut self, set: TokenSet) {
        self.rescans.push_front(set);
    }

    fn step(&mut self, frame: &mut Frame, nested: bool, set: TokenSet) -> Step {
        let TokenSet { token, before } = set;
        match token.kind {
            TokenKind::Word => return self.word(frame, token, before),
            TokenKind::String => frame.push(factory::new_string(&token, &before)),
            TokenKind::Operator => {
                if let Some(op) = factory::new_operator(&token, &before) {
                    self.merge_tail(frame, Some(op.value.precedence()));
                    frame.push(Node::Operator(op));
                }
            }
            TokenKind::Punctuator => {
                self.merge_tail(frame, None);
                if token.value == "(" {
                    let parens = factory::new_parentheses(&token, &before);
                    let fn_name = frame.fn_name.clone();
                    return Step::Open(Frame::new(Open::Parentheses(parens), fn_name));
                }
                self.merge_all(frame);
                if token.value == ")" {
                    if nested {
                        return Step::Close(token, before);
                    }
                    self.report(ErrorCode::UnexpectedParenthesis, token.loc.start);
                }
                frame.push(factory::new_punctuator(&token, &before));
            }
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::InlineComment => {}
        }
        Step::Stay
    }

    fn word(&mut self, frame: &mut Frame, token: Token, before: String) -> Step {
        if MAYBE_FUNCTION.is_match(&token.value) {
            // a function call only if `(` follows with nothing in between
            if let Some(next) = self.scan() {
                if next.before.is_empty() && next.token.is_punctuator("(") {
                    let func = factory::new_function(&token, &before, &next.token);
                    let fn_name = func.name.clone();
                    return Step::Open(Frame::new(Open::Function(func), fn_name));
                }
                self.back(next);
            }
        } else if frame.is_strict()
            && MAYBE_MINUS.is_match(&token.value)
            && frame.nodes().last().is_some_and(Node::is_expression)
        {
            // `calc(10px -5px)` means `10px - 5px`
            let [op, rest] = self.split_sign(token, before);
            self.back(rest);
            self.back(op);
            return Step::Stay;
        }
        frame.push(factory::new_word_node(&token, &before));
        Step::Stay
    }

    /// Splits a `-10px` word into a `-` operator and a `10px` word, both
    /// in the returned token sets and in the recorded token list.
    fn split_sign(&mut self, token: Token, before: String) -> [TokenSet; 2] {
        let Loc { start, end } = token.loc;
        let op = Token::new(TokenKind::Operator, "-", Loc::new(start, start + 1));
        let rest = Token::new(TokenKind::Word, &token.value[1..], Loc::new(start + 1, end));
        if let Some(i) = self.tokens.iter().rposition(|t| t.loc == token.loc) {
            self.tokens.splice(i..=i, [op.clone(), rest.clone()]);
        }
        [
            TokenSet { token: op, before },
            TokenSet {
                token: rest,
                before: String::new(),
            },
        ]
    }

    /// Folds `left op right` at the end of the container for as long as
    /// the operator there binds at least as tightly as `precedence`
    /// (always, when `None`).
    fn merge_tail(&mut self, frame: &mut Frame, precedence: Option<u8>) {
        loop {
            let nodes = frame.nodes();
            if nodes.len() < 3 {
                return;
            }
            let tail = match &nodes[nodes.len() - 2] {
                Node::Operator(op) => op.value.precedence(),
                _ => return,
            };
            if precedence.is_some_and(|p| p > tail) || !self.merge_math(frame) {
                return;
            }
        }
    }

    /// Folds everything foldable, right to left, stopping at the first
    /// run that doesn't have the `left op right` shape.
    fn merge_all(&mut self, frame: &mut Frame) {
        while frame.nodes().len() > 1 {
            if !self.merge_math(frame) {
                return;
            }
        }
    }

    /// Tries to replace the last three children with one
    /// `MathExpression`.  On failure the children are left as they were
    /// and, inside a math function, the offending node is reported.
    fn merge_math(&mut self, frame: &mut Frame) -> bool {
        let strict = frame.is_strict();
        let nodes = frame.nodes_mut();
        if nodes.len() < 2 {
            return false;
        }
        let (Some(right), Some(op)) = (nodes.pop(), nodes.pop()) else {
            return false;
        };
        let left = nodes.pop();
        let verdict = check_merge(left.as_ref(), &op, &right, nodes.last());

        match (verdict, left, op) {
            (Ok(()), Some(left), Node::Operator(op)) => {
                trace!(
                    "merge {} {} {} in {:?}",
                    left.node_type(),
                    op.value,
                    right.node_type(),
                    frame.fn_name
                );
                let math = factory::merge(left, op, right);
                frame.push(Node::from(math));
                true
            }
            (verdict, left, op) => {
                let nodes = frame.nodes_mut();
                nodes.extend(left);
                nodes.push(op);
                nodes.push(right);
                if let (true, Err(Some(index))) = (strict, verdict) {
                    self.report(ErrorCode::UnexpectedCalcToken, index);
                }
                false
            }
        }
    }
}

/// Whether `left op right` can become a math expression.  On failure,
/// the offset of the node to blame, if any; `prev` is the node before
/// `left`.
fn check_merge(
    left: Option<&Node>,
    op: &Node,
    right: &Node,
    prev: Option<&Node>,
) -> std::result::Result<(), Option<usize>> {
    if op.is_comma() {
        // `, -` or `, +`
        return Err((!right.is_expression()).then(|| right.loc().start));
    }
    let blame = match left {
        None if op.is_expression() => right,
        None => op,
        Some(left) if !left.is_expression() => {
            if prev.is_some_and(Node::is_expression) {
                op
            } else {
                left
            }
        }
        Some(_) if !matches!(op, Node::Operator(_)) => op,
        Some(_) if !right.is_expression() => right,
        Some(_) => return Ok(()),
    };
    Err(Some(blame.loc().start))
}
