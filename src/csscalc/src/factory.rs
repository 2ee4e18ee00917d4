// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Builders for AST nodes, either from tokens (as the parser does) or
//! from source text (for composing trees by hand).

use csscalc_core::tree_err;
use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{
    Child, Container, Function, MathExpression, MathLoc, MathOperator, MathRaws, Node, NodeType,
    NumericValue, OperatorNode, Parentheses, TextNode,
};
use crate::common::{Loc, Result};
use crate::parse;
use crate::token::{Token, TokenKind};

const LENGTH_UNITS: &[&str] = &[
    "em", "ex", "ch", "rem", "vw", "vh", "vmin", "vmax", "px", "mm", "cm", "in", "pt", "pc", "Q",
    "vm",
];
const ANGLE_UNITS: &[&str] = &["deg", "grad", "turn", "rad"];
const TIME_UNITS: &[&str] = &["s", "ms"];
const FREQUENCY_UNITS: &[&str] = &["Hz", "kHz"];
const RESOLUTION_UNITS: &[&str] = &["dpi", "dpcm", "dppm"];
const FLEX_UNITS: &[&str] = &["fr"];
const PERCENTAGE_UNITS: &[&str] = &["%"];

const UNIT_TABLES: &[(NodeType, &[&str])] = &[
    (NodeType::Length, LENGTH_UNITS),
    (NodeType::Angle, ANGLE_UNITS),
    (NodeType::Time, TIME_UNITS),
    (NodeType::Frequency, FREQUENCY_UNITS),
    (NodeType::Resolution, RESOLUTION_UNITS),
    (NodeType::Flex, FLEX_UNITS),
    (NodeType::Percentage, PERCENTAGE_UNITS),
];

/// Splits `10.5e2px` into `("10.5e2", "px")`.  Returns `None` if `text`
/// doesn't start with a number.
pub fn split_unit(text: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref NUMBER_RE: Regex =
            Regex::new(r"^[+-]?(\d+(\.\d+)?|\.\d+)([eE][+-]?\d+)?").unwrap();
    }

    let m = NUMBER_RE.find(text)?;
    Some(text.split_at(m.end()))
}

/// The value type and canonical spelling of a unit, matched without
/// regard to case.
pub fn classify_unit(unit: &str) -> Option<(NodeType, &'static str)> {
    UNIT_TABLES.iter().find_map(|(ty, units)| {
        units
            .iter()
            .find(|u| u.eq_ignore_ascii_case(unit))
            .map(|u| (*ty, *u))
    })
}

fn numeric_node(ty: NodeType, value: NumericValue) -> Node {
    match ty {
        NodeType::Length => Node::Length(value),
        NodeType::Angle => Node::Angle(value),
        NodeType::Time => Node::Time(value),
        NodeType::Frequency => Node::Frequency(value),
        NodeType::Resolution => Node::Resolution(value),
        NodeType::Flex => Node::Flex(value),
        NodeType::Percentage => Node::Percentage(value),
        _ => Node::Number(value),
    }
}

/// A numeric node if the word is a number with an optional known unit,
/// otherwise a `Word`.
pub fn new_word_node(token: &Token, before: &str) -> Node {
    if let Some((number, unit)) = split_unit(&token.value) {
        if unit.is_empty() {
            return Node::Number(NumericValue::new(number, "", "", before, token.loc));
        }
        if let Some((ty, canonical)) = classify_unit(unit) {
            let value = NumericValue::new(number, canonical, unit, before, token.loc);
            return numeric_node(ty, value);
        }
    }
    Node::Word(TextNode::new(&token.value, before, token.loc))
}

pub fn new_string(token: &Token, before: &str) -> Node {
    Node::String(TextNode::new(&token.value, before, token.loc))
}

pub fn new_punctuator(token: &Token, before: &str) -> Node {
    Node::Punctuator(TextNode::new(&token.value, before, token.loc))
}

pub fn new_operator(token: &Token, before: &str) -> Option<OperatorNode> {
    let op = MathOperator::from_symbol(&token.value)?;
    Some(OperatorNode::new(op, before, token.loc))
}

/// A function named by `name` whose opening parenthesis is `open`.
pub fn new_function(name: &Token, before: &str, open: &Token) -> Function {
    Function::new(&name.value, before, Loc::new(name.loc.start, open.loc.end))
}

pub fn new_parentheses(open: &Token, before: &str) -> Parentheses {
    Parentheses::new(before, open.loc)
}

/// Builds the node a single significant token stands for.  Trivia has
/// no node of its own and yields `None`.
pub fn from_token(token: &Token, before: &str) -> Option<Node> {
    match token.kind {
        TokenKind::Word => Some(new_word_node(token, before)),
        TokenKind::String => Some(new_string(token, before)),
        TokenKind::Operator => new_operator(token, before).map(Node::Operator),
        TokenKind::Punctuator if token.value == "(" => {
            Some(Node::Parentheses(new_parentheses(token, before)))
        }
        TokenKind::Punctuator => Some(new_punctuator(token, before)),
        TokenKind::Whitespace | TokenKind::Comment | TokenKind::InlineComment => None,
    }
}

/// Parses `text` and returns its only top-level node, detached.  Text
/// that doesn't parse to exactly one node yields `None`.
pub fn from_text(text: &str) -> Option<Node> {
    let mut root = parse(text);
    if root.nodes().len() != 1 {
        return None;
    }
    root.remove_all().pop()
}

/// The operator of a math expression built by hand: an existing
/// `Operator` node, or just the operator, which is given a single
/// leading space.
pub enum OperatorArg {
    Symbol(MathOperator),
    Node(OperatorNode),
}

impl From<MathOperator> for OperatorArg {
    fn from(op: MathOperator) -> Self {
        OperatorArg::Symbol(op)
    }
}

impl From<OperatorNode> for OperatorArg {
    fn from(op: OperatorNode) -> Self {
        OperatorArg::Node(op)
    }
}

/// Combines two expressions.  Either operand may be a `Root` holding
/// exactly one node.  The left operand's leading trivia moves to the new
/// expression, so `" a"` and `"b"` combine to `" a + b"` rather than
/// `"  a + b"`.
pub fn new_math_expression(
    left: impl Into<Child>,
    op: impl Into<OperatorArg>,
    right: impl Into<Child>,
) -> Result<MathExpression> {
    let left = expression(left.into())?;
    let right = expression(right.into())?;
    let op = match op.into() {
        OperatorArg::Symbol(op) => OperatorNode::new(op, " ", Loc::default()),
        OperatorArg::Node(op) => op,
    };
    Ok(merge(left, op, right))
}

fn expression(child: Child) -> Result<Node> {
    let node = child.into_single()?;
    if !node.is_expression() {
        return tree_err!(
            NotAnExpression,
            format!("{} can't be an operand", node.node_type())
        );
    }
    Ok(node)
}

pub(crate) fn merge(mut left: Node, op: OperatorNode, right: Node) -> MathExpression {
    let before = std::mem::take(left.before_mut());
    let source = MathLoc {
        start: left.loc().start,
        end: right.loc().end,
        operator: op.source,
    };
    let raws = MathRaws {
        before,
        between: op.raws.before,
    };
    MathExpression::new(left, op.value, right, raws, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::options::StringifyOptions;
    use crate::stringify;
    use float_cmp::approx_eq;

    #[test]
    fn test_split_unit() {
        assert_eq!(Some(("10", "px")), split_unit("10px"));
        assert_eq!(Some(("-.5", "em")), split_unit("-.5em"));
        assert_eq!(Some(("+1.25", "")), split_unit("+1.25"));
        assert_eq!(Some(("1e3", "px")), split_unit("1e3px"));
        assert_eq!(Some(("1e-3", "s")), split_unit("1e-3s"));
        assert_eq!(Some(("1", "em")), split_unit("1em"));
        assert_eq!(Some(("1", ".")), split_unit("1."));
        assert_eq!(Some(("1", "e+")), split_unit("1e+"));
        assert_eq!(Some(("50", "%")), split_unit("50%"));
        assert_eq!(None, split_unit("px"));
        assert_eq!(None, split_unit("-px"));
        assert_eq!(None, split_unit("."));
        assert_eq!(None, split_unit(""));
    }

    #[test]
    fn test_classify_unit() {
        assert_eq!(Some((NodeType::Length, "px")), classify_unit("PX"));
        assert_eq!(Some((NodeType::Length, "Q")), classify_unit("q"));
        assert_eq!(Some((NodeType::Frequency, "kHz")), classify_unit("khz"));
        assert_eq!(Some((NodeType::Resolution, "dppm")), classify_unit("dppm"));
        assert_eq!(Some((NodeType::Flex, "fr")), classify_unit("fr"));
        assert_eq!(Some((NodeType::Percentage, "%")), classify_unit("%"));
        assert_eq!(Some((NodeType::Time, "s")), classify_unit("S"));
        assert_eq!(None, classify_unit("foo"));
    }

    fn word(value: &str) -> Token {
        Token::new(TokenKind::Word, value, Loc::new(0, value.len()))
    }

    #[test]
    fn test_word_nodes() {
        let node = new_word_node(&word("30px"), "");
        assert_eq!(NodeType::Length, node.node_type());
        let n = node.as_numeric().unwrap();
        assert!(approx_eq!(f64, 30.0, n.value));
        assert_eq!("px", n.unit);
        assert_eq!(None, n.raws.unit);

        let node = new_word_node(&word("+.50KHZ"), " ");
        assert_eq!(NodeType::Frequency, node.node_type());
        let n = node.as_numeric().unwrap();
        assert!(approx_eq!(f64, 0.5, n.value));
        assert_eq!("kHz", n.unit);
        assert_eq!("+.50", n.raws.value.raw);
        assert_eq!("KHZ", n.raws.unit.as_ref().unwrap().raw);
        assert_eq!(" +.50KHZ", node.to_string());

        let node = new_word_node(&word("12"), "");
        assert_eq!(NodeType::Number, node.node_type());
        assert_eq!("", node.as_numeric().unwrap().unit);

        assert_eq!(NodeType::Word, new_word_node(&word("10foo"), "").node_type());
        assert_eq!(NodeType::Word, new_word_node(&word("auto"), "").node_type());
    }

    #[test]
    fn test_from_token() {
        let op = Token::new(TokenKind::Operator, "*", Loc::new(3, 4));
        assert_eq!(NodeType::Operator, from_token(&op, " ").unwrap().node_type());
        let open = Token::new(TokenKind::Punctuator, "(", Loc::new(0, 1));
        assert_eq!(NodeType::Parentheses, from_token(&open, "").unwrap().node_type());
        let comma = Token::new(TokenKind::Punctuator, ",", Loc::new(0, 1));
        assert!(from_token(&comma, "").unwrap().is_comma());
        let ws = Token::new(TokenKind::Whitespace, " ", Loc::new(0, 1));
        assert!(from_token(&ws, "").is_none());
    }

    #[test]
    fn test_from_text() {
        let node = from_text("calc(1px + 2px)").unwrap();
        assert_eq!(NodeType::Function, node.node_type());
        assert_eq!(None, node.parent());
        assert!(from_text("1px 2px").is_none());
        assert!(from_text("").is_none());
    }

    fn fix(math: MathExpression) -> String {
        stringify(&Node::from(math), StringifyOptions::default().with_autofix(true))
    }

    #[test]
    fn test_new_math_expression() {
        let math = new_math_expression(parse("1"), MathOperator::Add, parse("2")).unwrap();
        assert_eq!("1 + 2", fix(math));

        let math = new_math_expression(parse(" 1"), MathOperator::Sub, parse(" 2")).unwrap();
        assert_eq!(" ", math.raws.before);
        assert_eq!("", math.left().before());
        assert_eq!(Some(math.id()), math.left().parent());
        assert_eq!(" 1 - 2", stringify(&Node::from(math), StringifyOptions::default()));

        let math =
            new_math_expression(parse("1 + 2"), MathOperator::Mul, parse("3 + 4")).unwrap();
        assert_eq!("(1 + 2) * (3 + 4)", fix(math));
        let math =
            new_math_expression(parse("1 - 2"), MathOperator::Mul, parse("3 - 4")).unwrap();
        assert_eq!("(1 - 2) * (3 - 4)", fix(math));
        let math =
            new_math_expression(parse("1 + 2"), MathOperator::Add, parse("3 - 4")).unwrap();
        assert_eq!("1 + 2 + (3 - 4)", fix(math));
        let math = new_math_expression(parse("1"), MathOperator::Add, parse("2 + 3")).unwrap();
        assert_eq!("1 + 2 + 3", fix(math));
    }

    #[test]
    fn test_new_math_expression_with_operator_node() {
        let op = OperatorNode::new(MathOperator::Div, "  ", Loc::new(4, 5));
        let math = new_math_expression(parse("8px"), op, parse(" 2")).unwrap();
        assert_eq!(Loc::new(4, 5), math.source.operator);
        assert_eq!("8px  / 2", Node::from(math).to_string());
    }

    #[test]
    fn test_new_math_expression_errors() {
        let err = new_math_expression(parse("1 2"), MathOperator::Add, parse("3")).unwrap_err();
        assert_eq!(ErrorCode::IllegalRoot, err.code);
        let err = new_math_expression(parse("1"), MathOperator::Add, parse(",")).unwrap_err();
        assert_eq!(ErrorCode::NotAnExpression, err.code);
    }
}
