// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};

use crate::common::Loc;
use crate::options::StringifyOptions;
use crate::stringifier::stringify;
use crate::token::Token;

pub mod container;
pub mod math;

pub use container::{Child, Container, ContainerRaws, Function, Parentheses, Root, RootRaws};
pub use math::{MathExpression, MathLoc, MathOperator, MathRaws};

// Helper functions for serde skip_serializing_if

pub(crate) fn is_false(val: &bool) -> bool {
    !*val
}

pub(crate) fn is_empty_string(val: &str) -> bool {
    val.is_empty()
}

/// Identifies a node for the lifetime of the process.  Parents refer to
/// their children by id rather than by pointer, so a tree never holds a
/// cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Ids are unique across every tree in the process.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Number,
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
    Percentage,
    Flex,
    Word,
    String,
    MathExpression,
    Function,
    Parentheses,
    Operator,
    Punctuator,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        use NodeType::*;
        match self {
            Root => "Root",
            Number => "Number",
            Length => "Length",
            Angle => "Angle",
            Time => "Time",
            Frequency => "Frequency",
            Resolution => "Resolution",
            Percentage => "Percentage",
            Flex => "Flex",
            Word => "Word",
            String => "String",
            MathExpression => "MathExpression",
            Function => "Function",
            Parentheses => "Parentheses",
            Operator => "Operator",
            Punctuator => "Punctuator",
        }
    }

    /// Number or one of the seven dimensioned value types.
    pub fn is_numeric(&self) -> bool {
        use NodeType::*;
        matches!(
            self,
            Number | Length | Angle | Time | Frequency | Resolution | Percentage | Flex
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Raws {
    pub before: String,
}

/// Source spelling preserved next to its normalized value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawValue<T> {
    pub raw: String,
    pub value: T,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumericRaws {
    pub before: String,
    pub value: RawValue<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<RawValue<String>>,
}

/// A number, with or without a unit.  The enclosing `Node` variant says
/// which kind of value it is; `unit` is the canonical spelling and is
/// empty for plain numbers.
#[derive(Debug, Serialize)]
pub struct NumericValue {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    pub value: f64,
    #[serde(skip_serializing_if = "is_empty_string")]
    pub unit: String,
    pub raws: NumericRaws,
    pub source: Loc,
}

impl NumericValue {
    pub fn new(raw_value: &str, unit: &str, raw_unit: &str, before: &str, source: Loc) -> Self {
        let value = raw_value.parse::<f64>().unwrap_or(f64::NAN);
        let raw_unit = if unit != raw_unit {
            Some(RawValue {
                raw: raw_unit.to_owned(),
                value: unit.to_owned(),
            })
        } else {
            None
        };
        NumericValue {
            id: NodeId::fresh(),
            parent: None,
            value,
            unit: unit.to_owned(),
            raws: NumericRaws {
                before: before.to_owned(),
                value: RawValue {
                    raw: raw_value.to_owned(),
                    value,
                },
                unit: raw_unit,
            },
            source,
        }
    }
}

/// A leaf whose content is its source text: `Word`, `String` and
/// `Punctuator` nodes.
#[derive(Debug, Serialize)]
pub struct TextNode {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    pub value: String,
    pub raws: Raws,
    pub source: Loc,
}

impl TextNode {
    pub fn new(value: &str, before: &str, source: Loc) -> Self {
        TextNode {
            id: NodeId::fresh(),
            parent: None,
            value: value.to_owned(),
            raws: Raws {
                before: before.to_owned(),
            },
            source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OperatorNode {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    pub value: MathOperator,
    pub raws: Raws,
    pub source: Loc,
}

impl OperatorNode {
    pub fn new(value: MathOperator, before: &str, source: Loc) -> Self {
        OperatorNode {
            id: NodeId::fresh(),
            parent: None,
            value,
            raws: Raws {
                before: before.to_owned(),
            },
            source,
        }
    }
}

/// Anything that can sit in a container's child list or be an operand of
/// a math expression.  `Operator` and `Punctuator` are only ever found
/// in child lists, left over when they couldn't be merged into a
/// `MathExpression`.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Number(NumericValue),
    Length(NumericValue),
    Angle(NumericValue),
    Time(NumericValue),
    Frequency(NumericValue),
    Resolution(NumericValue),
    Percentage(NumericValue),
    Flex(NumericValue),
    Word(TextNode),
    String(TextNode),
    MathExpression(Box<MathExpression>),
    Function(Function),
    Parentheses(Parentheses),
    Operator(OperatorNode),
    Punctuator(TextNode),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

/// Selects which nodes a walk reports to its callback.
pub enum WalkFilter<'a> {
    Type(NodeType),
    Matching(&'a dyn Fn(NodeType) -> bool),
    All,
}

impl WalkFilter<'_> {
    fn matches(&self, ty: NodeType) -> bool {
        match self {
            WalkFilter::Type(t) => *t == ty,
            WalkFilter::Matching(pred) => pred(ty),
            WalkFilter::All => true,
        }
    }
}

impl From<NodeType> for WalkFilter<'_> {
    fn from(ty: NodeType) -> Self {
        WalkFilter::Type(ty)
    }
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Number(_) => NodeType::Number,
            Node::Length(_) => NodeType::Length,
            Node::Angle(_) => NodeType::Angle,
            Node::Time(_) => NodeType::Time,
            Node::Frequency(_) => NodeType::Frequency,
            Node::Resolution(_) => NodeType::Resolution,
            Node::Percentage(_) => NodeType::Percentage,
            Node::Flex(_) => NodeType::Flex,
            Node::Word(_) => NodeType::Word,
            Node::String(_) => NodeType::String,
            Node::MathExpression(_) => NodeType::MathExpression,
            Node::Function(_) => NodeType::Function,
            Node::Parentheses(_) => NodeType::Parentheses,
            Node::Operator(_) => NodeType::Operator,
            Node::Punctuator(_) => NodeType::Punctuator,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => n.id,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => n.id,
            Node::MathExpression(n) => n.id,
            Node::Function(n) => n.id,
            Node::Parentheses(n) => n.id,
            Node::Operator(n) => n.id,
        }
    }

    /// The container or math expression that currently owns this node.
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => n.parent,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => n.parent,
            Node::MathExpression(n) => n.parent,
            Node::Function(n) => n.parent,
            Node::Parentheses(n) => n.parent,
            Node::Operator(n) => n.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        let slot = match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => &mut n.parent,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => &mut n.parent,
            Node::MathExpression(n) => &mut n.parent,
            Node::Function(n) => &mut n.parent,
            Node::Parentheses(n) => &mut n.parent,
            Node::Operator(n) => &mut n.parent,
        };
        *slot = parent;
    }

    /// Leading whitespace and comments.
    pub fn before(&self) -> &str {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => &n.raws.before,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => &n.raws.before,
            Node::MathExpression(n) => &n.raws.before,
            Node::Function(n) => &n.raws.before,
            Node::Parentheses(n) => &n.raws.before,
            Node::Operator(n) => &n.raws.before,
        }
    }

    pub fn before_mut(&mut self) -> &mut String {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => &mut n.raws.before,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => &mut n.raws.before,
            Node::MathExpression(n) => &mut n.raws.before,
            Node::Function(n) => &mut n.raws.before,
            Node::Parentheses(n) => &mut n.raws.before,
            Node::Operator(n) => &mut n.raws.before,
        }
    }

    pub fn loc(&self) -> Loc {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => n.source,
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => n.source,
            Node::MathExpression(n) => n.source.loc(),
            Node::Function(n) => n.source,
            Node::Parentheses(n) => n.source,
            Node::Operator(n) => n.source,
        }
    }

    /// Everything but the leftover `Operator` and `Punctuator` nodes.
    pub fn is_expression(&self) -> bool {
        !matches!(self, Node::Operator(_) | Node::Punctuator(_))
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Node::Punctuator(p) if p.value == ",")
    }

    pub fn as_numeric(&self) -> Option<&NumericValue> {
        match self {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_math(&self) -> Option<&MathExpression> {
        match self {
            Node::MathExpression(math) => Some(math),
            _ => None,
        }
    }

    pub fn as_math_mut(&mut self) -> Option<&mut MathExpression> {
        match self {
            Node::MathExpression(math) => Some(math),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Node::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Visits the descendants of this node in document order: container
    /// children first, then a math expression's `left` and `right`.
    /// The node itself is not visited.
    pub fn walk<'a>(
        &'a self,
        filter: &WalkFilter,
        callback: &mut dyn FnMut(&'a Node) -> Walk,
    ) -> Walk {
        match self {
            Node::MathExpression(math) => walk_nodes([math.left(), math.right()], filter, callback),
            Node::Function(func) => walk_nodes(&func.nodes, filter, callback),
            Node::Parentheses(parens) => walk_nodes(&parens.nodes, filter, callback),
            _ => Walk::Continue,
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id() == id {
            return Some(self);
        }
        let mut found = None;
        self.walk(&WalkFilter::All, &mut |node| {
            if node.id() == id {
                found = Some(node);
                Walk::Stop
            } else {
                Walk::Continue
            }
        });
        found
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Node::MathExpression(math) => {
                let (left, right) = math.operands_mut();
                left.find_mut(id).or_else(|| right.find_mut(id))
            }
            Node::Function(func) => func.nodes.iter_mut().find_map(|n| n.find_mut(id)),
            Node::Parentheses(parens) => parens.nodes.iter_mut().find_map(|n| n.find_mut(id)),
            _ => None,
        }
    }
}

pub(crate) fn walk_nodes<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    filter: &WalkFilter,
    callback: &mut dyn FnMut(&'a Node) -> Walk,
) -> Walk {
    for child in nodes {
        if filter.matches(child.node_type()) && callback(child) == Walk::Stop {
            return Walk::Stop;
        }
        if child.walk(filter, callback) == Walk::Stop {
            return Walk::Stop;
        }
    }
    Walk::Continue
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&stringify(self, StringifyOptions::default()))
    }
}

impl From<MathExpression> for Node {
    fn from(math: MathExpression) -> Self {
        Node::MathExpression(Box::new(math))
    }
}

impl From<Function> for Node {
    fn from(func: Function) -> Self {
        Node::Function(func)
    }
}

impl From<Parentheses> for Node {
    fn from(parens: Parentheses) -> Self {
        Node::Parentheses(parens)
    }
}

impl From<OperatorNode> for Node {
    fn from(op: OperatorNode) -> Self {
        Node::Operator(op)
    }
}

/// Visitors produce a value for each node of a tree, or for a raw token.
pub trait Visitor<T> {
    fn walk(&mut self, node: &Node) -> T;
    fn walk_root(&mut self, root: &Root) -> T;
    fn walk_token(&mut self, token: &Token) -> T;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_node_ids_differ_between_trees() {
        fn ids(root: &Root) -> Vec<NodeId> {
            let mut ids = vec![root.id()];
            root.walk(&WalkFilter::All, &mut |node| {
                ids.push(node.id());
                Walk::Continue
            });
            ids
        }

        let first = parse("calc(1px + (2px * 3))");
        let second = parse("calc(1px + (2px * 3))");
        let first_ids = ids(&first);
        let second_ids = ids(&second);
        assert_eq!(first_ids.len(), second_ids.len());
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    }

    #[test]
    fn test_parents_point_at_owner() {
        let root = parse("calc(1px + (2px))");
        let func = &root.nodes[0];
        assert_eq!(Some(root.id()), func.parent());

        let Node::Function(f) = func else {
            panic!("expected function, got {func:?}");
        };
        let math = f.nodes[0].as_math().unwrap();
        assert_eq!(Some(func.id()), f.nodes[0].parent());
        assert_eq!(Some(f.nodes[0].id()), math.left().parent());
        assert_eq!(Some(f.nodes[0].id()), math.right().parent());

        let Node::Parentheses(p) = math.right() else {
            panic!("expected parentheses");
        };
        assert_eq!(Some(math.right().id()), p.nodes[0].parent());
    }

    #[test]
    fn test_walk_order_and_filters() {
        let root = parse("min(1px, calc(2em * 3), 4%)");
        let mut seen = vec![];
        root.walk(&WalkFilter::All, &mut |node| {
            seen.push(node.node_type());
            Walk::Continue
        });
        use NodeType::*;
        assert_eq!(
            vec![
                Function,
                Length,
                Punctuator,
                Function,
                MathExpression,
                Length,
                Number,
                Punctuator,
                Percentage
            ],
            seen
        );

        let mut lengths = vec![];
        root.walk(&NodeType::Length.into(), &mut |node| {
            lengths.push(node.to_string());
            Walk::Continue
        });
        assert_eq!(vec!["1px", "2em"], lengths);

        let numeric = |ty: NodeType| ty.is_numeric();
        let mut count = 0;
        root.walk(&WalkFilter::Matching(&numeric), &mut |_| {
            count += 1;
            Walk::Continue
        });
        assert_eq!(4, count);
    }

    #[test]
    fn test_walk_stops() {
        let root = parse("1px 2px 3px");
        let mut visited = 0;
        let result = root.walk(&WalkFilter::All, &mut |_| {
            visited += 1;
            if visited == 2 { Walk::Stop } else { Walk::Continue }
        });
        assert_eq!(Walk::Stop, result);
        assert_eq!(2, visited);
    }

    #[test]
    fn test_find() {
        let mut root = parse("calc(1px + var(--x))");
        let mut word_id = None;
        root.walk(&NodeType::Word.into(), &mut |node| {
            word_id = Some(node.id());
            Walk::Stop
        });
        let word_id = word_id.unwrap();
        let word = root.find(word_id).unwrap();
        assert_eq!("--x", word.to_string());

        *root.find_mut(word_id).unwrap().before_mut() = " ".to_owned();
        assert_eq!("calc(1px + var( --x))", root.to_string());
    }

    #[test]
    fn test_display() {
        let root = parse(" calc( 1px /* c */ + 2px ) ");
        assert_eq!(" calc( 1px /* c */ + 2px )", root.nodes[0].to_string());
        assert_eq!(" calc( 1px /* c */ + 2px ) ", root.to_string());
    }
}
