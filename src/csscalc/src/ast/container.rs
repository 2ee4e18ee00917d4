// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use csscalc_core::tree_err;
use serde::Serialize;

use super::{Node, NodeId, Walk, WalkFilter, is_empty_string, is_false, walk_nodes};
use crate::common::{Loc, ParseError, Result};
use crate::options::StringifyOptions;
use crate::stringifier::stringify;
use crate::token::Token;

/// Something that can be inserted into a container: either a single
/// node, or a `Root` whose children are inserted in its place.
#[derive(Debug)]
pub enum Child {
    Node(Node),
    Root(Root),
}

impl Child {
    fn into_nodes(self) -> Vec<Node> {
        match self {
            Child::Node(node) => vec![node],
            Child::Root(root) => root.nodes,
        }
    }

    /// Unwraps a single-child `Root`; roots with any other number of
    /// children can't stand in for one node.
    pub(crate) fn into_single(self) -> Result<Node> {
        match self {
            Child::Node(node) => Ok(node),
            Child::Root(mut root) => {
                if root.nodes.len() == 1 {
                    Ok(root.nodes.remove(0))
                } else {
                    tree_err!(
                        IllegalRoot,
                        format!("root has {} children, expected 1", root.nodes.len())
                    )
                }
            }
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Root> for Child {
    fn from(root: Root) -> Self {
        Child::Root(root)
    }
}

/// The mutation API shared by `Root`, `Function` and `Parentheses`.
/// Every insertion makes the container the child's parent; every
/// removal clears the removed child's parent.
pub trait Container {
    fn id(&self) -> NodeId;
    fn nodes(&self) -> &[Node];
    fn nodes_mut(&mut self) -> &mut Vec<Node>;

    fn first(&self) -> Option<&Node> {
        self.nodes().first()
    }

    fn last(&self) -> Option<&Node> {
        self.nodes().last()
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes().iter().position(|n| n.id() == id)
    }

    /// Appends `child`; a `Root` is flattened into its children.
    fn push(&mut self, child: impl Into<Child>) -> &mut Self {
        let parent = self.id();
        for mut node in child.into().into_nodes() {
            node.set_parent(Some(parent));
            self.nodes_mut().push(node);
        }
        self
    }

    fn append(&mut self, child: impl Into<Child>) -> &mut Self {
        self.push(child)
    }

    /// Prepends `child`; a `Root` is flattened into its children, which
    /// keep their order.
    fn unshift(&mut self, child: impl Into<Child>) -> &mut Self {
        let parent = self.id();
        let mut nodes = child.into().into_nodes();
        for node in nodes.iter_mut() {
            node.set_parent(Some(parent));
        }
        self.nodes_mut().splice(0..0, nodes);
        self
    }

    fn prepend(&mut self, child: impl Into<Child>) -> &mut Self {
        self.unshift(child)
    }

    fn insert_before(&mut self, existing: NodeId, child: impl Into<Child>) -> Result<&mut Self> {
        let node = child.into().into_single()?;
        let index = self.index_of(existing)?;
        self.insert_at(index, node);
        Ok(self)
    }

    fn insert_after(&mut self, existing: NodeId, child: impl Into<Child>) -> Result<&mut Self> {
        let node = child.into().into_single()?;
        let index = self.index_of(existing)?;
        self.insert_at(index + 1, node);
        Ok(self)
    }

    /// Detaches and returns the child with id `existing`.
    fn remove_child(&mut self, existing: NodeId) -> Result<Node> {
        let index = self.index_of(existing)?;
        let mut node = self.nodes_mut().remove(index);
        node.set_parent(None);
        Ok(node)
    }

    fn remove_all(&mut self) -> Vec<Node> {
        let mut nodes = std::mem::take(self.nodes_mut());
        for node in nodes.iter_mut() {
            node.set_parent(None);
        }
        nodes
    }

    fn walk<'a>(&'a self, filter: &WalkFilter, callback: &mut dyn FnMut(&'a Node) -> Walk) -> Walk {
        walk_nodes(self.nodes(), filter, callback)
    }

    #[doc(hidden)]
    fn index_of(&self, existing: NodeId) -> Result<usize> {
        match self.position(existing) {
            Some(index) => Ok(index),
            None => tree_err!(NodeNotFound, format!("{} is not a child of {}", existing, self.id())),
        }
    }

    #[doc(hidden)]
    fn insert_at(&mut self, index: usize, mut node: Node) {
        node.set_parent(Some(self.id()));
        self.nodes_mut().insert(index, node);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRaws {
    pub before: String,
    /// Trivia between the last child and the closing `)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_close: Option<String>,
}

impl ContainerRaws {
    fn new(before: &str) -> Self {
        ContainerRaws {
            before: before.to_owned(),
            before_close: None,
        }
    }
}

/// `name(...)`.  `source` runs from the start of the name through the
/// closing parenthesis, or through the last child when unclosed.
#[derive(Debug, Serialize)]
pub struct Function {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "is_false")]
    pub unclosed: bool,
    pub raws: ContainerRaws,
    pub source: Loc,
}

impl Function {
    pub fn new(name: &str, before: &str, source: Loc) -> Self {
        Function {
            id: NodeId::fresh(),
            parent: None,
            name: name.to_owned(),
            nodes: vec![],
            unclosed: false,
            raws: ContainerRaws::new(before),
            source,
        }
    }
}

impl Container for Function {
    fn id(&self) -> NodeId {
        self.id
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

#[derive(Debug, Serialize)]
pub struct Parentheses {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "is_false")]
    pub unclosed: bool,
    pub raws: ContainerRaws,
    pub source: Loc,
}

impl Parentheses {
    pub fn new(before: &str, source: Loc) -> Self {
        Parentheses {
            id: NodeId::fresh(),
            parent: None,
            nodes: vec![],
            unclosed: false,
            raws: ContainerRaws::new(before),
            source,
        }
    }
}

impl Container for Parentheses {
    fn id(&self) -> NodeId {
        self.id
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RootRaws {
    /// Trivia after the last significant token.
    #[serde(skip_serializing_if = "is_empty_string")]
    pub after: String,
}

/// The result of a parse.  Besides the top-level nodes it keeps every
/// token read (trivia included) and every error found.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub struct Root {
    #[serde(skip)]
    pub(crate) id: NodeId,
    pub nodes: Vec<Node>,
    #[serde(skip)]
    pub(crate) tokens: Vec<Token>,
    #[serde(skip)]
    pub(crate) errors: Vec<ParseError>,
    pub raws: RootRaws,
    pub source: Loc,
}

impl Default for Root {
    fn default() -> Self {
        Root::new()
    }
}

impl Root {
    pub fn new() -> Self {
        Root {
            id: NodeId::fresh(),
            nodes: vec![],
            tokens: vec![],
            errors: vec![],
            raws: RootRaws::default(),
            source: Loc::default(),
        }
    }

    /// Every token of the source, in order.  Concatenating their values
    /// reproduces the input.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Syntax errors, sorted by offset with duplicates removed.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find_map(|n| n.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(|n| n.find_mut(id))
    }

    /// The owner of the node with id `id`, if it's in this tree and isn't
    /// a top-level node.
    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        let parent = self.find(id)?.parent()?;
        self.find(parent)
    }
}

impl Container for Root {
    fn id(&self) -> NodeId {
        self.id
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&stringify(self, StringifyOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::parse;

    fn ids(container: &impl Container) -> Vec<NodeId> {
        container.nodes().iter().map(|n| n.id()).collect()
    }

    #[test]
    fn test_push_flattens_roots() {
        let mut root = parse("1px");
        root.push(parse(" 2px 3px"));
        assert_eq!("1px 2px 3px", root.to_string());
        for node in root.nodes() {
            assert_eq!(Some(root.id()), node.parent());
        }

        root.append(parse(" a"));
        assert_eq!("1px 2px 3px a", root.to_string());
    }

    #[test]
    fn test_unshift_keeps_order() {
        let mut root = parse(" c");
        root.unshift(parse(" a b"));
        assert_eq!(" a b c", root.to_string());

        root.prepend(parse("z"));
        assert_eq!("z a b c", root.to_string());
        for node in root.nodes() {
            assert_eq!(Some(root.id()), node.parent());
        }
    }

    #[test]
    fn test_insert_before_after() {
        let mut root = parse("a c");
        let c = root.nodes[1].id();
        root.insert_before(c, parse(" b")).unwrap();
        assert_eq!("a b c", root.to_string());

        let a = root.nodes[0].id();
        root.insert_after(a, parse(" x")).unwrap();
        assert_eq!("a x b c", root.to_string());
        assert_eq!(Some(root.id()), root.nodes[1].parent());
    }

    #[test]
    fn test_insert_errors() {
        let mut root = parse("a c");
        let c = root.nodes[1].id();

        let err = root.insert_before(c, parse("x y")).unwrap_err();
        assert_eq!(ErrorCode::IllegalRoot, err.code);
        let err = root.insert_after(c, parse("")).unwrap_err();
        assert_eq!(ErrorCode::IllegalRoot, err.code);

        let stranger = parse("q").remove_all().pop().unwrap();
        let err = root.insert_after(stranger.id(), parse("x")).unwrap_err();
        assert_eq!(ErrorCode::NodeNotFound, err.code);
        assert_eq!(2, root.nodes().len());
    }

    #[test]
    fn test_remove() {
        let mut root = parse("a b c");
        let before = ids(&root);

        let b = root.remove_child(before[1]).unwrap();
        assert_eq!(None, b.parent());
        assert_eq!("a c", root.to_string());
        assert_eq!(
            ErrorCode::NodeNotFound,
            root.remove_child(before[1]).unwrap_err().code
        );

        let rest = root.remove_all();
        assert_eq!(2, rest.len());
        assert!(rest.iter().all(|n| n.parent().is_none()));
        assert!(root.first().is_none());
        assert!(root.last().is_none());
    }

    #[test]
    fn test_moving_between_containers() {
        let mut from = parse("calc(1px)");
        let mut to = parse("max()");
        let Node::Function(src) = &mut from.nodes[0] else {
            panic!("expected function");
        };
        let length = src.remove_all().pop().unwrap();
        let length_id = length.id();

        let Node::Function(dst) = &mut to.nodes[0] else {
            panic!("expected function");
        };
        dst.push(length);
        let dst_id = dst.id();
        assert_eq!("calc()", from.to_string());
        assert_eq!("max(1px)", to.to_string());
        assert_eq!(Some(dst_id), to.find(length_id).unwrap().parent());
        assert_eq!(dst_id, to.parent_of(length_id).unwrap().id());
    }

    #[test]
    fn test_first_last() {
        let root = parse("a b c");
        assert_eq!("a", root.first().unwrap().to_string());
        assert_eq!(" c", root.last().unwrap().to_string());
    }
}
