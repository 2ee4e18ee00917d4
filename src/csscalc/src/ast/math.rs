// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use csscalc_core::tree_err;
use serde::{Serialize, Serializer};

use super::{Child, Node, NodeId};
use crate::common::{Loc, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl MathOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(MathOperator::Add),
            "-" => Some(MathOperator::Sub),
            "*" => Some(MathOperator::Mul),
            "/" => Some(MathOperator::Div),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Sub => "-",
            MathOperator::Mul => "*",
            MathOperator::Div => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            MathOperator::Mul | MathOperator::Div => 3,
            MathOperator::Add | MathOperator::Sub => 2,
        }
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, MathOperator::Add | MathOperator::Sub)
    }
}

impl fmt::Display for MathOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MathOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MathRaws {
    pub before: String,
    /// Trivia between the left operand and the operator.
    pub between: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MathLoc {
    pub start: usize,
    pub end: usize,
    pub operator: Loc,
}

impl MathLoc {
    pub fn loc(&self) -> Loc {
        Loc::new(self.start, self.end)
    }
}

/// `left operator right`.  Operands are always expressions, never a
/// leftover `Operator` or `Punctuator`.
#[derive(Debug, Serialize)]
pub struct MathExpression {
    #[serde(skip)]
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    left: Node,
    operator: MathOperator,
    right: Node,
    pub raws: MathRaws,
    pub source: MathLoc,
}

impl MathExpression {
    pub(crate) fn new(
        mut left: Node,
        operator: MathOperator,
        mut right: Node,
        raws: MathRaws,
        source: MathLoc,
    ) -> Self {
        let id = NodeId::fresh();
        left.set_parent(Some(id));
        right.set_parent(Some(id));
        MathExpression {
            id,
            parent: None,
            left,
            operator,
            right,
            raws,
            source,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left(&self) -> &Node {
        &self.left
    }

    pub fn right(&self) -> &Node {
        &self.right
    }

    pub fn operator(&self) -> MathOperator {
        self.operator
    }

    pub fn set_operator(&mut self, operator: MathOperator) {
        self.operator = operator;
    }

    pub(crate) fn operands_mut(&mut self) -> (&mut Node, &mut Node) {
        (&mut self.left, &mut self.right)
    }

    /// Replaces the left operand, returning the old one detached.  A
    /// `Root` is accepted if it holds exactly one node.  Afterwards the
    /// new operand's parent is this expression.
    pub fn set_left(&mut self, node: impl Into<Child>) -> Result<Node> {
        let node = self.adopt(node.into())?;
        let mut old = std::mem::replace(&mut self.left, node);
        old.set_parent(None);
        Ok(old)
    }

    /// Replaces the right operand; see `set_left`.
    pub fn set_right(&mut self, node: impl Into<Child>) -> Result<Node> {
        let node = self.adopt(node.into())?;
        let mut old = std::mem::replace(&mut self.right, node);
        old.set_parent(None);
        Ok(old)
    }

    fn adopt(&self, child: Child) -> Result<Node> {
        let mut node = child.into_single()?;
        if !node.is_expression() {
            return tree_err!(
                NotAnExpression,
                format!("{} can't be an operand", node.node_type())
            );
        }
        node.set_parent(Some(self.id));
        Ok(node)
    }

    /// Splits the expression into its detached operands.
    pub fn into_operands(self) -> (Node, Node) {
        let MathExpression {
            mut left,
            mut right,
            ..
        } = self;
        left.set_parent(None);
        right.set_parent(None);
        (left, right)
    }
}
