// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Value-type inference for math expressions, following the `calc()`
//! type-checking rules of CSS Values and Units.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::ast::{Function, MathExpression, MathOperator, Node, NodeType};
use crate::calc_notation::{function_arguments, is_calc, is_clamp, is_max, is_min};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Number,
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
    Percentage,
    Flex,
    /// The type depends on something we can't see, like `var()`, or an
    /// unknown unit.
    Unknown,
}

impl ResolvedType {
    /// The type of a numeric node type; `None` for everything else.
    pub fn from_node_type(ty: NodeType) -> Option<Self> {
        let ty = match ty {
            NodeType::Number => ResolvedType::Number,
            NodeType::Length => ResolvedType::Length,
            NodeType::Angle => ResolvedType::Angle,
            NodeType::Time => ResolvedType::Time,
            NodeType::Frequency => ResolvedType::Frequency,
            NodeType::Resolution => ResolvedType::Resolution,
            NodeType::Percentage => ResolvedType::Percentage,
            NodeType::Flex => ResolvedType::Flex,
            _ => return None,
        };
        Some(ty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedType::Number => "Number",
            ResolvedType::Length => "Length",
            ResolvedType::Angle => "Angle",
            ResolvedType::Time => "Time",
            ResolvedType::Frequency => "Frequency",
            ResolvedType::Resolution => "Resolution",
            ResolvedType::Percentage => "Percentage",
            ResolvedType::Flex => "Flex",
            ResolvedType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResolvedType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The type of `expr`, or `None` if the expression is invalid (e.g.
/// `10px - 20`).  An `Unknown` operand makes the whole expression
/// `Unknown` rather than invalid, except as the left side of `/`.
pub fn resolved_type(expr: &MathExpression) -> Option<ResolvedType> {
    use ResolvedType::{Number, Percentage, Unknown};

    let left = type_of(expr.left());
    let right = type_of(expr.right());

    match expr.operator() {
        MathOperator::Add | MathOperator::Sub => {
            if left == Unknown || right == Unknown {
                Some(Unknown)
            } else if left == right {
                Some(left)
            } else if left == Number || right == Number {
                None
            } else if left == Percentage {
                Some(right)
            } else if right == Percentage {
                Some(left)
            } else {
                None
            }
        }
        MathOperator::Mul => {
            if left == Unknown || right == Unknown {
                Some(Unknown)
            } else if left == Number {
                Some(right)
            } else if right == Number {
                Some(left)
            } else {
                None
            }
        }
        MathOperator::Div => match right {
            Unknown => Some(Unknown),
            Number => Some(left),
            _ => None,
        },
    }
}

/// The type of any expression node.  Invalid sub-expressions count as
/// `Unknown`.
pub fn type_of(node: &Node) -> ResolvedType {
    match node {
        Node::MathExpression(math) => resolved_type(math).unwrap_or(ResolvedType::Unknown),
        Node::Parentheses(parens) => match parens.nodes.as_slice() {
            [only] => type_of(only),
            _ => ResolvedType::Unknown,
        },
        Node::Function(func) => function_type(func),
        _ => ResolvedType::from_node_type(node.node_type()).unwrap_or(ResolvedType::Unknown),
    }
}

fn function_type(func: &Function) -> ResolvedType {
    let name = func.name.as_str();
    let arity_ok = if is_calc(name) {
        func.nodes.len() == 1
    } else if is_min(name) || is_max(name) {
        true
    } else if is_clamp(name) {
        // three arguments and two commas
        func.nodes.len() == 5
    } else {
        false
    };
    if arity_ok {
        arguments_type(func)
    } else {
        ResolvedType::Unknown
    }
}

/// Unifies the argument types.  A percentage goes along with whatever
/// the other arguments are.
fn arguments_type(func: &Function) -> ResolvedType {
    let Some(args) = function_arguments(func) else {
        return ResolvedType::Unknown;
    };
    let mut result: Option<ResolvedType> = None;
    for ty in args.into_iter().map(type_of) {
        match result {
            None | Some(ResolvedType::Percentage) => result = Some(ty),
            Some(_) if ty == ResolvedType::Percentage => {}
            Some(current) if current != ty => return ResolvedType::Unknown,
            Some(_) => {}
        }
    }
    result.unwrap_or(ResolvedType::Unknown)
}
