// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Constant folding.  Only arithmetic whose result is certain is
//! folded: `1px + 1em` is left alone rather than guessed at.

use serde::Serialize;

use crate::ast::{Container, MathExpression, MathOperator, Node, Root};
use crate::calc_notation::{function_arguments, is_calc};
use crate::resolved_type::ResolvedType;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReducedValue {
    #[serde(rename = "type")]
    pub ty: ResolvedType,
    pub value: f64,
    /// Canonical unit; empty for a plain number.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
}

impl ReducedValue {
    fn number(value: f64) -> Self {
        ReducedValue {
            ty: ResolvedType::Number,
            value,
            unit: String::new(),
        }
    }

    fn with_value(&self, value: f64) -> Self {
        ReducedValue {
            ty: self.ty,
            value,
            unit: self.unit.clone(),
        }
    }

    fn is_number(&self) -> bool {
        self.ty == ResolvedType::Number
    }
}

/// Folds `node` down to a single value, or `None` if it can't be done
/// without knowing more than the tree says.
pub fn reduce(node: &Node) -> Option<ReducedValue> {
    match node {
        Node::MathExpression(math) => reduce_math(math),
        Node::Parentheses(parens) => reduce_single(parens.nodes()),
        Node::Function(func) if is_calc(&func.name) => match function_arguments(func)?.as_slice() {
            [arg] => reduce(arg),
            _ => None,
        },
        _ => {
            let numeric = node.as_numeric()?;
            let ty = ResolvedType::from_node_type(node.node_type())?;
            Some(ReducedValue {
                ty,
                value: numeric.value,
                unit: numeric.unit.clone(),
            })
        }
    }
}

/// Folds a root holding exactly one node.
pub fn reduce_root(root: &Root) -> Option<ReducedValue> {
    reduce_single(root.nodes())
}

fn reduce_single(nodes: &[Node]) -> Option<ReducedValue> {
    match nodes {
        [only] => reduce(only),
        _ => None,
    }
}

fn reduce_math(math: &MathExpression) -> Option<ReducedValue> {
    let left = reduce(math.left())?;
    let right = reduce(math.right())?;
    fold(math.operator(), &left, &right).filter(|value| value.value.is_finite())
}

fn fold(op: MathOperator, left: &ReducedValue, right: &ReducedValue) -> Option<ReducedValue> {
    match op {
        MathOperator::Add => add_sub(left, right, |l, r| l + r),
        MathOperator::Sub => add_sub(left, right, |l, r| l - r),
        MathOperator::Div => {
            if !right.is_number() || right.value == 0.0 {
                return None;
            }
            Some(left.with_value(left.value / right.value))
        }
        MathOperator::Mul => {
            if left.is_number() {
                Some(right.with_value(left.value * right.value))
            } else if right.is_number() {
                Some(left.with_value(left.value * right.value))
            } else {
                None
            }
        }
    }
}

fn add_sub(
    left: &ReducedValue,
    right: &ReducedValue,
    op: impl Fn(f64, f64) -> f64,
) -> Option<ReducedValue> {
    if left.ty != right.ty {
        return None;
    }
    if left.is_number() {
        return Some(ReducedValue::number(op(left.value, right.value)));
    }
    if left.unit != right.unit {
        return None;
    }
    Some(left.with_value(op(left.value, right.value)))
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::parse;

    fn reduced(input: &str) -> Option<ReducedValue> {
        reduce_root(&parse(input))
    }

    fn assert_reduces(input: &str, ty: ResolvedType, value: f64, unit: &str) {
        let actual = reduced(input).unwrap_or_else(|| panic!("{input} didn't reduce"));
        assert_eq!(ty, actual.ty, "{input}");
        assert!(
            approx_eq!(f64, value, actual.value, ulps = 4),
            "{input}: expected {value}, got {}",
            actual.value
        );
        assert_eq!(unit, actual.unit, "{input}");
    }

    #[test]
    fn test_leaves() {
        assert_reduces("30px", ResolvedType::Length, 30.0, "px");
        assert_reduces("30%", ResolvedType::Percentage, 30.0, "%");
        assert_reduces("30em", ResolvedType::Length, 30.0, "em");
        assert_reduces("-1.5", ResolvedType::Number, -1.5, "");
        assert_eq!(None, reduced("auto"));
        assert_eq!(None, reduced("'a'"));
    }

    #[test]
    fn test_arithmetic() {
        assert_reduces("calc(30px - 20px)", ResolvedType::Length, 10.0, "px");
        assert_reduces(
            "calc(calc(270px - 60px) * 3)",
            ResolvedType::Length,
            630.0,
            "px",
        );
        assert_reduces("270px - 60px * 3", ResolvedType::Length, 90.0, "px");
        assert_reduces("(270px - 60px) * 3", ResolvedType::Length, 630.0, "px");
        assert_reduces("3 * 2s", ResolvedType::Time, 6.0, "s");
        assert_reduces("calc(10deg / 4)", ResolvedType::Angle, 2.5, "deg");
        assert_reduces("1 + 2 * 3", ResolvedType::Number, 7.0, "");
        assert_reduces("10 / 4", ResolvedType::Number, 2.5, "");
        assert_reduces("10% + 5%", ResolvedType::Percentage, 15.0, "%");
    }

    #[test]
    fn test_irreducible() {
        assert_eq!(None, reduced("calc(30% - 60px)"));
        assert_eq!(None, reduced("calc(30em - 60px)"));
        assert_eq!(None, reduced("calc(10px / 2px)"));
        assert_eq!(None, reduced("calc(10px * 2px)"));
        assert_eq!(None, reduced("calc(10px + 2)"));
        assert_eq!(None, reduced("calc(10px / 0)"));
        assert_eq!(None, reduced("calc(1 / (2 - 2))"));
        assert_eq!(None, reduced("calc(1e308 * 10)"));
        assert_eq!(None, reduced("calc(10px + var(--x))"));
        // only calc() itself is folded
        assert_eq!(None, reduced("min(10px, 20px)"));
        assert_eq!(None, reduced("calc(1px, 2px)"));
        assert_eq!(None, reduced("1px 2px"));
        assert_eq!(None, reduced(""));
    }

    #[test]
    fn test_units_are_canonical() {
        // `PX` is normalized to `px` at parse time
        assert_reduces("calc(1PX + 2px)", ResolvedType::Length, 3.0, "px");
    }

    #[test]
    fn test_serialize() {
        let value = reduced("calc(30px - 20px)").unwrap();
        assert_eq!(
            serde_json::json!({"type": "Length", "value": 10.0, "unit": "px"}),
            serde_json::to_value(&value).unwrap()
        );
        let value = reduced("2 * 3").unwrap();
        assert_eq!(
            serde_json::json!({"type": "Number", "value": 6.0}),
            serde_json::to_value(&value).unwrap()
        );
    }
}
