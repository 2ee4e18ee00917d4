// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Turns trees (and tokens) back into text.  By default the output is
//! byte-for-byte the parsed input.  With `autofix`, unclosed brackets
//! are closed and math expressions get the spacing and parentheses they
//! need to read back as the same tree, which matters for trees built or
//! rearranged through the mutation API.

use crate::ast::{Function, MathExpression, MathOperator, Node, NumericValue, Parentheses, Root, Visitor};
use crate::options::StringifyOptions;
use crate::token::Token;

pub struct StringifyVisitor {
    options: StringifyOptions,
}

impl StringifyVisitor {
    pub fn new(options: StringifyOptions) -> Self {
        StringifyVisitor { options }
    }

    fn numeric(&self, n: &NumericValue) -> String {
        let unit = match &n.raws.unit {
            Some(raw) => raw.raw.as_str(),
            None => n.unit.as_str(),
        };
        format!("{}{}{}", n.raws.before, n.raws.value.raw, unit)
    }

    fn container(
        &mut self,
        before: &str,
        name: &str,
        nodes: &[Node],
        before_close: Option<&str>,
        unclosed: bool,
    ) -> String {
        let mut s = format!("{before}{name}(");
        for node in nodes {
            s.push_str(&self.walk(node));
        }
        s.push_str(before_close.unwrap_or_default());
        if self.options.autofix || !unclosed {
            s.push(')');
        }
        s
    }

    fn function(&mut self, func: &Function) -> String {
        self.container(
            &func.raws.before,
            &func.name,
            &func.nodes,
            func.raws.before_close.as_deref(),
            func.unclosed,
        )
    }

    fn parentheses(&mut self, parens: &Parentheses) -> String {
        self.container(
            &parens.raws.before,
            "",
            &parens.nodes,
            parens.raws.before_close.as_deref(),
            parens.unclosed,
        )
    }

    fn math(&mut self, math: &MathExpression) -> String {
        let mut before_left = "";
        let mut between = math.raws.between.clone();
        let mut before_right = String::new();
        let mut after_right = "";

        if self.options.autofix {
            let op = math.operator();
            if between.is_empty() {
                between.push(' ');
            }
            if math.right().before().is_empty() {
                before_right.push(' ');
            }
            // (X + Y) * Z
            if let Some(left) = math.left().as_math() {
                if left.operator().is_additive() && !op.is_additive() {
                    before_left = "(";
                    between.insert(0, ')');
                }
            }
            // X + (Y - Z), X - (Y + Z), X * (Y - Z), X / (Y * Z)
            if let Some(right) = math.right().as_math() {
                let wrap = match op {
                    MathOperator::Add => right.operator() == MathOperator::Sub,
                    MathOperator::Sub | MathOperator::Mul => right.operator().is_additive(),
                    MathOperator::Div => true,
                };
                if wrap {
                    before_right.push('(');
                    after_right = ")";
                }
            }
        }

        let left = self.walk(math.left());
        let right = self.walk(math.right());
        format!(
            "{}{before_left}{left}{between}{}{before_right}{right}{after_right}",
            math.raws.before,
            math.operator(),
        )
    }
}

impl Visitor<String> for StringifyVisitor {
    fn walk(&mut self, node: &Node) -> String {
        match node {
            Node::Number(n)
            | Node::Length(n)
            | Node::Angle(n)
            | Node::Time(n)
            | Node::Frequency(n)
            | Node::Resolution(n)
            | Node::Percentage(n)
            | Node::Flex(n) => self.numeric(n),
            Node::Word(n) | Node::String(n) | Node::Punctuator(n) => {
                format!("{}{}", n.raws.before, n.value)
            }
            Node::Operator(op) => format!("{}{}", op.raws.before, op.value),
            Node::MathExpression(math) => self.math(math),
            Node::Function(func) => self.function(func),
            Node::Parentheses(parens) => self.parentheses(parens),
        }
    }

    fn walk_root(&mut self, root: &Root) -> String {
        let mut s: String = root.nodes.iter().map(|node| self.walk(node)).collect();
        s.push_str(&root.raws.after);
        s
    }

    fn walk_token(&mut self, token: &Token) -> String {
        token.value.clone()
    }
}

/// Anything that prints.
pub trait Stringify {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String;
}

impl Stringify for Node {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.walk(self)
    }
}

impl Stringify for Root {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.walk_root(self)
    }
}

impl Stringify for Token {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.walk_token(self)
    }
}

impl Stringify for MathExpression {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.math(self)
    }
}

impl Stringify for Function {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.function(self)
    }
}

impl Stringify for Parentheses {
    fn accept(&self, visitor: &mut StringifyVisitor) -> String {
        visitor.parentheses(self)
    }
}

pub fn stringify<T: Stringify + ?Sized>(node: &T, options: StringifyOptions) -> String {
    node.accept(&mut StringifyVisitor::new(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Container, MathOperator};
    use crate::factory::new_math_expression;
    use crate::parse;

    fn autofix() -> StringifyOptions {
        StringifyOptions::default().with_autofix(true)
    }

    #[test]
    fn test_round_trip() {
        let inputs = [
            "30px",
            "calc(1px+2px)",
            " calc( 1PX  *  +.5 ) /* tail */ ",
            "-webkit-calc(100% - (2 * 10em))",
            "min(1px,2px , 3%) max(1e3s)",
            "url('a b') \"c\"",
            "calc(10px",
            "calc((1 + 2",
            "1px) +",
            "clamp(1rem, 2.5vw + 1KHZ, 3rem)",
            "calc(10px -5px)",
            "foo({a, b} [c])",
            "a // comment\n b",
        ];
        for input in inputs {
            let root = parse(input);
            assert_eq!(input, stringify(&root, StringifyOptions::default()));
        }
    }

    #[test]
    fn test_autofix_closes_brackets() {
        assert_eq!("calc(10px)", stringify(&parse("calc(10px"), autofix()));
        assert_eq!("calc((1 + 2))", stringify(&parse("calc((1 + 2"), autofix()));
        // trailing trivia belongs to the root, so it follows the `)`
        assert_eq!("calc(1px) ", stringify(&parse("calc(1px "), autofix()));
    }

    #[test]
    fn test_autofix_spacing() {
        assert_eq!("1 + 2", stringify(&parse("1+2"), autofix()));
        assert_eq!("calc(1px * 2)", stringify(&parse("calc(1px*2)"), autofix()));
        // existing trivia is kept
        assert_eq!("1  -  2", stringify(&parse("1  -  2"), autofix()));
    }

    #[test]
    fn test_autofix_parenthesizes() {
        let cases = [
            ("1 + 2", MathOperator::Mul, "3 + 4", "(1 + 2) * (3 + 4)"),
            ("1 - 2", MathOperator::Div, "3", "(1 - 2) / 3"),
            ("1", MathOperator::Sub, "2 + 3", "1 - (2 + 3)"),
            ("1", MathOperator::Sub, "2 - 3", "1 - (2 - 3)"),
            ("1", MathOperator::Add, "2 - 3", "1 + (2 - 3)"),
            ("1", MathOperator::Add, "2 + 3", "1 + 2 + 3"),
            ("1", MathOperator::Div, "2 * 3", "1 / (2 * 3)"),
            ("1", MathOperator::Div, "2 / 3", "1 / (2 / 3)"),
            ("1 * 2", MathOperator::Mul, "3 * 4", "1 * 2 * 3 * 4"),
            ("1 * 2", MathOperator::Add, "3", "1 * 2 + 3"),
        ];
        for (left, op, right, expected) in cases {
            let math = new_math_expression(parse(left), op, parse(right)).unwrap();
            assert_eq!(expected, stringify(&math, autofix()), "{left} {op} {right}");
        }
    }

    #[test]
    fn test_without_autofix_rebuilt_trees_print_as_is() {
        let math = new_math_expression(parse("1 + 2"), MathOperator::Mul, parse(" 3")).unwrap();
        assert_eq!("1 + 2 * 3", stringify(&math, StringifyOptions::default()));
    }

    #[test]
    fn test_containers_and_tokens() {
        let root = parse(" min( 1px ,2px )");
        let Node::Function(func) = &root.nodes[0] else {
            panic!("expected a function");
        };
        assert_eq!(" min( 1px ,2px )", stringify(func, StringifyOptions::default()));
        let tokens: String = root
            .tokens()
            .iter()
            .map(|t| stringify(t, StringifyOptions::default()))
            .collect();
        assert_eq!(" min( 1px ,2px )", tokens);

        let mut root = parse("(1)");
        let Some(Node::Parentheses(parens)) = root.remove_all().pop() else {
            panic!("expected parentheses");
        };
        assert_eq!("(1)", stringify(&parens, StringifyOptions::default()));
    }
}
