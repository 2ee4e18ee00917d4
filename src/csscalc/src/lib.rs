// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Parsing, type checking, folding and printing of CSS `calc()`-family
//! values.
//!
//! ```
//! let root = csscalc::parse("calc(30px - 20px)");
//! let value = csscalc::reduce_root(&root).unwrap();
//! assert_eq!(10.0, value.value);
//! assert_eq!("calc(30px - 20px)", root.to_string());
//! ```

#![forbid(unsafe_code)]

pub use csscalc_core::common;

pub mod ast;
pub mod calc_notation;
pub mod factory;
pub mod json;
mod options;
mod parser;
mod reducer;
mod resolved_type;
mod stringifier;
pub mod token;
mod unicode;

pub use self::ast::{
    Container, Function, MathExpression, MathOperator, Node, NodeId, NodeType, Parentheses, Root,
    Walk, WalkFilter,
};
pub use self::common::{Error, ErrorCode, ErrorKind, Loc, ParseError, Result};
pub use self::options::{ParseOptions, StringifyOptions};
pub use self::parser::Parser;
pub use self::reducer::{ReducedValue, reduce, reduce_root};
pub use self::resolved_type::{ResolvedType, resolved_type, type_of};
pub use self::stringifier::{Stringify, StringifyVisitor, stringify};
pub use self::token::{Token, TokenKind, Tokenizer, tokenize};

/// Parses `text` with the default options (inline comments allowed).
pub fn parse(text: &str) -> Root {
    parse_with(text, ParseOptions::default())
}

pub fn parse_with(text: &str, options: ParseOptions) -> Root {
    Parser::new(Tokenizer::new(text, options)).parse()
}
