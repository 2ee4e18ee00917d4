// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Recognizing the math functions from CSS Values 4 (`calc()`, `min()`,
//! `max()`, `clamp()`) and their vendor-prefixed spellings.

use crate::ast::{Function, Node};

const VENDOR_PREFIXES: &[&str] = &["", "-webkit-", "-moz-"];

fn is_named(name: &str, base: &str) -> bool {
    let name = name.to_ascii_lowercase();
    VENDOR_PREFIXES
        .iter()
        .any(|prefix| name.strip_prefix(prefix) == Some(base))
}

pub fn is_calc(name: &str) -> bool {
    is_named(name, "calc")
}

pub fn is_min(name: &str) -> bool {
    is_named(name, "min")
}

pub fn is_max(name: &str) -> bool {
    is_named(name, "max")
}

pub fn is_clamp(name: &str) -> bool {
    is_named(name, "clamp")
}

/// Math functions get the strict calc() grammar: stray operators and
/// operands inside them are reported as errors.
pub fn is_math_function(name: &str) -> bool {
    is_calc(name) || is_clamp(name) || is_min(name) || is_max(name)
}

/// The comma separated arguments of `func`, or `None` if its children
/// don't strictly alternate `arg , arg , ... arg`.
pub fn function_arguments(func: &Function) -> Option<Vec<&Node>> {
    let mut nodes = func.nodes.iter();
    let first = nodes.next()?;
    if first.is_comma() {
        return None;
    }
    let mut args = vec![first];
    while let Some(comma) = nodes.next() {
        if !comma.is_comma() {
            return None;
        }
        match nodes.next() {
            Some(arg) if !arg.is_comma() => args.push(arg),
            _ => return None,
        }
    }
    Some(args)
}
