// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON views of trees and tokens.
//!
//! Nodes serialize as objects tagged with `"type"`, e.g.
//! `{"type": "Length", "value": 10.0, "unit": "px", "raws": {..}, "source": {..}}`.
//! Parent links, and the token and error lists of a `Root`, are left
//! out.  The "simple" form also drops `raws` and `source`, leaving only
//! what a node means rather than how it was spelled.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ast::Root;

const LAYOUT_KEYS: [&str; 2] = ["raws", "source"];

pub fn to_value<T: Serialize + ?Sized>(node: &T) -> serde_json::Result<Value> {
    serde_json::to_value(node)
}

pub fn to_simple_value<T: Serialize + ?Sized>(node: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(node)?;
    strip_keys(&mut value, &LAYOUT_KEYS);
    Ok(value)
}

/// The tree together with its tokens and errors:
/// `{"ast": .., "tokens": [..], "errors": [..]}`.
pub fn to_document(root: &Root, simple: bool) -> serde_json::Result<Value> {
    let ast = if simple {
        to_simple_value(root)?
    } else {
        to_value(root)?
    };
    let mut doc = Map::new();
    doc.insert("ast".to_owned(), ast);
    doc.insert("tokens".to_owned(), serde_json::to_value(root.tokens())?);
    doc.insert("errors".to_owned(), serde_json::to_value(root.errors())?);
    Ok(Value::Object(doc))
}

fn strip_keys(value: &mut Value, keys: &[&str]) {
    match value {
        Value::Object(map) => {
            for key in keys {
                map.remove(*key);
            }
            for child in map.values_mut() {
                strip_keys(child, keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_keys(item, keys);
            }
        }
        _ => {}
    }
}
