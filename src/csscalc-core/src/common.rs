// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

use serde::{Serialize, Serializer};

/// A half-open byte range `[start, end)` into the source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Loc {
    pub start: usize,
    pub end: usize,
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // lexical and syntactic problems, reported while parsing
    EofInString,
    EofInComment,
    EofInBracket,
    UnexpectedParenthesis,
    UnexpectedCalcToken,
    // misuse of the tree mutation API
    NodeNotFound,
    IllegalRoot,
    NotAnExpression,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            EofInString => "eof-in-string",
            EofInComment => "eof-in-comment",
            EofInBracket => "eof-in-bracket",
            UnexpectedParenthesis => "unexpected-parenthesis",
            UnexpectedCalcToken => "unexpected-calc-token",
            NodeNotFound => "node-not-found",
            IllegalRoot => "illegal-root",
            NotAnExpression => "not-an-expression",
        }
    }

    /// The short human readable description shown to users.
    pub fn message(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            EofInString => "Unclosed string",
            EofInComment => "Unclosed comment",
            EofInBracket => "Unclosed bracket",
            UnexpectedParenthesis | UnexpectedCalcToken => "Unexpected token",
            NodeNotFound => "The given node could not be found.",
            IllegalRoot => "The given Root node is illegal.",
            NotAnExpression => "The given node is not an expression.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A recoverable syntax problem found while tokenizing or parsing.
///
/// Field order matters: the derived `Ord` sorts by byte offset first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParseError {
    pub index: usize,
    pub code: ErrorCode,
}

impl ParseError {
    pub fn new(code: ErrorCode, index: usize) -> Self {
        ParseError { index, code }
    }

    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.code)
    }
}

impl error::Error for ParseError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Tree => "TreeError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! tree_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Tree, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Tree, ErrorCode::$code, None))
    }};
}

#[test]
fn test_error_code_display() {
    assert_eq!("eof-in-string", ErrorCode::EofInString.to_string());
    assert_eq!("eof-in-comment", ErrorCode::EofInComment.to_string());
    assert_eq!("eof-in-bracket", ErrorCode::EofInBracket.to_string());
    assert_eq!(
        "unexpected-parenthesis",
        ErrorCode::UnexpectedParenthesis.to_string()
    );
    assert_eq!(
        "unexpected-calc-token",
        ErrorCode::UnexpectedCalcToken.to_string()
    );
}

#[test]
fn test_parse_error_ordering() {
    let mut errors = vec![
        ParseError::new(ErrorCode::EofInBracket, 9),
        ParseError::new(ErrorCode::UnexpectedCalcToken, 3),
        ParseError::new(ErrorCode::EofInString, 9),
    ];
    errors.sort();
    assert_eq!(3, errors[0].index);
    assert_eq!(ErrorCode::EofInString, errors[1].code);
    assert_eq!(ErrorCode::EofInBracket, errors[2].code);
    assert_eq!("3:unexpected-calc-token", errors[0].to_string());
    assert_eq!("Unclosed bracket", errors[2].message());
}

#[test]
fn test_error_display() {
    let err = Error::new(ErrorKind::Tree, ErrorCode::NodeNotFound, None);
    assert_eq!("TreeError{node-not-found}", err.to_string());

    let err = Error::new(
        ErrorKind::Tree,
        ErrorCode::IllegalRoot,
        Some("root has 2 children".to_owned()),
    );
    assert_eq!("TreeError{illegal-root: root has 2 children}", format!("{err}"));
}

#[test]
fn test_tree_err_macro() {
    fn lookup() -> Result<()> {
        tree_err!(IllegalRoot, "root has 2 children".to_owned())
    }
    let err = lookup().unwrap_err();
    assert_eq!(ErrorCode::IllegalRoot, err.code);
    assert_eq!(Some("root has 2 children".to_owned()), err.get_details());
}

#[test]
fn test_parse_error_json() {
    let err = ParseError::new(ErrorCode::UnexpectedParenthesis, 12);
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(r#"{"index":12,"code":"unexpected-parenthesis"}"#, json);
}

#[test]
fn test_loc() {
    let a = Loc::new(2, 5);
    assert_eq!(3, a.len());
    assert!(Loc::new(7, 7).is_empty());
    assert_eq!("2:5", a.to_string());
}
