// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Byte classification for the tokenizer. Every character with meaning
//! to calc() is ASCII, so the tokenizer works on bytes and anything
//! outside ASCII is just part of a word.

pub const TAB: u8 = 0x09;
pub const LF: u8 = 0x0a;
pub const FF: u8 = 0x0c;
pub const CR: u8 = 0x0d;
pub const SPACE: u8 = 0x20;
pub const DQUOTE: u8 = b'"';
pub const SQUOTE: u8 = b'\'';
pub const LPAREN: u8 = b'(';
pub const RPAREN: u8 = b')';
pub const STAR: u8 = b'*';
pub const PLUS: u8 = b'+';
pub const COMMA: u8 = b',';
pub const MINUS: u8 = b'-';
pub const DOT: u8 = b'.';
pub const SLASH: u8 = b'/';
pub const LBRACKET: u8 = b'[';
pub const BACKSLASH: u8 = b'\\';
pub const RBRACKET: u8 = b']';
pub const LBRACE: u8 = b'{';
pub const RBRACE: u8 = b'}';

pub fn is_whitespace(c: u8) -> bool {
    matches!(c, TAB | LF | FF | CR | SPACE)
}

pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

pub fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_quote(c: u8) -> bool {
    c == DQUOTE || c == SQUOTE
}

pub fn is_punctuator(c: u8) -> bool {
    matches!(c, LPAREN | RPAREN | COMMA)
}

pub fn is_sign(c: u8) -> bool {
    c == PLUS || c == MINUS
}

/// A digit or a `.`, i.e. something a number can begin with once any
/// sign has been consumed.
pub fn maybe_number(c: u8) -> bool {
    is_digit(c) || c == DOT
}

/// The closing bracket for an opening one, or `None` if `c` doesn't
/// open a bracket.
pub fn closing_bracket(c: u8) -> Option<u8> {
    match c {
        LPAREN => Some(RPAREN),
        LBRACKET => Some(RBRACKET),
        LBRACE => Some(RBRACE),
        _ => None,
    }
}
