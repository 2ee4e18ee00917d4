// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat `//` up to the end of the line as a comment. SCSS and LESS
    /// allow this; plain CSS does not.
    pub allow_inline_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allow_inline_comments: true,
        }
    }
}

impl ParseOptions {
    pub fn with_inline_comments(mut self, allow: bool) -> Self {
        self.allow_inline_comments = allow;
        self
    }

    /// Options appropriate for a source file with the given extension
    /// (with or without the leading dot).
    pub fn for_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        ParseOptions {
            allow_inline_comments: ext == "scss" || ext == "less",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Close unclosed brackets, pad operators and add any parentheses
    /// needed to keep the printed text parsing back to the same tree.
    pub autofix: bool,
}

impl StringifyOptions {
    pub fn with_autofix(mut self, autofix: bool) -> Self {
        self.autofix = autofix;
        self
    }
}

#[test]
fn test_defaults() {
    assert!(ParseOptions::default().allow_inline_comments);
    assert!(!StringifyOptions::default().autofix);
    assert!(StringifyOptions::default().with_autofix(true).autofix);
    assert!(
        !ParseOptions::default()
            .with_inline_comments(false)
            .allow_inline_comments
    );
}

#[test]
fn test_for_extension() {
    assert!(ParseOptions::for_extension("scss").allow_inline_comments);
    assert!(ParseOptions::for_extension(".LESS").allow_inline_comments);
    assert!(!ParseOptions::for_extension("css").allow_inline_comments);
    assert!(!ParseOptions::for_extension("").allow_inline_comments);
}
