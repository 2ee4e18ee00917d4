// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use csscalc::json::to_document;
use csscalc::{
    Node, ParseOptions, ParseError, Root, StringifyOptions, parse_with, reduce_root,
    resolved_type, stringify, tokenize, type_of,
};

#[derive(Parser, Debug)]
#[command(name = "csscalc", version)]
#[command(about = "Inspect, check and reformat CSS calc() values")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream as JSON
    Tokens(Input),
    /// Print the tree, tokens and errors as JSON
    Ast {
        #[command(flatten)]
        input: Input,
        /// Leave out raw spellings and source spans
        #[arg(long)]
        simple: bool,
    },
    /// Parse and print the value back out
    Stringify {
        #[command(flatten)]
        input: Input,
        /// Close brackets and add spacing and parentheses where needed
        #[arg(long)]
        autofix: bool,
    },
    /// Fold the value to a single number, if possible
    Reduce(Input),
    /// Print the CSS type the value resolves to
    Type(Input),
}

#[derive(Args, Debug)]
struct Input {
    /// The value to read; reads stdin if neither this nor --file is given
    value: Option<String>,
    /// Read the value from a file.  `.scss` and `.less` files allow `//`
    /// comments
    #[arg(short, long, conflicts_with = "value")]
    file: Option<PathBuf>,
    /// Treat `//` to the end of the line as a comment
    #[arg(long, overrides_with = "no_inline_comments")]
    inline_comments: bool,
    #[arg(long, overrides_with = "inline_comments")]
    no_inline_comments: bool,
}

impl Input {
    fn options(&self) -> ParseOptions {
        let options = match &self.file {
            Some(path) => options_for_path(path),
            None => ParseOptions::default(),
        };
        if self.inline_comments {
            options.with_inline_comments(true)
        } else if self.no_inline_comments {
            options.with_inline_comments(false)
        } else {
            options
        }
    }

    fn read(&self) -> Result<(String, String)> {
        if let Some(value) = &self.value {
            return Ok(("<arg>".to_owned(), value.clone()));
        }
        if let Some(path) = &self.file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok((path.display().to_string(), text));
        }
        let text = io::read_to_string(io::stdin()).context("reading stdin")?;
        Ok(("<stdin>".to_owned(), text))
    }
}

fn options_for_path(path: &Path) -> ParseOptions {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    ParseOptions::for_extension(ext)
}

fn report(name: &str, errors: &[ParseError]) {
    for err in errors {
        eprintln!("{}:{}: {} ({})", name, err.index, err.message(), err.code);
    }
}

fn parse_input(input: &Input) -> Result<(String, Root)> {
    let (name, text) = input.read()?;
    let options = input.options();
    debug!(
        "parsing {} ({} bytes, inline comments {})",
        name,
        text.len(),
        options.allow_inline_comments
    );
    let root = parse_with(&text, options);
    info!("{}: {} nodes, {} errors", name, root.nodes.len(), root.errors().len());
    report(&name, root.errors());
    Ok((name, root))
}

/// The type of a value holding a single expression.  Anything else,
/// including an empty value, is `Unknown`.
fn describe_type(root: &Root) -> &'static str {
    match root.nodes.as_slice() {
        [Node::MathExpression(math)] => resolved_type(math).map_or("invalid", |ty| ty.as_str()),
        [node] => type_of(node).as_str(),
        _ => "Unknown",
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Tokens(input) => {
            let (name, text) = input.read()?;
            let (tokens, errors) = tokenize(&text, input.options());
            report(&name, &errors);
            writeln!(out, "{}", serde_json::to_string_pretty(&tokens)?)?;
        }
        Command::Ast { input, simple } => {
            let (_, root) = parse_input(&input)?;
            let doc = to_document(&root, simple)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        }
        Command::Stringify { input, autofix } => {
            let (_, root) = parse_input(&input)?;
            let options = StringifyOptions::default().with_autofix(autofix);
            write!(out, "{}", stringify(&root, options))?;
        }
        Command::Reduce(input) => {
            let (_, root) = parse_input(&input)?;
            let reduced = reduce_root(&root);
            writeln!(out, "{}", serde_json::to_string(&reduced)?)?;
        }
        Command::Type(input) => {
            let (_, root) = parse_input(&input)?;
            writeln!(out, "{}", describe_type(&root))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)?;
    out.flush()?;
    Ok(())
}
