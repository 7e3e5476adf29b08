//! Commodore Parser - Recursive Descent over the Token Stream
//!
//! ```text
//! tree := node EOF
//! node := WORD [type-word type-params...] ( '{' node* '}' | ';' )
//! ```
//!
//! After a node name, a following word makes the node an argument and starts
//! its type declaration; anything else makes it a literal. The parser fails on
//! the first problem, with no recovery and no partial tree.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use im::Vector;
use tracing::debug;

use crate::ast::{ArgumentTypeSpec, CommandNode};
use crate::config::ParserConfig;
use crate::diagnostics::ErrorContext;
use crate::err_at;
use crate::syntax::lexer::{Lexer, Token, TokenStream};
use crate::syntax::{assert_valid_span, Span, Spanned};
use crate::types::ResolverRegistry;
use crate::CommodoreError;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a command tree from any buffered UTF-8 source with default settings.
pub fn parse<R: BufRead>(
    source: R,
    registry: &ResolverRegistry,
) -> Result<CommandNode, CommodoreError> {
    Parser::new(source, registry).parse()
}

/// Parses a command tree from in-memory text.
pub fn parse_str(text: &str, registry: &ResolverRegistry) -> Result<CommandNode, CommodoreError> {
    parse(text.as_bytes(), registry)
}

/// Parses a command tree from an unbuffered reader.
pub fn parse_reader(
    source: impl Read,
    registry: &ResolverRegistry,
) -> Result<CommandNode, CommodoreError> {
    parse(BufReader::new(source), registry)
}

/// Parses a command file; diagnostics are named after the path.
pub fn parse_file(
    path: impl AsRef<Path>,
    registry: &ResolverRegistry,
) -> Result<CommandNode, CommodoreError> {
    parse_file_with_config(path, registry, ParserConfig::default())
}

/// Like [`parse_file`] with explicit settings. The source name is replaced by
/// the path.
pub fn parse_file_with_config(
    path: impl AsRef<Path>,
    registry: &ResolverRegistry,
    config: ParserConfig,
) -> Result<CommandNode, CommodoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CommodoreError::Lex {
        message: format!("cannot open {}", path.display()),
        line: 1,
        ctx: ErrorContext::none(),
        source: Some(Box::new(e)),
    })?;
    let config = config.with_source_name(path.display().to_string());
    Parser::with_config(BufReader::new(file), registry, config).parse()
}

/// A single-use parser over one source.
pub struct Parser<'r, R> {
    lexer: Lexer<R>,
    registry: &'r ResolverRegistry,
    config: ParserConfig,
}

impl<'r, R: BufRead> Parser<'r, R> {
    pub fn new(source: R, registry: &'r ResolverRegistry) -> Self {
        Self::with_config(source, registry, ParserConfig::default())
    }

    pub fn with_config(source: R, registry: &'r ResolverRegistry, config: ParserConfig) -> Self {
        Self {
            lexer: Lexer::new(source),
            registry,
            config,
        }
    }

    /// Parses the whole source into its root node.
    ///
    /// Errors carry the source text read up to the point of failure.
    pub fn parse(mut self) -> Result<CommandNode, CommodoreError> {
        debug!(source = %self.config.source_name, "parsing command tree");
        match self.parse_tree() {
            Ok(root) => {
                debug!(
                    source = %self.config.source_name,
                    root = root.name(),
                    nodes = root.node_count(),
                    "parsed command tree"
                );
                Ok(root)
            }
            Err(err) => {
                let text = self.lexer.source_text();
                if let Some(span) = err.ctx().span {
                    assert_valid_span(span, text);
                }
                Err(err.with_source(&self.config.source_name, text))
            }
        }
    }

    // ========================================================================
    // GRAMMAR
    // ========================================================================

    fn parse_tree(&mut self) -> Result<CommandNode, CommodoreError> {
        let name = self.expect_word("root node name")?;
        if self.lexer.peek_token()?.value.is_word() {
            return Err(err_at!(
                Parse,
                name.span,
                "root command node '{}' must be a literal, not an argument",
                name.value
            )
            .with_help("remove the argument type after the root name"));
        }
        let root = self.parse_body(name, None, 1)?;
        self.expect_end()?;
        Ok(root)
    }

    fn expect_end(&mut self) -> Result<(), CommodoreError> {
        let token = self.lexer.next_token()?;
        if token.value != Token::EndOfInput {
            return Err(err_at!(
                Parse,
                token.span,
                "expected end of input after root node, found {}",
                token.value.describe()
            )
            .with_help("a command file holds exactly one root node"));
        }
        Ok(())
    }

    /// `node := WORD [type] body`
    fn parse_node(&mut self, depth: usize) -> Result<CommandNode, CommodoreError> {
        let name = self.expect_word("node name")?;

        let argument_type = if self.lexer.peek_token()?.value.is_word() {
            let type_word = self.expect_word("argument type")?;
            Some(self.registry.resolve(
                &type_word,
                &mut self.lexer,
                &self.config.default_namespace,
            )?)
        } else {
            None
        };

        self.parse_body(name, argument_type, depth)
    }

    /// `body := '{' node* '}' | ';'`
    fn parse_body(
        &mut self,
        name: Spanned<String>,
        argument_type: Option<ArgumentTypeSpec>,
        depth: usize,
    ) -> Result<CommandNode, CommodoreError> {
        if let Some(max_depth) = self.config.max_depth {
            if depth > max_depth {
                return Err(err_at!(
                    Parse,
                    name.span,
                    "nesting depth exceeds {} at node '{}'",
                    max_depth,
                    name.value
                ));
            }
        }

        let token = self.lexer.next_token()?;
        let children = match token.value {
            Token::Terminator => Vector::new(),
            Token::OpenScope => self.parse_children(&name, token.span, depth)?,
            other => {
                return Err(err_at!(
                    Parse,
                    token.span,
                    "expected '{{' or ';' to end node '{}', found {}",
                    name.value,
                    other.describe()
                ))
            }
        };

        Ok(match argument_type {
            Some(argument_type) => CommandNode::argument(name.value, argument_type, children),
            None => CommandNode::literal(name.value, children),
        })
    }

    fn parse_children(
        &mut self,
        parent: &Spanned<String>,
        open: Span,
        depth: usize,
    ) -> Result<Vector<CommandNode>, CommodoreError> {
        let mut children = Vector::new();
        let mut seen: HashMap<String, Span> = HashMap::new();

        loop {
            let next = self.lexer.peek_token()?;
            match &next.value {
                Token::CloseScope => {
                    self.lexer.next_token()?;
                    return Ok(children);
                }
                Token::EndOfInput => {
                    return Err(err_at!(
                        Parse,
                        next.span,
                        "expected '}}' to close the scope of '{}' opened at line {}, found end of input",
                        parent.value,
                        open.line
                    )
                    .with_related(open, "scope opened here"));
                }
                Token::Word(name) => {
                    let name_span = next.span;
                    if let Some(first) = seen.get(name) {
                        return Err(err_at!(
                            Parse,
                            name_span,
                            "duplicate child node '{}' under '{}'",
                            name,
                            parent.value
                        )
                        .with_related(*first, "first defined here"));
                    }
                    seen.insert(name.clone(), name_span);
                }
                Token::OpenScope | Token::Terminator => {}
            }
            children.push_back(self.parse_node(depth + 1)?);
        }
    }

    fn expect_word(&mut self, what: &str) -> Result<Spanned<String>, CommodoreError> {
        let token = self.lexer.next_token()?;
        match token.value {
            Token::Word(text) => Ok(Spanned::new(text, token.span)),
            other => Err(err_at!(
                Parse,
                token.span,
                "expected {}, found {}",
                what,
                other.describe()
            )),
        }
    }
}
