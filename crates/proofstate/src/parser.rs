//! S-expression term parser with a parse cache.
//!
//! Proof-assistant terms arrive as serialized s-expressions. The parser
//! turns them into [`Ast`] values and memoizes results keyed on the raw
//! sexp string, since the same hypothesis type shows up across many states.

use std::collections::HashMap;

use crate::types::Ast;

/// Term parser with an internal sexp-string → AST cache.
pub struct TermParser {
    cache: HashMap<String, Ast>,
}

impl TermParser {
    /// Create a parser with an empty cache.
    pub fn new() -> Self {
        TermParser {
            cache: HashMap::new(),
        }
    }

    /// Parse a symbolic expression into an AST, consulting the cache first.
    ///
    /// # Errors
    /// Returns an error for empty input, unbalanced parentheses, trailing
    /// tokens, or a list whose head is not an atom.
    pub fn parse(&mut self, sexp: &str) -> anyhow::Result<Ast> {
        if let Some(ast) = self.cache.get(sexp) {
            return Ok(ast.clone());
        }
        let ast = parse_sexp(sexp)?;
        self.cache.insert(sexp.to_string(), ast.clone());
        Ok(ast)
    }

    /// Number of cached parses.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for TermParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete s-expression string.
fn parse_sexp(input: &str) -> anyhow::Result<Ast> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        anyhow::bail!("empty sexp");
    }
    let mut pos = 0;
    let ast = parse_expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        anyhow::bail!(
            "trailing tokens after sexp (consumed {pos} of {} tokens)",
            tokens.len()
        );
    }
    Ok(ast)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

fn tokenize(input: &str) -> anyhow::Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut atom = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            let escaped = chars
                                .next()
                                .ok_or_else(|| anyhow::anyhow!("dangling escape in quoted atom"))?;
                            atom.push(escaped);
                        }
                        other => atom.push(other),
                    }
                }
                if !closed {
                    anyhow::bail!("unterminated quoted atom");
                }
                tokens.push(Token::Atom(atom));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '(' || c == ')' || c == '"' || c.is_whitespace() {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(atom));
            }
        }
    }

    Ok(tokens)
}

fn parse_expr(tokens: &[Token], pos: &mut usize) -> anyhow::Result<Ast> {
    match tokens.get(*pos) {
        Some(Token::Atom(label)) => {
            *pos += 1;
            Ok(Ast::leaf(label.clone()))
        }
        Some(Token::Open) => {
            *pos += 1;
            // "()" is the empty tree.
            if tokens.get(*pos) == Some(&Token::Close) {
                *pos += 1;
                return Ok(Ast::Empty);
            }
            let label = match tokens.get(*pos) {
                Some(Token::Atom(label)) => {
                    *pos += 1;
                    label.clone()
                }
                _ => anyhow::bail!("expected constructor label at head of list"),
            };
            let mut children = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Token::Close) => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => children.push(parse_expr(tokens, pos)?),
                    None => anyhow::bail!("unbalanced parentheses: missing ')'"),
                }
            }
            Ok(Ast::node(label, children))
        }
        Some(Token::Close) => anyhow::bail!("unexpected ')'"),
        None => anyhow::bail!("unexpected end of input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atom() {
        let mut parser = TermParser::new();
        let ast = parser.parse("Var").unwrap();
        assert_eq!(ast, Ast::leaf("Var"));
    }

    #[test]
    fn test_parse_nested() {
        let mut parser = TermParser::new();
        let ast = parser
            .parse("(App (Const plus) (Var n) (Construct O))")
            .unwrap();
        assert_eq!(
            ast,
            Ast::node(
                "App",
                vec![
                    Ast::node("Const", vec![Ast::leaf("plus")]),
                    Ast::node("Var", vec![Ast::leaf("n")]),
                    Ast::node("Construct", vec![Ast::leaf("O")]),
                ]
            )
        );
        assert_eq!(ast.node_count(), 7);
    }

    #[test]
    fn test_parse_quoted_atom() {
        let mut parser = TermParser::new();
        let ast = parser.parse(r#"(Id "x y" (Str "a\"b"))"#).unwrap();
        assert_eq!(
            ast,
            Ast::node(
                "Id",
                vec![Ast::leaf("x y"), Ast::node("Str", vec![Ast::leaf("a\"b")])]
            )
        );
    }

    #[test]
    fn test_parse_empty_list() {
        let mut parser = TermParser::new();
        assert_eq!(parser.parse("()").unwrap(), Ast::Empty);
    }

    #[test]
    fn test_parse_errors() {
        let mut parser = TermParser::new();
        assert!(parser.parse("").is_err());
        assert!(parser.parse("   ").is_err());
        assert!(parser.parse("(App (Var n)").is_err());
        assert!(parser.parse("App)").is_err());
        assert!(parser.parse("((App) x)").is_err());
        assert!(parser.parse("a b").is_err());
        assert!(parser.parse("\"unterminated").is_err());
    }

    #[test]
    fn test_cache_hit_returns_same_ast() {
        let mut parser = TermParser::new();
        let first = parser.parse("(App (Var n))").unwrap();
        assert_eq!(parser.cache_len(), 1);

        let second = parser.parse("(App (Var n))").unwrap();
        assert_eq!(first, second);
        assert_eq!(parser.cache_len(), 1);

        parser.parse("(Var m)").unwrap();
        assert_eq!(parser.cache_len(), 2);
    }
}
