//! Data types for proof states: ASTs, goals, context entries, and the raw
//! JSON mirror types read from dataset files.

use serde::Deserialize;
use std::fmt;

/// Abstract syntax tree of a formal-logic term.
///
/// `Empty` is the explicit padding placeholder (no label, no children), so
/// every traversal stays total without optional trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// Placeholder produced by context padding. Contributes no graph nodes.
    Empty,
    /// A term node labeled with its nonterminal constructor.
    Node {
        /// Nonterminal label (constructor name).
        label: String,
        /// Child subterms, in order.
        children: Vec<Ast>,
    },
}

impl Ast {
    /// Build a node from a label and children.
    pub fn node(label: impl Into<String>, children: Vec<Ast>) -> Self {
        Ast::Node {
            label: label.into(),
            children,
        }
    }

    /// Build a leaf node with no children.
    pub fn leaf(label: impl Into<String>) -> Self {
        Ast::node(label, Vec::new())
    }

    /// Whether this is the padding placeholder.
    pub fn is_empty(&self) -> bool {
        matches!(self, Ast::Empty)
    }

    /// Total number of nodes in the tree. `Empty` counts as zero.
    pub fn node_count(&self) -> usize {
        match self {
            Ast::Empty => 0,
            Ast::Node { children, .. } => {
                1 + children.iter().map(Ast::node_count).sum::<usize>()
            }
        }
    }

    /// Visit every node label in postorder (children before parent).
    pub fn traverse_postorder(&self, visit: &mut impl FnMut(&str)) {
        if let Ast::Node { label, children } = self {
            for child in children {
                child.traverse_postorder(visit);
            }
            visit(label);
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Empty => write!(f, "()"),
            Ast::Node { label, children } if children.is_empty() => write!(f, "{label}"),
            Ast::Node { label, children } => {
                write!(f, "({label}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A proof obligation: the goal currently being solved.
#[derive(Debug, Clone)]
pub struct Goal {
    /// Goal identifier from the proof assistant.
    pub id: u64,
    /// Pretty-printed goal type.
    pub text: String,
    /// Parsed term AST.
    pub ast: Ast,
    /// Original symbolic expression, used as cache key and hash input.
    pub sexp: String,
}

/// One named entry of a local or global context.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    /// Hypothesis or constant identifier. Empty for padding entries.
    pub ident: String,
    /// Pretty-printed type.
    pub text: String,
    /// Parsed term AST. `Ast::Empty` for padding entries.
    pub ast: Ast,
    /// Original symbolic expression.
    pub sexp: String,
}

impl ContextEntry {
    /// The padding placeholder: empty identifier and text, empty AST.
    pub fn empty() -> Self {
        ContextEntry {
            ident: String::new(),
            text: String::new(),
            ast: Ast::Empty,
            sexp: String::new(),
        }
    }

    /// Whether this entry is a padding placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.ident.is_empty() && self.ast.is_empty()
    }
}

/// A raw proof state as serialized by the proof assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct RawState {
    /// Foreground goals with their hypotheses.
    pub fg_goals: Vec<RawGoal>,
    /// Global environment visible at this state.
    #[serde(default)]
    pub env: RawEnv,
}

/// A raw foreground goal.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGoal {
    /// Goal identifier.
    pub id: u64,
    /// Pretty-printed goal type.
    #[serde(rename = "type")]
    pub type_text: String,
    /// Symbolic expression of the goal term.
    pub sexp: String,
    /// Hypotheses in scope under this goal.
    pub hypotheses: Vec<RawHypothesis>,
}

/// A raw hypothesis. One entry may bind several identifiers
/// (`H1, H2 : nat` style), which preprocessing flattens.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHypothesis {
    /// Identifiers bound by this hypothesis.
    pub idents: Vec<String>,
    /// Pretty-printed hypothesis type.
    #[serde(rename = "type")]
    pub type_text: String,
    /// Symbolic expression of the hypothesis type.
    pub sexp: String,
}

/// The raw global environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnv {
    /// Constants available in the environment.
    #[serde(default)]
    pub constants: Vec<RawConstant>,
}

/// A raw environment constant.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConstant {
    /// Fully qualified constant name.
    pub qualid: String,
    /// Pretty-printed constant type.
    #[serde(rename = "type")]
    pub type_text: String,
    /// Symbolic expression key into the sexp cache.
    pub sexp: String,
}

/// One dataset file: a proof state plus the tactic applied at that state.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSample {
    /// The proof state before the tactic ran.
    pub state: RawState,
    /// Tactic text, e.g. `apply H2.`.
    pub tactic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        assert_eq!(Ast::Empty.node_count(), 0);
        assert_eq!(Ast::leaf("Var").node_count(), 1);

        let tree = Ast::node("App", vec![Ast::leaf("Const"), Ast::leaf("Var")]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_postorder_order() {
        let tree = Ast::node(
            "App",
            vec![Ast::node("Lambda", vec![Ast::leaf("Var")]), Ast::leaf("Const")],
        );
        let mut labels = Vec::new();
        tree.traverse_postorder(&mut |l| labels.push(l.to_string()));
        assert_eq!(labels, vec!["Var", "Lambda", "Const", "App"]);
    }

    #[test]
    fn test_placeholder_entry() {
        let empty = ContextEntry::empty();
        assert!(empty.is_placeholder());
        assert!(empty.ast.is_empty());
        assert!(empty.ident.is_empty());

        let real = ContextEntry {
            ident: "H".to_string(),
            text: "nat".to_string(),
            ast: Ast::leaf("Ind"),
            sexp: "(Ind nat)".to_string(),
        };
        assert!(!real.is_placeholder());
    }

    #[test]
    fn test_raw_state_deserialize() {
        let json = r#"{
            "fg_goals": [{
                "id": 7,
                "type": "forall n : nat, n + 0 = n",
                "sexp": "(Prod (Ind nat) (App (Const eq) (Var n)))",
                "hypotheses": [
                    {"idents": ["n", "m"], "type": "nat", "sexp": "(Ind nat)"}
                ]
            }],
            "env": {
                "constants": [
                    {"qualid": "SerTop.plus_comm", "type": "...", "sexp": "(Const plus_comm)"}
                ]
            }
        }"#;
        let state: RawState = serde_json::from_str(json).unwrap();
        assert_eq!(state.fg_goals.len(), 1);
        assert_eq!(state.fg_goals[0].id, 7);
        assert_eq!(state.fg_goals[0].hypotheses[0].idents, vec!["n", "m"]);
        assert_eq!(state.env.constants[0].qualid, "SerTop.plus_comm");
    }

    #[test]
    fn test_raw_state_env_optional() {
        let json = r#"{"fg_goals": []}"#;
        let state: RawState = serde_json::from_str(json).unwrap();
        assert!(state.fg_goals.is_empty());
        assert!(state.env.constants.is_empty());
    }

    #[test]
    fn test_ast_display() {
        let tree = Ast::node("App", vec![Ast::leaf("Const"), Ast::leaf("Var")]);
        assert_eq!(tree.to_string(), "(App Const Var)");
        assert_eq!(Ast::Empty.to_string(), "()");
    }
}
