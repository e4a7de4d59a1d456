//! Proof-state preprocessing: raw states into goals and contexts, fixed
//! length padding, and content hashing.

use sha1::{Digest, Sha1};

use crate::cache::SexpCache;
use crate::parser::TermParser;
use crate::types::{ContextEntry, Goal, RawState};

/// Global contexts are normalized to exactly this many entries.
pub const GLOBAL_CONTEXT_LEN: usize = 10;

/// Local contexts are normalized to exactly this many entries.
pub const LOCAL_CONTEXT_LEN: usize = 50;

/// Qualified-name prefix of constants defined in the current session.
pub const SESSION_PREFIX: &str = "SerTop";

/// Convert a raw state's foreground goals into parsed goals with their
/// local contexts.
///
/// Hypotheses binding several identifiers are flattened into one context
/// entry per identifier, sharing the hypothesis type and AST. Returns the
/// goal list and the parallel per-goal context list.
pub fn process_local_env(
    parser: &mut TermParser,
    state: &RawState,
) -> anyhow::Result<(Vec<Goal>, Vec<Vec<ContextEntry>>)> {
    let mut goals = Vec::with_capacity(state.fg_goals.len());
    let mut local_contexts = Vec::with_capacity(state.fg_goals.len());

    for g in &state.fg_goals {
        let goal = Goal {
            id: g.id,
            text: g.type_text.clone(),
            ast: parser.parse(&g.sexp)?,
            sexp: g.sexp.clone(),
        };

        let mut local_context = Vec::new();
        for h in &g.hypotheses {
            for ident in &h.idents {
                local_context.push(ContextEntry {
                    ident: ident.clone(),
                    text: h.type_text.clone(),
                    ast: parser.parse(&h.sexp)?,
                    sexp: h.sexp.clone(),
                });
            }
        }

        goals.push(goal);
        local_contexts.push(local_context);
    }

    Ok((goals, local_contexts))
}

/// Extract the session-local slice of the global environment.
///
/// Keeps constants whose qualified name starts with `prefix`, takes the
/// last [`GLOBAL_CONTEXT_LEN`] of them, resolves each constant's sexp key
/// through the cache, parses the cached term, and pads to exactly
/// [`GLOBAL_CONTEXT_LEN`] entries.
///
/// # Errors
/// Fails if a constant's sexp key is missing from the cache or the cached
/// term does not parse.
pub fn process_global_context(
    parser: &mut TermParser,
    cache: &SexpCache,
    state: &RawState,
    prefix: &str,
) -> anyhow::Result<Vec<ContextEntry>> {
    let toplevel: Vec<_> = state
        .env
        .constants
        .iter()
        .filter(|c| c.qualid.starts_with(prefix))
        .collect();

    let start = toplevel.len().saturating_sub(GLOBAL_CONTEXT_LEN);
    let mut global_context = Vec::with_capacity(GLOBAL_CONTEXT_LEN);

    for constant in &toplevel[start..] {
        let term = cache.get(&constant.sexp).ok_or_else(|| {
            anyhow::anyhow!("sexp cache has no entry for constant {}", constant.qualid)
        })?;
        global_context.push(ContextEntry {
            ident: constant.qualid.clone(),
            text: constant.type_text.clone(),
            ast: parser.parse(term)?,
            sexp: constant.sexp.clone(),
        });
    }

    Ok(pad_global_context(global_context))
}

/// Normalize a global context to exactly [`GLOBAL_CONTEXT_LEN`] entries.
pub fn pad_global_context(context: Vec<ContextEntry>) -> Vec<ContextEntry> {
    pad_context(context, GLOBAL_CONTEXT_LEN)
}

/// Normalize a local context to exactly [`LOCAL_CONTEXT_LEN`] entries.
pub fn pad_local_context(context: Vec<ContextEntry>) -> Vec<ContextEntry> {
    pad_context(context, LOCAL_CONTEXT_LEN)
}

/// Truncate to the first `len` entries, or extend with placeholders.
fn pad_context(mut context: Vec<ContextEntry>, len: usize) -> Vec<ContextEntry> {
    if context.len() > len {
        context.truncate(len);
        return context;
    }
    while context.len() < len {
        context.push(ContextEntry::empty());
    }
    context
}

/// Content hash identifying a proof state.
///
/// SHA-1 over the goal's sexp followed by every local-context sexp in
/// order. Identical content always yields the same hex digest.
pub fn state_id(goal: &Goal, local_context: &[ContextEntry]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(goal.sexp.as_bytes());
    for entry in local_context {
        hasher.update(entry.sexp.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
