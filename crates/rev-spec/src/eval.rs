//! The driver: folds suffix operators over `(current id, current kind,
//! anchor ref)` state.

use rev_hash::ObjectId;
use rev_object::{Object, ObjectType};
use rev_ref::{RefName, RefStore};
use rev_repository::Repository;

use crate::base::{self, BaseResolution};
use crate::lexer::{self, Parsed, Token};
use crate::{ancestry, date, peel, reflog, search, treewalk, upstream};
use crate::ResolveError;

/// Read an object, mapping absence to not-found.
pub(crate) fn read_object(repo: &Repository, oid: ObjectId) -> Result<Object, ResolveError> {
    repo.odb()
        .read_cached(&oid)?
        .ok_or_else(|| ResolveError::NotFound(oid.to_hex()))
}

/// The kind of the object at `oid`, from the store.
fn kind_of(repo: &Repository, oid: ObjectId) -> Result<ObjectType, ResolveError> {
    repo.odb()
        .read_header(&oid)?
        .map(|info| info.obj_type)
        .ok_or_else(|| ResolveError::NotFound(oid.to_hex()))
}

/// Evaluation state carried across operators.
struct State {
    oid: ObjectId,
    kind: ObjectType,
    /// The ref the next reflog-ish operator is anchored to. Navigation
    /// operators and reflog lookups clear it; `@{u}` and `@{-n}` replace it.
    anchor: Option<RefName>,
    /// The ref reported through `resolve_ext` (survives reflog lookups).
    reported: Option<RefName>,
}

pub(crate) struct Evaluator<'r> {
    repo: &'r Repository,
}

impl<'r> Evaluator<'r> {
    pub(crate) fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    pub(crate) fn resolve(
        &self,
        spec: &str,
    ) -> Result<(ObjectId, Option<RefName>), ResolveError> {
        match lexer::tokenize(spec)? {
            Parsed::AllRefsSearch(pattern) => {
                let oid = search::from_all_refs(self.repo, pattern)?;
                Ok((oid, None))
            }
            Parsed::Spec { base, tokens } => self.eval(base, &tokens),
        }
    }

    fn eval(
        &self,
        base: &str,
        tokens: &[Token],
    ) -> Result<(ObjectId, Option<RefName>), ResolveError> {
        let repo = self.repo;
        let mut tokens = tokens;

        // `:<stage>:<path>` addresses the index, which is not a revision.
        if base.is_empty() {
            if let Some(Token::Path(path)) = tokens.first() {
                if looks_like_index_stage(path) {
                    return Err(ResolveError::Invalid(format!(
                        "':{}' addresses the index, not a revision",
                        path
                    )));
                }
            }
        }

        let mut state = if base.is_empty() {
            match tokens.first() {
                Some(Token::PriorCheckout(n)) => {
                    let st = self.prior_checkout_state(*n)?;
                    tokens = &tokens[1..];
                    st
                }
                Some(Token::ReflogOrdinal(_))
                | Some(Token::ReflogDate(_))
                | Some(Token::Upstream)
                | Some(Token::Path(_)) => self.head_state()?,
                _ => {
                    return Err(ResolveError::Invalid(
                        "expression has no starting point".into(),
                    ))
                }
            }
        } else {
            let BaseResolution { oid, reference } = base::resolve_base(repo, base)?;
            let kind = kind_of(repo, oid)?;
            State {
                oid,
                kind,
                anchor: reference.clone(),
                reported: reference,
            }
        };

        for token in tokens {
            self.apply(&mut state, token)?;
        }

        Ok((state.oid, state.reported))
    }

    /// Starting state for an empty Base: the branch HEAD points at (or
    /// HEAD itself when detached).
    fn head_state(&self) -> Result<State, ResolveError> {
        let repo = self.repo;
        let head = RefName::new("HEAD")?;
        let anchor = match repo.head_target()? {
            Some(branch) => branch,
            None => head,
        };
        let oid = repo
            .head_oid()?
            .ok_or_else(|| ResolveError::NotFound("HEAD".into()))?;
        let kind = kind_of(repo, oid)?;
        Ok(State {
            oid,
            kind,
            anchor: Some(anchor.clone()),
            reported: Some(anchor),
        })
    }

    /// Starting state for `@{-n}`: the branch checked out n switches ago.
    fn prior_checkout_state(&self, n: usize) -> Result<State, ResolveError> {
        let repo = self.repo;
        let branch = reflog::prior_checkout(repo, n)?;
        let oid = repo
            .refs()
            .resolve_to_oid(&branch)?
            .ok_or_else(|| ResolveError::NotFound(branch.to_string()))?;
        let kind = kind_of(repo, oid)?;
        Ok(State {
            oid,
            kind,
            anchor: Some(branch.clone()),
            reported: Some(branch),
        })
    }

    /// The current object as a commit, skipping the peel when the state
    /// already holds one.
    fn peeled_commit(&self, state: &State) -> Result<ObjectId, ResolveError> {
        if state.kind == ObjectType::Commit {
            Ok(state.oid)
        } else {
            peel::peel_to_commit(self.repo, state.oid)
        }
    }

    fn apply(&self, state: &mut State, token: &Token) -> Result<(), ResolveError> {
        let repo = self.repo;

        match token {
            Token::Parent(0) => {
                state.oid = self.peeled_commit(state)?;
                state.kind = ObjectType::Commit;
                state.anchor = None;
            }
            Token::Parent(n) => {
                let commit = self.peeled_commit(state)?;
                state.oid = ancestry::nth_parent(repo, commit, *n)?;
                state.kind = ObjectType::Commit;
                state.anchor = None;
            }
            Token::Ancestor(n) => {
                let commit = self.peeled_commit(state)?;
                state.oid = ancestry::ancestor(repo, commit, *n)?;
                state.kind = ObjectType::Commit;
                state.anchor = None;
            }
            Token::PeelUnwrap => {
                let (oid, kind) = peel::peel_to_non_tag(repo, state.oid)?;
                state.oid = oid;
                state.kind = kind;
                state.anchor = None;
            }
            Token::PeelKind(wanted) => {
                state.oid = peel::peel_to_kind(repo, state.oid, *wanted)?;
                state.kind = *wanted;
                state.anchor = None;
            }
            Token::MessageSearch(pattern) => {
                let commit = self.peeled_commit(state)?;
                state.oid = search::from_commit(repo, commit, pattern)?;
                state.kind = ObjectType::Commit;
                state.anchor = None;
            }
            Token::ReflogOrdinal(n) => {
                let anchor = state.anchor.take().ok_or_else(|| {
                    ResolveError::Invalid("'@{n}' needs a ref to read the log of".into())
                })?;
                state.oid = reflog::ordinal(repo, &anchor, *n)?;
                state.kind = kind_of(repo, state.oid)?;
                state.reported = Some(anchor);
            }
            Token::ReflogDate(body) => {
                let anchor = state.anchor.take().ok_or_else(|| {
                    ResolveError::Invalid("'@{<date>}' needs a ref to read the log of".into())
                })?;
                let clock = repo.clock();
                let at = date::parse_reflog_date(body, &clock)?;
                state.oid = reflog::at_time(repo, &anchor, at)?;
                state.kind = kind_of(repo, state.oid)?;
                state.reported = Some(anchor);
            }
            Token::Upstream => {
                let anchor = state.anchor.take().ok_or_else(|| {
                    ResolveError::Invalid("'@{upstream}' needs a branch".into())
                })?;
                // Compare against the HEAD ref itself, not its short name:
                // a branch can legally be called `refs/heads/HEAD`.
                let head = RefName::new("HEAD")?;
                let branch = if anchor == head {
                    self.repo.head_target()?.ok_or_else(|| {
                        ResolveError::Invalid("HEAD is detached, it has no upstream".into())
                    })?
                } else {
                    anchor
                };
                let up = upstream::upstream_ref(repo, &branch)?;
                state.oid = repo
                    .refs()
                    .resolve_to_oid(&up)?
                    .ok_or_else(|| ResolveError::NotFound(up.to_string()))?;
                state.kind = kind_of(repo, state.oid)?;
                state.anchor = Some(up.clone());
                state.reported = Some(up);
            }
            Token::PriorCheckout(_) => {
                return Err(ResolveError::Invalid(
                    "'@{-n}' is only valid at the start of an expression".into(),
                ));
            }
            Token::Path(path) => {
                let tree = peel::peel_to_tree(repo, state.oid)?;
                let (oid, kind) = treewalk::entry_at_path(repo, tree, path)?;
                state.oid = oid;
                state.kind = kind;
                state.anchor = None;
            }
        }

        Ok(())
    }
}

/// `:<digits>:<path>` is index-entry syntax, which is not a revision.
fn looks_like_index_stage(path: &str) -> bool {
    let digits = path.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && path.as_bytes().get(digits) == Some(&b':')
}
