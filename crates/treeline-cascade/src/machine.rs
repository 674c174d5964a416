//! Cascade state machine
//!
//! [`CascadeRun`] holds the state of one cascade call and advances it one
//! store round-trip at a time through [`CascadeRun::step`]. It knows nothing
//! about time; the engine owns pacing and the deadline, so convergence can be
//! tested by stepping a run by hand.

use crate::claim::PendingClaim;
use crate::path::CascadePath;
use std::collections::HashSet;
use treeline_header::HeaderMatcher;
use treeline_tree::{NodeId, StoreResult, TreeStore};

/// Where the current resolution pass is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeState {
    /// Look up the root by exact title
    ResolveRoot,
    /// Find `path[level]` among `parent`'s children
    Descend {
        /// Level being resolved (≥ 1)
        level: usize,
        /// Node resolved for `level - 1` in this pass
        parent: NodeId,
    },
    /// A full pass found every level; holds the leaf id
    Converged(NodeId),
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Resolved one level; step again right away
    Advanced,
    /// A level was missing; a create was issued (or is already in flight).
    /// The next step restarts from the root
    Pending,
    /// Every level resolved in one pass
    Converged(NodeId),
}

/// One in-progress cascade
///
/// A store error leaves the run back in [`CascadeState::ResolveRoot`]; the
/// caller decides whether to keep stepping.
pub struct CascadeRun<'a> {
    store: &'a dyn TreeStore,
    path: &'a CascadePath,
    matcher: HeaderMatcher,
    state: CascadeState,
    claims: HashSet<PendingClaim>,
    last_claim: Option<PendingClaim>,
    passes: u32,
    creates: u32,
}

impl<'a> CascadeRun<'a> {
    /// Start a run at [`CascadeState::ResolveRoot`]
    #[must_use]
    pub fn new(store: &'a dyn TreeStore, path: &'a CascadePath) -> Self {
        Self {
            store,
            path,
            matcher: HeaderMatcher::new(),
            state: CascadeState::ResolveRoot,
            claims: HashSet::new(),
            last_claim: None,
            passes: 0,
            creates: 0,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &CascadeState {
        &self.state
    }

    /// Passes started so far (each visit to `ResolveRoot` starts one)
    #[inline]
    #[must_use]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Creates that reached the store successfully
    #[inline]
    #[must_use]
    pub fn creates(&self) -> u32 {
        self.creates
    }

    /// Claims currently held
    #[inline]
    pub fn claims(&self) -> impl Iterator<Item = &PendingClaim> {
        self.claims.iter()
    }

    /// Most recent claim taken, even if since released
    #[inline]
    #[must_use]
    pub fn last_claim(&self) -> Option<&PendingClaim> {
        self.last_claim.as_ref()
    }

    /// Drop back to the root for the next step
    #[inline]
    pub fn restart(&mut self) {
        self.state = CascadeState::ResolveRoot;
    }

    /// Perform one store round-trip
    ///
    /// # Errors
    /// Any store error from the lookup or create; the run is reset to
    /// `ResolveRoot` first
    pub async fn step(&mut self) -> StoreResult<StepOutcome> {
        let state = std::mem::replace(&mut self.state, CascadeState::ResolveRoot);
        let path = self.path;

        match state {
            CascadeState::ResolveRoot => {
                self.passes += 1;
                let title = path.root();
                match self.store.resolve_root_by_title(title).await? {
                    Some(root) => Ok(self.advance(0, root)),
                    None => {
                        let claim = PendingClaim::root(title);
                        self.create_once(claim, 0).await?;
                        Ok(StepOutcome::Pending)
                    }
                }
            }
            CascadeState::Descend { level, parent } => {
                let segment = &path.segments()[level];
                let children = self.store.get_children(&parent).await?;

                if let Some(found) = self.matcher.match_exact(&children, &[segment]) {
                    let id = found.id.clone();
                    return Ok(self.advance(level, id));
                }

                tracing::debug!(level, %parent, content = %segment, "cascade level missing");
                let claim = PendingClaim::child(level, parent, segment.as_str());
                self.create_once(claim, children.len()).await?;
                Ok(StepOutcome::Pending)
            }
            CascadeState::Converged(id) => {
                self.state = CascadeState::Converged(id.clone());
                Ok(StepOutcome::Converged(id))
            }
        }
    }

    fn advance(&mut self, level: usize, id: NodeId) -> StepOutcome {
        if self.path.is_leaf(level) {
            self.state = CascadeState::Converged(id.clone());
            StepOutcome::Converged(id)
        } else {
            self.state = CascadeState::Descend {
                level: level + 1,
                parent: id,
            };
            StepOutcome::Advanced
        }
    }

    /// Issue the create for `claim` unless this run already did
    ///
    /// A failed create releases the claim so a later pass retries it.
    async fn create_once(&mut self, claim: PendingClaim, order: usize) -> StoreResult<()> {
        if self.claims.contains(&claim) {
            tracing::trace!(%claim, "create already in flight, waiting for visibility");
            return Ok(());
        }

        self.claims.insert(claim.clone());
        self.last_claim = Some(claim.clone());

        let created = match &claim.parent {
            Some(parent) => self.store.create_child(parent, &claim.content, order).await,
            None => self.store.create_root(&claim.content).await,
        };

        match created {
            Ok(id) => {
                self.creates += 1;
                tracing::debug!(%claim, %id, "cascade issued create");
                Ok(())
            }
            Err(e) => {
                self.claims.remove(&claim);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for CascadeRun<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeRun")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("claims", &self.claims)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeline_test_utils::FaultyStore;
    use treeline_tree::MemoryStore;

    async fn drive(run: &mut CascadeRun<'_>) -> NodeId {
        for _ in 0..32 {
            if let StepOutcome::Converged(id) = run.step().await.unwrap() {
                return id;
            }
        }
        panic!("run did not converge: {run:?}");
    }

    #[tokio::test]
    async fn builds_missing_levels_one_pass_at_a_time() {
        let store = MemoryStore::new();
        let path = CascadePath::from_segments(["A", "B", "C"]).unwrap();
        let mut run = CascadeRun::new(&store, &path);

        assert_eq!(run.step().await.unwrap(), StepOutcome::Pending);
        assert_eq!(run.state(), &CascadeState::ResolveRoot);
        assert_eq!(run.last_claim(), Some(&PendingClaim::root("A")));
        assert_eq!(run.claims().collect::<Vec<_>>(), [&PendingClaim::root("A")]);

        let leaf = drive(&mut run).await;
        assert_eq!(run.claims().count(), 3);
        assert!(run.claims().all(|c| c.level < path.len()));

        assert_eq!(run.creates(), 3);
        assert_eq!(run.passes(), 4);
        assert_eq!(store.node(&leaf).unwrap().text, "C");
        assert_eq!(run.state(), &CascadeState::Converged(leaf));
    }

    #[tokio::test]
    async fn existing_path_converges_in_one_pass() {
        let store = MemoryStore::new();
        let root = store.create_root("A").await.unwrap();
        let b = store.create_child(&root, "**B:**", 0).await.unwrap();
        let path = CascadePath::from_segments(["A", "B"]).unwrap();
        let mut run = CascadeRun::new(&store, &path);

        assert_eq!(run.step().await.unwrap(), StepOutcome::Advanced);
        assert_eq!(run.step().await.unwrap(), StepOutcome::Converged(b));
        assert_eq!(run.creates(), 0);
        assert_eq!(run.passes(), 1);
    }

    #[tokio::test]
    async fn root_only_path() {
        let store = MemoryStore::new();
        let path = CascadePath::from_segments(["Inbox"]).unwrap();
        let mut run = CascadeRun::new(&store, &path);

        let id = drive(&mut run).await;
        assert_eq!(store.resolve_root_by_title("Inbox").await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn failed_create_releases_its_claim() {
        let store = FaultyStore::new(MemoryStore::new()).with_failing_child_creates();
        let root = store.create_root("A").await.unwrap();
        let path = CascadePath::from_segments(["A", "B"]).unwrap();
        let mut run = CascadeRun::new(&store, &path);

        assert_eq!(run.step().await.unwrap(), StepOutcome::Advanced);
        assert!(run.step().await.is_err());

        assert_eq!(run.state(), &CascadeState::ResolveRoot);
        assert_eq!(run.claims().count(), 0);
        assert_eq!(run.last_claim(), Some(&PendingClaim::child(1, root, "B")));
    }

    #[tokio::test]
    async fn restart_returns_to_root() {
        let store = MemoryStore::new();
        store.create_root("A").await.unwrap();
        let path = CascadePath::from_segments(["A", "B"]).unwrap();
        let mut run = CascadeRun::new(&store, &path);

        run.step().await.unwrap();
        assert!(matches!(run.state(), CascadeState::Descend { level: 1, .. }));

        run.restart();
        assert_eq!(run.state(), &CascadeState::ResolveRoot);
    }
}
