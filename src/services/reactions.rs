/// Reaction ledger: the like/dislike state machine per (user, post) pair
///
/// Each operation runs in a single transaction spanning the interaction row
/// change and the post counter update. The pair row is read FOR UPDATE, and
/// the UNIQUE (user_id, post_id) constraint backstops concurrent first
/// reactions: a violation surfaces as "already reacted", never as a 500.
use crate::db::{interaction_repo, post_repo, user_repo};
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::Reaction;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOp {
    Like,
    Unlike,
    Dislike,
    Undislike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowChange {
    Insert(Reaction),
    Update(Reaction),
    Delete,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CounterChange {
    Increment,
    /// Decrement floored at zero for this single step.
    DecrementFloored,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransitionPlan {
    pub row: RowChange,
    pub likes: CounterChange,
    pub unlikes: CounterChange,
}

/// Decide what a reaction operation does given the pair's current state.
///
/// Repeating the current reaction is rejected. Removing a reaction that is
/// not present still decrements the (floored) counter and leaves any
/// opposite-reaction row untouched; that asymmetry is inherited behavior and
/// is covered by tests rather than "fixed" here.
pub(crate) fn plan_transition(op: ReactionOp, current: Option<Reaction>) -> Result<TransitionPlan> {
    let plan = match (op, current) {
        (ReactionOp::Like, None) => TransitionPlan {
            row: RowChange::Insert(Reaction::Like),
            likes: CounterChange::Increment,
            unlikes: CounterChange::Keep,
        },
        (ReactionOp::Like, Some(Reaction::Like)) => {
            return Err(AppError::Conflict("already liked".to_string()))
        }
        (ReactionOp::Like, Some(Reaction::Dislike)) => TransitionPlan {
            row: RowChange::Update(Reaction::Like),
            likes: CounterChange::Increment,
            unlikes: CounterChange::DecrementFloored,
        },
        (ReactionOp::Unlike, Some(Reaction::Like)) => TransitionPlan {
            row: RowChange::Delete,
            likes: CounterChange::DecrementFloored,
            unlikes: CounterChange::Keep,
        },
        (ReactionOp::Unlike, _) => TransitionPlan {
            row: RowChange::Keep,
            likes: CounterChange::DecrementFloored,
            unlikes: CounterChange::Keep,
        },
        (ReactionOp::Dislike, None) => TransitionPlan {
            row: RowChange::Insert(Reaction::Dislike),
            likes: CounterChange::Keep,
            unlikes: CounterChange::Increment,
        },
        (ReactionOp::Dislike, Some(Reaction::Dislike)) => {
            return Err(AppError::Conflict("already disliked".to_string()))
        }
        (ReactionOp::Dislike, Some(Reaction::Like)) => TransitionPlan {
            row: RowChange::Update(Reaction::Dislike),
            likes: CounterChange::DecrementFloored,
            unlikes: CounterChange::Increment,
        },
        (ReactionOp::Undislike, Some(Reaction::Dislike)) => TransitionPlan {
            row: RowChange::Delete,
            likes: CounterChange::Keep,
            unlikes: CounterChange::DecrementFloored,
        },
        (ReactionOp::Undislike, _) => TransitionPlan {
            row: RowChange::Keep,
            likes: CounterChange::Keep,
            unlikes: CounterChange::DecrementFloored,
        },
    };

    Ok(plan)
}

#[derive(Clone)]
pub struct ReactionService {
    pool: PgPool,
}

impl ReactionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply(user_id, post_id, ReactionOp::Like).await
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply(user_id, post_id, ReactionOp::Unlike).await
    }

    pub async fn dislike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply(user_id, post_id, ReactionOp::Dislike).await
    }

    pub async fn undislike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply(user_id, post_id, ReactionOp::Undislike).await
    }

    async fn apply(&self, user_id: Uuid, post_id: Uuid, op: ReactionOp) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if post_repo::find_post_on(&mut *tx, post_id).await?.is_none() {
            return Err(AppError::NotFound("post not found".to_string()));
        }
        if !user_repo::exists(&mut *tx, user_id).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        let current =
            interaction_repo::find_by_pair_for_update(&mut *tx, user_id, post_id).await?;
        let plan = plan_transition(op, current.as_ref().map(|i| i.reaction))?;

        match (plan.row, &current) {
            (RowChange::Insert(reaction), _) => {
                if let Err(e) = interaction_repo::insert(&mut *tx, user_id, post_id, reaction).await
                {
                    if is_unique_violation(&e) {
                        return Err(AppError::Conflict("already reacted".to_string()));
                    }
                    return Err(e.into());
                }
            }
            (RowChange::Update(reaction), Some(row)) => {
                interaction_repo::set_reaction(&mut *tx, row.id, reaction).await?;
            }
            (RowChange::Delete, Some(row)) => {
                interaction_repo::delete(&mut *tx, row.id).await?;
            }
            (RowChange::Keep, _) => {}
            (RowChange::Update(_) | RowChange::Delete, None) => {
                // plan_transition never yields these without a current row
                return Err(AppError::Internal(
                    "interaction row vanished mid-transaction".to_string(),
                ));
            }
        }

        match plan.likes {
            CounterChange::Increment => post_repo::increment_likes(&mut *tx, post_id).await?,
            CounterChange::DecrementFloored => {
                post_repo::decrement_likes(&mut *tx, post_id).await?
            }
            CounterChange::Keep => {}
        }

        match plan.unlikes {
            CounterChange::Increment => post_repo::increment_unlikes(&mut *tx, post_id).await?,
            CounterChange::DecrementFloored => {
                post_repo::decrement_unlikes(&mut *tx, post_id).await?
            }
            CounterChange::Keep => {}
        }

        tx.commit().await?;

        tracing::debug!(%user_id, %post_id, ?op, "reaction applied");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(op: ReactionOp, current: Option<Reaction>) -> TransitionPlan {
        plan_transition(op, current).expect("transition should be valid")
    }

    #[test]
    fn like_from_none_inserts_and_increments() {
        let p = plan(ReactionOp::Like, None);
        assert_eq!(p.row, RowChange::Insert(Reaction::Like));
        assert_eq!(p.likes, CounterChange::Increment);
        assert_eq!(p.unlikes, CounterChange::Keep);
    }

    #[test]
    fn like_twice_is_rejected() {
        let err = plan_transition(ReactionOp::Like, Some(Reaction::Like))
            .expect_err("repeat like should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn like_from_dislike_swaps_both_counters() {
        let p = plan(ReactionOp::Like, Some(Reaction::Dislike));
        assert_eq!(p.row, RowChange::Update(Reaction::Like));
        assert_eq!(p.likes, CounterChange::Increment);
        assert_eq!(p.unlikes, CounterChange::DecrementFloored);
    }

    #[test]
    fn unlike_from_like_deletes_row() {
        let p = plan(ReactionOp::Unlike, Some(Reaction::Like));
        assert_eq!(p.row, RowChange::Delete);
        assert_eq!(p.likes, CounterChange::DecrementFloored);
        assert_eq!(p.unlikes, CounterChange::Keep);
    }

    #[test]
    fn unlike_without_like_still_decrements_but_keeps_rows() {
        // Inherited behavior: the counter moves even though no Like row exists.
        let p = plan(ReactionOp::Unlike, None);
        assert_eq!(p.row, RowChange::Keep);
        assert_eq!(p.likes, CounterChange::DecrementFloored);
        assert_eq!(p.unlikes, CounterChange::Keep);

        let p = plan(ReactionOp::Unlike, Some(Reaction::Dislike));
        assert_eq!(p.row, RowChange::Keep);
        assert_eq!(p.likes, CounterChange::DecrementFloored);
        assert_eq!(p.unlikes, CounterChange::Keep);
    }

    #[test]
    fn dislike_from_none_inserts_and_increments() {
        let p = plan(ReactionOp::Dislike, None);
        assert_eq!(p.row, RowChange::Insert(Reaction::Dislike));
        assert_eq!(p.likes, CounterChange::Keep);
        assert_eq!(p.unlikes, CounterChange::Increment);
    }

    #[test]
    fn dislike_twice_is_rejected() {
        let err = plan_transition(ReactionOp::Dislike, Some(Reaction::Dislike))
            .expect_err("repeat dislike should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn dislike_from_like_swaps_both_counters() {
        let p = plan(ReactionOp::Dislike, Some(Reaction::Like));
        assert_eq!(p.row, RowChange::Update(Reaction::Dislike));
        assert_eq!(p.likes, CounterChange::DecrementFloored);
        assert_eq!(p.unlikes, CounterChange::Increment);
    }

    #[test]
    fn undislike_from_dislike_deletes_row() {
        let p = plan(ReactionOp::Undislike, Some(Reaction::Dislike));
        assert_eq!(p.row, RowChange::Delete);
        assert_eq!(p.likes, CounterChange::Keep);
        assert_eq!(p.unlikes, CounterChange::DecrementFloored);
    }

    #[test]
    fn undislike_without_dislike_still_decrements_but_keeps_rows() {
        let p = plan(ReactionOp::Undislike, None);
        assert_eq!(p.row, RowChange::Keep);
        assert_eq!(p.likes, CounterChange::Keep);
        assert_eq!(p.unlikes, CounterChange::DecrementFloored);

        let p = plan(ReactionOp::Undislike, Some(Reaction::Like));
        assert_eq!(p.row, RowChange::Keep);
        assert_eq!(p.likes, CounterChange::Keep);
        assert_eq!(p.unlikes, CounterChange::DecrementFloored);
    }

    #[test]
    fn toggles_never_touch_the_opposite_row() {
        // No valid plan both deletes a row and inserts another: a pair holds
        // at most one row through any transition.
        for op in [
            ReactionOp::Like,
            ReactionOp::Unlike,
            ReactionOp::Dislike,
            ReactionOp::Undislike,
        ] {
            for current in [None, Some(Reaction::Like), Some(Reaction::Dislike)] {
                if let Ok(p) = plan_transition(op, current) {
                    if matches!(p.row, RowChange::Insert(_)) {
                        assert!(current.is_none());
                    }
                }
            }
        }
    }
}
