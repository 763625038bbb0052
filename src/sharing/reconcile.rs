use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repository as users;
use crate::diary::repository as diaries;
use crate::error::{AppError, AppResult};
use crate::sharing::{models::ReconcileReport, repository};

/// Usernames to grant and to revoke, each in ascending order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SharePlan {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

pub fn desired_set<S: AsRef<str>>(usernames: &[S]) -> BTreeSet<String> {
    usernames
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn plan(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> SharePlan {
    SharePlan {
        add: desired.difference(current).cloned().collect(),
        remove: current.difference(desired).cloned().collect(),
    }
}

/// Makes the entry shared with exactly `usernames`.
///
/// Unknown usernames are skipped and reported; the count only includes calls
/// that actually changed the relation.
pub async fn reconcile<S: AsRef<str>>(
    db: &PgPool,
    caller: Uuid,
    entry_id: Uuid,
    usernames: &[S],
) -> AppResult<ReconcileReport> {
    let mut tx = db.begin().await?;

    let entry = diaries::find_by_id_for_update(&mut *tx, entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Diary entry not found".into()))?;

    if !entry.is_owned_by(caller) {
        tracing::warn!(entry_id = %entry_id, caller = %caller, "Share refused - caller is not the owner");
        return Err(AppError::Forbidden("You can only share diaries you own".into()));
    }

    let current_users = repository::list_shared_users(&mut *tx, entry_id).await?;
    let current: BTreeSet<String> = current_users.iter().map(|u| u.username.clone()).collect();
    let SharePlan { add, remove } = plan(&current, &desired_set(usernames));

    let mut report = ReconcileReport::default();

    for username in add {
        let Some(user) = users::find_by_username(&mut *tx, &username).await? else {
            tracing::warn!(entry_id = %entry_id, username = %username, "Share target not found");
            report.unresolved.push(username);
            continue;
        };
        if repository::share(&mut *tx, &entry, user.id).await? {
            report.changes += 1;
        }
    }

    for username in remove {
        let Some(user) = current_users.iter().find(|u| u.username == username) else {
            continue;
        };
        if repository::unshare(&mut *tx, &entry, user.id).await? {
            report.changes += 1;
        }
    }

    tx.commit().await?;

    tracing::info!(
        entry_id   = %entry_id,
        owner      = %caller,
        changes    = report.changes,
        unresolved = report.unresolved.len(),
        "Diary sharing reconciled"
    );

    Ok(report)
}
