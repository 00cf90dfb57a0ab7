use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set,
    ActiveValue::NotSet,
};

use crate::{
    entity::{
        EntityKind,
        admin_log_entries::{ActionFlag, ActiveModel, Column, Entity as AdminLogEntries},
    },
    error::AppResult,
    models::AdminLogEntry,
    state::AppState,
};

const MAX_REPR_LENGTH: usize = 200;

pub async fn log_action<C: ConnectionTrait>(
    db: &C,
    flag: ActionFlag,
    entity_kind: EntityKind,
    object_id: Option<i32>,
    object_repr: &str,
    change_message: &str,
) -> AppResult<()> {
    ActiveModel {
        id: NotSet,
        action_time: NotSet,
        action_flag: Set(flag),
        entity_kind: Set(entity_kind),
        object_id: Set(object_id),
        object_repr: Set(object_repr.chars().take(MAX_REPR_LENGTH).collect()),
        change_message: Set(change_message.to_owned()),
    }
    .insert(db)
    .await?;

    Ok(())
}

/// Writes a log entry after a committed change. A failure here never undoes the
/// change; it is only reported.
pub async fn record(
    state: &AppState,
    flag: ActionFlag,
    entity_kind: EntityKind,
    object_id: Option<i32>,
    object_repr: &str,
    change_message: &str,
) {
    if let Err(err) = log_action(
        &state.orm,
        flag,
        entity_kind,
        object_id,
        object_repr,
        change_message,
    )
    .await
    {
        tracing::warn!(error = %err, entity = %entity_kind, ?object_id, "admin log failed");
    }
}

pub async fn recent_actions(state: &AppState, limit: u64) -> AppResult<Vec<AdminLogEntry>> {
    let entries = AdminLogEntries::find()
        .order_by_desc(Column::ActionTime)
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AdminLogEntry::from)
        .collect();
    Ok(entries)
}
