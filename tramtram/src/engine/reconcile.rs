//! Message reconciliation.
//!
//! Each cycle the engine computes the set of views a user should see
//! (dashboards in trip order, then stop queries in creation order) and
//! diffs it against the tracked outbound messages: matching view keys are
//! edited in place (skipped when the content hash is unchanged), missing
//! views are created, and tracked messages with no surviving view are
//! deleted. Planning is pure; `execute` applies the plan and rebuilds the
//! tracked-message list from what actually succeeded.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::domain::{StopQuery, ViewKey};
use crate::provider::Snapshot;
use crate::store::{OutboundMessage, UserState};
use crate::transport::{Affordance, ChatId, MessageId, Transport, TransportError};

use super::render;

/// Stable hash of rendered content (FNV-1a 64). `DefaultHasher` is not
/// guaranteed stable across runs, and hashes are persisted.
pub(crate) fn content_hash(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// One view the user should currently see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DesiredView {
    pub key: ViewKey,
    pub text: String,
    pub affordance: Option<Affordance>,
}

/// One planned transport operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MessageOp {
    Create {
        key: ViewKey,
        text: String,
        affordance: Option<Affordance>,
    },
    Edit {
        id: MessageId,
        key: ViewKey,
        text: String,
        affordance: Option<Affordance>,
        old_hash: Option<u64>,
    },
    Keep {
        id: MessageId,
        key: ViewKey,
        hash: u64,
    },
    Delete {
        id: MessageId,
    },
}

/// Render every view the state calls for, in stable order: dashboards in
/// configuration order, then stop queries in creation order.
pub(crate) fn desired_views(
    state: &UserState,
    snapshot: &Snapshot,
    now: DateTime<FixedOffset>,
) -> Vec<DesiredView> {
    let mut views = Vec::with_capacity(state.trips.len() + state.queries.len());
    for trip in &state.trips {
        views.push(DesiredView {
            key: ViewKey::Dashboard {
                trip: trip.name.clone(),
            },
            text: render::render_dashboard(trip, snapshot, now),
            affordance: None,
        });
    }
    let mut queries: Vec<&StopQuery> = state.queries.iter().collect();
    queries.sort_by_key(|q| q.created_at);
    for query in queries {
        views.push(DesiredView {
            key: query.key(),
            text: render::render_stop_query(query, snapshot, now),
            affordance: Some(Affordance::DismissQuery {
                stop: query.stop.clone(),
                created_at: query.created_at,
            }),
        });
    }
    views
}

/// Diff desired views against tracked messages. Creates, edits, and keeps
/// come out in desired order; deletes for orphaned messages follow.
pub(crate) fn plan(desired: Vec<DesiredView>, existing: &[OutboundMessage]) -> Vec<MessageOp> {
    let mut by_key: HashMap<&ViewKey, &OutboundMessage> = HashMap::new();
    for msg in existing {
        // First tracked message per key wins; duplicates get deleted below.
        by_key.entry(&msg.view).or_insert(msg);
    }

    let mut consumed: HashSet<MessageId> = HashSet::new();
    let mut ops = Vec::new();
    for view in desired {
        match by_key.get(&view.key).filter(|m| !consumed.contains(&m.id)) {
            Some(msg) => {
                consumed.insert(msg.id);
                let hash = content_hash(&view.text);
                if msg.hash == Some(hash) {
                    ops.push(MessageOp::Keep {
                        id: msg.id,
                        key: view.key,
                        hash,
                    });
                } else {
                    ops.push(MessageOp::Edit {
                        id: msg.id,
                        key: view.key,
                        text: view.text,
                        affordance: view.affordance,
                        old_hash: msg.hash,
                    });
                }
            }
            None => ops.push(MessageOp::Create {
                key: view.key,
                text: view.text,
                affordance: view.affordance,
            }),
        }
    }
    for msg in existing {
        if !consumed.contains(&msg.id) {
            ops.push(MessageOp::Delete { id: msg.id });
        }
    }
    ops
}

/// Apply a plan and rebuild `state.messages` from the outcome. Returns the
/// number of transport operations issued (keeps are free).
///
/// Failure handling per operation:
/// - create failed: nothing tracked, the view is recreated next cycle;
/// - edit rejected (`NotFound`/API): the id is stale, drop it so next cycle
///   recreates the view;
/// - edit `NotModified`: content already matches, track the new hash;
/// - edit transient (HTTP): keep the id with the old hash so the edit is
///   retried next cycle;
/// - delete failed: drop the id regardless, there is nothing to retry.
pub(crate) async fn execute<T: Transport>(
    transport: &T,
    chat: ChatId,
    state: &mut UserState,
    ops: Vec<MessageOp>,
) -> usize {
    let mut issued = 0;
    let mut messages = Vec::new();
    for op in ops {
        match op {
            MessageOp::Keep { id, key, hash } => messages.push(OutboundMessage {
                id,
                view: key,
                hash: Some(hash),
            }),
            MessageOp::Create {
                key,
                text,
                affordance,
            } => {
                issued += 1;
                match transport.create(chat, &text, affordance.as_ref()).await {
                    Ok(id) => messages.push(OutboundMessage {
                        id,
                        view: key,
                        hash: Some(content_hash(&text)),
                    }),
                    Err(e) => warn!(%chat, error = %e, "message create failed"),
                }
            }
            MessageOp::Edit {
                id,
                key,
                text,
                affordance,
                old_hash,
            } => {
                issued += 1;
                match transport.edit(chat, id, &text, affordance.as_ref()).await {
                    Ok(()) | Err(TransportError::NotModified) => {
                        messages.push(OutboundMessage {
                            id,
                            view: key,
                            hash: Some(content_hash(&text)),
                        });
                    }
                    Err(e) if e.is_rejection() => {
                        debug!(%chat, %id, error = %e, "dropping stale message id");
                    }
                    Err(e) => {
                        warn!(%chat, %id, error = %e, "message edit failed; will retry");
                        messages.push(OutboundMessage {
                            id,
                            view: key,
                            hash: old_hash,
                        });
                    }
                }
            }
            MessageOp::Delete { id } => {
                issued += 1;
                if let Err(e) = transport.delete(chat, id).await {
                    debug!(%chat, %id, error = %e, "message delete failed");
                }
            }
        }
    }
    state.messages = messages;
    issued
}

/// One full reconciliation pass for one user: expire stale queries, render,
/// plan, apply. Returns the number of transport operations issued.
pub(crate) async fn run<T: Transport>(
    transport: &T,
    chat: ChatId,
    state: &mut UserState,
    snapshot: &Snapshot,
    now: DateTime<FixedOffset>,
) -> usize {
    let now_ts = now.timestamp();
    state.queries.retain(|q| !q.is_expired(now_ts));
    let desired = desired_views(state, snapshot, now);
    let ops = plan(desired, &state.messages);
    execute(transport, chat, state, ops).await
}
