//! The placement editor session for one site.
//!
//! Every gesture is applied to the local snapshot first and then sent to the
//! store. Each operation moves `Pending -> Committed | Failed`; a failed
//! operation restores the last committed snapshot. Only one operation may be
//! in flight at a time, a second gesture is rejected with
//! [`EditorError::Busy`].
//!
//! Undo and redo only move the local snapshot. The difference to the store
//! is pushed by [`PlacementEditor::save`], and before any further edit, so
//! the store never falls behind what the editor shows.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use edusite_core::layout::SidebarPosition;
use edusite_core::types::DbId;
use edusite_core::widget_config::merge_config;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::catalog::EditorCatalog;
use crate::config::EditorConfig;
use crate::drag::{drop_eligibility, DragPayload, Eligibility};
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::snapshot::{PlacedWidget, Snapshot};
use crate::store::{WidgetPatch, WidgetStore};

// ---------------------------------------------------------------------------
// Operation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Pending,
    Committed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Move,
    Update,
    Delete,
    Layout,
    /// Pushes undone or redone placements to the store.
    Save,
}

/// One store mutation issued by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub seq: u64,
    pub kind: OpKind,
    /// Target instance. Creates start with a temporary negative id that is
    /// replaced by the server id on commit.
    pub instance_id: Option<DbId>,
    pub state: OpState,
}

/// Handed from `begin` to `commit`/`fail`.
struct PendingOp {
    seq: u64,
    kind: OpKind,
    instance_id: Option<DbId>,
    before: Snapshot,
}

/// Clears the in-flight flag when the operation ends, including on
/// cancellation.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> EditorResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EditorError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

struct EditorState {
    /// What the editor shows, optimistic changes included.
    snapshot: Snapshot,
    /// Last state confirmed by the store.
    committed: Snapshot,
    sidebar: SidebarPosition,
    committed_sidebar: SidebarPosition,
    history: History,
    instance_states: HashMap<DbId, OpState>,
    last_op: Option<Operation>,
    next_seq: u64,
    next_temp_id: DbId,
    configuring: Option<DbId>,
    newly_added: Option<(DbId, Instant)>,
}

pub struct PlacementEditor<S> {
    store: S,
    catalog: EditorCatalog,
    site_id: DbId,
    reveal_window: Duration,
    busy: AtomicBool,
    state: Mutex<EditorState>,
}

impl<S: WidgetStore> PlacementEditor<S> {
    pub fn new(store: S, catalog: EditorCatalog, site_id: DbId, config: &EditorConfig) -> Self {
        Self {
            store,
            catalog,
            site_id,
            reveal_window: config.reveal_window,
            busy: AtomicBool::new(false),
            state: Mutex::new(EditorState {
                snapshot: Snapshot::default(),
                committed: Snapshot::default(),
                sidebar: SidebarPosition::default(),
                committed_sidebar: SidebarPosition::default(),
                history: History::new(config.history_limit),
                instance_states: HashMap::new(),
                last_op: None,
                next_seq: 1,
                next_temp_id: -1,
                configuring: None,
                newly_added: None,
            }),
        }
    }

    /// Replace local state with the store's current placements and layout.
    /// Clears undo history.
    pub async fn load(&self) -> EditorResult<()> {
        let _guard = InFlight::acquire(&self.busy)?;
        let widgets = self.store.list(self.site_id).await?;
        let sidebar = self.store.load_layout(self.site_id).await?;

        let mut state = self.state();
        state.snapshot = Snapshot::new(widgets);
        state.committed = state.snapshot.clone();
        state.sidebar = sidebar;
        state.committed_sidebar = sidebar;
        state.history.clear();
        state.instance_states.clear();
        tracing::debug!(
            site_id = self.site_id,
            widgets = state.snapshot.widgets().len(),
            "Placement editor loaded",
        );
        Ok(())
    }

    // ---- accessors ----

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &EditorCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot.clone()
    }

    pub fn sidebar(&self) -> SidebarPosition {
        self.state().sidebar
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn last_operation(&self) -> Option<Operation> {
        self.state().last_op.clone()
    }

    pub fn instance_state(&self, id: DbId) -> Option<OpState> {
        self.state().instance_states.get(&id).copied()
    }

    pub fn can_undo(&self) -> bool {
        self.state().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state().history.can_redo()
    }

    /// `true` while the editor shows placements the store does not have yet.
    pub fn is_dirty(&self) -> bool {
        let state = self.state();
        state.snapshot != state.committed
    }

    /// Instance whose configuration surface is open.
    pub fn configuring(&self) -> Option<DbId> {
        self.state().configuring
    }

    pub fn close_configuration(&self) {
        self.state().configuring = None;
    }

    /// Instance currently marked "newly added". The marker expires
    /// `reveal_window` after the create committed.
    pub fn newly_added(&self) -> Option<DbId> {
        let mut state = self.state();
        let marker = state.newly_added;
        match marker {
            Some((id, until)) if Instant::now() < until => Some(id),
            Some(_) => {
                state.newly_added = None;
                None
            }
            None => None,
        }
    }

    /// Wait for the current "newly added" marker to expire, then clear it.
    pub async fn reveal_elapsed(&self) {
        let deadline = self.state().newly_added.map(|(_, until)| until);
        if let Some(deadline) = deadline {
            tokio::time::sleep_until(deadline).await;
            let mut state = self.state();
            if state.newly_added.is_some_and(|(_, until)| until <= Instant::now()) {
                state.newly_added = None;
            }
        }
    }

    // ---- drag and drop ----

    /// Hover feedback for `payload` over `position_slug`.
    pub fn hover(&self, payload: &DragPayload, position_slug: &str) -> Eligibility {
        let state = self.state();
        let widget_slug = payload.widget_slug(&state.snapshot);
        self.catalog
            .position(position_slug)
            .map_or(Eligibility::Discouraged, |p| drop_eligibility(widget_slug, p))
    }

    /// A drag released outside any target. Nothing is sent.
    pub fn abort_drag(&self, payload: &DragPayload) {
        tracing::debug!(site_id = self.site_id, ?payload, "Drag aborted");
    }

    /// Drop `payload` onto `position_slug`.
    ///
    /// Catalog entries are created at the end of the position. Instances are
    /// moved to `order`, or to the end when `order` is `None`. Discouraged
    /// drops are still sent.
    pub async fn drop_on(
        &self,
        payload: DragPayload,
        position_slug: &str,
        order: Option<i32>,
    ) -> EditorResult<PlacedWidget> {
        if self.hover(&payload, position_slug) == Eligibility::Discouraged {
            tracing::debug!(
                site_id = self.site_id,
                ?payload,
                position_slug,
                "Drop onto discouraged target",
            );
        }

        match payload {
            DragPayload::Catalog { widget_slug } => self.create(&widget_slug, position_slug).await,
            DragPayload::Instance { instance_id } => {
                let order =
                    order.unwrap_or_else(|| self.state().snapshot.next_order(position_slug));
                self.move_instance(instance_id, position_slug, order).await
            }
        }
    }

    // ---- mutations ----

    /// Place a catalog widget at the end of `position_slug`. On success the
    /// new instance is opened for configuration and marked newly added.
    pub async fn create(&self, widget_slug: &str, position_slug: &str) -> EditorResult<PlacedWidget> {
        let _guard = InFlight::acquire(&self.busy)?;
        self.reconcile().await?;
        let site_id = self.site_id;
        let op = self.begin(OpKind::Create, |state| {
            let temp_id = state.next_temp_id;
            state.next_temp_id -= 1;
            let now = Utc::now();
            state.snapshot.append(PlacedWidget {
                id: temp_id,
                site_id,
                widget_slug: widget_slug.to_string(),
                position_slug: position_slug.to_string(),
                order: 0,
                config: json!({}),
                is_active: true,
                is_visible: true,
                created_at: now,
                updated_at: now,
            });
            Ok(Some(temp_id))
        })?;

        match self.store.create(site_id, widget_slug, position_slug).await {
            Ok(created) => {
                let id = created.id;
                let until = Instant::now() + self.reveal_window;
                self.commit(op, Some(id), |state, temp_id| {
                    if let Some(temp_id) = temp_id {
                        state.snapshot.replace(temp_id, created.clone());
                        state.instance_states.remove(&temp_id);
                    }
                    state.configuring = Some(id);
                    state.newly_added = Some((id, until));
                });
                tracing::info!(
                    site_id,
                    instance_id = id,
                    widget_slug,
                    position_slug,
                    "Widget placed",
                );
                Ok(created)
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Move an instance to `order` within `position_slug`.
    pub async fn move_instance(
        &self,
        instance_id: DbId,
        position_slug: &str,
        order: i32,
    ) -> EditorResult<PlacedWidget> {
        let _guard = InFlight::acquire(&self.busy)?;
        let instance_id = self.reconcile_id(instance_id).await?;
        let op = self.begin(OpKind::Move, |state| {
            state
                .snapshot
                .apply_move(instance_id, position_slug, order)
                .map_err(|_| EditorError::UnknownInstance { id: instance_id })?;
            Ok(Some(instance_id))
        })?;

        match self
            .store
            .move_instance(self.site_id, instance_id, position_slug, order)
            .await
        {
            Ok(moved) => {
                self.commit(op, Some(instance_id), |state, _| {
                    state.snapshot.replace(instance_id, moved.clone());
                });
                Ok(moved)
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Apply a partial update. Config patches are shallow-merged locally;
    /// the store's response replaces the local instance.
    pub async fn update(&self, instance_id: DbId, patch: WidgetPatch) -> EditorResult<PlacedWidget> {
        let _guard = InFlight::acquire(&self.busy)?;
        let instance_id = self.reconcile_id(instance_id).await?;
        let op = self.begin(OpKind::Update, |state| {
            let widget = state
                .snapshot
                .get_mut(instance_id)
                .ok_or(EditorError::UnknownInstance { id: instance_id })?;
            if let Some(config) = &patch.config {
                widget.config = merge_config(&widget.widget_slug, &widget.config, config)?;
            }
            if let Some(visible) = patch.is_visible {
                widget.is_visible = visible;
            }
            if let Some(active) = patch.is_active {
                widget.is_active = active;
            }
            Ok(Some(instance_id))
        })?;

        match self.store.update(self.site_id, instance_id, &patch).await {
            Ok(updated) => {
                self.commit(op, Some(instance_id), |state, _| {
                    state.snapshot.replace(instance_id, updated.clone());
                });
                Ok(updated)
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    pub async fn update_config(&self, instance_id: DbId, config: Value) -> EditorResult<PlacedWidget> {
        self.update(
            instance_id,
            WidgetPatch {
                config: Some(config),
                ..WidgetPatch::default()
            },
        )
        .await
    }

    pub async fn set_visibility(&self, instance_id: DbId, visible: bool) -> EditorResult<PlacedWidget> {
        self.update(
            instance_id,
            WidgetPatch {
                is_visible: Some(visible),
                ..WidgetPatch::default()
            },
        )
        .await
    }

    pub async fn set_active(&self, instance_id: DbId, active: bool) -> EditorResult<PlacedWidget> {
        self.update(
            instance_id,
            WidgetPatch {
                is_active: Some(active),
                ..WidgetPatch::default()
            },
        )
        .await
    }

    /// Delete an instance; its former siblings close the gap.
    pub async fn remove(&self, instance_id: DbId) -> EditorResult<()> {
        let _guard = InFlight::acquire(&self.busy)?;
        let instance_id = self.reconcile_id(instance_id).await?;
        let op = self.begin(OpKind::Delete, |state| {
            state
                .snapshot
                .remove(instance_id)
                .map_err(|_| EditorError::UnknownInstance { id: instance_id })?;
            Ok(Some(instance_id))
        })?;

        match self.store.delete(self.site_id, instance_id).await {
            Ok(()) => {
                self.commit(op, Some(instance_id), |state, _| {
                    if state.configuring == Some(instance_id) {
                        state.configuring = None;
                    }
                    if state.newly_added.is_some_and(|(id, _)| id == instance_id) {
                        state.newly_added = None;
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Flip the sidebar to the other side and save it.
    pub async fn toggle_sidebar(&self) -> EditorResult<SidebarPosition> {
        let _guard = InFlight::acquire(&self.busy)?;
        let mut target = SidebarPosition::default();
        let op = self.begin(OpKind::Layout, |state| {
            target = state.sidebar.toggled();
            state.sidebar = target;
            Ok(None)
        })?;

        match self.store.save_layout(self.site_id, target).await {
            Ok(saved) => {
                self.commit(op, None, |state, _| state.sidebar = saved);
                Ok(saved)
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Push the placements shown by the editor to the store. Needed after
    /// undo or redo; a clean editor sends nothing.
    pub async fn save(&self) -> EditorResult<()> {
        let _guard = InFlight::acquire(&self.busy)?;
        self.reconcile().await.map(|_| ())
    }

    // ---- history ----

    /// Restore the snapshot before the last committed edit. Local until the
    /// next save or edit.
    pub fn undo(&self) -> EditorResult<()> {
        let _guard = InFlight::acquire(&self.busy)?;
        let mut state = self.state();
        let current = state.snapshot.clone();
        let previous = state
            .history
            .undo(current)
            .ok_or(EditorError::HistoryEmpty("undo"))?;
        state.snapshot = previous;
        Ok(())
    }

    /// Re-apply the last undone snapshot. Local until the next save or edit.
    pub fn redo(&self) -> EditorResult<()> {
        let _guard = InFlight::acquire(&self.busy)?;
        let mut state = self.state();
        let current = state.snapshot.clone();
        let next = state
            .history
            .redo(current)
            .ok_or(EditorError::HistoryEmpty("redo"))?;
        state.snapshot = next;
        Ok(())
    }

    // ---- private helpers ----

    /// Bring the store up to the local snapshot. Returns the new ids of
    /// instances that had to be re-created.
    async fn reconcile(&self) -> EditorResult<HashMap<DbId, DbId>> {
        let (target, remote) = {
            let state = self.state();
            if state.snapshot == state.committed {
                return Ok(HashMap::new());
            }
            (state.snapshot.clone(), state.committed.clone())
        };
        let op = self.begin(OpKind::Save, |_| Ok(None))?;

        match self.push_changes(&target, remote).await {
            Ok((widgets, ids)) => {
                let recreated = ids.len();
                self.commit(op, None, |state, _| {
                    state.snapshot = Snapshot::new(widgets);
                    state.configuring = state
                        .configuring
                        .map(|id| ids.get(&id).copied().unwrap_or(id))
                        .filter(|id| state.snapshot.get(*id).is_some());
                    if state
                        .newly_added
                        .is_some_and(|(id, _)| state.snapshot.get(id).is_none())
                    {
                        state.newly_added = None;
                    }
                });
                tracing::info!(site_id = self.site_id, recreated, "Placements saved");
                Ok(ids)
            }
            Err(err) => {
                // Some calls may have landed before the failure.
                match self.store.list(self.site_id).await {
                    Ok(widgets) => {
                        self.state().committed = Snapshot::new(widgets);
                    }
                    Err(list_err) => {
                        tracing::warn!(
                            site_id = self.site_id,
                            error = %list_err,
                            "Could not reload placements after a failed save",
                        );
                    }
                }
                Err(self.fail(op, err))
            }
        }
    }

    /// [`Self::reconcile`], then resolve `instance_id` to its current id.
    async fn reconcile_id(&self, instance_id: DbId) -> EditorResult<DbId> {
        let ids = self.reconcile().await?;
        Ok(ids.get(&instance_id).copied().unwrap_or(instance_id))
    }

    /// Issue the store calls that turn `remote` into `target`: deletes,
    /// then creates and patches, then moves position by position. `remote`
    /// tracks the store as the calls land.
    async fn push_changes(
        &self,
        target: &Snapshot,
        mut remote: Snapshot,
    ) -> EditorResult<(Vec<PlacedWidget>, HashMap<DbId, DbId>)> {
        let site_id = self.site_id;

        let stale: Vec<DbId> = remote
            .widgets()
            .iter()
            .filter(|w| target.get(w.id).is_none())
            .map(|w| w.id)
            .collect();
        for id in stale {
            self.store.delete(site_id, id).await?;
            remote.remove(id)?;
        }

        let mut ids = HashMap::new();
        for widget in target.widgets() {
            let id = if remote.get(widget.id).is_some() {
                widget.id
            } else {
                let created = self
                    .store
                    .create(site_id, &widget.widget_slug, &widget.position_slug)
                    .await?;
                let id = created.id;
                remote.append(created);
                ids.insert(widget.id, id);
                id
            };

            let Some(current) = remote.get(id) else {
                continue;
            };
            let patch = WidgetPatch {
                config: (current.config != widget.config).then(|| widget.config.clone()),
                is_visible: (current.is_visible != widget.is_visible).then_some(widget.is_visible),
                is_active: (current.is_active != widget.is_active).then_some(widget.is_active),
            };
            if patch != WidgetPatch::default() {
                let updated = self.store.update(site_id, id, &patch).await?;
                remote.replace(id, updated);
            }
        }

        // Placing each position's widgets at 1, 2, .. in turn never disturbs
        // the slots already placed.
        let mut positions: Vec<&str> = target
            .widgets()
            .iter()
            .map(|w| w.position_slug.as_str())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        for position_slug in positions {
            for (order, widget) in (1..).zip(target.in_position(position_slug)) {
                let id = ids.get(&widget.id).copied().unwrap_or(widget.id);
                let in_place = remote
                    .get(id)
                    .is_some_and(|w| w.position_slug == position_slug && w.order == order);
                if !in_place {
                    self.store
                        .move_instance(site_id, id, position_slug, order)
                        .await?;
                    remote.apply_move(id, position_slug, order)?;
                }
            }
        }

        let widgets = self.store.list(site_id).await?;
        Ok((widgets, ids))
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an optimistic change and record a pending operation. A change
    /// that cannot be applied locally is rejected without touching the store.
    fn begin(
        &self,
        kind: OpKind,
        apply: impl FnOnce(&mut EditorState) -> EditorResult<Option<DbId>>,
    ) -> EditorResult<PendingOp> {
        let mut state = self.state();
        let before = state.snapshot.clone();
        let instance_id = match apply(&mut *state) {
            Ok(id) => id,
            Err(err) => {
                state.snapshot = before;
                return Err(err);
            }
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        if let Some(id) = instance_id {
            state.instance_states.insert(id, OpState::Pending);
        }
        state.last_op = Some(Operation {
            seq,
            kind,
            instance_id,
            state: OpState::Pending,
        });

        Ok(PendingOp {
            seq,
            kind,
            instance_id,
            before,
        })
    }

    /// Reconcile with the store's answer and make the result the new
    /// committed state. `reconcile` receives the operation's original
    /// instance id.
    fn commit(
        &self,
        op: PendingOp,
        instance_id: Option<DbId>,
        reconcile: impl FnOnce(&mut EditorState, Option<DbId>),
    ) {
        let mut state = self.state();
        reconcile(&mut *state, op.instance_id);

        state.committed = state.snapshot.clone();
        state.committed_sidebar = state.sidebar;
        if !matches!(op.kind, OpKind::Layout | OpKind::Save) {
            state.history.record(op.before);
        }
        if let Some(id) = instance_id {
            state.instance_states.insert(id, OpState::Committed);
        }
        state.last_op = Some(Operation {
            seq: op.seq,
            kind: op.kind,
            instance_id,
            state: OpState::Committed,
        });
    }

    /// Roll back to the last committed state and hand the error back.
    fn fail(&self, op: PendingOp, err: EditorError) -> EditorError {
        tracing::warn!(
            site_id = self.site_id,
            seq = op.seq,
            kind = ?op.kind,
            instance_id = ?op.instance_id,
            error = %err,
            "Placement change rejected, local state rolled back",
        );

        let mut state = self.state();
        state.snapshot = state.committed.clone();
        state.sidebar = state.committed_sidebar;
        if let Some(id) = op.instance_id {
            state.instance_states.insert(id, OpState::Failed);
        }
        state.last_op = Some(Operation {
            seq: op.seq,
            kind: op.kind,
            instance_id: op.instance_id,
            state: OpState::Failed,
        });
        err
    }
}
