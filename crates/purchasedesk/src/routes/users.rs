use crate::models::{Purchase, User};
use crate::routes::purchases::{PurchaseEditor, Reconciler};
use crate::routes::{AppState, ViewScope};

pub const USERS_FAILED: &str = "Error fetching users.";
pub const PURCHASES_FAILED: &str = "Error fetching purchases.";
pub const HISTORY_FAILED: &str = "Error updating purchase history.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Cached users with their nested purchases.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<User>,
}

impl UserTable {
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn get_mut(&mut self, user_id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }
}

impl Reconciler for UserTable {
    fn purchases_replaced(&mut self, user_id: i64, purchases: &[Purchase]) {
        match self.get_mut(user_id) {
            Some(user) => user.purchases = purchases.to_vec(),
            None => tracing::debug!("User {user_id} not in table, nothing to update"),
        }
    }

    fn purchase_removed(&mut self, user_id: i64, purchase_id: i64) {
        if let Some(user) = self.get_mut(user_id) {
            user.purchases.retain(|p| p.id != purchase_id);
        }
    }
}

/// The `limit` purchases with the highest ids, newest first.
pub fn recent_history(mut purchases: Vec<Purchase>, limit: usize) -> Vec<Purchase> {
    purchases.sort_by(|a, b| b.id.cmp(&a.id));
    purchases.truncate(limit);
    purchases
}

/// User list screen: the user table, the recent purchase panel and the
/// editor for whichever user is selected.
#[derive(Debug)]
pub struct UserListView {
    scope: ViewScope,
    load_state: LoadState,
    table: UserTable,
    history: Vec<Purchase>,
    history_limit: usize,
    editor: Option<PurchaseEditor>,
}

impl UserListView {
    /// Mount the screen on the current route.
    pub fn mount(state: &AppState) -> Self {
        Self {
            scope: state.navigator.scope(),
            load_state: LoadState::Idle,
            table: UserTable::default(),
            history: Vec::new(),
            history_limit: state.config.history_limit,
            editor: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scope.is_active()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn users(&self) -> &[User] {
        self.table.users()
    }

    pub fn user(&self, user_id: i64) -> Option<&User> {
        self.table.get(user_id)
    }

    pub fn history(&self) -> &[Purchase] {
        &self.history
    }

    pub fn editor(&self) -> Option<&PurchaseEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut PurchaseEditor> {
        self.editor.as_mut()
    }

    pub fn selected_user_id(&self) -> Option<i64> {
        self.editor.as_ref().map(PurchaseEditor::user_id)
    }

    /// Fetch users and purchases concurrently. Each fetch fails on its own;
    /// one failing does not stop the other from being applied.
    pub async fn load(&mut self, state: &mut AppState) {
        if !self.is_mounted() {
            return;
        }
        self.load_state = LoadState::Loading;

        let api = state.api.clone();
        let (users, purchases) = tokio::join!(
            self.scope.run(api.users()),
            self.scope.run(api.purchases())
        );

        let mut failed = false;
        match users {
            Some(Ok(users)) if self.is_mounted() => self.table.users = users,
            Some(Ok(_)) | None => {}
            Some(Err(e)) => {
                failed = true;
                state.fail(USERS_FAILED, e.into());
            }
        }
        match purchases {
            Some(Ok(purchases)) if self.is_mounted() => {
                self.history = recent_history(purchases, self.history_limit);
            }
            Some(Ok(_)) | None => {}
            Some(Err(e)) => {
                failed = true;
                state.fail(PURCHASES_FAILED, e.into());
            }
        }

        if self.is_mounted() {
            self.load_state = if failed {
                LoadState::Failed
            } else {
                LoadState::Loaded
            };
        }
    }

    /// Re-read the purchase collection for the history panel.
    pub async fn refresh_history(&mut self, state: &mut AppState) {
        let fetched = self.scope.run(state.api.purchases()).await;
        match fetched {
            Some(Ok(purchases)) if self.is_mounted() => {
                self.history = recent_history(purchases, self.history_limit);
            }
            Some(Ok(_)) | None => {}
            Some(Err(e)) => state.fail(HISTORY_FAILED, e.into()),
        }
    }

    /// Open the editor on a snapshot of the user's purchases.
    pub fn open_editor(&mut self, user_id: i64) -> bool {
        match self.table.get(user_id) {
            Some(user) => {
                self.editor = Some(PurchaseEditor::new(user_id, user.purchases.clone()));
                true
            }
            None => false,
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Create a purchase from the editor's draft fields.
    pub async fn create_purchase(&mut self, state: &mut AppState) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let done = editor.create(state, &self.scope, &mut self.table).await;
        if done {
            self.refresh_history(state).await;
        }
        done
    }

    pub async fn confirm_edit(&mut self, state: &mut AppState) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let done = editor.confirm_edit(state, &self.scope, &mut self.table).await;
        if done {
            self.refresh_history(state).await;
        }
        done
    }

    pub async fn delete_purchase(&mut self, state: &mut AppState, purchase_id: i64) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let done = editor
            .delete(state, &self.scope, &mut self.table, purchase_id)
            .await;
        if done {
            self.refresh_history(state).await;
        }
        done
    }
}
