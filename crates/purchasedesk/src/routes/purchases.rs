use crate::error::{AppError, AppResult};
use crate::models::{Purchase, PurchasePayload};
use crate::routes::{AppState, ViewScope};

pub const CREATE_FAILED: &str = "Error creating purchase.";
pub const UPDATE_FAILED: &str = "Error updating purchase.";
pub const DELETE_FAILED: &str = "Error deleting purchase.";

/// Receives every change the editor makes to a user's purchases.
pub trait Reconciler {
    fn purchases_replaced(&mut self, user_id: i64, purchases: &[Purchase]);
    fn purchase_removed(&mut self, user_id: i64, purchase_id: i64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowState {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditFields {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq)]
struct EditRow {
    id: i64,
    fields: EditFields,
}

/// One user's purchases. Edit and delete are applied locally and rolled
/// back when the write fails; create and edit then reload the user.
#[derive(Debug, Clone)]
pub struct PurchaseEditor {
    user_id: i64,
    purchases: Vec<Purchase>,
    draft: EditFields,
    edit: Option<EditRow>,
}

impl PurchaseEditor {
    pub fn new(user_id: i64, purchases: Vec<Purchase>) -> Self {
        Self {
            user_id,
            purchases,
            draft: EditFields::default(),
            edit: None,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn draft(&self) -> &EditFields {
        &self.draft
    }

    pub fn set_draft(&mut self, name: impl Into<String>, price: impl Into<String>) {
        self.draft = EditFields {
            name: name.into(),
            price: price.into(),
        };
    }

    pub fn row_state(&self, purchase_id: i64) -> RowState {
        match &self.edit {
            Some(row) if row.id == purchase_id => RowState::Editing,
            _ => RowState::Viewing,
        }
    }

    pub fn editing(&self) -> Option<(i64, &EditFields)> {
        self.edit.as_ref().map(|row| (row.id, &row.fields))
    }

    /// Put a row into edit mode, seeded with its current values. Any other
    /// row being edited goes back to viewing.
    pub fn begin_edit(&mut self, purchase_id: i64) -> bool {
        let Some(purchase) = self.purchases.iter().find(|p| p.id == purchase_id) else {
            return false;
        };
        self.edit = Some(EditRow {
            id: purchase_id,
            fields: EditFields {
                name: purchase.name.clone(),
                price: purchase.price.to_string(),
            },
        });
        true
    }

    pub fn set_edit_fields(&mut self, name: impl Into<String>, price: impl Into<String>) -> bool {
        match &mut self.edit {
            Some(row) => {
                row.fields = EditFields {
                    name: name.into(),
                    price: price.into(),
                };
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Create a purchase from the draft fields. Returns whether the write
    /// reached the server.
    pub async fn create(
        &mut self,
        state: &mut AppState,
        scope: &ViewScope,
        sink: &mut impl Reconciler,
    ) -> bool {
        let payload = match self.payload(&self.draft) {
            Ok(payload) => payload,
            Err(e) => {
                state.reject(CREATE_FAILED, &e);
                return false;
            }
        };

        let written = scope.run(state.api.create_purchase(&payload)).await;
        match written {
            None => return false,
            Some(Err(e)) => {
                state.fail(CREATE_FAILED, e.into());
                return false;
            }
            Some(Ok(())) => {}
        }
        tracing::info!("Created purchase {:?} for user {}", payload.name, self.user_id);

        if self.reload(state, scope, sink, CREATE_FAILED, None).await {
            self.draft = EditFields::default();
        }
        true
    }

    /// Save the row in edit mode. Edit mode is left only once the server
    /// state has been reloaded.
    pub async fn confirm_edit(
        &mut self,
        state: &mut AppState,
        scope: &ViewScope,
        sink: &mut impl Reconciler,
    ) -> bool {
        let Some(row) = self.edit.clone() else {
            tracing::debug!("Confirm requested with no row in edit mode");
            return false;
        };
        let payload = match self.payload(&row.fields) {
            Ok(payload) => payload,
            Err(e) => {
                state.reject(UPDATE_FAILED, &e);
                return false;
            }
        };

        let snapshot = self.purchases.clone();
        let patched: Vec<Purchase> = snapshot
            .iter()
            .map(|p| {
                if p.id == row.id {
                    Purchase {
                        name: payload.name.clone(),
                        price: payload.price,
                        ..p.clone()
                    }
                } else {
                    p.clone()
                }
            })
            .collect();
        let expected = patched.iter().find(|p| p.id == row.id).cloned();
        self.replace(sink, patched);

        let written = scope.run(state.api.update_purchase(row.id, &payload)).await;
        match written {
            None => return false,
            Some(Err(e)) => {
                self.replace(sink, snapshot);
                state.fail(UPDATE_FAILED, e.into());
                return false;
            }
            Some(Ok(())) => {}
        }
        tracing::info!("Updated purchase {} for user {}", row.id, self.user_id);

        if self.reload(state, scope, sink, UPDATE_FAILED, expected.as_ref()).await {
            self.edit = None;
        }
        true
    }

    /// Delete a purchase. The row disappears immediately and comes back if
    /// the server refuses.
    pub async fn delete(
        &mut self,
        state: &mut AppState,
        scope: &ViewScope,
        sink: &mut impl Reconciler,
        purchase_id: i64,
    ) -> bool {
        let snapshot = self.purchases.clone();
        self.remove(sink, purchase_id);

        let written = scope.run(state.api.delete_purchase(purchase_id)).await;
        match written {
            None => false,
            Some(Err(e)) => {
                self.replace(sink, snapshot);
                state.fail(DELETE_FAILED, e.into());
                false
            }
            Some(Ok(())) => {
                tracing::info!("Deleted purchase {purchase_id} for user {}", self.user_id);
                if matches!(&self.edit, Some(row) if row.id == purchase_id) {
                    self.edit = None;
                }
                true
            }
        }
    }

    fn payload(&self, fields: &EditFields) -> AppResult<PurchasePayload> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name is required".to_string()));
        }
        let price: f64 = fields
            .price
            .trim()
            .parse()
            .ok()
            .filter(|p: &f64| p.is_finite())
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid price: {:?}", fields.price)))?;

        Ok(PurchasePayload {
            name: name.to_string(),
            price,
            user_id: self.user_id,
        })
    }

    /// Replace the local list with the server's copy of the user.
    async fn reload(
        &mut self,
        state: &mut AppState,
        scope: &ViewScope,
        sink: &mut impl Reconciler,
        message: &str,
        expected: Option<&Purchase>,
    ) -> bool {
        let fetched = scope.run(state.api.user(self.user_id)).await;
        let user = match fetched {
            None => return false,
            Some(Err(e)) => {
                state.fail(message, e.into());
                return false;
            }
            Some(Ok(user)) => user,
        };

        if let Some(expected) = expected {
            match user.purchases.iter().find(|p| p.id == expected.id) {
                Some(actual) if !actual.same_content(expected) => tracing::warn!(
                    "Purchase {} changed on the server: expected {:?} at {}, got {:?} at {}",
                    expected.id,
                    expected.name,
                    expected.price,
                    actual.name,
                    actual.price
                ),
                None => tracing::warn!("Purchase {} no longer exists on the server", expected.id),
                _ => {}
            }
        }

        self.replace(sink, user.purchases);
        true
    }

    fn replace(&mut self, sink: &mut impl Reconciler, purchases: Vec<Purchase>) {
        sink.purchases_replaced(self.user_id, &purchases);
        self.purchases = purchases;
    }

    fn remove(&mut self, sink: &mut impl Reconciler, purchase_id: i64) {
        sink.purchase_removed(self.user_id, purchase_id);
        self.purchases.retain(|p| p.id != purchase_id);
    }
}
