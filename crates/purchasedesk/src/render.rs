use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};

use crate::models::{Purchase, User};
use crate::notify::Toast;
use crate::routes::purchases::{PurchaseEditor, RowState};

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d %B %I:%M:%S").to_string()
}

fn table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn users_table(users: &[User]) -> String {
    let mut table = table();
    table.set_header(vec!["ID", "Name", "Email", "Purchases"]);
    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.purchases.len().to_string(),
        ]);
    }
    table.to_string()
}

pub fn history_panel(history: &[Purchase]) -> String {
    let mut out = String::from("Purchase History\n");
    for (i, purchase) in history.iter().enumerate() {
        if i > 0 {
            out.push_str("----\n");
        }
        let owner = purchase.user.as_ref().map_or("-", |u| u.name.as_str());
        out.push_str(&format!(
            "Name: {}\nPrice: {}\nUser: {}\nDate: {}\n",
            purchase.name,
            format_price(purchase.price),
            owner,
            format_date(&purchase.created_at)
        ));
    }
    out
}

pub fn editor(editor: &PurchaseEditor) -> String {
    let mut table = table();
    table.set_header(vec!["ID", "Name", "Price", "Date", ""]);
    for purchase in editor.purchases() {
        let row = match (editor.row_state(purchase.id), editor.editing()) {
            (RowState::Editing, Some((_, fields))) => vec![
                purchase.id.to_string(),
                fields.name.clone(),
                fields.price.clone(),
                format_date(&purchase.created_at),
                "editing".to_string(),
            ],
            _ => vec![
                purchase.id.to_string(),
                purchase.name.clone(),
                format_price(purchase.price),
                format_date(&purchase.created_at),
                String::new(),
            ],
        };
        table.add_row(row);
    }
    format!("Purchases of user {}\n{table}", editor.user_id())
}

pub fn toast(toast: &Toast) -> String {
    if toast.occurrences > 1 {
        format!("{} (x{})", toast.message, toast.occurrences)
    } else {
        toast.message.clone()
    }
}
