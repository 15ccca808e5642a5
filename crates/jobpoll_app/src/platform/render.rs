use comfy_table::Table;
use jobpoll_core::{CalculationViewModel, ContactRow, SearchViewModel};
use serde_json::Value;

pub fn render_search(view: &SearchViewModel) -> String {
    let mut table = Table::new();
    let mut header = vec!["Email".to_string()];
    header.extend(view.fields.iter().cloned());
    table.set_header(header);
    for row in &view.rows {
        table.add_row(row_cells(row, &view.fields));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} of {} contacts",
        view.rows.len(),
        view.total
    ));
    if let Some(last) = &view.last_key {
        out.push_str(&format!("\nnext page: --after {last}"));
    }
    if let Some(first) = &view.first_key {
        out.push_str(&format!("\nprevious page: --before {first}"));
    }
    out
}

pub fn render_calculation(view: &CalculationViewModel) -> String {
    let Some(summary) = view.summary else {
        return "no recipient count available".to_string();
    };
    let mut table = Table::new();
    table.set_header(vec!["Contacts", "Suppressed", "Unavailable", "Remaining"]);
    table.add_row(vec![
        summary.count.to_string(),
        summary.suppressed.to_string(),
        summary.unavailable.to_string(),
        summary.remaining.to_string(),
    ]);
    table.to_string()
}

fn row_cells(row: &ContactRow, fields: &[String]) -> Vec<String> {
    let mut cells = Vec::with_capacity(fields.len() + 1);
    cells.push(row.email.clone());
    for field in fields {
        let cell = match row.properties.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };
        cells.push(cell);
    }
    cells
}
