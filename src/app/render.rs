use std::fmt::Write;

use super::{FlashLevel, FormView, ListView, Page, View};
use crate::models::{FieldKind, Record};

/// Render a page as plain text for the terminal
pub fn render_page<R: Record>(page: &Page<R>) -> String {
    let mut out = String::new();
    for flash in &page.flashes {
        let marker = match flash.level {
            FlashLevel::Success => "ok",
            FlashLevel::Error => "!!",
        };
        let _ = writeln!(out, "[{}] {}", marker, flash.message);
    }
    if !page.flashes.is_empty() {
        out.push('\n');
    }

    match &page.view {
        View::List(view) => render_list(&mut out, view),
        View::Form(view) => render_form(&mut out, view),
    }
    out
}

fn render_list<R: Record>(out: &mut String, view: &ListView<R>) {
    let _ = writeln!(out, "{}", view.title);
    if view.is_empty() {
        let _ = writeln!(out, "  (none yet)");
        return;
    }

    match &view.groups {
        Some(groups) => {
            for group in groups {
                let _ = writeln!(out, "\n{} ({})", group.label, group.records.len());
                for record in &group.records {
                    let _ = writeln!(out, "  {:>4}  {}", record.id(), record.summary());
                }
            }
        }
        None => {
            for record in &view.records {
                let _ = writeln!(out, "  {:>4}  {}", record.id(), record.summary());
            }
        }
    }
}

fn render_form(out: &mut String, view: &FormView) {
    let _ = writeln!(out, "{}  (POST {})", view.heading, view.action);
    for field in view.fields {
        let value = view.values.get(field.name).unwrap_or("");
        let shown = match field.kind {
            FieldKind::Checkbox => (if view.values.checkbox(field.name) { "[x]" } else { "[ ]" }).to_string(),
            _ => value.to_string(),
        };
        let required = if field.required { "*" } else { " " };
        let _ = writeln!(out, "  {}{:<24} {}", required, field.label, shown);
    }
}

/// One line per field: name, label, kind and whether it is required
pub fn render_fields<R: Record>() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} fields", R::NOUN);
    for field in R::FIELDS {
        let kind = match field.kind {
            FieldKind::Text => "text".to_string(),
            FieldKind::LongText => "long text".to_string(),
            FieldKind::PositiveInt => "number >= 1".to_string(),
            FieldKind::Checkbox => "checkbox (on/off)".to_string(),
            FieldKind::Choice(options) => format!("one of: {}", options.join(", ")),
            FieldKind::Tags => "comma separated tags".to_string(),
        };
        let required = if field.required { ", required" } else { "" };
        let _ = writeln!(out, "  {:<12} {} ({}{})", field.name, field.label, kind, required);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Flash;
    use crate::models::{Item, Task};

    #[test]
    fn test_grouped_list_rendering() {
        let items = vec![
            Item { id: 1, name: "Milk".into(), quantity: 2, category: "Dairy".into() },
            Item { id: 2, name: "Bananas".into(), quantity: 6, category: "Produce".into() },
        ];
        let page = Page {
            flashes: vec![Flash::success("Item created.")],
            view: View::List(ListView::new(items)),
        };
        let text = render_page(&page);
        assert!(text.starts_with("[ok] Item created."));
        assert!(text.contains("Dairy (1)"));
        assert!(text.contains("Produce (1)"));
        assert!(text.contains("Bananas x6"));
    }

    #[test]
    fn test_empty_list_rendering() {
        let page: Page<Task> = Page {
            flashes: vec![],
            view: View::List(ListView::new(vec![])),
        };
        assert_eq!(render_page(&page), "Tasks\n  (none yet)\n");
    }

    #[test]
    fn test_fields_listing_names_choices() {
        let text = render_fields::<crate::models::Book>();
        assert!(text.contains("one of: to-read, reading, finished"));
        assert!(text.contains("author"));
    }
}
