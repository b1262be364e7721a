use serde::Serialize;

use crate::form::FormData;
use crate::models::{FieldSpec, GroupKey, Record};

#[derive(Debug, Clone, Serialize)]
pub struct Group<R> {
    pub label: String,
    pub records: Vec<R>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView<R> {
    pub title: &'static str,
    pub records: Vec<R>,
    /// Present exactly when the record type is grouped, even for an empty list
    pub groups: Option<Vec<Group<R>>>,
}

impl<R: Record> ListView<R> {
    pub fn new(records: Vec<R>) -> Self {
        let groups = group_records(&records);
        Self {
            title: R::PLURAL,
            records,
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub heading: String,
    /// Path the form posts to
    pub action: String,
    pub fields: &'static [FieldSpec],
    pub values: FormData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View<R> {
    List(ListView<R>),
    Form(FormView),
}

/// Group label for rows of a grouped type that report no key
const UNGROUPED_LABEL: &str = "Other";

/// Partition records by their group key.
///
/// Records keep their store order inside a group; groups are ordered by
/// key. Returns `None` for record types that are not grouped.
pub fn group_records<R: Record>(records: &[R]) -> Option<Vec<Group<R>>> {
    if !R::GROUPED {
        return None;
    }
    let mut keyed: Vec<(GroupKey, Vec<R>)> = Vec::new();
    for record in records {
        let key = record
            .group_key()
            .unwrap_or_else(|| GroupKey::ranked(u32::MAX, UNGROUPED_LABEL));
        match keyed.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(record.clone()),
            None => keyed.push((key, vec![record.clone()])),
        }
    }
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Some(
        keyed
            .into_iter()
            .map(|(key, records)| Group {
                label: key.label,
                records,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Completion, Idea, Item, Lesson, Task};

    fn item(id: i64, name: &str, category: &str) -> Item {
        Item {
            id,
            name: name.into(),
            quantity: 1,
            category: category.into(),
        }
    }

    #[test]
    fn test_groups_by_category_in_key_order() {
        let items = vec![
            item(1, "Bananas", "Produce"),
            item(2, "Milk", "Dairy"),
            item(3, "Apples", "Produce"),
            item(4, "Foil", ""),
        ];
        let groups = group_records(&items).unwrap();
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Dairy", "Produce", "Uncategorized"]);

        let produce: Vec<i64> = groups[1].records.iter().map(|i| i.id).collect();
        assert_eq!(produce, vec![1, 3]);
    }

    #[test]
    fn test_task_groups_put_pending_first() {
        let tasks = vec![
            Task {
                id: 1,
                title: "done thing".into(),
                description: String::new(),
                completed: Completion::Done,
            },
            Task {
                id: 2,
                title: "open thing".into(),
                description: String::new(),
                completed: Completion::Pending,
            },
        ];
        let groups = group_records(&tasks).unwrap();
        assert_eq!(groups[0].label, "Pending");
        assert_eq!(groups[1].label, "Done");
    }

    #[test]
    fn test_ungrouped_records_yield_none() {
        let ideas = vec![Idea {
            id: 1,
            title: "x".into(),
            content: String::new(),
            tags: vec![],
        }];
        assert!(group_records(&ideas).is_none());
    }

    #[test]
    fn test_grouping_depends_on_type_not_row_count() {
        let groups = group_records::<Item>(&[]).unwrap();
        assert!(groups.is_empty());
        assert!(ListView::<Item>::new(vec![]).groups.is_some());

        assert!(group_records::<Idea>(&[]).is_none());
        assert!(ListView::<Idea>::new(vec![]).groups.is_none());
        assert!(ListView::<Lesson>::new(vec![]).groups.is_none());
    }
}
