//! Shopping list data module.
//!
//! A list item either is a plain entry or holds a nested list of items. The
//! app state key `context_path` addresses a nested list by the ids of the
//! items leading to it, starting at the root list.

mod error;
mod store;

pub use error::ListError;
pub use store::{ListStore, LISTS_FILE_NAME};

use serde::{Deserialize, Serialize};

/// Specifying the check state of a list item.
///
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Normal,
    /// Checked off.
    Down,
}

/// One entry of a shopping list.
///
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    #[serde(default)]
    pub state: ItemState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_list: Option<Vec<ListItem>>,
}

impl ListItem {
    pub fn new(id: impl Into<String>, state: ItemState) -> ListItem {
        ListItem {
            id: id.into(),
            state,
            sub_list: None,
        }
    }

    /// Item holding a nested list.
    ///
    pub fn list(id: impl Into<String>, items: Vec<ListItem>) -> ListItem {
        ListItem {
            id: id.into(),
            state: ItemState::Normal,
            sub_list: Some(items),
        }
    }

    pub fn is_list(&self) -> bool {
        self.sub_list.is_some()
    }
}

/// The root list with all nested lists.
///
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListTree {
    root: Vec<ListItem>,
}

impl Default for ListTree {
    fn default() -> ListTree {
        ListTree {
            root: vec![ListItem::list(
                "main",
                vec![ListItem::new("first item", ItemState::Normal)],
            )],
        }
    }
}

impl ListTree {
    pub fn new(root: Vec<ListItem>) -> ListTree {
        ListTree { root }
    }

    pub fn root(&self) -> &[ListItem] {
        &self.root
    }

    /// Items of the list addressed by `path`, `None` if an id of the path is
    /// missing or names a plain item.
    ///
    pub fn resolve(&self, path: &[String]) -> Option<&[ListItem]> {
        let mut items: &[ListItem] = &self.root;
        for id in path {
            items = items.iter().find(|item| &item.id == id)?.sub_list.as_deref()?;
        }
        Some(items)
    }

    pub fn resolve_mut(&mut self, path: &[String]) -> Option<&mut Vec<ListItem>> {
        let mut items = &mut self.root;
        for id in path {
            items = items
                .iter_mut()
                .find(|item| &item.id == id)?
                .sub_list
                .as_mut()?;
        }
        Some(items)
    }

    pub fn find_item(&self, path: &[String], id: &str) -> Option<&ListItem> {
        self.resolve(path)?.iter().find(|item| item.id == id)
    }

    /// Append an item to the list at `path`. Empty ids are ignored and
    /// reported as `Ok(false)`.
    ///
    pub fn add_item(&mut self, path: &[String], id: &str, state: ItemState) -> Result<bool, ListError> {
        if id.is_empty() {
            return Ok(false);
        }
        self.list_mut(path)?.push(ListItem::new(id, state));
        Ok(true)
    }

    /// Add a nested list to the list at `path`, optionally with a copy of the
    /// items of the sibling list `copy_items_from`. An existing item named
    /// `id` gets turned into that list.
    ///
    pub fn add_list(
        &mut self,
        path: &[String],
        id: &str,
        copy_items_from: Option<&str>,
    ) -> Result<(), ListError> {
        let items = self.list_mut(path)?;
        let copied = match copy_items_from {
            Some(source) => items
                .iter()
                .find(|item| item.id == source)
                .ok_or_else(|| ListError::ItemNotFound {
                    id: source.to_string(),
                })?
                .sub_list
                .clone()
                .unwrap_or_default(),
            None => vec![],
        };
        match items.iter_mut().find(|item| item.id == id) {
            Some(item) => item.sub_list = Some(copied),
            None => items.push(ListItem::list(id, copied)),
        }
        Ok(())
    }

    /// Rename and/or re-check an item. Returns the id the item has afterwards.
    ///
    pub fn change_item(
        &mut self,
        path: &[String],
        id: &str,
        new_id: Option<&str>,
        new_state: Option<ItemState>,
    ) -> Result<String, ListError> {
        let item = self
            .list_mut(path)?
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ListError::ItemNotFound { id: id.to_string() })?;
        if let Some(new_id) = new_id {
            item.id = new_id.to_string();
        }
        if let Some(state) = new_state {
            item.state = state;
        }
        Ok(item.id.clone())
    }

    pub fn delete_item(&mut self, path: &[String], id: &str) -> Result<ListItem, ListError> {
        let items = self.list_mut(path)?;
        let index = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ListError::ItemNotFound { id: id.to_string() })?;
        Ok(items.remove(index))
    }

    /// Items of the list at `path` passing the check state filters.
    ///
    pub fn visible_items(&self, path: &[String], show_down: bool, show_normal: bool) -> Vec<&ListItem> {
        self.resolve(path)
            .unwrap_or_default()
            .iter()
            .filter(|item| match item.state {
                ItemState::Down => show_down,
                ItemState::Normal => show_normal,
            })
            .collect()
    }

    fn list_mut(&mut self, path: &[String]) -> Result<&mut Vec<ListItem>, ListError> {
        self.resolve_mut(path).ok_or_else(|| ListError::PathNotFound {
            path: path.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    fn path(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn shop_tree() -> ListTree {
        ListTree::new(vec![
            ListItem::list(
                "Lidl",
                vec![
                    ListItem::list("Obst", vec![ListItem::new("Äpfel", ItemState::Normal)]),
                    ListItem::new("Milch", ItemState::Down),
                ],
            ),
            ListItem::new("Kaffee", ItemState::Normal),
        ])
    }

    #[test]
    fn default_tree_has_main_list() {
        let tree = ListTree::default();
        let main = tree.resolve(&path(&["main"])).unwrap();
        assert_eq!(main, [ListItem::new("first item", ItemState::Normal)]);
    }

    #[test]
    fn resolve_walks_nested_lists() {
        let tree = shop_tree();
        assert_eq!(tree.resolve(&[]).unwrap().len(), 2);
        assert_eq!(tree.resolve(&path(&["Lidl", "Obst"])).unwrap()[0].id, "Äpfel");
        assert!(tree.resolve(&path(&["Lidl", "Milch"])).is_none());
        assert!(tree.resolve(&path(&["Aldi"])).is_none());
    }

    #[test]
    fn add_find_and_delete_items() {
        let mut tree = shop_tree();
        let name: String = Faker.fake();
        let lidl = path(&["Lidl"]);

        assert!(!tree.add_item(&lidl, "", ItemState::Normal).unwrap());
        if !name.is_empty() {
            assert!(tree.add_item(&lidl, &name, ItemState::Normal).unwrap());
            assert_eq!(tree.find_item(&lidl, &name).unwrap().state, ItemState::Normal);
            assert_eq!(tree.delete_item(&lidl, &name).unwrap().id, name);
            assert!(tree.find_item(&lidl, &name).is_none());
        }

        assert!(matches!(
            tree.add_item(&path(&["Aldi"]), "Brot", ItemState::Normal),
            Err(ListError::PathNotFound { .. })
        ));
        assert!(matches!(
            tree.delete_item(&lidl, "Brot"),
            Err(ListError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn change_item_renames_and_checks() {
        let mut tree = shop_tree();
        let lidl = path(&["Lidl"]);
        let id = tree
            .change_item(&lidl, "Milch", Some("Hafermilch"), Some(ItemState::Normal))
            .unwrap();
        assert_eq!(id, "Hafermilch");
        assert_eq!(
            tree.find_item(&lidl, "Hafermilch"),
            Some(&ListItem::new("Hafermilch", ItemState::Normal))
        );
        assert_eq!(tree.change_item(&lidl, "Hafermilch", None, None).unwrap(), "Hafermilch");
    }

    #[test]
    fn add_list_copies_sibling_items() {
        let mut tree = shop_tree();
        tree.add_list(&[], "Aldi", Some("Lidl")).unwrap();
        assert_eq!(tree.resolve(&path(&["Aldi"])), tree.resolve(&path(&["Lidl"])));

        tree.add_list(&[], "Kaffee", None).unwrap();
        assert!(tree.find_item(&[], "Kaffee").unwrap().is_list());
        assert_eq!(tree.resolve(&[]).unwrap().len(), 3);

        assert!(tree.add_list(&[], "Edeka", Some("Netto")).is_err());
    }

    #[test]
    fn visible_items_filters_by_state() {
        let tree = shop_tree();
        let lidl = path(&["Lidl"]);
        let ids = |show_down, show_normal| -> Vec<String> {
            tree.visible_items(&lidl, show_down, show_normal)
                .into_iter()
                .map(|item| item.id.clone())
                .collect()
        };
        assert_eq!(ids(true, true), vec!["Obst", "Milch"]);
        assert_eq!(ids(true, false), vec!["Milch"]);
        assert_eq!(ids(false, true), vec!["Obst"]);
        assert!(tree.visible_items(&path(&["Aldi"]), true, true).is_empty());
    }

    #[test]
    fn yaml_format_is_plain_nested_list() {
        let tree = ListTree::new(vec![ListItem::list(
            "main",
            vec![ListItem::new("Brot", ItemState::Down)],
        )]);
        let yaml = serde_yaml::to_string(&tree).unwrap();
        assert!(yaml.contains("id: main"));
        assert!(yaml.contains("state: down"));

        let parsed: ListTree = serde_yaml::from_str("- id: Brot\n").unwrap();
        assert_eq!(parsed.root(), [ListItem::new("Brot", ItemState::Normal)]);
    }
}
