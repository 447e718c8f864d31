//! Menu items and the per-level arena that owns them.
//!
//! Every stack level owns one `Menu`. Items are addressed by `ItemId`,
//! an index into that arena; folders keep an ordered list of child ids.
//! Dropping the `Menu` drops the whole tree.

use log::error;

use crate::error::{MenuError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Toggle,
    Checkbox,
    MultipleChoice,
    Button,
    Range,
    Folder,
    Divider,
    TextField,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    /// Backing integer the choice stands for. Defaults to its index.
    pub value: i32,
    pub disabled: bool,
}

/// Maximum length of a text field's contents.
pub const MAX_STR_VAL_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct MenuItem {
    pub id: i32,
    pub sub_id: i32,
    pub kind: ItemKind,
    pub name: String,
    pub symbol: Option<u8>,
    pub disabled: bool,
    /// Toggle state, choice index, range value or text cursor.
    pub value: i32,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub ministep: i32,
    pub divisor: i32,
    pub choices: Vec<Choice>,
    pub str_value: String,
    pub displayed_value: String,
    pub prefer_str: bool,
    pub toggle_labels: Option<[String; 2]>,
    /// Display transform for a button's integer value.
    pub map_value: Option<fn(i32) -> i32>,
    pub is_expanded: bool,
    children: Vec<ItemId>,
    parent: Option<ItemId>,
}

impl MenuItem {
    fn new(kind: ItemKind, id: i32, name: &str) -> Self {
        MenuItem {
            id,
            sub_id: 0,
            kind,
            name: name.to_string(),
            symbol: None,
            disabled: false,
            value: 0,
            min: 0,
            max: 0,
            step: 1,
            ministep: 1,
            divisor: 1,
            choices: Vec::new(),
            str_value: String::new(),
            displayed_value: String::new(),
            prefer_str: false,
            toggle_labels: None,
            map_value: None,
            is_expanded: false,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// The backing integer of the selected choice.
    pub fn choice_value(&self) -> i32 {
        usize::try_from(self.value)
            .ok()
            .and_then(|i| self.choices.get(i))
            .map_or(self.value, |c| c.value)
    }

    /// Selects the choice whose backing integer is `value`, if any.
    pub fn select_choice_value(&mut self, value: i32) -> bool {
        match self.choices.iter().position(|c| c.value == value) {
            Some(i) => {
                self.value = i as i32;
                true
            }
            None => false,
        }
    }

    pub fn choice_label(&self) -> &str {
        usize::try_from(self.value)
            .ok()
            .and_then(|i| self.choices.get(i))
            .map_or("", |c| c.label.as_str())
    }

    pub fn set_choice_disabled(&mut self, index: usize, disabled: bool) {
        if let Some(c) = self.choices.get_mut(index) {
            c.disabled = disabled;
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self.kind, ItemKind::Divider) && !self.disabled
    }
}

#[derive(Clone, Debug)]
pub struct Menu {
    items: Vec<MenuItem>,
    root: ItemId,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        let mut root = MenuItem::new(ItemKind::Folder, 0, "");
        root.is_expanded = true;
        Menu {
            items: vec![root],
            root: ItemId(0),
        }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items[self.root.0].children.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut MenuItem> {
        self.items.get_mut(id.0)
    }

    pub fn item(&self, id: ItemId) -> Result<&MenuItem> {
        self.items.get(id.0).ok_or(MenuError::NoSuchItem(id.0))
    }

    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut MenuItem> {
        self.items.get_mut(id.0).ok_or(MenuError::NoSuchItem(id.0))
    }

    pub fn children(&self, folder: ItemId) -> &[ItemId] {
        self.items.get(folder.0).map_or(&[], |i| i.children.as_slice())
    }

    /// A folder that is not attached anywhere, used to collect items before
    /// splicing them in with `add_all`.
    pub fn detached_folder(&mut self) -> ItemId {
        let mut f = MenuItem::new(ItemKind::Folder, 0, "");
        f.is_expanded = true;
        self.items.push(f);
        ItemId(self.items.len() - 1)
    }

    fn add(&mut self, parent: ItemId, mut item: MenuItem) -> Result<ItemId> {
        match self.items.get(parent.0) {
            Some(p) if p.kind == ItemKind::Folder => {}
            Some(_) => {
                error!("tried to add '{}' to non-folder item {}", item.name, parent.0);
                return Err(MenuError::NotAFolder(parent.0));
            }
            None => {
                error!("tried to add '{}' to missing item {}", item.name, parent.0);
                return Err(MenuError::NoSuchItem(parent.0));
            }
        }
        item.parent = Some(parent);
        let id = ItemId(self.items.len());
        self.items.push(item);
        self.items[parent.0].children.push(id);
        Ok(id)
    }

    pub fn add_toggle(&mut self, parent: ItemId, id: i32, name: &str, value: i32) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::Toggle, id, name);
        item.value = value;
        self.add(parent, item)
    }

    pub fn add_toggle_labels(
        &mut self,
        parent: ItemId,
        id: i32,
        name: &str,
        value: i32,
        off: &str,
        on: &str,
    ) -> Result<ItemId> {
        let new_id = self.add_toggle(parent, id, name, value)?;
        self.items[new_id.0].toggle_labels = Some([off.to_string(), on.to_string()]);
        Ok(new_id)
    }

    pub fn add_checkbox(&mut self, parent: ItemId, id: i32, name: &str, value: i32) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::Checkbox, id, name);
        item.value = value;
        self.add(parent, item)
    }

    /// A choice list whose choices back onto their own index.
    pub fn add_multiple_choice(
        &mut self,
        parent: ItemId,
        id: i32,
        name: &str,
        choices: &[&str],
        value: i32,
    ) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::MultipleChoice, id, name);
        item.choices = choices
            .iter()
            .enumerate()
            .map(|(i, label)| Choice {
                label: label.to_string(),
                value: i as i32,
                disabled: false,
            })
            .collect();
        item.value = value;
        self.add(parent, item)
    }

    pub fn add_button(&mut self, parent: ItemId, id: i32, name: &str) -> Result<ItemId> {
        self.add_button_with_value(parent, id, name, 0, " ", " ")
    }

    /// A button that remembers a value and shows `displayed_value`.
    pub fn add_button_with_value(
        &mut self,
        parent: ItemId,
        id: i32,
        name: &str,
        value: i32,
        str_value: &str,
        displayed_value: &str,
    ) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::Button, id, name);
        item.value = value;
        item.str_value = str_value.to_string();
        item.displayed_value = displayed_value.to_string();
        self.add(parent, item)
    }

    pub fn add_range(
        &mut self,
        parent: ItemId,
        id: i32,
        name: &str,
        min: i32,
        max: i32,
        step: i32,
        value: i32,
    ) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::Range, id, name);
        item.min = min;
        item.max = max;
        item.step = step;
        item.ministep = 1;
        item.value = value;
        self.add(parent, item)
    }

    pub fn add_folder(&mut self, parent: ItemId, name: &str) -> Result<ItemId> {
        self.add(parent, MenuItem::new(ItemKind::Folder, 0, name))
    }

    pub fn add_divider(&mut self, parent: ItemId) -> Result<ItemId> {
        self.add(parent, MenuItem::new(ItemKind::Divider, 0, ""))
    }

    pub fn add_text_field(
        &mut self,
        parent: ItemId,
        id: i32,
        name: &str,
        text: &str,
    ) -> Result<ItemId> {
        let mut item = MenuItem::new(ItemKind::TextField, id, name);
        // The font and the edit cursor work in bytes.
        item.str_value = text
            .chars()
            .take(MAX_STR_VAL_LEN)
            .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
            .collect();
        item.value = item.str_value.len() as i32;
        self.add(parent, item)
    }

    /// Moves every child of `src` to the end of `dest`, keeping their order.
    pub fn add_all(&mut self, src: ItemId, dest: ItemId) -> Result<()> {
        match self.items.get(dest.0) {
            Some(d) if d.kind == ItemKind::Folder => {}
            Some(_) => return Err(MenuError::NotAFolder(dest.0)),
            None => return Err(MenuError::NoSuchItem(dest.0)),
        }
        let moved = std::mem::take(&mut self.item_mut(src)?.children);
        for &c in &moved {
            self.items[c.0].parent = Some(dest);
        }
        self.items[dest.0].children.extend(moved);
        Ok(())
    }

    /// Stable, case-insensitive sort of a folder's children by name.
    pub fn sort_children(&mut self, folder: ItemId) -> Result<()> {
        let mut children = std::mem::take(&mut self.item_mut(folder)?.children);
        children.sort_by_cached_key(|c| self.items[c.0].name.to_lowercase());
        self.items[folder.0].children = children;
        Ok(())
    }

    /// Removes every item except the root.
    pub fn clear(&mut self) {
        self.items.truncate(1);
        self.items[0].children.clear();
    }

    /// First attached item with the given id, depth first.
    pub fn find_by_id(&self, id: i32) -> Option<ItemId> {
        self.find_in(self.root, &|item| item.id == id)
    }

    pub fn find_by_id_sub(&self, id: i32, sub_id: i32) -> Option<ItemId> {
        self.find_in(self.root, &|item| item.id == id && item.sub_id == sub_id)
    }

    fn find_in(&self, folder: ItemId, pred: &dyn Fn(&MenuItem) -> bool) -> Option<ItemId> {
        for &c in self.children(folder) {
            let item = &self.items[c.0];
            if pred(item) {
                return Some(c);
            }
            if item.kind == ItemKind::Folder {
                if let Some(found) = self.find_in(c, pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Items in display order, descending only into expanded folders.
    pub fn visible(&self) -> Vec<(ItemId, usize)> {
        let mut out = Vec::new();
        self.collect_visible(self.root, 0, &mut out);
        out
    }

    fn collect_visible(&self, folder: ItemId, depth: usize, out: &mut Vec<(ItemId, usize)>) {
        for &c in self.children(folder) {
            out.push((c, depth));
            let item = &self.items[c.0];
            if item.kind == ItemKind::Folder && item.is_expanded {
                self.collect_visible(c, depth + 1, out);
            }
        }
    }

    pub fn set_value(&mut self, id: ItemId, value: i32) -> Result<()> {
        self.item_mut(id)?.value = value;
        Ok(())
    }

    pub fn value(&self, id: ItemId) -> Result<i32> {
        Ok(self.item(id)?.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_keep_insertion_order() {
        let mut m = Menu::new();
        let root = m.root();
        let a = m.add_button(root, 1, "a").unwrap();
        let f = m.add_folder(root, "f").unwrap();
        let b = m.add_toggle(f, 2, "b", 1).unwrap();
        assert_eq!(m.children(root), &[a, f]);
        assert_eq!(m.children(f), &[b]);
        assert_eq!(m.get(b).unwrap().parent(), Some(f));
    }

    #[test]
    fn adding_to_a_button_is_an_error() {
        let mut m = Menu::new();
        let root = m.root();
        let a = m.add_button(root, 1, "a").unwrap();
        assert!(matches!(m.add_button(a, 2, "b"), Err(MenuError::NotAFolder(_))));
    }

    #[test]
    fn sort_is_case_insensitive_and_stable() {
        let mut m = Menu::new();
        let root = m.root();
        m.add_button(root, 1, "beta").unwrap();
        m.add_button(root, 2, "Alpha").unwrap();
        m.add_button(root, 3, "alpha").unwrap();
        m.sort_children(root).unwrap();
        let ids: Vec<i32> = m.children(root).iter().map(|&c| m.get(c).unwrap().id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn visible_skips_collapsed_folders() {
        let mut m = Menu::new();
        let root = m.root();
        let f = m.add_folder(root, "f").unwrap();
        m.add_button(f, 1, "hidden").unwrap();
        m.add_button(root, 2, "shown").unwrap();
        assert_eq!(m.visible().len(), 2);
        m.get_mut(f).unwrap().is_expanded = true;
        let v = m.visible();
        assert_eq!(v.len(), 3);
        assert_eq!(v[1].1, 1);
    }

    #[test]
    fn add_all_moves_children() {
        let mut m = Menu::new();
        let root = m.root();
        let tmp = m.detached_folder();
        m.add_button(tmp, 1, "x").unwrap();
        m.add_button(tmp, 2, "y").unwrap();
        m.add_all(tmp, root).unwrap();
        assert_eq!(m.children(root).len(), 2);
        assert!(m.children(tmp).is_empty());
        assert_eq!(m.find_by_id(2), Some(m.children(root)[1]));
    }

    #[test]
    fn choice_values_map_to_indices() {
        let mut m = Menu::new();
        let root = m.root();
        let c = m.add_multiple_choice(root, 1, "c", &["a", "b"], 0).unwrap();
        let item = m.get_mut(c).unwrap();
        item.choices[1].value = 42;
        assert!(item.select_choice_value(42));
        assert_eq!(item.value, 1);
        assert_eq!(item.choice_value(), 42);
        assert_eq!(item.choice_label(), "b");
        assert!(!item.select_choice_value(7));
    }
}
