//! Draws menu levels into the UI layer's buffer.

use crate::font;
use crate::item::{ItemKind, MenuItem};
use crate::platform::{CanvasState, FbDims};
use crate::ui::{
    Ui, BG_COLOR, BORDER_COLOR, DISABLED_COLOR, FG_COLOR, HILITE_COLOR, TRANSPARENT_COLOR,
};

/// Palette index used to mark an exact integer scale in the reveal box.
const SCALE_OK_COLOR: u8 = 5;

/// What the geometry box drawn during a reveal needs to know.
#[derive(Clone, Copy, Debug)]
pub struct Reveal {
    /// Dimensions of the UI layer itself.
    pub ui: FbDims,
    /// Dimensions of the layer being adjusted.
    pub layer: FbDims,
    pub canvas: CanvasState,
}

/// Text shown right aligned on a row.
pub fn value_text(item: &MenuItem) -> Option<String> {
    match item.kind {
        ItemKind::Toggle => Some(match &item.toggle_labels {
            Some(labels) => labels[usize::from(item.value != 0)].clone(),
            None => if item.value != 0 { "On" } else { "Off" }.to_string(),
        }),
        ItemKind::Checkbox => Some(if item.value != 0 { "True" } else { "False" }.to_string()),
        ItemKind::Range => Some(if item.divisor == 1 {
            item.value.to_string()
        } else {
            format!("{:.3}", item.value as f32 / item.divisor as f32)
        }),
        ItemKind::MultipleChoice => Some(item.choice_label().to_string()),
        ItemKind::Button => Some(button_text(item)),
        _ => None,
    }
}

fn button_text(item: &MenuItem) -> String {
    if item.prefer_str || !item.displayed_value.is_empty() {
        item.displayed_value.clone()
    } else if let Some(map) = item.map_value {
        map(item.value).to_string()
    } else {
        item.value.to_string()
    }
}

impl Ui {
    /// Fills the whole buffer with the transparent colour.
    pub fn make_transparent(&mut self) {
        self.fb.clear(TRANSPARENT_COLOR);
    }

    /// Draws one level's visible rows over whatever is in the buffer.
    pub fn render_level(&mut self, index: usize, reveal: Option<&Reveal>) {
        let Some(level) = self.stack.level_mut(index) else { return };
        level.traverse();
        let (left, top, width, height) = (level.left, level.top, level.width, level.height);
        let (cursor, window_top, window_bottom) = (level.cursor, level.window_top, level.window_bottom);

        if !self.transparent {
            self.fb.draw_rect(left, top, width, height, BG_COLOR, true);
        }
        self.fb.draw_rect(left - 1, top - 1, width + 2, height + 2, BORDER_COLOR, false);

        let Some(level) = self.stack.level(index) else { return };
        let rows = level.menu.visible();
        for (row, (id, depth)) in rows.iter().enumerate() {
            let row = row as i32;
            if row < window_top || row >= window_bottom {
                continue;
            }
            let Some(item) = level.menu.get(*id) else { continue };
            let indent = *depth as i32;
            let colour = if item.disabled { DISABLED_COLOR } else { FG_COLOR };
            let y = (row - window_top) * 8 + top;
            if row == cursor {
                self.fb.draw_rect(left, y, width, 8, HILITE_COLOR, true);
            }
            if let Some(sym) = item.symbol {
                self.fb.draw_char(sym, left + indent * 8, y, colour, 1);
            }
            if self.render_current_only && row != cursor {
                continue;
            }
            self.fb.draw_text(&item.name, left + (indent + 1) * 8, y, colour, 1);
            match item.kind {
                ItemKind::Folder => {
                    let mark = if item.is_expanded { "-" } else { "+" };
                    self.fb.draw_text(mark, left + indent * 8, y, colour, 1);
                }
                ItemKind::Divider => {
                    self.fb.draw_rect(left, y + 3, width, 2, BORDER_COLOR, true);
                }
                ItemKind::TextField => {
                    let x = left + font::text_width(&item.name) + 8;
                    self.fb.draw_rect(x + item.value * 8, y, 8, 8, BORDER_COLOR, true);
                    self.fb.draw_text(&item.str_value, x, y, colour, 1);
                }
                _ => {
                    if let Some(text) = value_text(item) {
                        let x = left + width - font::text_width(&text);
                        self.fb.draw_text(&text, x, y, colour, 1);
                    }
                }
            }
        }

        if self.transparent && self.transparent_layer.is_some() {
            if let Some(reveal) = reveal {
                self.draw_reveal_box(reveal);
            }
        }
    }

    fn draw_reveal_box(&mut self, r: &Reveal) {
        let cx = r.canvas.left + r.ui.src_w / 2 - 18 * 8 / 2;
        let cy = r.canvas.top + r.ui.src_h / 2 - 7 * 10 / 2;
        let (sw, sh, dw, dh) = (r.layer.src_w.max(1), r.layer.src_h.max(1), r.layer.dst_w, r.layer.dst_h);
        let fb = &mut self.fb;

        let mut y = cy;
        fb.draw_shadow_text(&format!("Display: {}x{}", r.layer.display_w, r.layer.display_h), cx, y, FG_COLOR);
        y += 10;
        fb.draw_shadow_text(&format!("FB: {} x {}", sw, sh), cx, y, FG_COLOR);

        // Green where the scaled size is an exact multiple.
        y += 10;
        let w_ok = dw % sw == 0;
        let h_ok = dh % sh == 0;
        let colour = |ok: bool| if ok { SCALE_OK_COLOR } else { FG_COLOR };
        let mut x = fb.draw_shadow_text("SFB:", cx, y, FG_COLOR) + 8;
        x = fb.draw_shadow_text(&dw.to_string(), x, y, colour(w_ok));
        x = fb.draw_shadow_text("x", x, y, FG_COLOR);
        x = fb.draw_shadow_text(&dh.to_string(), x, y, colour(h_ok)) + 8;
        x = if w_ok {
            fb.draw_shadow_text(&format!("x{},", dw / sw), x, y, SCALE_OK_COLOR)
        } else {
            fb.draw_shadow_text("*", x, y, FG_COLOR)
        };
        if h_ok {
            fb.draw_shadow_text(&format!("x{}", dh / sh), x, y, SCALE_OK_COLOR);
        } else {
            fb.draw_shadow_text("*", x, y, FG_COLOR);
        }

        y += 20;
        fb.draw_shadow_text("Use , and . for", cx, y, FG_COLOR);
        y += 10;
        fb.draw_shadow_text("-/+1 increments.", cx, y, FG_COLOR);
    }

    /// Clears to transparent and draws only the top level.
    pub fn render_now(&mut self, reveal: Option<&Reveal>) {
        self.make_transparent();
        let top = self.stack.current_index();
        self.render_level(top, reveal);
    }

    /// Clears to transparent and draws every level from the main menu up,
    /// so OSD popups sit on top of each other.
    pub fn render_all(&mut self, reveal: Option<&Reveal>) {
        self.make_transparent();
        for index in 0..self.stack.depth() {
            self.render_level(index, reveal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Menu;

    fn one_item(build: impl FnOnce(&mut Menu) -> crate::item::ItemId) -> MenuItem {
        let mut m = Menu::new();
        let id = build(&mut m);
        m.get(id).unwrap().clone()
    }

    #[test]
    fn value_texts() {
        let t = one_item(|m| {
            let r = m.root();
            m.add_toggle_labels(r, 1, "t", 1, "No", "Yes").unwrap()
        });
        assert_eq!(value_text(&t).as_deref(), Some("Yes"));
        let r = one_item(|m| {
            let root = m.root();
            let id = m.add_range(root, 1, "r", 500, 1800, 5, 1250).unwrap();
            m.get_mut(id).unwrap().divisor = 1000;
            id
        });
        assert_eq!(value_text(&r).as_deref(), Some("1.250"));
        let b = one_item(|m| {
            let root = m.root();
            let id = m.add_button_with_value(root, 1, "b", 8, "", "").unwrap();
            m.get_mut(id).unwrap().map_value = Some(|v| v * 2);
            id
        });
        assert_eq!(value_text(&b).as_deref(), Some("16"));
    }

    #[test]
    fn cursor_row_is_hilited() {
        let canvas = CanvasState::default();
        let mut ui = Ui::new(&canvas).unwrap();
        {
            let lvl = ui.stack.current_mut().unwrap();
            let root = lvl.root();
            lvl.menu.add_button(root, 1, "first").unwrap();
            lvl.menu.add_button(root, 2, "second").unwrap();
        }
        ui.render_all(None);
        let (left, top) = {
            let l = ui.stack.current().unwrap();
            (l.left, l.top)
        };
        // right edge of the first row is hilite, the second row background
        assert_eq!(ui.fb.pixel(left + 300, top + 1), Some(HILITE_COLOR));
        assert_eq!(ui.fb.pixel(left + 300, top + 9), Some(BG_COLOR));
        assert_eq!(ui.fb.pixel(left - 1, top - 1), Some(BORDER_COLOR));
    }

    #[test]
    fn current_only_skips_other_labels() {
        let canvas = CanvasState::default();
        let mut ui = Ui::new(&canvas).unwrap();
        {
            let lvl = ui.stack.current_mut().unwrap();
            let root = lvl.root();
            lvl.menu.add_button(root, 1, "####").unwrap();
            lvl.menu.add_button(root, 2, "####").unwrap();
        }
        ui.render_current_only = true;
        ui.transparent = true;
        ui.render_all(None);
        let l = ui.stack.current().unwrap();
        let (left, top) = (l.left, l.top);
        let row1: Vec<u8> = (0..40).filter_map(|x| ui.fb.pixel(left + 8 + x, top + 9)).collect();
        assert!(row1.iter().all(|&p| p == TRANSPARENT_COLOR));
        let row0: Vec<u8> = (0..40).filter_map(|x| ui.fb.pixel(left + 8 + x, top + 1)).collect();
        assert!(row0.iter().any(|&p| p == FG_COLOR));
    }
}
