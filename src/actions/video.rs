//! Display layout, geometry, integer scaling, colours and the CRT shader.

use log::{debug, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids;
use crate::item::ItemId;
use crate::menu::DisplayHandles;
use crate::platform::{ColorAdj, FbLayer, Host, MachineClass, ShaderParams, VideoGeometry};
use crate::runtime::MenuRuntime;
use crate::settings::SHADER_ITEMS;
use crate::ui::Changed;

/// Integer scaling state of both displays. Index 0 is the VIC layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoState {
    pub enabled: [bool; 2],
    /// The layer is on screen right now. Changing shader parameters hides
    /// the VIC layer until the next emulated frame.
    pub showing: [bool; 2],
    pub h_int: [i32; 2],
    pub v_int: [i32; 2],
    pub use_h_int: [bool; 2],
    pub use_v_int: [bool; 2],
}

impl VideoState {
    pub fn new() -> Self {
        VideoState {
            enabled: [true, false],
            showing: [true, false],
            ..Default::default()
        }
    }
}

// Left, right, top and bottom padding of the small picture per PIP corner.
const PIP_PADS: [[i32; 4]; 4] = [[5, 65, 5, 65], [65, 5, 5, 65], [65, 5, 65, 5], [5, 65, 65, 5]];

// Indices into `MenuHandles::shader`.
const S_CURVATURE: usize = 0;
const S_CURVATURE_X: usize = 1;
const S_CURVATURE_Y: usize = 2;
const S_SHARPER: usize = 3;
const S_MASK: usize = 4;
const S_MASK_BRIGHTNESS: usize = 5;
const S_SCANLINES: usize = 6;
const S_MULTISAMPLE: usize = 7;
const S_WEIGHT: usize = 8;
const S_GAP: usize = 9;
const S_BLOOM: usize = 10;
const S_GAMMA: usize = 11;
const S_INPUT_GAMMA: usize = 12;
const S_OUTPUT_GAMMA: usize = 13;

const MASK_TRINITRON: i32 = 2;
const GAMMA_OFF: i32 = 0;
const GAMMA_FAKE: i32 = 2;

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    d.register(ids::ACTIVE_DISPLAY, layout_changed);
    d.register(ids::PIP_LOCATION, layout_changed);
    d.register(ids::PIP_SWAPPED, layout_changed);
    d.register(ids::SCALING_INTERPOLATION, interpolation_changed);
    for base in [
        ids::H_CENTER_0,
        ids::V_CENTER_0,
        ids::H_BORDER_0,
        ids::V_BORDER_0,
        ids::H_STRETCH_0,
        ids::V_STRETCH_0,
    ] {
        d.register_range(base..base + 2, geometry_changed);
    }
    d.register_range(ids::INTEGER_SCALE_W_0..ids::INTEGER_SCALE_W_0 + 2, next_integer_scale);
    d.register_range(ids::INTEGER_SCALE_H_0..ids::INTEGER_SCALE_H_0 + 2, next_integer_scale);
    d.register_range(ids::USE_SCALING_PARAMS_0..ids::USE_SCALING_PARAMS_0 + 2, use_scaling_params);
    d.register_range(ids::COLOR_PALETTE_0..ids::COLOR_PALETTE_0 + 2, palette_changed);
    for base in [
        ids::COLOR_BRIGHTNESS_0,
        ids::COLOR_CONTRAST_0,
        ids::COLOR_GAMMA_0,
        ids::COLOR_TINT_0,
        ids::COLOR_SATURATION_0,
    ] {
        d.register_range(base..base + 2, color_changed);
    }
    d.register_range(ids::COLOR_RESET_0..ids::COLOR_RESET_0 + 2, color_reset);
    d.register(ids::SHADER_ENABLE, shader_enable);
    for (_, id, _) in SHADER_ITEMS {
        d.register(id, shader_param);
    }
    d.register(ids::SHADER_RESET_ALL, shader_reset);
}

fn display_handles<H: Host>(rt: &MenuRuntime<H>, n: usize) -> Option<DisplayHandles> {
    rt.handles.display(n).copied()
}

/// Places display `n` according to its items and the active layout.
pub fn apply_video<H: Host>(rt: &mut MenuRuntime<H>, n: usize) -> Result<()> {
    let Some(d) = display_handles(rt, n) else { return Ok(()) };
    let base = VideoGeometry {
        h_center: rt.value(d.h_center),
        v_center: rt.value(d.v_center),
        h_border: rt.value(d.h_border),
        v_border: rt.value(d.v_border),
        h_stretch: rt.value(d.h_stretch),
        v_stretch: rt.value(d.v_stretch),
        h_integer: rt.video.h_int[n],
        v_integer: rt.video.v_int[n],
        use_h_integer: rt.video.use_h_int[n],
        use_v_integer: rt.video.use_v_int[n],
        pad: [0; 4],
        zlayer: 0,
    };
    let mut geom = base;

    if rt.machine() == MachineClass::C128 {
        let mode = rt.handles.active_display.map_or(ids::ACTIVE_DISPLAY_VICII, |i| rt.value(i));
        let location = rt.handles.pip_location.map_or(ids::PIP_TOP_RIGHT, |i| rt.value(i));
        let swapped = rt.handles.pip_swapped.map_or(false, |i| rt.value(i) != 0);
        match mode {
            ids::ACTIVE_DISPLAY_VICII if n == 0 => {}
            ids::ACTIVE_DISPLAY_VDC if n == 1 => geom.zlayer = 1,
            ids::ACTIVE_DISPLAY_SIDE_BY_SIDE => {
                geom.use_h_integer = false;
                geom.use_v_integer = false;
                geom.h_center = 0;
                geom.v_center = 0;
                geom.h_stretch = -geom.h_stretch;
                geom.pad = if n == 0 { [0, 50, 0, 0] } else { [50, 0, 0, 0] };
                geom.zlayer = n as i32;
            }
            ids::ACTIVE_DISPLAY_PIP => {
                let full = usize::from(swapped);
                if n != full {
                    geom.use_h_integer = false;
                    geom.use_v_integer = false;
                    geom.h_center = 0;
                    geom.v_center = 0;
                    geom.pad = PIP_PADS[location.clamp(0, 3) as usize];
                    geom.zlayer = 1;
                }
            }
            _ => {
                debug!("display {} not part of layout {}", n, mode);
                return Ok(());
            }
        }
    }

    rt.host.set_video_geometry(FbLayer::display(n), &geom);
    if n == 0 {
        // The menu follows the VIC picture.
        let ui = VideoGeometry { zlayer: 3, ..base };
        rt.host.set_video_geometry(FbLayer::Ui, &ui);
    }
    Ok(())
}

/// Shows the layers the active display mode needs and places them.
pub fn apply_layout<H: Host>(rt: &mut MenuRuntime<H>) -> Result<()> {
    let Some(item) = rt.handles.active_display else {
        rt.video.enabled = [true, false];
        rt.video.showing[0] = true;
        return apply_video(rt, 0);
    };
    let mode = rt.value(item);
    let location = rt.handles.pip_location.map_or(ids::PIP_TOP_RIGHT, |i| rt.value(i));
    let swapped = rt.handles.pip_swapped.map_or(false, |i| rt.value(i) != 0);
    rt.video.enabled = match mode {
        ids::ACTIVE_DISPLAY_VICII => [true, false],
        ids::ACTIVE_DISPLAY_VDC => [false, true],
        _ => [true, true],
    };
    for (n, on) in rt.video.enabled.into_iter().enumerate() {
        let layer = FbLayer::display(n);
        if on {
            rt.host.show_fbl(layer);
        } else {
            rt.host.hide_fbl(layer);
        }
        rt.video.showing[n] = on;
    }
    rt.host.set_display_layout(mode, location, swapped);
    for n in 0..2 {
        if rt.video.enabled[n] {
            apply_video(rt, n)?;
        }
    }
    Ok(())
}

fn layout_changed<H: Host>(rt: &mut MenuRuntime<H>, _ev: &Changed) -> Result<()> {
    apply_layout(rt)
}

fn geometry_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let Some((base, n)) = ids::display_of(ev.id) else { return Ok(()) };
    let Some(d) = display_handles(rt, n) else { return Ok(()) };
    match base {
        ids::H_STRETCH_0 | ids::H_BORDER_0 => {
            rt.video.use_h_int[n] = false;
            rt.set_value(d.use_scaling_params, 0);
        }
        ids::V_STRETCH_0 | ids::V_BORDER_0 => {
            rt.video.use_v_int[n] = false;
            rt.set_value(d.use_scaling_params, 0);
        }
        _ => {}
    }
    rt.reveal(n);
    apply_video(rt, n)
}

fn ceil_div(a: i32, b: i32) -> i32 {
    if b <= 0 {
        return 0;
    }
    (a + b - 1) / b
}

/// Clamps `value` into the range of `item`. Returns the message to show
/// if it had to.
fn clamp_border<H: Host>(
    rt: &mut MenuRuntime<H>,
    item: ItemId,
    value: i32,
    too_large: &'static str,
    too_small: &'static str,
) -> Option<&'static str> {
    let (min, max) = rt.ui.main_item(item).map_or((0, 0), |i| (i.min, i.max));
    let (value, problem) = if value > max {
        (max, Some(too_large))
    } else if value < min {
        (min, Some(too_small))
    } else {
        (value, None)
    };
    rt.set_value(item, value);
    problem
}

/// Applies the boot scaling parameters of display `n`. Returns false,
/// after telling the user unless `silent`, when they cannot be used.
pub fn use_int_scaling<H: Host>(rt: &mut MenuRuntime<H>, n: usize, silent: bool) -> Result<bool> {
    let Some(d) = display_handles(rt, n) else { return Ok(false) };
    let params = rt.host.scaling_params(n).unwrap_or_default();
    let dims = rt.host.fbl_dimensions(FbLayer::display(n));
    let canvas = rt.host.canvas(n);

    let problem = if params.fbw <= 0 || params.fbh <= 0 || params.sx <= 0 || params.sy <= 0 {
        Some("Bad or missing params")
    } else if params.fbw % 2 != 0 {
        Some("fbw must be even")
    } else if params.fbh % 2 != 0 {
        Some("fbh must be even")
    } else if params.sx > dims.display_w {
        Some("sx too large for display")
    } else if params.sy > dims.display_h {
        Some("sy too large for display")
    } else {
        None
    };
    let problem = problem.or_else(|| {
        rt.video.h_int[n] = params.sx;
        rt.video.v_int[n] = params.sy;
        let h = clamp_border(rt, d.h_border, (params.fbw - canvas.gfx_w) / 2, "fbw too large", "fbw too small");
        let v = clamp_border(rt, d.v_border, (params.fbh - canvas.gfx_h) / 2, "fbh too large", "fbh too small");
        h.or(v)
    });
    if let Some(msg) = problem {
        warn!("scaling params of display {}: {}", n, msg);
        if !silent {
            rt.error(msg)?;
        }
        return Ok(false);
    }

    rt.set_value(d.h_stretch, ceil_div(params.sx * 1000, dims.display_h));
    rt.set_value(d.v_stretch, ceil_div(params.sy * 1000, dims.display_h));
    rt.video.use_h_int[n] = true;
    rt.video.use_v_int[n] = true;
    Ok(true)
}

fn use_scaling_params<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    if ev.value == 0 {
        return Ok(());
    }
    let n = (ev.id - ids::USE_SCALING_PARAMS_0) as usize;
    if use_int_scaling(rt, n, false)? {
        rt.reveal(n);
        apply_video(rt, n)
    } else {
        if let Some(d) = display_handles(rt, n) {
            rt.set_value(d.use_scaling_params, 0);
        }
        Ok(())
    }
}

/// Steps display `n` to the next whole multiple of its source size along
/// one axis, wrapping to 1x once the display is full.
pub fn next_integer_scaling<H: Host>(rt: &mut MenuRuntime<H>, n: usize, horizontal: bool) -> Result<()> {
    let Some(d) = display_handles(rt, n) else { return Ok(()) };
    let dims = rt.host.fbl_dimensions(FbLayer::display(n));
    let (src, scaled, max) = if horizontal {
        (dims.src_w, dims.dst_w, dims.display_w)
    } else {
        (dims.src_h, dims.dst_h, dims.display_h)
    };
    if src <= 0 {
        return Ok(());
    }
    let mut next = src * (scaled / src + 1);
    if next > max {
        next = src;
    }
    let stretch = ceil_div(next * 1000, dims.display_h);
    if horizontal {
        rt.set_value(d.h_stretch, stretch);
        rt.video.h_int[n] = next;
        rt.video.use_h_int[n] = true;
    } else {
        rt.set_value(d.v_stretch, stretch);
        rt.video.v_int[n] = next;
        rt.video.use_v_int[n] = true;
    }
    rt.reveal(n);
    apply_video(rt, n)
}

fn next_integer_scale<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let Some((base, n)) = ids::display_of(ev.id) else { return Ok(()) };
    next_integer_scaling(rt, n, base == ids::INTEGER_SCALE_W_0)
}

fn palette_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let n = (ev.id - ids::COLOR_PALETTE_0) as usize;
    rt.host.set_palette(n, ev.value);
    Ok(())
}

fn color_adj(base: i32) -> Option<ColorAdj> {
    Some(match base {
        ids::COLOR_BRIGHTNESS_0 => ColorAdj::Brightness,
        ids::COLOR_CONTRAST_0 => ColorAdj::Contrast,
        ids::COLOR_GAMMA_0 => ColorAdj::Gamma,
        ids::COLOR_TINT_0 => ColorAdj::Tint,
        ids::COLOR_SATURATION_0 => ColorAdj::Saturation,
        _ => return None,
    })
}

fn color_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let Some((base, n)) = ids::display_of(ev.id) else { return Ok(()) };
    let Some(adj) = color_adj(base) else { return Ok(()) };
    rt.reveal(n);
    rt.host.set_color(n, adj, ev.value);
    Ok(())
}

fn color_reset<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let n = (ev.id - ids::COLOR_RESET_0) as usize;
    let Some(d) = display_handles(rt, n) else { return Ok(()) };
    for (adj, item) in ColorAdj::ALL.iter().zip(d.colors) {
        let Some(item) = item else { continue };
        let value = rt.host.default_color(n, *adj);
        rt.set_value(item, value);
        rt.host.set_color(n, *adj, value);
    }
    Ok(())
}

fn interpolation_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.reveal(0);
    rt.host.set_interpolation(ev.value != 0);
    if rt.value(rt.handles.shader_enable) != 0 {
        shader_sanity(rt, ev.id);
        set_shader(rt);
    }
    Ok(())
}

/// Greys out shader items that have no effect with the current values
/// and resolves the scanline / Trinitron conflict in favour of `changed`.
pub fn shader_sanity<H: Host>(rt: &mut MenuRuntime<H>, changed: i32) {
    let s = rt.handles.shader;
    let enabled = rt.value(rt.handles.shader_enable) != 0;
    let v = |rt: &MenuRuntime<H>, i: usize| rt.value(s[i]);

    if changed == ids::SHADER_SCANLINES && v(rt, S_SCANLINES) != 0 && v(rt, S_MASK) == MASK_TRINITRON {
        rt.set_value(s[S_MASK], 0);
    } else if changed == ids::SHADER_MASK && v(rt, S_MASK) == MASK_TRINITRON && v(rt, S_SCANLINES) != 0 {
        rt.set_value(s[S_SCANLINES], 0);
    }

    let mut disabled = [!enabled; 14];
    if v(rt, S_CURVATURE) == 0 {
        disabled[S_CURVATURE_X] = true;
        disabled[S_CURVATURE_Y] = true;
    }
    if v(rt, S_SCANLINES) == 0 {
        for i in [S_MULTISAMPLE, S_GAMMA, S_WEIGHT, S_GAP, S_BLOOM] {
            disabled[i] = true;
        }
    }
    let gamma = v(rt, S_GAMMA);
    if disabled[S_GAMMA] || gamma == GAMMA_OFF || gamma == GAMMA_FAKE {
        disabled[S_INPUT_GAMMA] = true;
        disabled[S_OUTPUT_GAMMA] = true;
    }
    if v(rt, S_MASK) == 0 {
        disabled[S_MASK_BRIGHTNESS] = true;
    }
    for (item, off) in s.iter().zip(disabled) {
        if let Some(it) = rt.ui.main_item_mut(*item) {
            it.disabled = off;
        }
    }
}

pub fn shader_params<H: Host>(rt: &MenuRuntime<H>) -> ShaderParams {
    let s = rt.handles.shader;
    let v = |i: usize| rt.value(s[i]);
    ShaderParams {
        curvature: v(S_CURVATURE) != 0,
        curvature_x: v(S_CURVATURE_X),
        curvature_y: v(S_CURVATURE_Y),
        mask: v(S_MASK),
        mask_brightness: v(S_MASK_BRIGHTNESS),
        gamma: v(S_GAMMA) != GAMMA_OFF,
        fake_gamma: v(S_GAMMA) == GAMMA_FAKE,
        scanlines: v(S_SCANLINES) != 0,
        multisample: v(S_MULTISAMPLE) != 0,
        scanline_weight: v(S_WEIGHT),
        scanline_gap_brightness: v(S_GAP),
        bloom_factor: v(S_BLOOM),
        input_gamma: v(S_INPUT_GAMMA),
        output_gamma: v(S_OUTPUT_GAMMA),
        sharper: v(S_SHARPER) != 0,
        bilinear: rt.value(rt.handles.scaling_interp) != 0,
    }
}

/// Hands the shader items to the platform. This hides the VIC layer until
/// the emulator draws again.
pub fn set_shader<H: Host>(rt: &mut MenuRuntime<H>) {
    let params = shader_params(rt);
    rt.host.set_shader(&params);
    rt.video.showing[0] = false;
}

fn shader_enable<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    shader_sanity(rt, ev.id);
    rt.reveal(0);
    // The item may claim more than the platform allows.
    let on = rt.host.allow_shader() && ev.value != 0;
    rt.host.realloc_fbl(FbLayer::Vic, on);
    set_shader(rt);
    Ok(())
}

fn shader_param<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    shader_sanity(rt, ev.id);
    rt.reveal(0);
    set_shader(rt);
    Ok(())
}

fn shader_reset<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.reveal(0);
    let items = rt.handles.shader;
    for ((_, _, default), item) in SHADER_ITEMS.iter().zip(items) {
        rt.set_value(item, *default);
    }
    shader_sanity(rt, ev.id);
    set_shader(rt);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_div_rounds_up() {
        assert_eq!(ceil_div(1920 * 1000, 1080), 1778);
        assert_eq!(ceil_div(1080 * 1000, 1080), 1000);
        assert_eq!(ceil_div(5, 0), 0);
    }

    #[test]
    fn pip_corners_leave_two_thirds_free() {
        for pad in PIP_PADS {
            assert_eq!(pad[0] + pad[1], 70);
            assert_eq!(pad[2] + pad[3], 70);
        }
    }

    #[test]
    fn shader_indices_match_the_settings_table() {
        assert_eq!(SHADER_ITEMS[S_MASK].1, ids::SHADER_MASK);
        assert_eq!(SHADER_ITEMS[S_SCANLINES].1, ids::SHADER_SCANLINES);
        assert_eq!(SHADER_ITEMS[S_GAMMA].1, ids::SHADER_GAMMA);
        assert_eq!(SHADER_ITEMS[S_OUTPUT_GAMMA].1, ids::SHADER_OUTPUT_GAMMA);
        assert_eq!(SHADER_ITEMS[S_BLOOM].1, ids::SHADER_BLOOM);
    }
}
