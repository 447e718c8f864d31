//! Builds the main menu tree for the running machine.
//!
//! Items the dispatcher or the settings code has to find again are returned
//! in `MenuHandles`. Anything machine specific is `None` when the machine
//! does not have it.

use log::debug;

use crate::error::Result;
use crate::ids::{self, HOTKEY_CHOICES, JOY_CHOICE_MOUSE, JOY_PORT_CHOICES};
use crate::item::{ItemId, Menu};
use crate::platform::{ColorAdj, Host, IntSetting, MachineClass};
use crate::settings::SHADER_ITEMS;

/// Items of one emulated display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayHandles {
    pub use_scaling_params: ItemId,
    pub palette: ItemId,
    /// In `ColorAdj::ALL` order. Saturation is missing on Plus4Emu.
    pub colors: [Option<ItemId>; 5],
    pub h_center: ItemId,
    pub v_center: ItemId,
    pub h_border: ItemId,
    pub v_border: ItemId,
    pub h_stretch: ItemId,
    pub v_stretch: ItemId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuHandles {
    pub warp: ItemId,
    pub autostart_warp: Option<ItemId>,
    pub iec_device: [Option<ItemId>; 4],
    pub tape_reset: ItemId,
    pub scaling_interp: ItemId,
    pub active_display: Option<ItemId>,
    pub pip_location: Option<ItemId>,
    pub pip_swapped: Option<ItemId>,
    pub displays: [Option<DisplayHandles>; 2],
    pub shader_enable: ItemId,
    /// In `SHADER_ITEMS` order.
    pub shader: [ItemId; 14],
    pub volume: ItemId,
    pub c40_80: Option<ItemId>,
    pub hotkeys: [ItemId; 8],
    /// One per joystick port the machine has.
    pub ports: Vec<ItemId>,
    pub gpio_config: ItemId,
    pub drive_sound: Option<ItemId>,
    pub drive_sound_volume: Option<ItemId>,
    pub overlay: ItemId,
    pub overlay_padding: ItemId,
    pub vkbd_trans: ItemId,
    pub reset_confirm: ItemId,
    pub dir_convention: ItemId,
}

impl MenuHandles {
    pub fn display(&self, n: usize) -> Option<&DisplayHandles> {
        self.displays.get(n).and_then(Option::as_ref)
    }
}

pub const DEFAULT_VICII_H_STRETCH: i32 = 1200;
pub const DEFAULT_VIC_H_STRETCH: i32 = 1600;
pub const DEFAULT_VDC_H_STRETCH: i32 = 1000;
pub const DEFAULT_V_STRETCH: i32 = 1000;

const PARALLEL_CABLES: [&str; 4] = ["None", "Standard", "DolphinDOS", "Formel64"];

const GPIO_CONFIGS: [(&str, i32); 6] = [
    ("Disabled", ids::GPIO_CONFIG_DISABLED),
    ("#1 (Nav+Joy)", ids::GPIO_CONFIG_NAV_JOY),
    ("#2 (Kyb+Joy)", ids::GPIO_CONFIG_KYB_JOY),
    ("#3 (Waveshare Hat)", ids::GPIO_CONFIG_WAVESHARE),
    ("#4 (Userport+Joy)", ids::GPIO_CONFIG_USERPORT),
    ("#5 (Custom)", ids::GPIO_CONFIG_CUSTOM),
];

pub(crate) const VIC20_MEMORY: [(i32, &str, IntSetting); 5] = [
    (ids::VIC20_MEMORY_3K, "3K (0400-0FFF)", IntSetting::VicRam3k),
    (ids::VIC20_MEMORY_8K_2000, "8K (2000-3FFF)", IntSetting::VicRam8k2000),
    (ids::VIC20_MEMORY_8K_4000, "8K (4000-5FFF)", IntSetting::VicRam8k4000),
    (ids::VIC20_MEMORY_8K_6000, "8K (6000-7FFF)", IntSetting::VicRam8k6000),
    (ids::VIC20_MEMORY_8K_A000, "8K (A000-BFFF)", IntSetting::VicRam8kA000),
];

const HOTKEY_LABELS: [&str; 8] = [
    "C= + F1 Hotkey",
    "C= + F3 Hotkey",
    "C= + F5 Hotkey",
    "C= + F7 Hotkey",
    "CTRL + F1 Hotkey",
    "CTRL + F3 Hotkey",
    "CTRL + F5 Hotkey",
    "CTRL + F7 Hotkey",
];

/// First line of the main menu: machine name and video timing.
pub fn machine_info(machine: MachineClass, timing: &str) -> String {
    format!("{} {}", machine.name(), timing)
}

fn add_choices(menu: &mut Menu, parent: ItemId, id: i32, name: &str, choices: &[(&str, i32)], value: i32) -> Result<ItemId> {
    let labels: Vec<&str> = choices.iter().map(|(label, _)| *label).collect();
    let item = menu.add_multiple_choice(parent, id, name, &labels, value)?;
    let it = menu.item_mut(item)?;
    for (choice, (_, backing)) in it.choices.iter_mut().zip(choices) {
        choice.value = *backing;
    }
    Ok(item)
}

fn add_joyport(menu: &mut Menu, parent: ItemId, port: usize, machine: MachineClass) -> Result<ItemId> {
    let choices: Vec<(&str, i32)> = JOY_PORT_CHOICES.iter().map(|(l, d)| (*l, d.as_i32())).collect();
    let item = add_choices(menu, parent, ids::JOYSTICK_PORT_1 + port as i32, &format!("Port {}", port + 1), &choices, 0)?;
    if machine == MachineClass::Plus4Emu || port > 1 {
        menu.item_mut(item)?.set_choice_disabled(JOY_CHOICE_MOUSE, true);
    }
    Ok(item)
}

fn add_drive<H: Host + ?Sized>(menu: &mut Menu, parent: ItemId, host: &H, unit: i32) -> Result<Option<ItemId>> {
    let machine = host.machine_class();
    let offset = unit - 8;
    let folder = menu.add_folder(parent, &format!("Drive {}", unit))?;
    menu.add_button(folder, ids::ATTACH_DISK + offset, "Attach Disk...")?;
    menu.add_button(folder, ids::DETACH_DISK + offset, "Detach Disk")?;
    let mut iec = None;
    if !matches!(machine, MachineClass::Vic20 | MachineClass::Pet) {
        let value = host.get_int(IntSetting::IecDevice(unit));
        iec = Some(menu.add_toggle(folder, ids::IECDEVICE + offset, "IEC FileSystem", value)?);
        menu.add_button(folder, ids::IECDIR + offset, "Select IEC Dir...")?;
    }
    if matches!(machine, MachineClass::C64 | MachineClass::C128) {
        let value = host.get_int(IntSetting::ParallelCable(unit));
        menu.add_multiple_choice(folder, ids::PARALLEL + offset, "Parallel Cable", &PARALLEL_CABLES, value)?;
    }
    if machine != MachineClass::Plus4Emu {
        menu.add_button(folder, ids::DRIVE_CHANGE_MODEL + offset, "Change Model...")?;
    }
    Ok(iec)
}

fn add_carts(menu: &mut Menu, root: ItemId, machine: MachineClass) -> Result<()> {
    let attach: &[(i32, &str)] = match machine {
        MachineClass::C64 | MachineClass::C128 => &[
            (ids::ATTACH_CART, "Attach cart..."),
            (ids::ATTACH_CART_8K, "Attach 8K raw..."),
            (ids::ATTACH_CART_16K, "Attach 16K raw..."),
            (ids::ATTACH_CART_ULTIMAX, "Attach Ultimax raw..."),
        ],
        MachineClass::Vic20 => &[
            (ids::VIC20_ATTACH_CART_GENERIC, "Attach cart (detect)..."),
            (ids::VIC20_ATTACH_CART_4000, "Attach 4000 cart..."),
            (ids::VIC20_ATTACH_CART_A000, "Attach A000 cart..."),
        ],
        MachineClass::Plus4 | MachineClass::Plus4Emu => &[
            (ids::PLUS4_ATTACH_CART_C0LO, "Attach C0 Low..."),
            (ids::PLUS4_ATTACH_CART_C0HI, "Attach C0 High..."),
        ],
        MachineClass::Pet => return Ok(()),
    };
    let folder = menu.add_folder(root, "Cartridge")?;
    for (id, label) in attach {
        menu.add_button(folder, *id, label)?;
    }
    menu.add_divider(folder)?;
    menu.add_button(folder, ids::DETACH_CART, "Detach cartridge")?;
    menu.add_button(folder, ids::MAKE_CART_DEFAULT, "Set current cart default (Need Save)")?;
    if matches!(machine, MachineClass::C64 | MachineClass::C128) {
        menu.add_button(folder, ids::CART_FREEZE, "Cartridge Freeze")?;
    }
    Ok(())
}

fn add_machine<H: Host + ?Sized>(menu: &mut Menu, root: ItemId, host: &H) -> Result<()> {
    let machine = host.machine_class();
    let folder = menu.add_folder(root, "Machine")?;
    if machine != MachineClass::Plus4Emu {
        menu.add_button(folder, ids::LOAD_KERNAL, "Load Kernal ROM...")?;
        menu.add_button(folder, ids::LOAD_BASIC, "Load Basic ROM...")?;
        menu.add_button(folder, ids::LOAD_CHARGEN, "Load Chargen ROM...")?;
    }
    if machine == MachineClass::Vic20 {
        let memory = menu.add_folder(folder, "Memory")?;
        for (id, label, setting) in VIC20_MEMORY {
            menu.add_toggle(memory, id, label, host.get_int(setting))?;
        }
    }
    Ok(())
}

fn add_display<H: Host + ?Sized>(menu: &mut Menu, parent: ItemId, host: &H, n: usize) -> Result<DisplayHandles> {
    let machine = host.machine_class();
    let offset = n as i32;
    let canvas = host.canvas(n);

    let use_scaling_params = menu.add_toggle_labels(
        parent,
        ids::USE_SCALING_PARAMS_0 + offset,
        "Apply scaling params at boot",
        1,
        "No",
        "Yes",
    )?;

    let names = host.palette_names(n);
    let labels: Vec<&str> = names.iter().map(String::as_str).collect();
    let palette = menu.add_multiple_choice(parent, ids::COLOR_PALETTE_0 + offset, "Color Palette", &labels, 0)?;

    let adjust = menu.add_folder(parent, "Color Adjustments...")?;
    let color_ids = [
        (ids::COLOR_BRIGHTNESS_0, "Brightness", 2000),
        (ids::COLOR_CONTRAST_0, "Contrast", 2000),
        (ids::COLOR_GAMMA_0, "Gamma", 4000),
        (ids::COLOR_TINT_0, "Tint", 2000),
        (ids::COLOR_SATURATION_0, "Saturation", 2000),
    ];
    let mut colors = [None; 5];
    for (i, (adj, (id, label, max))) in ColorAdj::ALL.iter().zip(color_ids).enumerate() {
        if *adj == ColorAdj::Saturation && machine == MachineClass::Plus4Emu {
            continue;
        }
        colors[i] = Some(menu.add_range(adjust, id + offset, label, 0, max, 10, host.color(n, *adj))?);
    }
    menu.add_button(adjust, ids::COLOR_RESET_0 + offset, "Reset")?;

    let default_h_stretch = match (machine, n) {
        (_, 1) => DEFAULT_VDC_H_STRETCH,
        (MachineClass::Vic20, _) => DEFAULT_VIC_H_STRETCH,
        _ => DEFAULT_VICII_H_STRETCH,
    };
    let max_stretch = if canvas.max_stretch_h > 0 { canvas.max_stretch_h } else { 1800 };

    let h_center = menu.add_range(parent, ids::H_CENTER_0 + offset, "H Center", -48, 48, 1, 0)?;
    let v_center = menu.add_range(parent, ids::V_CENTER_0 + offset, "V Center", -48, 48, 1, 0)?;
    let h_border = menu.add_range(
        parent,
        ids::H_BORDER_0 + offset,
        "H Border (px)",
        0,
        canvas.max_border_w,
        1,
        canvas.max_border_w,
    )?;
    let v_border = menu.add_range(
        parent,
        ids::V_BORDER_0 + offset,
        "V Border (px)",
        0,
        canvas.max_border_h,
        1,
        canvas.max_border_h,
    )?;
    let h_stretch = menu.add_range(
        parent,
        ids::H_STRETCH_0 + offset,
        "H Stretch Factor",
        500,
        max_stretch,
        5,
        default_h_stretch,
    )?;
    menu.item_mut(h_stretch)?.divisor = 1000;
    let v_stretch = menu.add_range(
        parent,
        ids::V_STRETCH_0 + offset,
        "V Stretch Factor",
        500,
        1000,
        5,
        DEFAULT_V_STRETCH,
    )?;
    menu.item_mut(v_stretch)?.divisor = 1000;

    menu.add_button(parent, ids::INTEGER_SCALE_W_0 + offset, "Next H Integer Scale")?;
    menu.add_button(parent, ids::INTEGER_SCALE_H_0 + offset, "Next V Integer Scale")?;

    Ok(DisplayHandles {
        use_scaling_params,
        palette,
        colors,
        h_center,
        v_center,
        h_border,
        v_border,
        h_stretch,
        v_stretch,
    })
}

fn add_shader(menu: &mut Menu, parent: ItemId, allow: bool) -> Result<(ItemId, [ItemId; 14])> {
    let folder = menu.add_folder(parent, "CRT Shader")?;
    let enable = menu.add_toggle_labels(folder, ids::SHADER_ENABLE, "Enable CRT Shader?", 0, "No", "Yes")?;
    if !allow {
        let item = menu.item_mut(enable)?;
        item.disabled = true;
        item.toggle_labels = Some(["Disabled".into(), "Disabled".into()]);
    }

    let curvature = menu.add_toggle(folder, ids::SHADER_CURVATURE, "Curvature", 0)?;
    let curvature_x = menu.add_range(folder, ids::SHADER_CURVATURE_X, "H Curvature Amount", 0, 30, 1, 10)?;
    let curvature_y = menu.add_range(folder, ids::SHADER_CURVATURE_Y, "V Curvature Amount", 0, 30, 1, 15)?;
    let sharper = menu.add_toggle(folder, ids::SHADER_SHARPER, "Sharper Horizontal Blend", 0)?;
    let mask = menu.add_multiple_choice(
        folder,
        ids::SHADER_MASK,
        "Mask Type",
        &["None", "Green/Magenta", "Trinitron"],
        0,
    )?;
    let mask_brightness = menu.add_range(folder, ids::SHADER_MASK_BRIGHTNESS, "Mask Brightness", 0, 100, 1, 70)?;
    let scanlines = menu.add_toggle(folder, ids::SHADER_SCANLINES, "Scanlines", 1)?;
    let weight = menu.add_range(folder, ids::SHADER_SCANLINE_WEIGHT, "Scanline Weight", 0, 150, 1, 60)?;
    let gap = menu.add_range(
        folder,
        ids::SHADER_SCANLINE_GAP_BRIGHTNESS,
        "Scanline Gap Brightness",
        0,
        100,
        1,
        12,
    )?;
    let multisample = menu.add_toggle(folder, ids::SHADER_MULTISAMPLE, "Multisample", 1)?;
    let bloom = menu.add_range(folder, ids::SHADER_BLOOM, "Bloom Factor", 0, 500, 10, 150)?;
    let gamma = menu.add_multiple_choice(
        folder,
        ids::SHADER_GAMMA,
        "Gamma Correction",
        &["Off", "On", "Fake (Fast)"],
        2,
    )?;
    let input_gamma = menu.add_range(folder, ids::SHADER_INPUT_GAMMA, "Input Gamma", 0, 500, 10, 240)?;
    let output_gamma = menu.add_range(folder, ids::SHADER_OUTPUT_GAMMA, "Output Gamma", 0, 500, 10, 220)?;
    menu.add_button(folder, ids::SHADER_RESET_ALL, "Reset")?;

    // Same order as the settings file.
    let by_id = [
        curvature,
        curvature_x,
        curvature_y,
        sharper,
        mask,
        mask_brightness,
        scanlines,
        multisample,
        weight,
        gap,
        bloom,
        gamma,
        input_gamma,
        output_gamma,
    ];
    debug_assert!(SHADER_ITEMS
        .iter()
        .zip(by_id.iter())
        .all(|((_, id, _), item)| menu.get(*item).map(|i| i.id) == Some(*id)));
    Ok((enable, by_id))
}

/// Fills `menu` with the main menu. Values start at their defaults or at
/// whatever the emulator currently reports; the settings file is applied
/// afterwards.
pub fn build_menu<H: Host + ?Sized>(menu: &mut Menu, host: &H, timing: &str) -> Result<MenuHandles> {
    let machine = host.machine_class();
    let root = menu.root();

    menu.add_button(root, ids::TEXT, &machine_info(machine, timing))?;
    menu.add_button(root, ids::ABOUT, "About...")?;
    menu.add_button(root, ids::LICENSE, "License...")?;
    menu.add_divider(root)?;

    let mut autostart_warp = None;
    match machine {
        MachineClass::Plus4Emu => {
            menu.add_button(root, ids::LOADPRG, "Load .PRG File...")?;
        }
        MachineClass::Pet => {}
        _ => {
            menu.add_button(root, ids::AUTOSTART, "Autostart Prg/Disk...")?;
            let warp = host.get_int(IntSetting::AutostartWarp);
            autostart_warp = Some(menu.add_toggle(root, ids::AUTOSTART_WARP, "Autostart Warp", warp)?);
        }
    }

    add_machine(menu, root, host)?;

    let drives = menu.add_folder(root, "Drives")?;
    let mut iec_device = [None; 4];
    // More than one drive is too slow on Plus4Emu.
    let units = if machine == MachineClass::Plus4Emu { 8..=8 } else { 8..=11 };
    for unit in units {
        iec_device[(unit - 8) as usize] = add_drive(menu, drives, host, unit)?;
    }
    if machine != MachineClass::Plus4Emu {
        menu.add_button(drives, ids::DRIVE_CHANGE_ROM, "Change ROM...")?;
        let create = menu.add_folder(drives, "Create empty Disk")?;
        for (i, (label, _)) in ids::DISK_KINDS.iter().enumerate() {
            menu.add_button(create, ids::CREATE_DISK + i as i32, &format!("{}...", label))?;
        }
    }

    add_carts(menu, root, machine)?;

    let tape = menu.add_folder(root, "Tape")?;
    menu.add_button(tape, ids::ATTACH_TAPE, "Attach tape image...")?;
    menu.add_button(tape, ids::DETACH_TAPE, "Detach tape image")?;
    let controls = menu.add_folder(tape, "Datasette controls (.tap)...")?;
    for (id, label) in [
        (ids::TAPE_PLAY, "Play"),
        (ids::TAPE_STOP, "Stop"),
        (ids::TAPE_REWIND, "Rewind"),
        (ids::TAPE_FASTFWD, "FastFwd"),
        (ids::TAPE_RECORD, "Record"),
        (ids::TAPE_RESET, "Reset"),
        (ids::TAPE_RESET_COUNTER, "Reset Counter"),
    ] {
        menu.add_button(controls, id, label)?;
    }
    let tape_reset = menu.add_toggle(
        controls,
        ids::TAPE_RESET_WITH_MACHINE,
        "Reset Tape with Machine Reset",
        host.get_int(IntSetting::TapeResetWithMachine),
    )?;
    menu.add_button(tape, ids::CREATE_TAP, "Create empty Tape...")?;

    menu.add_divider(root)?;

    if machine != MachineClass::Pet {
        let snaps = menu.add_folder(root, "Snapshots")?;
        menu.add_button(snaps, ids::LOAD_SNAP, "Load Snapshot...")?;
        menu.add_button(snaps, ids::SAVE_SNAP, "Save Snapshot...")?;
    }

    let video = menu.add_folder(root, "Video")?;
    let scaling_interp = menu.add_toggle_labels(
        video,
        ids::SCALING_INTERPOLATION,
        "Scaling Interpolation",
        1,
        "Off",
        "On",
    )?;

    let (mut active_display, mut pip_location, mut pip_swapped) = (None, None, None);
    let mut vic_parent = video;
    if machine == MachineClass::C128 {
        active_display = Some(menu.add_multiple_choice(
            video,
            ids::ACTIVE_DISPLAY,
            "Active Display",
            &["VICII", "VDC", "Side-By-Side", "PIP"],
            ids::ACTIVE_DISPLAY_VICII,
        )?);
        pip_location = Some(menu.add_multiple_choice(
            video,
            ids::PIP_LOCATION,
            "PIP Location",
            &["Top Left", "Top Right", "Bottom Right", "Bottom Left"],
            ids::PIP_TOP_RIGHT,
        )?);
        pip_swapped = Some(menu.add_toggle(video, ids::PIP_SWAPPED, "Swap PIP", 0)?);
        vic_parent = menu.add_folder(video, "VICII")?;
    }

    let (shader_enable, shader) = add_shader(menu, vic_parent, host.allow_shader())?;
    let vic = add_display(menu, vic_parent, host, 0)?;
    let vdc = if machine == MachineClass::C128 {
        let vdc_parent = menu.add_folder(video, "VDC")?;
        Some(add_display(menu, vdc_parent, host, 1)?)
    } else {
        None
    };

    let sound = menu.add_folder(root, "Sound")?;
    let volume = menu.add_range(sound, ids::VOLUME, "Volume ", 0, 100, 1, 100)?;

    let keyboard = menu.add_folder(root, "Keyboard")?;
    let c40_80 = if machine == MachineClass::C128 {
        Some(menu.add_toggle_labels(keyboard, ids::C40_80_COLUMN, "40/80 Column", 1, "Down", "Up")?)
    } else {
        None
    };
    let hotkey_labels: Vec<&str> = HOTKEY_CHOICES.iter().map(|f| f.label()).collect();
    let mut hotkeys = [menu.root(); 8];
    for (slot, label) in HOTKEY_LABELS.iter().enumerate() {
        let value = if slot % 4 == 3 { ids::HOTKEY_CHOICE_MENU } else { ids::HOTKEY_CHOICE_NONE };
        let item = menu.add_multiple_choice(keyboard, ids::HOTKEY_CF1 + slot as i32, label, &hotkey_labels, value)?;
        let it = menu.item_mut(item)?;
        for (choice, func) in it.choices.iter_mut().zip(HOTKEY_CHOICES) {
            choice.value = func.as_i32();
        }
        hotkeys[slot] = item;
    }

    let joyports = menu.add_folder(root, "Joyports")?;
    let num_joysticks = machine.num_joysticks();
    if num_joysticks > 1 {
        menu.add_button(joyports, ids::SWAP_JOYSTICKS, "Swap Joystick Ports")?;
    }
    let mut ports = Vec::with_capacity(num_joysticks);
    for port in 0..num_joysticks {
        ports.push(add_joyport(menu, joyports, port, machine)?);
    }
    for dev in 0..ids::MAX_USB_DEVICES {
        menu.add_button(
            joyports,
            ids::USB_0_CONFIGURE + dev as i32,
            &format!("Configure USB Gamepad {}...", dev + 1),
        )?;
    }
    menu.add_button(joyports, ids::CONFIGURE_KEYSET1, "Configure Keyset 1...")?;
    menu.add_button(joyports, ids::CONFIGURE_KEYSET2, "Configure Keyset 2...")?;

    let gpio = menu.add_folder(root, "GPIO")?;
    let gpio_config = add_choices(menu, gpio, ids::GPIO_CONFIG, "Config", &GPIO_CONFIGS, 0)?;
    {
        let userport = host.gpio_outputs_enabled() && !machine.is_plus4();
        let item = menu.item_mut(gpio_config)?;
        if !userport {
            item.choices[4].label = "#4 (N/A)".into();
        }
        if !host.gpio_enabled() {
            for i in 1..item.choices.len() {
                item.set_choice_disabled(i, true);
            }
        }
    }
    if host.gpio_enabled() {
        menu.add_button(gpio, ids::CONFIGURE_GPIO, "Configure Custom GPIO...")?;
    }

    menu.add_divider(root)?;

    let prefs = menu.add_folder(root, "Prefs")?;
    let (mut drive_sound, mut drive_sound_volume) = (None, None);
    if machine != MachineClass::Plus4Emu {
        drive_sound = Some(menu.add_toggle(
            prefs,
            ids::DRIVE_SOUND_EMULATION,
            "Drive sound emulation",
            host.get_int(IntSetting::DriveSoundEmulation),
        )?);
        drive_sound_volume = Some(menu.add_range(
            prefs,
            ids::DRIVE_SOUND_EMULATION_VOLUME,
            "Drive sound emulation volume",
            0,
            1000,
            100,
            host.get_int(IntSetting::DriveSoundEmulationVolume),
        )?);
    }
    let overlay = menu.add_multiple_choice(
        prefs,
        ids::OVERLAY,
        "Show Status Bar",
        &["Never", "Always", "On Activity"],
        ids::OVERLAY_NEVER,
    )?;
    let overlay_padding = menu.add_range(prefs, ids::OVERLAY_PADDING, "Status Bar Padding", 0, 64, 1, 0)?;
    let vkbd_trans = menu.add_range(prefs, ids::VKBD_TRANSPARENCY, "Keyboard Transparency %", 0, 50, 1, 0)?;
    let reset_confirm = menu.add_toggle(prefs, ids::RESET_CONFIRM, "Confirm Reset from Emulator", 1)?;
    let sub_dir = machine.sub_dir();
    let dir_convention = menu.add_toggle_labels(
        prefs,
        ids::DIR_CONVENTION,
        "Look for files in",
        ids::DIR_CONVENTION_FOLDER_EMU,
        &format!("/dir{}", sub_dir),
        &format!("{}/dir", sub_dir),
    )?;

    let warp = menu.add_toggle(root, ids::WARP_MODE, "Warp Mode", 0)?;

    let reset = menu.add_folder(root, "Reset")?;
    menu.add_button(reset, ids::SOFT_RESET, "Soft Reset")?;
    menu.add_button(reset, ids::HARD_RESET, "Hard Reset")?;

    menu.add_button(root, ids::SAVE_SETTINGS, "Save settings")?;

    debug!("built {} menu with {} items", machine.name(), menu.len());

    Ok(MenuHandles {
        warp,
        autostart_warp,
        iec_device,
        tape_reset,
        scaling_interp,
        active_display,
        pip_location,
        pip_swapped,
        displays: [Some(vic), vdc],
        shader_enable,
        shader,
        volume,
        c40_80,
        hotkeys,
        ports,
        gpio_config,
        drive_sound,
        drive_sound_volume,
        overlay,
        overlay_padding,
        vkbd_trans,
        reset_confirm,
        dir_convention,
    })
}

/// The About screen lines for a machine.
pub fn about_lines(machine: MachineClass) -> [String; 3] {
    let (short, long) = match machine {
        MachineClass::C64 => ("BMC64", "C64"),
        MachineClass::C128 => ("BMC128", "C128"),
        MachineClass::Vic20 => ("BMVIC20", "VIC20"),
        MachineClass::Plus4 | MachineClass::Plus4Emu => ("BMPLUS4", "PLUS/4"),
        MachineClass::Pet => ("BMPET", "PET"),
    };
    [
        format!("{} {}", short, env!("CARGO_PKG_VERSION")),
        format!("A Bare Metal {} Emulator", long),
        "For the Raspberry Pi".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NullHost;

    fn build(machine: MachineClass) -> (Menu, MenuHandles) {
        let host = NullHost::new(machine);
        let mut menu = Menu::new();
        let handles = build_menu(&mut menu, &host, "PAL 50Hz HDMI").unwrap();
        (menu, handles)
    }

    #[test]
    fn header_names_machine_and_timing() {
        let (menu, _) = build(MachineClass::C64);
        let first = menu.children(menu.root())[0];
        assert_eq!(menu.get(first).unwrap().name, "C64 PAL 50Hz HDMI");
    }

    #[test]
    fn c128_has_two_displays_and_layout_items() {
        let (menu, h) = build(MachineClass::C128);
        assert!(h.display(1).is_some());
        assert!(h.active_display.is_some() && h.c40_80.is_some());
        assert!(menu.find_by_id(ids::H_STRETCH_1).is_some());
        let vdc = h.display(1).unwrap();
        assert_eq!(menu.get(vdc.h_stretch).unwrap().value, DEFAULT_VDC_H_STRETCH);
    }

    #[test]
    fn c64_has_one_display() {
        let (menu, h) = build(MachineClass::C64);
        assert!(h.display(1).is_none());
        assert!(menu.find_by_id(ids::ACTIVE_DISPLAY).is_none());
        assert_eq!(h.ports.len(), 2);
        assert!(menu.find_by_id(ids::CART_FREEZE).is_some());
    }

    #[test]
    fn plus4emu_has_a_single_drive_and_no_saturation() {
        let (menu, h) = build(MachineClass::Plus4Emu);
        assert!(menu.find_by_id(ids::ATTACH_DISK + 1).is_none());
        assert!(menu.find_by_id(ids::LOADPRG).is_some());
        assert!(menu.find_by_id(ids::AUTOSTART).is_none());
        assert!(h.display(0).unwrap().colors[4].is_none());
        assert!(h.drive_sound.is_none());
    }

    #[test]
    fn vic20_gets_memory_and_one_port() {
        let (menu, h) = build(MachineClass::Vic20);
        assert_eq!(h.ports.len(), 1);
        assert!(menu.find_by_id(ids::VIC20_MEMORY_8K_A000).is_some());
        assert!(menu.find_by_id(ids::IECDEVICE).is_none());
        assert!(menu.find_by_id(ids::SWAP_JOYSTICKS).is_none());
    }

    #[test]
    fn shader_handles_follow_settings_order() {
        let (menu, h) = build(MachineClass::C64);
        for ((_, id, default), item) in SHADER_ITEMS.iter().zip(h.shader.iter()) {
            let it = menu.get(*item).unwrap();
            assert_eq!(it.id, *id);
            assert_eq!(it.value, *default);
        }
    }

    #[test]
    fn hotkeys_default_to_menu_on_f7() {
        let (menu, h) = build(MachineClass::C64);
        let cf7 = menu.get(h.hotkeys[3]).unwrap();
        assert_eq!(cf7.choice_value(), crate::ids::ButtonFn::Menu.as_i32());
        assert_eq!(menu.get(h.hotkeys[0]).unwrap().value, ids::HOTKEY_CHOICE_NONE);
    }

    #[test]
    fn gpio_choices_are_disabled_without_gpio() {
        let (menu, h) = build(MachineClass::C64);
        let cfg = menu.get(h.gpio_config).unwrap();
        assert!(!cfg.choices[0].disabled);
        assert!(cfg.choices[1..].iter().all(|c| c.disabled));
        assert!(menu.find_by_id(ids::CONFIGURE_GPIO).is_none());
    }

    #[test]
    fn mouse_only_on_first_two_ports() {
        let mut host = NullHost::new(MachineClass::C64);
        host.gpio = true;
        let mut menu = Menu::new();
        let h = build_menu(&mut menu, &host, "").unwrap();
        let port2 = menu.get(h.ports[1]).unwrap();
        assert!(!port2.choices[JOY_CHOICE_MOUSE].disabled);
        assert!(menu.find_by_id(ids::CONFIGURE_GPIO).is_some());
    }
}
