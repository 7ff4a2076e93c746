//! X input mappings.

use x11_dl::keysym;
use x11_dl::xlib;

use serde::{Deserialize, Serialize};

/// Auto implement map.
macro_rules! key_map {
    (
        $name:ident {
            $(
                $field:ident => $sym:expr,
            )*
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
        pub enum $name {
            $($field,)*
            Unknown
        }

        impl From<$name> for u32 {
            fn from(sym: $name) -> Self {
                match sym {
                    $(
                        $name::$field => $sym,
                    )*
                    _ => 0
                }
            }
        }
    };
}

key_map! {
    Key {
        A => keysym::XK_a,
        B => keysym::XK_b,
        C => keysym::XK_c,
        D => keysym::XK_d,
        E => keysym::XK_e,
        F => keysym::XK_f,
        G => keysym::XK_g,
        H => keysym::XK_h,
        I => keysym::XK_i,
        J => keysym::XK_j,
        K => keysym::XK_k,
        L => keysym::XK_l,
        M => keysym::XK_m,
        N => keysym::XK_n,
        O => keysym::XK_o,
        P => keysym::XK_p,
        Q => keysym::XK_q,
        R => keysym::XK_r,
        S => keysym::XK_s,
        T => keysym::XK_t,
        U => keysym::XK_u,
        V => keysym::XK_v,
        W => keysym::XK_w,
        X => keysym::XK_x,
        Y => keysym::XK_y,
        Z => keysym::XK_z,
        Return => keysym::XK_Return,
        Escape => keysym::XK_Escape,
        Space => keysym::XK_space,
        Tab => keysym::XK_Tab,
        F1 => keysym::XK_F1,
        F2 => keysym::XK_F2,
        F3 => keysym::XK_F3,
        F4 => keysym::XK_F4,
    }
}

key_map! {
    Button {
        Left => xlib::Button1,
        Middle => xlib::Button2,
        Right => xlib::Button3,
    }
}

key_map! {
    ModifierMask {
        Mod1 => xlib::Mod1Mask,  // Alt
        Mod2 => xlib::Mod2Mask,  // Num Lock
        Mod3 => xlib::Mod3Mask,  // Scroll Lock
        Mod4 => xlib::Mod4Mask,  // Super
        Shift => xlib::ShiftMask,
        CapsLock => xlib::LockMask,
        Control => xlib::ControlMask,
    }
}

/// Combine a list of modifiers into a single mask.
pub fn modifier_mask(modifiers: &[ModifierMask]) -> u32 {
    modifiers
        .iter()
        .fold(0, |mask, modifier| mask | u32::from(*modifier))
}

/// Strip Caps Lock and Num Lock from an event state so bindings match with
/// either lock active.
pub fn clean_mask(state: u32) -> u32 {
    state
        & !(xlib::LockMask | xlib::Mod2Mask)
        & (xlib::ShiftMask
            | xlib::ControlMask
            | xlib::Mod1Mask
            | xlib::Mod3Mask
            | xlib::Mod4Mask
            | xlib::Mod5Mask)
}

/// `mask` combined with every state of Caps Lock and Num Lock. The server
/// matches passive grabs on the exact modifier state, so a binding is grabbed
/// once per variant.
pub fn lock_variants(mask: u32) -> [u32; 4] {
    [
        mask,
        mask | xlib::LockMask,
        mask | xlib::Mod2Mask,
        mask | xlib::Mod2Mask | xlib::LockMask,
    ]
}
