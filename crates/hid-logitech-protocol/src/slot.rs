//! Slot command encoding for the lg4ff force-feedback protocol.
//!
//! The wheel firmware keeps four effect slots with fixed roles. The host never
//! uploads effect objects; it rewrites whole slots with 7-byte commands:
//!
//! ```text
//! Byte 0: (0x10 << slot_id) + op
//!   op: 0x1 = set, 0x3 = disable, 0xc = update in place
//! Bytes 1-6: slot payload (all zero when disabling)
//! ```
//!
//! | Slot | Kind     | Byte 1 | Payload |
//! |------|----------|--------|---------|
//! | 0    | Constant | `0x00` | unsigned force in byte `2 + slot_id`, `0x80` = no force |
//! | 1    | Spring   | `0x0b` | 11-bit deadband edges, 4-bit coefficients, sign bits, 8-bit clip |
//! | 2    | Damper   | `0x0c` | 4-bit coefficients, sign bytes, 8-bit clip |
//! | 3    | Friction | `0x0e` | 8-bit coefficients, 8-bit clip, sign nibble |
//!
//! A slot is re-armed with "set" after being disabled and rewritten with
//! "update" afterwards. A "set" followed by an "update" carrying the same
//! payload is not a change and is not retransmitted.

#![deny(static_mut_refs)]

use crate::ids::REPORT_LEN;

/// Number of hardware slots.
pub const SLOT_COUNT: usize = 4;

/// Coefficients below this magnitude collapse the matching deadband edge.
const SPRING_COEFF_KNEE: u32 = 2048;

/// Fixed role of a hardware slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Constant,
    Spring,
    Damper,
    Friction,
}

impl SlotKind {
    /// All slot kinds in slot-index order.
    pub const ALL: [SlotKind; SLOT_COUNT] = [
        SlotKind::Constant,
        SlotKind::Spring,
        SlotKind::Damper,
        SlotKind::Friction,
    ];

    /// Slot index on the device.
    pub fn index(self) -> usize {
        match self {
            SlotKind::Constant => 0,
            SlotKind::Spring => 1,
            SlotKind::Damper => 2,
            SlotKind::Friction => 3,
        }
    }

    /// High-nibble slot selector placed in byte 0.
    pub fn selector(self) -> u8 {
        0x10 << self.index()
    }
}

/// Slot operation carried in the low bits of byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotOp {
    /// Arm the slot with a new payload.
    Set = 0x1,
    /// Switch the slot off.
    Disable = 0x3,
    /// Rewrite the payload of an armed slot.
    Update = 0xc,
}

impl SlotOp {
    /// Decode the operation from a command's byte 0.
    pub fn from_command_byte(byte: u8) -> Option<Self> {
        match byte & 0x0f {
            0x1 => Some(SlotOp::Set),
            0x3 => Some(SlotOp::Disable),
            0xc => Some(SlotOp::Update),
            _ => None,
        }
    }
}

/// Aggregated parameters for one slot, as computed by the renderer.
///
/// The constant slot uses `level`. The condition slots use the deadband
/// edges (`d1`, `d2`, spring only), coefficients and `clip`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotParameters {
    pub level: i32,
    pub d1: i32,
    pub d2: i32,
    pub k1: i32,
    pub k2: i32,
    /// Saturation. On the constant slot, which has no saturation on the
    /// wire, a non-zero `clip` marks the slot active.
    pub clip: u32,
}

/// One hardware slot: its last command and whether that command is unsent.
#[derive(Debug, Clone)]
pub struct Slot {
    kind: SlotKind,
    parameters: SlotParameters,
    current_cmd: [u8; REPORT_LEN],
    op: Option<SlotOp>,
    pending: bool,
}

impl Slot {
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            parameters: SlotParameters::default(),
            current_cmd: [0; REPORT_LEN],
            op: None,
            pending: false,
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Parameters of the last [`Slot::update`].
    pub fn parameters(&self) -> &SlotParameters {
        &self.parameters
    }

    /// The last built command, sent or not.
    pub fn command(&self) -> [u8; REPORT_LEN] {
        self.current_cmd
    }

    /// Operation of the last built command, `None` before the first update.
    pub fn op(&self) -> Option<SlotOp> {
        self.op
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Rebuild the slot command from `parameters`.
    ///
    /// Returns `true` when the command differs from the previous one and
    /// must be transmitted.
    pub fn update(&mut self, parameters: &SlotParameters) -> bool {
        let mut previous = self.current_cmd;
        if previous[0] & 0x0f == SlotOp::Set as u8 {
            previous[0] = (previous[0] & 0xf0) + SlotOp::Update as u8;
        }

        let op = if parameters.clip == 0 {
            SlotOp::Disable
        } else {
            match self.op {
                None | Some(SlotOp::Disable) => SlotOp::Set,
                Some(SlotOp::Set | SlotOp::Update) => SlotOp::Update,
            }
        };

        let mut cmd = [0u8; REPORT_LEN];
        cmd[0] = self.kind.selector() + op as u8;
        if op != SlotOp::Disable {
            match self.kind {
                SlotKind::Constant => encode_constant(parameters, &mut cmd),
                SlotKind::Spring => encode_spring(parameters, &mut cmd),
                SlotKind::Damper => encode_damper(parameters, &mut cmd),
                SlotKind::Friction => encode_friction(parameters, &mut cmd),
            }
        }

        self.parameters = *parameters;
        self.op = Some(op);
        self.current_cmd = cmd;
        if cmd != previous {
            self.pending = true;
        }
        self.pending
    }

    /// Forget the last command, after its transmission failed.
    ///
    /// The next [`Slot::update`] rebuilds the command as for a fresh slot,
    /// so an armed slot is re-armed with "set" and always retransmitted.
    pub fn invalidate(&mut self) {
        self.current_cmd = [0; REPORT_LEN];
        self.op = None;
        self.pending = false;
    }

    /// Take the command for transmission if it changed since the last take.
    pub fn take_pending(&mut self) -> Option<[u8; REPORT_LEN]> {
        if self.pending {
            self.pending = false;
            Some(self.current_cmd)
        } else {
            None
        }
    }
}

fn encode_constant(p: &SlotParameters, cmd: &mut [u8; REPORT_LEN]) {
    cmd[1] = 0x00;
    cmd[2] = translate_force(p.level);
}

fn encode_spring(p: &SlotParameters, cmd: &mut [u8; REPORT_LEN]) {
    let mut d1 = u32::from(scale_u16(deadband_edge(p.d1), 11));
    let mut d2 = u32::from(scale_u16(deadband_edge(p.d2), 11));
    let s1 = u32::from(p.k1 < 0);
    let s2 = u32::from(p.k2 < 0);
    let mut k1 = p.k1.unsigned_abs();
    let mut k2 = p.k2.unsigned_abs();

    if k1 < SPRING_COEFF_KNEE {
        d1 = 0;
    } else {
        k1 -= SPRING_COEFF_KNEE;
    }
    if k2 < SPRING_COEFF_KNEE {
        d2 = 2047;
    } else {
        k2 -= SPRING_COEFF_KNEE;
    }

    cmd[1] = 0x0b;
    cmd[2] = low_byte(d1 >> 3);
    cmd[3] = low_byte(d2 >> 3);
    cmd[4] = low_byte((u32::from(scale_abs_coeff(k2, 4)) << 4) + u32::from(scale_abs_coeff(k1, 4)));
    cmd[5] = low_byte(((d2 & 7) << 5) + ((d1 & 7) << 1) + (s2 << 4) + s1);
    cmd[6] = low_byte(u32::from(scale_u16(p.clip, 8)));
}

fn encode_damper(p: &SlotParameters, cmd: &mut [u8; REPORT_LEN]) {
    cmd[1] = 0x0c;
    cmd[2] = low_byte(u32::from(scale_coeff(p.k1, 4)));
    cmd[3] = u8::from(p.k1 < 0);
    cmd[4] = low_byte(u32::from(scale_coeff(p.k2, 4)));
    cmd[5] = u8::from(p.k2 < 0);
    cmd[6] = low_byte(u32::from(scale_u16(p.clip, 8)));
}

fn encode_friction(p: &SlotParameters, cmd: &mut [u8; REPORT_LEN]) {
    cmd[1] = 0x0e;
    cmd[2] = low_byte(u32::from(scale_coeff(p.k1, 8)));
    cmd[3] = low_byte(u32::from(scale_coeff(p.k2, 8)));
    cmd[4] = low_byte(u32::from(scale_u16(p.clip, 8)));
    cmd[5] = (u8::from(p.k2 < 0) << 4) + u8::from(p.k1 < 0);
    cmd[6] = 0;
}

/// Shift a signed position into the unsigned 16-bit wheel range.
fn deadband_edge(position: i32) -> u32 {
    // masked to 16 bits, so the cast is lossless
    (position.wrapping_add(0x8000) & 0xffff) as u32
}

fn clamp_u16(x: u32) -> u16 {
    u16::try_from(x).unwrap_or(u16::MAX)
}

/// Keep the top `bits` bits of a value clamped to 16 bits.
pub fn scale_u16(x: u32, bits: u32) -> u16 {
    clamp_u16(x) >> (16 - bits)
}

/// Scale a signed coefficient magnitude down to `bits` bits.
pub fn scale_coeff(x: i32, bits: u32) -> u16 {
    scale_abs_coeff(x.unsigned_abs(), bits)
}

fn scale_abs_coeff(x: u32, bits: u32) -> u16 {
    scale_u16(x.saturating_mul(2), bits)
}

/// Map a signed force onto the unsigned constant-force byte (`0x80` = none).
pub fn translate_force(level: i32) -> u8 {
    let biased = level.clamp(-0x8000, 0x7fff) + 0x8000;
    low_byte(u32::try_from(biased >> 8).unwrap_or(0))
}

fn low_byte(x: u32) -> u8 {
    (x & 0xff) as u8
}
