//! ANSI foreground color codes used to tell chat users apart.

/// Terminal foreground color assigned to a chat user.
///
/// Each variant maps to the SGR escape sequence that selects that
/// foreground color; the raw string is what gets embedded in relayed
/// chat lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorCode {
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    DarkGray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
}

/// Colors handed out to sessions, tried lowest index first.
///
/// `Default` is deliberately absent: it is the reset code, not an
/// identity color. Its length is the hard cap on simultaneously
/// named sessions.
pub const PALETTE: [ColorCode; 14] = [
    ColorCode::Red,
    ColorCode::Green,
    ColorCode::Yellow,
    ColorCode::Blue,
    ColorCode::Magenta,
    ColorCode::Cyan,
    ColorCode::LightGray,
    ColorCode::DarkGray,
    ColorCode::BrightRed,
    ColorCode::BrightGreen,
    ColorCode::BrightYellow,
    ColorCode::BrightBlue,
    ColorCode::BrightMagenta,
    ColorCode::BrightCyan,
];

impl ColorCode {
    /// The escape sequence selecting this foreground color.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorCode::Default => "\x1b[39m",
            ColorCode::Red => "\x1b[31m",
            ColorCode::Green => "\x1b[32m",
            ColorCode::Yellow => "\x1b[33m",
            ColorCode::Blue => "\x1b[34m",
            ColorCode::Magenta => "\x1b[35m",
            ColorCode::Cyan => "\x1b[36m",
            ColorCode::LightGray => "\x1b[37m",
            ColorCode::DarkGray => "\x1b[90m",
            ColorCode::BrightRed => "\x1b[91m",
            ColorCode::BrightGreen => "\x1b[92m",
            ColorCode::BrightYellow => "\x1b[93m",
            ColorCode::BrightBlue => "\x1b[94m",
            ColorCode::BrightMagenta => "\x1b[95m",
            ColorCode::BrightCyan => "\x1b[96m",
        }
    }
}

impl std::fmt::Display for ColorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
