use std::fmt;
use std::str::FromStr;

#[cfg(windows)]
use windows::Win32::Foundation::HWND;




// we'll define our own new-type of Hwnd mostly coz HWND doesnt implement Hash etc, and isnt around off-windows
# [ derive (Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash) ]
pub struct Hwnd (pub isize);

impl Hwnd {
    pub fn is_valid (&self) -> bool { self.0 != 0 }
}

#[cfg(windows)]
impl From <HWND> for Hwnd {
    fn from (hwnd:HWND) -> Self { Hwnd(hwnd.0 as _) }
}
#[cfg(windows)]
impl From <Hwnd> for HWND {
    fn from (hwnd:Hwnd) -> Self { HWND(hwnd.0 as _) }
}




/// The seven hook categories we know how to watch.
///
/// The discriminant order is the order of the registry slots, and is deliberately unrelated to menu command ids
/// (see [`MenuCommand`] for that mapping).
# [ derive (Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash) ]
pub enum HookKind {
    CallWndProc,
    Cbt,
    Debug,
    GetMessage,
    Keyboard,
    Mouse,
    MsgFilter,
}

impl HookKind {

    pub const ALL : [HookKind; 7] = [
        HookKind::CallWndProc, HookKind::Cbt, HookKind::Debug, HookKind::GetMessage,
        HookKind::Keyboard, HookKind::Mouse, HookKind::MsgFilter,
    ];

    pub const fn slot (self) -> usize { self as usize }

    /// tag used both in rendered lines and as the config key for this kind
    pub const fn tag (self) -> &'static str {
        match self {
            HookKind::CallWndProc => "CALLWNDPROC",
            HookKind::Cbt         => "CBT",
            HookKind::Debug       => "DEBUG",
            HookKind::GetMessage  => "GETMESSAGE",
            HookKind::Keyboard    => "KEYBOARD",
            HookKind::Mouse       => "MOUSE",
            HookKind::MsgFilter   => "MSGFILTER",
        }
    }

    /// the WH_* id the OS knows this kind by
    pub const fn hook_id (self) -> i32 {
        match self {
            HookKind::CallWndProc => 4,     // WH_CALLWNDPROC
            HookKind::Cbt         => 5,     // WH_CBT
            HookKind::Debug       => 9,     // WH_DEBUG
            HookKind::GetMessage  => 3,     // WH_GETMESSAGE
            HookKind::Keyboard    => 2,     // WH_KEYBOARD
            HookKind::Mouse       => 7,     // WH_MOUSE
            HookKind::MsgFilter   => -1,    // WH_MSGFILTER
        }
    }

    /// max chars a rendered line may take before it counts as a formatting failure
    pub const fn line_capacity (self) -> usize {
        match self {
            HookKind::CallWndProc | HookKind::GetMessage => 255,
            _ => 127,
        }
    }

    /// default y offset in the client area .. every kind owns its own row so lines never overlap
    pub const fn default_row (self) -> i32 {
        match self {
            HookKind::CallWndProc => 15,
            HookKind::GetMessage  => 35,
            HookKind::Debug       => 55,
            HookKind::Cbt         => 75,
            HookKind::Mouse       => 95,
            HookKind::Keyboard    => 115,
            HookKind::MsgFilter   => 135,
        }
    }

    /// whether a callback of this kind should render for the given hook code
    pub const fn is_actionable (self, code: i32) -> bool {
        if code < 0 { return false }
        match self {
            // these only mean anything for HC_ACTION
            HookKind::CallWndProc | HookKind::GetMessage | HookKind::Debug => code == 0,
            HookKind::Cbt | HookKind::Keyboard | HookKind::Mouse | HookKind::MsgFilter => true,
        }
    }

    pub const fn menu_label (self) -> &'static str {
        match self {
            HookKind::CallWndProc => "WH_CALLWNDPROC",
            HookKind::Cbt         => "WH_CBT",
            HookKind::Debug       => "WH_DEBUG",
            HookKind::GetMessage  => "WH_GETMESSAGE",
            HookKind::Keyboard    => "WH_KEYBOARD",
            HookKind::Mouse       => "WH_MOUSE",
            HookKind::MsgFilter   => "WH_MSGFILTER",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str (self.tag())
    }
}

impl FromStr for HookKind {
    type Err = String;
    fn from_str (s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("WH_").unwrap_or(&name);
        HookKind::ALL .into_iter() .find (|k| k.tag() == name) .ok_or_else (|| format!("unknown hook kind `{}`", s))
    }
}




/// Everything the main window menu can ask of us.
# [ derive (Debug, Copy, Clone, Eq, PartialEq) ]
pub enum MenuCommand {
    Toggle (HookKind),
    EditConfig,
    ResetConfig,
    Exit,
}

impl MenuCommand {

    const TOGGLE_IDS : [(u16, HookKind); 7] = [
        (0, HookKind::CallWndProc),
        (1, HookKind::Cbt),
        (2, HookKind::Debug),
        (3, HookKind::GetMessage),
        (4, HookKind::Keyboard),
        (5, HookKind::Mouse),
        (6, HookKind::MsgFilter),
    ];
    const ID_EDIT_CONF  : u16 = 100;
    const ID_RESET_CONF : u16 = 101;
    const ID_EXIT       : u16 = 102;

    pub fn from_id (id: u16) -> Option<MenuCommand> {
        match id {
            Self::ID_EDIT_CONF  => Some (MenuCommand::EditConfig),
            Self::ID_RESET_CONF => Some (MenuCommand::ResetConfig),
            Self::ID_EXIT       => Some (MenuCommand::Exit),
            _ => Self::TOGGLE_IDS .iter() .find (|(i,_)| *i == id) .map (|(_,k)| MenuCommand::Toggle(*k)),
        }
    }

    pub fn id (self) -> u16 {
        match self {
            MenuCommand::EditConfig  => Self::ID_EDIT_CONF,
            MenuCommand::ResetConfig => Self::ID_RESET_CONF,
            MenuCommand::Exit        => Self::ID_EXIT,
            MenuCommand::Toggle(kind) => {
                Self::TOGGLE_IDS .iter() .find (|(_,k)| *k == kind) .map (|(i,_)| *i) .unwrap_or_default()
            }
        }
    }

    pub fn toggle_id (kind: HookKind) -> u16 {
        MenuCommand::Toggle(kind).id()
    }
}
